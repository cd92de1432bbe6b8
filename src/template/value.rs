// Variable values and the collection consumed by expansion

use std::collections::{BTreeMap, HashMap};

use crate::error::TemplateError;

/// The value bound to a template variable.
///
/// List items and associative values are plain strings; callers coerce at
/// construction (via the `From` impls or [`Value::from_json`]) rather than
/// carrying dynamically-typed payloads into expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    List(Vec<String>),
    Assoc(BTreeMap<String, String>),
}

impl Value {
    /// Convert a decoded JSON value: strings stay strings, arrays become
    /// lists, objects become associative values, scalars are stringified.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(json_scalar).collect())
            }
            serde_json::Value::Object(map) => Value::Assoc(
                map.iter()
                    .map(|(k, v)| (k.clone(), json_scalar(v)))
                    .collect(),
            ),
            other => Value::Str(json_scalar(other)),
        }
    }
}

/// Stringify a scalar JSON value the way expansion expects: bare strings,
/// plain decimal numbers, `true`/`false`, and empty for null.
fn json_scalar(json: &serde_json::Value) -> String {
    match json {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Value::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<BTreeMap<String, String>> for Value {
    fn from(map: BTreeMap<String, String>) -> Self {
        Value::Assoc(map)
    }
}

/// The variable collection consumed by an expansion call.
///
/// Built incrementally (CLI flag accumulation, JSON file merge) and then
/// read-only while expanding. Repeated assignment to one name follows fixed
/// merge rules; incompatible kinds fail with `TypeConflict`.
#[derive(Debug, Clone, Default)]
pub struct Vars {
    values: HashMap<String, Value>,
    order: Vec<String>,
}

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a value, merging with any existing value for the name.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), TemplateError> {
        let name = name.into();
        let value = value.into();
        let merged = match self.values.get(&name) {
            None => {
                self.order.push(name.clone());
                value
            }
            Some(existing) => merge(&name, existing, value)?,
        };
        self.values.insert(name, merged);
        Ok(())
    }

    /// Merge a batch of assignments, in iteration order.
    pub fn update<I, N, V>(&mut self, entries: I) -> Result<(), TemplateError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in entries {
            self.add(name, value)?;
        }
        Ok(())
    }

    /// Merge the members of a decoded JSON object.
    pub fn update_json(
        &mut self,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), TemplateError> {
        for (name, value) in object {
            self.add(name.clone(), Value::from_json(value))?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// The collection as ordered `(name, value)` pairs, in first-assignment
    /// order. Used by variable-completion UIs.
    pub fn items(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.order
            .iter()
            .map(|name| (name.as_str(), &self.values[name]))
    }
}

/// Merge a new assignment into an existing value.
///
/// List + List concatenates, Str + List promotes the string to a singleton
/// list, Assoc + Assoc unions with the new keys winning, and Assoc + List
/// turns each item into an empty-valued key (kept for compatibility with
/// existing variable files). Everything else is a conflict.
fn merge(name: &str, existing: &Value, incoming: Value) -> Result<Value, TemplateError> {
    match (existing, incoming) {
        (Value::List(old), Value::List(new)) => {
            let mut merged = old.clone();
            merged.extend(new);
            Ok(Value::List(merged))
        }
        (Value::Str(old), Value::List(new)) => {
            let mut merged = vec![old.clone()];
            merged.extend(new);
            Ok(Value::List(merged))
        }
        (Value::Assoc(old), Value::List(new)) => {
            let mut merged = old.clone();
            for item in new {
                merged.insert(item, String::new());
            }
            Ok(Value::Assoc(merged))
        }
        (Value::Assoc(old), Value::Assoc(new)) => {
            let mut merged = old.clone();
            merged.extend(new);
            Ok(Value::Assoc(merged))
        }
        _ => Err(TemplateError::TypeConflict(name.to_string())),
    }
}
