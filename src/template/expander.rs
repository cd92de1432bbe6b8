// Template expansion

use std::collections::BTreeMap;

use crate::error::TemplateError;
use crate::template::ast::{Expression, OpSpec, Template, TemplatePart, Term};
use crate::template::encoding::escape;
use crate::template::value::{Value, Vars};

/// Expand a template with the given variables.
///
/// Variables absent from `vars` are omitted from the output. The only
/// expansion-time failure is a prefix length applied to an associative value.
pub fn expand(template: &Template, vars: &Vars) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.raw().len());
    for part in template.parts() {
        match part {
            TemplatePart::Literal(text) => out.push_str(text),
            TemplatePart::Expression(expr) => expand_expression(&mut out, expr, vars)?,
        }
    }
    Ok(out)
}

/// Expand one expression into the output buffer.
///
/// The operator's first character is written up front and rolled back if no
/// term ends up contributing, so a fully-empty expression leaves no trace.
pub(crate) fn expand_expression(
    buf: &mut String,
    expr: &Expression,
    vars: &Vars,
) -> Result<(), TemplateError> {
    let spec = expr.operator.spec();
    let mark = buf.len();
    buf.push_str(spec.first);
    let first_len = buf.len();

    for term in &expr.terms {
        let value = match vars.get(&term.name) {
            Some(value) => value,
            None => continue,
        };
        if buf.len() != first_len {
            buf.push_str(spec.separator);
        }
        match value {
            Value::Str(s) => expand_string(buf, &spec, term, s),
            Value::List(items) => expand_list(buf, &spec, term, items),
            Value::Assoc(map) => {
                if term.prefix.is_some() {
                    return Err(TemplateError::UnsupportedMapTruncation(term.name.clone()));
                }
                expand_assoc(buf, &spec, term, map);
            }
        }
    }

    if buf.len() == first_len {
        buf.truncate(mark);
    }
    Ok(())
}

/// Write `name=` (or `name` plus the empty marker) for named operators.
fn expand_name(buf: &mut String, spec: &OpSpec, name: &str, empty: bool) {
    if spec.named {
        buf.push_str(name);
        buf.push_str(if empty { spec.empty_marker } else { "=" });
    }
}

fn expand_string(buf: &mut String, spec: &OpSpec, term: &Term, value: &str) {
    let value = match term.prefix {
        Some(n) => truncate_chars(value, n),
        None => value,
    };
    expand_name(buf, spec, &term.name, value.is_empty());
    buf.push_str(&escape(value, spec.allow_reserved));
}

fn expand_list(buf: &mut String, spec: &OpSpec, term: &Term, items: &[String]) {
    if items.is_empty() {
        return;
    }
    if !term.explode {
        expand_name(buf, spec, &term.name, false);
    }
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push_str(if term.explode { spec.separator } else { "," });
        }
        if term.explode {
            expand_name(buf, spec, &term.name, item.is_empty());
        }
        buf.push_str(&escape(item, spec.allow_reserved));
    }
}

fn expand_assoc(buf: &mut String, spec: &OpSpec, term: &Term, map: &BTreeMap<String, String>) {
    if map.is_empty() {
        return;
    }
    if !term.explode {
        expand_name(buf, spec, &term.name, false);
    }
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            buf.push_str(if term.explode { spec.separator } else { "," });
        }
        buf.push_str(&escape(key, spec.allow_reserved));
        buf.push_str(if term.explode { "=" } else { "," });
        buf.push_str(&escape(value, spec.allow_reserved));
    }
}

/// Truncate to the first `n` characters, on codepoint boundaries.
fn truncate_chars(value: &str, n: usize) -> &str {
    match value.char_indices().nth(n) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}
