// Abstract syntax tree types for URI templates

use crate::error::TemplateError;
use crate::template::value::Vars;
use crate::template::{expander, partial};

/// A parsed URI template: the raw text plus its ordered parts.
///
/// Parse once, expand many times. A `Template` is never mutated after
/// construction, so shared references can expand concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
    parts: Vec<TemplatePart>,
}

impl Template {
    pub(crate) fn new(raw: String, parts: Vec<TemplatePart>) -> Self {
        Self { raw, parts }
    }

    /// The original template text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// All term names across all expressions, in encounter order.
    /// Duplicates are preserved.
    pub fn names(&self) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                TemplatePart::Expression(expr) => Some(expr),
                _ => None,
            })
            .flat_map(|expr| expr.terms.iter().map(|term| term.name.as_str()))
            .collect()
    }

    /// Expand the template with the given variables. Missing variables are
    /// omitted from the output.
    pub fn expand(&self, vars: &Vars) -> Result<String, TemplateError> {
        expander::expand(self, vars)
    }

    /// Expand the template, re-serializing expressions whose variables are
    /// missing so the output can be parsed and expanded again later.
    pub fn expand_partial(&self, vars: &Vars) -> Result<String, TemplateError> {
        partial::expand_partial(self, vars)
    }
}

/// A template consists of literal runs and bracketed expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    Expression(Expression),
}

/// A single `{operator? term(,term)*}` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub operator: Operator,
    pub terms: Vec<Term>,
}

/// A term inside an expression: a variable name with optional modifiers.
///
/// `explode` and `prefix` are mutually exclusive; the parser rejects terms
/// that set both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub name: String,
    pub explode: bool,
    pub prefix: Option<usize>,
}

/// The eight RFC 6570 expression operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `{var}`
    Simple,
    /// `{+var}`
    Reserved,
    /// `{.var}`
    Label,
    /// `{/var}`
    Path,
    /// `{;var}`
    Matrix,
    /// `{?var}`
    Query,
    /// `{&var}`
    Continuation,
    /// `{#var}`
    Fragment,
}

/// Expansion properties of an operator: leading character, term separator,
/// whether terms are `name=` prefixed, the marker used for empty named
/// values, and whether reserved characters pass through unencoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpSpec {
    pub first: &'static str,
    pub separator: &'static str,
    pub named: bool,
    pub empty_marker: &'static str,
    pub allow_reserved: bool,
}

impl Operator {
    /// Look up the operator for the leading character of an expression body.
    pub(crate) fn from_leading(c: char) -> Option<Operator> {
        match c {
            '+' => Some(Operator::Reserved),
            '.' => Some(Operator::Label),
            '/' => Some(Operator::Path),
            ';' => Some(Operator::Matrix),
            '?' => Some(Operator::Query),
            '&' => Some(Operator::Continuation),
            '#' => Some(Operator::Fragment),
            _ => None,
        }
    }

    /// The constant property record for this operator.
    pub const fn spec(self) -> OpSpec {
        match self {
            Operator::Simple => OpSpec {
                first: "",
                separator: ",",
                named: false,
                empty_marker: "",
                allow_reserved: false,
            },
            Operator::Reserved => OpSpec {
                first: "",
                separator: ",",
                named: false,
                empty_marker: "",
                allow_reserved: true,
            },
            Operator::Label => OpSpec {
                first: ".",
                separator: ".",
                named: false,
                empty_marker: "",
                allow_reserved: false,
            },
            Operator::Path => OpSpec {
                first: "/",
                separator: "/",
                named: false,
                empty_marker: "",
                allow_reserved: false,
            },
            Operator::Matrix => OpSpec {
                first: ";",
                separator: ";",
                named: true,
                empty_marker: "",
                allow_reserved: false,
            },
            Operator::Query => OpSpec {
                first: "?",
                separator: "&",
                named: true,
                empty_marker: "=",
                allow_reserved: false,
            },
            Operator::Continuation => OpSpec {
                first: "&",
                separator: "&",
                named: true,
                empty_marker: "=",
                allow_reserved: false,
            },
            Operator::Fragment => OpSpec {
                first: "#",
                separator: ",",
                named: false,
                empty_marker: "",
                allow_reserved: true,
            },
        }
    }
}
