// Error handling for urit

use std::fmt;

/// Errors produced by template parsing, variable merging, and expansion.
///
/// Parse errors are raised eagerly; no partially-built template is ever
/// returned. A variable missing at expansion time is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Unbalanced or nested braces, an empty expression, or an unparsable
    /// prefix length.
    MalformedTemplate(String),
    /// A term name containing characters outside the allowed set.
    InvalidTermName(String),
    /// A term carrying both an explode modifier and a prefix length.
    InvalidModifierCombination(String),
    /// A term with more than one `:` modifier.
    MultipleColonsInTerm(String),
    /// A prefix length applied to an associative value at expansion time.
    UnsupportedMapTruncation(String),
    /// Incompatible value kinds assigned to the same variable name.
    TypeConflict(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::MalformedTemplate(msg) => write!(f, "malformed template: {}", msg),
            TemplateError::InvalidTermName(name) => write!(f, "invalid term name: '{}'", name),
            TemplateError::InvalidModifierCombination(name) => write!(
                f,
                "term '{}' cannot combine explode with a prefix length",
                name
            ),
            TemplateError::MultipleColonsInTerm(term) => {
                write!(f, "multiple colons in term: '{}'", term)
            }
            TemplateError::UnsupportedMapTruncation(name) => {
                write!(f, "cannot truncate map expansion of '{}'", name)
            }
            TemplateError::TypeConflict(name) => {
                write!(f, "conflicting value types for variable '{}'", name)
            }
        }
    }
}

impl std::error::Error for TemplateError {}
