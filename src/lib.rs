// urit: RFC 6570 URI template parsing and expansion

pub mod error;
pub mod location;
pub mod template;

pub use error::TemplateError;
pub use template::{Template, TemplateParser, Value, Vars};
