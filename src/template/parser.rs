// URI template parser

use crate::error::TemplateError;
use crate::template::ast::{Expression, Operator, Template, TemplatePart, Term};
use crate::template::encoding::is_valid_name;

/// Parses raw template text into a [`Template`].
///
/// Validation is eager: any syntax error aborts the parse and no partial
/// template is returned.
pub struct TemplateParser {
    input: String,
    pos: usize,
}

impl TemplateParser {
    pub fn parse(template: &str) -> Result<Template, TemplateError> {
        let mut parser = Self {
            input: template.to_string(),
            pos: 0,
        };
        let parts = parser.parse_template()?;
        Ok(Template::new(parser.input, parts))
    }

    fn parse_template(&mut self) -> Result<Vec<TemplatePart>, TemplateError> {
        let mut parts = Vec::new();
        let mut literal_buf = String::new();

        while let Some(ch) = self.peek_char() {
            match ch {
                '{' => {
                    // Start of expression - flush literal buffer first
                    if !literal_buf.is_empty() {
                        parts.push(TemplatePart::Literal(literal_buf.clone()));
                        literal_buf.clear();
                    }
                    let expr = self.parse_expression()?;
                    parts.push(TemplatePart::Expression(expr));
                }
                '}' => {
                    // Closing brace with no open expression
                    return Err(TemplateError::MalformedTemplate(format!(
                        "unexpected }} at position {}",
                        self.pos
                    )));
                }
                _ => {
                    literal_buf.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }

        if !literal_buf.is_empty() {
            parts.push(TemplatePart::Literal(literal_buf));
        }

        Ok(parts)
    }

    /// Parse one `{...}` expression. The cursor sits on the opening brace.
    fn parse_expression(&mut self) -> Result<Expression, TemplateError> {
        let open_pos = self.pos;
        self.pos += 1; // consume {

        let mut body = String::new();
        loop {
            match self.peek_char() {
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                Some('{') => {
                    return Err(TemplateError::MalformedTemplate(format!(
                        "nested {{ at position {}",
                        self.pos
                    )));
                }
                Some(ch) => {
                    body.push(ch);
                    self.pos += ch.len_utf8();
                }
                None => {
                    return Err(TemplateError::MalformedTemplate(format!(
                        "missing }} for {{ at position {}",
                        open_pos
                    )));
                }
            }
        }

        if body.is_empty() {
            return Err(TemplateError::MalformedTemplate(format!(
                "unexpected }} at position {}",
                self.pos - 1
            )));
        }

        parse_expression_body(&body)
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }
}

/// Decode an expression body: leading operator character, then the
/// comma-separated term list.
fn parse_expression_body(body: &str) -> Result<Expression, TemplateError> {
    let (operator, rest) = match body.chars().next().and_then(Operator::from_leading) {
        Some(op) => (op, &body[1..]),
        None => (Operator::Simple, body),
    };

    let mut terms = Vec::new();
    for raw in rest.split(',') {
        terms.push(parse_term(raw)?);
    }

    Ok(Expression { operator, terms })
}

/// Decode one raw term: `name`, `name*`, or `name:N`.
fn parse_term(raw: &str) -> Result<Term, TemplateError> {
    let (rest, explode) = match raw.strip_suffix('*') {
        Some(stripped) => (stripped, true),
        None => (raw, false),
    };

    let mut pieces = rest.split(':');
    let name = pieces.next().unwrap_or_default();
    let prefix = match pieces.next() {
        None => None,
        Some(digits) => {
            if pieces.next().is_some() {
                return Err(TemplateError::MultipleColonsInTerm(raw.to_string()));
            }
            let n: usize = digits.parse().map_err(|_| {
                TemplateError::MalformedTemplate(format!(
                    "invalid prefix length '{}' in term '{}'",
                    digits, raw
                ))
            })?;
            if n == 0 {
                return Err(TemplateError::MalformedTemplate(format!(
                    "prefix length must be positive in term '{}'",
                    raw
                )));
            }
            Some(n)
        }
    };

    if !is_valid_name(name) {
        return Err(TemplateError::InvalidTermName(name.to_string()));
    }
    if explode && prefix.is_some() {
        return Err(TemplateError::InvalidModifierCombination(name.to_string()));
    }

    Ok(Term {
        name: name.to_string(),
        explode,
        prefix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal_only() {
        let template = TemplateParser::parse("https://example.com/repos").unwrap();
        assert_eq!(template.parts().len(), 1);
        assert_eq!(
            template.parts()[0],
            TemplatePart::Literal("https://example.com/repos".to_string())
        );
        assert_eq!(template.raw(), "https://example.com/repos");
    }

    #[test]
    fn test_parse_simple_expression() {
        let template = TemplateParser::parse("https://example.com/{user}").unwrap();
        assert_eq!(template.parts().len(), 2);
        match &template.parts()[1] {
            TemplatePart::Expression(expr) => {
                assert_eq!(expr.operator, Operator::Simple);
                assert_eq!(expr.terms.len(), 1);
                assert_eq!(expr.terms[0].name, "user");
                assert!(!expr.terms[0].explode);
                assert_eq!(expr.terms[0].prefix, None);
            }
            _ => panic!("Expected expression"),
        }
    }

    #[test]
    fn test_parse_each_operator() {
        let cases = [
            ("{+path}", Operator::Reserved),
            ("{.domain}", Operator::Label),
            ("{/segments}", Operator::Path),
            ("{;params}", Operator::Matrix),
            ("{?opts}", Operator::Query),
            ("{&more}", Operator::Continuation),
            ("{#frag}", Operator::Fragment),
        ];
        for (text, operator) in cases {
            let template = TemplateParser::parse(text).unwrap();
            match &template.parts()[0] {
                TemplatePart::Expression(expr) => assert_eq!(expr.operator, operator),
                _ => panic!("Expected expression for {}", text),
            }
        }
    }

    #[test]
    fn test_parse_multiple_terms() {
        let template = TemplateParser::parse("{/user,repo}").unwrap();
        match &template.parts()[0] {
            TemplatePart::Expression(expr) => {
                assert_eq!(expr.terms.len(), 2);
                assert_eq!(expr.terms[0].name, "user");
                assert_eq!(expr.terms[1].name, "repo");
            }
            _ => panic!("Expected expression"),
        }
    }

    #[test]
    fn test_parse_explode_modifier() {
        let template = TemplateParser::parse("{?opts*}").unwrap();
        match &template.parts()[0] {
            TemplatePart::Expression(expr) => {
                assert!(expr.terms[0].explode);
                assert_eq!(expr.terms[0].prefix, None);
            }
            _ => panic!("Expected expression"),
        }
    }

    #[test]
    fn test_parse_prefix_modifier() {
        let template = TemplateParser::parse("{var:3}").unwrap();
        match &template.parts()[0] {
            TemplatePart::Expression(expr) => {
                assert!(!expr.terms[0].explode);
                assert_eq!(expr.terms[0].prefix, Some(3));
            }
            _ => panic!("Expected expression"),
        }
    }

    #[test]
    fn test_parse_pct_encoded_name() {
        let template = TemplateParser::parse("{semi%3B}").unwrap();
        assert_eq!(template.names(), vec!["semi%3B"]);
    }

    #[test]
    fn test_names_in_encounter_order_with_duplicates() {
        let template = TemplateParser::parse("{/path*,Version}{?opts*,Version}").unwrap();
        assert_eq!(template.names(), vec!["path", "Version", "opts", "Version"]);
    }

    #[test]
    fn test_unbalanced_open_brace() {
        match TemplateParser::parse("https://example.com/{user") {
            Err(TemplateError::MalformedTemplate(_)) => {}
            other => panic!("Expected MalformedTemplate, got {:?}", other),
        }
    }

    #[test]
    fn test_stray_closing_brace() {
        match TemplateParser::parse("https://example.com/}x") {
            Err(TemplateError::MalformedTemplate(msg)) => {
                assert!(msg.contains("unexpected }"), "message was: {}", msg)
            }
            other => panic!("Expected MalformedTemplate, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_open_brace() {
        assert!(matches!(
            TemplateParser::parse("{a{b}}"),
            Err(TemplateError::MalformedTemplate(_))
        ));
    }

    #[test]
    fn test_empty_expression() {
        match TemplateParser::parse("x{}y") {
            Err(TemplateError::MalformedTemplate(msg)) => {
                assert!(msg.contains("unexpected }"), "message was: {}", msg)
            }
            other => panic!("Expected MalformedTemplate, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_colons_rejected() {
        assert_eq!(
            TemplateParser::parse("{opts:1:2}"),
            Err(TemplateError::MultipleColonsInTerm("opts:1:2".to_string()))
        );
    }

    #[test]
    fn test_invalid_term_name() {
        assert_eq!(
            TemplateParser::parse("{bad name}"),
            Err(TemplateError::InvalidTermName("bad name".to_string()))
        );
        assert_eq!(
            TemplateParser::parse("{a,,b}"),
            Err(TemplateError::InvalidTermName(String::new()))
        );
    }

    #[test]
    fn test_explode_with_prefix_rejected() {
        assert_eq!(
            TemplateParser::parse("{var:3*}"),
            Err(TemplateError::InvalidModifierCombination("var".to_string()))
        );
    }

    #[test]
    fn test_bad_prefix_length() {
        assert!(matches!(
            TemplateParser::parse("{var:abc}"),
            Err(TemplateError::MalformedTemplate(_))
        ));
        assert!(matches!(
            TemplateParser::parse("{var:0}"),
            Err(TemplateError::MalformedTemplate(_))
        ));
    }
}
