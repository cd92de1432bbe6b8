// Partial expansion: unresolved expressions survive as template syntax

use crate::error::TemplateError;
use crate::template::ast::{Expression, Template, TemplatePart, Term};
use crate::template::expander::expand_expression;
use crate::template::value::Vars;

/// Expand a template, preserving expressions whose variables are missing.
///
/// Resolved terms expand exactly as [`expand`](crate::template::expand);
/// unresolved terms are re-serialized as a bracket expression so the output
/// parses as a valid template for a later pass. Variables can therefore be
/// supplied across several passes.
pub fn expand_partial(template: &Template, vars: &Vars) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.raw().len());
    for part in template.parts() {
        match part {
            TemplatePart::Literal(text) => out.push_str(text),
            TemplatePart::Expression(expr) => expand_partial_expression(&mut out, expr, vars)?,
        }
    }
    Ok(out)
}

fn expand_partial_expression(
    buf: &mut String,
    expr: &Expression,
    vars: &Vars,
) -> Result<(), TemplateError> {
    let missing: Vec<&Term> = expr
        .terms
        .iter()
        .filter(|term| !vars.contains(&term.name))
        .collect();

    // Present terms expand as usual; the full expander already skips the
    // missing ones.
    expand_expression(buf, expr, vars)?;

    if missing.is_empty() {
        return Ok(());
    }

    // When some terms already contributed, the replacement expression opens
    // with the separator so the remaining variables continue the sequence
    // rather than restart it. Prefix lengths are not carried over.
    let spec = expr.operator.spec();
    buf.push('{');
    buf.push_str(if missing.len() == expr.terms.len() {
        spec.first
    } else {
        spec.separator
    });
    for (i, term) in missing.iter().enumerate() {
        if i > 0 {
            buf.push(',');
        }
        buf.push_str(&term.name);
        if term.explode {
            buf.push('*');
        }
    }
    buf.push('}');
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::parser::TemplateParser;

    fn partial_with(template: &str, build: impl FnOnce(&mut Vars)) -> String {
        let template = TemplateParser::parse(template).unwrap();
        let mut vars = Vars::new();
        build(&mut vars);
        expand_partial(&template, &vars).unwrap()
    }

    #[test]
    fn test_fully_resolved_matches_expand() {
        let template = TemplateParser::parse("https://api.example.com/repos{/user,repo}").unwrap();
        let mut vars = Vars::new();
        vars.add("user", "jtacoma").unwrap();
        vars.add("repo", "uritemplates").unwrap();
        assert_eq!(
            expand_partial(&template, &vars).unwrap(),
            template.expand(&vars).unwrap()
        );
    }

    #[test]
    fn test_unresolved_expression_preserved_whole() {
        let result = partial_with("{scheme}://{.domain}", |vars| {
            vars.add("scheme", "https").unwrap();
        });
        assert_eq!(result, "https://{.domain}");
    }

    #[test]
    fn test_partially_resolved_uses_separator() {
        let result = partial_with("https://example.com{?a,b}", |vars| {
            vars.add("a", "a").unwrap();
        });
        assert_eq!(result, "https://example.com?a=a{&b}");
    }

    #[test]
    fn test_fully_missing_uses_first_char() {
        let result = partial_with("https://example.com{?a,b}", |_| {});
        assert_eq!(result, "https://example.com{?a,b}");
    }

    #[test]
    fn test_explode_flag_survives_reserialization() {
        let result = partial_with("{/path*,file}", |vars| {
            vars.add("file", "index").unwrap();
        });
        assert_eq!(result, "/index{/path*}");
    }

    #[test]
    fn test_reserialized_output_reparses_and_finishes() {
        let first = partial_with("https://example.com{?a,b}", |vars| {
            vars.add("a", "1").unwrap();
        });
        let template = TemplateParser::parse(&first).unwrap();
        let mut vars = Vars::new();
        vars.add("b", "2").unwrap();
        assert_eq!(
            template.expand(&vars).unwrap(),
            "https://example.com?a=1&b=2"
        );
    }

    #[test]
    fn test_missing_path_terms_round_trip() {
        let first = partial_with("{/a,b}", |vars| {
            vars.add("a", "x").unwrap();
        });
        assert_eq!(first, "/x{/b}");
        let template = TemplateParser::parse(&first).unwrap();
        let mut vars = Vars::new();
        vars.add("b", "y").unwrap();
        assert_eq!(template.expand(&vars).unwrap(), "/x/y");
    }
}
