// urit: expand RFC 6570 URI templates from the command line

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction};
use url::Url;

use urit::template::{TemplateParser, Value, Vars};
use urit::{location, Template};

fn main() -> Result<()> {
    let matches = clap::Command::new("urit")
        .about("Expand RFC 6570 URI templates")
        .arg(
            Arg::new("template")
                .value_name("TEMPLATE")
                .required(true)
                .help("URI template text, e.g. 'https://example.com/repos{/user,repo}'"),
        )
        .arg(
            Arg::new("var")
                .short('v')
                .long("var")
                .value_name("NAME=VALUE")
                .action(ArgAction::Append)
                .help("Bind a string variable"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .value_name("NAME=A,B,C")
                .action(ArgAction::Append)
                .help("Bind a list variable; repeated flags concatenate"),
        )
        .arg(
            Arg::new("map")
                .short('m')
                .long("map")
                .value_name("NAME=K:V,K:V")
                .action(ArgAction::Append)
                .help("Bind an associative variable from key:value pairs"),
        )
        .arg(
            Arg::new("json")
                .short('j')
                .long("json")
                .value_name("FILE")
                .help("Merge variables from a JSON object file before the flag variables"),
        )
        .arg(
            Arg::new("partial")
                .short('p')
                .long("partial")
                .action(ArgAction::SetTrue)
                .help("Keep unresolved expressions as template syntax instead of dropping them"),
        )
        .arg(
            Arg::new("names")
                .short('n')
                .long("names")
                .action(ArgAction::SetTrue)
                .help("Print the template's variable names, one per line, and exit"),
        )
        .arg(
            Arg::new("base")
                .short('b')
                .long("base")
                .value_name("URL")
                .help("Resolve the expansion against a base URL and print the absolute URL"),
        )
        .get_matches();

    let raw = matches
        .get_one::<String>("template")
        .expect("required argument");
    let template =
        TemplateParser::parse(raw).with_context(|| format!("cannot parse template '{}'", raw))?;

    if matches.get_flag("names") {
        for name in template.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let mut vars = Vars::new();

    if let Some(path) = matches.get_one::<String>("json") {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read variable file '{}'", path))?;
        let json: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("'{}' is not valid JSON", path))?;
        let object = json
            .as_object()
            .with_context(|| format!("'{}' must contain a JSON object", path))?;
        vars.update_json(object)
            .with_context(|| format!("cannot merge variables from '{}'", path))?;
    }

    for assignment in matches.get_many::<String>("var").into_iter().flatten() {
        let (name, value) = split_assignment(assignment)?;
        vars.add(name, value)
            .with_context(|| format!("cannot bind variable '{}'", name))?;
    }

    for assignment in matches.get_many::<String>("list").into_iter().flatten() {
        let (name, value) = split_assignment(assignment)?;
        let items: Vec<String> = value.split(',').map(str::to_string).collect();
        vars.add(name, items)
            .with_context(|| format!("cannot bind variable '{}'", name))?;
    }

    for assignment in matches.get_many::<String>("map").into_iter().flatten() {
        let (name, value) = split_assignment(assignment)?;
        let mut map = std::collections::BTreeMap::new();
        for pair in value.split(',') {
            let Some((key, pair_value)) = pair.split_once(':') else {
                bail!("invalid pair '{}' in --map {}: expected key:value", pair, assignment);
            };
            map.insert(key.to_string(), pair_value.to_string());
        }
        vars.add(name, Value::Assoc(map))
            .with_context(|| format!("cannot bind variable '{}'", name))?;
    }

    if let Some(base) = matches.get_one::<String>("base") {
        let base: Url = base
            .parse()
            .with_context(|| format!("invalid base URL '{}'", base))?;
        let url = location::resolve(Some(&base), &template, &vars)?;
        println!("{}", url);
        return Ok(());
    }

    let output = expand(&template, &vars, matches.get_flag("partial"))?;
    println!("{}", output);
    Ok(())
}

fn expand(template: &Template, vars: &Vars, partial: bool) -> Result<String> {
    let output = if partial {
        template.expand_partial(vars)
    } else {
        template.expand(vars)
    };
    output.with_context(|| format!("cannot expand '{}'", template.raw()))
}

fn split_assignment(assignment: &str) -> Result<(&str, &str)> {
    match assignment.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => bail!("invalid assignment '{}': expected NAME=VALUE", assignment),
    }
}
