use std::collections::HashMap;
use std::io::Write;

use clap::Parser;
use serde_json::{Map, Value};

use kit::template::{self, MissingPolicy};
use kit::{io, Error};

use crate::commands::CmdResult;

use super::read_json;

#[derive(Parser, Debug)]
#[command(about = "Fill {{NAME}} placeholders from variables, JSON or the environment")]
pub struct FilltemplateArgs {
    /// Set a variable (repeatable)
    #[arg(short = 'v', long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Use environment variables as values
    #[arg(short = 'e', long = "env")]
    pub env: bool,

    /// Take values from a JSON object file
    #[arg(short = 'j', long = "json", value_name = "FILE")]
    pub json: Option<String>,

    /// What to do with unknown names: keep, empty or error
    #[arg(short = 'm', long = "missing", default_value = "keep")]
    pub missing: String,

    pub file: Option<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Render a template with a JSON context")]
pub struct TemplateArgs {
    /// Inline JSON data
    #[arg(short = 'd', long = "data", value_name = "JSON")]
    pub data: Option<String>,

    /// Expose environment variables as top-level names
    #[arg(short = 'e', long = "env")]
    pub env: bool,

    /// Template text (instead of reading FILE)
    #[arg(short = 's', long = "string", value_name = "STR")]
    pub string: Option<String>,

    /// Fail on undefined names
    #[arg(long = "strict")]
    pub strict: bool,

    pub file: Option<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Render a template file against a JSON data file")]
pub struct JsontemplateArgs {
    /// Fail on undefined names
    #[arg(long = "strict")]
    pub strict: bool,

    pub data: String,

    pub template: Option<String>,
}

/// Plain text for a JSON scalar; containers keep their JSON form.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parse_assignment(spec: &str) -> kit::Result<(String, String)> {
    match spec.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(Error::invalid_argument("variable", spec)),
    }
}

/// Values for `filltemplate`: environment, then JSON, then `-v`, later
/// sources winning.
pub fn fill_variables(
    env: bool,
    json: Option<&Value>,
    assignments: &[String],
) -> kit::Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    if env {
        vars.extend(std::env::vars());
    }
    match json {
        Some(Value::Object(map)) => {
            vars.extend(map.iter().map(|(k, v)| (k.clone(), scalar_text(v))));
        }
        Some(_) => return Err(Error::usage("JSON data must be an object")),
        None => {}
    }
    for spec in assignments {
        let (key, value) = parse_assignment(spec)?;
        vars.insert(key, value);
    }
    Ok(vars)
}

/// Context for `template`: environment names under the JSON data.
pub fn context(data: Option<Value>, env: bool) -> kit::Result<Value> {
    let mut context = Map::new();
    if env {
        context.extend(std::env::vars().map(|(k, v)| (k, Value::String(v))));
    }
    match data {
        Some(Value::Object(map)) => context.extend(map),
        Some(Value::Null) | None => {}
        Some(_) => return Err(Error::usage("JSON data must be an object")),
    }
    Ok(Value::Object(context))
}

fn emit(rendered: &str) -> CmdResult {
    let mut out = io::stdout();
    out.write_all(rendered.as_bytes())?;
    out.flush()?;
    Ok(0)
}

pub fn run_filltemplate(args: FilltemplateArgs) -> CmdResult {
    let missing = MissingPolicy::parse(&args.missing)?;
    let json = args.json.as_deref().map(read_json).transpose()?;
    let vars = fill_variables(args.env, json.as_ref(), &args.vars)?;
    let text = io::read_text(args.file.as_deref().unwrap_or(io::STDIN))?;
    emit(&template::render_map(&text, &vars, missing)?)
}

pub fn run_template(args: TemplateArgs) -> CmdResult {
    let data = args
        .data
        .as_deref()
        .map(|raw| serde_json::from_str::<Value>(raw).map_err(|e| Error::invalid_json("-d", &e)))
        .transpose()?;
    let source = match args.string {
        Some(s) => s,
        None => io::read_text(args.file.as_deref().unwrap_or(io::STDIN))?,
    };
    let ctx = context(data, args.env)?;
    emit(&template::render_template(&source, &ctx, args.strict)?)
}

pub fn run_jsontemplate(args: JsontemplateArgs) -> CmdResult {
    if args.data == io::STDIN && args.template.as_deref().unwrap_or(io::STDIN) == io::STDIN {
        return Err(Error::usage("data and template cannot both come from standard input"));
    }
    let data = read_json(&args.data)?;
    let source = io::read_text(args.template.as_deref().unwrap_or(io::STDIN))?;
    let ctx = context(Some(data), false)?;
    emit(&template::render_template(&source, &ctx, args.strict)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assignments_override_json() {
        let data = json!({"name": "json", "n": 3, "none": null});
        let vars = fill_variables(false, Some(&data), &["name=cli".to_string()]).unwrap();
        assert_eq!(vars["name"], "cli");
        assert_eq!(vars["n"], "3");
        assert_eq!(vars["none"], "");
    }

    #[test]
    fn malformed_assignment_is_rejected() {
        assert!(fill_variables(false, None, &["=x".to_string()]).is_err());
        assert!(fill_variables(false, None, &["novalue".to_string()]).is_err());
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert!(fill_variables(false, Some(&json!([1])), &[]).is_err());
        assert!(context(Some(json!("x")), false).is_err());
    }

    #[test]
    fn fill_renders_with_policy() {
        let vars = fill_variables(false, None, &["who=world".to_string()]).unwrap();
        let out = template::render_map("hello {{who}} {{other}}", &vars, MissingPolicy::Empty).unwrap();
        assert_eq!(out, "hello world ");
    }

    #[test]
    fn json_data_wins_over_environment() {
        std::env::set_var("KIT_TEMPLATE_TEST_NAME", "env");
        let ctx = context(Some(json!({"KIT_TEMPLATE_TEST_NAME": "json"})), true).unwrap();
        assert_eq!(ctx["KIT_TEMPLATE_TEST_NAME"], "json");
        assert!(ctx.get("PATH").is_some() || std::env::var("PATH").is_err());
    }

    #[test]
    fn template_renders_context() {
        let ctx = context(Some(json!({"items": ["a", "b"]})), false).unwrap();
        let out = template::render_template(
            "{% for i in items %}{{ i|upper }}{% endfor %}",
            &ctx,
            false,
        )
        .unwrap();
        assert_eq!(out, "AB");
    }
}
