use clap::Parser;
use serde_json::Value;

use kit::io;

use crate::commands::CmdResult;

use super::read_json;

/// Longest JSON rendering shown for a leaf value.
const VALUE_PREVIEW: usize = 60;

#[derive(Parser, Debug)]
#[command(about = "List the key paths of a JSON document")]
pub struct JsonkeysArgs {
    /// Only list leaf values
    #[arg(short = 'l', long = "leaves")]
    pub leaves: bool,

    /// Show the JSON type of each path
    #[arg(short = 't', long = "types")]
    pub types: bool,

    pub file: Option<String>,
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}

fn is_leaf(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => true,
    }
}

/// Every path below the root in document order, containers before their
/// children.
pub fn paths(value: &Value) -> Vec<(String, &Value)> {
    let mut out = Vec::new();
    collect(value, "", &mut out);
    out
}

fn collect<'a>(value: &'a Value, prefix: &str, out: &mut Vec<(String, &'a Value)>) {
    let children: Vec<(String, &Value)> = match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items.iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect(),
        _ => return,
    };
    for (key, child) in children {
        let path = if prefix.is_empty() {
            key
        } else {
            format!("{}.{}", prefix, key)
        };
        out.push((path.clone(), child));
        collect(child, &path, out);
    }
}

fn preview(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= VALUE_PREVIEW {
        return text;
    }
    let cut: String = text.chars().take(VALUE_PREVIEW).collect();
    format!("{}...", cut)
}

pub fn render(value: &Value, leaves: bool, types: bool) -> Vec<String> {
    paths(value)
        .into_iter()
        .filter(|(_, v)| !leaves || is_leaf(v))
        .map(|(path, v)| match (leaves, types) {
            (true, true) => format!("{}: {} = {}", path, type_name(v), preview(v)),
            (false, true) => format!("{}: {}", path, type_name(v)),
            _ => path,
        })
        .collect()
}

pub fn run(args: JsonkeysArgs) -> CmdResult {
    let value = read_json(args.file.as_deref().unwrap_or(io::STDIN))?;
    let mut out = io::stdout();
    io::write_lines(&mut out, render(&value, args.leaves, args.types))?;
    Ok(0)
}
