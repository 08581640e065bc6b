use clap::{Parser, ValueEnum};
use serde_json::{Map, Value};

use kit::{io, Error};

use crate::commands::CmdResult;

use super::read_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Kv,
    Json,
    Env,
}

#[derive(Parser, Debug)]
#[command(about = "Flatten nested JSON into key/value pairs")]
pub struct FlattenArgs {
    /// Key separator
    #[arg(short = 's', long = "separator", default_value = ".")]
    pub separator: String,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = Format::Kv)]
    pub format: Format,

    pub file: Option<String>,
}

/// Leaf paths in document order. Array indices become path segments;
/// empty containers are leaves.
pub fn flatten(value: &Value, separator: &str) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    walk(value, String::new(), separator, &mut out);
    out
}

fn join(prefix: &str, key: &str, separator: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}{}{}", prefix, separator, key)
    }
}

fn walk(value: &Value, prefix: String, separator: &str, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                walk(child, join(&prefix, key, separator), separator, out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, child) in items.iter().enumerate() {
                walk(child, join(&prefix, &i.to_string(), separator), separator, out);
            }
        }
        leaf => out.push((prefix, leaf.clone())),
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `a.b-c` becomes `A_B_C`.
pub fn env_name(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn env_value(value: &Value) -> String {
    let mut escaped = String::new();
    for c in plain(value).chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn render(pairs: &[(String, Value)], format: Format) -> kit::Result<Vec<String>> {
    Ok(match format {
        Format::Kv => pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, plain(v)))
            .collect(),
        Format::Env => pairs
            .iter()
            .map(|(k, v)| format!("export {}=\"{}\"", env_name(k), env_value(v)))
            .collect(),
        Format::Json => {
            let map: Map<String, Value> = pairs.iter().cloned().collect();
            let text = serde_json::to_string_pretty(&Value::Object(map))
                .map_err(|e| Error::runtime(format!("cannot encode JSON: {}", e)))?;
            vec![text]
        }
    })
}

pub fn run(args: FlattenArgs) -> CmdResult {
    let value = read_json(args.file.as_deref().unwrap_or(io::STDIN))?;
    let pairs = flatten(&value, &args.separator);
    let mut out = io::stdout();
    io::write_lines(&mut out, render(&pairs, args.format)?)?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kv(value: Value, sep: &str) -> Vec<String> {
        render(&flatten(&value, sep), Format::Kv).unwrap()
    }

    #[test]
    fn nested_objects_and_arrays() {
        let doc = json!({"a": {"b": 1, "c": [true, "x"]}, "d": null});
        assert_eq!(kv(doc, "."), vec!["a.b=1", "a.c.0=true", "a.c.1=x", "d=null"]);
    }

    #[test]
    fn custom_separator() {
        assert_eq!(kv(json!({"a": {"b": 2}}), "/"), vec!["a/b=2"]);
    }

    #[test]
    fn empty_containers_are_leaves() {
        assert_eq!(kv(json!({"o": {}, "l": []}), "."), vec!["o={}", "l=[]"]);
    }

    #[test]
    fn env_format_uppercases_and_escapes() {
        let pairs = flatten(&json!({"db": {"pass-word": "a\"$b"}}), ".");
        assert_eq!(
            render(&pairs, Format::Env).unwrap(),
            vec!["export DB_PASS_WORD=\"a\\\"\\$b\""]
        );
    }

    #[test]
    fn json_format_is_flat_object() {
        let pairs = flatten(&json!({"a": [1, 2]}), ".");
        let text = render(&pairs, Format::Json).unwrap().remove(0);
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, json!({"a.0": 1, "a.1": 2}));
    }
}
