use std::io::Write;

use clap::Parser;
use serde_json::Value;

use kit::{io, Error};

use crate::commands::CmdResult;

use super::read_json;

#[derive(Parser, Debug)]
#[command(about = "Deep-merge JSON documents; later files win")]
pub struct JsonmergeArgs {
    /// Pretty-print the result
    #[arg(short = 'p', long = "pretty")]
    pub pretty: bool,

    #[arg(required = true)]
    pub files: Vec<String>,
}

/// Merge `overlay` into `base`. Objects merge key by key; anything else,
/// arrays included, is replaced.
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

pub fn run(args: JsonmergeArgs) -> CmdResult {
    let mut merged = Value::Null;
    for (i, path) in args.files.iter().enumerate() {
        let doc = read_json(path)?;
        if i == 0 {
            merged = doc;
        } else {
            merge(&mut merged, doc);
        }
    }

    let text = if args.pretty {
        serde_json::to_string_pretty(&merged)
    } else {
        serde_json::to_string(&merged)
    }
    .map_err(|e| Error::runtime(format!("cannot encode JSON: {}", e)))?;

    let mut out = io::stdout();
    writeln!(out, "{}", text)?;
    out.flush()?;
    Ok(0)
}
