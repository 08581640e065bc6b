use std::cmp::Ordering;
use std::io::Write;

use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Binary search a sorted file for lines with a given key")]
pub struct BsearchArgs {
    /// Case-insensitive comparison (the file must be sorted that way)
    #[arg(short = 'i', long = "ignore-case")]
    pub ignore_case: bool,

    /// Compare on field N (1-based) instead of the whole line
    #[arg(short = 'f', long = "field", value_name = "N")]
    pub field: Option<usize>,

    /// Field delimiter (default: whitespace)
    #[arg(short = 'd', long = "delimiter")]
    pub delimiter: Option<String>,

    pub key: String,

    pub file: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct KeySpec {
    pub field: Option<usize>,
    pub delimiter: Option<String>,
    pub ignore_case: bool,
}

impl KeySpec {
    pub fn extract(&self, line: &str) -> String {
        let key = match self.field {
            None => line,
            Some(n) => {
                let idx = n.saturating_sub(1);
                match &self.delimiter {
                    Some(d) => line.split(d.as_str()).nth(idx).unwrap_or(""),
                    None => line.split_whitespace().nth(idx).unwrap_or(""),
                }
            }
        };
        if self.ignore_case {
            key.to_lowercase()
        } else {
            key.to_string()
        }
    }
}

/// Every line whose key equals `key`, found by binary search.
pub fn search<'a>(lines: &'a [String], key: &str, spec: &KeySpec) -> &'a [String] {
    let key = if spec.ignore_case {
        key.to_lowercase()
    } else {
        key.to_string()
    };
    let start = lines.partition_point(|l| spec.extract(l).as_str().cmp(&key) == Ordering::Less);
    let end = start
        + lines[start..].partition_point(|l| spec.extract(l).as_str().cmp(&key) != Ordering::Greater);
    &lines[start..end]
}

pub fn run(args: BsearchArgs) -> CmdResult {
    let file = args.file.clone().unwrap_or_else(|| io::STDIN.to_string());
    let lines = io::read_lines(&file)?;
    let spec = KeySpec {
        field: args.field,
        delimiter: args.delimiter.clone(),
        ignore_case: args.ignore_case,
    };
    let found = search(&lines, &args.key, &spec);
    let mut out = io::stdout();
    io::write_lines(&mut out, found)?;
    out.flush()?;
    Ok(if found.is_empty() { 1 } else { 0 })
}
