use std::collections::HashMap;
use std::io::Write;

use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Remove duplicate lines anywhere in the input, keeping first-seen order")]
pub struct DedupArgs {
    /// Compare case-insensitively
    #[arg(short = 'i', long = "ignore-case")]
    pub ignore_case: bool,

    /// Prefix lines by their number of occurrences
    #[arg(short = 'c', long = "count")]
    pub count: bool,

    /// Only print lines that occur more than once
    #[arg(short = 'd', long = "repeated")]
    pub repeated: bool,

    /// Only print lines that occur exactly once
    #[arg(short = 'u', long = "unique")]
    pub unique: bool,

    /// Ignore the first N whitespace-separated fields when comparing
    #[arg(short = 'f', long = "skip-fields", value_name = "N", default_value_t = 0)]
    pub skip_fields: usize,

    pub files: Vec<String>,
}

/// The part of `line` that takes part in comparisons.
pub fn comparison_key(line: &str, skip_fields: usize, ignore_case: bool) -> String {
    let mut rest = line;
    for _ in 0..skip_fields {
        rest = rest.trim_start();
        match rest.find(char::is_whitespace) {
            Some(idx) => rest = &rest[idx..],
            None => {
                rest = "";
                break;
            }
        }
    }
    if ignore_case {
        rest.to_lowercase()
    } else {
        rest.to_string()
    }
}

/// `(count, first occurrence)` per distinct key, in first-seen order.
pub fn tally(lines: &[String], skip_fields: usize, ignore_case: bool) -> Vec<(usize, String)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<(usize, String)> = Vec::new();
    for line in lines {
        let key = comparison_key(line, skip_fields, ignore_case);
        match index.get(&key) {
            Some(&i) => out[i].0 += 1,
            None => {
                index.insert(key, out.len());
                out.push((1, line.clone()));
            }
        }
    }
    out
}

pub fn run(args: DedupArgs) -> CmdResult {
    let lines = io::read_all_lines(&args.files)?;
    let tallied = tally(&lines, args.skip_fields, args.ignore_case);
    let mut out = io::stdout();
    for (n, line) in tallied {
        if (args.repeated && n < 2) || (args.unique && n != 1) {
            continue;
        }
        if args.count {
            writeln!(out, "{:>7} {}", n, line)?;
        } else {
            writeln!(out, "{}", line)?;
        }
    }
    out.flush()?;
    Ok(0)
}
