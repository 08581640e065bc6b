use std::cmp::Ordering;
use std::io::Write;

use clap::Parser;

use kit::{io, parser};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Sort lines of text (stable)")]
pub struct SortArgs {
    /// Reverse the result of comparisons
    #[arg(short = 'r', long = "reverse")]
    pub reverse: bool,

    /// Compare by leading numeric value
    #[arg(short = 'n', long = "numeric-sort")]
    pub numeric: bool,

    /// Output only the first of an equal run
    #[arg(short = 'u', long = "unique")]
    pub unique: bool,

    /// Fold lower case to upper case when comparing
    #[arg(short = 'f', long = "ignore-case")]
    pub ignore_case: bool,

    /// Sort by field N (1-based)
    #[arg(short = 'k', long = "key", value_name = "N")]
    pub key: Option<usize>,

    /// Field separator (default: runs of whitespace)
    #[arg(short = 't', long = "field-separator", value_name = "SEP")]
    pub separator: Option<String>,

    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SortKey {
    pub field: Option<usize>,
    pub separator: Option<String>,
    pub numeric: bool,
    pub ignore_case: bool,
}

impl SortKey {
    fn extract<'a>(&self, line: &'a str) -> &'a str {
        let Some(n) = self.field else {
            return line;
        };
        let idx = n.max(1) - 1;
        match &self.separator {
            Some(sep) => line.split(sep.as_str()).nth(idx).unwrap_or(""),
            None => line.split_whitespace().nth(idx).unwrap_or(""),
        }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let (ka, kb) = (self.extract(a), self.extract(b));
        if self.numeric {
            let na = parser::leading_float(ka).unwrap_or(0.0);
            let nb = parser::leading_float(kb).unwrap_or(0.0);
            return na.partial_cmp(&nb).unwrap_or(Ordering::Equal);
        }
        if self.ignore_case {
            return ka.to_uppercase().cmp(&kb.to_uppercase());
        }
        ka.cmp(kb)
    }
}

pub fn sort_lines(mut lines: Vec<String>, key: &SortKey, reverse: bool, unique: bool) -> Vec<String> {
    lines.sort_by(|a, b| {
        let ord = key.compare(a, b);
        if reverse {
            ord.reverse()
        } else {
            ord
        }
    });
    if unique {
        lines.dedup_by(|b, a| key.compare(a, b) == Ordering::Equal);
    }
    lines
}

pub fn run(args: SortArgs) -> CmdResult {
    let lines = io::read_all_lines(&args.files)?;
    let key = SortKey {
        field: args.key,
        separator: args.separator.as_deref().map(parser::unescape),
        numeric: args.numeric,
        ignore_case: args.ignore_case,
    };
    let mut out = io::stdout();
    io::write_lines(&mut out, sort_lines(lines, &key, args.reverse, args.unique))?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn lexical_sort() {
        let out = sort_lines(lines(&["b", "a", "c"]), &SortKey::default(), false, false);
        assert_eq!(out, lines(&["a", "b", "c"]));
    }

    #[test]
    fn numeric_sort_uses_prefix() {
        let key = SortKey {
            numeric: true,
            ..Default::default()
        };
        let out = sort_lines(lines(&["10 x", "9 y", "100"]), &key, false, false);
        assert_eq!(out, lines(&["9 y", "10 x", "100"]));
    }

    #[test]
    fn key_sort_is_stable() {
        let key = SortKey {
            field: Some(1),
            ..Default::default()
        };
        let out = sort_lines(lines(&["b 1", "a 2", "b 0", "a 1"]), &key, false, false);
        assert_eq!(out, lines(&["a 2", "a 1", "b 1", "b 0"]));
    }

    #[test]
    fn reverse_keeps_equal_keys_in_input_order() {
        let key = SortKey {
            field: Some(1),
            ..Default::default()
        };
        let out = sort_lines(lines(&["a 1", "b 1", "a 2"]), &key, true, false);
        assert_eq!(out, lines(&["b 1", "a 1", "a 2"]));
    }

    #[test]
    fn unique_is_idempotent() {
        let key = SortKey::default();
        let once = sort_lines(lines(&["b", "a", "b", "a"]), &key, false, true);
        assert_eq!(once, lines(&["a", "b"]));
        assert_eq!(sort_lines(once.clone(), &key, false, true), once);
    }

    #[test]
    fn custom_separator() {
        let key = SortKey {
            field: Some(2),
            separator: Some(",".to_string()),
            ..Default::default()
        };
        let out = sort_lines(lines(&["x,b", "y,a"]), &key, false, false);
        assert_eq!(out, lines(&["y,a", "x,b"]));
    }
}
