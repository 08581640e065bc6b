use std::collections::HashSet;

use clap::Parser;
use regex::Regex;

use kit::{io, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Keep lines matching every include and no exclude pattern")]
pub struct LinefilterArgs {
    /// Keep lines matching PATTERN (repeatable, all must match)
    #[arg(short = 'i', long = "include", value_name = "PATTERN")]
    pub include: Vec<String>,

    /// Drop lines matching PATTERN (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Keep only lines that parse as a number
    #[arg(short = 'N', long = "numeric")]
    pub numeric: bool,

    /// Drop blank lines
    #[arg(short = 'b', long = "no-blank")]
    pub no_blank: bool,

    /// Drop lines already seen
    #[arg(short = 'u', long = "unique")]
    pub unique: bool,

    /// Minimum line length in characters
    #[arg(long = "min", value_name = "N")]
    pub min: Option<usize>,

    /// Maximum line length in characters
    #[arg(long = "max", value_name = "N")]
    pub max: Option<usize>,

    pub files: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Filter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    numeric: bool,
    no_blank: bool,
    unique: bool,
    min: Option<usize>,
    max: Option<usize>,
    seen: HashSet<String>,
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(|e| Error::invalid_pattern(p, e)))
        .collect()
}

impl Filter {
    pub fn from_args(args: &LinefilterArgs) -> Result<Self> {
        Ok(Filter {
            include: compile(&args.include)?,
            exclude: compile(&args.exclude)?,
            numeric: args.numeric,
            no_blank: args.no_blank,
            unique: args.unique,
            min: args.min,
            max: args.max,
            seen: HashSet::new(),
        })
    }

    pub fn accept(&mut self, line: &str) -> bool {
        if self.no_blank && line.trim().is_empty() {
            return false;
        }
        if self.numeric && line.trim().parse::<f64>().is_err() {
            return false;
        }
        let len = line.chars().count();
        if self.min.is_some_and(|m| len < m) || self.max.is_some_and(|m| len > m) {
            return false;
        }
        if !self.include.iter().all(|re| re.is_match(line)) {
            return false;
        }
        if self.exclude.iter().any(|re| re.is_match(line)) {
            return false;
        }
        !self.unique || self.seen.insert(line.to_string())
    }
}

pub fn run(args: LinefilterArgs) -> CmdResult {
    let mut filter = Filter::from_args(&args)?;
    io::map_lines("linefilter", &args.files, |line| {
        filter.accept(line).then(|| line.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(include: &[&str], exclude: &[&str]) -> Filter {
        Filter {
            include: include.iter().map(|p| Regex::new(p).unwrap()).collect(),
            exclude: exclude.iter().map(|p| Regex::new(p).unwrap()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn includes_are_anded() {
        let mut f = filter(&["a", "b"], &[]);
        assert!(f.accept("ab"));
        assert!(!f.accept("a"));
    }

    #[test]
    fn excludes_win() {
        let mut f = filter(&["error"], &["ignored"]);
        assert!(f.accept("error here"));
        assert!(!f.accept("error ignored"));
    }

    #[test]
    fn numeric_blank_unique_and_length() {
        let mut f = Filter {
            numeric: true,
            unique: true,
            ..Default::default()
        };
        assert!(f.accept("3.5"));
        assert!(!f.accept("3.5"));
        assert!(!f.accept("abc"));

        let mut f = Filter {
            no_blank: true,
            min: Some(2),
            max: Some(3),
            ..Default::default()
        };
        assert!(!f.accept("   "));
        assert!(!f.accept("a"));
        assert!(f.accept("abc"));
        assert!(!f.accept("abcd"));
    }
}
