use clap::Parser;
use regex::Regex;

use kit::{csv, io, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Substitute text within a single column")]
pub struct ColreplaceArgs {
    /// Field delimiter
    #[arg(short = 'd', long = "delimiter", default_value = ",")]
    pub delimiter: String,

    /// First line is a header; COLUMN may name a header field
    #[arg(short = 'H', long = "header")]
    pub header: bool,

    /// Treat PATTERN as a regular expression
    #[arg(short = 'e', long = "regex")]
    pub regex: bool,

    /// Column number (1-based) or header name
    pub column: String,

    pub pattern: String,

    pub replacement: String,

    pub files: Vec<String>,
}

#[derive(Debug)]
pub enum Matcher {
    Literal(String),
    Pattern(Regex),
}

impl Matcher {
    pub fn new(pattern: &str, regex: bool) -> Result<Self> {
        if regex {
            Regex::new(pattern)
                .map(Matcher::Pattern)
                .map_err(|e| Error::invalid_pattern(pattern, e))
        } else {
            Ok(Matcher::Literal(pattern.to_string()))
        }
    }

    pub fn replace(&self, field: &str, replacement: &str) -> String {
        match self {
            Matcher::Literal(p) if p.is_empty() => field.to_string(),
            Matcher::Literal(p) => field.replace(p.as_str(), replacement),
            Matcher::Pattern(re) => re.replace_all(field, replacement).into_owned(),
        }
    }
}

/// Replace within field `column` (0-based); lines without that field pass
/// through untouched.
pub fn replace_in_column(
    line: &str,
    delimiter: char,
    column: usize,
    matcher: &Matcher,
    replacement: &str,
) -> String {
    let mut fields: Vec<String> = line.split(delimiter).map(str::to_string).collect();
    if let Some(field) = fields.get_mut(column) {
        *field = matcher.replace(field, replacement);
    }
    fields.join(&delimiter.to_string())
}

pub fn run(args: ColreplaceArgs) -> CmdResult {
    let delimiter = csv::delimiter_from_arg(&args.delimiter);
    let matcher = Matcher::new(&args.pattern, args.regex)?;
    let mut column: Option<usize> = if args.header {
        None
    } else {
        Some(
            csv::resolve_column(&args.column, None)
                .ok_or_else(|| Error::invalid_argument("column", &args.column))?,
        )
    };

    let mut status_error = None;
    let status = io::map_lines("colreplace", &args.files, |line| {
        let Some(col) = column else {
            let header: Vec<String> = line.split(delimiter).map(str::to_string).collect();
            match csv::resolve_column(&args.column, Some(&header)) {
                Some(c) => column = Some(c),
                None => status_error = Some(Error::invalid_argument("column", &args.column)),
            }
            return Some(line.to_string());
        };
        Some(replace_in_column(line, delimiter, col, &matcher, &args.replacement))
    })?;
    match status_error {
        Some(err) => Err(err),
        None => Ok(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_replacement_in_one_column() {
        let m = Matcher::new("a", false).unwrap();
        assert_eq!(replace_in_column("a,a,a", ',', 1, &m, "x"), "a,x,a");
    }

    #[test]
    fn regex_replacement_with_groups() {
        let m = Matcher::new(r"(\d+)-(\d+)", true).unwrap();
        assert_eq!(
            replace_in_column("id;10-20", ';', 1, &m, "$2-$1"),
            "id;20-10"
        );
    }

    #[test]
    fn missing_column_passes_through() {
        let m = Matcher::new("a", false).unwrap();
        assert_eq!(replace_in_column("a,b", ',', 5, &m, "x"), "a,b");
    }
}
