use clap::Parser;
use regex::Regex;

use kit::{io, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Add or remove line numbers")]
pub struct LinenumArgs {
    /// Remove leading line numbers instead of adding them
    #[arg(short = 'r', long = "remove")]
    pub remove: bool,

    /// First line number
    #[arg(short = 's', long = "start", default_value_t = 1, allow_negative_numbers = true)]
    pub start: i64,

    /// Increment between lines
    #[arg(long = "step", default_value_t = 1, allow_negative_numbers = true)]
    pub step: i64,

    /// printf-style number format; `%d` is replaced by the number
    #[arg(short = 'f', long = "format", default_value = "%4d  ")]
    pub format: String,

    pub files: Vec<String>,
}

/// A `%[0][width]d` directive with literal text around it.
#[derive(Debug, Clone)]
pub struct NumberFormat {
    prefix: String,
    suffix: String,
    width: usize,
    zero: bool,
    left: bool,
}

impl NumberFormat {
    pub fn parse(spec: &str) -> Result<Self> {
        let re = Regex::new(r"%(-?)(0?)(\d*)d").map_err(|e| Error::invalid_pattern("%d", e))?;
        let caps = re
            .captures(spec)
            .ok_or_else(|| Error::invalid_value("format", spec))?;
        let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        Ok(NumberFormat {
            prefix: spec[..whole.start].to_string(),
            suffix: spec[whole.end..].to_string(),
            width: caps[3].parse().unwrap_or(0),
            zero: !caps[2].is_empty() && caps[1].is_empty(),
            left: !caps[1].is_empty(),
        })
    }

    pub fn render(&self, n: i64) -> String {
        let number = if self.zero {
            format!("{:0width$}", n, width = self.width)
        } else if self.left {
            format!("{:<width$}", n, width = self.width)
        } else {
            format!("{:>width$}", n, width = self.width)
        };
        format!("{}{}{}", self.prefix, number, self.suffix)
    }
}

/// Strip a leading number and its punctuation (`12: `, `  3. `, `7) `).
pub fn strip_number(line: &str) -> &str {
    let trimmed = line.trim_start();
    let digits = trimmed.len() - trimmed.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return line;
    }
    let rest = &trimmed[digits..];
    let rest = rest.strip_prefix(&[':', '.', ')', ']', '\t'][..]).unwrap_or(rest);
    rest.trim_start_matches(' ')
}

pub fn run(args: LinenumArgs) -> CmdResult {
    if args.remove {
        return io::map_lines("linenum", &args.files, |line| {
            Some(strip_number(line).to_string())
        });
    }
    let format = NumberFormat::parse(&args.format)?;
    let mut n = args.start;
    io::map_lines("linenum", &args.files, |line| {
        let numbered = format!("{}{}", format.render(n), line);
        n += args.step;
        Some(numbered)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_format_pads() {
        let f = NumberFormat::parse("%4d  ").unwrap();
        assert_eq!(f.render(7), "   7  ");
    }

    #[test]
    fn zero_padded_with_literals() {
        let f = NumberFormat::parse("[%03d] ").unwrap();
        assert_eq!(f.render(5), "[005] ");
    }

    #[test]
    fn format_without_directive_is_rejected() {
        assert!(NumberFormat::parse("line").is_err());
    }

    #[test]
    fn removes_leading_numbers() {
        assert_eq!(strip_number("   1  hello"), "hello");
        assert_eq!(strip_number("12: text"), "text");
        assert_eq!(strip_number("no number"), "no number");
    }
}
