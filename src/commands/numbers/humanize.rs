use std::time::Duration;

use clap::{Parser, ValueEnum};

use kit::{humanize, parser, Error, Result};

use super::each_value;
use crate::commands::CmdResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Bytes,
    Count,
    Duration,
}

#[derive(Parser, Debug)]
#[command(about = "Pretty-print byte sizes, counts and durations")]
pub struct HumanizeArgs {
    #[arg(value_enum)]
    pub kind: Kind,

    /// Values; stdin lines when omitted. Durations are seconds or `1h30m`
    #[arg(allow_negative_numbers = true)]
    pub values: Vec<String>,
}

/// `90`, `1.5`, `2h`, or compound `1h30m15s`.
fn parse_seconds(input: &str) -> Result<Duration> {
    if let Ok(secs) = input.parse::<f64>() {
        if secs.is_finite() && secs >= 0.0 {
            return Ok(Duration::from_secs_f64(secs));
        }
        return Err(Error::invalid_value("duration", input));
    }
    let mut total = Duration::ZERO;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        if c.is_ascii_alphabetic() || c == 'µ' {
            let next = input[i + c.len_utf8()..].chars().next();
            if next.is_some_and(|n| n.is_ascii_alphabetic()) {
                continue;
            }
            total += parser::parse_duration(&input[start..i + c.len_utf8()])?;
            start = i + c.len_utf8();
        }
    }
    if start != input.len() || start == 0 {
        return Err(Error::invalid_value("duration", input));
    }
    Ok(total)
}

pub fn humanize_value(kind: Kind, input: &str) -> Result<String> {
    match kind {
        Kind::Bytes => Ok(humanize::bytes(parser::parse_float(input)?)),
        Kind::Count => Ok(humanize::count(parser::parse_float(input)?)),
        Kind::Duration => Ok(humanize::duration(parse_seconds(input)?)),
    }
}

pub fn run(args: HumanizeArgs) -> CmdResult {
    let kind = args.kind;
    each_value("humanize", &args.values, |v| humanize_value(kind, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_and_counts() {
        assert_eq!(humanize_value(Kind::Bytes, "1536").unwrap(), "1.50 KiB");
        assert_eq!(humanize_value(Kind::Count, "1200000").unwrap(), "1.2M");
    }

    #[test]
    fn durations() {
        assert_eq!(humanize_value(Kind::Duration, "3725").unwrap(), "1h 2m 5s");
        assert_eq!(humanize_value(Kind::Duration, "1h30m").unwrap(), "1h 30m");
        assert_eq!(humanize_value(Kind::Duration, "250ms").unwrap(), "250ms");
    }

    #[test]
    fn bad_input() {
        assert!(humanize_value(Kind::Bytes, "lots").is_err());
        assert!(humanize_value(Kind::Duration, "-5").is_err());
        assert!(humanize_value(Kind::Duration, "5x").is_err());
    }
}
