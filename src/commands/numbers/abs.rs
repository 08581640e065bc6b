use clap::Parser;

use kit::{Error, Result};

use super::each_value;
use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Absolute value of each number")]
pub struct AbsArgs {
    #[arg(allow_negative_numbers = true)]
    pub numbers: Vec<String>,
}

/// Integers keep integer formatting; anything with a dot or exponent is
/// treated as a float.
pub fn absolute(input: &str) -> Result<String> {
    let s = input.strip_prefix('+').unwrap_or(input);
    if !s.contains(['.', 'e', 'E']) {
        if let Ok(n) = s.parse::<i128>() {
            return Ok(n.unsigned_abs().to_string());
        }
    }
    let value: f64 = s.parse().map_err(|_| Error::invalid_number(input))?;
    if !value.is_finite() {
        return Err(Error::invalid_number(input));
    }
    Ok(format!("{}", value.abs()))
}

pub fn run(args: AbsArgs) -> CmdResult {
    each_value("abs", &args.numbers, absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_stay_integers() {
        assert_eq!(absolute("-42").unwrap(), "42");
        assert_eq!(absolute("+7").unwrap(), "7");
        assert_eq!(absolute("-9223372036854775808").unwrap(), "9223372036854775808");
    }

    #[test]
    fn floats() {
        assert_eq!(absolute("-2.50").unwrap(), "2.5");
        assert_eq!(absolute("-1e3").unwrap(), "1000");
    }

    #[test]
    fn junk_is_rejected() {
        assert!(absolute("abc").is_err());
        assert!(absolute("nan").is_err());
    }
}
