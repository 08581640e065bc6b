use std::io::Write;

use clap::Parser;

use kit::{io, parser, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Convert a number between bases 2..36")]
pub struct NumbaseArgs {
    /// Number; 0x, 0b and 0o prefixes select the base when FROM is omitted
    #[arg(allow_negative_numbers = true)]
    pub number: String,

    /// Source base (default: from prefix, else 10)
    pub from: Option<u32>,

    /// Target base; when omitted every common base is printed
    pub to: Option<u32>,
}

fn check_base(base: u32) -> Result<u32> {
    if (2..=36).contains(&base) {
        Ok(base)
    } else {
        Err(Error::invalid_argument("base", base.to_string()))
    }
}

/// Parse `input` in `base`, or by prefix when `base` is `None`.
pub fn parse_in(input: &str, base: Option<u32>) -> Result<i128> {
    let s = input.trim();
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, digits) = match base {
        Some(b) => {
            let (prefix_radix, rest) = parser::split_radix(body);
            if prefix_radix == b {
                (b, rest)
            } else {
                (b, body)
            }
        }
        None => parser::split_radix(body),
    };
    let magnitude = u64::from_str_radix(&digits.replace('_', ""), check_base(radix)?)
        .map_err(|_| Error::invalid_number(input))?;
    let value = magnitude as i128;
    Ok(if negative { -value } else { value })
}

pub fn to_base(value: i128, base: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut n = value.unsigned_abs();
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % base as u128) as usize]);
        n /= base as u128;
    }
    if value < 0 {
        out.push(b'-');
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

pub fn dump(value: i128) -> Vec<String> {
    let mut lines = vec![
        format!("dec:    {}", value),
        format!("hex:    0x{}", to_base(value, 16)),
        format!("oct:    0o{}", to_base(value, 8)),
        format!("bin:    0b{}", to_base(value, 2)),
        format!("base36: {}", to_base(value, 36)),
    ];
    if let Some(c) = u32::try_from(value).ok().and_then(char::from_u32) {
        if !c.is_control() {
            lines.push(format!("ascii:  {}", c));
        }
    }
    lines
}

pub fn run(args: NumbaseArgs) -> CmdResult {
    let from = args.from.map(check_base).transpose()?;
    let value = parse_in(&args.number, from)?;
    let mut out = io::stdout();
    match args.to {
        Some(to) => writeln!(out, "{}", to_base(value, check_base(to)?))?,
        None => io::write_lines(&mut out, dump(value))?,
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_bases() {
        assert_eq!(to_base(parse_in("ff", Some(16)).unwrap(), 2), "11111111");
        assert_eq!(to_base(parse_in("z", Some(36)).unwrap(), 10), "35");
        assert_eq!(to_base(parse_in("0x1f", Some(16)).unwrap(), 10), "31");
    }

    #[test]
    fn prefix_detection() {
        assert_eq!(parse_in("0b101", None).unwrap(), 5);
        assert_eq!(parse_in("0o17", None).unwrap(), 15);
        assert_eq!(parse_in("-0x10", None).unwrap(), -16);
        assert_eq!(parse_in("42", None).unwrap(), 42);
    }

    #[test]
    fn digits_outside_base_fail() {
        assert!(parse_in("19", Some(8)).is_err());
        assert!(parse_in("1", Some(37)).is_err());
    }

    #[test]
    fn dump_lists_common_bases() {
        let lines = dump(65);
        assert_eq!(lines[0], "dec:    65");
        assert_eq!(lines[1], "hex:    0x41");
        assert_eq!(lines[4], "base36: 1t");
        assert_eq!(lines[5], "ascii:  A");
        assert_eq!(dump(10).len(), 5);
    }
}
