//! Value grammars shared by every tool: integers with radix prefixes,
//! durations and byte sizes.

use std::time::Duration;

use crate::error::{Error, Result};

/// Parse a signed integer. Accepts decimal, `0x`, `0b` and `0o` prefixes
/// (either case) and an optional sign. A leading `0` is still decimal.
pub fn parse_int(input: &str) -> Result<i64> {
    let s = input.trim();
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let magnitude = parse_uint_body(body).ok_or_else(|| Error::invalid_number(input))?;
    if negative {
        if magnitude == (i64::MAX as u64) + 1 {
            return Ok(i64::MIN);
        }
        i64::try_from(magnitude)
            .map(|v| -v)
            .map_err(|_| Error::invalid_number(input))
    } else {
        i64::try_from(magnitude).map_err(|_| Error::invalid_number(input))
    }
}

/// Parse an unsigned 64-bit integer with the same prefix rules.
pub fn parse_uint(input: &str) -> Result<u64> {
    let s = input.trim();
    let body = s.strip_prefix('+').unwrap_or(s);
    parse_uint_body(body).ok_or_else(|| Error::invalid_number(input))
}

fn parse_uint_body(body: &str) -> Option<u64> {
    let (radix, digits) = split_radix(body);
    if digits.is_empty() {
        return None;
    }
    let digits = digits.replace('_', "");
    u64::from_str_radix(&digits, radix).ok()
}

/// Split a `0x`/`0b`/`0o` prefix off a literal, returning the radix.
pub fn split_radix(body: &str) -> (u32, &str) {
    let lower = body.get(..2).map(|p| p.to_ascii_lowercase());
    match lower.as_deref() {
        Some("0x") => (16, &body[2..]),
        Some("0b") => (2, &body[2..]),
        Some("0o") => (8, &body[2..]),
        _ => (10, body),
    }
}

/// Parse a count that must be non-negative, for `-n N` style options.
pub fn parse_count(input: &str) -> Result<usize> {
    let value = parse_int(input)?;
    usize::try_from(value).map_err(|_| Error::invalid_number(input))
}

/// Parse a duration: `1.5` (seconds), `250ms`, `10us`, `10µs`, `3s`, `2m`,
/// `1h`, `1d`.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let s = input.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let value: f64 = number
        .parse()
        .map_err(|_| Error::invalid_value("time interval", input))?;
    let scale = match unit {
        "" | "s" => 1.0,
        "ms" => 1e-3,
        "us" | "µs" | "μs" => 1e-6,
        "ns" => 1e-9,
        "m" => 60.0,
        "h" => 3600.0,
        "d" => 86400.0,
        _ => return Err(Error::invalid_value("time interval", input)),
    };
    let secs = value * scale;
    if !secs.is_finite() || secs < 0.0 {
        return Err(Error::invalid_value("time interval", input));
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Parse a byte size with optional suffix: `K M G T` (and `KiB`...) are
/// powers of 1024, `KB MB GB TB` powers of 1000. A trailing `B` alone is
/// bytes.
pub fn parse_size(input: &str) -> Result<u64> {
    let s = input.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (number, suffix) = s.split_at(split);
    if number.is_empty() {
        return Err(Error::invalid_value("size", input));
    }
    let value: u64 = number
        .parse()
        .map_err(|_| Error::invalid_value("size", input))?;
    let multiplier: u64 = match suffix.to_ascii_uppercase().as_str() {
        "" | "B" | "C" => 1,
        "W" => 2,
        "K" | "KIB" => 1 << 10,
        "M" | "MIB" => 1 << 20,
        "G" | "GIB" => 1 << 30,
        "T" | "TIB" => 1 << 40,
        "KB" => 1_000,
        "MB" => 1_000_000,
        "GB" => 1_000_000_000,
        "TB" => 1_000_000_000_000,
        _ => return Err(Error::invalid_value("size", input)),
    };
    value
        .checked_mul(multiplier)
        .ok_or_else(|| Error::invalid_value("size", input))
}

/// Parse the longest leading float of `s` (after leading blanks), the way
/// `sort -n` and `abs` read numeric prefixes. Returns `None` when no digits
/// lead the string.
pub fn leading_float(s: &str) -> Option<f64> {
    let t = s.trim_start();
    let bytes = t.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end == digits_start || (end == digits_start + 1 && bytes[digits_start] == b'.') {
        return None;
    }
    let mut candidate = end;
    if candidate < bytes.len() && (bytes[candidate] == b'e' || bytes[candidate] == b'E') {
        candidate += 1;
        if candidate < bytes.len() && (bytes[candidate] == b'-' || bytes[candidate] == b'+') {
            candidate += 1;
        }
        let exp_start = candidate;
        while candidate < bytes.len() && bytes[candidate].is_ascii_digit() {
            candidate += 1;
        }
        if candidate > exp_start {
            end = candidate;
        }
    }
    t[..end].parse().ok()
}

/// Parse a float argument, reporting the offending text on failure.
pub fn parse_float(input: &str) -> Result<f64> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::invalid_number(input))
}

/// Parse a 1-based field list: `1,3,5-7`, `-3`, `4-`.
///
/// Returns inclusive ranges; an open upper bound is `usize::MAX`. A
/// malformed list is a usage error.
pub fn parse_ranges(list: &str) -> Result<Vec<(usize, usize)>> {
    let mut ranges = Vec::new();
    for part in list.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(Error::invalid_argument("field list", list));
        }
        let range = match part.split_once('-') {
            Some((lo, hi)) => {
                let lo = if lo.is_empty() { 1 } else { parse_position(lo, list)? };
                let hi = if hi.is_empty() {
                    usize::MAX
                } else {
                    parse_position(hi, list)?
                };
                if lo > hi {
                    return Err(Error::invalid_argument("decreasing range", part));
                }
                (lo, hi)
            }
            None => {
                let n = parse_position(part, list)?;
                (n, n)
            }
        };
        ranges.push(range);
    }
    Ok(ranges)
}

fn parse_position(text: &str, list: &str) -> Result<usize> {
    match text.parse::<usize>() {
        Ok(0) | Err(_) => Err(Error::invalid_argument("field list", list)),
        Ok(n) => Ok(n),
    }
}

/// Whether 1-based position `n` falls in any range.
pub fn in_ranges(ranges: &[(usize, usize)], n: usize) -> bool {
    ranges.iter().any(|&(lo, hi)| n >= lo && n <= hi)
}

/// Expand backslash escapes used in delimiter and set arguments.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_int_accepts_prefixes() {
        assert_eq!(parse_int("42").unwrap(), 42);
        assert_eq!(parse_int("0x1F").unwrap(), 31);
        assert_eq!(parse_int("0B101").unwrap(), 5);
        assert_eq!(parse_int("0o17").unwrap(), 15);
        assert_eq!(parse_int("-0x10").unwrap(), -16);
    }

    #[test]
    fn parse_int_leading_zero_is_decimal() {
        assert_eq!(parse_int("010").unwrap(), 10);
    }

    #[test]
    fn parse_int_rejects_garbage() {
        assert!(parse_int("12abc").is_err());
        assert!(parse_int("").is_err());
        assert!(parse_int("0x").is_err());
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("2").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("1.5").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("10µs").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert!(parse_duration("5x").is_err());
    }

    #[test]
    fn parse_size_suffixes() {
        assert_eq!(parse_size("10").unwrap(), 10);
        assert_eq!(parse_size("2K").unwrap(), 2048);
        assert_eq!(parse_size("1M").unwrap(), 1 << 20);
        assert_eq!(parse_size("3KB").unwrap(), 3000);
        assert_eq!(parse_size("1GB").unwrap(), 1_000_000_000);
        assert!(parse_size("K").is_err());
    }

    #[test]
    fn leading_float_reads_prefix() {
        assert_eq!(leading_float("  12.5abc"), Some(12.5));
        assert_eq!(leading_float("-3 apples"), Some(-3.0));
        assert_eq!(leading_float("1e3x"), Some(1000.0));
        assert_eq!(leading_float("2e"), Some(2.0));
        assert_eq!(leading_float("abc"), None);
        assert_eq!(leading_float("."), None);
    }

    #[test]
    fn parse_ranges_forms() {
        assert_eq!(parse_ranges("1,3").unwrap(), vec![(1, 1), (3, 3)]);
        assert_eq!(parse_ranges("2-4").unwrap(), vec![(2, 4)]);
        assert_eq!(parse_ranges("-2").unwrap(), vec![(1, 2)]);
        assert_eq!(parse_ranges("5-").unwrap(), vec![(5, usize::MAX)]);
        assert!(parse_ranges("0").is_err());
        assert!(parse_ranges("4-2").is_err());
        assert_eq!(parse_ranges("0").unwrap_err().exit_code(), 2);
    }

    #[test]
    fn unescape_common_sequences() {
        assert_eq!(unescape("a\\tb\\n"), "a\tb\n");
        assert_eq!(unescape("\\\\"), "\\");
        assert_eq!(unescape("\\q"), "\\q");
    }
}
