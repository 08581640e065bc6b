//! printf-style float formatting (`%f`, `%e`, `%g` with flags, width and
//! precision) for `seq -f` and `floatfmt`.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Fixed,
    Exponent,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatFormat {
    pub prefix: String,
    pub suffix: String,
    pub conversion: Conversion,
    pub uppercase: bool,
    pub precision: Option<usize>,
    pub width: usize,
    pub left: bool,
    pub zero: bool,
    pub plus: bool,
    pub space: bool,
    pub alternate: bool,
}

impl FloatFormat {
    /// Parse a format holding exactly one float directive; `%%` is a
    /// literal percent sign.
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = || Error::invalid_value("format", spec);
        let mut prefix = String::new();
        let mut chars = spec.char_indices().peekable();
        while let Some((_, c)) = chars.next() {
            if c != '%' {
                prefix.push(c);
                continue;
            }
            if let Some((_, '%')) = chars.peek() {
                chars.next();
                prefix.push('%');
                continue;
            }
            let mut fmt = FloatFormat {
                prefix: std::mem::take(&mut prefix),
                suffix: String::new(),
                conversion: Conversion::General,
                uppercase: false,
                precision: None,
                width: 0,
                left: false,
                zero: false,
                plus: false,
                space: false,
                alternate: false,
            };
            while let Some(&(_, f)) = chars.peek() {
                match f {
                    '-' => fmt.left = true,
                    '0' => fmt.zero = true,
                    '+' => fmt.plus = true,
                    ' ' => fmt.space = true,
                    '#' => fmt.alternate = true,
                    _ => break,
                }
                chars.next();
            }
            let mut width = String::new();
            while let Some(&(_, d)) = chars.peek().filter(|(_, d)| d.is_ascii_digit()) {
                width.push(d);
                chars.next();
            }
            fmt.width = width.parse().unwrap_or(0);
            if let Some((_, '.')) = chars.peek() {
                chars.next();
                let mut precision = String::new();
                while let Some(&(_, d)) = chars.peek().filter(|(_, d)| d.is_ascii_digit()) {
                    precision.push(d);
                    chars.next();
                }
                fmt.precision = Some(precision.parse().unwrap_or(0));
            }
            let (_, conv) = chars.next().ok_or_else(invalid)?;
            fmt.uppercase = conv.is_ascii_uppercase();
            fmt.conversion = match conv.to_ascii_lowercase() {
                'f' => Conversion::Fixed,
                'e' => Conversion::Exponent,
                'g' => Conversion::General,
                _ => return Err(invalid()),
            };
            let rest = chars.peek().map_or("", |&(at, _)| &spec[at..]);
            if rest.replace("%%", "").contains('%') {
                return Err(invalid());
            }
            fmt.suffix = rest.replace("%%", "%");
            return Ok(fmt);
        }
        Err(invalid())
    }

    pub fn render(&self, value: f64) -> String {
        let precision = self.precision.unwrap_or(6);
        let body = if !value.is_finite() {
            let text = if value.is_nan() { "nan" } else { "inf" };
            text.to_string()
        } else {
            match self.conversion {
                Conversion::Fixed => format!("{:.*}", precision, value.abs()),
                Conversion::Exponent => exponent(value.abs(), precision),
                Conversion::General => general(value.abs(), precision, self.alternate),
            }
        };
        let body = if self.uppercase {
            body.to_uppercase()
        } else {
            body
        };
        let sign = if value < 0.0 {
            "-"
        } else if self.plus {
            "+"
        } else if self.space {
            " "
        } else {
            ""
        };
        let len = sign.len() + body.chars().count();
        let padded = if len >= self.width {
            format!("{}{}", sign, body)
        } else if self.left {
            format!("{}{}{}", sign, body, " ".repeat(self.width - len))
        } else if self.zero && value.is_finite() {
            format!("{}{}{}", sign, "0".repeat(self.width - len), body)
        } else {
            format!("{}{}{}", " ".repeat(self.width - len), sign, body)
        };
        format!("{}{}{}", self.prefix, padded, self.suffix)
    }
}

/// C-style `%e`: `1.500000e+02`.
pub fn exponent(value: f64, precision: usize) -> String {
    let rust = format!("{:.*e}", precision, value);
    match rust.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => rust,
    }
}

/// C-style `%g`: the shorter of `%e` and `%f` for `precision` significant
/// digits, trailing zeros removed unless `alternate`.
pub fn general(value: f64, precision: usize, alternate: bool) -> String {
    let p = precision.max(1);
    if value == 0.0 {
        return if alternate {
            format!("{:.*}", p - 1, 0.0)
        } else {
            "0".to_string()
        };
    }
    // exponent after rounding to p significant digits
    let rounded = format!("{:.*e}", p - 1, value);
    let x: i32 = rounded
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0);
    let text = if x < -4 || x >= p as i32 {
        exponent(value, p - 1)
    } else {
        format!("{:.*}", (p as i32 - 1 - x).max(0) as usize, value)
    };
    if alternate {
        return text;
    }
    match text.split_once('e') {
        Some((mantissa, exp)) => format!("{}e{}", trim_zeros(mantissa), exp),
        None => trim_zeros(&text).to_string(),
    }
}

/// Drop trailing fractional zeros and a dangling decimal point.
pub fn trim_zeros(text: &str) -> &str {
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(spec: &str, v: f64) -> String {
        FloatFormat::parse(spec).unwrap().render(v)
    }

    #[test]
    fn fixed_with_width_and_precision() {
        assert_eq!(fmt("%.2f", 3.14159), "3.14");
        assert_eq!(fmt("%8.3f", -2.5), "  -2.500");
        assert_eq!(fmt("%08.2f", -2.5), "-0002.50");
        assert_eq!(fmt("%-6.1f|", 1.0), "1.0   |");
    }

    #[test]
    fn exponent_matches_c() {
        assert_eq!(fmt("%e", 150.0), "1.500000e+02");
        assert_eq!(fmt("%.2E", 0.00123), "1.23E-03");
    }

    #[test]
    fn general_picks_shortest() {
        assert_eq!(fmt("%g", 100000.0), "100000");
        assert_eq!(fmt("%g", 1000000.0), "1e+06");
        assert_eq!(fmt("%g", 0.0001), "0.0001");
        assert_eq!(fmt("%g", 0.00001), "1e-05");
        assert_eq!(fmt("%g", 2.5), "2.5");
        assert_eq!(fmt("%.3g", 3.14159), "3.14");
    }

    #[test]
    fn literals_around_directive() {
        assert_eq!(fmt("x=%g%%", 5.0), "x=5%");
        assert_eq!(fmt("%%%g", 5.0), "%5");
    }

    #[test]
    fn rejects_missing_or_bad_directive() {
        assert!(FloatFormat::parse("plain").is_err());
        assert!(FloatFormat::parse("%d").is_err());
        assert!(FloatFormat::parse("%").is_err());
    }

    #[test]
    fn trims_trailing_zeros() {
        assert_eq!(trim_zeros("1.500"), "1.5");
        assert_eq!(trim_zeros("2.000"), "2");
        assert_eq!(trim_zeros("100"), "100");
    }
}
