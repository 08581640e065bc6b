use std::fmt::Write as _;

use clap::{Parser, ValueEnum};

use kit::{shell, Error, Result};

use super::transform_text;
use crate::commands::CmdResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Dialect {
    Shell,
    Regex,
    Sql,
    Go,
    Ungo,
    Xml,
    Unxml,
}

#[derive(Parser, Debug)]
#[command(about = "Escape text for a target dialect (un* modes reverse)")]
pub struct EscapeArgs {
    #[arg(value_enum)]
    pub dialect: Dialect,

    /// Text; standard input lines when omitted
    #[arg(allow_hyphen_values = true)]
    pub text: Vec<String>,
}

/// Double-quoted Go string literal.
pub fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            '\x0b' => out.push_str("\\v"),
            c if (c as u32) < 0x20 || c == '\x7f' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize, input: &str) -> Result<char> {
    let text: String = chars.take(digits).collect();
    if text.len() != digits {
        return Err(Error::invalid_value("escape", input));
    }
    u32::from_str_radix(&text, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| Error::invalid_value("escape", input))
}

/// Reverse of `go_quote`; surrounding quotes are optional.
pub fn go_unquote(s: &str) -> Result<String> {
    let body = s
        .strip_prefix('"')
        .and_then(|b| b.strip_suffix('"'))
        .unwrap_or(s);
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let e = chars
            .next()
            .ok_or_else(|| Error::invalid_value("escape", s))?;
        let decoded = match e {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0c',
            'v' => '\x0b',
            '\\' | '"' | '\'' => e,
            'x' => hex_escape(&mut chars, 2, s)?,
            'u' => hex_escape(&mut chars, 4, s)?,
            'U' => hex_escape(&mut chars, 8, s)?,
            '0'..='7' => {
                let rest: String = chars.by_ref().take(2).collect();
                let value = u32::from_str_radix(&format!("{}{}", e, rest), 8)
                    .map_err(|_| Error::invalid_value("escape", s))?;
                char::from_u32(value).ok_or_else(|| Error::invalid_value("escape", s))?
            }
            _ => return Err(Error::invalid_value("escape", s)),
        };
        out.push(decoded);
    }
    Ok(out)
}

pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Decode the five named XML entities plus numeric references. Unknown
/// entities are left as written.
pub fn xml_unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail.find(';').and_then(|end| {
            let name = &tail[1..end];
            let c = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => name
                    .strip_prefix("#x")
                    .or_else(|| name.strip_prefix("#X"))
                    .map(|h| u32::from_str_radix(h, 16))
                    .or_else(|| name.strip_prefix('#').map(|d| d.parse::<u32>()))
                    .and_then(|v| v.ok())
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn apply(dialect: Dialect, text: &str) -> Result<String> {
    Ok(match dialect {
        Dialect::Shell => shell::quote_arg(text),
        Dialect::Regex => shell::escape_regex(text),
        Dialect::Sql => format!("'{}'", text.replace('\'', "''")),
        Dialect::Go => go_quote(text),
        Dialect::Ungo => go_unquote(text)?,
        Dialect::Xml => xml_escape(text),
        Dialect::Unxml => xml_unescape(text),
    })
}

pub fn run(args: EscapeArgs) -> CmdResult {
    let dialect = args.dialect;
    transform_text(&args.text, |line| apply(dialect, line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_and_sql() {
        assert_eq!(apply(Dialect::Shell, "it's").unwrap(), "'it'\\''s'");
        assert_eq!(apply(Dialect::Shell, "plain").unwrap(), "plain");
        assert_eq!(apply(Dialect::Sql, "O'Brien").unwrap(), "'O''Brien'");
        assert_eq!(apply(Dialect::Regex, "a.b*").unwrap(), "a\\.b\\*");
    }

    #[test]
    fn go_round_trip() {
        let samples = ["plain", "tab\there", "quote\"back\\slash", "bell\x07", "é ünï", "nul\0"];
        for s in samples {
            assert_eq!(go_unquote(&go_quote(s)).unwrap(), s);
        }
        assert_eq!(go_quote("a\nb"), "\"a\\nb\"");
        assert_eq!(go_unquote("\\x41\\u00e9\\101").unwrap(), "AéA");
        assert!(go_unquote("\\q").is_err());
    }

    #[test]
    fn xml_round_trip() {
        let s = "<a href=\"x\">Tom & 'Jerry'</a>";
        assert_eq!(xml_unescape(&xml_escape(s)), s);
        assert_eq!(xml_unescape("&#65;&#x42;&bogus; &"), "AB&bogus; &");
    }
}
