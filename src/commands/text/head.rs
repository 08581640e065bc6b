use std::io::{BufRead, Read, Write};

use clap::Parser;

use kit::{io, parser, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Output the first part of files")]
pub struct HeadArgs {
    /// Print the first N lines; -N prints all but the last N
    #[arg(short = 'n', long = "lines", value_name = "N", allow_hyphen_values = true)]
    pub lines: Option<String>,

    /// Print the first N bytes; -N prints all but the last N
    #[arg(short = 'c', long = "bytes", value_name = "N", allow_hyphen_values = true)]
    pub bytes: Option<String>,

    /// Never print headers
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Always print headers
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    pub files: Vec<String>,
}

/// How much of the input to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    First(u64),
    AllButLast(u64),
}

impl Span {
    pub fn parse(value: &str, sized: bool) -> Result<Self> {
        let (negative, body) = match value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, value.strip_prefix('+').unwrap_or(value)),
        };
        let n = if sized {
            parser::parse_size(body)?
        } else {
            parser::parse_count(body)? as u64
        };
        Ok(if negative {
            Span::AllButLast(n)
        } else {
            Span::First(n)
        })
    }
}

pub fn head_lines(reader: &mut dyn BufRead, span: Span, out: &mut dyn Write) -> Result<()> {
    match span {
        Span::First(n) => {
            let mut buf = Vec::new();
            for _ in 0..n {
                buf.clear();
                if reader.read_until(b'\n', &mut buf)? == 0 {
                    break;
                }
                out.write_all(&buf)?;
            }
        }
        Span::AllButLast(n) => {
            let mut data = Vec::new();
            reader.read_to_end(&mut data)?;
            let lines = io::split_inclusive_lines(&data);
            let keep = lines.len().saturating_sub(n as usize);
            for line in &lines[..keep] {
                out.write_all(line)?;
            }
        }
    }
    Ok(())
}

pub fn head_bytes(reader: &mut dyn BufRead, span: Span, out: &mut dyn Write) -> Result<()> {
    match span {
        Span::First(n) => {
            std::io::copy(&mut reader.take(n), out)?;
        }
        Span::AllButLast(n) => {
            let mut data = Vec::new();
            reader.read_to_end(&mut data)?;
            let keep = data.len().saturating_sub(n as usize);
            out.write_all(&data[..keep])?;
        }
    }
    Ok(())
}

pub fn run(args: HeadArgs) -> CmdResult {
    let (span, bytes) = match (&args.bytes, &args.lines) {
        (Some(c), _) => (Span::parse(c, true)?, true),
        (None, Some(n)) => (Span::parse(n, false)?, false),
        (None, None) => (Span::First(10), false),
    };
    let files = io::operands(&args.files);
    let headers = args.verbose || (files.len() > 1 && !args.quiet);

    let mut out = io::stdout();
    let mut first = true;
    let status = io::each_input("head", &files, |path, reader| {
        if headers {
            let name = if path == io::STDIN { "standard input" } else { path };
            if !first {
                out.write_all(b"\n")?;
            }
            writeln!(out, "==> {} <==", name)?;
        }
        first = false;
        if bytes {
            head_bytes(reader, span, &mut out)
        } else {
            head_lines(reader, span, &mut out)
        }
    })?;
    out.flush()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn lines(input: &str, span: Span) -> String {
        let mut out = Vec::new();
        head_lines(&mut Cursor::new(input.as_bytes().to_vec()), span, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn first_n_lines() {
        assert_eq!(lines("a\nb\nc\n", Span::First(2)), "a\nb\n");
        assert_eq!(lines("a\nb\n", Span::First(5)), "a\nb\n");
    }

    #[test]
    fn zero_lines_prints_nothing() {
        assert_eq!(lines("a\nb\n", Span::First(0)), "");
    }

    #[test]
    fn all_but_last() {
        assert_eq!(lines("a\nb\nc\n", Span::AllButLast(1)), "a\nb\n");
    }

    #[test]
    fn bytes_are_binary_safe() {
        let mut out = Vec::new();
        head_bytes(&mut Cursor::new(vec![0u8, 0xff, 1, 2]), Span::First(2), &mut out).unwrap();
        assert_eq!(out, vec![0u8, 0xff]);
    }

    #[test]
    fn span_parsing() {
        assert_eq!(Span::parse("5", false).unwrap(), Span::First(5));
        assert_eq!(Span::parse("-3", false).unwrap(), Span::AllButLast(3));
        assert_eq!(Span::parse("1K", true).unwrap(), Span::First(1024));
        assert!(Span::parse("x", false).is_err());
    }
}
