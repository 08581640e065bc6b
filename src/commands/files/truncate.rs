//! `truncate` answers to two contracts: with `-s` it resizes files like
//! coreutils, otherwise it shortens text lines to a codepoint budget.

use std::fs::OpenOptions;

use clap::Parser;

use kit::{io, output, parser, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Shrink or extend files, or shorten text lines")]
pub struct TruncateArgs {
    /// Set or adjust file size: N, +N or -N (K, M, G suffixes)
    #[arg(short = 's', long = "size", value_name = "SIZE", allow_hyphen_values = true)]
    pub size: Option<String>,

    /// Do not create missing files
    #[arg(short = 'c', long = "no-create", requires = "size")]
    pub no_create: bool,

    /// Maximum codepoints per line
    #[arg(short = 'n', long = "length", default_value_t = 80)]
    pub length: usize,

    /// Marker appended where text was cut
    #[arg(short = 'e', long = "ellipsis", default_value = "...")]
    pub ellipsis: String,

    /// Keep the end of the line instead of the start
    #[arg(short = 'b', long = "keep-end")]
    pub keep_end: bool,

    /// Cut at a word boundary
    #[arg(short = 'w', long = "words")]
    pub words: bool,

    pub files: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resize {
    Set(u64),
    Grow(u64),
    Shrink(u64),
}

impl Resize {
    pub fn parse(spec: &str) -> kit::Result<Self> {
        Ok(match spec.as_bytes().first() {
            Some(b'+') => Resize::Grow(parser::parse_size(&spec[1..])?),
            Some(b'-') => Resize::Shrink(parser::parse_size(&spec[1..])?),
            _ => Resize::Set(parser::parse_size(spec)?),
        })
    }

    pub fn apply(self, current: u64) -> u64 {
        match self {
            Resize::Set(n) => n,
            Resize::Grow(n) => current.saturating_add(n),
            Resize::Shrink(n) => current.saturating_sub(n),
        }
    }
}

fn resize(path: &str, spec: Resize, no_create: bool) -> kit::Result<()> {
    let file = match OpenOptions::new().write(true).create(!no_create).truncate(false).open(path) {
        Ok(file) => file,
        Err(e) if no_create && e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(Error::io(format!("cannot open '{}' for writing", path), &e))
        }
    };
    let fail = |e: std::io::Error| Error::io(format!("failed to truncate '{}'", path), &e);
    let current = file.metadata().map_err(fail)?.len();
    file.set_len(spec.apply(current)).map_err(fail)
}

#[derive(Debug, Clone)]
pub struct Shorten<'a> {
    pub length: usize,
    pub ellipsis: &'a str,
    pub keep_end: bool,
    pub words: bool,
}

impl Shorten<'_> {
    /// `line` cut to at most `length` codepoints, ellipsis included.
    pub fn apply(&self, line: &str) -> String {
        let chars: Vec<char> = line.chars().collect();
        if chars.len() <= self.length {
            return line.to_string();
        }
        let marker: Vec<char> = self.ellipsis.chars().collect();
        if marker.len() >= self.length {
            return marker[..self.length].iter().collect();
        }
        let room = self.length - marker.len();

        if self.keep_end {
            let start = chars.len() - room;
            let mut kept = &chars[start..];
            if self.words && !chars[start - 1].is_whitespace() {
                if let Some(space) = kept.iter().position(|c| c.is_whitespace()) {
                    kept = &kept[space..];
                }
                while kept.first().is_some_and(|c| c.is_whitespace()) {
                    kept = &kept[1..];
                }
            }
            let tail: String = kept.iter().collect();
            return format!("{}{}", self.ellipsis, tail);
        }

        let mut kept = &chars[..room];
        if self.words && !chars[room].is_whitespace() {
            if let Some(space) = kept.iter().rposition(|c| c.is_whitespace()) {
                kept = &kept[..space];
            }
        }
        while kept.last().is_some_and(|c| c.is_whitespace()) {
            kept = &kept[..kept.len() - 1];
        }
        let head: String = kept.iter().collect();
        format!("{}{}", head, self.ellipsis)
    }
}

pub fn run(args: TruncateArgs) -> CmdResult {
    if let Some(size) = &args.size {
        let spec = Resize::parse(size)?;
        if args.files.is_empty() {
            return Err(Error::missing_operand(None));
        }
        let mut status = 0;
        for path in &args.files {
            if let Err(err) = resize(path, spec, args.no_create) {
                output::diagnostic("truncate", &err.message);
                status = 1;
            }
        }
        return Ok(status);
    }

    let shorten = Shorten {
        length: args.length,
        ellipsis: &args.ellipsis,
        keep_end: args.keep_end,
        words: args.words,
    };
    io::map_lines("truncate", &args.files, |line| Some(shorten.apply(line)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn shorten(length: usize, keep_end: bool, words: bool) -> Shorten<'static> {
        Shorten {
            length,
            ellipsis: "...",
            keep_end,
            words,
        }
    }

    #[test]
    fn short_lines_pass_through() {
        assert_eq!(shorten(10, false, false).apply("hello"), "hello");
    }

    #[test]
    fn cut_counts_codepoints() {
        assert_eq!(shorten(8, false, false).apply("héllo wörld"), "héllo...");
    }

    #[test]
    fn word_boundary() {
        assert_eq!(shorten(12, false, true).apply("the quick brown fox"), "the quick...");
    }

    #[test]
    fn keep_end() {
        assert_eq!(shorten(8, true, false).apply("abcdefghij"), "...fghij");
        assert_eq!(shorten(12, true, true).apply("the quick brown fox"), "...brown fox");
        assert_eq!(shorten(11, true, true).apply("the quick brown fox"), "...fox");
    }

    #[test]
    fn tiny_budget_is_all_marker() {
        assert_eq!(shorten(2, false, false).apply("abcdef"), "..");
    }

    #[test]
    fn resize_specs() {
        assert_eq!(Resize::parse("1K").unwrap(), Resize::Set(1024));
        assert_eq!(Resize::parse("+10").unwrap().apply(5), 15);
        assert_eq!(Resize::parse("-10").unwrap().apply(5), 0);
    }

    #[test]
    fn resize_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f");
        fs::write(&path, "hello world").unwrap();
        let text = path.display().to_string();
        resize(&text, Resize::Set(5), false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");

        let ghost = dir.path().join("ghost").display().to_string();
        resize(&ghost, Resize::Set(3), true).unwrap();
        assert!(!dir.path().join("ghost").exists());
    }
}
