use std::io::{BufRead, Write};
use std::path::Path;

use clap::Parser;
use regex::{Regex, RegexBuilder};

use kit::walk::{self, Entry, WalkOptions};
use kit::{io, output, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Print lines matching a regular expression", disable_help_flag = true)]
pub struct GrepArgs {
    /// Case-insensitive matching
    #[arg(short = 'i', long = "ignore-case")]
    pub ignore_case: bool,

    /// Prefix each line with its line number
    #[arg(short = 'n', long = "line-number")]
    pub line_number: bool,

    /// Select non-matching lines
    #[arg(short = 'v', long = "invert-match")]
    pub invert: bool,

    /// Search directories recursively
    #[arg(short = 'r', short_alias = 'R', long = "recursive")]
    pub recursive: bool,

    /// Print only a count of selected lines per file
    #[arg(short = 'c', long = "count")]
    pub count: bool,

    /// Print only names of files with selected lines
    #[arg(short = 'l', long = "files-with-matches")]
    pub files_with_matches: bool,

    /// PATTERN is a fixed string
    #[arg(short = 'F', long = "fixed-strings")]
    pub fixed: bool,

    /// Extended regular expressions (always on)
    #[arg(short = 'E', long = "extended-regexp")]
    pub extended: bool,

    /// Match whole words only
    #[arg(short = 'w', long = "word-regexp")]
    pub word: bool,

    /// Suppress output; exit status reports whether anything matched
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Always / never print file name prefixes
    #[arg(short = 'H', long = "with-filename", overrides_with = "no_filename")]
    pub with_filename: bool,

    #[arg(long = "no-filename", short = 'h')]
    pub no_filename: bool,

    pub pattern: String,

    pub files: Vec<String>,
}

pub fn build_regex(pattern: &str, fixed: bool, word: bool, ignore_case: bool) -> Result<Regex> {
    let mut source = if fixed {
        regex::escape(pattern)
    } else {
        pattern.to_string()
    };
    if word {
        source = format!(r"\b(?:{})\b", source);
    }
    RegexBuilder::new(&source)
        .case_insensitive(ignore_case)
        .build()
        .map_err(|e| Error::invalid_pattern(pattern, e))
}

struct Searcher<'a> {
    args: &'a GrepArgs,
    re: Regex,
    prefix: bool,
    total: usize,
}

impl Searcher<'_> {
    /// Search one stream; returns the number of selected lines.
    fn search(&mut self, name: &str, reader: &mut dyn BufRead, out: &mut dyn Write) -> Result<usize> {
        let mut selected = 0;
        let mut number = 0;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            number += 1;
            let text = String::from_utf8_lossy(&buf);
            let line = io::chomp(&text);
            if self.re.is_match(line) == self.args.invert {
                continue;
            }
            selected += 1;
            if self.args.quiet || self.args.count {
                continue;
            }
            if self.args.files_with_matches {
                writeln!(out, "{}", name)?;
                break;
            }
            if self.prefix {
                write!(out, "{}:", name)?;
            }
            if self.args.line_number {
                write!(out, "{}:", number)?;
            }
            writeln!(out, "{}", line)?;
        }
        if self.args.count && !self.args.quiet {
            if self.prefix {
                write!(out, "{}:", name)?;
            }
            writeln!(out, "{}", selected)?;
        }
        self.total += selected;
        Ok(selected)
    }
}

/// Regular files under each operand (operands that are files pass through).
fn expand_recursive(files: &[String], failed: &mut bool) -> Vec<String> {
    let mut paths = Vec::new();
    for root in files {
        if !Path::new(root).is_dir() {
            paths.push(root.clone());
            continue;
        }
        walk::walk(
            Path::new(root),
            WalkOptions::default(),
            &mut |e: &Entry| {
                if e.is_file() {
                    paths.push(e.path.display().to_string());
                }
            },
            &mut |err| {
                output::diagnostic("grep", &err.message);
                *failed = true;
            },
        );
    }
    paths
}

pub fn run(args: GrepArgs) -> CmdResult {
    let re = build_regex(&args.pattern, args.fixed, args.word, args.ignore_case)?;
    let mut failed = false;
    let files = if args.recursive {
        let roots = if args.files.is_empty() {
            vec![".".to_string()]
        } else {
            args.files.clone()
        };
        expand_recursive(&roots, &mut failed)
    } else {
        args.files.clone()
    };
    let prefix = !args.no_filename && (args.with_filename || args.recursive || files.len() > 1);

    let mut searcher = Searcher {
        args: &args,
        re,
        prefix,
        total: 0,
    };
    let mut out = io::stdout();
    let status = io::each_input("grep", &files, |path, reader| {
        let name = if path == io::STDIN { "(standard input)" } else { path };
        searcher.search(name, reader, &mut out).map(|_| ())
    })?;
    out.flush()?;

    if status != 0 || failed {
        return Ok(2);
    }
    Ok(if searcher.total > 0 { 0 } else { 1 })
}
