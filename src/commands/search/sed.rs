use std::io::Write;

use clap::Parser;
use regex::{Captures, Regex, RegexBuilder};

use kit::{io, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Stream editor for s/PATTERN/REPLACEMENT/FLAGS substitutions")]
pub struct SedArgs {
    /// Add a script (repeatable); otherwise the first operand is the script
    #[arg(short = 'e', long = "expression", value_name = "SCRIPT")]
    pub expressions: Vec<String>,

    /// Edit files in place
    #[arg(short = 'i', long = "in-place")]
    pub in_place: bool,

    /// Print only lines selected by the `p` flag
    #[arg(short = 'n', long = "quiet")]
    pub quiet: bool,

    /// Extended regular expressions (always on)
    #[arg(short = 'E', short_alias = 'r', long = "regexp-extended")]
    pub extended: bool,

    pub operands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Group(usize),
}

#[derive(Debug)]
pub struct Substitution {
    re: Regex,
    replacement: Vec<Part>,
    global: bool,
    nth: usize,
    print: bool,
}

/// Split on unescaped `sep`; `\sep` becomes a literal `sep`, other escapes
/// are kept for the next stage.
fn split_unescaped(body: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == sep {
            parts.push(std::mem::take(&mut current));
        } else if c == '\\' {
            match chars.next() {
                Some(n) if n == sep => current.push(n),
                Some(n) => {
                    current.push('\\');
                    current.push(n);
                }
                None => current.push('\\'),
            }
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}

fn parse_replacement(text: &str) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = text.chars();
    let flush = |literal: &mut String, parts: &mut Vec<Part>| {
        if !literal.is_empty() {
            parts.push(Part::Literal(std::mem::take(literal)));
        }
    };
    while let Some(c) = chars.next() {
        match c {
            '&' => {
                flush(&mut literal, &mut parts);
                parts.push(Part::Group(0));
            }
            '\\' => match chars.next() {
                Some(d @ '0'..='9') => {
                    flush(&mut literal, &mut parts);
                    parts.push(Part::Group(d as usize - '0' as usize));
                }
                Some('n') => literal.push('\n'),
                Some('t') => literal.push('\t'),
                Some(other) => literal.push(other),
                None => literal.push('\\'),
            },
            _ => literal.push(c),
        }
    }
    flush(&mut literal, &mut parts);
    parts
}

impl Substitution {
    pub fn parse(script: &str) -> Result<Self> {
        let invalid = || Error::invalid_value("command", script);
        let mut chars = script.trim().chars();
        if chars.next() != Some('s') {
            return Err(invalid());
        }
        let sep = chars.next().ok_or_else(invalid)?;
        if sep == '\\' || sep == '\n' {
            return Err(invalid());
        }
        let parts = split_unescaped(chars.as_str(), sep);
        if parts.len() != 3 {
            return Err(Error::invalid_value("command", script)
                .with_hint("expected s/PATTERN/REPLACEMENT/FLAGS"));
        }

        let mut global = false;
        let mut nth = 1;
        let mut print = false;
        let mut ignore_case = false;
        let mut digits = String::new();
        for f in parts[2].chars() {
            match f {
                'g' => global = true,
                'p' => print = true,
                'i' | 'I' => ignore_case = true,
                '0'..='9' => digits.push(f),
                _ => return Err(Error::invalid_argument("flag", f.to_string())),
            }
        }
        if !digits.is_empty() {
            nth = digits
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| Error::invalid_argument("flag", &digits))?;
        }

        let re = RegexBuilder::new(&parts[0])
            .case_insensitive(ignore_case)
            .build()
            .map_err(|e| Error::invalid_pattern(&parts[0], e))?;
        Ok(Substitution {
            re,
            replacement: parse_replacement(&parts[1]),
            global,
            nth,
            print,
        })
    }

    fn expand(&self, caps: &Captures) -> String {
        let mut out = String::new();
        for part in &self.replacement {
            match part {
                Part::Literal(s) => out.push_str(s),
                Part::Group(n) => out.push_str(caps.get(*n).map_or("", |m| m.as_str())),
            }
        }
        out
    }

    /// Apply to one line; the flag reports whether a replacement happened.
    pub fn apply(&self, line: &str) -> (String, bool) {
        let mut out = String::with_capacity(line.len());
        let mut last = 0;
        let mut changed = false;
        for (i, caps) in self.re.captures_iter(line).enumerate() {
            let index = i + 1;
            if index < self.nth {
                continue;
            }
            let Some(m) = caps.get(0) else {
                continue;
            };
            out.push_str(&line[last..m.start()]);
            out.push_str(&self.expand(&caps));
            last = m.end();
            changed = true;
            if !self.global {
                break;
            }
        }
        out.push_str(&line[last..]);
        (out, changed)
    }
}

/// Run every substitution over a line, returning the lines to print.
pub fn edit_line(subs: &[Substitution], line: &str, quiet: bool) -> Vec<String> {
    let mut current = line.to_string();
    let mut printed = Vec::new();
    for sub in subs {
        let (next, changed) = sub.apply(&current);
        current = next;
        if changed && sub.print {
            printed.push(current.clone());
        }
    }
    if !quiet {
        printed.push(current);
    }
    printed
}

pub fn run(args: SedArgs) -> CmdResult {
    let mut operands = args.operands.clone();
    let scripts = if args.expressions.is_empty() {
        if operands.is_empty() {
            return Err(Error::missing_operand(None));
        }
        vec![operands.remove(0)]
    } else {
        args.expressions.clone()
    };
    let subs = scripts
        .iter()
        .map(|s| Substitution::parse(s))
        .collect::<Result<Vec<_>>>()?;

    if args.in_place {
        if operands.is_empty() {
            return Err(Error::usage("no input files for in-place editing"));
        }
        let mut status = 0;
        for path in &operands {
            let text = match io::read_text(path) {
                Ok(t) => t,
                Err(err) => {
                    kit::output::diagnostic("sed", &err.message);
                    status = 1;
                    continue;
                }
            };
            let mut edited = String::with_capacity(text.len());
            for line in text.lines() {
                for l in edit_line(&subs, line, args.quiet) {
                    edited.push_str(&l);
                    edited.push('\n');
                }
            }
            if !text.ends_with('\n') && edited.ends_with('\n') {
                edited.pop();
            }
            io::write_file(std::path::Path::new(path), edited.as_bytes())?;
        }
        return Ok(status);
    }

    let mut out = io::stdout();
    let status = io::each_input("sed", &operands, |_, reader| {
        io::for_each_line(reader, |line| {
            for l in edit_line(&subs, line, args.quiet) {
                writeln!(out, "{}", l)?;
            }
            Ok(())
        })
    })?;
    out.flush()?;
    Ok(status)
}
