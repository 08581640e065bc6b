use std::io::{BufRead, Write};

use clap::Parser;

use kit::{io, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Count lines, words and bytes")]
pub struct WcArgs {
    /// Print the newline count
    #[arg(short = 'l', long = "lines")]
    pub lines: bool,

    /// Print the word count
    #[arg(short = 'w', long = "words")]
    pub words: bool,

    /// Print the byte count
    #[arg(short = 'c', long = "bytes")]
    pub bytes: bool,

    /// Print the character count
    #[arg(short = 'm', long = "chars")]
    pub chars: bool,

    pub files: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub lines: u64,
    pub words: u64,
    pub chars: u64,
    pub bytes: u64,
}

impl std::ops::AddAssign for Counts {
    fn add_assign(&mut self, other: Counts) {
        self.lines += other.lines;
        self.words += other.words;
        self.chars += other.chars;
        self.bytes += other.bytes;
    }
}

pub fn count(reader: &mut dyn BufRead) -> Result<Counts> {
    let mut counts = Counts::default();
    let mut in_word = false;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(counts);
        }
        counts.bytes += buf.len() as u64;
        if buf.last() == Some(&b'\n') {
            counts.lines += 1;
        }
        for ch in String::from_utf8_lossy(&buf).chars() {
            counts.chars += 1;
            if ch.is_whitespace() {
                in_word = false;
            } else if !in_word {
                in_word = true;
                counts.words += 1;
            }
        }
    }
}

struct Selection {
    lines: bool,
    words: bool,
    chars: bool,
    bytes: bool,
}

fn format_counts(counts: &Counts, sel: &Selection, name: Option<&str>) -> String {
    let mut fields = Vec::new();
    if sel.lines {
        fields.push(format!("{:>7}", counts.lines));
    }
    if sel.words {
        fields.push(format!("{:>7}", counts.words));
    }
    if sel.chars {
        fields.push(format!("{:>7}", counts.chars));
    }
    if sel.bytes {
        fields.push(format!("{:>7}", counts.bytes));
    }
    let mut line = fields.join(" ");
    if let Some(name) = name {
        line.push(' ');
        line.push_str(name);
    }
    line
}

pub fn run(args: WcArgs) -> CmdResult {
    let none = !(args.lines || args.words || args.bytes || args.chars);
    let sel = Selection {
        lines: args.lines || none,
        words: args.words || none,
        chars: args.chars,
        bytes: args.bytes || none,
    };
    let files = io::operands(&args.files);

    let mut out = io::stdout();
    let mut total = Counts::default();
    let status = io::each_input("wc", &files, |path, reader| {
        let counts = count(reader)?;
        total += counts;
        let name = if path == io::STDIN && args.files.is_empty() {
            None
        } else {
            Some(path)
        };
        writeln!(out, "{}", format_counts(&counts, &sel, name))?;
        Ok(())
    })?;
    if files.len() > 1 {
        writeln!(out, "{}", format_counts(&total, &sel, Some("total")))?;
    }
    out.flush()?;
    Ok(status)
}
