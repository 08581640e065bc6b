use std::io::Write;

use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Reflow paragraphs to a maximum line width")]
pub struct FmtArgs {
    /// Maximum line width
    #[arg(short = 'w', long = "width", default_value_t = 75)]
    pub width: usize,

    pub files: Vec<String>,
}

/// Greedy fill of `words` into lines no wider than `width` (a single word
/// longer than `width` gets its own line). `indent` prefixes every line.
pub fn fill(words: &[&str], width: usize, indent: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    let indent_len = indent.chars().count();
    for word in words {
        let len = word.chars().count();
        if current.is_empty() {
            current.push_str(indent);
            current.push_str(word);
            current_len = indent_len + len;
        } else if current_len + 1 + len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(indent);
            current.push_str(word);
            current_len = indent_len + len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Reflow text: blank lines separate paragraphs and are kept; each
/// paragraph keeps the indentation of its first line.
pub fn reflow(lines: &[String], width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    let flush = |paragraph: &mut Vec<&str>, out: &mut Vec<String>| {
        if let Some(first) = paragraph.first() {
            let indent: String = first.chars().take_while(|c| c.is_whitespace()).collect();
            let words: Vec<&str> = paragraph
                .iter()
                .flat_map(|l| l.split_whitespace())
                .collect();
            out.extend(fill(&words, width, &indent));
        }
        paragraph.clear();
    };

    for line in lines {
        if line.trim().is_empty() {
            flush(&mut paragraph, &mut out);
            out.push(String::new());
        } else {
            paragraph.push(line);
        }
    }
    flush(&mut paragraph, &mut out);
    out
}

pub fn run(args: FmtArgs) -> CmdResult {
    let width = args.width.max(1);
    let mut out = io::stdout();
    let status = io::each_input("fmt", &args.files, |_, reader| {
        let mut lines = Vec::new();
        io::for_each_line(reader, |line| {
            lines.push(line.to_string());
            Ok(())
        })?;
        io::write_lines(&mut out, reflow(&lines, width))
    })?;
    out.flush()?;
    Ok(status)
}
