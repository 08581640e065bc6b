use std::io::Write;

use clap::Parser;
use regex::Regex;

use kit::{io, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Print the heading outline of Markdown documents")]
pub struct OutlineArgs {
    /// Flat list indented by level instead of numbered sections
    #[arg(short = 'f', long = "flat")]
    pub flat: bool,

    /// Only level-1 headings
    #[arg(long = "h1", conflicts_with_all = ["h2", "h3"])]
    pub h1: bool,

    /// Headings down to level 2
    #[arg(long = "h2", conflicts_with = "h3")]
    pub h2: bool,

    /// Headings down to level 3
    #[arg(long = "h3")]
    pub h3: bool,

    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: usize,
    pub text: String,
}

pub struct Extractor {
    heading: Regex,
    link: Regex,
}

impl Extractor {
    pub fn new() -> kit::Result<Self> {
        Ok(Extractor {
            heading: Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$")
                .map_err(|e| Error::invalid_pattern("heading", e))?,
            link: Regex::new(r"!?\[([^\]]*)\]\([^)]*\)")
                .map_err(|e| Error::invalid_pattern("link", e))?,
        })
    }

    /// Remove emphasis markers, code ticks and link targets.
    pub fn clean(&self, text: &str) -> String {
        let text = self.link.replace_all(text, "$1");
        text.replace("**", "")
            .replace("__", "")
            .replace('`', "")
            .trim()
            .to_string()
    }

    /// Headings outside fenced code blocks.
    pub fn headings(&self, text: &str) -> Vec<Heading> {
        let mut out = Vec::new();
        let mut fenced = false;
        for line in text.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                fenced = !fenced;
                continue;
            }
            if fenced {
                continue;
            }
            if let Some(caps) = self.heading.captures(line) {
                out.push(Heading {
                    level: caps[1].len(),
                    text: self.clean(&caps[2]),
                });
            }
        }
        out
    }
}

/// Render with hierarchical section numbers (`1.`, `1.2.`); levels are
/// relative to the shallowest heading present.
pub fn numbered(headings: &[Heading]) -> Vec<String> {
    let base = headings.iter().map(|h| h.level).min().unwrap_or(1);
    let mut counters = [0usize; 6];
    headings
        .iter()
        .map(|h| {
            let depth = h.level - base;
            counters[depth] += 1;
            for c in counters.iter_mut().skip(depth + 1) {
                *c = 0;
            }
            let number: Vec<String> = counters[..=depth]
                .iter()
                .map(|n| n.max(&1).to_string())
                .collect();
            format!("{}{}. {}", "  ".repeat(depth), number.join("."), h.text)
        })
        .collect()
}

pub fn flat(headings: &[Heading]) -> Vec<String> {
    let base = headings.iter().map(|h| h.level).min().unwrap_or(1);
    headings
        .iter()
        .map(|h| format!("{}{}", "  ".repeat(h.level - base), h.text))
        .collect()
}

pub fn run(args: OutlineArgs) -> CmdResult {
    let max_level = if args.h1 {
        1
    } else if args.h2 {
        2
    } else if args.h3 {
        3
    } else {
        6
    };
    let extractor = Extractor::new()?;
    let mut out = io::stdout();
    let status = io::each_input("outline", &args.files, |_, reader| {
        let mut text = String::new();
        io::for_each_line(reader, |line| {
            text.push_str(line);
            text.push('\n');
            Ok(())
        })?;
        let headings: Vec<Heading> = extractor
            .headings(&text)
            .into_iter()
            .filter(|h| h.level <= max_level)
            .collect();
        let lines = if args.flat {
            flat(&headings)
        } else {
            numbered(&headings)
        };
        io::write_lines(&mut out, lines)
    })?;
    out.flush()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Title\n\ntext\n\n## **Setup**\n\n```\n# not a heading\n```\n\n### Use `kit`\n\n## See [docs](http://x)\n";

    #[test]
    fn extracts_and_cleans_headings() {
        let h = Extractor::new().unwrap().headings(DOC);
        let texts: Vec<&str> = h.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["Title", "Setup", "Use kit", "See docs"]);
        assert_eq!(h[2].level, 3);
    }

    #[test]
    fn numbered_hierarchy() {
        let h = Extractor::new().unwrap().headings(DOC);
        assert_eq!(
            numbered(&h),
            vec!["1. Title", "  1.1. Setup", "    1.1.1. Use kit", "  1.2. See docs"]
        );
    }

    #[test]
    fn flat_indents_by_level() {
        let h = Extractor::new().unwrap().headings("## a\n### b\n");
        assert_eq!(flat(&h), vec!["a", "  b"]);
    }
}
