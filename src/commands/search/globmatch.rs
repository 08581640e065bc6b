use std::io::Write;

use clap::Parser;

use kit::{glob, io};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Test strings against a shell glob with brace expansion")]
pub struct GlobmatchArgs {
    /// Print strings that do NOT match
    #[arg(short = 'v', long = "invert")]
    pub invert: bool,

    /// No output; exit status only
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Expand the pattern against the filesystem
    #[arg(short = 'f', long = "files")]
    pub files: bool,

    pub pattern: String,

    /// Strings to test (default: lines of standard input)
    pub strings: Vec<String>,
}

pub fn select<'a>(pattern: &str, candidates: &'a [String], invert: bool) -> Vec<&'a String> {
    candidates
        .iter()
        .filter(|s| glob::matches(pattern, s) != invert)
        .collect()
}

pub fn run(args: GlobmatchArgs) -> CmdResult {
    let selected: Vec<String> = if args.files {
        glob::expand_paths(&args.pattern)?
    } else {
        let candidates = if args.strings.is_empty() {
            io::read_all_lines(&[])?
        } else {
            args.strings.clone()
        };
        select(&args.pattern, &candidates, args.invert)
            .into_iter()
            .cloned()
            .collect()
    };
    if !args.quiet {
        let mut out = io::stdout();
        io::write_lines(&mut out, &selected)?;
        out.flush()?;
    }
    Ok(if selected.is_empty() { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selects_matches_with_braces() {
        let c = strings(&["a.rs", "b.toml", "c.md"]);
        assert_eq!(select("*.{rs,md}", &c, false), vec!["a.rs", "c.md"]);
    }

    #[test]
    fn invert_selects_the_rest() {
        let c = strings(&["a.rs", "b.toml"]);
        assert_eq!(select("*.rs", &c, true), vec!["b.toml"]);
    }
}
