use clap::Parser;
use regex::Regex;

use kit::{io, Error};

use super::expand::expand_line;
use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Filter backspace overstrikes and ANSI escapes from text")]
pub struct ColArgs {
    /// Do not output backspaces (the default; accepted for compatibility)
    #[arg(short = 'b')]
    pub no_backspaces: bool,

    /// Expand tabs to spaces
    #[arg(short = 'x')]
    pub expand_tabs: bool,

    pub files: Vec<String>,
}

/// Resolve backspace overstrikes: each `\b` steps back one cell and the
/// next character overwrites it, except that `_` never hides a letter.
pub fn overstrike(line: &str) -> String {
    let mut cells: Vec<char> = Vec::with_capacity(line.len());
    let mut pos: usize = 0;
    for c in line.chars() {
        if c == '\u{8}' {
            pos = pos.saturating_sub(1);
            continue;
        }
        if pos < cells.len() {
            if c != '_' {
                cells[pos] = c;
            }
        } else {
            cells.push(c);
        }
        pos += 1;
    }
    cells.into_iter().collect()
}

pub fn run(args: ColArgs) -> CmdResult {
    let csi = Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]")
        .map_err(|e| Error::invalid_pattern("CSI", e))?;
    io::map_lines("col", &args.files, |line| {
        let plain = csi.replace_all(line, "");
        let cleaned = overstrike(&plain);
        Some(if args.expand_tabs {
            expand_line(&cleaned, 8, false)
        } else {
            cleaned
        })
    })
}
