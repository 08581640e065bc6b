use std::io::Write;

use clap::Parser;
use unicode_width::UnicodeWidthStr;

use kit::{io, parser};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Align delimited columns")]
pub struct AlignArgs {
    /// Input delimiter (default: runs of whitespace)
    #[arg(short = 'd', long = "delimiter")]
    pub delimiter: Option<String>,

    /// Padding character
    #[arg(short = 'p', long = "pad", default_value = " ")]
    pub pad: String,

    /// Output separator between columns
    #[arg(short = 's', long = "separator", default_value = "  ")]
    pub separator: String,

    /// Right-justify columns
    #[arg(short = 'r', long = "right")]
    pub right: bool,

    pub files: Vec<String>,
}

pub fn split_row(line: &str, delimiter: Option<&str>) -> Vec<String> {
    match delimiter {
        Some(d) => line.split(d).map(|f| f.trim().to_string()).collect(),
        None => line.split_whitespace().map(str::to_string).collect(),
    }
}

/// Pad each column to its widest cell. Left-justified rows carry no
/// padding after their last field.
pub fn align(rows: &[Vec<String>], pad: char, separator: &str, right: bool) -> Vec<String> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }
    rows.iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let fill = pad.to_string().repeat(widths[i] - cell.width());
                    if right {
                        format!("{}{}", fill, cell)
                    } else if i + 1 == row.len() {
                        cell.clone()
                    } else {
                        format!("{}{}", cell, fill)
                    }
                })
                .collect();
            cells.join(separator)
        })
        .collect()
}

pub fn run(args: AlignArgs) -> CmdResult {
    let delimiter = args.delimiter.as_deref().map(parser::unescape);
    let pad = args.pad.chars().next().unwrap_or(' ');
    let separator = parser::unescape(&args.separator);
    let rows: Vec<Vec<String>> = io::read_all_lines(&args.files)?
        .iter()
        .map(|l| split_row(l, delimiter.as_deref()))
        .collect();
    let mut out = io::stdout();
    io::write_lines(&mut out, align(&rows, pad, &separator, args.right))?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&str], d: Option<&str>) -> Vec<Vec<String>> {
        lines.iter().map(|l| split_row(l, d)).collect()
    }

    #[test]
    fn left_align_without_trailing_spaces() {
        let out = align(&rows(&["a bb c", "dddd e f"], None), ' ', " ", false);
        assert_eq!(out, vec!["a    bb c", "dddd e  f"]);
        assert!(out.iter().all(|l| !l.ends_with(' ')));
    }

    #[test]
    fn right_align_with_pad_char() {
        let out = align(&rows(&["1,22", "333,4"], Some(",")), '.', "|", true);
        assert_eq!(out, vec!["..1|22", "333|.4"]);
    }

    #[test]
    fn ragged_rows() {
        let out = align(&rows(&["a b c", "dd"], None), ' ', " ", false);
        assert_eq!(out, vec!["a  b c", "dd"]);
    }
}
