use std::io::Write;

use clap::Parser;

use kit::{io, parser};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Merge lines of files")]
pub struct PasteArgs {
    /// Reuse characters from LIST as delimiters, cycling
    #[arg(short = 'd', long = "delimiters", default_value = "\t")]
    pub delimiters: String,

    /// Paste one file at a time instead of in parallel
    #[arg(short = 's', long = "serial")]
    pub serial: bool,

    pub files: Vec<String>,
}

fn join_cycling(parts: &[&str], delims: &[char]) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 && !delims.is_empty() {
            out.push(delims[(i - 1) % delims.len()]);
        }
        out.push_str(part);
    }
    out
}

/// Line i of the output joins line i of every input; short inputs
/// contribute empty fields.
pub fn parallel(inputs: &[Vec<String>], delims: &[char]) -> Vec<String> {
    let rows = inputs.iter().map(Vec::len).max().unwrap_or(0);
    (0..rows)
        .map(|i| {
            let parts: Vec<&str> = inputs
                .iter()
                .map(|lines| lines.get(i).map(String::as_str).unwrap_or(""))
                .collect();
            join_cycling(&parts, delims)
        })
        .collect()
}

pub fn serial(inputs: &[Vec<String>], delims: &[char]) -> Vec<String> {
    inputs
        .iter()
        .map(|lines| {
            let parts: Vec<&str> = lines.iter().map(String::as_str).collect();
            join_cycling(&parts, delims)
        })
        .collect()
}

pub fn run(args: PasteArgs) -> CmdResult {
    let delims: Vec<char> = parser::unescape(&args.delimiters).chars().collect();
    let mut inputs = Vec::new();
    for path in io::operands(&args.files) {
        inputs.push(io::read_lines(&path)?);
    }
    let merged = if args.serial {
        serial(&inputs, &delims)
    } else {
        parallel(&inputs, &delims)
    };
    let mut out = io::stdout();
    io::write_lines(&mut out, merged)?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parallel_pads_short_inputs() {
        let out = parallel(&[lines(&["1", "2"]), lines(&["a"])], &['\t']);
        assert_eq!(out, lines(&["1\ta", "2\t"]));
    }

    #[test]
    fn serial_joins_each_file() {
        let out = serial(&[lines(&["1", "2", "3"]), lines(&["a", "b"])], &[',']);
        assert_eq!(out, lines(&["1,2,3", "a,b"]));
    }

    #[test]
    fn delimiters_cycle() {
        let out = serial(&[lines(&["1", "2", "3", "4"])], &[',', ';']);
        assert_eq!(out, lines(&["1,2;3,4"]));
    }

    #[test]
    fn cut_then_paste_reconstructs_fields() {
        let ranges = parser::parse_ranges("1,3").unwrap();
        let rows = ["a,b,c", "d,e,f"];
        let col1: Vec<String> = rows
            .iter()
            .map(|r| super::super::cut::cut_fields(r, ",", &[ranges[0]], false).unwrap())
            .collect();
        let col3: Vec<String> = rows
            .iter()
            .map(|r| super::super::cut::cut_fields(r, ",", &[ranges[1]], false).unwrap())
            .collect();
        assert_eq!(parallel(&[col1, col3], &[',']), lines(&["a,c", "d,f"]));
    }
}
