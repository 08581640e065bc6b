use std::collections::HashMap;
use std::io::Write;

use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

const BAR_WIDTH: usize = 40;

#[derive(Parser, Debug)]
#[command(about = "Character frequency histogram")]
pub struct CharfreqArgs {
    /// Fold letters to lowercase before counting
    #[arg(short = 'i', long = "ignore-case")]
    pub ignore_case: bool,

    /// Skip whitespace characters
    #[arg(short = 's', long = "skip-space")]
    pub skip_space: bool,

    /// Show only the N most frequent characters
    #[arg(short = 'n', long = "top", value_name = "N")]
    pub top: Option<usize>,

    pub files: Vec<String>,
}

/// Counts sorted by descending frequency, ties by character.
pub fn frequencies(text: &str, ignore_case: bool, skip_space: bool) -> Vec<(char, usize)> {
    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in text.chars() {
        if skip_space && c.is_whitespace() {
            continue;
        }
        let c = if ignore_case {
            c.to_lowercase().next().unwrap_or(c)
        } else {
            c
        };
        *counts.entry(c).or_default() += 1;
    }
    let mut sorted: Vec<(char, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    sorted
}

pub fn label(c: char) -> String {
    match c {
        ' ' => "SP".to_string(),
        '\n' => "\\n".to_string(),
        '\t' => "\\t".to_string(),
        '\r' => "\\r".to_string(),
        c if c.is_control() => format!("0x{:02x}", c as u32),
        c => c.to_string(),
    }
}

pub fn render(freqs: &[(char, usize)]) -> Vec<String> {
    let total: usize = freqs.iter().map(|(_, n)| n).sum();
    let max = freqs.iter().map(|(_, n)| *n).max().unwrap_or(0);
    freqs
        .iter()
        .map(|(c, n)| {
            let pct = *n as f64 * 100.0 / total.max(1) as f64;
            let bar = (n * BAR_WIDTH).div_ceil(max.max(1));
            format!("{:<4} {:>8} {:>6.2}% {}", label(*c), n, pct, "#".repeat(bar))
        })
        .collect()
}

pub fn run(args: CharfreqArgs) -> CmdResult {
    let mut text = String::new();
    let status = io::each_input("charfreq", &args.files, |_, reader| {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        text.push_str(&String::from_utf8_lossy(&bytes));
        Ok(())
    })?;
    let mut freqs = frequencies(&text, args.ignore_case, args.skip_space);
    if let Some(n) = args.top {
        freqs.truncate(n);
    }
    let mut out = io::stdout();
    io::write_lines(&mut out, render(&freqs))?;
    out.flush()?;
    Ok(status)
}
