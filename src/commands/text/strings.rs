use std::io::Write;

use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Print runs of printable characters found in binary data")]
pub struct StringsArgs {
    /// Minimum run length
    #[arg(short = 'n', long = "bytes", default_value_t = 4)]
    pub min: usize,

    /// Prefix each string with its decimal offset
    #[arg(short = 'o')]
    pub offsets: bool,

    pub files: Vec<String>,
}

fn printable(b: u8) -> bool {
    (0x20..=0x7e).contains(&b) || b == b'\t'
}

/// Printable ASCII runs of at least `min` bytes with their start offsets.
pub fn scan(data: &[u8], min: usize) -> Vec<(usize, &[u8])> {
    let mut found = Vec::new();
    let mut start = None;
    for (i, &b) in data.iter().enumerate() {
        match (printable(b), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s >= min {
                    found.push((s, &data[s..i]));
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if data.len() - s >= min {
            found.push((s, &data[s..]));
        }
    }
    found
}

pub fn run(args: StringsArgs) -> CmdResult {
    let min = args.min.max(1);
    let mut out = io::stdout();
    let status = io::each_input("strings", &args.files, |_, reader| {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        for (offset, run) in scan(&data, min) {
            if args.offsets {
                write!(out, "{:>7} ", offset)?;
            }
            out.write_all(run)?;
            out.write_all(b"\n")?;
        }
        Ok(())
    })?;
    out.flush()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_runs_at_least_min() {
        let data = b"\x00\x01hello\x00ab\x02world!";
        let runs: Vec<(usize, &[u8])> = scan(data, 4);
        assert_eq!(runs, vec![(2, &b"hello"[..]), (11, &b"world!"[..])]);
    }

    #[test]
    fn short_runs_are_dropped() {
        assert!(scan(b"\x00abc\x00", 4).is_empty());
        assert_eq!(scan(b"abc", 3).len(), 1);
    }
}
