use clap::Parser;

use kit::{io, parser, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Insert a separator line every N lines")]
pub struct ChunkArgs {
    /// Lines per chunk
    pub size: String,

    /// Separator line
    #[arg(default_value = "---")]
    pub separator: String,

    /// Read these files instead of standard input
    #[arg(short = 'f', long = "file")]
    pub files: Vec<String>,
}

/// Whether the `n`th line (1-based) starts a new chunk after the first.
pub fn starts_chunk(n: usize, size: usize) -> bool {
    n > 1 && (n - 1) % size == 0
}

pub fn run(args: ChunkArgs) -> CmdResult {
    let size = parser::parse_count(&args.size)?;
    if size == 0 {
        return Err(Error::invalid_argument("chunk size", &args.size));
    }
    let mut seen = 0usize;
    io::map_lines("chunk", &args.files, |line| {
        seen += 1;
        Some(if starts_chunk(seen, size) {
            format!("{}\n{}", args.separator, line)
        } else {
            line.to_string()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_goes_between_chunks() {
        let starts: Vec<usize> = (1..=7).filter(|&n| starts_chunk(n, 3)).collect();
        assert_eq!(starts, vec![4, 7]);
    }

    #[test]
    fn exact_multiple_has_no_trailing_separator() {
        assert!(!(1..=6).any(|n| starts_chunk(n, 6)));
    }
}
