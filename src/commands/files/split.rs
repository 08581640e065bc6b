use std::fs;
use std::path::PathBuf;

use clap::Parser;

use kit::{io, parser, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Split a file into fixed-size pieces")]
pub struct SplitArgs {
    /// Lines per output file
    #[arg(short = 'l', long = "lines", value_name = "N", conflicts_with = "bytes")]
    pub lines: Option<usize>,

    /// Bytes per output file (K, M, G suffixes)
    #[arg(short = 'b', long = "bytes", value_name = "SIZE")]
    pub bytes: Option<String>,

    /// Numeric suffixes instead of alphabetic
    #[arg(short = 'd', long = "numeric-suffixes")]
    pub numeric: bool,

    /// Suffix length
    #[arg(short = 'a', long = "suffix-length", default_value_t = 2)]
    pub suffix_length: usize,

    #[arg(default_value = "-")]
    pub file: String,

    #[arg(default_value = "x")]
    pub prefix: String,
}

/// Suffix number `index`: `aa, ab, ... zz` or `00, 01, ... 99`.
pub fn suffix(index: usize, width: usize, numeric: bool) -> kit::Result<String> {
    let (base, first) = if numeric { (10, b'0') } else { (26, b'a') };
    let mut digits = vec![first; width];
    let mut rest = index;
    for slot in digits.iter_mut().rev() {
        *slot = first + (rest % base) as u8;
        rest /= base;
    }
    if rest > 0 || width == 0 {
        return Err(Error::runtime("output file suffixes exhausted"));
    }
    Ok(String::from_utf8_lossy(&digits).into_owned())
}

/// Cut `data` into pieces of `lines` lines each.
pub fn by_lines(data: &[u8], lines: usize) -> Vec<&[u8]> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for group in io::split_inclusive_lines(data).chunks(lines.max(1)) {
        let len: usize = group.iter().map(|l| l.len()).sum();
        pieces.push(&data[start..start + len]);
        start += len;
    }
    pieces
}

pub fn run(args: SplitArgs) -> CmdResult {
    let data = io::read_bytes(&args.file)?;
    let pieces: Vec<&[u8]> = match &args.bytes {
        Some(size) => {
            let size = parser::parse_size(size)?;
            if size == 0 {
                return Err(Error::invalid_value("number of bytes", "0"));
            }
            data.chunks(size as usize).collect()
        }
        None => {
            let lines = args.lines.unwrap_or(1000);
            if lines == 0 {
                return Err(Error::invalid_value("number of lines", "0"));
            }
            by_lines(&data, lines)
        }
    };

    for (i, piece) in pieces.iter().enumerate() {
        let name = PathBuf::from(format!(
            "{}{}",
            args.prefix,
            suffix(i, args.suffix_length, args.numeric)?
        ));
        tracing::debug!(file = %name.display(), bytes = piece.len(), "split piece");
        fs::write(&name, piece).map_err(|e| Error::io(name.display().to_string(), &e))?;
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabetic_suffixes() {
        assert_eq!(suffix(0, 2, false).unwrap(), "aa");
        assert_eq!(suffix(1, 2, false).unwrap(), "ab");
        assert_eq!(suffix(26, 2, false).unwrap(), "ba");
        assert_eq!(suffix(675, 2, false).unwrap(), "zz");
        assert!(suffix(676, 2, false).is_err());
    }

    #[test]
    fn numeric_suffixes() {
        assert_eq!(suffix(7, 2, true).unwrap(), "07");
        assert_eq!(suffix(99, 2, true).unwrap(), "99");
        assert!(suffix(100, 2, true).is_err());
    }

    #[test]
    fn one_line_per_piece() {
        let pieces = by_lines(b"a\nb\nc", 1);
        assert_eq!(pieces, vec![&b"a\n"[..], &b"b\n"[..], &b"c"[..]]);
    }

    #[test]
    fn groups_keep_framing() {
        let pieces = by_lines(b"1\n2\n3\n4\n5\n", 2);
        assert_eq!(pieces, vec![&b"1\n2\n"[..], &b"3\n4\n"[..], &b"5\n"[..]]);
    }

    #[test]
    fn empty_input_has_no_pieces() {
        assert!(by_lines(b"", 3).is_empty());
    }
}
