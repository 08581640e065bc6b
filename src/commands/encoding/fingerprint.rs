use std::io::Write;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use clap::Parser;

use kit::hash::sha256;
use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "SHA-256 fingerprint and SSH-style randomart of the input")]
pub struct FingerprintArgs {
    /// Label shown in the top border
    #[arg(short = 'l', long = "label", default_value = "SHA256")]
    pub label: String,

    pub file: Option<String>,
}

const WIDTH: usize = 17;
const HEIGHT: usize = 9;
const SYMBOLS: &[u8] = b" .o+=*BOX@%&#/^";

/// The drunken bishop walk over a 17x9 field. Each byte supplies four
/// moves, low bit pair first; the walk is clamped at the walls.
pub fn randomart(digest: &[u8], label: &str) -> Vec<String> {
    let mut field = [[0usize; WIDTH]; HEIGHT];
    let (mut x, mut y) = (WIDTH / 2, HEIGHT / 2);
    let start = (x, y);
    for &byte in digest {
        let mut b = byte;
        for _ in 0..4 {
            x = if b & 1 != 0 {
                (x + 1).min(WIDTH - 1)
            } else {
                x.saturating_sub(1)
            };
            y = if b & 2 != 0 {
                (y + 1).min(HEIGHT - 1)
            } else {
                y.saturating_sub(1)
            };
            field[y][x] += 1;
            b >>= 2;
        }
    }

    let title = format!("[{}]", label);
    let mut lines = vec![border(&title)];
    for (row, cells) in field.iter().enumerate() {
        let mut line = String::from("|");
        for (col, &count) in cells.iter().enumerate() {
            let c = if (col, row) == (x, y) {
                'E'
            } else if (col, row) == start {
                'S'
            } else {
                SYMBOLS[count.min(SYMBOLS.len() - 1)] as char
            };
            line.push(c);
        }
        line.push('|');
        lines.push(line);
    }
    lines.push(border(""));
    lines
}

fn border(title: &str) -> String {
    let len = title.chars().count().min(WIDTH);
    let left = (WIDTH - len) / 2;
    let title: String = title.chars().take(WIDTH).collect();
    format!("+{}{}{}+", "-".repeat(left), title, "-".repeat(WIDTH - len - left))
}

pub fn run(args: FingerprintArgs) -> CmdResult {
    let data = io::read_bytes(args.file.as_deref().unwrap_or(io::STDIN))?;
    let digest = sha256(&data);
    let mut out = io::stdout();
    writeln!(out, "SHA256:{}", STANDARD_NO_PAD.encode(digest))?;
    io::write_lines(&mut out, randomart(&digest, &args.label))?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_dimensions() {
        let art = randomart(&sha256(b"hello"), "SHA256");
        assert_eq!(art.len(), HEIGHT + 2);
        assert!(art.iter().all(|l| l.chars().count() == WIDTH + 2));
        assert_eq!(art[0], "+----[SHA256]-----+");
        assert_eq!(art[HEIGHT + 1], format!("+{}+", "-".repeat(WIDTH)));
    }

    #[test]
    fn start_is_centre() {
        let art = randomart(&[0u8; 0], "x");
        assert_eq!(art[1 + HEIGHT / 2].chars().nth(1 + WIDTH / 2), Some('E'));
        let art = randomart(&[0b1010_1010], "x");
        assert_eq!(art[1 + HEIGHT / 2].chars().nth(1 + WIDTH / 2), Some('S'));
    }

    #[test]
    fn same_input_same_art() {
        assert_eq!(
            randomart(&sha256(b"a"), "k"),
            randomart(&sha256(b"a"), "k")
        );
        assert_ne!(randomart(&sha256(b"a"), "k"), randomart(&sha256(b"b"), "k"));
    }
}
