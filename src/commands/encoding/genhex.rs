use std::io::Write;

use clap::{Parser, ValueEnum};
use rand::rngs::OsRng;
use rand::RngCore;

use kit::{codec, io, Error, Result};

use crate::commands::CmdResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Dump,
    Encode,
    Decode,
    Rand,
}

#[derive(Parser, Debug)]
#[command(about = "Hex dump, hex encode/decode, or random hex bytes")]
pub struct GenhexArgs {
    #[arg(value_enum)]
    pub mode: Mode,

    /// Input file, or the byte count for `rand` (default 16)
    pub operand: Option<String>,
}

fn printable(b: u8) -> char {
    if (0x20..0x7f).contains(&b) {
        b as char
    } else {
        '.'
    }
}

/// Canonical `offset  hex  |ascii|` rows, 16 bytes with a gap after 8.
pub fn dump(data: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    for (row, chunk) in data.chunks(16).enumerate() {
        let mut hex = String::with_capacity(49);
        for i in 0..16 {
            if i == 8 {
                hex.push(' ');
            }
            match chunk.get(i) {
                Some(b) => hex.push_str(&format!("{:02x} ", b)),
                None => hex.push_str("   "),
            }
        }
        let ascii: String = chunk.iter().map(|&b| printable(b)).collect();
        lines.push(format!("{:08x}  {} |{}|", row * 16, hex, ascii));
    }
    lines.push(format!("{:08x}", data.len()));
    lines
}

pub fn decode(text: &str) -> Result<Vec<u8>> {
    hex::decode(codec::strip_whitespace(text))
        .map_err(|e| Error::invalid_value("hex input", e.to_string()))
}

pub fn run(args: GenhexArgs) -> CmdResult {
    let mut out = io::stdout();
    match args.mode {
        Mode::Rand => {
            let count = match &args.operand {
                Some(n) => kit::parser::parse_count(n)?,
                None => 16,
            };
            let mut bytes = vec![0u8; count];
            OsRng.fill_bytes(&mut bytes);
            writeln!(out, "{}", hex::encode(bytes))?;
        }
        mode => {
            let data = io::read_bytes(args.operand.as_deref().unwrap_or(io::STDIN))?;
            match mode {
                Mode::Dump => io::write_lines(&mut out, dump(&data))?,
                Mode::Encode => writeln!(out, "{}", hex::encode(&data))?,
                _ => out.write_all(&decode(&String::from_utf8_lossy(&data))?)?,
            }
        }
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_layout() {
        let lines = dump(b"Hello, world!\n0123");
        assert_eq!(
            lines[0],
            "00000000  48 65 6c 6c 6f 2c 20 77  6f 72 6c 64 21 0a 30 31  |Hello, world!.01|"
        );
        assert!(lines[1].starts_with("00000010  32 33 "));
        assert!(lines[1].ends_with(" |23|"));
        assert_eq!(lines[2], "00000012");
    }

    #[test]
    fn decode_ignores_whitespace() {
        assert_eq!(decode("48 65\n6c6c 6f\n").unwrap(), b"Hello");
        assert!(decode("4").is_err());
        assert!(decode("zz").is_err());
    }
}
