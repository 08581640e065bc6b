use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::Parser;

use kit::{codec, io, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Base-N encode or decode FILE (or standard input) to standard output")]
pub struct BaseArgs {
    /// Decode data
    #[arg(short = 'd', long = "decode")]
    pub decode: bool,

    /// When decoding, drop characters outside the alphabet
    #[arg(short = 'i', long = "ignore-garbage")]
    pub ignore_garbage: bool,

    /// Wrap encoded lines after COLS characters (0 disables wrapping)
    #[arg(short = 'w', long = "wrap", value_name = "COLS", default_value_t = 76)]
    pub wrap: usize,

    pub file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    Base32,
    Base64,
}

impl Base {
    fn in_alphabet(self, c: char) -> bool {
        match self {
            Base::Base64 => c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='),
            Base::Base32 => matches!(c, 'A'..='Z' | 'a'..='z' | '2'..='7' | '='),
        }
    }

    pub fn encode(self, data: &[u8]) -> String {
        match self {
            Base::Base64 => STANDARD.encode(data),
            Base::Base32 => codec::base32_encode(data),
        }
    }

    pub fn decode(self, text: &str, ignore_garbage: bool) -> Result<Vec<u8>> {
        let cleaned: String = codec::strip_whitespace(text)
            .chars()
            .filter(|&c| !ignore_garbage || self.in_alphabet(c))
            .collect();
        match self {
            Base::Base64 => STANDARD
                .decode(cleaned.as_bytes())
                .map_err(|e| Error::invalid_value("input", e.to_string())),
            Base::Base32 => codec::base32_decode(&cleaned),
        }
    }
}

pub fn run_base64(args: BaseArgs) -> CmdResult {
    run(Base::Base64, args)
}

pub fn run_base32(args: BaseArgs) -> CmdResult {
    run(Base::Base32, args)
}

fn run(base: Base, args: BaseArgs) -> CmdResult {
    let path = args.file.as_deref().unwrap_or(io::STDIN);
    let data = io::read_bytes(path)?;
    let mut out = io::stdout();
    if args.decode {
        let text = String::from_utf8_lossy(&data);
        out.write_all(&base.decode(&text, args.ignore_garbage)?)?;
    } else {
        let encoded = base.encode(&data);
        if !encoded.is_empty() {
            io::write_lines(&mut out, codec::wrap(&encoded, args.wrap))?;
        }
    }
    out.flush()?;
    Ok(0)
}
