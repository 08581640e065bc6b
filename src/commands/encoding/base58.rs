use std::io::Write;

use clap::{Parser, ValueEnum};

use kit::{codec, io};

use crate::commands::CmdResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Encode,
    Decode,
    CheckEncode,
    CheckDecode,
}

#[derive(Parser, Debug)]
#[command(about = "Bitcoin-alphabet base58 and base58check")]
pub struct Base58Args {
    #[arg(value_enum)]
    pub mode: Mode,

    /// Input text; standard input when omitted
    pub input: Option<String>,
}

pub fn run(args: Base58Args) -> CmdResult {
    let data = match &args.input {
        Some(text) => text.as_bytes().to_vec(),
        None => io::read_bytes(io::STDIN)?,
    };
    let mut out = io::stdout();
    match args.mode {
        Mode::Encode => writeln!(out, "{}", codec::base58_encode(&data))?,
        Mode::CheckEncode => writeln!(out, "{}", codec::base58check_encode(&data))?,
        Mode::Decode | Mode::CheckDecode => {
            let text = String::from_utf8_lossy(&data);
            let text = text.trim();
            let decoded = if args.mode == Mode::Decode {
                codec::base58_decode(text)?
            } else {
                codec::base58check_decode(text)?
            };
            out.write_all(&decoded)?;
        }
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_parse_kebab_case() {
        let args = Base58Args::parse_from(["base58", "check-decode", "x"]);
        assert_eq!(args.mode, Mode::CheckDecode);
        assert_eq!(args.input.as_deref(), Some("x"));
    }
}
