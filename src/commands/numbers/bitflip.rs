use std::io::Write;

use clap::Parser;

use kit::{io, Error, Result};

use super::bcalc::{parse_bits, render};
use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Flip selected bits of a 64-bit number (0 = least significant)")]
pub struct BitflipArgs {
    #[arg(allow_negative_numbers = true)]
    pub number: String,

    /// Bit positions to flip; all bits when omitted
    pub bits: Vec<String>,
}

pub fn flip(value: u64, bits: &[u32]) -> Result<u64> {
    if bits.is_empty() {
        return Ok(!value);
    }
    bits.iter().try_fold(value, |acc, &bit| {
        if bit > 63 {
            return Err(Error::invalid_argument("bit position", bit.to_string()));
        }
        Ok(acc ^ (1u64 << bit))
    })
}

pub fn run(args: BitflipArgs) -> CmdResult {
    let value = parse_bits(&args.number)?;
    let bits = args
        .bits
        .iter()
        .map(|b| {
            b.parse::<u32>()
                .map_err(|_| Error::invalid_argument("bit position", b))
        })
        .collect::<Result<Vec<_>>>()?;
    let flipped = flip(value, &bits)?;
    let mut out = io::stdout();
    io::write_lines(&mut out, render(flipped))?;
    out.flush()?;
    Ok(0)
}
