use std::io::Write;

use clap::Parser;

use kit::{io, parser, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "64-bit bitwise calculator: bcalc A OP B | bcalc not A")]
pub struct BcalcArgs {
    #[arg(allow_negative_numbers = true, required = true, num_args = 2..=3)]
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Shl,
    Shr,
    Rotl,
    Rotr,
}

impl Op {
    pub fn parse(name: &str) -> Result<Self> {
        Ok(match name.to_ascii_lowercase().as_str() {
            "and" | "&" => Op::And,
            "or" | "|" => Op::Or,
            "xor" | "^" => Op::Xor,
            "nand" => Op::Nand,
            "nor" => Op::Nor,
            "shl" | "<<" => Op::Shl,
            "shr" | ">>" => Op::Shr,
            "rotl" | "rol" => Op::Rotl,
            "rotr" | "ror" => Op::Rotr,
            _ => return Err(Error::invalid_argument("operator", name)),
        })
    }

    pub fn apply(self, a: u64, b: u64) -> u64 {
        let shift = (b & 63) as u32;
        match self {
            Op::And => a & b,
            Op::Or => a | b,
            Op::Xor => a ^ b,
            Op::Nand => !(a & b),
            Op::Nor => !(a | b),
            Op::Shl => a << shift,
            Op::Shr => a >> shift,
            Op::Rotl => a.rotate_left(shift),
            Op::Rotr => a.rotate_right(shift),
        }
    }
}

/// Signed or unsigned 64-bit literal, kept as raw bits.
pub fn parse_bits(input: &str) -> Result<u64> {
    if input.trim_start().starts_with('-') {
        parser::parse_int(input).map(|v| v as u64)
    } else {
        parser::parse_uint(input)
    }
}

/// The four views every bit tool prints.
pub fn render(value: u64) -> Vec<String> {
    vec![
        format!("dec: {}", value as i64),
        format!("hex: {:#x}", value),
        format!("oct: {:#o}", value),
        format!("bin: {:#b}", value),
    ]
}

pub fn evaluate(terms: &[String]) -> Result<u64> {
    match terms {
        [op, a] if op.eq_ignore_ascii_case("not") || op == "~" => Ok(!parse_bits(a)?),
        [a, op, b] => Ok(Op::parse(op)?.apply(parse_bits(a)?, parse_bits(b)?)),
        _ => Err(Error::usage("expected A OP B or not A")),
    }
}

pub fn run(args: BcalcArgs) -> CmdResult {
    let value = evaluate(&args.terms)?;
    let mut out = io::stdout();
    io::write_lines(&mut out, render(value))?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc(terms: &[&str]) -> u64 {
        evaluate(&terms.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn bitwise_ops() {
        assert_eq!(calc(&["12", "and", "10"]), 8);
        assert_eq!(calc(&["12", "or", "0b0011"]), 15);
        assert_eq!(calc(&["0xff", "xor", "0x0f"]), 0xf0);
        assert_eq!(calc(&["0", "nor", "0"]), u64::MAX);
        assert_eq!(calc(&["not", "0"]), u64::MAX);
    }

    #[test]
    fn shifts_mask_count() {
        assert_eq!(calc(&["1", "shl", "4"]), 16);
        assert_eq!(calc(&["1", "shl", "64"]), 1);
        assert_eq!(calc(&["1", "rotr", "1"]), 1 << 63);
        assert_eq!(calc(&["0x8000000000000000", "rotl", "65"]), 1);
    }

    #[test]
    fn negative_operands_are_twos_complement() {
        assert_eq!(calc(&["-1", "and", "0xff"]), 0xff);
        assert_eq!(render(u64::MAX)[0], "dec: -1");
    }

    #[test]
    fn render_all_bases() {
        assert_eq!(render(10), vec!["dec: 10", "hex: 0xa", "oct: 0o12", "bin: 0b1010"]);
    }

    #[test]
    fn unknown_operator() {
        assert!(evaluate(&["1".into(), "plus".into(), "2".into()]).is_err());
    }
}
