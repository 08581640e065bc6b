use std::io::Write;

use clap::{Parser, ValueEnum};

use kit::{io, parser};

use crate::commands::CmdResult;

const ROW: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Radix {
    #[value(name = "o")]
    Octal,
    #[value(name = "x")]
    Hex,
    #[value(name = "d")]
    Decimal,
    #[value(name = "n")]
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ValueType {
    #[value(name = "o")]
    Octal,
    #[value(name = "x")]
    Hex,
    #[value(name = "d")]
    Decimal,
    #[value(name = "c")]
    Char,
}

#[derive(Parser, Debug)]
#[command(about = "Dump files in octal and other formats")]
pub struct OdArgs {
    /// Address radix
    #[arg(short = 'A', long = "address-radix", value_enum, default_value = "o")]
    pub address: Radix,

    /// Byte value format
    #[arg(short = 't', long = "format", value_enum, default_value = "o")]
    pub format: ValueType,

    /// Skip BYTES input bytes first
    #[arg(short = 'j', long = "skip-bytes", value_name = "BYTES")]
    pub skip: Option<String>,

    /// Dump at most BYTES input bytes
    #[arg(short = 'N', long = "read-bytes", value_name = "BYTES")]
    pub limit: Option<String>,

    /// Print duplicate rows instead of `*`
    #[arg(short = 'v', long = "output-duplicates")]
    pub verbose: bool,

    pub files: Vec<String>,
}

fn address(radix: Radix, offset: usize) -> String {
    match radix {
        Radix::Octal => format!("{:07o}", offset),
        Radix::Hex => format!("{:07x}", offset),
        Radix::Decimal => format!("{:07}", offset),
        Radix::None => String::new(),
    }
}

fn cell(format: ValueType, b: u8) -> String {
    match format {
        ValueType::Octal => format!(" {:03o}", b),
        ValueType::Hex => format!(" {:02x}", b),
        ValueType::Decimal => format!(" {:4}", b as i8),
        ValueType::Char => {
            let shown = match b {
                0 => "\\0".to_string(),
                0x07 => "\\a".to_string(),
                0x08 => "\\b".to_string(),
                b'\t' => "\\t".to_string(),
                b'\n' => "\\n".to_string(),
                0x0b => "\\v".to_string(),
                0x0c => "\\f".to_string(),
                b'\r' => "\\r".to_string(),
                0x20..=0x7e => (b as char).to_string(),
                _ => format!("{:03o}", b),
            };
            format!(" {:>3}", shown)
        }
    }
}

pub fn dump(data: &[u8], start: usize, args: &OdArgs) -> Vec<String> {
    let mut lines = Vec::new();
    let mut previous: Option<&[u8]> = None;
    let mut starred = false;
    for (i, chunk) in data.chunks(ROW).enumerate() {
        if !args.verbose && chunk.len() == ROW && previous == Some(chunk) {
            if !starred {
                lines.push("*".to_string());
                starred = true;
            }
            continue;
        }
        starred = false;
        previous = Some(chunk);
        let mut line = address(args.address, start + i * ROW);
        for &b in chunk {
            line.push_str(&cell(args.format, b));
        }
        lines.push(line);
    }
    if args.address != Radix::None {
        lines.push(address(args.address, start + data.len()));
    }
    lines
}

pub fn run(args: OdArgs) -> CmdResult {
    let skip = args.skip.as_deref().map(parser::parse_size).transpose()?;
    let limit = args.limit.as_deref().map(parser::parse_size).transpose()?;
    let mut data = Vec::new();
    let status = io::each_input("od", &args.files, |_, reader| {
        reader.read_to_end(&mut data)?;
        Ok(())
    })?;
    let start = (skip.unwrap_or(0) as usize).min(data.len());
    let end = match limit {
        Some(n) => start.saturating_add(n as usize).min(data.len()),
        None => data.len(),
    };
    let mut out = io::stdout();
    io::write_lines(&mut out, dump(&data[start..end], start, &args))?;
    out.flush()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> OdArgs {
        OdArgs::parse_from(std::iter::once("od").chain(argv.iter().copied()))
    }

    #[test]
    fn octal_default() {
        let lines = dump(b"AB\n", 0, &args(&[]));
        assert_eq!(lines, vec!["0000000 101 102 012", "0000003"]);
    }

    #[test]
    fn hex_values_decimal_addresses() {
        let lines = dump(b"hi", 16, &args(&["-t", "x", "-A", "d"]));
        assert_eq!(lines, vec!["0000016 68 69", "0000018"]);
    }

    #[test]
    fn characters_and_no_address() {
        let lines = dump(b"a\t\xff", 0, &args(&["-t", "c", "-A", "n"]));
        assert_eq!(lines, vec!["   a  \\t 377"]);
    }

    #[test]
    fn duplicate_rows_collapse() {
        let data = [0u8; 48];
        let lines = dump(&data, 0, &args(&["-t", "x"]));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "*");
        assert_eq!(lines[2], "0000060");
        assert_eq!(dump(&data, 0, &args(&["-v"])).len(), 4);
    }
}
