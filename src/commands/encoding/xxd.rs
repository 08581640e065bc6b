use std::io::Write;

use clap::Parser;

use kit::{io, parser, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Hex dump with an ASCII gutter, or reverse a dump with -r")]
pub struct XxdArgs {
    /// Bytes per line
    #[arg(short = 'c', long = "cols", default_value_t = 16)]
    pub cols: usize,

    /// Stop after LEN bytes
    #[arg(short = 'l', long = "len", value_name = "LEN")]
    pub len: Option<String>,

    /// Convert a hex dump back to binary
    #[arg(short = 'r', long = "revert")]
    pub revert: bool,

    pub file: Option<String>,
}

/// One `xxd` line: offset, two-byte groups padded to full width, ASCII.
pub fn dump_line(offset: usize, chunk: &[u8], cols: usize) -> String {
    let width = cols * 2 + cols.div_ceil(2);
    let mut hex = String::with_capacity(width);
    for (i, b) in chunk.iter().enumerate() {
        hex.push_str(&format!("{:02x}", b));
        if i % 2 == 1 {
            hex.push(' ');
        }
    }
    let ascii: String = chunk
        .iter()
        .map(|&b| if (0x20..0x7f).contains(&b) { b as char } else { '.' })
        .collect();
    format!("{:08x}: {:<width$} {}", offset, hex, ascii, width = width)
}

pub fn dump(data: &[u8], cols: usize) -> Vec<String> {
    data.chunks(cols.max(1))
        .enumerate()
        .map(|(i, chunk)| dump_line(i * cols.max(1), chunk, cols.max(1)))
        .collect()
}

/// Parse dump lines back into bytes. Each line's offset places its data;
/// the hex area ends at the first double space.
pub fn revert(text: &str) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for line in text.lines() {
        let Some((offset, rest)) = line.split_once(':') else {
            continue;
        };
        let offset = usize::from_str_radix(offset.trim(), 16)
            .map_err(|_| Error::invalid_value("dump offset", offset))?;
        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        let area = rest.split("  ").next().unwrap_or("");
        let digits: String = area.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = hex::decode(&digits)
            .map_err(|e| Error::invalid_value("hex dump line", e.to_string()))?;
        let end = offset + bytes.len();
        if out.len() < end {
            out.resize(end, 0);
        }
        out[offset..end].copy_from_slice(&bytes);
    }
    Ok(out)
}

pub fn run(args: XxdArgs) -> CmdResult {
    let path = args.file.as_deref().unwrap_or(io::STDIN);
    let mut out = io::stdout();
    if args.revert {
        out.write_all(&revert(&io::read_text(path)?)?)?;
    } else {
        let data = io::read_bytes(path)?;
        let limit = match &args.len {
            Some(n) => (parser::parse_size(n)? as usize).min(data.len()),
            None => data.len(),
        };
        io::write_lines(&mut out, dump(&data[..limit], args.cols))?;
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_xxd_layout() {
        let lines = dump(b"Hello world.Hello again\n", 16);
        assert_eq!(
            lines[0],
            "00000000: 4865 6c6c 6f20 776f 726c 642e 4865 6c6c  Hello world.Hell"
        );
        assert_eq!(
            lines[1],
            "00000010: 6f20 6167 6169 6e0a                      o again."
        );
    }

    #[test]
    fn revert_inverts_dump() {
        let data: Vec<u8> = (0u8..=255).chain(b"  two spaces  ".iter().copied()).collect();
        for cols in [16, 7, 1] {
            let text = dump(&data, cols).join("\n");
            assert_eq!(revert(&text).unwrap(), data, "cols {}", cols);
        }
    }

    #[test]
    fn revert_rejects_bad_hex() {
        assert!(revert("00000000: zz").is_err());
    }
}
