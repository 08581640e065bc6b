use std::io::{Read, Write};

use clap::Parser;

use kit::{io, parser};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Copy a byte-exact prefix or suffix of files")]
pub struct FileheadArgs {
    /// Number of bytes (K, M, G suffixes allowed)
    #[arg(short = 'c', short_alias = 'n', long = "bytes", value_name = "SIZE", default_value = "1K")]
    pub bytes: String,

    pub files: Vec<String>,
}

/// The last `n` bytes of `data`.
pub fn suffix(data: &[u8], n: u64) -> &[u8] {
    let start = data.len().saturating_sub(n.min(usize::MAX as u64) as usize);
    &data[start..]
}

fn copy(tool: &str, args: FileheadArgs, tail: bool) -> CmdResult {
    let n = parser::parse_size(&args.bytes)?;
    let mut out = io::stdout();
    let status = io::each_input(tool, &args.files, |_, reader| {
        if tail {
            let mut data = Vec::new();
            reader.read_to_end(&mut data)?;
            out.write_all(suffix(&data, n))?;
        } else {
            std::io::copy(&mut reader.take(n), &mut out)?;
        }
        Ok(())
    })?;
    out.flush()?;
    Ok(status)
}

pub fn run_head(args: FileheadArgs) -> CmdResult {
    copy("filehead", args, false)
}

pub fn run_tail(args: FileheadArgs) -> CmdResult {
    copy("filetail", args, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_is_binary_safe() {
        assert_eq!(suffix(&[0, 255, 1, 2], 2), &[1, 2]);
        assert_eq!(suffix(b"ab", 10), b"ab");
        assert_eq!(suffix(b"ab", 0), b"");
    }
}
