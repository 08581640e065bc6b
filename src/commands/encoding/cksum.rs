use std::io::{Read, Write};

use clap::Parser;

use kit::checksum::{BsdSum, Cksum, SysvSum};
use kit::hash::CHUNK;
use kit::{io, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Print the POSIX CRC checksum and byte count of each file")]
pub struct CksumArgs {
    pub files: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Print the 16-bit checksum and block count of each file")]
pub struct SumArgs {
    /// BSD algorithm, 1K blocks (default)
    #[arg(short = 'r', overrides_with = "sysv")]
    pub bsd: bool,

    /// System V algorithm, 512-byte blocks
    #[arg(short = 's', long = "sysv", overrides_with = "bsd")]
    pub sysv: bool,

    pub files: Vec<String>,
}

fn feed(path: &str, reader: &mut dyn Read, mut update: impl FnMut(&[u8])) -> Result<()> {
    let mut buf = vec![0u8; CHUNK];
    loop {
        let n = reader.read(&mut buf).map_err(|e| Error::io(path, &e))?;
        if n == 0 {
            return Ok(());
        }
        update(&buf[..n]);
    }
}

fn with_name(line: String, path: &str) -> String {
    if path == io::STDIN {
        line
    } else {
        format!("{} {}", line, path)
    }
}

pub fn cksum_line(sum: &Cksum) -> String {
    format!("{} {}", sum.finish(), sum.len())
}

pub fn bsd_line(sum: &BsdSum) -> String {
    format!("{:05} {:>5}", sum.checksum(), sum.blocks())
}

pub fn sysv_line(sum: &SysvSum) -> String {
    format!("{} {}", sum.checksum(), sum.blocks())
}

pub fn run(args: CksumArgs) -> CmdResult {
    let files = io::operands(&args.files);
    let mut out = io::stdout();
    let status = io::each_input("cksum", &files, |path, reader| {
        let mut sum = Cksum::new();
        feed(path, reader, |data| sum.update(data))?;
        writeln!(out, "{}", with_name(cksum_line(&sum), path))?;
        Ok(())
    })?;
    out.flush()?;
    Ok(status)
}

pub fn run_sum(args: SumArgs) -> CmdResult {
    let files = io::operands(&args.files);
    let mut out = io::stdout();
    let status = io::each_input("sum", &files, |path, reader| {
        let line = if args.sysv {
            let mut sum = SysvSum::new();
            feed(path, reader, |data| sum.update(data))?;
            sysv_line(&sum)
        } else {
            let mut sum = BsdSum::new();
            feed(path, reader, |data| sum.update(data))?;
            bsd_line(&sum)
        };
        writeln!(out, "{}", with_name(line, path))?;
        Ok(())
    })?;
    out.flush()?;
    Ok(status)
}
