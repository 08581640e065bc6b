use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use clap::Parser;
use rand::rngs::OsRng;
use rand::RngCore;

use kit::{log_status, output, Error};

use crate::commands::CmdResult;

const BLOCK: usize = 64 * 1024;

#[derive(Parser, Debug)]
#[command(about = "Overwrite files to hide their contents")]
pub struct ShredArgs {
    /// Overwrite N times
    #[arg(short = 'n', long = "iterations", default_value_t = 3)]
    pub iterations: usize,

    /// Add a final overwrite with zeros
    #[arg(short = 'z', long = "zero")]
    pub zero: bool,

    /// Remove the file afterwards
    #[arg(short = 'u', long = "remove")]
    pub remove: bool,

    /// Show progress
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[arg(required = true)]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Random,
    Zero,
}

/// Overwrite the first `len` bytes of `file` once, then flush to disk.
pub fn overwrite(file: &mut File, len: u64, pass: Pass) -> std::io::Result<()> {
    file.seek(SeekFrom::Start(0))?;
    let mut buf = vec![0u8; BLOCK];
    let mut left = len;
    while left > 0 {
        let n = left.min(BLOCK as u64) as usize;
        if pass == Pass::Random {
            OsRng.fill_bytes(&mut buf[..n]);
        }
        file.write_all(&buf[..n])?;
        left -= n as u64;
    }
    file.sync_all()
}

fn passes(args: &ShredArgs) -> Vec<Pass> {
    let mut plan = vec![Pass::Random; args.iterations];
    if args.zero {
        plan.push(Pass::Zero);
    }
    plan
}

fn shred(path: &str, args: &ShredArgs) -> kit::Result<()> {
    let fail = |e: std::io::Error| Error::io(path, &e);
    let mut file = OpenOptions::new().write(true).open(path).map_err(fail)?;
    let len = file.metadata().map_err(fail)?.len();
    let plan = passes(args);
    for (i, pass) in plan.iter().enumerate() {
        if args.verbose {
            let label = match pass {
                Pass::Random => "random",
                Pass::Zero => "000000",
            };
            log_status!("shred", "{}: pass {}/{} ({})...", path, i + 1, plan.len(), label);
        }
        overwrite(&mut file, len, *pass).map_err(fail)?;
    }
    drop(file);
    if args.remove {
        if args.verbose {
            log_status!("shred", "{}: removing", path);
        }
        fs::remove_file(Path::new(path)).map_err(fail)?;
    }
    Ok(())
}

pub fn run(args: ShredArgs) -> CmdResult {
    let mut status = 0;
    for path in &args.files {
        if let Err(err) = shred(path, &args) {
            output::diagnostic("shred", &err.message);
            status = 1;
        }
    }
    Ok(status)
}
