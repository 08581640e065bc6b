use std::io::{BufRead, Write};

use clap::Parser;

use kit::hash::{self, Algorithm};
use kit::{io, output, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Print or check message digests")]
pub struct HashsumArgs {
    /// Read digests from the files and verify them
    #[arg(short = 'c', long = "check")]
    pub check: bool,

    /// Don't print OK for each verified file
    #[arg(long = "quiet")]
    pub quiet: bool,

    /// Print nothing; the exit status reports success
    #[arg(long = "status")]
    pub status: bool,

    pub files: Vec<String>,
}

pub fn run_md5sum(args: HashsumArgs) -> CmdResult {
    run("md5sum", Algorithm::Md5, args)
}

pub fn run_sha1sum(args: HashsumArgs) -> CmdResult {
    run("sha1sum", Algorithm::Sha1, args)
}

pub fn run_sha224sum(args: HashsumArgs) -> CmdResult {
    run("sha224sum", Algorithm::Sha224, args)
}

pub fn run_sha256sum(args: HashsumArgs) -> CmdResult {
    run("sha256sum", Algorithm::Sha256, args)
}

pub fn run_sha384sum(args: HashsumArgs) -> CmdResult {
    run("sha384sum", Algorithm::Sha384, args)
}

pub fn run_sha512sum(args: HashsumArgs) -> CmdResult {
    run("sha512sum", Algorithm::Sha512, args)
}

pub fn run_b2sum(args: HashsumArgs) -> CmdResult {
    run("b2sum", Algorithm::Blake2b, args)
}

fn run(tool: &str, algorithm: Algorithm, args: HashsumArgs) -> CmdResult {
    if args.check {
        return check(tool, algorithm, &args);
    }
    let files = io::operands(&args.files);
    let mut out = io::stdout();
    let status = io::each_input(tool, &files, |path, reader| {
        let digest = hash::hash_reader(algorithm, reader).map_err(|e| Error::io(path, &e))?;
        writeln!(out, "{}", hash::format_line(&digest, path))?;
        Ok(())
    })?;
    out.flush()?;
    Ok(status)
}

/// Tallies for one `-c` run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Verification {
    pub mismatched: usize,
    pub unreadable: usize,
    pub malformed: usize,
    pub verified: usize,
}

impl Verification {
    pub fn failed(&self) -> bool {
        self.mismatched > 0 || self.unreadable > 0 || self.verified == 0
    }

    pub fn warnings(&self) -> Vec<String> {
        let plural = |n: usize, one: &str, many: &str| {
            if n == 1 {
                one.to_string()
            } else {
                many.to_string()
            }
        };
        let mut lines = Vec::new();
        if self.malformed > 0 {
            lines.push(format!(
                "WARNING: {} {} improperly formatted",
                self.malformed,
                plural(self.malformed, "line is", "lines are")
            ));
        }
        if self.unreadable > 0 {
            lines.push(format!(
                "WARNING: {} listed {} could not be read",
                self.unreadable,
                plural(self.unreadable, "file", "files")
            ));
        }
        if self.mismatched > 0 {
            lines.push(format!(
                "WARNING: {} computed {} did NOT match",
                self.mismatched,
                plural(self.mismatched, "checksum", "checksums")
            ));
        }
        lines
    }
}

fn verify_one(algorithm: Algorithm, name: &str) -> Result<String> {
    let mut reader = io::open(name)?;
    let digest = hash::hash_reader(algorithm, &mut reader).map_err(|e| Error::io(name, &e))?;
    Ok(hex::encode(digest))
}

fn check(tool: &str, algorithm: Algorithm, args: &HashsumArgs) -> CmdResult {
    let files = io::operands(&args.files);
    let mut tally = Verification::default();
    let mut out = io::stdout();
    let status = io::each_input(tool, &files, |_, reader| {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let Some(entry) = hash::parse_check_line(&line, algorithm) else {
                tally.malformed += 1;
                continue;
            };
            match verify_one(algorithm, &entry.name) {
                Ok(actual) if actual == entry.digest => {
                    tally.verified += 1;
                    if !args.quiet && !args.status {
                        writeln!(out, "{}: OK", entry.name)?;
                    }
                }
                Ok(_) => {
                    tally.verified += 1;
                    tally.mismatched += 1;
                    if !args.status {
                        writeln!(out, "{}: FAILED", entry.name)?;
                    }
                }
                Err(err) => {
                    tally.unreadable += 1;
                    if !args.status {
                        out.flush()?;
                        output::diagnostic(tool, &err.message);
                        writeln!(out, "{}: FAILED open or read", entry.name)?;
                    }
                }
            }
        }
        Ok(())
    })?;
    out.flush()?;
    if tally.verified == 0 && tally.unreadable == 0 && !args.status {
        output::diagnostic(tool, "no properly formatted checksum lines found");
    } else if !args.status {
        for warning in tally.warnings() {
            output::diagnostic(tool, warning);
        }
    }
    Ok(if tally.failed() { 1 } else { status })
}
