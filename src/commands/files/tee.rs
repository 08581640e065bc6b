use std::fs::{File, OpenOptions};
use std::io::{Read, Write};

use clap::Parser;

use kit::{io, output, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Copy standard input to standard output and files")]
pub struct TeeArgs {
    /// Append to the files instead of overwriting
    #[arg(short = 'a', long = "append")]
    pub append: bool,

    pub files: Vec<String>,
}

fn open(path: &str, append: bool) -> kit::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map_err(|e| Error::io(path, &e))
}

/// Copy `input` to `out` and every sink. A sink that fails is reported and
/// dropped; the rest keep receiving data. Returns whether any sink failed.
pub fn fan_out(
    input: &mut dyn Read,
    out: &mut dyn Write,
    sinks: &mut Vec<(String, Box<dyn Write>)>,
) -> kit::Result<bool> {
    let mut failed = false;
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::io("standard input", &e)),
        };
        out.write_all(&buf[..n])?;
        out.flush()?;
        sinks.retain_mut(|(name, sink)| match sink.write_all(&buf[..n]) {
            Ok(()) => true,
            Err(e) => {
                output::diagnostic("tee", Error::io(name.as_str(), &e).message);
                failed = true;
                false
            }
        });
    }
    for (name, sink) in sinks.iter_mut() {
        if let Err(e) = sink.flush() {
            output::diagnostic("tee", Error::io(name.as_str(), &e).message);
            failed = true;
        }
    }
    Ok(failed)
}

pub fn run(args: TeeArgs) -> CmdResult {
    let mut status = 0;
    let mut sinks: Vec<(String, Box<dyn Write>)> = Vec::new();
    for path in &args.files {
        match open(path, args.append) {
            Ok(file) => sinks.push((path.clone(), Box::new(file))),
            Err(err) => {
                output::diagnostic("tee", &err.message);
                status = 1;
            }
        }
    }

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    if fan_out(&mut input, &mut out, &mut sinks)? {
        status = 1;
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn copies_to_every_sink() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&b, "old\n").unwrap();

        let mut sinks: Vec<(String, Box<dyn Write>)> = vec![
            ("a".into(), Box::new(open(&a.display().to_string(), false).unwrap())),
            ("b".into(), Box::new(open(&b.display().to_string(), true).unwrap())),
        ];
        let mut out = Vec::new();
        let failed = fan_out(&mut &b"data\n"[..], &mut out, &mut sinks).unwrap();
        drop(sinks);

        assert!(!failed);
        assert_eq!(out, b"data\n");
        assert_eq!(fs::read_to_string(a).unwrap(), "data\n");
        assert_eq!(fs::read_to_string(b).unwrap(), "old\ndata\n");
    }

    #[test]
    fn unopenable_file_is_error() {
        assert!(open("/nonexistent/dir/f", false).is_err());
    }
}
