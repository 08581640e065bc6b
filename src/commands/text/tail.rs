use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::thread;
use std::time::Duration;

use clap::Parser;

use kit::{io, parser, Error, Result};

use crate::commands::CmdResult;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Parser, Debug)]
#[command(about = "Output the last part of files")]
pub struct TailArgs {
    /// Output the last N lines; +K starts at line K
    #[arg(short = 'n', long = "lines", value_name = "N", allow_hyphen_values = true)]
    pub lines: Option<String>,

    /// Output the last N bytes; +K starts at byte K
    #[arg(short = 'c', long = "bytes", value_name = "N", allow_hyphen_values = true)]
    pub bytes: Option<String>,

    /// Keep reading as the file grows
    #[arg(short = 'f', long = "follow")]
    pub follow: bool,

    /// Never print headers
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Always print headers
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    pub files: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Last(u64),
    From(u64),
}

impl Span {
    pub fn parse(value: &str, sized: bool) -> Result<Self> {
        let (from, body) = match value.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, value.strip_prefix('-').unwrap_or(value)),
        };
        let n = if sized {
            parser::parse_size(body)?
        } else {
            parser::parse_count(body)? as u64
        };
        Ok(if from { Span::From(n) } else { Span::Last(n) })
    }
}

/// Select the requested lines from a complete buffer.
pub fn tail_lines(data: &[u8], span: Span) -> &[u8] {
    let lines = io::split_inclusive_lines(data);
    let skip = match span {
        Span::Last(n) => lines.len().saturating_sub(n as usize),
        Span::From(k) => (k.max(1) - 1) as usize,
    };
    let start: usize = lines.iter().take(skip).map(|l| l.len()).sum();
    &data[start.min(data.len())..]
}

pub fn tail_bytes(data: &[u8], span: Span) -> &[u8] {
    let start = match span {
        Span::Last(n) => data.len().saturating_sub(n as usize),
        Span::From(k) => ((k.max(1) - 1) as usize).min(data.len()),
    };
    &data[start..]
}

/// Complete lines pending in `buf`; a trailing partial line stays behind.
fn take_complete_lines(buf: &mut Vec<u8>) -> Vec<u8> {
    match buf.iter().rposition(|&b| b == b'\n') {
        Some(idx) => {
            let rest = buf.split_off(idx + 1);
            std::mem::replace(buf, rest)
        }
        None => Vec::new(),
    }
}

struct Followed {
    name: String,
    file: File,
    pos: u64,
    pending: Vec<u8>,
}

/// Poll every file for appended bytes until the process is interrupted.
fn follow(mut files: Vec<Followed>, headers: bool, out: &mut dyn Write) -> Result<()> {
    let mut last_printed: Option<usize> = files.len().checked_sub(1);
    let mut chunk = vec![0u8; 64 * 1024];
    loop {
        for (idx, f) in files.iter_mut().enumerate() {
            let len = f
                .file
                .metadata()
                .map_err(|e| Error::io(&f.name, &e))?
                .len();
            if len < f.pos {
                // truncated: start over from the top
                f.pos = 0;
                f.pending.clear();
            }
            if len == f.pos {
                continue;
            }
            f.file
                .seek(SeekFrom::Start(f.pos))
                .map_err(|e| Error::io(&f.name, &e))?;
            loop {
                let n = f.file.read(&mut chunk).map_err(|e| Error::io(&f.name, &e))?;
                if n == 0 {
                    break;
                }
                f.pos += n as u64;
                f.pending.extend_from_slice(&chunk[..n]);
            }
            let complete = take_complete_lines(&mut f.pending);
            if complete.is_empty() {
                continue;
            }
            if headers && last_printed != Some(idx) {
                writeln!(out, "\n==> {} <==", f.name)?;
                last_printed = Some(idx);
            }
            out.write_all(&complete)?;
            out.flush()?;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

pub fn run(args: TailArgs) -> CmdResult {
    let (span, bytes) = match (&args.bytes, &args.lines) {
        (Some(c), _) => (Span::parse(c, true)?, true),
        (None, Some(n)) => (Span::parse(n, false)?, false),
        (None, None) => (Span::Last(10), false),
    };
    let files = io::operands(&args.files);
    let headers = args.verbose || (files.len() > 1 && !args.quiet);

    let mut out = io::stdout();
    let mut first = true;
    let mut followed = Vec::new();
    let status = io::each_input("tail", &files, |path, reader| {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        if headers {
            let name = if path == io::STDIN { "standard input" } else { path };
            if !first {
                out.write_all(b"\n")?;
            }
            writeln!(out, "==> {} <==", name)?;
        }
        first = false;
        let selected = if bytes {
            tail_bytes(&data, span)
        } else {
            tail_lines(&data, span)
        };
        out.write_all(selected)?;

        if args.follow && path != io::STDIN {
            let file = File::open(path).map_err(|e| Error::io(path, &e))?;
            followed.push(Followed {
                name: path.to_string(),
                file,
                pos: data.len() as u64,
                pending: Vec::new(),
            });
        }
        Ok(())
    })?;
    out.flush()?;

    if args.follow && !followed.is_empty() {
        follow(followed, headers, &mut out)?;
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_n_lines() {
        assert_eq!(tail_lines(b"a\nb\nc\n", Span::Last(2)), b"b\nc\n");
        assert_eq!(tail_lines(b"a\nb", Span::Last(1)), b"b");
    }

    #[test]
    fn zero_lines_is_empty() {
        assert_eq!(tail_lines(b"a\nb\n", Span::Last(0)), b"");
    }

    #[test]
    fn from_line_k() {
        assert_eq!(tail_lines(b"a\nb\nc\n", Span::From(2)), b"b\nc\n");
        assert_eq!(tail_lines(b"a\nb\nc\n", Span::From(1)), b"a\nb\nc\n");
        assert_eq!(tail_lines(b"a\n", Span::From(9)), b"");
    }

    #[test]
    fn bytes_modes() {
        assert_eq!(tail_bytes(b"abcdef", Span::Last(2)), b"ef");
        assert_eq!(tail_bytes(b"abcdef", Span::From(3)), b"cdef");
    }

    #[test]
    fn partial_lines_are_held_back() {
        let mut buf = b"one\ntwo\nthr".to_vec();
        assert_eq!(take_complete_lines(&mut buf), b"one\ntwo\n");
        assert_eq!(buf, b"thr");
        assert!(take_complete_lines(&mut buf).is_empty());
    }

    #[test]
    fn span_parsing() {
        assert_eq!(Span::parse("+3", false).unwrap(), Span::From(3));
        assert_eq!(Span::parse("3", false).unwrap(), Span::Last(3));
        assert_eq!(Span::parse("2K", true).unwrap(), Span::Last(2048));
    }
}
