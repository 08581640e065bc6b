use std::io::Write;

use clap::{Parser, ValueEnum};

use kit::io;

use crate::commands::CmdResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Detect,
    Lf,
    Crlf,
    Cr,
}

#[derive(Parser, Debug)]
#[command(about = "Detect or convert line endings")]
pub struct EolArgs {
    #[arg(value_enum)]
    pub mode: Mode,

    pub files: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub lf: usize,
    pub crlf: usize,
    pub cr: usize,
}

impl Counts {
    pub fn of(data: &[u8]) -> Self {
        let mut counts = Counts::default();
        let mut i = 0;
        while i < data.len() {
            match data[i] {
                b'\r' if data.get(i + 1) == Some(&b'\n') => {
                    counts.crlf += 1;
                    i += 1;
                }
                b'\r' => counts.cr += 1,
                b'\n' => counts.lf += 1,
                _ => {}
            }
            i += 1;
        }
        counts
    }

    /// The most frequent style; ties go to LF, then CRLF.
    pub fn dominant(&self) -> &'static str {
        if self.lf == 0 && self.crlf == 0 && self.cr == 0 {
            "none"
        } else if self.lf >= self.crlf && self.lf >= self.cr {
            "lf"
        } else if self.crlf >= self.cr {
            "crlf"
        } else {
            "cr"
        }
    }

    pub fn is_mixed(&self) -> bool {
        [self.lf, self.crlf, self.cr].iter().filter(|&&n| n > 0).count() > 1
    }
}

/// Normalize every ending to LF, then re-emit with `ending`.
pub fn convert(data: &[u8], ending: &[u8]) -> Vec<u8> {
    let mut normalized = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        if data[i] == b'\r' {
            normalized.push(b'\n');
            if data.get(i + 1) == Some(&b'\n') {
                i += 1;
            }
        } else {
            normalized.push(data[i]);
        }
        i += 1;
    }
    if ending == b"\n" {
        return normalized;
    }
    let mut out = Vec::with_capacity(normalized.len() + normalized.len() / 16);
    for &b in &normalized {
        if b == b'\n' {
            out.extend_from_slice(ending);
        } else {
            out.push(b);
        }
    }
    out
}

pub fn run(args: EolArgs) -> CmdResult {
    let files = io::operands(&args.files);
    let named = files.len() > 1;
    let mut out = io::stdout();
    let status = io::each_input("eol", &files, |path, reader| {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        match args.mode {
            Mode::Detect => {
                let c = Counts::of(&data);
                let prefix = if named { format!("{}: ", path) } else { String::new() };
                let mixed = if c.is_mixed() { " (mixed)" } else { "" };
                writeln!(
                    out,
                    "{}{}{} lf={} crlf={} cr={}",
                    prefix,
                    c.dominant(),
                    mixed,
                    c.lf,
                    c.crlf,
                    c.cr
                )?;
            }
            Mode::Lf => out.write_all(&convert(&data, b"\n"))?,
            Mode::Crlf => out.write_all(&convert(&data, b"\r\n"))?,
            Mode::Cr => out.write_all(&convert(&data, b"\r"))?,
        }
        Ok(())
    })?;
    out.flush()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_style() {
        let c = Counts::of(b"a\r\nb\r\nc\nd\re");
        assert_eq!(c, Counts { lf: 1, crlf: 2, cr: 1 });
        assert_eq!(c.dominant(), "crlf");
        assert!(c.is_mixed());
        assert_eq!(Counts::of(b"plain").dominant(), "none");
    }

    #[test]
    fn lf_crlf_lf_round_trip() {
        let original = b"one\ntwo\n\nthree".to_vec();
        let crlf = convert(&original, b"\r\n");
        assert_eq!(crlf, b"one\r\ntwo\r\n\r\nthree");
        assert_eq!(convert(&crlf, b"\n"), original);
    }

    #[test]
    fn mixed_input_normalizes() {
        assert_eq!(convert(b"a\r\nb\rc\n", b"\r"), b"a\rb\rc\r");
    }
}
