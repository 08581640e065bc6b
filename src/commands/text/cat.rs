use std::io::Write;

use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Concatenate files to standard output")]
pub struct CatArgs {
    /// Equivalent to -vET
    #[arg(short = 'A', long = "show-all")]
    pub show_all: bool,

    /// Number non-blank output lines (overrides -n)
    #[arg(short = 'b', long = "number-nonblank")]
    pub number_nonblank: bool,

    /// Equivalent to -vE
    #[arg(short = 'e')]
    pub e: bool,

    /// Display $ at end of each line
    #[arg(short = 'E', long = "show-ends")]
    pub show_ends: bool,

    /// Number all output lines
    #[arg(short = 'n', long = "number")]
    pub number: bool,

    /// Suppress repeated empty output lines
    #[arg(short = 's', long = "squeeze-blank")]
    pub squeeze_blank: bool,

    /// Equivalent to -vT
    #[arg(short = 't')]
    pub t: bool,

    /// Display TAB characters as ^I
    #[arg(short = 'T', long = "show-tabs")]
    pub show_tabs: bool,

    /// Use ^ and M- notation, except for LFD and TAB
    #[arg(short = 'v', long = "show-nonprinting")]
    pub show_nonprinting: bool,

    pub files: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Options {
    number: bool,
    number_nonblank: bool,
    ends: bool,
    tabs: bool,
    nonprinting: bool,
    squeeze: bool,
}

impl Options {
    fn from_args(args: &CatArgs) -> Self {
        Options {
            number: args.number && !args.number_nonblank,
            number_nonblank: args.number_nonblank,
            ends: args.show_ends || args.show_all || args.e,
            tabs: args.show_tabs || args.show_all || args.t,
            nonprinting: args.show_nonprinting || args.show_all || args.e || args.t,
            squeeze: args.squeeze_blank,
        }
    }

    fn is_plain(&self) -> bool {
        !(self.number
            || self.number_nonblank
            || self.ends
            || self.tabs
            || self.nonprinting
            || self.squeeze)
    }
}

#[derive(Debug, Default)]
struct State {
    line_no: u64,
    prev_blank: bool,
}

fn push_visible(out: &mut Vec<u8>, byte: u8, opts: &Options) {
    match byte {
        b'\t' if opts.tabs => out.extend_from_slice(b"^I"),
        b'\t' => out.push(b'\t'),
        _ if !opts.nonprinting => out.push(byte),
        0..=31 => {
            out.push(b'^');
            out.push(byte + 64);
        }
        127 => out.extend_from_slice(b"^?"),
        128..=255 => {
            out.extend_from_slice(b"M-");
            let low = byte - 128;
            match low {
                0..=31 => {
                    out.push(b'^');
                    out.push(low + 64);
                }
                127 => out.extend_from_slice(b"^?"),
                _ => out.push(low),
            }
        }
        _ => out.push(byte),
    }
}

/// Render one raw line (terminator included when present). `None` means
/// the line was squeezed away.
fn render_line(line: &[u8], opts: &Options, state: &mut State) -> Option<Vec<u8>> {
    let (body, newline) = match line.strip_suffix(b"\n") {
        Some(body) => (body, true),
        None => (line, false),
    };
    let blank = body.is_empty();
    if opts.squeeze && blank && state.prev_blank {
        return None;
    }
    state.prev_blank = blank;

    let mut out = Vec::with_capacity(line.len() + 8);
    if opts.number || (opts.number_nonblank && !blank) {
        state.line_no += 1;
        out.extend_from_slice(format!("{:>6}\t", state.line_no).as_bytes());
    }
    for &byte in body {
        push_visible(&mut out, byte, opts);
    }
    if newline {
        if opts.ends {
            out.push(b'$');
        }
        out.push(b'\n');
    }
    Some(out)
}

pub fn run(args: CatArgs) -> CmdResult {
    let opts = Options::from_args(&args);
    let mut out = io::stdout();
    let mut state = State::default();

    let status = io::each_input("cat", &args.files, |_, reader| {
        if opts.is_plain() {
            std::io::copy(reader, &mut out)?;
            return Ok(());
        }
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            if let Some(rendered) = render_line(&buf, &opts, &mut state) {
                out.write_all(&rendered)?;
            }
        }
    })?;
    out.flush()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_all(input: &[u8], opts: Options) -> String {
        let mut state = State::default();
        let mut out = Vec::new();
        for line in io::split_inclusive_lines(input) {
            if let Some(r) = render_line(line, &opts, &mut state) {
                out.extend(r);
            }
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn number_all_lines() {
        let opts = Options {
            number: true,
            ..Default::default()
        };
        assert_eq!(render_all(b"a\n\nb\n", opts), "     1\ta\n     2\t\n     3\tb\n");
    }

    #[test]
    fn number_nonblank_skips_empty() {
        let opts = Options {
            number_nonblank: true,
            ..Default::default()
        };
        assert_eq!(render_all(b"a\n\nb\n", opts), "     1\ta\n\n     2\tb\n");
    }

    #[test]
    fn squeeze_collapses_blank_runs() {
        let opts = Options {
            squeeze: true,
            ..Default::default()
        };
        assert_eq!(render_all(b"a\n\n\n\nb\n", opts), "a\n\nb\n");
    }

    #[test]
    fn show_all_renders_controls() {
        let opts = Options {
            ends: true,
            tabs: true,
            nonprinting: true,
            ..Default::default()
        };
        assert_eq!(render_all(b"a\tb\x01\x7f\n", opts), "a^Ib^A^?$\n");
        assert_eq!(render_all(&[0xe9, b'\n'], opts), "M-i$\n");
        assert_eq!(render_all(&[0x81, b'\n'], opts), "M-^A$\n");
    }

    #[test]
    fn missing_final_newline_is_preserved() {
        let opts = Options {
            ends: true,
            ..Default::default()
        };
        assert_eq!(render_all(b"x\ny", opts), "x$\ny");
    }
}
