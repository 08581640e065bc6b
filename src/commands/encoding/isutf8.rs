use std::io::Write;

use clap::Parser;

use kit::{io, output};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Check that files are valid UTF-8")]
pub struct Isutf8Args {
    /// Report only through the exit status
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Name valid files too
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    pub files: Vec<String>,
}

/// Position of the first invalid sequence: byte offset (0-based), then
/// 1-based line and column (column counted in characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalid {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

pub fn first_invalid(data: &[u8]) -> Option<Invalid> {
    let err = std::str::from_utf8(data).err()?;
    let offset = err.valid_up_to();
    let valid = std::str::from_utf8(&data[..offset]).unwrap_or_default();
    let line = valid.matches('\n').count() + 1;
    let line_start = valid.rfind('\n').map_or(0, |i| i + 1);
    let column = valid[line_start..].chars().count() + 1;
    Some(Invalid {
        offset,
        line,
        column,
    })
}

pub fn run(args: Isutf8Args) -> CmdResult {
    let files = io::operands(&args.files);
    let mut out = io::stdout();
    let mut invalid = false;
    let status = io::each_input("isutf8", &files, |path, reader| {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        match first_invalid(&data) {
            Some(at) => {
                invalid = true;
                if !args.quiet {
                    out.flush()?;
                    output::diagnostic(
                        "isutf8",
                        format!(
                            "{}: line {}, char {}, byte {}: invalid UTF-8",
                            path, at.line, at.column, at.offset
                        ),
                    );
                }
            }
            None if args.verbose && !args.quiet => writeln!(out, "{}: valid UTF-8", path)?,
            None => {}
        }
        Ok(())
    })?;
    out.flush()?;
    Ok(if invalid { 1 } else { status })
}
