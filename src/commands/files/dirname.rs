use std::io::Write;

use clap::Parser;

use kit::{io, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Strip the last component from file names")]
pub struct DirnameArgs {
    /// End each output line with NUL, not newline
    #[arg(short = 'z', long = "zero")]
    pub zero: bool,

    pub names: Vec<String>,
}

/// POSIX dirname: `a` is `.`, `/a` is `/`, `a/b/` is `a`.
pub fn dir_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.starts_with('/') { "/" } else { "." };
    }
    match trimmed.rfind('/') {
        None => ".",
        Some(idx) => {
            let parent = trimmed[..idx].trim_end_matches('/');
            if parent.is_empty() {
                "/"
            } else {
                parent
            }
        }
    }
}

pub fn run(args: DirnameArgs) -> CmdResult {
    if args.names.is_empty() {
        return Err(Error::missing_operand(None));
    }
    let terminator = if args.zero { "\0" } else { "\n" };
    let mut out = io::stdout();
    for name in &args.names {
        write!(out, "{}{}", dir_name(name), terminator)?;
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posix_cases() {
        assert_eq!(dir_name("/usr/lib"), "/usr");
        assert_eq!(dir_name("/usr/lib/"), "/usr");
        assert_eq!(dir_name("usr"), ".");
        assert_eq!(dir_name("/usr"), "/");
        assert_eq!(dir_name("/"), "/");
        assert_eq!(dir_name("a//b"), "a");
        assert_eq!(dir_name(""), ".");
    }
}
