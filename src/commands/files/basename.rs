use std::io::Write;

use clap::Parser;

use kit::{io, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Strip directory and suffix from file names")]
pub struct BasenameArgs {
    /// Treat every operand as a NAME
    #[arg(short = 'a', long = "multiple")]
    pub multiple: bool,

    /// Remove a trailing SUFFIX; implies -a
    #[arg(short = 's', long = "suffix", value_name = "SUFFIX")]
    pub suffix: Option<String>,

    /// End each output line with NUL, not newline
    #[arg(short = 'z', long = "zero")]
    pub zero: bool,

    pub names: Vec<String>,
}

/// POSIX basename: trailing slashes are ignored, `/` stays `/`.
pub fn base_name(path: &str) -> &str {
    if path.is_empty() {
        return "";
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Remove `suffix` unless it is the whole name.
pub fn strip_suffix<'a>(name: &'a str, suffix: &str) -> &'a str {
    match name.strip_suffix(suffix) {
        Some(stem) if !stem.is_empty() && !suffix.is_empty() => stem,
        _ => name,
    }
}

pub fn run(args: BasenameArgs) -> CmdResult {
    let (names, suffix): (&[String], Option<&str>) = if args.multiple || args.suffix.is_some() {
        (&args.names, args.suffix.as_deref())
    } else {
        match args.names.as_slice() {
            [] => return Err(Error::missing_operand(None)),
            [name] => (std::slice::from_ref(name), None),
            [name, suffix] => (std::slice::from_ref(name), Some(suffix.as_str())),
            [_, _, extra, ..] => return Err(Error::extra_operand(extra)),
        }
    };
    if names.is_empty() {
        return Err(Error::missing_operand(None));
    }

    let terminator = if args.zero { "\0" } else { "\n" };
    let mut out = io::stdout();
    for name in names {
        let base = base_name(name);
        let base = suffix.map_or(base, |s| strip_suffix(base, s));
        write!(out, "{}{}", base, terminator)?;
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posix_cases() {
        assert_eq!(base_name("/usr/lib/"), "lib");
        assert_eq!(base_name("/usr/lib"), "lib");
        assert_eq!(base_name("file"), "file");
        assert_eq!(base_name("/"), "/");
        assert_eq!(base_name("///"), "/");
        assert_eq!(base_name(""), "");
    }

    #[test]
    fn suffix_is_not_the_whole_name() {
        assert_eq!(strip_suffix("notes.txt", ".txt"), "notes");
        assert_eq!(strip_suffix(".txt", ".txt"), ".txt");
        assert_eq!(strip_suffix("notes.md", ".txt"), "notes.md");
    }
}
