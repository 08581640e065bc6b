use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Strip leading and trailing whitespace from each line")]
pub struct TrimArgs {
    /// Trim the left side only
    #[arg(short = 'l', long = "left")]
    pub left: bool,

    /// Trim the right side only
    #[arg(short = 'r', long = "right")]
    pub right: bool,

    /// Strip these characters instead of whitespace
    #[arg(short = 'c', long = "chars", value_name = "CHARS")]
    pub chars: Option<String>,

    /// Drop lines that are empty after trimming
    #[arg(short = 'n', long = "drop-empty")]
    pub drop_empty: bool,

    pub files: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Both,
    Left,
    Right,
}

pub fn trim<'a>(line: &'a str, side: Side, chars: Option<&str>) -> &'a str {
    let strip = |c: char| match chars {
        Some(set) => set.contains(c),
        None => c.is_whitespace(),
    };
    match side {
        Side::Both => line.trim_matches(strip),
        Side::Left => line.trim_start_matches(strip),
        Side::Right => line.trim_end_matches(strip),
    }
}

pub fn run(args: TrimArgs) -> CmdResult {
    let side = match (args.left, args.right) {
        (true, false) => Side::Left,
        (false, true) => Side::Right,
        _ => Side::Both,
    };
    io::map_lines("trim", &args.files, |line| {
        let trimmed = trim(line, side, args.chars.as_deref());
        if args.drop_empty && trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_whitespace_by_side() {
        assert_eq!(trim("  a b  ", Side::Both, None), "a b");
        assert_eq!(trim("  a  ", Side::Left, None), "a  ");
        assert_eq!(trim("  a  ", Side::Right, None), "  a");
    }

    #[test]
    fn custom_character_set() {
        assert_eq!(trim("--==x==--", Side::Both, Some("-=")), "x");
    }

    #[test]
    fn trimming_is_idempotent() {
        let once = trim("\t x \t", Side::Both, None);
        assert_eq!(trim(once, Side::Both, None), once);
    }
}
