use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Wrap each input line to fit in a given width")]
pub struct FoldArgs {
    /// Use WIDTH columns instead of 80
    #[arg(short = 'w', long = "width", default_value_t = 80)]
    pub width: usize,

    /// Break at the last blank within WIDTH
    #[arg(short = 's', long = "spaces")]
    pub spaces: bool,

    /// Count bytes rather than characters
    #[arg(short = 'b', long = "bytes")]
    pub bytes: bool,

    pub files: Vec<String>,
}

/// Split `line` into pieces of at most `width` units. Units are characters,
/// or bytes when `bytes` is set (pieces never split a UTF-8 sequence).
pub fn fold_line(line: &str, width: usize, spaces: bool, bytes: bool) -> Vec<String> {
    let width = width.max(1);
    let unit = |c: char| if bytes { c.len_utf8() } else { 1 };

    let mut pieces = Vec::new();
    let mut current: Vec<char> = Vec::new();
    let mut used = 0;
    for c in line.chars() {
        if used + unit(c) > width && !current.is_empty() {
            let cut = if spaces {
                current.iter().rposition(|ch| *ch == ' ').map(|i| i + 1)
            } else {
                None
            };
            match cut {
                Some(at) if at < current.len() => {
                    let rest = current.split_off(at);
                    pieces.push(current.iter().collect());
                    current = rest;
                }
                _ => {
                    pieces.push(current.iter().collect());
                    current.clear();
                }
            }
            used = current.iter().map(|&ch| unit(ch)).sum();
        }
        current.push(c);
        used += unit(c);
    }
    if !current.is_empty() || pieces.is_empty() {
        pieces.push(current.iter().collect());
    }
    pieces
}

pub fn run(args: FoldArgs) -> CmdResult {
    io::map_lines("fold", &args.files, |line| {
        Some(fold_line(line, args.width, args.spaces, args.bytes).join("\n"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_wraps_at_width() {
        assert_eq!(fold_line("abcdefg", 3, false, false), vec!["abc", "def", "g"]);
    }

    #[test]
    fn short_lines_are_unchanged() {
        assert_eq!(fold_line("abc", 10, false, false), vec!["abc"]);
        assert_eq!(fold_line("", 10, false, false), vec![""]);
    }

    #[test]
    fn spaces_break_after_last_blank() {
        assert_eq!(
            fold_line("hello world foo", 8, true, false),
            vec!["hello ", "world ", "foo"]
        );
    }

    #[test]
    fn counts_codepoints_not_bytes() {
        assert_eq!(fold_line("ééé", 2, false, false), vec!["éé", "é"]);
        assert_eq!(fold_line("ééé", 2, false, true), vec!["é", "é", "é"]);
    }
}
