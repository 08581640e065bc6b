use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Word-wrap long lines at a column, indenting continuations")]
pub struct LinesplitArgs {
    /// Wrap column, counted in characters
    #[arg(short = 'w', long = "width", default_value_t = 80)]
    pub width: usize,

    /// Indent continuation lines by N spaces
    #[arg(short = 'i', long = "indent", default_value_t = 0)]
    pub indent: usize,

    pub files: Vec<String>,
}

/// Wrap one line at word boundaries; words longer than the available
/// width are split hard.
pub fn split_line(line: &str, width: usize, indent: usize) -> Vec<String> {
    let width = width.max(indent + 1);
    let pad = " ".repeat(indent);
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut len = 0;

    let limit = |out: &Vec<String>| if out.is_empty() { width } else { width - indent };

    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let room = limit(&out);
            let needed = if len == 0 { word.len() } else { len + 1 + word.len() };
            if needed <= room {
                if len > 0 {
                    current.push(' ');
                    len += 1;
                }
                current.extend(word.iter());
                len += word.len();
                break;
            }
            if len > 0 {
                out.push(std::mem::take(&mut current));
                len = 0;
                continue;
            }
            let rest = word.split_off(room);
            out.push(word.iter().collect());
            word = rest;
            if word.is_empty() {
                break;
            }
        }
    }
    if len > 0 || out.is_empty() {
        out.push(current);
    }
    out.into_iter()
        .enumerate()
        .map(|(i, l)| if i == 0 { l } else { format!("{}{}", pad, l) })
        .collect()
}

pub fn run(args: LinesplitArgs) -> CmdResult {
    io::map_lines("linesplit", &args.files, |line| {
        if line.chars().count() <= args.width {
            return Some(line.to_string());
        }
        Some(split_line(line, args.width, args.indent).join("\n"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_words() {
        assert_eq!(split_line("one two three", 7, 0), vec!["one two", "three"]);
    }

    #[test]
    fn continuation_lines_are_indented() {
        assert_eq!(
            split_line("aaa bbb ccc", 5, 2),
            vec!["aaa", "  bbb", "  ccc"]
        );
    }

    #[test]
    fn long_words_split_hard() {
        assert_eq!(split_line("abcdefgh", 3, 0), vec!["abc", "def", "gh"]);
    }
}
