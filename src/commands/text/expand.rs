use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Convert tabs to spaces")]
pub struct ExpandArgs {
    /// Tab stops every N columns
    #[arg(short = 't', long = "tabs", default_value_t = 8)]
    pub tabs: usize,

    /// Only convert leading tabs
    #[arg(short = 'i', long = "initial")]
    pub initial: bool,

    pub files: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Convert spaces to tabs")]
pub struct UnexpandArgs {
    /// Tab stops every N columns
    #[arg(short = 't', long = "tabs", default_value_t = 8)]
    pub tabs: usize,

    /// Convert all blanks, not just leading ones
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    pub files: Vec<String>,
}

pub fn expand_line(line: &str, tab: usize, initial: bool) -> String {
    let tab = tab.max(1);
    let mut out = String::with_capacity(line.len());
    let mut col = 0;
    let mut leading = true;
    for c in line.chars() {
        match c {
            '\t' if leading || !initial => {
                let spaces = tab - col % tab;
                out.extend(std::iter::repeat(' ').take(spaces));
                col += spaces;
            }
            '\u{8}' => {
                out.push(c);
                col = col.saturating_sub(1);
            }
            _ => {
                if c != ' ' && c != '\t' {
                    leading = false;
                }
                out.push(c);
                col += 1;
            }
        }
    }
    out
}

/// Replace runs of blanks that reach a tab stop with tabs. Without `all`
/// only the leading run is converted.
pub fn unexpand_line(line: &str, tab: usize, all: bool) -> String {
    let tab = tab.max(1);
    let mut out = String::with_capacity(line.len());
    let mut col = 0;
    let mut pending = 0usize;
    let mut leading = true;

    for c in line.chars() {
        let convert = leading || all;
        match c {
            ' ' if convert => {
                pending += 1;
                col += 1;
                if col % tab == 0 {
                    out.push(if pending > 1 { '\t' } else { ' ' });
                    pending = 0;
                }
            }
            '\t' if convert => {
                pending = 0;
                out.push('\t');
                col += tab - col % tab;
            }
            _ => {
                out.extend(std::iter::repeat(' ').take(pending));
                pending = 0;
                leading = false;
                out.push(c);
                col += 1;
            }
        }
    }
    out.extend(std::iter::repeat(' ').take(pending));
    out
}

pub fn run_expand(args: ExpandArgs) -> CmdResult {
    io::map_lines("expand", &args.files, |line| {
        Some(expand_line(line, args.tabs, args.initial))
    })
}

pub fn run_unexpand(args: UnexpandArgs) -> CmdResult {
    io::map_lines("unexpand", &args.files, |line| {
        Some(unexpand_line(line, args.tabs, args.all))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_advance_to_next_stop() {
        assert_eq!(expand_line("a\tb", 4, false), "a   b");
        assert_eq!(expand_line("abcd\tb", 4, false), "abcd    b");
        assert_eq!(expand_line("\tx", 8, false), "        x");
    }

    #[test]
    fn initial_keeps_inner_tabs() {
        assert_eq!(expand_line("\ta\tb", 2, true), "  a\tb");
    }

    #[test]
    fn unexpand_leading_blanks() {
        assert_eq!(unexpand_line("        x", 8, false), "\tx");
        assert_eq!(unexpand_line("          x  y", 4, false), "\t\t  x  y");
    }

    #[test]
    fn unexpand_all_blanks() {
        assert_eq!(unexpand_line("ab      c", 4, true), "ab\t\tc");
    }

    #[test]
    fn unexpand_inverts_expand_on_leading_tabs() {
        let original = "\t\tcode";
        assert_eq!(unexpand_line(&expand_line(original, 8, false), 8, false), original);
    }
}
