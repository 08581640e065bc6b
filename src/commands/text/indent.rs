//! Indentation transforms: `indenter` shifts lines, `indent2tab` converts
//! leading spaces to tabs (and back), `dedent` strips the common prefix.

use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Indent or unindent every non-blank line")]
pub struct IndenterArgs {
    /// Number of columns to shift
    #[arg(short = 'n', long = "count", default_value_t = 4)]
    pub count: usize,

    /// Indent with tabs instead of spaces
    #[arg(short = 't', long = "tabs")]
    pub tabs: bool,

    /// Remove up to N columns of indentation instead of adding
    #[arg(short = 'u', long = "unindent")]
    pub unindent: bool,

    pub files: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Convert leading spaces to tabs")]
pub struct Indent2TabArgs {
    /// Spaces per tab
    #[arg(short = 'n', long = "width", default_value_t = 4)]
    pub width: usize,

    /// Convert leading tabs back to spaces
    #[arg(short = 'r', long = "reverse")]
    pub reverse: bool,

    pub files: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Remove common leading whitespace from all lines")]
pub struct DedentArgs {
    pub files: Vec<String>,
}

pub fn indent(line: &str, count: usize, tabs: bool) -> String {
    if line.trim().is_empty() {
        return line.to_string();
    }
    let unit = if tabs { "\t" } else { " " };
    format!("{}{}", unit.repeat(count), line)
}

/// Drop up to `count` leading blanks (a tab counts as one).
pub fn unindent(line: &str, count: usize) -> &str {
    let skip: usize = line
        .char_indices()
        .take(count)
        .take_while(|(_, c)| *c == ' ' || *c == '\t')
        .map(|(_, c)| c.len_utf8())
        .sum();
    &line[skip..]
}

pub fn spaces_to_tabs(line: &str, width: usize) -> String {
    let width = width.max(1);
    let leading = line.len() - line.trim_start_matches(' ').len();
    let (tabs, rest) = (leading / width, leading % width);
    format!("{}{}{}", "\t".repeat(tabs), " ".repeat(rest), &line[leading..])
}

pub fn tabs_to_spaces(line: &str, width: usize) -> String {
    let leading = line.len() - line.trim_start_matches('\t').len();
    format!("{}{}", " ".repeat(leading * width), &line[leading..])
}

/// Longest whitespace prefix shared by every non-blank line.
pub fn common_prefix(lines: &[String]) -> String {
    let mut prefix: Option<&str> = None;
    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        let ws = &line[..line.len() - line.trim_start().len()];
        prefix = Some(match prefix {
            None => ws,
            Some(p) => {
                let shared = p
                    .char_indices()
                    .zip(ws.chars())
                    .take_while(|((_, a), b)| a == b)
                    .last()
                    .map(|((i, c), _)| i + c.len_utf8())
                    .unwrap_or(0);
                &p[..shared]
            }
        });
    }
    prefix.unwrap_or("").to_string()
}

pub fn dedent(lines: &[String]) -> Vec<String> {
    let prefix = common_prefix(lines);
    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                l.strip_prefix(prefix.as_str()).unwrap_or(l).to_string()
            }
        })
        .collect()
}

pub fn run_indenter(args: IndenterArgs) -> CmdResult {
    io::map_lines("indenter", &args.files, |line| {
        Some(if args.unindent {
            unindent(line, args.count).to_string()
        } else {
            indent(line, args.count, args.tabs)
        })
    })
}

pub fn run_indent2tab(args: Indent2TabArgs) -> CmdResult {
    io::map_lines("indent2tab", &args.files, |line| {
        Some(if args.reverse {
            tabs_to_spaces(line, args.width)
        } else {
            spaces_to_tabs(line, args.width)
        })
    })
}

pub fn run_dedent(args: DedentArgs) -> CmdResult {
    let lines = io::read_all_lines(&args.files)?;
    io::write_lines(&mut io::stdout(), dedent(&lines))?;
    Ok(0)
}
