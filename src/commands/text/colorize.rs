use std::str::FromStr;

use clap::Parser;
use colored::Color;
use regex::Regex;

use kit::{io, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Highlight regex matches with ANSI colours")]
pub struct ColorizeArgs {
    /// Regular expression to highlight
    pub pattern: String,

    /// Colour name (red, green, yellow, blue, magenta, cyan, white) followed
    /// by files
    pub rest: Vec<String>,
}

/// Wrap every match of `re` in an SGR foreground sequence.
pub fn highlight(line: &str, re: &Regex, color: Color) -> String {
    let code = color.to_fg_str();
    re.replace_all(line, |caps: &regex::Captures| {
        format!("\x1b[1;{}m{}\x1b[0m", code, &caps[0])
    })
    .into_owned()
}

/// Split the trailing operands into an optional colour and the files.
fn color_and_files(rest: &[String]) -> (Color, &[String]) {
    match rest.split_first() {
        Some((first, files)) => match Color::from_str(first) {
            Ok(color) if !std::path::Path::new(first).exists() => (color, files),
            _ => (Color::Red, rest),
        },
        None => (Color::Red, rest),
    }
}

pub fn run(args: ColorizeArgs) -> CmdResult {
    let re = Regex::new(&args.pattern).map_err(|e| Error::invalid_pattern(&args.pattern, e))?;
    let (color, files) = color_and_files(&args.rest);
    io::map_lines("colorize", files, |line| Some(highlight(line, &re, color)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_each_match() {
        let re = Regex::new("o+").unwrap();
        assert_eq!(
            highlight("foo bar boo", &re, Color::Red),
            "f\x1b[1;31moo\x1b[0m bar b\x1b[1;31moo\x1b[0m"
        );
    }

    #[test]
    fn first_operand_may_name_a_colour() {
        let rest = vec!["green".to_string(), "file.txt".to_string()];
        let (color, files) = color_and_files(&rest);
        assert_eq!(color, Color::Green);
        assert_eq!(files, &rest[1..]);

        let rest = vec!["file.txt".to_string()];
        let (color, files) = color_and_files(&rest);
        assert_eq!(color, Color::Red);
        assert_eq!(files.len(), 1);
    }
}
