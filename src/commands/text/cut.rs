use clap::Parser;

use kit::{io, parser, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Print selected fields or characters of each line")]
pub struct CutArgs {
    /// Select these fields (1-based list: 1,3,5-7)
    #[arg(short = 'f', long = "fields", value_name = "LIST")]
    pub fields: Option<String>,

    /// Select these characters
    #[arg(short = 'c', long = "characters", value_name = "LIST")]
    pub characters: Option<String>,

    /// Field delimiter (default TAB)
    #[arg(short = 'd', long = "delimiter", default_value = "\t")]
    pub delimiter: String,

    /// Do not print lines without delimiters
    #[arg(short = 's', long = "only-delimited")]
    pub only_delimited: bool,

    pub files: Vec<String>,
}

/// Fields selected by `ranges`, in source order, rejoined with `delim`.
/// Lines without the delimiter pass through unless `only_delimited`.
pub fn cut_fields(
    line: &str,
    delim: &str,
    ranges: &[(usize, usize)],
    only_delimited: bool,
) -> Option<String> {
    if !line.contains(delim) {
        return if only_delimited {
            None
        } else {
            Some(line.to_string())
        };
    }
    let picked: Vec<&str> = line
        .split(delim)
        .enumerate()
        .filter(|(i, _)| parser::in_ranges(ranges, i + 1))
        .map(|(_, f)| f)
        .collect();
    Some(picked.join(delim))
}

pub fn cut_chars(line: &str, ranges: &[(usize, usize)]) -> String {
    line.chars()
        .enumerate()
        .filter(|(i, _)| parser::in_ranges(ranges, i + 1))
        .map(|(_, c)| c)
        .collect()
}

/// The field delimiter must be exactly one character.
fn delimiter(raw: &str) -> kit::Result<String> {
    let delim = parser::unescape(raw);
    if delim.chars().count() != 1 {
        return Err(Error::usage("the delimiter must be a single character"));
    }
    Ok(delim)
}

pub fn run(args: CutArgs) -> CmdResult {
    let delim = delimiter(&args.delimiter)?;
    match (&args.fields, &args.characters) {
        (Some(list), None) => {
            let ranges = parser::parse_ranges(list)?;
            io::map_lines("cut", &args.files, |line| {
                cut_fields(line, &delim, &ranges, args.only_delimited)
            })
        }
        (None, Some(list)) => {
            let ranges = parser::parse_ranges(list)?;
            io::map_lines("cut", &args.files, |line| Some(cut_chars(line, &ranges)))
        }
        (Some(_), Some(_)) => Err(Error::usage("only one type of list may be specified")),
        (None, None) => Err(Error::usage("you must specify a list of characters or fields")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_in_source_order() {
        let ranges = parser::parse_ranges("3,1").unwrap();
        assert_eq!(
            cut_fields("a,b,c,d", ",", &ranges, false).unwrap(),
            "a,c"
        );
    }

    #[test]
    fn open_ranges() {
        let ranges = parser::parse_ranges("2-").unwrap();
        assert_eq!(cut_fields("a:b:c", ":", &ranges, false).unwrap(), "b:c");
    }

    #[test]
    fn undelimited_lines() {
        let ranges = parser::parse_ranges("1").unwrap();
        assert_eq!(cut_fields("plain", ",", &ranges, false).unwrap(), "plain");
        assert_eq!(cut_fields("plain", ",", &ranges, true), None);
    }

    #[test]
    fn delimiter_is_one_character() {
        assert_eq!(delimiter("\\t").unwrap(), "\t");
        assert_eq!(delimiter(":").unwrap(), ":");
        assert_eq!(delimiter("ab").unwrap_err().exit_code(), 2);
        assert_eq!(delimiter("").unwrap_err().exit_code(), 2);
    }

    #[test]
    fn characters_are_codepoints() {
        let ranges = parser::parse_ranges("1-2,4").unwrap();
        assert_eq!(cut_chars("héllo", &ranges), "hél");
    }
}
