use clap::Parser;

use kit::{Error, Result};

use super::each_value;
use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Pad numbers to a fixed width")]
pub struct NumpadArgs {
    /// Target width
    #[arg(short = 'w', long = "width", default_value_t = 8)]
    pub width: usize,

    /// Pad character
    #[arg(short = 'c', long = "char", default_value_t = '0')]
    pub pad: char,

    /// Pad on the right instead of the left
    #[arg(short = 'r', long = "right")]
    pub right: bool,

    /// Text placed before the padded number
    #[arg(short = 'p', long = "prefix", default_value = "")]
    pub prefix: String,

    /// Text placed after the padded number
    #[arg(short = 's', long = "suffix", default_value = "")]
    pub suffix: String,

    #[arg(allow_negative_numbers = true)]
    pub numbers: Vec<String>,
}

/// Zero padding on the left goes after the sign: `-0042`.
pub fn pad(number: &str, args: &NumpadArgs) -> Result<String> {
    if number.parse::<f64>().is_err() {
        return Err(Error::invalid_number(number));
    }
    let len = number.chars().count();
    let fill: String = std::iter::repeat(args.pad)
        .take(args.width.saturating_sub(len))
        .collect();
    let body = if args.right {
        format!("{}{}", number, fill)
    } else if args.pad == '0' {
        match number.strip_prefix('-') {
            Some(rest) => format!("-{}{}", fill, rest),
            None => format!("{}{}", fill, number),
        }
    } else {
        format!("{}{}", fill, number)
    };
    Ok(format!("{}{}{}", args.prefix, body, args.suffix))
}

pub fn run(args: NumpadArgs) -> CmdResult {
    each_value("numpad", &args.numbers, |n| pad(n, &args))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> NumpadArgs {
        NumpadArgs::parse_from(std::iter::once("numpad").chain(argv.iter().copied()))
    }

    #[test]
    fn left_zero_pad() {
        assert_eq!(pad("42", &args(&["-w", "5"])).unwrap(), "00042");
        assert_eq!(pad("-42", &args(&["-w", "5"])).unwrap(), "-0042");
    }

    #[test]
    fn right_pad_with_affixes() {
        let a = args(&["-w", "4", "-c", ".", "-r", "-p", "[", "-s", "]"]);
        assert_eq!(pad("7", &a).unwrap(), "[7...]");
    }

    #[test]
    fn wide_numbers_are_untouched() {
        assert_eq!(pad("123456", &args(&["-w", "3"])).unwrap(), "123456");
    }

    #[test]
    fn rejects_words() {
        assert!(pad("seven", &args(&[])).is_err());
    }
}
