use std::io::Write;

use clap::Parser;

use kit::numfmt::FloatFormat;
use kit::{io, parser, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(
    about = "Print a sequence of numbers: seq [first [step]] last",
    ignore_errors = true
)]
pub struct SeqArgs {
    /// Pad with leading zeros to equal width
    #[arg(short = 'w', long = "equal-width")]
    pub equal_width: bool,

    /// Separator between numbers
    #[arg(short = 's', long = "separator", default_value = "\n")]
    pub separator: String,

    /// printf-style float format (%g %f %e)
    #[arg(short = 'f', long = "format")]
    pub format: Option<String>,

    #[arg(allow_negative_numbers = true, num_args = 1..=3)]
    pub operands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub first: f64,
    pub step: f64,
    pub last: f64,
    /// Digits after the decimal point, the widest of FIRST and STEP.
    pub decimals: usize,
}

fn decimals(text: &str) -> usize {
    if text.contains(['e', 'E']) {
        return 0;
    }
    text.split_once('.').map_or(0, |(_, frac)| frac.len())
}

impl Sequence {
    pub fn from_operands(operands: &[String]) -> Result<Self> {
        let nums = operands
            .iter()
            .map(|s| parser::parse_float(s))
            .collect::<Result<Vec<_>>>()?;
        let (first, step, last) = match nums[..] {
            [last] => (1.0, 1.0, last),
            [first, last] => (first, 1.0, last),
            [first, step, last] => (first, step, last),
            [] => return Err(Error::missing_operand(None)),
            _ => return Err(Error::extra_operand(&operands[3])),
        };
        if step == 0.0 || !step.is_finite() {
            return Err(Error::invalid_value("increment", step.to_string()));
        }
        let decimals = match operands.len() {
            1 => 0,
            2 => decimals(&operands[0]),
            _ => decimals(&operands[0]).max(decimals(&operands[1])),
        };
        Ok(Sequence {
            first,
            step,
            last,
            decimals,
        })
    }

    /// Values computed as `first + i*step` so error does not accumulate.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        let slack = self.step.abs() * 1e-9;
        (0u64..)
            .map(move |i| self.first + i as f64 * self.step)
            .take_while(move |&v| {
                if self.step > 0.0 {
                    v <= self.last + slack
                } else {
                    v >= self.last - slack
                }
            })
    }

    pub fn render(&self, value: f64) -> String {
        let text = format!("{:.*}", self.decimals, value);
        if text.starts_with("-0") && text.trim_start_matches(['-', '0', '.']).is_empty() {
            return text[1..].to_string();
        }
        text
    }
}

fn zero_pad(text: &str, width: usize) -> String {
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let fill = width.saturating_sub(text.len());
    format!("{}{}{}", sign, "0".repeat(fill), digits)
}

pub fn generate(args: &SeqArgs) -> Result<Vec<String>> {
    let seq = Sequence::from_operands(&args.operands)?;
    if let Some(spec) = &args.format {
        if args.equal_width {
            return Err(Error::usage(
                "format string may not be specified when printing equal width strings",
            ));
        }
        let fmt = FloatFormat::parse(spec)?;
        return Ok(seq.values().map(|v| fmt.render(v)).collect());
    }
    let rendered: Vec<String> = seq.values().map(|v| seq.render(v)).collect();
    if !args.equal_width {
        return Ok(rendered);
    }
    let width = rendered.iter().map(String::len).max().unwrap_or(0);
    Ok(rendered.iter().map(|t| zero_pad(t, width)).collect())
}

pub fn run(args: SeqArgs) -> CmdResult {
    let values = generate(&args)?;
    if values.is_empty() {
        return Ok(0);
    }
    let mut out = io::stdout();
    write!(out, "{}", values.join(&args.separator))?;
    writeln!(out)?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(argv: &[&str]) -> Vec<String> {
        let args = SeqArgs::parse_from(std::iter::once("seq").chain(argv.iter().copied()));
        generate(&args).unwrap()
    }

    #[test]
    fn odd_numbers() {
        assert_eq!(seq(&["1", "2", "7"]), vec!["1", "3", "5", "7"]);
    }

    #[test]
    fn defaults_and_descending() {
        assert_eq!(seq(&["3"]), vec!["1", "2", "3"]);
        assert_eq!(seq(&["3", "-1", "1"]), vec!["3", "2", "1"]);
        assert!(seq(&["5", "1"]).is_empty());
    }

    #[test]
    fn fractional_steps_hit_the_end() {
        assert_eq!(seq(&["0", "0.1", "0.3"]), vec!["0.0", "0.1", "0.2", "0.3"]);
    }

    #[test]
    fn equal_width_pads() {
        assert_eq!(seq(&["-w", "8", "10"]), vec!["08", "09", "10"]);
        assert_eq!(seq(&["-w", "-1", "1"]), vec!["-1", "00", "01"]);
    }

    #[test]
    fn printf_format() {
        assert_eq!(seq(&["-f", "%.2f", "1", "2"]), vec!["1.00", "2.00"]);
        assert_eq!(seq(&["-f", "n=%g", "2"]), vec!["n=1", "n=2"]);
    }

    #[test]
    fn zero_step_is_rejected() {
        let args = SeqArgs::parse_from(["seq", "1", "0", "3"]);
        assert!(generate(&args).is_err());
    }
}
