use clap::Parser;

use kit::numfmt::{exponent, trim_zeros};
use kit::{humanize, parser, Result};

use super::each_value;
use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Format floating point numbers")]
pub struct FloatfmtArgs {
    /// Digits after the decimal point
    #[arg(short = 'p', long = "precision", default_value_t = 2)]
    pub precision: usize,

    /// Scientific notation
    #[arg(short = 's', long = "scientific")]
    pub scientific: bool,

    /// Group thousands with commas
    #[arg(short = 'c', long = "comma")]
    pub comma: bool,

    /// Multiply by 100 and append %
    #[arg(long = "pct")]
    pub percent: bool,

    /// Remove trailing zeros
    #[arg(long = "trim")]
    pub trim: bool,

    #[arg(allow_negative_numbers = true)]
    pub numbers: Vec<String>,
}

pub fn format_float(value: f64, args: &FloatfmtArgs) -> String {
    let value = if args.percent { value * 100.0 } else { value };
    let mut text = if args.scientific {
        exponent(value, args.precision)
    } else {
        format!("{:.*}", args.precision, value)
    };
    if args.trim {
        text = match text.split_once('e') {
            Some((mantissa, exp)) => format!("{}e{}", trim_zeros(mantissa), exp),
            None => trim_zeros(&text).to_string(),
        };
    }
    if args.comma && !args.scientific {
        text = humanize::thousands(&text);
    }
    if args.percent {
        text.push('%');
    }
    text
}

fn convert(input: &str, args: &FloatfmtArgs) -> Result<String> {
    let value = parser::parse_float(&input.replace(',', ""))?;
    Ok(format_float(value, args))
}

pub fn run(args: FloatfmtArgs) -> CmdResult {
    each_value("floatfmt", &args.numbers, |n| convert(n, &args))
}
