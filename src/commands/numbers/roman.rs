use clap::Parser;

use kit::{Error, Result};

use super::each_value;
use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Convert between integers and Roman numerals (1..3999)")]
pub struct RomanArgs {
    pub values: Vec<String>,
}

const TABLE: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

pub fn to_roman(mut n: u32) -> Result<String> {
    if !(1..=3999).contains(&n) {
        return Err(Error::invalid_value("number (1..3999)", n.to_string()));
    }
    let mut out = String::new();
    for (value, symbol) in TABLE {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    Ok(out)
}

/// Greedy parse against the same table; the result must re-encode to the
/// input so `IIII` and `VX` are rejected.
pub fn from_roman(input: &str) -> Result<u32> {
    let upper = input.to_ascii_uppercase();
    let mut rest = upper.as_str();
    let mut total = 0;
    for (value, symbol) in TABLE {
        while let Some(tail) = rest.strip_prefix(symbol) {
            total += value;
            rest = tail;
        }
    }
    if !rest.is_empty() || total == 0 || to_roman(total)? != upper {
        return Err(Error::invalid_value("roman numeral", input));
    }
    Ok(total)
}

pub fn convert(input: &str) -> Result<String> {
    if input.chars().all(|c| c.is_ascii_digit()) {
        let n: u32 = input
            .parse()
            .map_err(|_| Error::invalid_value("number (1..3999)", input))?;
        Ok(format!("{} → {}", input, to_roman(n)?))
    } else {
        Ok(format!("{} → {}", input, from_roman(input)?))
    }
}

pub fn run(args: RomanArgs) -> CmdResult {
    each_value("roman", &args.values, convert)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_directions() {
        assert_eq!(convert("1994").unwrap(), "1994 → MCMXCIV");
        assert_eq!(convert("MCMXCIV").unwrap(), "MCMXCIV → 1994");
        assert_eq!(convert("xiv").unwrap(), "xiv → 14");
    }

    #[test]
    fn every_value_round_trips() {
        for n in 1..=3999 {
            assert_eq!(from_roman(&to_roman(n).unwrap()).unwrap(), n);
        }
    }

    #[test]
    fn out_of_range_and_malformed() {
        assert!(to_roman(0).is_err());
        assert!(to_roman(4000).is_err());
        assert!(from_roman("IIII").is_err());
        assert!(from_roman("VX").is_err());
        assert!(from_roman("ABC").is_err());
    }
}
