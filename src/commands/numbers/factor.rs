use std::io::Write;

use clap::Parser;
use num::bigint::BigUint;
use num::{Integer, One, Zero};

use kit::{io, output, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Print the prime factors of each number")]
pub struct FactorArgs {
    pub numbers: Vec<String>,
}

/// Prime factors in ascending order, by trial division. 0 and 1 have none.
pub fn factorize(n: &BigUint) -> Vec<BigUint> {
    let mut factors = Vec::new();
    let mut rest = n.clone();
    if rest <= BigUint::one() {
        return factors;
    }
    let two = BigUint::from(2u32);
    while rest.is_even() {
        factors.push(two.clone());
        rest /= &two;
    }
    let mut divisor = BigUint::from(3u32);
    while &divisor * &divisor <= rest {
        while (&rest % &divisor).is_zero() {
            factors.push(divisor.clone());
            rest /= &divisor;
        }
        divisor += &two;
    }
    if rest > BigUint::one() {
        factors.push(rest);
    }
    factors
}

fn parse(input: &str) -> Result<BigUint> {
    let digits = input.trim().strip_prefix('+').unwrap_or(input.trim());
    digits
        .parse::<BigUint>()
        .map_err(|_| Error::invalid_value("positive integer", input))
}

pub fn line(n: &BigUint) -> String {
    let mut text = format!("{}:", n);
    for f in factorize(n) {
        text.push(' ');
        text.push_str(&f.to_string());
    }
    text
}

pub fn run(args: FactorArgs) -> CmdResult {
    let inputs = if args.numbers.is_empty() {
        io::read_all_lines(&[])?
            .iter()
            .flat_map(|l| l.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .collect()
    } else {
        args.numbers
    };
    let mut out = io::stdout();
    let mut status = 0;
    for input in &inputs {
        match parse(input) {
            Ok(n) => writeln!(out, "{}", line(&n))?,
            Err(err) => {
                out.flush()?;
                output::diagnostic("factor", &err.message);
                status = 1;
            }
        }
    }
    out.flush()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn factors_360() {
        assert_eq!(line(&big(360)), "360: 2 2 2 3 3 5");
    }

    #[test]
    fn primes_and_trivial_values() {
        assert_eq!(line(&big(97)), "97: 97");
        assert_eq!(line(&big(1)), "1:");
        assert_eq!(line(&big(0)), "0:");
    }

    #[test]
    fn product_of_factors_is_input() {
        for n in [2u64, 12, 1001, 65536, 999_983 * 3, 600_851_475_143] {
            let factors = factorize(&big(n));
            let product = factors.iter().fold(BigUint::one(), |acc, f| acc * f);
            assert_eq!(product, big(n));
            for f in &factors {
                assert_eq!(factorize(f), vec![f.clone()]);
            }
        }
    }

    #[test]
    fn beyond_u64() {
        let n: BigUint = "36893488147419103232".parse().unwrap();
        assert_eq!(factorize(&n).len(), 65);
    }

    #[test]
    fn rejects_negative() {
        assert!(parse("-4").is_err());
        assert!(parse("x").is_err());
    }
}
