use clap::Parser;

use kit::{Error, Result};

use super::transform_text;
use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Rail fence (zig-zag) cipher")]
pub struct ZigzagArgs {
    /// Decode instead of encode
    #[arg(short = 'd', long = "decode")]
    pub decode: bool,

    /// Number of rails
    #[arg(short = 'r', long = "rails", default_value_t = 3)]
    pub rails: usize,

    #[arg(allow_hyphen_values = true)]
    pub text: Vec<String>,
}

/// Rail index of each position: 0,1,..,r-1,r-2,..,1,0,1,...
fn pattern(len: usize, rails: usize) -> Vec<usize> {
    if rails <= 1 {
        return vec![0; len];
    }
    let cycle = 2 * (rails - 1);
    (0..len)
        .map(|i| {
            let p = i % cycle;
            if p < rails {
                p
            } else {
                cycle - p
            }
        })
        .collect()
}

pub fn encode(text: &str, rails: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let rail_of = pattern(chars.len(), rails);
    let mut out = String::with_capacity(text.len());
    for rail in 0..rails.max(1) {
        out.extend(
            chars
                .iter()
                .zip(&rail_of)
                .filter(|(_, &r)| r == rail)
                .map(|(c, _)| *c),
        );
    }
    out
}

pub fn decode(text: &str, rails: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let rail_of = pattern(chars.len(), rails);
    // positions in the order their characters appear in the ciphertext
    let mut order: Vec<usize> = (0..chars.len()).collect();
    order.sort_by_key(|&i| rail_of[i]);
    let mut plain = vec![' '; chars.len()];
    for (c, &pos) in chars.iter().zip(&order) {
        plain[pos] = *c;
    }
    plain.into_iter().collect()
}

pub fn run(args: ZigzagArgs) -> CmdResult {
    if args.rails == 0 {
        return Err(Error::invalid_argument("rail count", "0"));
    }
    let (rails, decoding) = (args.rails, args.decode);
    transform_text(&args.text, |line| -> Result<String> {
        Ok(if decoding {
            decode(line, rails)
        } else {
            encode(line, rails)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_example() {
        assert_eq!(encode("WEAREDISCOVEREDFLEEATONCE", 3), "WECRLTEERDSOEEFEAOCAIVDEN");
        assert_eq!(decode("WECRLTEERDSOEEFEAOCAIVDEN", 3), "WEAREDISCOVEREDFLEEATONCE");
    }

    #[test]
    fn round_trips_for_many_rail_counts() {
        let text = "Rail fence ciphers are zig-zag transpositions.";
        for rails in 1..10 {
            assert_eq!(decode(&encode(text, rails), rails), text);
        }
    }

    #[test]
    fn pattern_bounces() {
        assert_eq!(pattern(7, 3), vec![0, 1, 2, 1, 0, 1, 2]);
    }
}
