use clap::Parser;

use kit::Result;

use super::transform_text;
use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Translate text to Morse code, or back with -d")]
pub struct MorseArgs {
    /// Decode Morse to text
    #[arg(short = 'd', long = "decode")]
    pub decode: bool,

    #[arg(allow_hyphen_values = true)]
    pub text: Vec<String>,
}

const TABLE: &[(char, &str)] = &[
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('.', ".-.-.-"),
    (',', "--..--"),
    ('?', "..--.."),
    ('\'', ".----."),
    ('!', "-.-.--"),
    ('/', "-..-."),
    ('(', "-.--."),
    (')', "-.--.-"),
    ('&', ".-..."),
    (':', "---..."),
    (';', "-.-.-."),
    ('=', "-...-"),
    ('+', ".-.-."),
    ('-', "-....-"),
    ('_', "..--.-"),
    ('"', ".-..-."),
    ('$', "...-..-"),
    ('@', ".--.-."),
];

/// Letters are separated by a space, words by ` / `. Characters without
/// a code are dropped.
pub fn encode(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .filter_map(|c| {
                    let c = c.to_ascii_uppercase();
                    TABLE.iter().find(|(k, _)| *k == c).map(|(_, code)| *code)
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Unknown codes decode to `?`.
pub fn decode(code: &str) -> String {
    code.split('/')
        .map(|word| {
            word.split_whitespace()
                .map(|sym| {
                    TABLE
                        .iter()
                        .find(|(_, c)| *c == sym)
                        .map_or('?', |(k, _)| *k)
                })
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn run(args: MorseArgs) -> CmdResult {
    let decoding = args.decode;
    transform_text(&args.text, |line| -> Result<String> {
        Ok(if decoding { decode(line) } else { encode(line) })
    })
}
