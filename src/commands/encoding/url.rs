use clap::Parser;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use kit::Result;

use super::transform_text;
use crate::commands::CmdResult;

/// Everything except RFC 3986 unreserved characters.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Parser, Debug)]
#[command(about = "Percent-encode text")]
pub struct UrlencodeArgs {
    /// Decode instead of encode
    #[arg(short = 'd', long = "decode")]
    pub decode: bool,

    #[arg(allow_hyphen_values = true)]
    pub text: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Decode percent-encoded text")]
pub struct UrldecodeArgs {
    /// Treat `+` as a space (query string form)
    #[arg(short = 'q', long = "query")]
    pub query: bool,

    #[arg(allow_hyphen_values = true)]
    pub text: Vec<String>,
}

pub fn encode(text: &str) -> String {
    utf8_percent_encode(text, COMPONENT).to_string()
}

pub fn decode(text: &str, plus_is_space: bool) -> String {
    let text = if plus_is_space {
        text.replace('+', " ")
    } else {
        text.to_string()
    };
    percent_decode_str(&text).decode_utf8_lossy().into_owned()
}

pub fn run_urlencode(args: UrlencodeArgs) -> CmdResult {
    let decoding = args.decode;
    transform_text(&args.text, |line| -> Result<String> {
        Ok(if decoding { decode(line, false) } else { encode(line) })
    })
}

pub fn run_urldecode(args: UrldecodeArgs) -> CmdResult {
    let query = args.query;
    transform_text(&args.text, |line| -> Result<String> { Ok(decode(line, query)) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_reserved_characters() {
        assert_eq!(encode("a b&c=d/é~"), "a%20b%26c%3Dd%2F%C3%A9~");
    }

    #[test]
    fn decode_round_trip() {
        let s = "name=Jürgen & co/100%";
        assert_eq!(decode(&encode(s), false), s);
    }

    #[test]
    fn plus_only_in_query_mode() {
        assert_eq!(decode("a+b%21", false), "a+b!");
        assert_eq!(decode("a+b%21", true), "a b!");
    }
}
