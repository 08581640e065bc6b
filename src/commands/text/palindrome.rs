use std::io::Write;

use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Test whether text reads the same backwards")]
pub struct PalindromeArgs {
    /// Ignore case (always on; accepted for compatibility)
    #[arg(short = 'i', long = "ignore-case")]
    pub ignore_case: bool,

    pub text: Vec<String>,
}

/// Compare alphanumerics only, case-insensitively.
pub fn is_palindrome(text: &str) -> bool {
    let chars: Vec<char> = text
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    chars.iter().eq(chars.iter().rev())
}

pub fn run(args: PalindromeArgs) -> CmdResult {
    let inputs = if args.text.is_empty() {
        io::read_all_lines(&[])?
    } else {
        args.text.clone()
    };
    let mut out = io::stdout();
    let mut all = true;
    for text in &inputs {
        if is_palindrome(text) {
            writeln!(out, "\"{}\" is a palindrome", text)?;
        } else {
            all = false;
            writeln!(out, "\"{}\" is not a palindrome", text)?;
        }
    }
    out.flush()?;
    Ok(if all { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_punctuation_and_case() {
        assert!(is_palindrome("A man, a plan, a canal: Panama"));
        assert!(is_palindrome("racecar"));
        assert!(!is_palindrome("hello"));
    }

    #[test]
    fn empty_is_palindrome() {
        assert!(is_palindrome(""));
        assert!(is_palindrome("!!"));
    }
}
