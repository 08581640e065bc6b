use std::io::Write;

use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Test whether two phrases are anagrams")]
pub struct AnagramArgs {
    pub first: String,

    pub second: String,
}

fn letters(text: &str) -> Vec<char> {
    let mut chars: Vec<char> = text
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    chars.sort_unstable();
    chars
}

pub fn are_anagrams(a: &str, b: &str) -> bool {
    letters(a) == letters(b)
}

pub fn run(args: AnagramArgs) -> CmdResult {
    let mut out = io::stdout();
    let yes = are_anagrams(&args.first, &args.second);
    writeln!(
        out,
        "\"{}\" and \"{}\" {}",
        args.first,
        args.second,
        if yes { "are anagrams" } else { "are not anagrams" }
    )?;
    out.flush()?;
    Ok(if yes { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_compare_sorted() {
        assert!(are_anagrams("Listen", "Silent"));
        assert!(are_anagrams("Dormitory", "dirty room"));
        assert!(!are_anagrams("abc", "abd"));
    }
}
