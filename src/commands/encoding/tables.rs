use std::io::Write;

use clap::Parser;

use kit::{io, Result};

use super::transform_text;
use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Render text in Unicode Grade 1 braille")]
pub struct BrailleArgs {
    pub text: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Spell text with the NATO phonetic alphabet")]
pub struct PhoneticArgs {
    pub text: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Turn text upside down (-ud, default) or mirror it (-lr)")]
pub struct FlipArgs {
    /// Upside down: reverse lines and characters, rotate glyphs
    #[arg(long = "ud", conflicts_with = "lr")]
    pub ud: bool,

    /// Left-right mirror of each line
    #[arg(long = "lr")]
    pub lr: bool,

    pub text: Vec<String>,
}

const BRAILLE_LETTERS: [char; 26] = [
    '⠁', '⠃', '⠉', '⠙', '⠑', '⠋', '⠛', '⠓', '⠊', '⠚', '⠅', '⠇', '⠍', '⠝', '⠕', '⠏', '⠟', '⠗',
    '⠎', '⠞', '⠥', '⠧', '⠺', '⠭', '⠽', '⠵',
];
const BRAILLE_CAPITAL: char = '⠠';
const BRAILLE_NUMBER: char = '⠼';

fn braille_punct(c: char) -> Option<char> {
    Some(match c {
        '.' => '⠲',
        ',' => '⠂',
        '?' => '⠦',
        '!' => '⠖',
        '\'' => '⠄',
        '-' => '⠤',
        ';' => '⠆',
        ':' => '⠒',
        _ => return None,
    })
}

/// Capitals take the capital sign; a run of digits takes one number sign
/// and reuses the letters a..j.
pub fn braille(text: &str) -> String {
    let mut out = String::new();
    let mut in_number = false;
    for c in text.chars() {
        if let Some(d) = c.to_digit(10) {
            if !in_number {
                out.push(BRAILLE_NUMBER);
                in_number = true;
            }
            let index = if d == 0 { 9 } else { d as usize - 1 };
            out.push(BRAILLE_LETTERS[index]);
            continue;
        }
        in_number = false;
        if c.is_ascii_alphabetic() {
            if c.is_ascii_uppercase() {
                out.push(BRAILLE_CAPITAL);
            }
            out.push(BRAILLE_LETTERS[(c.to_ascii_lowercase() as u8 - b'a') as usize]);
        } else {
            out.push(braille_punct(c).unwrap_or(c));
        }
    }
    out
}

const NATO: [&str; 26] = [
    "Alfa", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel", "India", "Juliett",
    "Kilo", "Lima", "Mike", "November", "Oscar", "Papa", "Quebec", "Romeo", "Sierra", "Tango",
    "Uniform", "Victor", "Whiskey", "X-ray", "Yankee", "Zulu",
];
const DIGITS: [&str; 10] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];

/// One code word per character; word breaks become `/`.
pub fn phonetic(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .map(|c| {
                    if c.is_ascii_alphabetic() {
                        NATO[(c.to_ascii_lowercase() as u8 - b'a') as usize].to_string()
                    } else if let Some(d) = c.to_digit(10) {
                        DIGITS[d as usize].to_string()
                    } else {
                        c.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

const UPSIDE_DOWN: &[(char, char)] = &[
    ('a', 'ɐ'),
    ('b', 'q'),
    ('c', 'ɔ'),
    ('d', 'p'),
    ('e', 'ǝ'),
    ('f', 'ɟ'),
    ('g', 'ƃ'),
    ('h', 'ɥ'),
    ('i', 'ᴉ'),
    ('j', 'ɾ'),
    ('k', 'ʞ'),
    ('l', 'ן'),
    ('m', 'ɯ'),
    ('n', 'u'),
    ('r', 'ɹ'),
    ('t', 'ʇ'),
    ('v', 'ʌ'),
    ('w', 'ʍ'),
    ('y', 'ʎ'),
    ('A', '∀'),
    ('C', 'Ɔ'),
    ('E', 'Ǝ'),
    ('F', 'Ⅎ'),
    ('G', '⅁'),
    ('J', 'ſ'),
    ('L', '˥'),
    ('M', 'W'),
    ('P', 'Ԁ'),
    ('T', '⊥'),
    ('U', '∩'),
    ('V', 'Λ'),
    ('Y', '⅄'),
    ('6', '9'),
    ('.', '˙'),
    (',', '\''),
    ('!', '¡'),
    ('?', '¿'),
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('<', '>'),
    ('&', '⅋'),
    ('_', '‾'),
];

const MIRROR: &[(char, char)] = &[
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('<', '>'),
    ('/', '\\'),
    ('b', 'd'),
    ('p', 'q'),
];

/// Pairs are symmetric, so every mapping is its own inverse.
fn swap(table: &[(char, char)], c: char) -> char {
    table
        .iter()
        .find_map(|&(a, b)| {
            if a == c {
                Some(b)
            } else if b == c {
                Some(a)
            } else {
                None
            }
        })
        .unwrap_or(c)
}

pub fn flip_upside_down(text: &str) -> String {
    text.lines()
        .rev()
        .map(|line| line.chars().rev().map(|c| swap(UPSIDE_DOWN, c)).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn mirror(line: &str) -> String {
    line.chars().rev().map(|c| swap(MIRROR, c)).collect()
}

pub fn run_braille(args: BrailleArgs) -> CmdResult {
    transform_text(&args.text, |line| -> Result<String> { Ok(braille(line)) })
}

pub fn run_phonetic(args: PhoneticArgs) -> CmdResult {
    transform_text(&args.text, |line| -> Result<String> { Ok(phonetic(line)) })
}

pub fn run_flip(args: FlipArgs) -> CmdResult {
    if args.lr {
        return transform_text(&args.text, |line| -> Result<String> { Ok(mirror(line)) });
    }
    let text = if args.text.is_empty() {
        io::read_text(io::STDIN)?
    } else {
        args.text.join(" ")
    };
    let mut out = io::stdout();
    let flipped = flip_upside_down(&text);
    if !flipped.is_empty() {
        writeln!(out, "{}", flipped)?;
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn braille_letters_digits_capitals() {
        assert_eq!(braille("abc"), "⠁⠃⠉");
        assert_eq!(braille("A1"), "⠠⠁⠼⠁");
        assert_eq!(braille("20 b"), "⠼⠃⠚ ⠃");
    }

    #[test]
    fn phonetic_words() {
        assert_eq!(phonetic("sos 1"), "Sierra Oscar Sierra / One");
    }

    #[test]
    fn tables_are_involutions() {
        for table in [UPSIDE_DOWN, MIRROR] {
            let mut seen = std::collections::HashSet::new();
            for &(a, b) in table {
                assert!(seen.insert(a), "{} repeats", a);
                assert!(seen.insert(b), "{} repeats", b);
            }
        }
    }

    #[test]
    fn flipping_twice_restores() {
        let text = "Hello, World!\nsecond (line) 69";
        assert_eq!(flip_upside_down(&flip_upside_down(text)), text);
        assert_eq!(mirror(&mirror("a/b (c)")), "a/b (c)");
        assert_eq!(flip_upside_down("ab"), "qɐ");
        assert_eq!(mirror("(ab]"), "[da)");
    }
}
