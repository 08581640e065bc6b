//! Random content: `dice` and `lorem` use a seedable pseudo-random
//! generator; `diceware` draws from the operating system's CSPRNG.

use std::io::Write;

use clap::Parser;
use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng};

use kit::{io, Error};

use crate::commands::CmdResult;

const WORDLIST: &str = include_str!("wordlist.txt");

const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in",
    "reprehenderit", "voluptate", "velit", "esse", "cillum", "eu", "fugiat", "nulla",
    "pariatur", "excepteur", "sint", "occaecat", "cupidatat", "non", "proident", "sunt",
    "culpa", "qui", "officia", "deserunt", "mollit", "anim", "id", "est", "laborum",
];

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[derive(Parser, Debug)]
#[command(about = "Roll dice given as NdM[+K]", ignore_errors = true)]
pub struct DiceArgs {
    /// Seed the generator for repeatable rolls
    #[arg(short = 's', long = "seed")]
    pub seed: Option<u64>,

    #[arg(value_name = "NdM", default_value = "1d6")]
    pub rolls: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roll {
    pub count: u32,
    pub sides: u32,
    pub modifier: i64,
}

impl Roll {
    pub fn parse(spec: &str) -> kit::Result<Self> {
        let invalid = || Error::invalid_value("dice", spec);
        let lower = spec.to_ascii_lowercase();
        let (count, rest) = lower.split_once('d').ok_or_else(invalid)?;
        let (sides, modifier) = match rest.find(['+', '-']) {
            Some(at) => (&rest[..at], rest[at..].parse::<i64>().map_err(|_| invalid())?),
            None => (rest, 0),
        };
        let count = if count.is_empty() {
            1
        } else {
            count.parse().map_err(|_| invalid())?
        };
        let sides: u32 = sides.parse().map_err(|_| invalid())?;
        if count == 0 || sides == 0 || count > 1000 {
            return Err(invalid());
        }
        Ok(Roll {
            count,
            sides,
            modifier,
        })
    }

    pub fn roll(&self, rng: &mut impl Rng) -> Vec<u32> {
        (0..self.count).map(|_| rng.gen_range(1..=self.sides)).collect()
    }
}

pub fn describe(spec: &str, roll: &Roll, faces: &[u32]) -> String {
    let total = faces.iter().map(|&f| i64::from(f)).sum::<i64>() + roll.modifier;
    let shown: Vec<String> = faces.iter().map(u32::to_string).collect();
    match roll.modifier {
        0 => format!("{}: {} = {}", spec, shown.join(" "), total),
        m => format!("{}: {} {:+} = {}", spec, shown.join(" "), m, total),
    }
}

pub fn run_dice(args: DiceArgs) -> CmdResult {
    let mut rng = rng(args.seed);
    let mut lines = Vec::new();
    for spec in &args.rolls {
        let roll = Roll::parse(spec)?;
        let faces = roll.roll(&mut rng);
        lines.push(describe(spec, &roll, &faces));
    }
    io::write_lines(&mut io::stdout(), lines)?;
    Ok(0)
}

#[derive(Parser, Debug)]
#[command(about = "Generate a passphrase from a word list")]
pub struct DicewareArgs {
    /// Number of words
    #[arg(short = 'n', long = "words", default_value_t = 6)]
    pub words: usize,

    /// Word separator
    #[arg(short = 's', long = "separator", default_value = " ")]
    pub separator: String,

    /// Report the passphrase entropy on standard error
    #[arg(short = 'e', long = "entropy")]
    pub entropy: bool,

    /// Number of passphrases
    #[arg(default_value_t = 1)]
    pub count: usize,
}

pub fn wordlist() -> Vec<&'static str> {
    WORDLIST.lines().filter(|w| !w.is_empty()).collect()
}

pub fn passphrase(words: &[&str], n: usize, separator: &str, rng: &mut impl Rng) -> String {
    (0..n)
        .map(|_| words[rng.gen_range(0..words.len())])
        .collect::<Vec<_>>()
        .join(separator)
}

pub fn run_diceware(args: DicewareArgs) -> CmdResult {
    let words = wordlist();
    let mut out = io::stdout();
    for _ in 0..args.count {
        writeln!(out, "{}", passphrase(&words, args.words, &args.separator, &mut OsRng))?;
    }
    out.flush()?;
    if args.entropy {
        let bits = (words.len() as f64).log2() * args.words as f64;
        eprintln!("entropy: {:.0} bits ({} words from a list of {})", bits, args.words, words.len());
    }
    Ok(0)
}

#[derive(Parser, Debug)]
#[command(about = "Generate lorem ipsum placeholder text", ignore_errors = true)]
pub struct LoremArgs {
    /// Number of words
    #[arg(short = 'w', long = "words", conflicts_with_all = ["sentences", "paragraphs"])]
    pub words: Option<usize>,

    /// Number of sentences
    #[arg(short = 's', long = "sentences", conflicts_with = "paragraphs")]
    pub sentences: Option<usize>,

    /// Number of paragraphs
    #[arg(short = 'p', long = "paragraphs")]
    pub paragraphs: Option<usize>,

    /// Seed the generator for repeatable text
    #[arg(long = "seed")]
    pub seed: Option<u64>,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn words(n: usize, rng: &mut impl Rng) -> Vec<&'static str> {
    (0..n)
        .map(|i| match i {
            i if i < 5 => LOREM[i],
            _ => LOREM[rng.gen_range(0..LOREM.len())],
        })
        .collect()
}

pub fn sentence(rng: &mut impl Rng, opening: bool) -> String {
    let len = rng.gen_range(8..=15);
    let mut picked: Vec<String> = if opening {
        words(len, rng).into_iter().map(String::from).collect()
    } else {
        (0..len)
            .map(|_| LOREM[rng.gen_range(0..LOREM.len())].to_string())
            .collect()
    };
    if len > 9 {
        let at = rng.gen_range(5..len - 3);
        picked[at].push(',');
    }
    format!("{}.", capitalize(&picked.join(" ")))
}

pub fn paragraph(rng: &mut impl Rng, opening: bool) -> String {
    let count = rng.gen_range(4..=7);
    (0..count)
        .map(|i| sentence(rng, opening && i == 0))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn run_lorem(args: LoremArgs) -> CmdResult {
    let mut rng = rng(args.seed);
    let text = if let Some(n) = args.words {
        words(n, &mut rng).join(" ")
    } else if let Some(n) = args.sentences {
        (0..n)
            .map(|i| sentence(&mut rng, i == 0))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        let n = args.paragraphs.unwrap_or(1);
        (0..n)
            .map(|i| paragraph(&mut rng, i == 0))
            .collect::<Vec<_>>()
            .join("\n\n")
    };
    let mut out = io::stdout();
    writeln!(out, "{}", text)?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dice_specs_parse() {
        assert_eq!(
            Roll::parse("3d6+2").unwrap(),
            Roll { count: 3, sides: 6, modifier: 2 }
        );
        assert_eq!(Roll::parse("d20").unwrap().count, 1);
        assert_eq!(Roll::parse("2D8-1").unwrap().modifier, -1);
        assert!(Roll::parse("0d6").is_err());
        assert!(Roll::parse("6").is_err());
    }

    #[test]
    fn seeded_rolls_repeat_and_stay_in_range() {
        let roll = Roll::parse("10d6").unwrap();
        let a = roll.roll(&mut rng(Some(7)));
        let b = roll.roll(&mut rng(Some(7)));
        assert_eq!(a, b);
        assert!(a.iter().all(|&f| (1..=6).contains(&f)));
    }

    #[test]
    fn describe_shows_total() {
        let roll = Roll::parse("2d6+1").unwrap();
        assert_eq!(describe("2d6+1", &roll, &[3, 4]), "2d6+1: 3 4 +1 = 8");
    }

    #[test]
    fn wordlist_is_unique_power_of_two() {
        let words = wordlist();
        assert_eq!(words.len(), 512);
        let mut sorted = words.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), words.len());
    }

    #[test]
    fn passphrase_has_requested_words() {
        let words = wordlist();
        let phrase = passphrase(&words, 5, "-", &mut OsRng);
        assert_eq!(phrase.split('-').count(), 5);
    }

    #[test]
    fn lorem_opens_classically() {
        let mut rng = rng(Some(1));
        assert_eq!(words(3, &mut rng), vec!["lorem", "ipsum", "dolor"]);
        let s = sentence(&mut rng, true);
        assert!(s.starts_with("Lorem ipsum dolor sit amet"));
        assert!(s.ends_with('.'));
    }
}
