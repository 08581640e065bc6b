use std::collections::BTreeMap;
use std::io::Write;

use clap::Parser;
use regex::Regex;

use kit::{io, Error};

use crate::commands::CmdResult;

/// Words left out of the concordance unless `--no-stop` is given.
const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have", "he",
    "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "may", "me", "more", "my",
    "no", "not", "of", "on", "or", "our", "out", "she", "so", "such", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "to", "up", "us", "was", "we",
    "were", "what", "when", "which", "who", "will", "with", "would", "you", "your",
];

#[derive(Parser, Debug)]
#[command(about = "Build a word concordance with line numbers")]
pub struct CrossrefArgs {
    /// Fold words to lowercase
    #[arg(short = 'i', long = "ignore-case")]
    pub ignore_case: bool,

    /// Minimum word length
    #[arg(short = 'm', long = "min-length", default_value_t = 1)]
    pub min_length: usize,

    /// Keep stop words
    #[arg(long = "no-stop")]
    pub no_stop: bool,

    pub files: Vec<String>,
}

#[derive(Debug)]
pub struct Concordance {
    word: Regex,
    ignore_case: bool,
    min_length: usize,
    stop: bool,
    pub entries: BTreeMap<String, Vec<usize>>,
}

impl Concordance {
    pub fn new(ignore_case: bool, min_length: usize, stop: bool) -> kit::Result<Self> {
        Ok(Concordance {
            word: Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}'_-]*")
                .map_err(|e| Error::invalid_pattern("word", e))?,
            ignore_case,
            min_length,
            stop,
            entries: BTreeMap::new(),
        })
    }

    pub fn add_line(&mut self, number: usize, line: &str) {
        for m in self.word.find_iter(line) {
            let word = if self.ignore_case {
                m.as_str().to_lowercase()
            } else {
                m.as_str().to_string()
            };
            if word.chars().count() < self.min_length {
                continue;
            }
            if self.stop && STOP_WORDS.contains(&word.to_lowercase().as_str()) {
                continue;
            }
            let lines = self.entries.entry(word).or_default();
            if lines.last() != Some(&number) {
                lines.push(number);
            }
        }
    }

    pub fn render(&self) -> Vec<String> {
        let width = self.entries.keys().map(|w| w.chars().count()).max().unwrap_or(0);
        self.entries
            .iter()
            .map(|(word, lines)| {
                let nums: Vec<String> = lines.iter().map(|n| n.to_string()).collect();
                format!("{:<width$}  {}", word, nums.join(", "), width = width)
            })
            .collect()
    }
}

pub fn run(args: CrossrefArgs) -> CmdResult {
    let mut index = Concordance::new(args.ignore_case, args.min_length, !args.no_stop)?;
    let mut number = 0;
    let status = io::each_input("crossref", &args.files, |_, reader| {
        io::for_each_line(reader, |line| {
            number += 1;
            index.add_line(number, line);
            Ok(())
        })
    })?;
    let mut out = io::stdout();
    io::write_lines(&mut out, index.render())?;
    out.flush()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_words_to_lines() {
        let mut c = Concordance::new(true, 1, true).unwrap();
        c.add_line(1, "The cat sat");
        c.add_line(2, "the CAT and the cat");
        assert_eq!(c.entries["cat"], vec![1, 2]);
        assert_eq!(c.entries["sat"], vec![1]);
        assert!(!c.entries.contains_key("the"));
    }

    #[test]
    fn stop_words_can_be_kept() {
        let mut c = Concordance::new(false, 1, false).unwrap();
        c.add_line(3, "the end");
        assert_eq!(c.entries["the"], vec![3]);
    }

    #[test]
    fn minimum_length_filters() {
        let mut c = Concordance::new(false, 4, false).unwrap();
        c.add_line(1, "big elephant");
        assert_eq!(c.entries.keys().collect::<Vec<_>>(), vec!["elephant"]);
    }

    #[test]
    fn render_aligns_words() {
        let mut c = Concordance::new(false, 1, false).unwrap();
        c.add_line(1, "ab c");
        assert_eq!(c.render(), vec!["ab  1", "c   1"]);
    }
}
