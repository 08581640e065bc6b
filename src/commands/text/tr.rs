use std::collections::HashMap;
use std::io::{BufRead, Write};

use clap::Parser;

use kit::{io, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Translate, squeeze or delete characters from standard input")]
pub struct TrArgs {
    /// Use the complement of SET1
    #[arg(short = 'c', short_alias = 'C', long = "complement")]
    pub complement: bool,

    /// Delete characters in SET1
    #[arg(short = 'd', long = "delete")]
    pub delete: bool,

    /// Replace each run of a repeated character with a single occurrence
    #[arg(short = 's', long = "squeeze-repeats")]
    pub squeeze: bool,

    #[arg(value_name = "SET1", allow_hyphen_values = true)]
    pub set1: Option<String>,

    #[arg(value_name = "SET2", allow_hyphen_values = true)]
    pub set2: Option<String>,
}

fn class(name: &str) -> Option<Vec<char>> {
    let chars: Vec<char> = match name {
        "upper" => ('A'..='Z').collect(),
        "lower" => ('a'..='z').collect(),
        "digit" => ('0'..='9').collect(),
        "alpha" => ('A'..='Z').chain('a'..='z').collect(),
        "alnum" => ('0'..='9').chain('A'..='Z').chain('a'..='z').collect(),
        "space" => vec![' ', '\t', '\n', '\r', '\x0b', '\x0c'],
        "blank" => vec![' ', '\t'],
        "punct" => (0x21u8..=0x7e)
            .map(char::from)
            .filter(|c| c.is_ascii_punctuation())
            .collect(),
        "xdigit" => ('0'..='9').chain('A'..='F').chain('a'..='f').collect(),
        _ => return None,
    };
    Some(chars)
}

fn unescape_char(chars: &[char], i: &mut usize) -> char {
    let c = chars[*i];
    *i += 1;
    if c != '\\' || *i >= chars.len() {
        return c;
    }
    let e = chars[*i];
    *i += 1;
    match e {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '\\' => '\\',
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0c',
        'v' => '\x0b',
        '0'..='7' => {
            let mut value = e.to_digit(8).unwrap_or(0);
            let mut digits = 1;
            while digits < 3 && *i < chars.len() && chars[*i].is_digit(8) {
                value = value * 8 + chars[*i].to_digit(8).unwrap_or(0);
                *i += 1;
                digits += 1;
            }
            char::from_u32(value).unwrap_or('\0')
        }
        other => other,
    }
}

/// Expand a SET argument: escapes, `a-z` ranges and `[:class:]` names.
pub fn parse_set(spec: &str) -> Result<Vec<char>> {
    let chars: Vec<char> = spec.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '[' && chars.get(i + 1) == Some(&':') {
            let rest: String = chars[i + 2..].iter().collect();
            if let Some(end) = rest.find(":]") {
                let name = &rest[..end];
                let expanded = class(name)
                    .ok_or_else(|| Error::invalid_argument("character class", name))?;
                out.extend(expanded);
                i += 2 + name.chars().count() + 2;
                continue;
            }
        }
        let start = unescape_char(&chars, &mut i);
        if i + 1 < chars.len() && chars[i] == '-' {
            let mut j = i + 1;
            let end = unescape_char(&chars, &mut j);
            if end < start {
                return Err(Error::invalid_value(
                    "range",
                    format!("{}-{}", start, end),
                ));
            }
            out.extend(start..=end);
            i = j;
        } else {
            out.push(start);
        }
    }
    Ok(out)
}

#[derive(Debug)]
pub struct Translator {
    set1: Vec<char>,
    complement: bool,
    delete: bool,
    squeeze: Option<Vec<char>>,
    map: HashMap<char, char>,
    complement_target: Option<char>,
    last: Option<char>,
}

impl Translator {
    pub fn new(
        set1: Vec<char>,
        set2: Option<Vec<char>>,
        complement: bool,
        delete: bool,
        squeeze: bool,
    ) -> Result<Self> {
        let mut map = HashMap::new();
        let mut complement_target = None;
        let translating = !delete && set2.is_some();

        if translating {
            let set2 = set2.clone().unwrap_or_default();
            if set2.is_empty() && !set1.is_empty() {
                return Err(Error::usage("when translating, SET2 must not be empty"));
            }
            if complement {
                complement_target = set2.last().copied();
            } else {
                for (i, &c) in set1.iter().enumerate() {
                    let target = set2.get(i).or(set2.last()).copied().unwrap_or(c);
                    map.insert(c, target);
                }
            }
        }

        // Squeeze applies to SET2 when it is the output set, else SET1.
        let squeeze = if !squeeze {
            None
        } else if let Some(s2) = set2.filter(|_| translating || delete) {
            Some(s2)
        } else {
            Some(set1.clone())
        };

        Ok(Translator {
            set1,
            complement,
            delete,
            squeeze,
            map,
            complement_target,
            last: None,
        })
    }

    fn in_set1(&self, c: char) -> bool {
        self.set1.contains(&c) != self.complement
    }

    fn squeezable(&self, c: char) -> bool {
        match &self.squeeze {
            // with -c and no translation, -s squeezes the complement
            Some(set) if self.complement && !self.delete && self.map.is_empty() && self.complement_target.is_none() => {
                !set.contains(&c)
            }
            Some(set) => set.contains(&c),
            None => false,
        }
    }

    pub fn process(&mut self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        for c in input.chars() {
            let c = if self.delete {
                if self.in_set1(c) {
                    continue;
                }
                c
            } else if let Some(target) = self.complement_target {
                if self.in_set1(c) {
                    target
                } else {
                    c
                }
            } else {
                self.map.get(&c).copied().unwrap_or(c)
            };
            if self.last == Some(c) && self.squeezable(c) {
                continue;
            }
            self.last = Some(c);
            out.push(c);
        }
        out
    }
}

pub fn run(args: TrArgs) -> CmdResult {
    let set1 = match &args.set1 {
        Some(s) => parse_set(s)?,
        None => return Err(Error::missing_operand(None)),
    };
    let set2 = args.set2.as_deref().map(parse_set).transpose()?;
    if !args.delete && !args.squeeze && set2.is_none() {
        return Err(Error::missing_operand(args.set1.as_deref()));
    }
    let mut tr = Translator::new(set1, set2, args.complement, args.delete, args.squeeze)?;

    let mut reader = io::open(io::STDIN)?;
    let mut out = io::stdout();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        out.write_all(tr.process(&String::from_utf8_lossy(&buf)).as_bytes())?;
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tr(set1: &str, set2: Option<&str>, c: bool, d: bool, s: bool, input: &str) -> String {
        let set1 = parse_set(set1).unwrap();
        let set2 = set2.map(|s| parse_set(s).unwrap());
        Translator::new(set1, set2, c, d, s).unwrap().process(input)
    }

    #[test]
    fn ranges_and_classes_expand() {
        assert_eq!(parse_set("a-e").unwrap(), vec!['a', 'b', 'c', 'd', 'e']);
        assert_eq!(parse_set("[:digit:]").unwrap().len(), 10);
        assert_eq!(parse_set("\\n\\t").unwrap(), vec!['\n', '\t']);
        assert!(parse_set("[:nope:]").is_err());
        assert!(parse_set("z-a").is_err());
    }

    #[test]
    fn translates_case() {
        assert_eq!(tr("[:lower:]", Some("[:upper:]"), false, false, false, "Hello"), "HELLO");
        assert_eq!(tr("a-z", Some("A-Z"), false, false, false, "abc"), "ABC");
    }

    #[test]
    fn short_set2_pads_with_last_char() {
        assert_eq!(tr("abc", Some("x"), false, false, false, "aabbcc"), "xxxxxx");
    }

    #[test]
    fn delete_and_complement() {
        assert_eq!(tr("0-9", None, false, true, false, "a1b2c3"), "abc");
        assert_eq!(tr("0-9", None, true, true, false, "a1b2c3\n"), "123");
    }

    #[test]
    fn empty_delete_set_is_noop() {
        assert_eq!(tr("", None, false, true, false, "keep me"), "keep me");
    }

    #[test]
    fn squeeze_only_members_of_set() {
        assert_eq!(tr(" ", None, false, false, true, "a   b  c"), "a b c");
        assert_eq!(tr(" ", None, false, false, true, "aa  bb"), "aa bb");
    }

    #[test]
    fn translate_then_squeeze_uses_set2() {
        assert_eq!(tr("a-z", Some("x"), false, false, true, "abc def"), "x x");
    }

    #[test]
    fn complement_translate() {
        assert_eq!(tr("a-z", Some("_"), true, false, false, "ab1c!"), "ab_c_");
    }
}
