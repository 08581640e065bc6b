use std::io::Write;

use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Filter adjacent matching lines")]
pub struct UniqArgs {
    /// Prefix lines by the number of occurrences
    #[arg(short = 'c', long = "count")]
    pub count: bool,

    /// Only print duplicate lines, one for each group
    #[arg(short = 'd', long = "repeated")]
    pub repeated: bool,

    /// Only print unique lines
    #[arg(short = 'u', long = "unique")]
    pub unique: bool,

    /// Ignore case when comparing
    #[arg(short = 'i', long = "ignore-case")]
    pub ignore_case: bool,

    pub files: Vec<String>,
}

/// Collapse runs of equal adjacent lines into `(count, first line)`.
pub fn groups(lines: &[String], ignore_case: bool) -> Vec<(usize, String)> {
    let mut out: Vec<(usize, String)> = Vec::new();
    for line in lines {
        let same = out.last().is_some_and(|(_, prev)| {
            if ignore_case {
                prev.to_lowercase() == line.to_lowercase()
            } else {
                prev == line
            }
        });
        match out.last_mut() {
            Some((n, _)) if same => *n += 1,
            _ => out.push((1, line.clone())),
        }
    }
    out
}

pub fn render(groups: &[(usize, String)], count: bool, repeated: bool, unique: bool) -> Vec<String> {
    groups
        .iter()
        .filter(|(n, _)| (!repeated || *n > 1) && (!unique || *n == 1))
        .map(|(n, line)| {
            if count {
                format!("{:>7} {}", n, line)
            } else {
                line.clone()
            }
        })
        .collect()
}

pub fn run(args: UniqArgs) -> CmdResult {
    let lines = io::read_all_lines(&args.files)?;
    let grouped = groups(&lines, args.ignore_case);
    let mut out = io::stdout();
    io::write_lines(
        &mut out,
        render(&grouped, args.count, args.repeated, args.unique),
    )?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn only_adjacent_duplicates_collapse() {
        let g = groups(&lines(&["a", "a", "b", "a"]), false);
        assert_eq!(render(&g, false, false, false), lines(&["a", "b", "a"]));
    }

    #[test]
    fn counts_and_filters() {
        let g = groups(&lines(&["a", "a", "b"]), false);
        assert_eq!(render(&g, true, false, false), lines(&["      2 a", "      1 b"]));
        assert_eq!(render(&g, false, true, false), lines(&["a"]));
        assert_eq!(render(&g, false, false, true), lines(&["b"]));
    }

    #[test]
    fn unique_only_is_idempotent() {
        let input = lines(&["x", "x", "y", "z", "z", "w"]);
        let once = render(&groups(&input, false), false, false, true);
        let twice = render(&groups(&once, false), false, false, true);
        assert_eq!(once, twice);
    }

    #[test]
    fn ignore_case_groups_mixed_case() {
        let g = groups(&lines(&["A", "a", "b"]), true);
        assert_eq!(g[0], (2, "A".to_string()));
    }
}
