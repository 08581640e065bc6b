use std::io::Write;
use std::path::Path;

use clap::Parser;

use kit::{command, io, shell, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Load KEY=VALUE pairs from a .env file and print or run with them")]
pub struct DotenvArgs {
    /// Environment file to load
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<String>,

    /// Optional env file, then the command to run
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Parse `.env` text. Blank lines and `#` comments are skipped, a leading
/// `export ` is accepted, one pair of matching quotes around the value is
/// removed, and trailing ` # comments` are dropped.
pub fn parse(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

/// A quoted value ends at its closing quote; anything after it is dropped.
/// An unquoted value ends before the first ` #` comment.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(body) = value.strip_prefix(quote) {
            if let Some(end) = body.find(quote) {
                return &body[..end];
            }
        }
    }
    strip_comment(value)
}

fn strip_comment(value: &str) -> &str {
    let cut = value
        .char_indices()
        .zip(value.chars().skip(1))
        .find(|((_, c), next)| c.is_whitespace() && *next == '#')
        .map(|((i, _), _)| i);
    match cut {
        Some(i) => value[..i].trim_end(),
        None => value,
    }
}

/// Split the positionals into the env file and the command. A first
/// operand that names an existing `*.env` file is the env file.
fn split_operands(args: DotenvArgs) -> (String, Vec<String>) {
    if let Some(file) = args.file {
        return (file, args.args);
    }
    let mut rest = args.args;
    let names_env_file = rest
        .first()
        .map(|first| first.ends_with(".env") && Path::new(first).is_file())
        .unwrap_or(false);
    if names_env_file {
        let file = rest.remove(0);
        return (file, rest);
    }
    (".env".to_string(), rest)
}

pub fn run(args: DotenvArgs) -> CmdResult {
    let (file, argv) = split_operands(args);
    let vars = parse(&io::read_file(Path::new(&file))?);

    if argv.is_empty() {
        let mut out = io::stdout();
        for (key, value) in &vars {
            writeln!(out, "export {}={}", key, shell::quote_arg(value))?;
        }
        out.flush()?;
        return Ok(0);
    }

    let mut cmd = command::build(&argv)?;
    cmd.envs(vars);
    tracing::debug!(file = %file, program = %argv[0], "exec with env file");
    Err(exec_or_spawn(cmd))
}

#[cfg(unix)]
fn exec_or_spawn(cmd: std::process::Command) -> Error {
    command::exec(cmd)
}

#[cfg(not(unix))]
fn exec_or_spawn(_cmd: std::process::Command) -> Error {
    Error::unsupported("exec")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_comments_and_quotes() {
        let vars = parse("# comment\nA=1\n\nexport B=\"two words\"\nC='x'\nD = spaced \nnot a pair\n");
        assert_eq!(
            vars,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "two words".to_string()),
                ("C".to_string(), "x".to_string()),
                ("D".to_string(), "spaced".to_string()),
            ]
        );
    }

    #[test]
    fn mismatched_quotes_are_kept() {
        assert_eq!(parse("A=\"x'")[0].1, "\"x'");
        assert_eq!(parse("A=\"")[0].1, "\"");
    }

    #[test]
    fn inline_comments_are_dropped() {
        let vars = parse("A=x # inline\nB=\"y # kept\" # dropped\nC='z'  #c\nD=a#b\n");
        assert_eq!(vars[0].1, "x");
        assert_eq!(vars[1].1, "y # kept");
        assert_eq!(vars[2].1, "z");
        assert_eq!(vars[3].1, "a#b");
    }

    #[test]
    fn values_may_contain_equals() {
        assert_eq!(parse("URL=a=b")[0].1, "a=b");
    }

    #[test]
    fn explicit_file_keeps_all_operands_as_command() {
        let args = DotenvArgs {
            file: Some("x.env".into()),
            args: vec!["prod.env".into(), "env".into()],
        };
        let (file, argv) = split_operands(args);
        assert_eq!(file, "x.env");
        assert_eq!(argv, vec!["prod.env".to_string(), "env".to_string()]);
    }

    #[test]
    fn default_file_is_dot_env() {
        let args = DotenvArgs {
            file: None,
            args: vec!["printenv".into()],
        };
        assert_eq!(split_operands(args).0, ".env");
    }
}
