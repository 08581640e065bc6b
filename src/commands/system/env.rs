use std::io::Write;

use clap::Parser;

use kit::{command, io, shell, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Run a program in a modified environment, or print it")]
pub struct EnvArgs {
    /// Start with an empty environment
    #[arg(short = 'i', long = "ignore-environment")]
    pub ignore_environment: bool,

    /// End each output line with NUL instead of newline
    #[arg(short = '0', long = "null")]
    pub null: bool,

    /// Remove NAME from the environment
    #[arg(short = 'u', long = "unset", value_name = "NAME")]
    pub unset: Vec<String>,

    /// Split STRING into separate arguments
    #[arg(short = 's', short_alias = 'S', long = "split-string", value_name = "STRING")]
    pub split_string: Option<String>,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Print environment variables")]
pub struct PrintenvArgs {
    /// End each output line with NUL instead of newline
    #[arg(short = '0', long = "null")]
    pub null: bool,

    pub names: Vec<String>,
}

/// Split operands into leading `NAME=VALUE` assignments and the command.
pub fn split_assignments(args: &[String]) -> (Vec<(String, String)>, Vec<String>) {
    let at = args
        .iter()
        .position(|a| !a.contains('=') || a.starts_with('='))
        .unwrap_or(args.len());
    let assignments = args[..at]
        .iter()
        .filter_map(|a| a.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    (assignments, args[at..].to_vec())
}

/// The environment the child (or the listing) sees.
pub fn environment(
    inherited: Vec<(String, String)>,
    ignore: bool,
    unset: &[String],
    assignments: Vec<(String, String)>,
) -> Vec<(String, String)> {
    let mut env: Vec<(String, String)> = if ignore { Vec::new() } else { inherited };
    env.retain(|(k, _)| !unset.contains(k));
    for (key, value) in assignments {
        match env.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => env.push((key, value)),
        }
    }
    env
}

pub fn run_env(args: EnvArgs) -> CmdResult {
    let mut operands = match &args.split_string {
        Some(text) => shell::split_words(text),
        None => Vec::new(),
    };
    operands.extend(args.args.iter().cloned());

    let (assignments, argv) = split_assignments(&operands);
    let env = environment(
        std::env::vars().collect(),
        args.ignore_environment,
        &args.unset,
        assignments,
    );

    if argv.is_empty() {
        let end = if args.null { "\0" } else { "\n" };
        let mut out = io::stdout();
        for (key, value) in &env {
            write!(out, "{}={}{}", key, value, end)?;
        }
        out.flush()?;
        return Ok(0);
    }
    if args.null {
        return Err(Error::usage("cannot specify --null (-0) with command"));
    }

    let mut cmd = command::build(&argv)?;
    cmd.env_clear().envs(env);
    Err(command::exec(cmd))
}

pub fn run_printenv(args: PrintenvArgs) -> CmdResult {
    let end = if args.null { "\0" } else { "\n" };
    let mut out = io::stdout();
    if args.names.is_empty() {
        for (key, value) in std::env::vars() {
            write!(out, "{}={}{}", key, value, end)?;
        }
        out.flush()?;
        return Ok(0);
    }
    let mut status = 0;
    for name in &args.names {
        match std::env::var(name) {
            Ok(value) => write!(out, "{}{}", value, end)?,
            Err(_) => status = 1,
        }
    }
    out.flush()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn assignments_stop_at_command() {
        let args: Vec<String> = ["A=1", "B=x=y", "cmd", "C=3"].iter().map(|s| s.to_string()).collect();
        let (assign, argv) = split_assignments(&args);
        assert_eq!(assign, pairs(&[("A", "1"), ("B", "x=y")]));
        assert_eq!(argv, vec!["cmd", "C=3"]);
    }

    #[test]
    fn environment_applies_ignore_unset_and_overrides() {
        let inherited = pairs(&[("HOME", "/root"), ("PATH", "/bin"), ("X", "old")]);
        let env = environment(
            inherited.clone(),
            false,
            &["PATH".to_string()],
            pairs(&[("X", "new"), ("Y", "1")]),
        );
        assert_eq!(env, pairs(&[("HOME", "/root"), ("X", "new"), ("Y", "1")]));

        let empty = environment(inherited, true, &[], pairs(&[("Z", "z")]));
        assert_eq!(empty, pairs(&[("Z", "z")]));
    }
}
