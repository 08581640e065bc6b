use std::io::Write;

use clap::Parser;

use kit::{command, io};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Locate commands on PATH")]
pub struct WhichArgs {
    /// Print every match, not just the first
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    #[arg(required = true)]
    pub names: Vec<String>,
}

pub fn run(args: WhichArgs) -> CmdResult {
    let mut out = io::stdout();
    let mut missing = false;
    for name in &args.names {
        let found = command::which_all(name);
        if found.is_empty() {
            tracing::debug!(name = %name, "not found on PATH");
            missing = true;
            continue;
        }
        let shown = if args.all { found.len() } else { 1 };
        for path in found.iter().take(shown) {
            writeln!(out, "{}", path.display())?;
        }
    }
    out.flush()?;
    Ok(if missing { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_name_exits_one() {
        let args = WhichArgs {
            all: false,
            names: vec!["sh".to_string(), "kit-no-such-command".to_string()],
        };
        assert_eq!(run(args).unwrap(), 1);
    }

    #[test]
    fn found_names_exit_zero() {
        let args = WhichArgs {
            all: true,
            names: vec!["sh".to_string()],
        };
        assert_eq!(run(args).unwrap(), 0);
    }
}
