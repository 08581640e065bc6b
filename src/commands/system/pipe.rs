use std::process::{Child, Stdio};

use clap::Parser;

use kit::{command, output, shell, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Run commands joined by literal '|' arguments as a pipeline")]
pub struct PipeArgs {
    /// Print each stage to standard error before running
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Stop the pipeline when a stage fails
    #[arg(short = 'e', long = "errexit")]
    pub errexit: bool,

    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Split argv on `|` separators. Empty stages are an error.
pub fn stages(args: &[String]) -> kit::Result<Vec<Vec<String>>> {
    let stages: Vec<Vec<String>> = args
        .split(|a| a == "|")
        .map(<[String]>::to_vec)
        .collect();
    if stages.iter().any(Vec::is_empty) {
        return Err(Error::usage("empty pipeline stage"));
    }
    Ok(stages)
}

fn spawn_all(stages: &[Vec<String>], verbose: bool) -> kit::Result<Vec<Child>> {
    let mut children: Vec<Child> = Vec::with_capacity(stages.len());
    for (i, argv) in stages.iter().enumerate() {
        if verbose {
            output::diagnostic("pipe", format!("+ {}", shell::quote_args(argv)));
        }
        let mut cmd = command::build(argv)?;
        if let Some(prev) = children.last_mut().and_then(|c| c.stdout.take()) {
            cmd.stdin(Stdio::from(prev));
        }
        if i + 1 < stages.len() {
            cmd.stdout(Stdio::piped());
        }
        match command::spawn(&mut cmd) {
            Ok(child) => children.push(child),
            Err(err) => {
                for mut child in children {
                    let _ = child.kill();
                    let _ = child.wait();
                }
                return Err(err);
            }
        }
    }
    Ok(children)
}

pub fn run(args: PipeArgs) -> CmdResult {
    let stages = stages(&args.args)?;
    let children = spawn_all(&stages, args.verbose)?;

    let mut worst = 0;
    let mut remaining = children.into_iter();
    while let Some(mut child) = remaining.next() {
        let code = command::status_code(child.wait()?);
        worst = worst.max(code);
        if args.errexit && code != 0 {
            for mut rest in remaining.by_ref() {
                let _ = rest.kill();
                let _ = rest.wait();
            }
            return Ok(code);
        }
    }
    Ok(worst)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn splits_on_bar_arguments() {
        let got = stages(&argv(&["ls", "-l", "|", "grep", "x", "|", "wc"])).unwrap();
        assert_eq!(got, vec![argv(&["ls", "-l"]), argv(&["grep", "x"]), argv(&["wc"])]);
    }

    #[test]
    fn empty_stage_is_usage_error() {
        let err = stages(&argv(&["ls", "|", "|", "wc"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(stages(&argv(&["ls", "|"])).is_err());
    }

    #[test]
    fn exit_code_is_the_worst() {
        let args = PipeArgs {
            verbose: false,
            errexit: false,
            args: argv(&["sh", "-c", "exit 3", "|", "sh", "-c", "cat >/dev/null; exit 1"]),
        };
        assert_eq!(run(args).unwrap(), 3);
    }
}
