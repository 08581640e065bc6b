use std::io::{BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use clap::Parser;

use kit::parser;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Ask a yes/no question; exit 0 for yes, 1 for no")]
pub struct ConfirmArgs {
    /// Give up after this many seconds and use the default
    #[arg(short = 't', long = "timeout", value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Answer used on empty input, timeout or end of input
    #[arg(short = 'd', long = "default", value_name = "y|n", default_value = "n")]
    pub default: String,

    #[arg(value_name = "PROMPT")]
    pub prompt: Vec<String>,
}

/// Interpret a reply; anything unrecognised is the default.
pub fn answer(reply: Option<&str>, default: bool) -> bool {
    match reply.map(|r| r.trim().to_ascii_lowercase()) {
        Some(r) if r == "y" || r == "yes" => true,
        Some(r) if r == "n" || r == "no" => false,
        _ => default,
    }
}

fn read_reply(timeout: Option<Duration>) -> Option<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line);
        let _ = tx.send(match read {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        });
    });
    match timeout {
        Some(limit) => rx.recv_timeout(limit).ok().flatten(),
        None => rx.recv().ok().flatten(),
    }
}

pub fn run(args: ConfirmArgs) -> CmdResult {
    let default = answer(Some(args.default.as_str()), false);
    let timeout = args
        .timeout
        .as_deref()
        .map(parser::parse_duration)
        .transpose()?;

    let question = if args.prompt.is_empty() {
        "Continue?".to_string()
    } else {
        args.prompt.join(" ")
    };
    let choices = if default { "[Y/n]" } else { "[y/N]" };
    let mut err = std::io::stderr();
    write!(err, "{} {} ", question, choices)?;
    err.flush()?;

    let reply = read_reply(timeout);
    if reply.is_none() {
        writeln!(err)?;
    }
    Ok(if answer(reply.as_deref(), default) { 0 } else { 1 })
}
