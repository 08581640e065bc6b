use std::io::Write;
use std::process::Command;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use colored::Colorize;

use kit::{command, io, log_status, parser, shell, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Run a command repeatedly, showing its output full-screen")]
pub struct WatchArgs {
    /// Seconds between runs
    #[arg(short = 'n', long = "interval", default_value = "2")]
    pub interval: String,

    /// Highlight characters that changed since the previous run
    #[arg(short = 'd', long = "differences")]
    pub differences: bool,

    /// Hide the header line
    #[arg(short = 't', long = "no-title")]
    pub no_title: bool,

    /// Stop when the command exits non-zero
    #[arg(short = 'e', long = "errexit")]
    pub errexit: bool,

    /// Stop when the output changes
    #[arg(short = 'g', long = "chgexit")]
    pub chgexit: bool,

    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

const CLEAR: &str = "\x1b[H\x1b[2J";

/// Per-character change marks of `current` against `previous`, line by line.
pub fn changed(previous: &str, current: &str) -> Vec<Vec<bool>> {
    let old: Vec<Vec<char>> = previous.lines().map(|l| l.chars().collect()).collect();
    current
        .lines()
        .enumerate()
        .map(|(row, line)| {
            line.chars()
                .enumerate()
                .map(|(col, c)| old.get(row).and_then(|l| l.get(col)) != Some(&c))
                .collect()
        })
        .collect()
}

fn highlight(previous: &str, current: &str) -> String {
    let marks = changed(previous, current);
    let mut text = String::new();
    for (line, marks) in current.lines().zip(&marks) {
        for (c, changed) in line.chars().zip(marks) {
            if *changed {
                text.push_str(&c.to_string().reversed().to_string());
            } else {
                text.push(c);
            }
        }
        text.push('\n');
    }
    text
}

fn interval(spec: &str) -> kit::Result<Duration> {
    let interval = parser::parse_duration(spec)?;
    if interval < Duration::from_millis(100) {
        return Err(Error::invalid_value("interval", spec));
    }
    Ok(interval)
}

pub fn header(interval: Duration, command_line: &str, host: &str, now: &str) -> String {
    format!(
        "Every {:.1}s: {}    {}: {}",
        interval.as_secs_f64(),
        command_line,
        host,
        now
    )
}

fn capture(command_line: &str) -> kit::Result<(String, i32)> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(command_line)
        .output()
        .map_err(|e| command::spawn_error("sh", &e))?;
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok((text, command::status_code(output.status)))
}

pub fn run(args: WatchArgs) -> CmdResult {
    let interval = interval(&args.interval)?;
    let command_line = if args.command.len() == 1 {
        args.command[0].clone()
    } else {
        shell::quote_args(&args.command)
    };
    let host = super::uname::uts().map(|u| u.nodename).unwrap_or_default();
    let mut previous: Option<String> = None;
    let mut out = io::stdout();

    loop {
        let (text, code) = capture(&command_line)?;
        write!(out, "{}", CLEAR)?;
        if !args.no_title {
            let now = Local::now().format("%a %b %e %H:%M:%S %Y").to_string();
            writeln!(out, "{}\n", header(interval, &command_line, &host, &now).bold())?;
        }
        match (&previous, args.differences) {
            (Some(before), true) => write!(out, "{}", highlight(before, &text))?,
            _ => write!(out, "{}", text)?,
        }
        out.flush()?;

        if code != 0 {
            log_status!("watch", "command exited with status {}", code);
            if args.errexit {
                return Ok(code);
            }
        }
        if args.chgexit && previous.as_deref().is_some_and(|p| p != text) {
            return Ok(0);
        }
        previous = Some(text);
        std::thread::sleep(interval);
    }
}
