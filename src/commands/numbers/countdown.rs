use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use kit::{io, parser};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Count down, redrawing the remaining time each second", ignore_errors = true)]
pub struct CountdownArgs {
    /// Seconds, or a duration such as 90s, 5m, 1h
    pub duration: String,

    /// Text shown before the clock
    pub label: Vec<String>,
}

/// `MM:SS`, or `H:MM:SS` past an hour.
pub fn clock(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

pub fn frame(label: &str, remaining: u64) -> String {
    if label.is_empty() {
        format!("\r{}", clock(remaining))
    } else {
        format!("\r{}: {}", label, clock(remaining))
    }
}

pub fn run(args: CountdownArgs) -> CmdResult {
    let total = parser::parse_duration(&args.duration)?.as_secs();
    let label = args.label.join(" ");
    let start = Instant::now();
    let mut out = io::stdout();
    for remaining in (0..=total).rev() {
        write!(out, "{}", frame(&label, remaining))?;
        out.flush()?;
        if remaining == 0 {
            break;
        }
        // sleep to the next whole-second boundary so drift does not add up
        let next = Duration::from_secs(total - remaining + 1);
        thread::sleep(next.saturating_sub(start.elapsed()));
    }
    writeln!(out)?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formats() {
        assert_eq!(clock(0), "00:00");
        assert_eq!(clock(75), "01:15");
        assert_eq!(clock(3661), "1:01:01");
    }

    #[test]
    fn frames_redraw_line() {
        assert_eq!(frame("", 5), "\r00:05");
        assert_eq!(frame("tea", 5), "\rtea: 00:05");
    }
}
