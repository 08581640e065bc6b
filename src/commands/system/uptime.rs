use std::io::Write;

use chrono::Local;
use clap::Parser;

use kit::{io, procfs};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Show how long the system has been running", ignore_errors = true)]
pub struct UptimeArgs {
    /// Show uptime in a pretty format
    #[arg(short = 'p', long = "pretty")]
    pub pretty: bool,

    /// Print the boot time as YYYY-MM-DD HH:MM:SS
    #[arg(short = 's', long = "since", conflicts_with = "pretty")]
    pub since: bool,
}

fn plural(n: u64, unit: &str) -> String {
    format!("{} {}{}", n, unit, if n == 1 { "" } else { "s" })
}

/// `up 3 days,  4:05` as printed by the classic uptime line.
pub fn classic(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = seconds % 86_400 / 3600;
    let minutes = seconds % 3600 / 60;
    let clock = if hours > 0 {
        format!("{:2}:{:02}", hours, minutes)
    } else {
        format!("{} min", minutes)
    };
    if days > 0 {
        format!("up {}, {}", plural(days, "day"), clock)
    } else {
        format!("up {}", clock)
    }
}

/// `up 1 week, 2 days, 3 hours, 1 minute`
pub fn pretty(seconds: u64) -> String {
    let units = [
        (604_800, "week"),
        (86_400, "day"),
        (3600, "hour"),
        (60, "minute"),
    ];
    let mut rest = seconds;
    let parts: Vec<String> = units
        .iter()
        .filter_map(|(size, name)| {
            let n = rest / size;
            rest %= size;
            (n > 0).then(|| plural(n, name))
        })
        .collect();
    if parts.is_empty() {
        return "up 0 minutes".to_string();
    }
    format!("up {}", parts.join(", "))
}

pub fn run(args: UptimeArgs) -> CmdResult {
    let seconds = procfs::uptime_seconds()? as u64;
    let mut out = io::stdout();
    if args.pretty {
        writeln!(out, "{}", pretty(seconds))?;
    } else if args.since {
        let boot = Local::now() - chrono::Duration::seconds(seconds as i64);
        writeln!(out, "{}", boot.format("%Y-%m-%d %H:%M:%S"))?;
    } else {
        let mut line = format!(" {} {}", Local::now().format("%H:%M:%S"), classic(seconds));
        if let Some([one, five, fifteen]) = procfs::load_average() {
            line.push_str(&format!(",  load average: {:.2}, {:.2}, {:.2}", one, five, fifteen));
        }
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_format() {
        assert_eq!(classic(300), "up 5 min");
        assert_eq!(classic(3 * 3600 + 7 * 60), "up  3:07");
        assert_eq!(classic(86_400 + 3600), "up 1 day,  1:00");
        assert_eq!(classic(2 * 86_400 + 11 * 3600 + 60), "up 2 days, 11:01");
    }

    #[test]
    fn pretty_format() {
        assert_eq!(pretty(30), "up 0 minutes");
        assert_eq!(pretty(61), "up 1 minute");
        assert_eq!(pretty(8 * 86_400 + 2 * 3600), "up 1 week, 1 day, 2 hours");
    }
}
