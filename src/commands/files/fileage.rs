use std::io::Write;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use clap::Parser;

use kit::{io, output, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "List files oldest first with their age")]
pub struct FileageArgs {
    /// Newest first
    #[arg(short = 'r', long = "reverse")]
    pub reverse: bool,

    #[arg(required = true)]
    pub files: Vec<String>,
}

pub fn age(modified: SystemTime, now: SystemTime) -> String {
    let elapsed = now.duration_since(modified).unwrap_or_default();
    timeago::Formatter::new().convert(elapsed)
}

/// Rows of `(timestamp, age, name)` ordered oldest first.
pub fn rows(mut stamped: Vec<(SystemTime, String)>, now: SystemTime) -> Vec<[String; 3]> {
    stamped.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    stamped
        .into_iter()
        .map(|(modified, name)| {
            let local: DateTime<Local> = modified.into();
            [
                local.format("%Y-%m-%d %H:%M:%S").to_string(),
                age(modified, now),
                name,
            ]
        })
        .collect()
}

pub fn run(args: FileageArgs) -> CmdResult {
    let mut status = 0;
    let mut stamped = Vec::new();
    for file in &args.files {
        match std::fs::metadata(file).and_then(|m| m.modified()) {
            Ok(modified) => stamped.push((modified, file.clone())),
            Err(e) => {
                output::diagnostic("fileage", Error::io(file, &e).message);
                status = 1;
            }
        }
    }

    let mut table = rows(stamped, SystemTime::now());
    if args.reverse {
        table.reverse();
    }
    let width = table.iter().map(|r| r[1].chars().count()).max().unwrap_or(0);
    let mut out = io::stdout();
    for [stamp, age, name] in &table {
        writeln!(out, "{}  {:<width$}  {}", stamp, age, name, width = width)?;
    }
    out.flush()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn ages_read_naturally() {
        let now = SystemTime::now();
        assert_eq!(age(now - Duration::from_secs(3 * 86_400), now), "3 days ago");
        assert_eq!(age(now + Duration::from_secs(60), now), "now");
    }

    #[test]
    fn oldest_comes_first() {
        let now = SystemTime::now();
        let stamped = vec![
            (now - Duration::from_secs(60), "new".to_string()),
            (now - Duration::from_secs(7200), "old".to_string()),
        ];
        let table = rows(stamped, now);
        assert_eq!(table[0][2], "old");
        assert_eq!(table[0][1], "2 hours ago");
        assert_eq!(table[1][2], "new");
    }
}
