use std::os::unix::net::UnixDatagram;

use chrono::Local;
use clap::Parser;

use kit::{io, Error};

use crate::commands::CmdResult;

const SYSLOG_SOCKET: &str = "/dev/log";

const FACILITIES: &[(&str, u8)] = &[
    ("kern", 0),
    ("user", 1),
    ("mail", 2),
    ("daemon", 3),
    ("auth", 4),
    ("syslog", 5),
    ("lpr", 6),
    ("news", 7),
    ("uucp", 8),
    ("cron", 9),
    ("authpriv", 10),
    ("ftp", 11),
    ("local0", 16),
    ("local1", 17),
    ("local2", 18),
    ("local3", 19),
    ("local4", 20),
    ("local5", 21),
    ("local6", 22),
    ("local7", 23),
];

const LEVELS: &[(&str, u8)] = &[
    ("emerg", 0),
    ("alert", 1),
    ("crit", 2),
    ("err", 3),
    ("error", 3),
    ("warning", 4),
    ("warn", 4),
    ("notice", 5),
    ("info", 6),
    ("debug", 7),
];

#[derive(Parser, Debug)]
#[command(about = "Send messages to the system log")]
pub struct LoggerArgs {
    /// Priority as facility.level
    #[arg(short = 'p', long = "priority", default_value = "user.notice")]
    pub priority: String,

    /// Tag every line with TAG
    #[arg(short = 't', long = "tag")]
    pub tag: Option<String>,

    /// Also write the message to standard error
    #[arg(short = 's', long = "stderr")]
    pub stderr: bool,

    /// Read lines from FILE instead of standard input
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<String>,

    pub message: Vec<String>,
}

/// Encoded `<PRI>` value for `facility.level` (either part may be omitted).
pub fn priority(spec: &str) -> kit::Result<u8> {
    let invalid = || Error::invalid_value("priority", spec);
    let (facility, level) = match spec.split_once('.') {
        Some((f, l)) => (f, l),
        None => ("user", spec),
    };
    let lookup = |table: &[(&str, u8)], key: &str| {
        table
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, v)| *v)
            .or_else(|| key.parse().ok())
    };
    let facility = lookup(FACILITIES, facility).ok_or_else(invalid)?;
    let level = lookup(LEVELS, level).filter(|l| *l < 8).ok_or_else(invalid)?;
    Ok(facility * 8 + level)
}

fn default_tag() -> String {
    std::env::var("USER").unwrap_or_else(|_| "kit".to_string())
}

pub fn format_message(pri: u8, tag: &str, pid: u32, message: &str) -> String {
    let stamp = Local::now().format("%b %e %H:%M:%S");
    format!("<{}>{} {}[{}]: {}", pri, stamp, tag, pid, message)
}

pub fn run(args: LoggerArgs) -> CmdResult {
    let pri = priority(&args.priority)?;
    let tag = args.tag.clone().unwrap_or_else(default_tag);
    let pid = std::process::id();

    let messages = if args.message.is_empty() {
        io::read_lines(args.file.as_deref().unwrap_or(io::STDIN))?
            .into_iter()
            .filter(|l| !l.is_empty())
            .collect()
    } else {
        vec![args.message.join(" ")]
    };

    let socket = UnixDatagram::unbound().map_err(|e| Error::os("socket", &e))?;
    socket
        .connect(SYSLOG_SOCKET)
        .map_err(|e| Error::io(SYSLOG_SOCKET, &e))?;
    for message in messages {
        if args.stderr {
            eprintln!("{}: {}", tag, message);
        }
        let line = format_message(pri, &tag, pid, &message);
        tracing::debug!(%line, "syslog");
        socket
            .send(line.as_bytes())
            .map_err(|e| Error::io(SYSLOG_SOCKET, &e))?;
    }
    Ok(0)
}
