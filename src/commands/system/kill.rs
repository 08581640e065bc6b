use std::io::Write;

use clap::Parser;
use regex::Regex;

use kit::procfs::{self, Process};
use kit::{io, output, signals, users, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Send a signal to processes")]
pub struct KillArgs {
    /// Signal name or number (default TERM)
    #[arg(short = 's', long = "signal", value_name = "SIGNAL", default_value = "TERM")]
    pub signal: String,

    /// List signal names, or translate one
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    #[arg(value_name = "PID", allow_hyphen_values = true)]
    pub targets: Vec<String>,
}

pub fn signal_number(spec: &str) -> kit::Result<i32> {
    signals::number(spec).ok_or_else(|| Error::invalid_argument("signal", spec))
}

fn send(pid: i32, signal: i32) -> kit::Result<()> {
    // SAFETY: kill(2) has no memory effects.
    if unsafe { libc::kill(pid, signal) } != 0 {
        return Err(Error::last_os(format!("({})", pid)));
    }
    Ok(())
}

/// `kill -l` output: every name, or the translation of each operand.
pub fn list(targets: &[String]) -> kit::Result<Vec<String>> {
    if targets.is_empty() {
        let names: Vec<&str> = signals::SIGNALS.iter().map(|(_, n)| *n).collect();
        return Ok(vec![names.join(" ")]);
    }
    targets
        .iter()
        .map(|t| match t.parse::<i32>() {
            // exit statuses of signalled children translate too
            Ok(n) => signals::name(if n > 128 { n - 128 } else { n })
                .map(str::to_string)
                .ok_or_else(|| Error::invalid_argument("signal", t)),
            Err(_) => signal_number(t).map(|n| n.to_string()),
        })
        .collect()
}

pub fn run(args: KillArgs) -> CmdResult {
    if args.list {
        io::write_lines(&mut io::stdout(), list(&args.targets)?)?;
        return Ok(0);
    }
    if args.targets.is_empty() {
        return Err(Error::missing_operand(None));
    }
    let signal = signal_number(&args.signal)?;
    let mut status = 0;
    for target in &args.targets {
        let result = target
            .parse::<i32>()
            .map_err(|_| Error::invalid_argument("process id", target))
            .and_then(|pid| send(pid, signal));
        if let Err(err) = result {
            output::diagnostic("kill", &err.message);
            status = 1;
        }
    }
    Ok(status)
}

#[derive(Parser, Debug)]
#[command(about = "Signal processes by name")]
pub struct PkillArgs {
    /// Signal name or number (default TERM)
    #[arg(short = 's', long = "signal", value_name = "SIGNAL", default_value = "TERM")]
    pub signal: String,

    /// Require the pattern to match the whole name
    #[arg(short = 'x', long = "exact")]
    pub exact: bool,

    /// Match against the full command line
    #[arg(short = 'f', long = "full")]
    pub full: bool,

    /// Only processes owned by USER
    #[arg(short = 'u', long = "euid", value_name = "USER")]
    pub user: Option<String>,

    /// Print each signalled process
    #[arg(short = 'e', long = "echo")]
    pub echo: bool,

    pub pattern: String,
}

pub struct Matcher {
    regex: Regex,
    full: bool,
    uid: Option<u32>,
}

impl Matcher {
    pub fn new(pattern: &str, exact: bool, full: bool, uid: Option<u32>) -> kit::Result<Self> {
        let source = if exact {
            format!("^(?:{})$", pattern)
        } else {
            pattern.to_string()
        };
        let regex = Regex::new(&source).map_err(|e| Error::invalid_pattern(pattern, e))?;
        Ok(Self { regex, full, uid })
    }

    pub fn matches(&self, process: &Process) -> bool {
        if self.uid.is_some_and(|uid| uid != process.uid) {
            return false;
        }
        if self.full {
            self.regex.is_match(&process.command())
        } else {
            self.regex.is_match(&process.comm)
        }
    }
}

pub fn run_pkill(args: PkillArgs) -> CmdResult {
    let signal = signal_number(&args.signal)?;
    let uid = args.user.as_deref().map(users::uid).transpose()?;
    let matcher = Matcher::new(&args.pattern, args.exact, args.full, uid)?;
    let me = std::process::id() as i32;

    let mut out = io::stdout();
    let mut matched = 0;
    for process in procfs::processes()? {
        if process.pid == me || !matcher.matches(&process) {
            continue;
        }
        match send(process.pid, signal) {
            Ok(()) => {
                matched += 1;
                if args.echo {
                    writeln!(out, "{} killed (pid {})", process.comm, process.pid)?;
                }
            }
            Err(err) => output::diagnostic("pkill", format!("killing pid {} failed: {}", process.pid, err)),
        }
    }
    out.flush()?;
    Ok(if matched > 0 { 0 } else { 1 })
}

#[derive(Parser, Debug)]
#[command(about = "Translate between signal numbers and names")]
pub struct SignameArgs {
    #[arg(value_name = "NUMBER|NAME")]
    pub signal: Option<String>,
}

pub fn signame(spec: &str) -> kit::Result<String> {
    match spec.parse::<i32>() {
        Ok(n) => signals::name(n)
            .map(|name| format!("SIG{}", name))
            .ok_or_else(|| Error::invalid_argument("signal", spec)),
        Err(_) => signal_number(spec).map(|n| n.to_string()),
    }
}

pub fn run_signame(args: SignameArgs) -> CmdResult {
    let mut out = io::stdout();
    match &args.signal {
        Some(spec) => writeln!(out, "{}", signame(spec)?)?,
        None => {
            for (number, name) in signals::SIGNALS {
                writeln!(out, "{:>2}  SIG{}", number, name)?;
            }
        }
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(comm: &str, cmdline: &[&str], uid: u32) -> Process {
        Process {
            pid: 42,
            ppid: 1,
            state: 'S',
            comm: comm.into(),
            cmdline: cmdline.iter().map(|s| s.to_string()).collect(),
            uid,
            tty_nr: 0,
            utime: 0,
            stime: 0,
            rss_pages: 0,
        }
    }

    #[test]
    fn list_translates_both_ways() {
        assert_eq!(list(&["9".into(), "TERM".into()]).unwrap(), vec!["KILL", "15"]);
        assert_eq!(list(&["137".into()]).unwrap(), vec!["KILL"]);
        assert!(list(&[]).unwrap()[0].starts_with("HUP INT QUIT"));
    }

    #[test]
    fn signame_adds_prefix() {
        assert_eq!(signame("2").unwrap(), "SIGINT");
        assert_eq!(signame("SIGUSR1").unwrap(), "10");
        assert!(signame("NOPE").is_err());
    }

    #[test]
    fn matcher_respects_exact_full_and_user() {
        let p = process("nginx", &["nginx", "-g", "daemon off;"], 33);
        assert!(Matcher::new("gin", false, false, None).unwrap().matches(&p));
        assert!(!Matcher::new("gin", true, false, None).unwrap().matches(&p));
        assert!(Matcher::new("daemon", false, true, None).unwrap().matches(&p));
        assert!(!Matcher::new("daemon", false, false, None).unwrap().matches(&p));
        assert!(!Matcher::new("nginx", false, false, Some(0)).unwrap().matches(&p));
    }

    #[test]
    fn signal_zero_probes_self() {
        send(std::process::id() as i32, 0).unwrap();
    }
}
