use std::io::Write;

use clap::Parser;

use kit::procfs::{self, Process};
use kit::{io, users};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Report running processes")]
pub struct PsArgs {
    /// Every process, not just this terminal's
    #[arg(short = 'a', short_alias = 'e', long = "all")]
    pub all: bool,

    /// Add owner, parent and memory columns
    #[arg(short = 'f', long = "full")]
    pub full: bool,
}

/// Terminal name from a `tty_nr` device number.
pub fn tty_name(tty_nr: i32) -> String {
    if tty_nr == 0 {
        return "?".to_string();
    }
    let major = (tty_nr >> 8) & 0xfff;
    let minor = (tty_nr & 0xff) | ((tty_nr >> 12) & 0xfff00);
    match major {
        4 if minor < 64 => format!("tty{}", minor),
        4 => format!("ttyS{}", minor - 64),
        136..=143 => format!("pts/{}", (major - 136) * 256 + minor),
        _ => format!("{}:{}", major, minor),
    }
}

/// `[DD-]HH:MM:SS` of CPU time.
pub fn cpu_time(ticks: u64, ticks_per_second: u64) -> String {
    let secs = ticks / ticks_per_second.max(1);
    let (days, rest) = (secs / 86_400, secs % 86_400);
    let clock = format!("{:02}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    if days > 0 {
        format!("{}-{}", days, clock)
    } else {
        clock
    }
}

fn clock_ticks() -> u64 {
    // SAFETY: sysconf has no memory effects.
    let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if ticks > 0 {
        ticks as u64
    } else {
        100
    }
}

fn own_tty() -> i32 {
    procfs::read_process(std::path::Path::new(procfs::PROC), std::process::id() as i32)
        .map(|p| p.tty_nr)
        .unwrap_or(0)
}

pub fn select(processes: Vec<Process>, all: bool, tty: i32, uid: u32) -> Vec<Process> {
    processes
        .into_iter()
        .filter(|p| all || (p.tty_nr == tty && p.uid == uid && tty != 0))
        .collect()
}

pub fn run(args: PsArgs) -> CmdResult {
    let hz = clock_ticks();
    // SAFETY: getuid cannot fail.
    let uid = unsafe { libc::getuid() };
    let selected = select(procfs::processes()?, args.all, own_tty(), uid);
    // SAFETY: sysconf has no memory effects.
    let page_kib = (unsafe { libc::sysconf(libc::_SC_PAGESIZE) }.max(4096) / 1024) as i64;

    let mut out = io::stdout();
    if args.full {
        writeln!(
            out,
            "{:<10} {:>7} {:>7} {:>9} {:<8} {:>10} CMD",
            "UID", "PID", "PPID", "RSS", "TTY", "TIME"
        )?;
    } else {
        writeln!(out, "{:>7} {:<8} {:>10} CMD", "PID", "TTY", "TIME")?;
    }
    for p in selected {
        let time = cpu_time(p.utime + p.stime, hz);
        if args.full {
            writeln!(
                out,
                "{:<10} {:>7} {:>7} {:>9} {:<8} {:>10} {}",
                users::user_name(p.uid),
                p.pid,
                p.ppid,
                p.rss_pages * page_kib,
                tty_name(p.tty_nr),
                time,
                p.command()
            )?;
        } else {
            writeln!(out, "{:>7} {:<8} {:>10} {}", p.pid, tty_name(p.tty_nr), time, p.comm)?;
        }
    }
    out.flush()?;
    Ok(0)
}
