use std::io::Write;

use clap::Parser;

use kit::procfs::{self, Process};
use kit::{io, users};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "List open files")]
pub struct LsofArgs {
    /// Only these process ids (comma-separated)
    #[arg(short = 'p', value_name = "PID", value_delimiter = ',')]
    pub pids: Vec<i32>,

    /// Only processes owned by USER
    #[arg(short = 'u', value_name = "USER")]
    pub user: Option<String>,

    /// Only commands starting with PREFIX
    #[arg(short = 'c', value_name = "PREFIX")]
    pub command: Option<String>,

    /// Only descriptors whose target is one of these files
    pub files: Vec<String>,
}

pub struct Filter {
    pids: Vec<i32>,
    uid: Option<u32>,
    prefix: Option<String>,
}

impl Filter {
    pub fn new(pids: Vec<i32>, uid: Option<u32>, prefix: Option<String>) -> Self {
        Self { pids, uid, prefix }
    }

    pub fn accepts(&self, process: &Process) -> bool {
        (self.pids.is_empty() || self.pids.contains(&process.pid))
            && self.uid.map_or(true, |uid| uid == process.uid)
            && self
                .prefix
                .as_deref()
                .map_or(true, |p| process.comm.starts_with(p))
    }
}

pub fn row(process: &Process, user: &str, fd: &str, target: &str) -> String {
    format!(
        "{:<16} {:>7} {:<10} {:>4} {:<7} {}",
        process.comm,
        process.pid,
        user,
        fd,
        procfs::fd_kind(target),
        target
    )
}

pub fn run(args: LsofArgs) -> CmdResult {
    let uid = args.user.as_deref().map(users::uid).transpose()?;
    let filter = Filter::new(args.pids.clone(), uid, args.command.clone());
    let wanted: Vec<std::path::PathBuf> = args
        .files
        .iter()
        .map(|f| std::fs::canonicalize(f).unwrap_or_else(|_| f.into()))
        .collect();

    let mut out = io::stdout();
    writeln!(
        out,
        "{:<16} {:>7} {:<10} {:>4} {:<7} {}",
        "COMMAND", "PID", "USER", "FD", "TYPE", "NAME"
    )?;
    let mut found = false;
    for process in procfs::processes()? {
        if !filter.accepts(&process) {
            continue;
        }
        let user = users::user_name(process.uid);
        for (fd, target) in procfs::open_files(process.pid) {
            if !wanted.is_empty() && !wanted.contains(&target) {
                continue;
            }
            found = true;
            writeln!(out, "{}", row(&process, &user, &fd, &target.display().to_string()))?;
        }
    }
    out.flush()?;
    Ok(if found || wanted.is_empty() { 0 } else { 1 })
}
