use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::{Duration, SystemTime};

use clap::Parser;

use kit::{io, walk, Error};

use crate::commands::CmdResult;

const POLL: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(about = "Report files created, modified or deleted under a directory")]
pub struct WatcherArgs {
    /// Watch subdirectories too
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,

    #[arg(default_value = ".")]
    pub dir: String,
}

/// File name to size and modification time.
pub type Snapshot = BTreeMap<String, (u64, SystemTime)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Created(String),
    Modified(String),
    Deleted(String),
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Created(name) => write!(f, "CREATED  {}", name),
            Change::Modified(name) => write!(f, "MODIFIED {}", name),
            Change::Deleted(name) => write!(f, "DELETED  {}", name),
        }
    }
}

pub fn snapshot(dir: &Path, recursive: bool) -> Snapshot {
    let options = walk::WalkOptions {
        max_depth: if recursive { None } else { Some(1) },
        ..Default::default()
    };
    walk::collect(dir, options)
        .into_iter()
        .filter(|entry| entry.depth > 0 && !entry.is_dir())
        .map(|entry| {
            let name = entry
                .path
                .strip_prefix(dir)
                .unwrap_or(&entry.path)
                .display()
                .to_string();
            let modified = entry.metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            (name, (entry.metadata.len(), modified))
        })
        .collect()
}

/// Changes between two snapshots, in name order.
pub fn diff(before: &Snapshot, after: &Snapshot) -> Vec<Change> {
    let mut changes = Vec::new();
    for (name, state) in after {
        match before.get(name) {
            None => changes.push(Change::Created(name.clone())),
            Some(old) if old != state => changes.push(Change::Modified(name.clone())),
            Some(_) => {}
        }
    }
    for name in before.keys() {
        if !after.contains_key(name) {
            changes.push(Change::Deleted(name.clone()));
        }
    }
    changes.sort_by(|a, b| name_of(a).cmp(name_of(b)));
    changes
}

fn name_of(change: &Change) -> &str {
    match change {
        Change::Created(n) | Change::Modified(n) | Change::Deleted(n) => n,
    }
}

pub fn run(args: WatcherArgs) -> CmdResult {
    let dir = Path::new(&args.dir);
    if !dir.is_dir() {
        return Err(Error::invalid_argument("directory", &args.dir)
            .with_hint("watcher needs an existing directory"));
    }
    let mut out = io::stdout();
    let mut before = snapshot(dir, args.recursive);
    tracing::debug!(files = before.len(), dir = %dir.display(), "watching");
    loop {
        thread::sleep(POLL);
        let after = snapshot(dir, args.recursive);
        for change in diff(&before, &after) {
            let stamp = chrono::Local::now().format("%H:%M:%S");
            writeln!(out, "{} {}", stamp, change)?;
        }
        out.flush()?;
        before = after;
    }
}
