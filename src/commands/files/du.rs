use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;

use kit::walk::{self, Entry, Order, WalkOptions};
use kit::{humanize, io, output};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Summarise disk usage of files and directories", disable_help_flag = true)]
pub struct DuArgs {
    /// Print sizes in powers of 1024 (1.5K, 23M)
    #[arg(short = 'h', long = "human-readable")]
    pub human: bool,

    /// Display only a total for each argument
    #[arg(short = 's', long = "summarize")]
    pub summarize: bool,

    /// Write counts for files as well as directories
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Print exact byte counts
    #[arg(short = 'b', long = "bytes")]
    pub bytes: bool,

    /// Produce a grand total
    #[arg(short = 'c', long = "total")]
    pub total: bool,

    /// Print totals only down to depth N
    #[arg(short = 'd', long = "max-depth", value_name = "N")]
    pub max_depth: Option<usize>,

    pub paths: Vec<String>,
}

/// Cumulative size of every entry under `root`, children before their
/// directory.
pub fn usage(root: &Path, errors: &mut dyn FnMut(kit::Error)) -> Vec<(PathBuf, usize, bool, u64)> {
    let mut pending: Vec<u64> = Vec::new();
    let mut rows = Vec::new();
    let options = WalkOptions {
        order: Order::Post,
        ..Default::default()
    };
    walk::walk(
        root,
        options,
        &mut |entry: &Entry| {
            let depth = entry.depth;
            if pending.len() < depth + 2 {
                pending.resize(depth + 2, 0);
            }
            let mut size = if entry.is_dir() { 0 } else { entry.metadata.len() };
            if entry.is_dir() {
                size += std::mem::take(&mut pending[depth + 1]);
            }
            pending[depth] += size;
            rows.push((entry.path.clone(), depth, entry.is_dir(), size));
        },
        &mut |err| errors(err),
    );
    rows
}

pub fn run(args: DuArgs) -> CmdResult {
    let paths = if args.paths.is_empty() {
        vec![".".to_string()]
    } else {
        args.paths.clone()
    };
    let show = |n: u64| {
        if args.human {
            humanize::short_size(n)
        } else if args.bytes {
            n.to_string()
        } else {
            n.div_ceil(1024).to_string()
        }
    };

    let mut out = io::stdout();
    let mut status = 0;
    let mut grand = 0;
    for path in &paths {
        let mut failed = false;
        let rows = usage(Path::new(path), &mut |err| {
            output::diagnostic("du", &err.message);
            failed = true;
        });
        if failed {
            status = 1;
        }
        for (entry, depth, is_dir, size) in &rows {
            let top = *depth == 0;
            let listed = if args.summarize {
                top
            } else {
                (top || *is_dir || args.all) && args.max_depth.map_or(true, |max| *depth <= max)
            };
            if listed {
                writeln!(out, "{}\t{}", show(*size), entry.display())?;
            }
            if top {
                grand += size;
            }
        }
    }
    if args.total {
        writeln!(out, "{}\ttotal", show(grand))?;
    }
    out.flush()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn directories_sum_their_contents_after_children() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/b/f"), vec![0u8; 300]).unwrap();
        fs::write(dir.path().join("a/g"), vec![0u8; 200]).unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();
        fs::write(dir.path().join("c/h"), vec![0u8; 7]).unwrap();

        let rows = usage(dir.path(), &mut |_| {});
        let size_of = |p: &Path| rows.iter().find(|r| r.0 == p).unwrap().3;
        assert_eq!(size_of(&dir.path().join("a/b")), 300);
        assert_eq!(size_of(&dir.path().join("a")), 500);
        assert_eq!(size_of(&dir.path().join("c")), 7);
        assert_eq!(size_of(dir.path()), 507);
        assert_eq!(rows.last().unwrap().0, dir.path());
    }
}
