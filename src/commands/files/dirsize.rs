use std::io::Write;
use std::path::Path;

use clap::Parser;

use kit::{humanize, io, walk};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "List directory entries by total size, largest first")]
pub struct DirsizeArgs {
    /// Include hidden entries
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Show only the N largest entries
    #[arg(short = 'n', long = "top", value_name = "N")]
    pub top: Option<usize>,

    /// Smallest first
    #[arg(short = 'r', long = "reverse")]
    pub reverse: bool,

    /// Exact byte counts instead of human sizes
    #[arg(short = 'b', long = "bytes")]
    pub bytes: bool,

    #[arg(default_value = ".")]
    pub dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measured {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

/// Every child of `dir` with its size; directories count their contents.
pub fn measure(dir: &Path, hidden: bool) -> kit::Result<Vec<Measured>> {
    let mut entries: Vec<Measured> = walk::sorted_children(dir)?
        .into_iter()
        .filter(|p| hidden || !walk::is_hidden(p))
        .map(|path| {
            let is_dir = path.symlink_metadata().map(|m| m.is_dir()).unwrap_or(false);
            Measured {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                is_dir,
                size: walk::total_size(&path),
            }
        })
        .collect();
    entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

pub fn run(args: DirsizeArgs) -> CmdResult {
    let mut entries = measure(Path::new(&args.dir), args.all)?;
    let total: u64 = entries.iter().map(|e| e.size).sum();
    if args.reverse {
        entries.reverse();
    }
    if let Some(n) = args.top {
        entries.truncate(n);
    }

    let show = |n: u64| {
        if args.bytes {
            n.to_string()
        } else {
            humanize::short_size(n)
        }
    };
    let mut out = io::stdout();
    for e in &entries {
        let slash = if e.is_dir { "/" } else { "" };
        writeln!(out, "{:>8}  {}{}", show(e.size), e.name, slash)?;
    }
    writeln!(out, "{:>8}  total", show(total))?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn directories_expand_and_sort_by_size() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("small"), "ab").unwrap();
        fs::create_dir(dir.path().join("big")).unwrap();
        fs::write(dir.path().join("big/a"), vec![0u8; 100]).unwrap();
        fs::write(dir.path().join("big/b"), vec![0u8; 50]).unwrap();
        fs::write(dir.path().join(".hidden"), vec![0u8; 500]).unwrap();

        let entries = measure(dir.path(), false).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "big");
        assert!(entries[0].is_dir);
        assert_eq!(entries[0].size, 150);
        assert_eq!(entries[1].size, 2);

        let all = measure(dir.path(), true).unwrap();
        assert_eq!(all[0].name, ".hidden");
    }
}
