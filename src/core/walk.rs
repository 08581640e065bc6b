//! Recursive directory traversal shared by `du`, `find`, `tree`, `grep -r`,
//! `cp -r`, `chmod -R` and friends.
//!
//! Walks never follow symbolic links and visit directory entries in
//! byte-wise name order so output is reproducible.

use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Entry {
    pub path: PathBuf,
    /// 0 for the root itself.
    pub depth: usize,
    pub metadata: Metadata,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.metadata.is_file()
    }

    pub fn is_symlink(&self) -> bool {
        self.metadata.file_type().is_symlink()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Which order directories are yielded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Directory before its contents (`find`, `tree`).
    Pre,
    /// Directory after its contents (`du`, `rm -r`).
    Post,
}

#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    pub order: Order,
    pub max_depth: Option<usize>,
    pub include_hidden: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            order: Order::Pre,
            max_depth: None,
            include_hidden: true,
        }
    }
}

/// Children of `dir`, sorted by name.
pub fn sorted_children(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir.display().to_string(), &e))?;
    let mut children: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    children.sort();
    Ok(children)
}

pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Walk `root`, calling `visit` for every entry. Unreadable directories
/// are passed to `on_error` and skipped; the walk continues.
pub fn walk<V, E>(root: &Path, options: WalkOptions, visit: &mut V, on_error: &mut E)
where
    V: FnMut(&Entry),
    E: FnMut(Error),
{
    let metadata = match fs::symlink_metadata(root) {
        Ok(m) => m,
        Err(e) => {
            on_error(Error::io(root.display().to_string(), &e));
            return;
        }
    };
    let entry = Entry {
        path: root.to_path_buf(),
        depth: 0,
        metadata,
    };
    walk_entry(entry, options, visit, on_error);
}

fn walk_entry<V, E>(entry: Entry, options: WalkOptions, visit: &mut V, on_error: &mut E)
where
    V: FnMut(&Entry),
    E: FnMut(Error),
{
    let descend = entry.is_dir() && options.max_depth.map_or(true, |max| entry.depth < max);

    if options.order == Order::Pre {
        visit(&entry);
    }

    if descend {
        match sorted_children(&entry.path) {
            Ok(children) => {
                for child in children {
                    if !options.include_hidden && is_hidden(&child) {
                        continue;
                    }
                    match fs::symlink_metadata(&child) {
                        Ok(metadata) => walk_entry(
                            Entry {
                                path: child,
                                depth: entry.depth + 1,
                                metadata,
                            },
                            options,
                            visit,
                            on_error,
                        ),
                        Err(e) => on_error(Error::io(child.display().to_string(), &e)),
                    }
                }
            }
            Err(err) => on_error(err),
        }
    }

    if options.order == Order::Post {
        visit(&entry);
    }
}

/// Collect every entry under `root` (pre-order), ignoring errors.
pub fn collect(root: &Path, options: WalkOptions) -> Vec<Entry> {
    let mut entries = Vec::new();
    walk(root, options, &mut |e: &Entry| entries.push(e.clone()), &mut |_| {});
    entries
}

/// Total apparent size of every regular file under `path`.
pub fn total_size(path: &Path) -> u64 {
    let mut total = 0;
    walk(
        path,
        WalkOptions::default(),
        &mut |e: &Entry| {
            if e.is_file() {
                total += e.metadata.len();
            }
        },
        &mut |_| {},
    );
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), "12345").unwrap();
        fs::write(dir.path().join("sub/b.txt"), "123").unwrap();
        fs::write(dir.path().join(".hidden"), "1").unwrap();
        dir
    }

    #[test]
    fn pre_order_visits_root_first() {
        let dir = fixture();
        let entries = collect(dir.path(), WalkOptions::default());
        assert_eq!(entries[0].depth, 0);
        assert_eq!(entries.len(), 5);
    }

    #[test]
    fn post_order_visits_root_last() {
        let dir = fixture();
        let mut names = Vec::new();
        walk(
            dir.path(),
            WalkOptions {
                order: Order::Post,
                ..WalkOptions::default()
            },
            &mut |e: &Entry| names.push(e.depth),
            &mut |_| {},
        );
        assert_eq!(names.last(), Some(&0));
    }

    #[test]
    fn hidden_entries_can_be_skipped() {
        let dir = fixture();
        let entries = collect(
            dir.path(),
            WalkOptions {
                include_hidden: false,
                ..WalkOptions::default()
            },
        );
        assert!(entries.iter().all(|e| !e.file_name().starts_with('.') || e.depth == 0));
    }

    #[test]
    fn max_depth_limits_descent() {
        let dir = fixture();
        let entries = collect(
            dir.path(),
            WalkOptions {
                max_depth: Some(1),
                ..WalkOptions::default()
            },
        );
        assert!(entries.iter().all(|e| e.depth <= 1));
        assert!(!entries.iter().any(|e| e.file_name() == "b.txt"));
    }

    #[test]
    fn total_size_sums_files() {
        let dir = fixture();
        assert_eq!(total_size(dir.path()), 9);
    }

    #[test]
    fn missing_root_reports_error() {
        let mut errors = Vec::new();
        walk(
            Path::new("/nonexistent/kit-walk"),
            WalkOptions::default(),
            &mut |_: &Entry| {},
            &mut |e| errors.push(e),
        );
        assert_eq!(errors.len(), 1);
    }
}
