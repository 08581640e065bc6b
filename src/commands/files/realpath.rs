use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;

use kit::{io, output, Error};

use crate::commands::CmdResult;

use super::pathinfo;

#[derive(Parser, Debug)]
#[command(about = "Print the resolved absolute path")]
pub struct RealpathArgs {
    /// Suppress error messages
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// No path components need exist
    #[arg(short = 'm', long = "canonicalize-missing")]
    pub missing: bool,

    /// All path components must exist (default)
    #[arg(short = 'e', long = "canonicalize-existing", conflicts_with = "missing")]
    pub existing: bool,

    #[arg(required = true)]
    pub paths: Vec<String>,
}

/// Resolve the deepest existing ancestor through the filesystem and append
/// the rest of the (lexically cleaned) path to it.
pub fn resolve_missing(path: &str) -> kit::Result<PathBuf> {
    let absolute = PathBuf::from(pathinfo::absolute(path)?);
    let mut existing = absolute.as_path();
    let mut rest = Vec::new();
    while fs::symlink_metadata(existing).is_err() {
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }
    let mut resolved = fs::canonicalize(existing).unwrap_or_else(|_| existing.to_path_buf());
    resolved.extend(rest.iter().rev());
    Ok(resolved)
}

pub fn resolve(path: &str, missing: bool) -> kit::Result<PathBuf> {
    if missing {
        return resolve_missing(path);
    }
    fs::canonicalize(Path::new(path)).map_err(|e| Error::io(path, &e))
}

pub fn run(args: RealpathArgs) -> CmdResult {
    let mut out = io::stdout();
    let mut status = 0;
    for path in &args.paths {
        match resolve(path, args.missing) {
            Ok(resolved) => writeln!(out, "{}", resolved.display())?,
            Err(err) => {
                if !args.quiet {
                    output::diagnostic("realpath", &err.message);
                }
                status = 1;
            }
        }
    }
    out.flush()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn existing_paths_resolve_links() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real");
        fs::create_dir(&real).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        let resolved = resolve(&link.display().to_string(), false).unwrap();
        assert_eq!(resolved, fs::canonicalize(&real).unwrap());
    }

    #[test]
    fn missing_components_need_flag() {
        let dir = TempDir::new().unwrap();
        let ghost = dir.path().join("nope/deeper");
        let text = ghost.display().to_string();
        assert!(resolve(&text, false).is_err());
        let resolved = resolve(&text, true).unwrap();
        assert_eq!(resolved, fs::canonicalize(dir.path()).unwrap().join("nope/deeper"));
    }
}
