use std::fs;
use std::io::Write;
use std::path::Path;

use clap::Parser;

use kit::{io, output, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Remove empty directories")]
pub struct RmdirArgs {
    /// Also remove each now-empty parent
    #[arg(short = 'p', long = "parents")]
    pub parents: bool,

    /// Print a message for each removed directory
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[arg(required = true)]
    pub dirs: Vec<String>,
}

/// Remove `dir` and, with `parents`, each ancestor named in the path.
/// Stops at the first failure.
pub fn remove(dir: &Path, parents: bool, removed: &mut dyn FnMut(&Path)) -> kit::Result<()> {
    let mut current = Some(dir);
    while let Some(path) = current.filter(|p| !p.as_os_str().is_empty()) {
        fs::remove_dir(path).map_err(|e| {
            Error::io(format!("failed to remove '{}'", path.display()), &e)
        })?;
        removed(path);
        if !parents {
            break;
        }
        current = path.parent();
        if current == Some(Path::new("/")) {
            break;
        }
    }
    Ok(())
}

pub fn run(args: RmdirArgs) -> CmdResult {
    let mut out = io::stdout();
    let mut status = 0;
    for dir in &args.dirs {
        let mut log = Vec::new();
        let result = remove(Path::new(dir), args.parents, &mut |p| {
            log.push(format!("rmdir: removing directory, '{}'", p.display()))
        });
        if args.verbose {
            io::write_lines(&mut out, &log)?;
        }
        if let Err(err) = result {
            output::diagnostic("rmdir", &err.message);
            status = 1;
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
    fn parents_walk_upward_until_non_empty() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        fs::write(dir.path().join("keep"), "").unwrap();

        let mut seen = Vec::new();
        let result = remove(&dir.path().join("a/b/c"), true, &mut |p| seen.push(p.to_path_buf()));
        assert!(result.is_err());
        assert_eq!(
            seen,
            vec![dir.path().join("a/b/c"), dir.path().join("a/b"), dir.path().join("a")]
        );
    }

    #[test]
    fn non_empty_directory_fails() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("d");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("f"), "").unwrap();
        assert!(remove(&sub, false, &mut |_| {}).is_err());
    }
}
