use std::fs::{self, DirBuilder};
use std::io::Write;
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};

use clap::Parser;

use kit::{io, modes, output, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Create directories")]
pub struct MkdirArgs {
    /// Create parents as needed; no error if existing
    #[arg(short = 'p', long = "parents")]
    pub parents: bool,

    /// Print a message for each created directory
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Set the mode of created directories
    #[arg(short = 'm', long = "mode", value_name = "MODE")]
    pub mode: Option<String>,

    #[arg(required = true)]
    pub dirs: Vec<String>,
}

/// Directories `mkdir -p` must create for `path`, outermost first.
pub fn missing_ancestors(path: &Path) -> Vec<PathBuf> {
    let mut missing: Vec<PathBuf> = path
        .ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .take_while(|p| !p.exists())
        .map(Path::to_path_buf)
        .collect();
    missing.reverse();
    missing
}

fn create(path: &Path, args: &MkdirArgs, created: &mut Vec<PathBuf>) -> kit::Result<()> {
    let targets = if args.parents {
        missing_ancestors(path)
    } else {
        vec![path.to_path_buf()]
    };
    for dir in targets {
        DirBuilder::new()
            .mode(0o777)
            .create(&dir)
            .map_err(|e| {
                Error::io(
                    format!("cannot create directory '{}'", dir.display()),
                    &e,
                )
            })?;
        created.push(dir);
    }
    if let Some(spec) = &args.mode {
        if created.last().map(PathBuf::as_path) == Some(path) {
            let mode = modes::apply(spec, 0o777, true)?;
            fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
                .map_err(|e| Error::io(path.display().to_string(), &e))?;
        }
    }
    Ok(())
}

pub fn run(args: MkdirArgs) -> CmdResult {
    if let Some(spec) = &args.mode {
        modes::apply(spec, 0o777, true)?;
    }
    let mut out = io::stdout();
    let mut status = 0;
    for dir in &args.dirs {
        let mut created = Vec::new();
        let result = create(Path::new(dir), &args, &mut created);
        if args.verbose {
            for path in &created {
                writeln!(out, "mkdir: created directory '{}'", path.display())?;
            }
        }
        if let Err(err) = result {
            output::diagnostic("mkdir", &err.message);
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

    fn args(parents: bool, mode: Option<&str>) -> MkdirArgs {
        MkdirArgs {
            parents,
            verbose: false,
            mode: mode.map(String::from),
            dirs: Vec::new(),
        }
    }

    #[test]
    fn parents_are_created_outermost_first() {
        let dir = TempDir::new().unwrap();
        let deep = dir.path().join("a/b/c");
        let mut created = Vec::new();
        create(&deep, &args(true, None), &mut created).unwrap();
        assert!(deep.is_dir());
        assert_eq!(created, vec![dir.path().join("a"), dir.path().join("a/b"), deep]);
    }

    #[test]
    fn parents_flag_tolerates_existing() {
        let dir = TempDir::new().unwrap();
        let mut created = Vec::new();
        create(dir.path(), &args(true, None), &mut created).unwrap();
        assert!(created.is_empty());
        assert!(create(dir.path(), &args(false, None), &mut created).is_err());
    }

    #[test]
    fn missing_parent_without_flag_fails() {
        let dir = TempDir::new().unwrap();
        let mut created = Vec::new();
        assert!(create(&dir.path().join("x/y"), &args(false, None), &mut created).is_err());
    }

    #[test]
    fn mode_applies_to_leaf() {
        let dir = TempDir::new().unwrap();
        let leaf = dir.path().join("m");
        let mut created = Vec::new();
        create(&leaf, &args(false, Some("700")), &mut created).unwrap();
        let mode = fs::metadata(&leaf).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
