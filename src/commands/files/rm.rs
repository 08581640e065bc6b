use std::fs;
use std::io::Write;
use std::path::Path;

use clap::Parser;

use kit::{fsops, io, output, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Remove files or directories")]
pub struct RmArgs {
    /// Remove directories and their contents recursively
    #[arg(short = 'r', short_alias = 'R', long = "recursive")]
    pub recursive: bool,

    /// Ignore nonexistent files, never fail on them
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Remove empty directories
    #[arg(short = 'd', long = "dir")]
    pub dir: bool,

    /// Explain what is being done
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    pub paths: Vec<String>,
}

fn is_protected(path: &Path) -> bool {
    if path == Path::new("/") {
        return true;
    }
    matches!(
        path.file_name().and_then(|n| n.to_str()),
        None | Some(".") | Some("..")
    )
}

/// Remove one operand according to the flags.
pub fn remove(path: &Path, args: &RmArgs) -> kit::Result<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if args.force && e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(Error::io(format!("cannot remove '{}'", path.display()), &e))
        }
    };
    if meta.is_dir() {
        if is_protected(path) {
            return Err(Error::runtime(format!(
                "refusing to remove '.' or '..' or '/' directory: skipping '{}'",
                path.display()
            )));
        }
        if !args.recursive {
            if args.dir {
                fs::remove_dir(path).map_err(|e| {
                    Error::io(format!("cannot remove '{}'", path.display()), &e)
                })?;
                return Ok(true);
            }
            return Err(Error::runtime(format!(
                "cannot remove '{}': Is a directory",
                path.display()
            )));
        }
    }
    fsops::remove(path, args.recursive)?;
    Ok(true)
}

pub fn run(args: RmArgs) -> CmdResult {
    if args.paths.is_empty() && !args.force {
        return Err(Error::missing_operand(None));
    }
    let mut out = io::stdout();
    let mut status = 0;
    for path in &args.paths {
        match remove(Path::new(path), &args) {
            Ok(true) if args.verbose => writeln!(out, "removed '{}'", path)?,
            Ok(_) => {}
            Err(err) => {
                output::diagnostic("rm", &err.message);
                status = 1;
            }
        }
    }
    out.flush()?;
    Ok(status)
}
