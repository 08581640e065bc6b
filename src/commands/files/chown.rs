use std::io::Write;
use std::os::unix::fs::{chown, lchown};
use std::path::Path;

use clap::Parser;

use kit::walk::{self, Entry, WalkOptions};
use kit::{io, output, users, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Change file owner and group")]
pub struct ChownArgs {
    /// Operate on files and directories recursively
    #[arg(short = 'R', long = "recursive")]
    pub recursive: bool,

    /// Change symbolic links instead of their targets
    #[arg(short = 'h', long = "no-dereference")]
    pub no_dereference: bool,

    /// Report every file processed
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// OWNER[:GROUP], names or numeric ids
    #[arg(value_name = "OWNER[:GROUP]")]
    pub owner: String,

    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Change group ownership")]
pub struct ChgrpArgs {
    /// Operate on files and directories recursively
    #[arg(short = 'R', long = "recursive")]
    pub recursive: bool,

    /// Change symbolic links instead of their targets
    #[arg(short = 'h', long = "no-dereference")]
    pub no_dereference: bool,

    /// Report every file processed
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[arg(value_name = "GROUP")]
    pub group: String,

    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct Change {
    uid: Option<u32>,
    gid: Option<u32>,
    recursive: bool,
    no_dereference: bool,
    verbose: bool,
}

fn apply(path: &Path, change: Change, link: bool, out: &mut dyn Write) -> kit::Result<()> {
    let result = if link {
        lchown(path, change.uid, change.gid)
    } else {
        chown(path, change.uid, change.gid)
    };
    result.map_err(|e| Error::io(path.display().to_string(), &e))?;
    if change.verbose {
        writeln!(out, "ownership of '{}' updated", path.display())?;
    }
    Ok(())
}

fn change_all(tool: &str, files: &[String], change: Change) -> CmdResult {
    let mut out = io::stdout();
    let mut errors: Vec<Error> = Vec::new();
    for file in files {
        let root = Path::new(file);
        if !change.recursive {
            if let Err(err) = apply(root, change, change.no_dereference, &mut out) {
                errors.push(err);
            }
            continue;
        }
        let mut failed = Vec::new();
        let mut unreadable = Vec::new();
        walk::walk(
            root,
            WalkOptions::default(),
            &mut |entry: &Entry| {
                // links met during the walk are never followed
                let link = entry.is_symlink() && (entry.depth > 0 || change.no_dereference);
                if let Err(err) = apply(&entry.path, change, link, &mut out) {
                    failed.push(err);
                }
            },
            &mut |err| unreadable.push(err),
        );
        errors.extend(unreadable);
        errors.extend(failed);
    }
    out.flush()?;

    let mut status = 0;
    for err in errors {
        if err.is_broken_pipe() {
            return Err(err);
        }
        output::diagnostic(tool, &err.message);
        status = 1;
    }
    Ok(status)
}

pub fn run(args: ChownArgs) -> CmdResult {
    let (user, group) = users::split_owner(&args.owner);
    if user.is_none() && group.is_none() {
        return Err(Error::invalid_argument("owner", &args.owner));
    }
    let change = Change {
        uid: user.map(users::uid).transpose()?,
        gid: group.map(users::gid).transpose()?,
        recursive: args.recursive,
        no_dereference: args.no_dereference,
        verbose: args.verbose,
    };
    change_all("chown", &args.files, change)
}

pub fn run_chgrp(args: ChgrpArgs) -> CmdResult {
    let change = Change {
        uid: None,
        gid: Some(users::gid(&args.group)?),
        recursive: args.recursive,
        no_dereference: args.no_dereference,
        verbose: args.verbose,
    };
    change_all("chgrp", &args.files, change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::MetadataExt;
    use tempfile::TempDir;

    fn current(path: &Path) -> (u32, u32) {
        let meta = fs::metadata(path).unwrap();
        (meta.uid(), meta.gid())
    }

    #[test]
    fn chown_to_current_owner_succeeds() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, "").unwrap();
        let (uid, gid) = current(&file);
        let change = Change {
            uid: Some(uid),
            gid: Some(gid),
            recursive: false,
            no_dereference: false,
            verbose: true,
        };
        let mut out = Vec::new();
        apply(&file, change, false, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("ownership of"));
        assert_eq!(current(&file), (uid, gid));
    }

    #[test]
    fn recursive_walk_reports_missing_root() {
        let change = Change {
            uid: None,
            gid: None,
            recursive: true,
            no_dereference: false,
            verbose: false,
        };
        let code = change_all("chown", &["/nonexistent/kit-chown".to_string()], change).unwrap();
        assert_eq!(code, 1);
    }
}
