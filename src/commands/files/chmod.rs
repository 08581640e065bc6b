use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use clap::Parser;

use kit::walk::{self, Entry, WalkOptions};
use kit::{io, modes, output, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Change file mode bits")]
pub struct ChmodArgs {
    /// Change files and directories recursively
    #[arg(short = 'R', long = "recursive")]
    pub recursive: bool,

    /// Report every file processed
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Report only when a change is made
    #[arg(short = 'c', long = "changes")]
    pub changes: bool,

    /// Suppress most error messages
    #[arg(short = 'f', long = "silent", visible_alias = "quiet")]
    pub silent: bool,

    /// Octal or symbolic mode, e.g. 755 or u+x,go-w
    #[arg(value_name = "MODE", allow_hyphen_values = true)]
    pub mode: String,

    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<String>,
}

fn describe(path: &Path, old: u32, new: u32) -> String {
    let old_sym = &modes::symbolic(old)[1..];
    let new_sym = &modes::symbolic(new)[1..];
    if old & 0o7777 == new & 0o7777 {
        format!(
            "mode of '{}' retained as {:04o} ({})",
            path.display(),
            new & 0o7777,
            new_sym
        )
    } else {
        format!(
            "mode of '{}' changed from {:04o} ({}) to {:04o} ({})",
            path.display(),
            old & 0o7777,
            old_sym,
            new & 0o7777,
            new_sym
        )
    }
}

fn change(path: &Path, args: &ChmodArgs, out: &mut dyn Write) -> kit::Result<()> {
    let meta = fs::metadata(path).map_err(|e| Error::io(path.display().to_string(), &e))?;
    let old = meta.permissions().mode();
    let new = modes::apply(&args.mode, old, meta.is_dir())?;
    if old & 0o7777 != new & 0o7777 {
        fs::set_permissions(path, fs::Permissions::from_mode(new & 0o7777))
            .map_err(|e| Error::io(path.display().to_string(), &e))?;
    }
    if args.verbose || (args.changes && old & 0o7777 != new & 0o7777) {
        writeln!(out, "{}", describe(path, old, new))?;
    }
    Ok(())
}

pub fn run(args: ChmodArgs) -> CmdResult {
    // reject a bad mode before touching anything
    modes::apply(&args.mode, 0, false)?;

    let mut out = io::stdout();
    let mut status = 0;
    let fail = |err: Error, status: &mut i32| {
        if err.is_broken_pipe() {
            return Err(err);
        }
        if !args.silent {
            output::diagnostic("chmod", &err.message);
        }
        *status = 1;
        Ok(())
    };

    for file in &args.files {
        let root = Path::new(file);
        if !args.recursive {
            if let Err(err) = change(root, &args, &mut out) {
                fail(err, &mut status)?;
            }
            continue;
        }
        let mut errors = Vec::new();
        let mut unreadable = Vec::new();
        walk::walk(
            root,
            WalkOptions::default(),
            &mut |entry: &Entry| {
                if entry.is_symlink() {
                    return;
                }
                if let Err(err) = change(&entry.path, &args, &mut out) {
                    errors.push(err);
                }
            },
            &mut |err| unreadable.push(err),
        );
        for err in unreadable.into_iter().chain(errors) {
            fail(err, &mut status)?;
        }
    }
    out.flush()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(mode: &str, files: Vec<String>, recursive: bool) -> ChmodArgs {
        ChmodArgs {
            recursive,
            verbose: false,
            changes: false,
            silent: false,
            mode: mode.to_string(),
            files,
        }
    }

    fn mode_of(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o7777
    }

    #[test]
    fn recursive_x_marks_directories_only() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o600)).unwrap();
        let file = dir.path().join("f");
        fs::write(&file, "").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o600)).unwrap();

        let a = args("a+X", vec![], true);
        let mut sink = Vec::new();
        change(&sub, &a, &mut sink).unwrap();
        change(&file, &a, &mut sink).unwrap();
        assert_eq!(mode_of(&sub), 0o711);
        assert_eq!(mode_of(&file), 0o600);
    }

    #[test]
    fn verbose_line_describes_change() {
        let line = describe(Path::new("f"), 0o100644, 0o100755);
        assert_eq!(line, "mode of 'f' changed from 0644 (rw-r--r--) to 0755 (rwxr-xr-x)");
    }

    #[test]
    fn missing_file_is_reported() {
        let a = args("644", vec![], false);
        let mut sink = Vec::new();
        let err = change(Path::new("/nonexistent/kit-chmod"), &a, &mut sink).unwrap_err();
        assert!(err.message.contains("No such file"));
    }
}
