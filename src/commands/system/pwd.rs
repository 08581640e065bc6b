use std::io::Write;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use clap::Parser;

use kit::{io, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Print the current working directory")]
pub struct PwdArgs {
    /// Use $PWD even when it contains symbolic links (default)
    #[arg(short = 'L', long = "logical", overrides_with = "physical")]
    pub logical: bool,

    /// Resolve all symbolic links
    #[arg(short = 'P', long = "physical")]
    pub physical: bool,
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::metadata(a), std::fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

/// `$PWD` when it is absolute, free of `.`/`..` and names the current
/// directory; otherwise `None`.
pub fn logical(pwd: Option<&str>, cwd: &Path) -> Option<PathBuf> {
    let pwd = Path::new(pwd?);
    let clean = pwd.is_absolute()
        && !pwd
            .components()
            .any(|c| matches!(c, std::path::Component::CurDir | std::path::Component::ParentDir));
    (clean && same_file(pwd, cwd)).then(|| pwd.to_path_buf())
}

pub fn run(args: PwdArgs) -> CmdResult {
    let cwd = std::env::current_dir().map_err(|e| Error::os("cannot get current directory", &e))?;
    let path = if args.physical {
        std::fs::canonicalize(&cwd).unwrap_or(cwd)
    } else {
        let pwd = std::env::var("PWD").ok();
        logical(pwd.as_deref(), &cwd).unwrap_or(cwd)
    };
    let mut out = io::stdout();
    writeln!(out, "{}", path.display())?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn logical_keeps_symlinked_spelling() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real");
        std::fs::create_dir(&real).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let text = link.display().to_string();
        assert_eq!(logical(Some(&text), &real), Some(link.clone()));
        assert_eq!(logical(Some("relative"), &real), None);
        let dotted = format!("{}/../link", text);
        assert_eq!(logical(Some(&dotted), &real), None);
        assert_eq!(logical(None, &real), None);
    }
}
