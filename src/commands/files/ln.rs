use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;

use kit::{fsops, io, output, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Make hard or symbolic links")]
pub struct LnArgs {
    /// Make symbolic links instead of hard links
    #[arg(short = 's', long = "symbolic")]
    pub symbolic: bool,

    /// Remove existing destination files
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Treat LINK as a normal file even if it is a link to a directory
    #[arg(short = 'n', long = "no-dereference")]
    pub no_dereference: bool,

    /// Print the name of each linked file
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[arg(value_name = "TARGET... [LINK]", required = true)]
    pub paths: Vec<String>,
}

/// Pair each target with the link to create.
pub fn plan(paths: &[String], no_dereference: bool) -> kit::Result<Vec<(PathBuf, PathBuf)>> {
    let in_dir = |target: &Path, dir: &Path| -> kit::Result<PathBuf> {
        let name = target
            .file_name()
            .ok_or_else(|| Error::invalid_argument("target", target.display().to_string()))?;
        Ok(dir.join(name))
    };
    match paths {
        [] => Err(Error::missing_operand(None)),
        [target] => {
            let target = PathBuf::from(target);
            let link = in_dir(&target, Path::new("."))?;
            Ok(vec![(target, link)])
        }
        [target, link] => {
            let target = PathBuf::from(target);
            let link = Path::new(link);
            let into_dir = link.is_dir() && !(no_dereference && link.is_symlink());
            let link = if into_dir {
                in_dir(&target, link)?
            } else {
                link.to_path_buf()
            };
            Ok(vec![(target, link)])
        }
        [targets @ .., dir] => {
            let dir = Path::new(dir);
            if !dir.is_dir() {
                return Err(Error::runtime(format!(
                    "target '{}' is not a directory",
                    dir.display()
                )));
            }
            targets
                .iter()
                .map(|t| {
                    let target = PathBuf::from(t);
                    let link = in_dir(&target, dir)?;
                    Ok((target, link))
                })
                .collect()
        }
    }
}

fn link(target: &Path, link: &Path, args: &LnArgs) -> kit::Result<()> {
    if args.force && fs::symlink_metadata(link).is_ok() {
        fsops::remove(link, false)?;
    }
    let result = if args.symbolic {
        std::os::unix::fs::symlink(target, link)
    } else {
        fs::hard_link(target, link)
    };
    result.map_err(|e| {
        Error::io(
            format!("failed to create link '{}'", link.display()),
            &e,
        )
    })
}

pub fn run(args: LnArgs) -> CmdResult {
    let mut out = io::stdout();
    let mut status = 0;
    for (target, dest) in plan(&args.paths, args.no_dereference)? {
        match link(&target, &dest, &args) {
            Ok(()) if args.verbose => {
                let arrow = if args.symbolic { "->" } else { "=>" };
                writeln!(out, "'{}' {} '{}'", dest.display(), arrow, target.display())?;
            }
            Ok(()) => {}
            Err(err) => {
                output::diagnostic("ln", &err.message);
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

    fn args(symbolic: bool, force: bool) -> LnArgs {
        LnArgs {
            symbolic,
            force,
            no_dereference: false,
            verbose: false,
            paths: Vec::new(),
        }
    }

    #[test]
    fn single_operand_links_into_cwd() {
        let pairs = plan(&["/etc/hosts".into()], false).unwrap();
        assert_eq!(pairs[0].1, PathBuf::from("./hosts"));
    }

    #[test]
    fn symlink_and_force_replace() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("t");
        fs::write(&target, "x").unwrap();
        let dest = dir.path().join("l");
        fs::write(&dest, "old").unwrap();

        assert!(link(&target, &dest, &args(true, false)).is_err());
        link(&target, &dest, &args(true, true)).unwrap();
        assert_eq!(fs::read_link(&dest).unwrap(), target);
    }

    #[test]
    fn hard_link_shares_content() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("t");
        fs::write(&target, "x").unwrap();
        let dest = dir.path().join("h");
        link(&target, &dest, &args(false, false)).unwrap();
        assert_eq!(fs::read_to_string(dest).unwrap(), "x");
    }

    #[test]
    fn many_targets_need_directory() {
        assert!(plan(&["a".into(), "b".into(), "/nonexistent/kit".into()], false).is_err());
    }
}
