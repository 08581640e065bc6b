use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;

use kit::{fsops, io, output, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Move or rename files")]
pub struct MvArgs {
    /// Overwrite without asking
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Do not overwrite an existing file
    #[arg(short = 'n', long = "no-clobber")]
    pub no_clobber: bool,

    /// Explain what is being done
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[arg(value_name = "SOURCE... DEST")]
    pub paths: Vec<String>,
}

pub fn plan(paths: &[String]) -> kit::Result<Vec<(PathBuf, PathBuf)>> {
    let (dest, sources) = match paths.split_last() {
        None => return Err(Error::missing_operand(None)),
        Some((only, [])) => return Err(Error::missing_operand(Some(only.as_str()))),
        Some((dest, sources)) => (Path::new(dest), sources),
    };
    if sources.len() > 1 && !dest.is_dir() {
        return Err(Error::runtime(format!(
            "target '{}' is not a directory",
            dest.display()
        )));
    }
    Ok(sources
        .iter()
        .map(|src| {
            let src = PathBuf::from(src);
            let target = fsops::destination(&src, dest);
            (src, target)
        })
        .collect())
}

pub fn run(args: MvArgs) -> CmdResult {
    let mut out = io::stdout();
    let mut status = 0;
    for (src, dst) in plan(&args.paths)? {
        if args.no_clobber && !args.force && dst.exists() {
            continue;
        }
        if src == dst {
            output::diagnostic(
                "mv",
                format!("'{}' and '{}' are the same file", src.display(), dst.display()),
            );
            status = 1;
            continue;
        }
        match fsops::rename(&src, &dst) {
            Ok(()) if args.verbose => {
                writeln!(out, "renamed '{}' -> '{}'", src.display(), dst.display())?
            }
            Ok(()) => {}
            Err(err) => {
                output::diagnostic("mv", &err.message);
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
    use std::fs;
    use tempfile::TempDir;

    fn s(p: &Path) -> String {
        p.display().to_string()
    }

    #[test]
    fn moves_into_existing_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f");
        let sub = dir.path().join("sub");
        fs::write(&file, "x").unwrap();
        fs::create_dir(&sub).unwrap();

        let pairs = plan(&[s(&file), s(&sub)]).unwrap();
        assert_eq!(pairs[0].1, sub.join("f"));
        fsops::rename(&pairs[0].0, &pairs[0].1).unwrap();
        assert!(sub.join("f").exists());
        assert!(!file.exists());
    }

    #[test]
    fn needs_two_operands() {
        assert!(plan(&["a".into()]).is_err());
    }
}
