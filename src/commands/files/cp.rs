use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;

use kit::fsops::{self, CopyOptions};
use kit::{io, output, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Copy files and directories")]
pub struct CpArgs {
    /// Copy directories recursively
    #[arg(short = 'r', short_alias = 'R', long = "recursive")]
    pub recursive: bool,

    /// Remove a destination that cannot be opened and try again
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Preserve mode and timestamps
    #[arg(short = 'p')]
    pub preserve: bool,

    /// Archive: -r -p and copy links as links
    #[arg(short = 'a', long = "archive")]
    pub archive: bool,

    /// Do not overwrite an existing file
    #[arg(short = 'n', long = "no-clobber")]
    pub no_clobber: bool,

    /// Explain what is being done
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[arg(value_name = "SOURCE... DEST")]
    pub paths: Vec<String>,
}

/// Pair every source with its final destination path.
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

pub fn run(args: CpArgs) -> CmdResult {
    let options = CopyOptions {
        recursive: args.recursive || args.archive,
        preserve_times: args.preserve || args.archive,
        force: args.force,
        no_dereference: args.archive,
    };

    let mut out = io::stdout();
    let mut status = 0;
    for (src, dst) in plan(&args.paths)? {
        if args.no_clobber && dst.exists() {
            continue;
        }
        let mut log = Vec::new();
        let result = fsops::copy(&src, &dst, options, &mut |from, to| {
            if args.verbose {
                log.push(format!("'{}' -> '{}'", from.display(), to.display()));
            }
        });
        io::write_lines(&mut out, &log)?;
        if let Err(err) = result {
            output::diagnostic("cp", &err.message);
            status = 1;
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
    fn single_source_to_new_name() {
        let dir = TempDir::new().unwrap();
        let pairs = plan(&[s(&dir.path().join("a")), s(&dir.path().join("b"))]).unwrap();
        assert_eq!(pairs[0].1, dir.path().join("b"));
    }

    #[test]
    fn sources_land_inside_directory() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("d");
        fs::create_dir(&dest).unwrap();
        let pairs = plan(&["x/a".into(), "b".into(), s(&dest)]).unwrap();
        assert_eq!(pairs[0].1, dest.join("a"));
        assert_eq!(pairs[1].1, dest.join("b"));
    }

    #[test]
    fn many_sources_need_directory_target() {
        assert!(plan(&["a".into(), "b".into(), "/nonexistent/kit".into()]).is_err());
        assert!(plan(&["only".into()]).is_err());
        assert!(plan(&[]).is_err());
    }
}
