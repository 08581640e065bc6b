use std::io::Write;
use std::path::Path;

use clap::Parser;

use kit::{io, output, walk};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "List a directory tree")]
pub struct TreeArgs {
    /// Include hidden entries
    #[arg(short = 'a')]
    pub all: bool,

    /// Descend at most N levels
    #[arg(short = 'L', value_name = "N")]
    pub level: Option<usize>,

    /// List directories only
    #[arg(short = 'd')]
    pub dirs_only: bool,

    #[arg(default_value = ".")]
    pub dirs: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub dirs: usize,
    pub files: usize,
}

/// Render the children of `dir` below `prefix`, one line per entry.
pub fn render(
    dir: &Path,
    prefix: &str,
    depth: usize,
    args: &TreeArgs,
    lines: &mut Vec<String>,
    counts: &mut Counts,
) {
    if args.level.is_some_and(|max| depth >= max) {
        return;
    }
    let children = match walk::sorted_children(dir) {
        Ok(children) => children,
        Err(err) => {
            output::diagnostic("tree", &err.message);
            return;
        }
    };
    let children: Vec<_> = children
        .into_iter()
        .filter(|p| args.all || !walk::is_hidden(p))
        .filter(|p| !args.dirs_only || p.is_dir())
        .collect();

    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let name = child
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let meta = child.symlink_metadata();
        let is_link = meta.as_ref().map(|m| m.file_type().is_symlink()).unwrap_or(false);
        let label = match std::fs::read_link(child) {
            Ok(target) if is_link => format!("{} -> {}", name, target.display()),
            _ => name,
        };
        lines.push(format!("{}{}{}", prefix, if last { "└── " } else { "├── " }, label));

        if !is_link && child.is_dir() {
            counts.dirs += 1;
            let nested = format!("{}{}", prefix, if last { "    " } else { "│   " });
            render(child, &nested, depth + 1, args, lines, counts);
        } else {
            counts.files += 1;
        }
    }
}

pub fn run(args: TreeArgs) -> CmdResult {
    let mut out = io::stdout();
    let mut counts = Counts::default();
    for dir in &args.dirs {
        let mut lines = vec![dir.clone()];
        render(Path::new(dir), "", 0, &args, &mut lines, &mut counts);
        io::write_lines(&mut out, lines)?;
    }
    writeln!(out)?;
    if args.dirs_only {
        writeln!(out, "{} directories", counts.dirs)?;
    } else {
        writeln!(out, "{} directories, {} files", counts.dirs, counts.files)?;
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(all: bool, level: Option<usize>) -> TreeArgs {
        TreeArgs {
            all,
            level,
            dirs_only: false,
            dirs: Vec::new(),
        }
    }

    fn sample() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/bin")).unwrap();
        fs::write(dir.path().join("src/lib.rs"), "").unwrap();
        fs::write(dir.path().join("src/bin/main.rs"), "").unwrap();
        fs::write(dir.path().join("Cargo.toml"), "").unwrap();
        fs::write(dir.path().join(".hidden"), "").unwrap();
        dir
    }

    #[test]
    fn draws_branches() {
        let dir = sample();
        let mut lines = Vec::new();
        let mut counts = Counts::default();
        render(dir.path(), "", 0, &args(false, None), &mut lines, &mut counts);
        assert_eq!(
            lines,
            vec![
                "├── Cargo.toml",
                "└── src",
                "    ├── bin",
                "    │   └── main.rs",
                "    └── lib.rs",
            ]
        );
        assert_eq!(counts, Counts { dirs: 2, files: 3 });
    }

    #[test]
    fn hidden_needs_all() {
        let dir = sample();
        let mut lines = Vec::new();
        let mut counts = Counts::default();
        render(dir.path(), "", 0, &args(true, Some(1)), &mut lines, &mut counts);
        assert_eq!(lines, vec!["├── .hidden", "├── Cargo.toml", "└── src"]);
    }
}
