use std::cmp::Ordering;
use std::io::Write;
use std::path::Path;

use clap::{Parser, ValueEnum};

use kit::walk::{self, Entry, WalkOptions};
use kit::{glob, io, output, parser, Error};

use crate::commands::CmdResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    #[value(name = "f")]
    File,
    #[value(name = "d")]
    Dir,
    #[value(name = "l")]
    Link,
}

#[derive(Parser, Debug)]
#[command(about = "Search for files in a directory hierarchy")]
pub struct FindArgs {
    /// Base name matches GLOB
    #[arg(long = "name", value_name = "GLOB")]
    pub name: Option<String>,

    /// Like -name, ignoring case
    #[arg(long = "iname", value_name = "GLOB")]
    pub iname: Option<String>,

    /// Whole path matches GLOB
    #[arg(long = "path", value_name = "GLOB")]
    pub path: Option<String>,

    /// Entry type: f, d or l
    #[arg(long = "type", value_enum)]
    pub kind: Option<Kind>,

    /// Size is N bytes (+N more, -N less; c, k, M, G suffixes)
    #[arg(long = "size", value_name = "N", allow_hyphen_values = true)]
    pub size: Option<String>,

    /// Descend at most N levels
    #[arg(long = "maxdepth", value_name = "N")]
    pub max_depth: Option<usize>,

    /// Ignore entries above depth N
    #[arg(long = "mindepth", value_name = "N")]
    pub min_depth: Option<usize>,

    /// Empty files and directories only
    #[arg(long = "empty")]
    pub empty: bool,

    /// Separate results with NUL
    #[arg(long = "print0")]
    pub print0: bool,

    #[arg(value_name = "PATH")]
    pub roots: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeTest {
    pub ordering: Ordering,
    pub bytes: u64,
}

impl SizeTest {
    pub fn parse(spec: &str) -> kit::Result<Self> {
        let (ordering, body) = match spec.as_bytes().first() {
            Some(b'+') => (Ordering::Greater, &spec[1..]),
            Some(b'-') => (Ordering::Less, &spec[1..]),
            _ => (Ordering::Equal, spec),
        };
        let bytes = match body.strip_suffix('c') {
            Some(n) => parser::parse_uint(n)?,
            None => parser::parse_size(&body.replace('k', "K"))?,
        };
        Ok(SizeTest { ordering, bytes })
    }

    pub fn matches(&self, size: u64) -> bool {
        size.cmp(&self.bytes) == self.ordering
    }
}

pub struct Filter {
    name: Option<String>,
    iname: Option<String>,
    path: Option<String>,
    kind: Option<Kind>,
    size: Option<SizeTest>,
    min_depth: usize,
    empty: bool,
}

impl Filter {
    pub fn from_args(args: &FindArgs) -> kit::Result<Self> {
        Ok(Filter {
            name: args.name.clone(),
            iname: args.iname.as_ref().map(|p| p.to_lowercase()),
            path: args.path.clone(),
            kind: args.kind,
            size: args.size.as_deref().map(SizeTest::parse).transpose()?,
            min_depth: args.min_depth.unwrap_or(0),
            empty: args.empty,
        })
    }

    pub fn accepts(&self, entry: &Entry) -> bool {
        if entry.depth < self.min_depth {
            return false;
        }
        let base = entry.file_name();
        if let Some(pattern) = &self.name {
            if !glob::matches(pattern, &base) {
                return false;
            }
        }
        if let Some(pattern) = &self.iname {
            if !glob::matches(pattern, &base.to_lowercase()) {
                return false;
            }
        }
        if let Some(pattern) = &self.path {
            if !glob_match::glob_match(pattern, &entry.path.display().to_string()) {
                return false;
            }
        }
        let kind_ok = match self.kind {
            Some(Kind::File) => entry.is_file(),
            Some(Kind::Dir) => entry.is_dir(),
            Some(Kind::Link) => entry.is_symlink(),
            None => true,
        };
        if !kind_ok {
            return false;
        }
        if let Some(test) = &self.size {
            if entry.is_dir() || !test.matches(entry.metadata.len()) {
                return false;
            }
        }
        if self.empty {
            let empty = if entry.is_dir() {
                std::fs::read_dir(&entry.path)
                    .map(|mut d| d.next().is_none())
                    .unwrap_or(false)
            } else {
                entry.is_file() && entry.metadata.len() == 0
            };
            if !empty {
                return false;
            }
        }
        true
    }
}

pub fn run(args: FindArgs) -> CmdResult {
    let filter = Filter::from_args(&args)?;
    let roots = if args.roots.is_empty() {
        vec![".".to_string()]
    } else {
        args.roots.clone()
    };
    let options = WalkOptions {
        max_depth: args.max_depth,
        ..Default::default()
    };
    let terminator = if args.print0 { "\0" } else { "\n" };

    let mut out = io::stdout();
    let mut status = 0;
    for root in &roots {
        let mut found = Vec::new();
        let mut errors: Vec<Error> = Vec::new();
        walk::walk(
            Path::new(root),
            options,
            &mut |entry: &Entry| {
                if filter.accepts(entry) {
                    found.push(entry.path.display().to_string());
                }
            },
            &mut |err| errors.push(err),
        );
        for path in found {
            write!(out, "{}{}", path, terminator)?;
        }
        for err in errors {
            output::diagnostic("find", &err.message);
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

    fn args(root: &Path) -> FindArgs {
        FindArgs {
            name: None,
            iname: None,
            path: None,
            kind: None,
            size: None,
            max_depth: None,
            min_depth: None,
            empty: false,
            print0: false,
            roots: vec![root.display().to_string()],
        }
    }

    fn search(args: &FindArgs) -> Vec<String> {
        let filter = Filter::from_args(args).unwrap();
        let root = Path::new(&args.roots[0]);
        let options = WalkOptions {
            max_depth: args.max_depth,
            ..Default::default()
        };
        walk::collect(root, options)
            .into_iter()
            .filter(|e| filter.accepts(e))
            .map(|e| e.path.strip_prefix(root).unwrap().display().to_string())
            .collect()
    }

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/deep")).unwrap();
        fs::write(dir.path().join("src/main.rs"), vec![b'x'; 2048]).unwrap();
        fs::write(dir.path().join("src/deep/Lib.RS"), "").unwrap();
        fs::write(dir.path().join("README"), "hello").unwrap();
        dir
    }

    #[test]
    fn name_matches_basename() {
        let dir = tree();
        let mut a = args(dir.path());
        a.name = Some("*.rs".into());
        assert_eq!(search(&a), vec!["src/main.rs"]);
        a.name = None;
        a.iname = Some("*.rs".into());
        assert_eq!(search(&a), vec!["src/deep/Lib.RS", "src/main.rs"]);
    }

    #[test]
    fn type_and_depth() {
        let dir = tree();
        let mut a = args(dir.path());
        a.kind = Some(Kind::Dir);
        a.min_depth = Some(1);
        assert_eq!(search(&a), vec!["src", "src/deep"]);
        a.max_depth = Some(1);
        assert_eq!(search(&a), vec!["src"]);
    }

    #[test]
    fn size_comparisons() {
        assert!(SizeTest::parse("+1k").unwrap().matches(2048));
        assert!(SizeTest::parse("-10c").unwrap().matches(5));
        assert!(SizeTest::parse("2K").unwrap().matches(2048));
        let dir = tree();
        let mut a = args(dir.path());
        a.size = Some("+1k".into());
        assert_eq!(search(&a), vec!["src/main.rs"]);
    }

    #[test]
    fn empty_entries() {
        let dir = tree();
        let mut a = args(dir.path());
        a.empty = true;
        assert_eq!(search(&a), vec!["src/deep/Lib.RS"]);
    }
}
