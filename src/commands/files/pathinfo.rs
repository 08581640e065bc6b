use std::io::Write;
use std::path::{Component, Path, PathBuf};

use clap::{Parser, ValueEnum};

use kit::{io, Error};

use crate::commands::CmdResult;

use super::basename::base_name;
use super::dirname::dir_name;

#[derive(Parser, Debug)]
#[command(about = "Decompose a path into its parts")]
pub struct PathinfoArgs {
    pub path: String,

    /// Print only this part
    #[arg(value_enum)]
    pub field: Option<Field>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Field {
    Dir,
    Base,
    Ext,
    Stem,
    Abs,
    Clean,
}

/// Lexically normalise a path: collapse separators, drop `.`, fold `..`
/// into its parent where one exists. Empty results become `.`.
pub fn clean(path: &str) -> String {
    let mut parts: Vec<Component> = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return ".".to_string();
    }
    parts.iter().collect::<PathBuf>().display().to_string()
}

/// Extension including its dot, as in `.gz`; dotfiles have none.
pub fn extension(path: &str) -> &str {
    let base = base_name(path);
    match base.rfind('.') {
        Some(0) | None => "",
        Some(i) => &base[i..],
    }
}

pub fn stem(path: &str) -> &str {
    let base = base_name(path);
    &base[..base.len() - extension(path).len()]
}

pub fn absolute(path: &str) -> kit::Result<String> {
    if Path::new(path).is_absolute() {
        return Ok(clean(path));
    }
    let cwd = std::env::current_dir()
        .map_err(|e| Error::io("current directory", &e))?;
    Ok(clean(&cwd.join(path).display().to_string()))
}

pub fn field(path: &str, field: Field) -> kit::Result<String> {
    Ok(match field {
        Field::Dir => dir_name(path).to_string(),
        Field::Base => base_name(path).to_string(),
        Field::Ext => extension(path).to_string(),
        Field::Stem => stem(path).to_string(),
        Field::Abs => absolute(path)?,
        Field::Clean => clean(path),
    })
}

fn kind(path: &str) -> &'static str {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => "symlink",
        Ok(meta) if meta.is_dir() => "directory",
        Ok(meta) if meta.is_file() => "file",
        Ok(_) => "other",
        Err(_) => "missing",
    }
}

pub fn run(args: PathinfoArgs) -> CmdResult {
    let mut out = io::stdout();
    match args.field {
        Some(f) => writeln!(out, "{}", field(&args.path, f)?)?,
        None => {
            let rows = [
                ("path", args.path.clone()),
                ("dir", field(&args.path, Field::Dir)?),
                ("base", field(&args.path, Field::Base)?),
                ("stem", field(&args.path, Field::Stem)?),
                ("ext", field(&args.path, Field::Ext)?),
                ("abs", field(&args.path, Field::Abs)?),
                ("clean", field(&args.path, Field::Clean)?),
                ("type", kind(&args.path).to_string()),
            ];
            for (label, value) in rows {
                writeln!(out, "{:<6} {}", format!("{}:", label), value)?;
            }
        }
    }
    out.flush()?;
    Ok(0)
}
