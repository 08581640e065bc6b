use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tempfile::Builder;

use kit::{io, Error};

use crate::commands::CmdResult;

const DEFAULT_TEMPLATE: &str = "tmp.XXXXXXXXXX";

#[derive(Parser, Debug)]
#[command(about = "Create a temporary file or directory")]
pub struct MktempArgs {
    /// Create a directory instead of a file
    #[arg(short = 'd', long = "directory")]
    pub directory: bool,

    /// Only print a name; create nothing
    #[arg(short = 'u', long = "dry-run")]
    pub dry_run: bool,

    /// Create inside DIR (default $TMPDIR or /tmp)
    #[arg(short = 'p', long = "tmpdir", value_name = "DIR")]
    pub tmpdir: Option<String>,

    /// Append SUFFIX to the name
    #[arg(long = "suffix", value_name = "SUFFIX")]
    pub suffix: Option<String>,

    pub template: Option<String>,
}

/// Split a template into the fixed prefix and the number of random
/// characters its trailing `X` run asks for.
pub fn split_template(template: &str) -> kit::Result<(&str, usize)> {
    let prefix = template.trim_end_matches('X');
    let random = template.len() - prefix.len();
    if random < 3 {
        return Err(Error::invalid_argument("template", template)
            .with_hint("templates need at least 3 trailing X characters"));
    }
    Ok((prefix, random))
}

fn parent_dir(args: &MktempArgs, template: &str) -> PathBuf {
    match &args.tmpdir {
        Some(dir) => PathBuf::from(dir),
        None if args.template.is_some() && template.contains('/') => PathBuf::new(),
        None => std::env::temp_dir(),
    }
}

pub fn run(args: MktempArgs) -> CmdResult {
    let template = args.template.as_deref().unwrap_or(DEFAULT_TEMPLATE);
    let (prefix, random) = split_template(template)?;
    let dir = parent_dir(&args, template);
    let suffix = args.suffix.as_deref().unwrap_or("");

    let mut builder = Builder::new();
    builder.prefix(prefix).suffix(suffix).rand_bytes(random);

    let failed = |e: std::io::Error| Error::io(format!("failed to create from template '{}'", template), &e);
    let path = if args.directory {
        let created = builder.tempdir_in(&dir).map_err(failed)?;
        if args.dry_run {
            let path = created.path().to_path_buf();
            created.close().map_err(failed)?;
            path
        } else {
            #[allow(deprecated)]
            created.into_path()
        }
    } else {
        let created = builder.tempfile_in(&dir).map_err(failed)?;
        if args.dry_run {
            let path = created.path().to_path_buf();
            created.close().map_err(failed)?;
            path
        } else {
            let (_, path) = created.keep().map_err(|e| failed(e.error))?;
            path
        }
    };

    let mut out = io::stdout();
    writeln!(out, "{}", path.display())?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_counts_trailing_xs() {
        assert_eq!(split_template("tmp.XXXXXX").unwrap(), ("tmp.", 6));
        assert_eq!(split_template("XXX").unwrap(), ("", 3));
    }

    #[test]
    fn short_templates_are_rejected() {
        assert!(split_template("tmp.XX").is_err());
        assert!(split_template("plain").is_err());
    }

    #[test]
    fn explicit_dir_wins() {
        let args = MktempArgs {
            directory: false,
            dry_run: false,
            tmpdir: Some("/var/tmp".into()),
            suffix: None,
            template: None,
        };
        assert_eq!(parent_dir(&args, DEFAULT_TEMPLATE), PathBuf::from("/var/tmp"));
    }
}
