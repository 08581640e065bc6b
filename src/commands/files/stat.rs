use std::fs::{self, Metadata};
use std::io::Write;
use std::os::unix::fs::MetadataExt;

use chrono::{Local, TimeZone};
use clap::Parser;

use kit::{io, modes, output, users, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Display file status")]
pub struct StatArgs {
    /// Follow symbolic links
    #[arg(short = 'L', long = "dereference")]
    pub dereference: bool,

    #[arg(required = true)]
    pub paths: Vec<String>,
}

fn timestamp(secs: i64, nanos: i64) -> String {
    match Local.timestamp_opt(secs, nanos as u32).single() {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S%.9f %z").to_string(),
        None => "-".to_string(),
    }
}

/// The labelled report for one path.
pub fn describe(name: &str, meta: &Metadata, link_target: Option<String>) -> Vec<String> {
    let mode = meta.mode();
    let file = match link_target {
        Some(target) => format!("  File: {} -> {}", name, target),
        None => format!("  File: {}", name),
    };
    let dev = meta.dev();
    vec![
        file,
        format!(
            "  Size: {:<15} Blocks: {:<10} IO Block: {:<6} {}",
            meta.size(),
            meta.blocks(),
            meta.blksize(),
            modes::type_name(mode)
        ),
        format!(
            "Device: {:x}h/{}d\tInode: {:<11} Links: {}",
            dev,
            dev,
            meta.ino(),
            meta.nlink()
        ),
        format!(
            "Access: ({:04o}/{})  Uid: ({:>5}/{:>8})   Gid: ({:>5}/{:>8})",
            mode & 0o7777,
            modes::symbolic(mode),
            meta.uid(),
            users::user_name(meta.uid()),
            meta.gid(),
            users::group_name(meta.gid())
        ),
        format!("Access: {}", timestamp(meta.atime(), meta.atime_nsec())),
        format!("Modify: {}", timestamp(meta.mtime(), meta.mtime_nsec())),
        format!("Change: {}", timestamp(meta.ctime(), meta.ctime_nsec())),
    ]
}

fn stat(path: &str, dereference: bool) -> kit::Result<Vec<String>> {
    let fail = |e: std::io::Error| Error::io(format!("cannot stat '{}'", path), &e);
    let meta = if dereference {
        fs::metadata(path)
    } else {
        fs::symlink_metadata(path)
    }
    .map_err(fail)?;
    let target = if meta.file_type().is_symlink() {
        let target = fs::read_link(path).map_err(fail)?;
        Some(target.display().to_string())
    } else {
        None
    };
    Ok(describe(path, &meta, target))
}

pub fn run(args: StatArgs) -> CmdResult {
    let mut out = io::stdout();
    let mut status = 0;
    for path in &args.paths {
        match stat(path, args.dereference) {
            Ok(lines) => io::write_lines(&mut out, lines)?,
            Err(err) => {
                output::diagnostic("stat", &err.message);
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
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[test]
    fn reports_size_mode_and_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f");
        fs::write(&path, "hello").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        let lines = stat(&path.display().to_string(), false).unwrap();
        assert!(lines[0].ends_with("/f"));
        assert!(lines[1].starts_with("  Size: 5 "));
        assert!(lines[1].ends_with("regular file"));
        assert!(lines[3].starts_with("Access: (0640/-rw-r-----)"));
        assert!(lines[5].starts_with("Modify: "));
    }

    #[test]
    fn links_show_target_unless_followed() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("t");
        fs::write(&target, "").unwrap();
        let link = dir.path().join("l");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let text = link.display().to_string();
        let lines = stat(&text, false).unwrap();
        assert!(lines[0].contains(" -> "));
        assert!(lines[1].ends_with("symbolic link"));
        let followed = stat(&text, true).unwrap();
        assert!(followed[1].ends_with("regular file"));
    }

    #[test]
    fn missing_path_is_error() {
        let err = stat("/nonexistent/kit", false).unwrap_err();
        assert!(err.message.contains("cannot stat"));
    }
}
