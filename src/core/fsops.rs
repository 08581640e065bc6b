//! Filesystem operations shared by `cp`, `mv`, `rm` and `ln`.

use std::fs::{self, File, FileTimes, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Where `src` lands when copied or moved to `dst`: inside `dst` when it
/// is an existing directory, otherwise `dst` itself.
pub fn destination(src: &Path, dst: &Path) -> PathBuf {
    if dst.is_dir() {
        if let Some(name) = src.file_name() {
            return dst.join(name);
        }
    }
    dst.to_path_buf()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOptions {
    pub recursive: bool,
    /// Keep access and modification times.
    pub preserve_times: bool,
    /// Replace destinations that cannot be opened for writing.
    pub force: bool,
    /// Recreate symbolic links instead of copying their targets.
    pub no_dereference: bool,
}

/// Copy `src` to exactly `dst`. `copied` is told about every file,
/// link and directory created.
pub fn copy(
    src: &Path,
    dst: &Path,
    options: CopyOptions,
    copied: &mut dyn FnMut(&Path, &Path),
) -> Result<()> {
    let meta = if options.no_dereference {
        fs::symlink_metadata(src)
    } else {
        fs::metadata(src)
    }
    .map_err(|e| Error::io(display(src), &e))?;

    if meta.file_type().is_symlink() {
        let target = fs::read_link(src).map_err(|e| Error::io(display(src), &e))?;
        if fs::symlink_metadata(dst).is_ok() {
            fs::remove_file(dst).map_err(|e| Error::io(display(dst), &e))?;
        }
        std::os::unix::fs::symlink(&target, dst).map_err(|e| Error::io(display(dst), &e))?;
        copied(src, dst);
        return Ok(());
    }

    if meta.is_dir() {
        if !options.recursive {
            return Err(Error::runtime(format!(
                "-r not specified; omitting directory '{}'",
                display(src)
            )));
        }
        if dst.starts_with(src) && dst != src {
            return Err(Error::runtime(format!(
                "cannot copy a directory, '{}', into itself, '{}'",
                display(src),
                display(dst)
            )));
        }
        if !dst.is_dir() {
            fs::create_dir(dst).map_err(|e| Error::io(display(dst), &e))?;
        }
        copied(src, dst);
        let entries = fs::read_dir(src).map_err(|e| Error::io(display(src), &e))?;
        let mut children: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        children.sort();
        let nested = CopyOptions {
            no_dereference: true,
            ..options
        };
        for child in children {
            if let Some(name) = child.file_name() {
                copy(&child, &dst.join(name), nested, copied)?;
            }
        }
        fs::set_permissions(dst, meta.permissions()).map_err(|e| Error::io(display(dst), &e))?;
    } else {
        copy_file(src, dst, options.force)?;
        copied(src, dst);
    }

    if options.preserve_times {
        set_times(dst, &meta)?;
    }
    Ok(())
}

fn copy_file(src: &Path, dst: &Path, force: bool) -> Result<()> {
    match fs::copy(src, dst) {
        Ok(_) => Ok(()),
        Err(e) if force && e.kind() == io::ErrorKind::PermissionDenied => {
            fs::remove_file(dst).map_err(|e| Error::io(display(dst), &e))?;
            fs::copy(src, dst)
                .map(|_| ())
                .map_err(|e| Error::io(display(dst), &e))
        }
        Err(e) => Err(Error::io(display(dst), &e)),
    }
}

/// Copy access and modification times from `meta` onto `path`.
pub fn set_times(path: &Path, meta: &Metadata) -> Result<()> {
    let mut times = FileTimes::new();
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    File::open(path)
        .and_then(|f| f.set_times(times))
        .map_err(|e| Error::io(display(path), &e))
}

/// Rename `src` to `dst`, copying then deleting across filesystems.
pub fn rename(src: &Path, dst: &Path) -> Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(libc::EXDEV) => {
            tracing::debug!(src = %src.display(), dst = %dst.display(), "cross-device move");
            let options = CopyOptions {
                recursive: true,
                preserve_times: true,
                force: true,
                no_dereference: true,
            };
            copy(src, dst, options, &mut |_, _| {})?;
            remove(src, true)
        }
        Err(e) => Err(Error::io(display(src), &e)),
    }
}

/// Remove a file, link or (with `recursive`) a directory tree.
pub fn remove(path: &Path, recursive: bool) -> Result<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| Error::io(display(path), &e))?;
    let result = if meta.is_dir() {
        if !recursive {
            return Err(Error::runtime(format!(
                "cannot remove '{}': Is a directory",
                display(path)
            )));
        }
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| Error::io(display(path), &e))
}
