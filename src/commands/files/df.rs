use std::ffi::CString;
use std::io::Write;
use std::path::Path;

use clap::Parser;

use kit::procfs::{self, Mount};
use kit::{humanize, io, output, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Report file system disk space usage", disable_help_flag = true)]
pub struct DfArgs {
    /// Print sizes in powers of 1024 (1.5K, 23M)
    #[arg(short = 'h', long = "human-readable")]
    pub human: bool,

    /// Show the file system type
    #[arg(short = 'T', long = "print-type")]
    pub print_type: bool,

    /// Include pseudo file systems with zero blocks
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub total: u64,
    pub free: u64,
    pub available: u64,
}

impl Usage {
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }

    /// Used share of the space visible to unprivileged users, rounded up.
    pub fn percent(&self) -> Option<u64> {
        let denominator = self.used() + self.available;
        if denominator == 0 {
            return None;
        }
        Some((self.used() * 100).div_ceil(denominator))
    }
}

pub fn statvfs(path: &str) -> kit::Result<Usage> {
    let c_path = CString::new(path).map_err(|_| Error::invalid_argument("path", path))?;
    // SAFETY: statvfs only writes into the zeroed struct we own.
    let mut st: libc::statvfs = unsafe { std::mem::zeroed() };
    if unsafe { libc::statvfs(c_path.as_ptr(), &mut st) } != 0 {
        return Err(Error::last_os(path));
    }
    let unit = if st.f_frsize > 0 {
        st.f_frsize as u64
    } else {
        st.f_bsize as u64
    };
    Ok(Usage {
        total: st.f_blocks as u64 * unit,
        free: st.f_bfree as u64 * unit,
        available: st.f_bavail as u64 * unit,
    })
}

/// The mount that holds `path`: the longest mount point prefix.
pub fn mount_for<'a>(mounts: &'a [Mount], path: &Path) -> Option<&'a Mount> {
    mounts
        .iter()
        .filter(|m| path.starts_with(&m.mount_point))
        .max_by_key(|m| m.mount_point.len())
}

fn size(bytes: u64, human: bool) -> String {
    if human {
        humanize::short_size(bytes)
    } else {
        bytes.div_ceil(1024).to_string()
    }
}

/// Align columns: the last and those in `left` left-justified, the rest
/// right.
pub fn layout(rows: &[Vec<String>], left: &[usize]) -> Vec<String> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| rows.iter().filter_map(|r| r.get(c)).map(|s| s.chars().count()).max().unwrap_or(0))
        .collect();
    rows.iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(c, cell)| {
                    if c + 1 == row.len() {
                        cell.clone()
                    } else if left.contains(&c) {
                        format!("{:<w$}", cell, w = widths[c])
                    } else {
                        format!("{:>w$}", cell, w = widths[c])
                    }
                })
                .collect();
            cells.join(" ")
        })
        .collect()
}

pub fn run(args: DfArgs) -> CmdResult {
    let mounts = procfs::mounts().unwrap_or_default();
    let mut status = 0;

    let selected: Vec<(String, String, String)> = if args.paths.is_empty() {
        mounts
            .iter()
            .map(|m| (m.device.clone(), m.fs_type.clone(), m.mount_point.clone()))
            .collect()
    } else {
        let mut chosen = Vec::new();
        for path in &args.paths {
            match std::fs::canonicalize(path) {
                Ok(real) => match mount_for(&mounts, &real) {
                    Some(m) => chosen.push((m.device.clone(), m.fs_type.clone(), m.mount_point.clone())),
                    None => chosen.push(("-".into(), "-".into(), real.display().to_string())),
                },
                Err(e) => {
                    output::diagnostic("df", Error::io(path, &e).message);
                    status = 1;
                }
            }
        }
        chosen
    };

    let mut header = vec!["Filesystem".to_string()];
    if args.print_type {
        header.push("Type".into());
    }
    if args.human {
        header.extend(["Size", "Used", "Avail"].map(String::from));
    } else {
        header.extend(["1K-blocks", "Used", "Available"].map(String::from));
    }
    header.extend(["Use%", "Mounted on"].map(String::from));

    let mut rows = vec![header];
    for (device, fs_type, mount_point) in selected {
        let usage = match statvfs(&mount_point) {
            Ok(u) => u,
            Err(err) => {
                if !args.paths.is_empty() {
                    output::diagnostic("df", &err.message);
                    status = 1;
                }
                continue;
            }
        };
        if usage.total == 0 && !args.all && args.paths.is_empty() {
            continue;
        }
        let mut row = vec![device];
        if args.print_type {
            row.push(fs_type);
        }
        row.push(size(usage.total, args.human));
        row.push(size(usage.used(), args.human));
        row.push(size(usage.available, args.human));
        row.push(usage.percent().map_or("-".to_string(), |p| format!("{}%", p)));
        row.push(mount_point);
        rows.push(row);
    }

    let mut out = io::stdout();
    let left: &[usize] = if args.print_type { &[0, 1] } else { &[0] };
    io::write_lines(&mut out, layout(&rows, left))?;
    out.flush()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mount(point: &str) -> Mount {
        Mount {
            device: format!("dev{}", point),
            mount_point: point.to_string(),
            fs_type: "ext4".to_string(),
        }
    }

    #[test]
    fn longest_mount_prefix_wins() {
        let mounts = vec![mount("/"), mount("/home"), mount("/home/user/data")];
        let found = mount_for(&mounts, Path::new("/home/user/file")).unwrap();
        assert_eq!(found.mount_point, "/home");
        let root = mount_for(&mounts, Path::new("/homeless")).unwrap();
        assert_eq!(root.mount_point, "/");
    }

    #[test]
    fn percent_rounds_up() {
        let usage = Usage {
            total: 1000,
            free: 299,
            available: 200,
        };
        assert_eq!(usage.used(), 701);
        assert_eq!(usage.percent(), Some(78));
        let empty = Usage {
            total: 0,
            free: 0,
            available: 0,
        };
        assert_eq!(empty.percent(), None);
    }

    #[test]
    fn root_filesystem_has_blocks() {
        assert!(statvfs("/").unwrap().total > 0);
    }

    #[test]
    fn layout_aligns_numbers_right() {
        let rows = vec![
            vec!["Filesystem".to_string(), "Size".to_string(), "Mounted on".to_string()],
            vec!["/dev/a".to_string(), "10".to_string(), "/".to_string()],
        ];
        assert_eq!(layout(&rows, &[0]), vec!["Filesystem Size Mounted on", "/dev/a       10 /"]);
    }
}
