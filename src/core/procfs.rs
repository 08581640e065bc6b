//! Readers for the Linux `/proc` filesystem: processes, open descriptors,
//! memory and uptime.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const PROC: &str = "/proc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub pid: i32,
    pub ppid: i32,
    pub state: char,
    pub comm: String,
    pub cmdline: Vec<String>,
    pub uid: u32,
    pub tty_nr: i32,
    pub utime: u64,
    pub stime: u64,
    pub rss_pages: i64,
}

impl Process {
    /// Command line for display; kernel threads show `[comm]`.
    pub fn command(&self) -> String {
        if self.cmdline.is_empty() {
            format!("[{}]", self.comm)
        } else {
            self.cmdline.join(" ")
        }
    }
}

/// Parse `/proc/<pid>/stat`. `comm` may contain spaces and parentheses,
/// so fields are read after the last `)`. `cmdline` and `uid` come from
/// other files and are left empty.
pub fn parse_stat(text: &str) -> Option<Process> {
    let open = text.find('(')?;
    let close = text.rfind(')')?;
    let pid = text[..open].trim().parse().ok()?;
    let comm = text[open + 1..close].to_string();
    let rest: Vec<&str> = text[close + 1..].split_whitespace().collect();
    // rest[0] is field 3 (state)
    let state = rest.first()?.chars().next()?;
    let ppid = rest.get(1)?.parse().ok()?;
    let tty_nr = rest.get(4)?.parse().ok()?;
    let utime = rest.get(11)?.parse().ok()?;
    let stime = rest.get(12)?.parse().ok()?;
    let rss_pages = rest.get(21)?.parse().ok()?;
    Some(Process {
        pid,
        ppid,
        state,
        comm,
        cmdline: Vec::new(),
        uid: 0,
        tty_nr,
        utime,
        stime,
        rss_pages,
    })
}

fn status_uid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|l| l.strip_prefix("Uid:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|uid| uid.parse().ok())
}

pub fn read_process(root: &Path, pid: i32) -> Option<Process> {
    let dir = root.join(pid.to_string());
    let stat = fs::read_to_string(dir.join("stat")).ok()?;
    let mut process = parse_stat(&stat)?;
    process.cmdline = fs::read(dir.join("cmdline"))
        .map(|raw| {
            raw.split(|&b| b == 0)
                .filter(|s| !s.is_empty())
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .collect()
        })
        .unwrap_or_default();
    process.uid = fs::read_to_string(dir.join("status"))
        .ok()
        .and_then(|s| status_uid(&s))
        .unwrap_or(0);
    Some(process)
}

/// Numeric entries of `/proc`, ascending.
pub fn pids(root: &Path) -> Result<Vec<i32>> {
    let entries = fs::read_dir(root).map_err(|e| Error::io(root.display().to_string(), &e))?;
    let mut pids: Vec<i32> = entries
        .flatten()
        .filter_map(|e| e.file_name().to_str().and_then(|n| n.parse().ok()))
        .collect();
    pids.sort_unstable();
    Ok(pids)
}

/// Every process that could be read; processes that exit mid-scan are
/// skipped.
pub fn processes() -> Result<Vec<Process>> {
    let root = Path::new(PROC);
    Ok(pids(root)?
        .into_iter()
        .filter_map(|pid| read_process(root, pid))
        .collect())
}

/// Classification of an open descriptor target, as `lsof` prints it.
pub fn fd_kind(target: &str) -> &'static str {
    if target.starts_with("pipe:") {
        "PIPE"
    } else if target.starts_with("socket:") {
        "SOCK"
    } else if target.starts_with("anon_inode:") {
        "a_inode"
    } else if target.starts_with("/dev/") {
        "CHR"
    } else {
        "REG"
    }
}

/// `(fd, target)` for every readable descriptor of `pid`.
pub fn open_files(pid: i32) -> Vec<(String, PathBuf)> {
    let dir = Path::new(PROC).join(pid.to_string()).join("fd");
    let Ok(entries) = fs::read_dir(&dir) else {
        return Vec::new();
    };
    let mut fds: Vec<(String, PathBuf)> = entries
        .flatten()
        .filter_map(|e| {
            let target = fs::read_link(e.path()).ok()?;
            Some((e.file_name().to_string_lossy().into_owned(), target))
        })
        .collect();
    fds.sort_by_key(|(fd, _)| fd.parse::<u64>().unwrap_or(u64::MAX));
    fds
}

/// `/proc/meminfo` values in KiB, in file order.
pub fn parse_meminfo(text: &str) -> Vec<(String, u64)> {
    text.lines()
        .filter_map(|line| {
            let (key, rest) = line.split_once(':')?;
            let value = rest.split_whitespace().next()?.parse().ok()?;
            Some((key.trim().to_string(), value))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Memory {
    pub total: u64,
    pub free: u64,
    pub available: u64,
    pub buffers: u64,
    pub cached: u64,
    pub shared: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

impl Memory {
    pub fn from_meminfo(text: &str) -> Self {
        let mut mem = Memory::default();
        for (key, kib) in parse_meminfo(text) {
            let bytes = kib * 1024;
            match key.as_str() {
                "MemTotal" => mem.total = bytes,
                "MemFree" => mem.free = bytes,
                "MemAvailable" => mem.available = bytes,
                "Buffers" => mem.buffers = bytes,
                "Cached" => mem.cached = bytes,
                "Shmem" => mem.shared = bytes,
                "SwapTotal" => mem.swap_total = bytes,
                "SwapFree" => mem.swap_free = bytes,
                _ => {}
            }
        }
        mem
    }

    pub fn used(&self) -> u64 {
        self.total
            .saturating_sub(self.free)
            .saturating_sub(self.buffers)
            .saturating_sub(self.cached)
    }

    pub fn swap_used(&self) -> u64 {
        self.swap_total.saturating_sub(self.swap_free)
    }
}

pub fn memory() -> Result<Memory> {
    let path = Path::new(PROC).join("meminfo");
    let text = fs::read_to_string(&path).map_err(|e| Error::io(path.display().to_string(), &e))?;
    Ok(Memory::from_meminfo(&text))
}

/// Seconds since boot from `/proc/uptime`.
pub fn uptime_seconds() -> Result<f64> {
    let path = Path::new(PROC).join("uptime");
    let text = fs::read_to_string(&path).map_err(|e| Error::io(path.display().to_string(), &e))?;
    text.split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::invalid_value("uptime", text.trim()))
}

/// The three load averages from `/proc/loadavg`.
pub fn load_average() -> Option<[f64; 3]> {
    let text = fs::read_to_string(Path::new(PROC).join("loadavg")).ok()?;
    let mut it = text.split_whitespace().map(|s| s.parse::<f64>().ok());
    Some([it.next()??, it.next()??, it.next()??])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
}

/// Decode the octal escapes (`\040`) `/proc/mounts` uses for spaces.
fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let octal = bytes.get(i + 1..i + 4).filter(|d| {
            bytes[i] == b'\\' && d.iter().all(|b| (b'0'..=b'7').contains(b))
        });
        match octal.and_then(|d| u8::from_str_radix(std::str::from_utf8(d).ok()?, 8).ok()) {
            Some(value) => {
                out.push(value);
                i += 4;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// `/proc/mounts` entries in file order.
pub fn parse_mounts(text: &str) -> Vec<Mount> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            Some(Mount {
                device: unescape_mount_field(fields.next()?),
                mount_point: unescape_mount_field(fields.next()?),
                fs_type: fields.next()?.to_string(),
            })
        })
        .collect()
}

pub fn mounts() -> Result<Vec<Mount>> {
    let path = Path::new(PROC).join("mounts");
    let text = fs::read_to_string(&path).map_err(|e| Error::io(path.display().to_string(), &e))?;
    Ok(parse_mounts(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stat_handles_parenthesised_comm() {
        let line = "1234 (my (odd) proc) S 1 1234 1234 34816 1234 4194304 100 0 0 0 7 3 0 0 20 0 1 0 100 1000000 250 18446744073709551615";
        let p = parse_stat(line).unwrap();
        assert_eq!(p.pid, 1234);
        assert_eq!(p.comm, "my (odd) proc");
        assert_eq!(p.state, 'S');
        assert_eq!(p.ppid, 1);
        assert_eq!(p.tty_nr, 34816);
        assert_eq!((p.utime, p.stime), (7, 3));
        assert_eq!(p.rss_pages, 250);
    }

    #[test]
    fn fd_kinds() {
        assert_eq!(fd_kind("pipe:[1234]"), "PIPE");
        assert_eq!(fd_kind("socket:[99]"), "SOCK");
        assert_eq!(fd_kind("/dev/pts/0"), "CHR");
        assert_eq!(fd_kind("/home/u/file.txt"), "REG");
    }

    #[test]
    fn meminfo_to_bytes() {
        let text = "MemTotal:       16000000 kB\nMemFree:         2000000 kB\nMemAvailable:    8000000 kB\nBuffers:          500000 kB\nCached:          3000000 kB\nSwapTotal:       1000000 kB\nSwapFree:         400000 kB\n";
        let mem = Memory::from_meminfo(text);
        assert_eq!(mem.total, 16_000_000 * 1024);
        assert_eq!(mem.used(), (16_000_000 - 2_000_000 - 500_000 - 3_000_000) * 1024);
        assert_eq!(mem.swap_used(), 600_000 * 1024);
    }

    #[test]
    fn current_process_is_listed() {
        let me = std::process::id() as i32;
        let proc = read_process(Path::new(PROC), me).unwrap();
        assert_eq!(proc.pid, me);
        assert!(!proc.cmdline.is_empty());
    }

    #[test]
    fn own_descriptors_are_visible() {
        let fds = open_files(std::process::id() as i32);
        assert!(!fds.is_empty());
    }

    #[test]
    fn mounts_decode_escaped_spaces() {
        let text = "/dev/sda1 / ext4 rw 0 0\n/dev/sdb1 /mnt/my\\040disk vfat rw 0 0\n";
        let mounts = parse_mounts(text);
        assert_eq!(mounts.len(), 2);
        assert_eq!(mounts[0].fs_type, "ext4");
        assert_eq!(mounts[1].mount_point, "/mnt/my disk");
    }
}
