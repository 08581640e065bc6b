use std::io::Write;

use clap::Parser;

use kit::procfs::{self, Memory};
use kit::{humanize, io};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Display memory usage", disable_help_flag = true)]
pub struct FreeArgs {
    /// Human-readable sizes
    #[arg(short = 'h', long = "human")]
    pub human: bool,

    /// Show sizes in MiB
    #[arg(short = 'm', long = "mebi", conflicts_with_all = ["human", "gibi"])]
    pub mebi: bool,

    /// Show sizes in GiB
    #[arg(short = 'g', long = "gibi", conflicts_with = "human")]
    pub gibi: bool,

    /// Show sizes in bytes
    #[arg(short = 'b', long = "bytes")]
    pub bytes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Bytes,
    Kibi,
    Mebi,
    Gibi,
    Human,
}

impl Unit {
    pub fn from_args(args: &FreeArgs) -> Self {
        if args.human {
            Unit::Human
        } else if args.gibi {
            Unit::Gibi
        } else if args.mebi {
            Unit::Mebi
        } else if args.bytes {
            Unit::Bytes
        } else {
            Unit::Kibi
        }
    }

    pub fn format(self, bytes: u64) -> String {
        match self {
            Unit::Bytes => bytes.to_string(),
            Unit::Kibi => (bytes >> 10).to_string(),
            Unit::Mebi => (bytes >> 20).to_string(),
            Unit::Gibi => (bytes >> 30).to_string(),
            Unit::Human => humanize::short_size(bytes),
        }
    }
}

pub fn report(mem: &Memory, unit: Unit) -> Vec<String> {
    let cell = |bytes: u64| format!("{:>12}", unit.format(bytes));
    vec![
        format!(
            "{:<7}{:>12}{:>12}{:>12}{:>12}{:>12}{:>12}",
            "", "total", "used", "free", "shared", "buff/cache", "available"
        ),
        format!(
            "{:<7}{}{}{}{}{}{}",
            "Mem:",
            cell(mem.total),
            cell(mem.used()),
            cell(mem.free),
            cell(mem.shared),
            cell(mem.buffers + mem.cached),
            cell(mem.available)
        ),
        format!(
            "{:<7}{}{}{}",
            "Swap:",
            cell(mem.swap_total),
            cell(mem.swap_used()),
            cell(mem.swap_free)
        ),
    ]
}

pub fn run(args: FreeArgs) -> CmdResult {
    let mem = procfs::memory()?;
    let mut out = io::stdout();
    io::write_lines(&mut out, report(&mem, Unit::from_args(&args)))?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "MemTotal:       2048 kB\nMemFree:         512 kB\nMemAvailable:   1024 kB\nBuffers:         128 kB\nCached:          256 kB\nShmem:            64 kB\nSwapTotal:      1024 kB\nSwapFree:       1000 kB\n";

    #[test]
    fn kibibyte_report() {
        let mem = Memory::from_meminfo(MEMINFO);
        let lines = report(&mem, Unit::Kibi);
        let mem_cells: Vec<&str> = lines[1].split_whitespace().collect();
        assert_eq!(mem_cells, vec!["Mem:", "2048", "1152", "512", "64", "384", "1024"]);
        let swap: Vec<&str> = lines[2].split_whitespace().collect();
        assert_eq!(swap, vec!["Swap:", "1024", "24", "1000"]);
    }

    #[test]
    fn header_names_columns() {
        let lines = report(&Memory::default(), Unit::Kibi);
        assert!(lines[0].contains("buff/cache"));
    }

    #[test]
    fn units_scale() {
        assert_eq!(Unit::Mebi.format(3 << 20), "3");
        assert_eq!(Unit::Human.format(1536), "1.5K");
    }
}
