use std::io::Write;

use clap::Parser;

use kit::netproc::{self, ArpEntry};
use kit::{io, Error};

use crate::commands::CmdResult;

const ARP_TABLE: &str = "/proc/net/arp";

#[derive(Parser, Debug)]
#[command(about = "Show the kernel ARP cache")]
pub struct ArpArgs {
    /// Numeric addresses (always numeric here)
    #[arg(short = 'n', long = "numeric")]
    pub numeric: bool,

    /// BSD-style output
    #[arg(short = 'a', long = "all")]
    pub bsd: bool,

    /// Only show this address
    pub host: Option<String>,
}

fn mac(entry: &ArpEntry) -> &str {
    if entry.is_complete() {
        &entry.mac
    } else {
        "(incomplete)"
    }
}

pub fn bsd_line(entry: &ArpEntry) -> String {
    format!("? ({}) at {} [ether] on {}", entry.ip, mac(entry), entry.device)
}

pub fn table_line(entry: &ArpEntry) -> String {
    let hw = if entry.hw_type == "0x1" { "ether" } else { entry.hw_type.as_str() };
    let flags = if entry.is_complete() { "C" } else { "" };
    format!(
        "{:<24} {:<7} {:<19} {:<6} {}",
        entry.ip,
        if entry.is_complete() { hw } else { "" },
        mac(entry),
        flags,
        entry.device
    )
}

pub fn run(args: ArpArgs) -> CmdResult {
    let table = std::fs::read_to_string(ARP_TABLE).map_err(|e| Error::io(ARP_TABLE, &e))?;
    let entries: Vec<ArpEntry> = netproc::parse_arp(&table)
        .into_iter()
        .filter(|e| args.host.as_deref().map_or(true, |h| e.ip == h))
        .collect();

    if let Some(host) = &args.host {
        if entries.is_empty() {
            kit::output::diagnostic("arp", format!("{} -- no entry", host));
            return Ok(1);
        }
    }

    let mut out = io::stdout();
    if args.bsd {
        io::write_lines(&mut out, entries.iter().map(bsd_line))?;
    } else {
        writeln!(
            out,
            "{:<24} {:<7} {:<19} {:<6} {}",
            "Address", "HWtype", "HWaddress", "Flags", "Iface"
        )?;
        io::write_lines(&mut out, entries.iter().map(table_line))?;
    }
    Ok(0)
}
