use std::io::Write;
use std::net::Ipv4Addr;

use clap::{Parser, ValueEnum};
use ipnet::Ipv4Net;

use kit::{io, Error};

use crate::commands::CmdResult;

/// Largest range `expand` will enumerate.
pub const MAX_EXPAND: u64 = 65_536;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Action {
    Expand,
    Count,
    Check,
}

#[derive(Parser, Debug)]
#[command(about = "Expand, count or test IPv4 ranges")]
pub struct IprangeArgs {
    #[arg(value_enum)]
    pub action: Action,

    /// CIDR (10.0.0.0/24), START-END, or START END; `check` takes the address last
    #[arg(required = true)]
    pub operands: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: u32,
    pub end: u32,
}

fn addr(text: &str) -> kit::Result<u32> {
    text.trim()
        .parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| Error::invalid_value("IPv4 address", text))
}

impl Range {
    pub fn parse(operands: &[String]) -> kit::Result<Self> {
        let (start, end) = match operands {
            [one] if one.contains('/') => {
                let net: Ipv4Net = one
                    .parse()
                    .map_err(|_| Error::invalid_value("CIDR", one))?;
                (u32::from(net.network()), u32::from(net.broadcast()))
            }
            [one] => match one.split_once('-') {
                Some((a, b)) => (addr(a)?, addr(b)?),
                None => {
                    let ip = addr(one)?;
                    (ip, ip)
                }
            },
            [a, b] => (addr(a)?, addr(b)?),
            _ => return Err(Error::extra_operand(&operands[2])),
        };
        if start > end {
            return Err(Error::invalid_argument(
                "range",
                format!("{} > {}", Ipv4Addr::from(start), Ipv4Addr::from(end)),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn len(&self) -> u64 {
        u64::from(self.end - self.start) + 1
    }

    pub fn contains(&self, ip: u32) -> bool {
        (self.start..=self.end).contains(&ip)
    }

    pub fn addresses(&self) -> kit::Result<impl Iterator<Item = Ipv4Addr>> {
        if self.len() > MAX_EXPAND {
            return Err(Error::invalid_argument(
                "range",
                format!("{} addresses exceeds the limit of {}", self.len(), MAX_EXPAND),
            ));
        }
        Ok((self.start..=self.end).map(Ipv4Addr::from))
    }
}

pub fn run(args: IprangeArgs) -> CmdResult {
    let mut out = io::stdout();
    match args.action {
        Action::Expand => {
            let range = Range::parse(&args.operands)?;
            io::write_lines(&mut out, range.addresses()?.map(|ip| ip.to_string()))?;
        }
        Action::Count => {
            let range = Range::parse(&args.operands)?;
            writeln!(out, "{}", range.len())?;
            out.flush()?;
        }
        Action::Check => {
            let (ip, spec) = args
                .operands
                .split_last()
                .filter(|(_, rest)| !rest.is_empty())
                .ok_or_else(|| Error::missing_operand(Some(args.operands[0].as_str())))?;
            let inside = Range::parse(spec)?.contains(addr(ip)?);
            writeln!(out, "{}", if inside { "yes" } else { "no" })?;
            out.flush()?;
            return Ok(if inside { 0 } else { 1 });
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cidr_covers_network_to_broadcast() {
        let range = Range::parse(&ops(&["10.0.0.0/30"])).unwrap();
        let all: Vec<String> = range.addresses().unwrap().map(|ip| ip.to_string()).collect();
        assert_eq!(all, vec!["10.0.0.0", "10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    }

    #[test]
    fn endpoints_in_either_form() {
        let dash = Range::parse(&ops(&["192.168.0.250-192.168.1.5"])).unwrap();
        let pair = Range::parse(&ops(&["192.168.0.250", "192.168.1.5"])).unwrap();
        assert_eq!(dash, pair);
        assert_eq!(dash.len(), 12);
    }

    #[test]
    fn reversed_range_is_rejected() {
        assert!(Range::parse(&ops(&["10.0.0.9", "10.0.0.1"])).is_err());
    }

    #[test]
    fn large_ranges_refuse_to_expand() {
        let range = Range::parse(&ops(&["10.0.0.0/16"])).unwrap();
        assert_eq!(range.len(), 65_536);
        assert!(range.addresses().is_ok());
        let range = Range::parse(&ops(&["10.0.0.0/15"])).unwrap();
        assert!(range.addresses().is_err());
    }

    #[test]
    fn membership() {
        let range = Range::parse(&ops(&["10.1.0.0/24"])).unwrap();
        assert!(range.contains(addr("10.1.0.77").unwrap()));
        assert!(!range.contains(addr("10.1.1.0").unwrap()));
    }
}
