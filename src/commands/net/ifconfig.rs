//! `ifconfig`: list network interfaces from `getifaddrs(3)`.

use std::collections::BTreeMap;
use std::ffi::CStr;
use std::io::Write;
use std::net::{Ipv4Addr, Ipv6Addr};

use clap::Parser;

use kit::{io, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Show network interfaces")]
pub struct IfconfigArgs {
    /// Include interfaces that are down
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Only show this interface
    pub interface: Option<String>,
}

const FLAG_NAMES: &[(libc::c_int, &str)] = &[
    (libc::IFF_UP, "UP"),
    (libc::IFF_BROADCAST, "BROADCAST"),
    (libc::IFF_DEBUG, "DEBUG"),
    (libc::IFF_LOOPBACK, "LOOPBACK"),
    (libc::IFF_POINTOPOINT, "POINTOPOINT"),
    (libc::IFF_NOTRAILERS, "NOTRAILERS"),
    (libc::IFF_RUNNING, "RUNNING"),
    (libc::IFF_NOARP, "NOARP"),
    (libc::IFF_PROMISC, "PROMISC"),
    (libc::IFF_ALLMULTI, "ALLMULTI"),
    (libc::IFF_MASTER, "MASTER"),
    (libc::IFF_SLAVE, "SLAVE"),
    (libc::IFF_MULTICAST, "MULTICAST"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    V4 {
        addr: Ipv4Addr,
        netmask: Option<Ipv4Addr>,
        broadcast: Option<Ipv4Addr>,
    },
    V6 {
        addr: Ipv6Addr,
        prefix: u32,
    },
    Ether([u8; 6]),
}

#[derive(Debug, Default)]
pub struct Interface {
    pub flags: u32,
    pub addresses: Vec<Address>,
}

pub fn flag_names(flags: u32) -> Vec<&'static str> {
    FLAG_NAMES
        .iter()
        .filter(|(bit, _)| flags & (*bit as u32) != 0)
        .map(|(_, name)| *name)
        .collect()
}

/// Count of leading one bits in a netmask.
pub fn prefix_len(mask: &[u8]) -> u32 {
    mask.iter().map(|b| b.count_ones()).sum()
}

pub fn mac(bytes: &[u8; 6]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

unsafe fn ipv4(sa: *const libc::sockaddr) -> Option<Ipv4Addr> {
    if sa.is_null() || (*sa).sa_family as i32 != libc::AF_INET {
        return None;
    }
    let sin = &*(sa as *const libc::sockaddr_in);
    Some(Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr)))
}

unsafe fn ipv6(sa: *const libc::sockaddr) -> Option<Ipv6Addr> {
    if sa.is_null() || (*sa).sa_family as i32 != libc::AF_INET6 {
        return None;
    }
    let sin6 = &*(sa as *const libc::sockaddr_in6);
    Some(Ipv6Addr::from(sin6.sin6_addr.s6_addr))
}

/// Interfaces keyed by name.
pub fn interfaces() -> kit::Result<BTreeMap<String, Interface>> {
    let mut head: *mut libc::ifaddrs = std::ptr::null_mut();
    // SAFETY: getifaddrs fills `head` with a list released by freeifaddrs.
    if unsafe { libc::getifaddrs(&mut head) } != 0 {
        return Err(Error::last_os("getifaddrs"));
    }
    let mut map: BTreeMap<String, Interface> = BTreeMap::new();
    let mut cursor = head;
    while !cursor.is_null() {
        // SAFETY: cursor walks the list returned above until NULL.
        let ifa = unsafe { &*cursor };
        cursor = ifa.ifa_next;
        let name = unsafe { CStr::from_ptr(ifa.ifa_name) }
            .to_string_lossy()
            .into_owned();
        let entry = map.entry(name).or_default();
        entry.flags = ifa.ifa_flags;
        if ifa.ifa_addr.is_null() {
            continue;
        }
        let family = unsafe { (*ifa.ifa_addr).sa_family } as i32;
        let address = match family {
            libc::AF_INET => unsafe {
                ipv4(ifa.ifa_addr).map(|addr| Address::V4 {
                    addr,
                    netmask: ipv4(ifa.ifa_netmask),
                    broadcast: if ifa.ifa_flags & libc::IFF_BROADCAST as u32 != 0 {
                        ipv4(ifa.ifa_ifu)
                    } else {
                        None
                    },
                })
            },
            libc::AF_INET6 => unsafe {
                ipv6(ifa.ifa_addr).map(|addr| Address::V6 {
                    addr,
                    prefix: ipv6(ifa.ifa_netmask)
                        .map(|m| prefix_len(&m.octets()))
                        .unwrap_or(128),
                })
            },
            libc::AF_PACKET => {
                let ll = unsafe { &*(ifa.ifa_addr as *const libc::sockaddr_ll) };
                (ll.sll_halen == 6).then(|| {
                    let mut bytes = [0u8; 6];
                    bytes.copy_from_slice(&ll.sll_addr[..6]);
                    Address::Ether(bytes)
                })
            }
            _ => None,
        };
        entry.addresses.extend(address);
    }
    // SAFETY: head came from getifaddrs and is released once.
    unsafe { libc::freeifaddrs(head) };
    Ok(map)
}

fn mtu(name: &str) -> Option<u32> {
    std::fs::read_to_string(format!("/sys/class/net/{}/mtu", name))
        .ok()?
        .trim()
        .parse()
        .ok()
}

pub fn describe(name: &str, iface: &Interface, mtu: Option<u32>) -> Vec<String> {
    let mut lines = vec![format!(
        "{}: flags={}<{}>{}",
        name,
        iface.flags,
        flag_names(iface.flags).join(","),
        mtu.map(|m| format!("  mtu {}", m)).unwrap_or_default()
    )];
    for address in &iface.addresses {
        lines.push(match address {
            Address::V4 {
                addr,
                netmask,
                broadcast,
            } => {
                let mut line = format!("        inet {}", addr);
                if let Some(mask) = netmask {
                    line.push_str(&format!("  netmask {}", mask));
                }
                if let Some(b) = broadcast {
                    line.push_str(&format!("  broadcast {}", b));
                }
                line
            }
            Address::V6 { addr, prefix } => format!("        inet6 {}/{}", addr, prefix),
            Address::Ether(bytes) => format!("        ether {}", mac(bytes)),
        });
    }
    lines
}

pub fn run(args: IfconfigArgs) -> CmdResult {
    let all = interfaces()?;
    if let Some(name) = &args.interface {
        if !all.contains_key(name) {
            return Err(Error::runtime(format!("{}: error fetching interface information: Device not found", name)));
        }
    }
    let mut out = io::stdout();
    let mut first = true;
    for (name, iface) in &all {
        let wanted = match &args.interface {
            Some(only) => only == name,
            None => args.all || iface.flags & libc::IFF_UP as u32 != 0,
        };
        if !wanted {
            continue;
        }
        if !first {
            writeln!(out)?;
        }
        first = false;
        for line in describe(name, iface, mtu(name)) {
            writeln!(out, "{}", line)?;
        }
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_names() {
        let flags = (libc::IFF_UP | libc::IFF_LOOPBACK | libc::IFF_RUNNING) as u32;
        assert_eq!(flag_names(flags), vec!["UP", "LOOPBACK", "RUNNING"]);
    }

    #[test]
    fn prefix_from_mask() {
        assert_eq!(prefix_len(&[255, 255, 255, 0]), 24);
        assert_eq!(prefix_len(&Ipv6Addr::new(0xffff, 0xffff, 0xffff, 0xffff, 0, 0, 0, 0).octets()), 64);
    }

    #[test]
    fn describe_formats_addresses() {
        let iface = Interface {
            flags: (libc::IFF_UP | libc::IFF_BROADCAST) as u32,
            addresses: vec![
                Address::V4 {
                    addr: Ipv4Addr::new(192, 168, 1, 5),
                    netmask: Some(Ipv4Addr::new(255, 255, 255, 0)),
                    broadcast: Some(Ipv4Addr::new(192, 168, 1, 255)),
                },
                Address::V6 {
                    addr: "fe80::1".parse().unwrap(),
                    prefix: 64,
                },
                Address::Ether([0xaa, 0xbb, 0xcc, 0, 1, 2]),
            ],
        };
        let lines = describe("eth0", &iface, Some(1500));
        assert_eq!(lines[0], "eth0: flags=3<UP,BROADCAST>  mtu 1500");
        assert_eq!(lines[1], "        inet 192.168.1.5  netmask 255.255.255.0  broadcast 192.168.1.255");
        assert_eq!(lines[2], "        inet6 fe80::1/64");
        assert_eq!(lines[3], "        ether aa:bb:cc:00:01:02");
    }

    #[test]
    fn loopback_is_listed() {
        let all = interfaces().unwrap();
        assert!(all.contains_key("lo"));
    }
}
