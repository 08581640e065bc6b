//! Parsers for the Linux `/proc/net` tables used by `netstat` and `arp`.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// TCP state names indexed by the hex code in `/proc/net/tcp` (`01..0B`).
pub const TCP_STATES: [&str; 11] = [
    "ESTABLISHED",
    "SYN_SENT",
    "SYN_RECV",
    "FIN_WAIT1",
    "FIN_WAIT2",
    "TIME_WAIT",
    "CLOSE",
    "CLOSE_WAIT",
    "LAST_ACK",
    "LISTEN",
    "CLOSING",
];

pub fn tcp_state(code: u8) -> &'static str {
    match code {
        1..=11 => TCP_STATES[code as usize - 1],
        _ => "UNKNOWN",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Socket {
    pub local: SocketAddr,
    pub remote: SocketAddr,
    pub state: u8,
    pub uid: u32,
    pub inode: u64,
}

impl Socket {
    pub fn state_name(&self) -> &'static str {
        tcp_state(self.state)
    }

    pub fn is_listening(&self) -> bool {
        self.state == 0x0A
    }
}

/// Decode `0100007F:0050` (little-endian words, hex port).
pub fn parse_hex_endpoint(field: &str) -> Option<SocketAddr> {
    let (addr, port) = field.split_once(':')?;
    let port = u16::from_str_radix(port, 16).ok()?;
    let ip = match addr.len() {
        8 => {
            let word = u32::from_str_radix(addr, 16).ok()?;
            IpAddr::V4(Ipv4Addr::from(word.to_le_bytes()))
        }
        32 => {
            let mut octets = [0u8; 16];
            for (i, chunk) in octets.chunks_mut(4).enumerate() {
                let word = u32::from_str_radix(&addr[i * 8..i * 8 + 8], 16).ok()?;
                chunk.copy_from_slice(&word.to_le_bytes());
            }
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        _ => return None,
    };
    Some(SocketAddr::new(ip, port))
}

/// Parse the body of `/proc/net/{tcp,udp,tcp6,udp6}`; the header line is
/// skipped and malformed rows are ignored.
pub fn parse_sockets(table: &str) -> Vec<Socket> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 10 {
                return None;
            }
            Some(Socket {
                local: parse_hex_endpoint(cols[1])?,
                remote: parse_hex_endpoint(cols[2])?,
                state: u8::from_str_radix(cols[3], 16).ok()?,
                uid: cols[7].parse().ok()?,
                inode: cols[9].parse().ok()?,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpEntry {
    pub ip: String,
    pub hw_type: String,
    pub flags: String,
    pub mac: String,
    pub device: String,
}

impl ArpEntry {
    /// Flag 0x2 (ATF_COM) marks a resolved entry.
    pub fn is_complete(&self) -> bool {
        u32::from_str_radix(self.flags.trim_start_matches("0x"), 16)
            .map(|f| f & 0x2 != 0)
            .unwrap_or(false)
    }
}

/// Parse `/proc/net/arp`.
pub fn parse_arp(table: &str) -> Vec<ArpEntry> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 6 {
                return None;
            }
            Some(ArpEntry {
                ip: cols[0].to_string(),
                hw_type: cols[1].to_string(),
                flags: cols[2].to_string(),
                mac: cols[3].to_string(),
                device: cols[5].to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TCP: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0100007F:0CEA 00000000:0000 0A 00000000:00000000 00:00000000 00000000   999        0 26471 1 0000000000000000 100 0 0 10 0
   1: 0F02000A:0016 0202000A:C350 01 00000000:00000000 02:0004C3A4 00000000     0        0 31337 4 0000000000000000 20 4 30 10 -1
";

    #[test]
    fn decodes_little_endian_ipv4() {
        let ep = parse_hex_endpoint("0100007F:0050").unwrap();
        assert_eq!(ep.to_string(), "127.0.0.1:80");
    }

    #[test]
    fn decodes_ipv6_words() {
        let ep = parse_hex_endpoint("00000000000000000000000001000000:0016").unwrap();
        assert_eq!(ep.to_string(), "[::1]:22");
    }

    #[test]
    fn parses_socket_table() {
        let sockets = parse_sockets(TCP);
        assert_eq!(sockets.len(), 2);
        assert_eq!(sockets[0].local.to_string(), "127.0.0.1:3306");
        assert!(sockets[0].is_listening());
        assert_eq!(sockets[0].uid, 999);
        assert_eq!(sockets[1].state_name(), "ESTABLISHED");
        assert_eq!(sockets[1].remote.to_string(), "10.0.2.2:50000");
        assert_eq!(sockets[1].inode, 31337);
    }

    #[test]
    fn state_table_covers_all_codes() {
        assert_eq!(tcp_state(0x01), "ESTABLISHED");
        assert_eq!(tcp_state(0x0B), "CLOSING");
        assert_eq!(tcp_state(0x0C), "UNKNOWN");
    }

    #[test]
    fn parses_arp_table() {
        let table = "IP address       HW type     Flags       HW address            Mask     Device
192.168.1.1      0x1         0x2         aa:bb:cc:dd:ee:ff     *        eth0
192.168.1.9      0x1         0x0         00:00:00:00:00:00     *        eth0
";
        let entries = parse_arp(table);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].mac, "aa:bb:cc:dd:ee:ff");
        assert!(entries[0].is_complete());
        assert!(!entries[1].is_complete());
    }
}
