//! `ping`: ICMP echo over a raw socket, falling back to the unprivileged
//! datagram ICMP socket Linux offers when raw sockets are not permitted.

use std::io::{Read, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::time::{Duration, Instant};

use clap::Parser;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use kit::{io, parser, Error};

use crate::commands::CmdResult;

const ECHO_REQUEST: u8 = 8;
const ECHO_REPLY: u8 = 0;
const HEADER: usize = 8;

#[derive(Parser, Debug)]
#[command(about = "Send ICMP echo requests to a host")]
pub struct PingArgs {
    /// Stop after N requests
    #[arg(short = 'c', long = "count", default_value_t = 4)]
    pub count: u32,

    /// Seconds between requests
    #[arg(short = 'i', long = "interval", default_value = "1")]
    pub interval: String,

    /// Seconds to wait for each reply
    #[arg(short = 'W', long = "timeout", default_value = "1")]
    pub timeout: String,

    /// Payload size in bytes
    #[arg(short = 's', long = "size", default_value_t = 56)]
    pub size: usize,

    pub host: String,
}

/// RFC 1071 one's-complement sum of 16-bit words.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut chunks = data.chunks_exact(2);
    for pair in &mut chunks {
        sum += u32::from(u16::from_be_bytes([pair[0], pair[1]]));
    }
    if let [last] = chunks.remainder() {
        sum += u32::from(*last) << 8;
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}

pub fn echo_request(id: u16, seq: u16, size: usize) -> Vec<u8> {
    let mut packet = vec![0u8; HEADER + size];
    packet[0] = ECHO_REQUEST;
    packet[4..6].copy_from_slice(&id.to_be_bytes());
    packet[6..8].copy_from_slice(&seq.to_be_bytes());
    for (i, byte) in packet[HEADER..].iter_mut().enumerate() {
        *byte = i as u8;
    }
    let sum = checksum(&packet);
    packet[2..4].copy_from_slice(&sum.to_be_bytes());
    packet
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub seq: u16,
    pub ttl: Option<u8>,
    pub bytes: usize,
}

/// Decode an echo reply. Raw sockets deliver the IPv4 header first; the
/// datagram socket delivers ICMP only and rewrites the identifier itself.
pub fn parse_reply(buf: &[u8], raw: bool, id: u16) -> Option<Reply> {
    let (icmp, ttl) = if raw {
        let ihl = usize::from(buf.first()? & 0x0f) * 4;
        (buf.get(ihl..)?, Some(*buf.get(8)?))
    } else {
        (buf, None)
    };
    if icmp.len() < HEADER || icmp[0] != ECHO_REPLY {
        return None;
    }
    if raw && u16::from_be_bytes([icmp[4], icmp[5]]) != id {
        return None;
    }
    Some(Reply {
        seq: u16::from_be_bytes([icmp[6], icmp[7]]),
        ttl,
        bytes: icmp.len(),
    })
}

#[derive(Debug, Default)]
pub struct Stats {
    pub sent: u32,
    pub rtts: Vec<f64>,
}

impl Stats {
    pub fn loss_percent(&self) -> u32 {
        if self.sent == 0 {
            return 0;
        }
        let lost = self.sent - self.rtts.len() as u32;
        lost * 100 / self.sent
    }

    /// `(min, avg, max, mdev)` in milliseconds.
    pub fn rtt(&self) -> Option<(f64, f64, f64, f64)> {
        if self.rtts.is_empty() {
            return None;
        }
        let n = self.rtts.len() as f64;
        let min = self.rtts.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = self.rtts.iter().cloned().fold(0.0, f64::max);
        let avg = self.rtts.iter().sum::<f64>() / n;
        let var = self.rtts.iter().map(|r| r * r).sum::<f64>() / n - avg * avg;
        Some((min, avg, max, var.max(0.0).sqrt()))
    }
}

fn open_socket() -> kit::Result<(Socket, bool)> {
    match Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4)) {
        Ok(socket) => Ok((socket, true)),
        Err(raw_err) => {
            tracing::debug!(error = %raw_err, "raw ICMP socket unavailable");
            Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::ICMPV4))
                .map(|socket| (socket, false))
                .map_err(|_| Error::os("icmp socket", &raw_err).with_hint("raw sockets need CAP_NET_RAW"))
        }
    }
}

fn resolve(host: &str) -> kit::Result<Ipv4Addr> {
    (host, 0)
        .to_socket_addrs()
        .map_err(|e| Error::network(format!("{}: {}", host, kit::error::describe_io(&e))))?
        .find_map(|addr| match addr.ip() {
            IpAddr::V4(ip) => Some(ip),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| Error::network(format!("{}: no IPv4 address", host)))
}

fn await_reply(
    socket: &mut Socket,
    raw: bool,
    id: u16,
    seq: u16,
    deadline: Instant,
) -> std::io::Result<Option<Reply>> {
    let mut buf = [0u8; 65_536];
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Ok(None);
        }
        socket.set_read_timeout(Some(left))?;
        match socket.read(&mut buf) {
            Ok(n) => match parse_reply(&buf[..n], raw, id) {
                Some(reply) if reply.seq == seq => return Ok(Some(reply)),
                _ => continue,
            },
            Err(e) if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) => {
                return Ok(None)
            }
            Err(e) => return Err(e),
        }
    }
}

pub fn run(args: PingArgs) -> CmdResult {
    let interval = parser::parse_duration(&args.interval)?;
    let wait = parser::parse_duration(&args.timeout)?;
    let ip = resolve(&args.host)?;
    let (mut socket, raw) = open_socket()?;
    let target = SockAddr::from(SocketAddr::new(IpAddr::V4(ip), 0));
    let id = (std::process::id() & 0xffff) as u16;

    let mut out = io::stdout();
    writeln!(
        out,
        "PING {} ({}) {}({}) bytes of data.",
        args.host,
        ip,
        args.size,
        args.size + HEADER + 20
    )?;
    out.flush()?;

    let mut stats = Stats::default();
    let started = Instant::now();
    for n in 0..args.count {
        let seq = (n + 1) as u16;
        let packet = echo_request(id, seq, args.size);
        let sent_at = Instant::now();
        socket
            .send_to(&packet, &target)
            .map_err(|e| Error::os(format!("sendto {}", ip), &e))?;
        stats.sent += 1;

        if let Some(reply) = await_reply(&mut socket, raw, id, seq, sent_at + wait)
            .map_err(|e| Error::os("recv", &e))?
        {
            let ms = sent_at.elapsed().as_secs_f64() * 1000.0;
            stats.rtts.push(ms);
            let ttl = reply.ttl.map(|t| format!(" ttl={}", t)).unwrap_or_default();
            writeln!(
                out,
                "{} bytes from {}: icmp_seq={}{} time={:.1} ms",
                reply.bytes, ip, reply.seq, ttl, ms
            )?;
            out.flush()?;
        }
        if n + 1 < args.count {
            std::thread::sleep(interval.saturating_sub(sent_at.elapsed()).max(Duration::from_millis(1)));
        }
    }

    writeln!(out, "\n--- {} ping statistics ---", args.host)?;
    writeln!(
        out,
        "{} packets transmitted, {} received, {}% packet loss, time {}ms",
        stats.sent,
        stats.rtts.len(),
        stats.loss_percent(),
        started.elapsed().as_millis()
    )?;
    if let Some((min, avg, max, mdev)) = stats.rtt() {
        writeln!(out, "rtt min/avg/max/mdev = {:.3}/{:.3}/{:.3}/{:.3} ms", min, avg, max, mdev)?;
    }
    out.flush()?;
    Ok(if stats.rtts.is_empty() { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_of_request_verifies_to_zero() {
        let packet = echo_request(0x1234, 7, 56);
        assert_eq!(packet.len(), 64);
        assert_eq!(checksum(&packet), 0);
    }

    #[test]
    fn checksum_handles_odd_length() {
        assert_eq!(checksum(&[0x00, 0x01, 0xf2]), !0xf201u16);
    }

    #[test]
    fn parses_raw_reply_with_ip_header() {
        let mut buf = vec![0u8; 20];
        buf[0] = 0x45;
        buf[8] = 64;
        let mut icmp = echo_request(42, 3, 8);
        icmp[0] = ECHO_REPLY;
        buf.extend_from_slice(&icmp);
        let reply = parse_reply(&buf, true, 42).unwrap();
        assert_eq!(reply, Reply { seq: 3, ttl: Some(64), bytes: 16 });
        assert!(parse_reply(&buf, true, 43).is_none());
    }

    #[test]
    fn ignores_non_replies() {
        let request = echo_request(1, 1, 8);
        assert!(parse_reply(&request, false, 1).is_none());
    }

    #[test]
    fn statistics() {
        let stats = Stats {
            sent: 4,
            rtts: vec![1.0, 3.0],
        };
        assert_eq!(stats.loss_percent(), 50);
        let (min, avg, max, mdev) = stats.rtt().unwrap();
        assert_eq!((min, avg, max, mdev), (1.0, 2.0, 3.0, 1.0));
        assert!(Stats::default().rtt().is_none());
    }
}
