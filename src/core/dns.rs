//! Minimal DNS client for the record types the system resolver API does
//! not expose (MX, NS, TXT, CNAME).
//!
//! A and AAAA go through the OS resolver; everything else is a single
//! recursive query to the first `nameserver` in `/etc/resolv.conf`.

use std::io::{Read, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use crate::error::{Error, Result};

const QUERY_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_POINTER_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A,
    Aaaa,
    Mx,
    Ns,
    Txt,
    Cname,
}

impl RecordType {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            "MX" => Ok(RecordType::Mx),
            "NS" => Ok(RecordType::Ns),
            "TXT" => Ok(RecordType::Txt),
            "CNAME" => Ok(RecordType::Cname),
            _ => Err(Error::invalid_argument("record type", value)),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::Ns => 2,
            RecordType::Cname => 5,
            RecordType::Mx => 15,
            RecordType::Txt => 16,
            RecordType::Aaaa => 28,
        }
    }
}

/// Decoded answer data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Addr(IpAddr),
    Mx { preference: u16, exchange: String },
    Name(String),
    Txt(Vec<String>),
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Answer::Addr(ip) => write!(f, "{}", ip),
            Answer::Mx {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
            Answer::Name(name) => write!(f, "{}", name),
            Answer::Txt(parts) => write!(f, "\"{}\"", parts.join("")),
        }
    }
}

/// Resolve `host` for the given record type.
pub fn lookup(host: &str, rtype: RecordType) -> Result<Vec<Answer>> {
    match rtype {
        RecordType::A | RecordType::Aaaa => {
            let addrs = (host, 0)
                .to_socket_addrs()
                .map_err(|e| Error::network(format!("{}: {}", host, crate::error::describe_io(&e))))?;
            let mut out: Vec<Answer> = Vec::new();
            for addr in addrs {
                let ip = addr.ip();
                let wanted = matches!(
                    (rtype, ip),
                    (RecordType::A, IpAddr::V4(_)) | (RecordType::Aaaa, IpAddr::V6(_))
                );
                if wanted && !out.contains(&Answer::Addr(ip)) {
                    out.push(Answer::Addr(ip));
                }
            }
            Ok(out)
        }
        _ => {
            let server = nameserver();
            tracing::debug!(%server, host, "dns query");
            let query = build_query(rand::random(), host, rtype.code())?;
            let response = exchange(server, &query)?;
            parse_answers(&response, rtype.code())
        }
    }
}

/// First `nameserver` from resolv.conf, falling back to localhost.
pub fn nameserver() -> SocketAddr {
    let conf = std::fs::read_to_string("/etc/resolv.conf").unwrap_or_default();
    conf.lines()
        .filter_map(|line| line.trim().strip_prefix("nameserver"))
        .filter_map(|rest| rest.trim().parse::<IpAddr>().ok())
        .map(|ip| SocketAddr::new(ip, 53))
        .next()
        .unwrap_or_else(|| SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 53))
}

/// Encode a recursive single-question query.
pub fn build_query(id: u16, host: &str, qtype: u16) -> Result<Vec<u8>> {
    let mut pkt = Vec::with_capacity(32 + host.len());
    pkt.extend_from_slice(&id.to_be_bytes());
    pkt.extend_from_slice(&0x0100u16.to_be_bytes()); // RD
    pkt.extend_from_slice(&1u16.to_be_bytes());
    pkt.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    for label in host.trim_end_matches('.').split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err(Error::invalid_value("host name", host));
        }
        pkt.push(label.len() as u8);
        pkt.extend_from_slice(label.as_bytes());
    }
    pkt.push(0);
    pkt.extend_from_slice(&qtype.to_be_bytes());
    pkt.extend_from_slice(&1u16.to_be_bytes()); // IN
    Ok(pkt)
}

fn exchange(server: SocketAddr, query: &[u8]) -> Result<Vec<u8>> {
    let bind: SocketAddr = if server.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let net = |e: std::io::Error| Error::network(format!("{}: {}", server, crate::error::describe_io(&e)));
    let socket = UdpSocket::bind(bind).map_err(net)?;
    socket.set_read_timeout(Some(QUERY_TIMEOUT)).map_err(net)?;
    socket.send_to(query, server).map_err(net)?;

    let mut buf = vec![0u8; 4096];
    let n = socket.recv(&mut buf).map_err(net)?;
    buf.truncate(n);

    // TC bit: retry over TCP with a length prefix.
    if buf.len() > 2 && buf[2] & 0x02 != 0 {
        let mut stream = TcpStream::connect_timeout(&server, QUERY_TIMEOUT).map_err(net)?;
        stream.set_read_timeout(Some(QUERY_TIMEOUT)).map_err(net)?;
        stream
            .write_all(&(query.len() as u16).to_be_bytes())
            .map_err(net)?;
        stream.write_all(query).map_err(net)?;
        let mut len = [0u8; 2];
        stream.read_exact(&mut len).map_err(net)?;
        let mut body = vec![0u8; u16::from_be_bytes(len) as usize];
        stream.read_exact(&mut body).map_err(net)?;
        return Ok(body);
    }
    Ok(buf)
}

fn truncated() -> Error {
    Error::network("malformed DNS response")
}

fn be16(pkt: &[u8], off: usize) -> Result<u16> {
    pkt.get(off..off + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(truncated)
}

/// Read a possibly-compressed name at `off`; returns the name and the
/// offset just past it in the original position.
pub fn read_name(pkt: &[u8], off: usize) -> Result<(String, usize)> {
    let mut labels: Vec<String> = Vec::new();
    let mut pos = off;
    let mut resume: Option<usize> = None;
    let mut jumps = 0;
    loop {
        let len = *pkt.get(pos).ok_or_else(truncated)? as usize;
        if len == 0 {
            pos += 1;
            break;
        }
        if len & 0xC0 == 0xC0 {
            let low = *pkt.get(pos + 1).ok_or_else(truncated)? as usize;
            if resume.is_none() {
                resume = Some(pos + 2);
            }
            jumps += 1;
            if jumps > MAX_POINTER_DEPTH {
                return Err(truncated());
            }
            pos = ((len & 0x3F) << 8) | low;
            continue;
        }
        let label = pkt.get(pos + 1..pos + 1 + len).ok_or_else(truncated)?;
        labels.push(String::from_utf8_lossy(label).into_owned());
        pos += 1 + len;
    }
    Ok((labels.join("."), resume.unwrap_or(pos)))
}

/// Decode the answer section, keeping records of `qtype`.
pub fn parse_answers(pkt: &[u8], qtype: u16) -> Result<Vec<Answer>> {
    if pkt.len() < 12 {
        return Err(truncated());
    }
    let rcode = pkt[3] & 0x0F;
    match rcode {
        0 => {}
        3 => return Err(Error::network("no such host (NXDOMAIN)")),
        2 => return Err(Error::network("server failure (SERVFAIL)")),
        5 => return Err(Error::network("query refused")),
        other => return Err(Error::network(format!("DNS error code {}", other))),
    }
    let qdcount = be16(pkt, 4)?;
    let ancount = be16(pkt, 6)?;

    let mut off = 12;
    for _ in 0..qdcount {
        let (_, next) = read_name(pkt, off)?;
        off = next + 4;
    }

    let mut answers = Vec::new();
    for _ in 0..ancount {
        let (_, next) = read_name(pkt, off)?;
        off = next;
        let rtype = be16(pkt, off)?;
        let rdlen = be16(pkt, off + 8)? as usize;
        off += 10;
        let rdata = pkt.get(off..off + rdlen).ok_or_else(truncated)?;
        if rtype == qtype {
            answers.push(decode_rdata(pkt, off, rtype, rdata)?);
        }
        off += rdlen;
    }
    Ok(answers)
}

fn decode_rdata(pkt: &[u8], off: usize, rtype: u16, rdata: &[u8]) -> Result<Answer> {
    Ok(match rtype {
        1 if rdata.len() == 4 => {
            Answer::Addr(IpAddr::V4(Ipv4Addr::new(rdata[0], rdata[1], rdata[2], rdata[3])))
        }
        28 if rdata.len() == 16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(rdata);
            Answer::Addr(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        15 => Answer::Mx {
            preference: be16(pkt, off)?,
            exchange: read_name(pkt, off + 2)?.0,
        },
        2 | 5 => Answer::Name(read_name(pkt, off)?.0),
        16 => {
            let mut parts = Vec::new();
            let mut i = 0;
            while i < rdata.len() {
                let len = rdata[i] as usize;
                let chunk = rdata.get(i + 1..i + 1 + len).ok_or_else(truncated)?;
                parts.push(String::from_utf8_lossy(chunk).into_owned());
                i += 1 + len;
            }
            Answer::Txt(parts)
        }
        _ => return Err(truncated()),
    })
}
