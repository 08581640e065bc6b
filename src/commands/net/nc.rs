//! `nc`: relay stdin and stdout over a TCP or UDP socket.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use socket2::{Domain, Protocol, Socket, Type};

use kit::{io, output, Error};

use crate::commands::CmdResult;

const UDP_POLL: Duration = Duration::from_millis(200);

#[derive(Parser, Debug)]
#[command(about = "Read and write data across TCP or UDP connections")]
pub struct NcArgs {
    /// Listen for one incoming connection instead of connecting
    #[arg(short = 'l', long = "listen")]
    pub listen: bool,

    /// Use UDP instead of TCP
    #[arg(short = 'u', long = "udp")]
    pub udp: bool,

    /// Report connection progress on stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Local port to listen on
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    pub host: Option<String>,
    pub remote_port: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Listen(u16),
    Connect(String, u16),
}

fn port(text: &str) -> kit::Result<u16> {
    text.parse().map_err(|_| Error::invalid_value("port", text))
}

impl Mode {
    pub fn from_args(args: &NcArgs) -> kit::Result<Self> {
        if args.listen {
            // `nc -l 8080` and `nc -l -p 8080` are both accepted.
            let port = match (args.port, &args.host, &args.remote_port) {
                (Some(p), _, _) => p,
                (None, Some(h), None) => port(h)?,
                (None, _, Some(p)) => port(p)?,
                (None, None, None) => return Err(Error::missing_operand(Some("-l"))),
            };
            return Ok(Mode::Listen(port));
        }
        match (&args.host, &args.remote_port) {
            (Some(host), Some(p)) => Ok(Mode::Connect(host.clone(), port(p)?)),
            (Some(host), None) => Err(Error::missing_operand(Some(host.as_str()))),
            _ => Err(Error::missing_operand(None)),
        }
    }
}

/// Copy until EOF, flushing after every chunk so interactive data is not held.
pub fn pump<R: Read, W: Write>(mut from: R, mut to: W) -> std::io::Result<u64> {
    let mut buf = [0u8; 8192];
    let mut total = 0;
    loop {
        let n = match from.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        to.write_all(&buf[..n])?;
        to.flush()?;
        total += n as u64;
    }
}

fn resolve(host: &str, port: u16) -> kit::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .map_err(|e| Error::network(format!("{}: {}", host, kit::error::describe_io(&e))))?
        .next()
        .ok_or_else(|| Error::network(format!("{}: no address", host)))
}

fn bound(port: u16, kind: Type, protocol: Protocol) -> kit::Result<Socket> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let net = |e: std::io::Error| Error::network(format!("port {}: {}", port, kit::error::describe_io(&e)));
    let socket = Socket::new(Domain::IPV4, kind, Some(protocol)).map_err(net)?;
    socket.set_reuse_address(true).map_err(net)?;
    socket.bind(&addr.into()).map_err(net)?;
    Ok(socket)
}

fn tcp_stream(mode: &Mode, verbose: bool) -> kit::Result<TcpStream> {
    match mode {
        Mode::Listen(port) => {
            let socket = bound(*port, Type::STREAM, Protocol::TCP)?;
            socket
                .listen(1)
                .map_err(|e| Error::os(format!("listen on {}", port), &e))?;
            let listener: TcpListener = socket.into();
            if verbose {
                output::diagnostic("nc", format!("Listening on 0.0.0.0 {}", port));
            }
            let (stream, peer) = listener
                .accept()
                .map_err(|e| Error::os("accept", &e))?;
            if verbose {
                output::diagnostic("nc", format!("Connection received on {} {}", peer.ip(), peer.port()));
            }
            Ok(stream)
        }
        Mode::Connect(host, port) => {
            let addr = resolve(host, *port)?;
            let stream = TcpStream::connect(addr)
                .map_err(|e| Error::network(format!("connect to {} port {}: {}", host, port, kit::error::describe_io(&e))))?;
            if verbose {
                output::diagnostic("nc", format!("Connection to {} {} port [tcp] succeeded!", host, port));
            }
            Ok(stream)
        }
    }
}

fn relay_tcp(stream: TcpStream) -> kit::Result<()> {
    let writer = stream.try_clone().map_err(|e| Error::os("socket", &e))?;
    std::thread::spawn(move || {
        let _ = pump(std::io::stdin().lock(), &writer);
        // Half-close so the peer sees EOF and can finish its reply.
        let _ = writer.shutdown(Shutdown::Write);
    });
    pump(&stream, io::stdout()).map_err(|e| Error::os("socket", &e))?;
    Ok(())
}

fn relay_udp(mode: &Mode, verbose: bool) -> kit::Result<()> {
    let socket: UdpSocket = match mode {
        Mode::Listen(port) => {
            let socket: UdpSocket = bound(*port, Type::DGRAM, Protocol::UDP)?.into();
            let mut buf = [0u8; 65_536];
            let (n, peer) = socket
                .recv_from(&mut buf)
                .map_err(|e| Error::os("recv", &e))?;
            if verbose {
                output::diagnostic("nc", format!("Connection received on {} {}", peer.ip(), peer.port()));
            }
            let mut out = io::stdout();
            out.write_all(&buf[..n])?;
            out.flush()?;
            socket.connect(peer).map_err(|e| Error::os("connect", &e))?;
            socket
        }
        Mode::Connect(host, port) => {
            let addr = resolve(host, *port)?;
            let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], 0)))
                .map_err(|e| Error::os("bind", &e))?;
            socket.connect(addr).map_err(|e| Error::os("connect", &e))?;
            socket
        }
    };

    let done = Arc::new(AtomicBool::new(false));
    let sender = socket.try_clone().map_err(|e| Error::os("socket", &e))?;
    let finished = Arc::clone(&done);
    std::thread::spawn(move || {
        let mut stdin = std::io::stdin().lock();
        let mut buf = [0u8; 8192];
        while let Ok(n) = stdin.read(&mut buf) {
            if n == 0 || sender.send(&buf[..n]).is_err() {
                break;
            }
        }
        finished.store(true, Ordering::SeqCst);
    });

    socket
        .set_read_timeout(Some(UDP_POLL))
        .map_err(|e| Error::os("socket", &e))?;
    let mut out = io::stdout();
    let mut buf = [0u8; 65_536];
    while !done.load(Ordering::SeqCst) {
        match socket.recv(&mut buf) {
            Ok(n) => {
                out.write_all(&buf[..n])?;
                out.flush()?;
            }
            Err(e) if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) => {}
            Err(e) => return Err(Error::os("recv", &e)),
        }
    }
    Ok(())
}

pub fn run(args: NcArgs) -> CmdResult {
    let mode = Mode::from_args(&args)?;
    tracing::debug!(?mode, udp = args.udp, "nc");
    if args.udp {
        relay_udp(&mode, args.verbose)?;
    } else {
        relay_tcp(tcp_stream(&mode, args.verbose)?)?;
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(listen: bool, port: Option<u16>, host: Option<&str>, remote: Option<&str>) -> NcArgs {
        NcArgs {
            listen,
            udp: false,
            verbose: false,
            port,
            host: host.map(str::to_string),
            remote_port: remote.map(str::to_string),
        }
    }

    #[test]
    fn modes_from_operands() {
        assert_eq!(Mode::from_args(&args(true, Some(9000), None, None)).unwrap(), Mode::Listen(9000));
        assert_eq!(Mode::from_args(&args(true, None, Some("9001"), None)).unwrap(), Mode::Listen(9001));
        assert_eq!(
            Mode::from_args(&args(false, None, Some("example.com"), Some("80"))).unwrap(),
            Mode::Connect("example.com".to_string(), 80)
        );
        assert!(Mode::from_args(&args(false, None, Some("example.com"), None)).is_err());
        assert!(Mode::from_args(&args(true, None, None, None)).is_err());
        assert!(Mode::from_args(&args(false, None, Some("h"), Some("http"))).is_err());
    }

    #[test]
    fn pump_copies_everything() {
        let mut sink = Vec::new();
        let n = pump(&b"hello\nworld"[..], &mut sink).unwrap();
        assert_eq!(n, 11);
        assert_eq!(sink, b"hello\nworld");
    }

    #[test]
    fn pump_over_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            conn.write_all(b"ping").unwrap();
        });
        let stream = TcpStream::connect(addr).unwrap();
        let mut got = Vec::new();
        pump(&stream, &mut got).unwrap();
        server.join().unwrap();
        assert_eq!(got, b"ping");
    }
}
