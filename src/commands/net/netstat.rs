use std::io::Write;

use clap::Parser;

use kit::netproc::{self, Socket};
use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Show TCP and UDP sockets")]
pub struct NetstatArgs {
    /// Only listening sockets
    #[arg(short = 'l', long = "listening", conflicts_with = "all")]
    pub listening: bool,

    /// Listening and connected sockets
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    #[arg(short = 't', long = "tcp")]
    pub tcp: bool,

    #[arg(short = 'u', long = "udp")]
    pub udp: bool,

    /// Numeric output (always numeric here)
    #[arg(short = 'n', long = "numeric")]
    pub numeric: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proto {
    Tcp,
    Udp,
}

impl Proto {
    fn tables(self) -> [(&'static str, &'static str); 2] {
        match self {
            Proto::Tcp => [("tcp", "/proc/net/tcp"), ("tcp6", "/proc/net/tcp6")],
            Proto::Udp => [("udp", "/proc/net/udp"), ("udp6", "/proc/net/udp6")],
        }
    }
}

/// UDP has no LISTEN state; an unconnected bound socket plays that role.
pub fn listening(proto: Proto, socket: &Socket) -> bool {
    match proto {
        Proto::Tcp => socket.is_listening(),
        Proto::Udp => socket.remote.ip().is_unspecified(),
    }
}

pub fn state(proto: Proto, socket: &Socket) -> &'static str {
    match proto {
        Proto::Tcp => socket.state_name(),
        Proto::Udp if socket.state == 0x01 => "ESTABLISHED",
        Proto::Udp => "",
    }
}

pub fn row(name: &str, proto: Proto, socket: &Socket) -> String {
    format!(
        "{:<5} {:<23} {:<23} {}",
        name,
        socket.local.to_string(),
        socket.remote.to_string(),
        state(proto, socket)
    )
    .trim_end()
    .to_string()
}

pub fn run(args: NetstatArgs) -> CmdResult {
    let protos: Vec<Proto> = match (args.tcp, args.udp) {
        (true, false) => vec![Proto::Tcp],
        (false, true) => vec![Proto::Udp],
        _ => vec![Proto::Tcp, Proto::Udp],
    };

    let mut out = io::stdout();
    writeln!(
        out,
        "{:<5} {:<23} {:<23} {}",
        "Proto", "Local Address", "Foreign Address", "State"
    )?;
    for proto in protos {
        for (name, path) in proto.tables() {
            // IPv6 tables are absent when the stack is disabled.
            let Ok(table) = std::fs::read_to_string(path) else {
                tracing::debug!(path, "socket table unavailable");
                continue;
            };
            for socket in netproc::parse_sockets(&table) {
                let keep = args.all || listening(proto, &socket) == args.listening;
                if keep {
                    writeln!(out, "{}", row(name, proto, &socket))?;
                }
            }
        }
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn socket(local: &str, remote: &str, state: u8) -> Socket {
        Socket {
            local: local.parse().unwrap(),
            remote: remote.parse().unwrap(),
            state,
            uid: 0,
            inode: 1,
        }
    }

    #[test]
    fn udp_listening_means_unconnected() {
        let bound = socket("0.0.0.0:53", "0.0.0.0:0", 0x07);
        let connected = socket("10.0.0.2:40000", "10.0.0.1:53", 0x01);
        assert!(listening(Proto::Udp, &bound));
        assert!(!listening(Proto::Udp, &connected));
        assert_eq!(state(Proto::Udp, &bound), "");
        assert_eq!(state(Proto::Udp, &connected), "ESTABLISHED");
    }

    #[test]
    fn tcp_rows_show_state_names() {
        let listen = socket("127.0.0.1:3306", "0.0.0.0:0", 0x0A);
        assert!(listening(Proto::Tcp, &listen));
        let line = row("tcp", Proto::Tcp, &listen);
        assert!(line.starts_with("tcp   127.0.0.1:3306"));
        assert!(line.ends_with("LISTEN"));
    }
}
