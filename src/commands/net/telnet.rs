use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};

use clap::Parser;

use kit::{io, output, tty, Error};

use crate::commands::CmdResult;

const IAC: u8 = 255;
const SB: u8 = 250;
const SE: u8 = 240;
const WILL: u8 = 251;
const DONT: u8 = 254;

#[derive(Parser, Debug)]
#[command(about = "Connect to a TCP service, filtering telnet negotiation")]
pub struct TelnetArgs {
    pub host: Option<String>,

    #[arg(default_value_t = 23)]
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Data,
    Command,
    Option,
    Subnegotiation,
    SubnegotiationIac,
}

/// Strips telnet commands from a byte stream; sequences may span reads.
#[derive(Debug, Default)]
pub struct IacFilter {
    state: State,
}

impl IacFilter {
    pub fn feed(&mut self, input: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(input.len());
        for &byte in input {
            self.state = match (self.state, byte) {
                (State::Data, IAC) => State::Command,
                (State::Data, b) => {
                    data.push(b);
                    State::Data
                }
                (State::Command, IAC) => {
                    data.push(IAC);
                    State::Data
                }
                (State::Command, WILL..=DONT) => State::Option,
                (State::Command, SB) => State::Subnegotiation,
                (State::Command, _) => State::Data,
                (State::Option, _) => State::Data,
                (State::Subnegotiation, IAC) => State::SubnegotiationIac,
                (State::Subnegotiation, _) => State::Subnegotiation,
                (State::SubnegotiationIac, SE) => State::Data,
                (State::SubnegotiationIac, _) => State::Subnegotiation,
            };
        }
        data
    }
}

fn connect(host: &str, port: u16) -> kit::Result<TcpStream> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|e| Error::network(format!("{}: {}", host, kit::error::describe_io(&e))))?
        .next()
        .ok_or_else(|| Error::network(format!("{}: no address", host)))?;
    output::diagnostic("telnet", format!("Trying {}...", addr.ip()));
    let stream = TcpStream::connect(addr).map_err(|e| {
        Error::network(format!("Unable to connect to remote host: {}", kit::error::describe_io(&e)))
    })?;
    output::diagnostic("telnet", format!("Connected to {}.", host));
    Ok(stream)
}

fn session(stream: TcpStream) -> kit::Result<()> {
    let mut writer = stream.try_clone().map_err(|e| Error::os("socket", &e))?;
    std::thread::spawn(move || {
        let mut stdin = std::io::stdin().lock();
        let _ = std::io::copy(&mut stdin, &mut writer);
        let _ = writer.shutdown(std::net::Shutdown::Both);
    });

    let mut filter = IacFilter::default();
    let mut out = io::stdout();
    let mut reader = &stream;
    let mut buf = [0u8; 4096];
    loop {
        let n = match std::io::Read::read(&mut reader, &mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        };
        out.write_all(&filter.feed(&buf[..n]))?;
        out.flush()?;
    }
    output::diagnostic("telnet", "Connection closed by foreign host.");
    Ok(())
}

/// `open host [port]` / `quit` / `close`.
#[derive(Debug, PartialEq, Eq)]
pub enum Directive {
    Open(String, u16),
    Quit,
    Empty,
}

pub fn directive(line: &str) -> kit::Result<Directive> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => Ok(Directive::Empty),
        ["quit" | "q" | "close" | "exit"] => Ok(Directive::Quit),
        ["open" | "o", host] => Ok(Directive::Open(host.to_string(), 23)),
        ["open" | "o", host, port] => {
            let port = port.parse().map_err(|_| Error::invalid_value("port", port))?;
            Ok(Directive::Open(host.to_string(), port))
        }
        ["open" | "o"] => Err(Error::usage("usage: open host [port]")),
        [other, ..] => Err(Error::invalid_argument("command", other)),
    }
}

pub fn run(args: TelnetArgs) -> CmdResult {
    if let Some(host) = &args.host {
        session(connect(host, args.port)?)?;
        return Ok(0);
    }
    while let Some(line) = tty::prompt("telnet> ")? {
        match directive(&line) {
            Ok(Directive::Open(host, port)) => match connect(&host, port) {
                Ok(stream) => {
                    session(stream)?;
                    return Ok(0);
                }
                Err(err) => output::diagnostic("telnet", &err.message),
            },
            Ok(Directive::Quit) => return Ok(0),
            Ok(Directive::Empty) => {}
            Err(err) => output::diagnostic("telnet", &err.message),
        }
    }
    Ok(0)
}
