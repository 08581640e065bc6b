use std::io::Write;

use clap::Parser;

use kit::checksum::Crc32;
use kit::hash::{Algorithm, Hasher, CHUNK};
use kit::{io, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Compute MD5, SHA-1, SHA-256, SHA-512 and CRC-32 in one pass")]
pub struct ChecksumArgs {
    pub files: Vec<String>,
}

const ALGORITHMS: [Algorithm; 4] = [
    Algorithm::Md5,
    Algorithm::Sha1,
    Algorithm::Sha256,
    Algorithm::Sha512,
];

/// Every digest fed from one read loop.
pub struct Tee {
    hashers: Vec<(Algorithm, Box<dyn Hasher>)>,
    crc: Crc32,
}

impl Tee {
    pub fn new() -> Self {
        Tee {
            hashers: ALGORITHMS.iter().map(|a| (*a, a.hasher())).collect(),
            crc: Crc32::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        for (_, h) in &mut self.hashers {
            h.update(data);
        }
        self.crc.update(data);
    }

    pub fn finish(self) -> Vec<(String, String)> {
        let mut rows: Vec<(String, String)> = self
            .hashers
            .into_iter()
            .map(|(a, h)| (a.name().to_string(), hex::encode(h.finish())))
            .collect();
        rows.push(("CRC32".to_string(), format!("{:08x}", self.crc.finish())));
        rows
    }
}

impl Default for Tee {
    fn default() -> Self {
        Self::new()
    }
}

pub fn run(args: ChecksumArgs) -> CmdResult {
    let files = io::operands(&args.files);
    let mut out = io::stdout();
    let mut first = true;
    let status = io::each_input("checksum", &files, |path, reader| {
        let mut tee = Tee::new();
        let mut buf = vec![0u8; CHUNK];
        loop {
            let n = reader.read(&mut buf).map_err(|e| Error::io(path, &e))?;
            if n == 0 {
                break;
            }
            tee.update(&buf[..n]);
        }
        if !first {
            writeln!(out)?;
        }
        first = false;
        writeln!(out, "{}:", path)?;
        for (name, digest) in tee.finish() {
            writeln!(out, "  {:<7} {}", name, digest)?;
        }
        Ok(())
    })?;
    out.flush()?;
    Ok(status)
}
