//! Cryptographic digests behind one streaming interface.
//!
//! The accumulator lives for exactly one input; `hash_reader` feeds it in
//! 64 KiB chunks so arbitrarily large files hash in constant memory.

use std::io::{self, Read};

use sha2::Digest;

/// Size of the read buffer used while hashing.
pub const CHUNK: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Blake2b,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Md5 => "MD5",
            Algorithm::Sha1 => "SHA1",
            Algorithm::Sha224 => "SHA224",
            Algorithm::Sha256 => "SHA256",
            Algorithm::Sha384 => "SHA384",
            Algorithm::Sha512 => "SHA512",
            Algorithm::Blake2b => "BLAKE2b",
        }
    }

    /// Digest length in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            Algorithm::Md5 => 16,
            Algorithm::Sha1 => 20,
            Algorithm::Sha224 => 28,
            Algorithm::Sha256 => 32,
            Algorithm::Sha384 => 48,
            Algorithm::Sha512 | Algorithm::Blake2b => 64,
        }
    }

    pub fn hasher(&self) -> Box<dyn Hasher> {
        match self {
            Algorithm::Md5 => Box::new(Md5Hasher(md5::Context::new())),
            Algorithm::Sha1 => Box::new(Digester(sha1::Sha1::new())),
            Algorithm::Sha224 => Box::new(Digester(sha2::Sha224::new())),
            Algorithm::Sha256 => Box::new(Digester(sha2::Sha256::new())),
            Algorithm::Sha384 => Box::new(Digester(sha2::Sha384::new())),
            Algorithm::Sha512 => Box::new(Digester(sha2::Sha512::new())),
            Algorithm::Blake2b => Box::new(Digester(blake2::Blake2b512::new())),
        }
    }
}

/// Opaque streaming accumulator.
pub trait Hasher {
    fn update(&mut self, data: &[u8]);
    fn finish(self: Box<Self>) -> Vec<u8>;
}

struct Digester<D>(D);

impl<D: Digest> Hasher for Digester<D> {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }

    fn finish(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_vec()
    }
}

struct Md5Hasher(md5::Context);

impl Hasher for Md5Hasher {
    fn update(&mut self, data: &[u8]) {
        self.0.consume(data);
    }

    fn finish(self: Box<Self>) -> Vec<u8> {
        self.0.compute().0.to_vec()
    }
}

/// Hash everything `reader` yields.
pub fn hash_reader<R: Read + ?Sized>(algorithm: Algorithm, reader: &mut R) -> io::Result<Vec<u8>> {
    let mut hasher = algorithm.hasher();
    let mut buf = vec![0u8; CHUNK];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finish())
}

/// SHA-256 helper for tools that only need that digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    sha2::Sha256::digest(data).into()
}

/// One parsed line of a `-c` check file: `HEX  name` or `HEX *name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckLine {
    pub digest: String,
    pub name: String,
}

/// Parse a GNU-format digest line. The digest must be `2 * digest_len`
/// hex characters.
pub fn parse_check_line(line: &str, algorithm: Algorithm) -> Option<CheckLine> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (digest, rest) = line.split_once(' ')?;
    let name = rest
        .strip_prefix(' ')
        .or_else(|| rest.strip_prefix('*'))?;
    if digest.len() != algorithm.digest_len() * 2
        || !digest.chars().all(|c| c.is_ascii_hexdigit())
        || name.is_empty()
    {
        return None;
    }
    Some(CheckLine {
        digest: digest.to_ascii_lowercase(),
        name: name.to_string(),
    })
}

/// Format a digest line exactly as GNU does: `hex  name`.
pub fn format_line(digest: &[u8], name: &str) -> String {
    format!("{}  {}", hex::encode(digest), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_bytes(algorithm: Algorithm, data: &[u8]) -> Vec<u8> {
        let mut hasher = algorithm.hasher();
        hasher.update(data);
        hasher.finish()
    }

    #[test]
    fn sha256_of_abc() {
        let digest = hash_bytes(Algorithm::Sha256, b"abc");
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn md5_of_empty() {
        let digest = hash_bytes(Algorithm::Md5, b"");
        assert_eq!(hex::encode(digest), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn sha1_of_abc() {
        let digest = hash_bytes(Algorithm::Sha1, b"abc");
        assert_eq!(
            hex::encode(digest),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn digest_lengths_match_output() {
        for alg in [
            Algorithm::Md5,
            Algorithm::Sha1,
            Algorithm::Sha224,
            Algorithm::Sha256,
            Algorithm::Sha384,
            Algorithm::Sha512,
            Algorithm::Blake2b,
        ] {
            assert_eq!(hash_bytes(alg, b"x").len(), alg.digest_len(), "{}", alg.name());
        }
    }

    #[test]
    fn hash_reader_matches_hash_bytes() {
        let data = vec![7u8; CHUNK * 2 + 13];
        let streamed = hash_reader(Algorithm::Sha512, &mut data.as_slice()).unwrap();
        assert_eq!(streamed, hash_bytes(Algorithm::Sha512, &data));
    }

    #[test]
    fn parse_check_line_accepts_text_and_binary_markers() {
        let hex = "d41d8cd98f00b204e9800998ecf8427e";
        let text = parse_check_line(&format!("{}  empty.txt", hex), Algorithm::Md5).unwrap();
        assert_eq!(text.name, "empty.txt");
        let bin = parse_check_line(&format!("{} *empty.bin", hex), Algorithm::Md5).unwrap();
        assert_eq!(bin.name, "empty.bin");
    }

    #[test]
    fn parse_check_line_rejects_wrong_length() {
        assert!(parse_check_line("abcd  file", Algorithm::Md5).is_none());
        assert!(parse_check_line("garbage", Algorithm::Md5).is_none());
    }

    #[test]
    fn format_line_uses_two_spaces() {
        assert_eq!(format_line(&[0xab, 0x01], "-"), "ab01  -");
    }
}
