//! Text encodings the `base*` tools share: RFC 4648 base32, Bitcoin
//! base58 (plain and check) and line wrapping of encoded output.

use crate::error::{Error, Result};
use crate::hash::sha256;

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

pub const BASE58_ALPHABET: &[u8; 58] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Standard padded base32.
pub fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(5) * 8);
    for chunk in data.chunks(5) {
        let mut block = [0u8; 5];
        block[..chunk.len()].copy_from_slice(chunk);
        let bits = block.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);
        let emitted = (chunk.len() * 8).div_ceil(5);
        for i in 0..8 {
            if i < emitted {
                let index = (bits >> (35 - i * 5)) & 0x1f;
                out.push(BASE32_ALPHABET[index as usize] as char);
            } else {
                out.push('=');
            }
        }
    }
    out
}

pub fn base32_decode(text: &str) -> Result<Vec<u8>> {
    let invalid = || Error::invalid_value("base32 input", text);
    let trimmed = text.trim_end_matches('=');
    let mut out = Vec::with_capacity(trimmed.len() * 5 / 8);
    let mut buffer: u64 = 0;
    let mut bits = 0;
    for c in trimmed.bytes() {
        let value = BASE32_ALPHABET
            .iter()
            .position(|&a| a == c.to_ascii_uppercase())
            .ok_or_else(invalid)?;
        buffer = (buffer << 5) | value as u64;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }
    if bits >= 5 || buffer != 0 {
        return Err(invalid());
    }
    Ok(out)
}

/// Base58 keeps leading zero bytes as leading `1`s.
pub fn base58_encode(data: &[u8]) -> String {
    let zeros = data.iter().take_while(|&&b| b == 0).count();
    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 138 / 100 + 1);
    for &byte in &data[zeros..] {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }
    let mut out = String::with_capacity(zeros + digits.len());
    out.extend(std::iter::repeat('1').take(zeros));
    out.extend(digits.iter().rev().map(|&d| BASE58_ALPHABET[d as usize] as char));
    out
}

pub fn base58_decode(text: &str) -> Result<Vec<u8>> {
    let zeros = text.bytes().take_while(|&b| b == b'1').count();
    let mut bytes: Vec<u8> = Vec::with_capacity(text.len());
    for c in text.bytes().skip(zeros) {
        let value = BASE58_ALPHABET
            .iter()
            .position(|&a| a == c)
            .ok_or_else(|| Error::invalid_value("base58 character", (c as char).to_string()))?;
        let mut carry = value as u32;
        for byte in bytes.iter_mut() {
            carry += (*byte as u32) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }
    let mut out = vec![0u8; zeros];
    out.extend(bytes.iter().rev());
    Ok(out)
}

fn check_sum(payload: &[u8]) -> [u8; 4] {
    let twice = sha256(&sha256(payload));
    [twice[0], twice[1], twice[2], twice[3]]
}

/// Base58Check: payload followed by the first four bytes of
/// SHA-256(SHA-256(payload)).
pub fn base58check_encode(payload: &[u8]) -> String {
    let mut data = payload.to_vec();
    data.extend_from_slice(&check_sum(payload));
    base58_encode(&data)
}

pub fn base58check_decode(text: &str) -> Result<Vec<u8>> {
    let data = base58_decode(text)?;
    if data.len() < 4 {
        return Err(Error::invalid_value("base58check input", text));
    }
    let (payload, sum) = data.split_at(data.len() - 4);
    if sum != check_sum(payload) {
        return Err(Error::invalid_value("base58check checksum", text));
    }
    Ok(payload.to_vec())
}

/// Break `text` into lines of `width` characters; 0 disables wrapping.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.is_empty() {
        return vec![text.to_string()];
    }
    text.as_bytes()
        .chunks(width)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect()
}

pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base32_rfc_vectors() {
        let cases = [
            ("", ""),
            ("f", "MY======"),
            ("fo", "MZXQ===="),
            ("foo", "MZXW6==="),
            ("foob", "MZXW6YQ="),
            ("fooba", "MZXW6YTB"),
            ("foobar", "MZXW6YTBOI======"),
        ];
        for (plain, encoded) in cases {
            assert_eq!(base32_encode(plain.as_bytes()), encoded);
            assert_eq!(base32_decode(encoded).unwrap(), plain.as_bytes());
        }
    }

    #[test]
    fn base32_rejects_garbage() {
        assert!(base32_decode("MZ!W6===").is_err());
    }

    #[test]
    fn base58_known_values() {
        assert_eq!(base58_encode(b"hello world"), "StV1DL6CwTryKyV");
        assert_eq!(base58_encode(&[0, 0, 1]), "112");
        assert_eq!(base58_decode("112").unwrap(), vec![0, 0, 1]);
        assert!(base58_decode("0OIl").is_err());
    }

    #[test]
    fn base58check_detects_corruption() {
        let encoded = base58check_encode(b"payload");
        assert_eq!(base58check_decode(&encoded).unwrap(), b"payload");
        let mut corrupted = encoded.into_bytes();
        let last = corrupted.len() - 1;
        corrupted[last] = if corrupted[last] == b'2' { b'3' } else { b'2' };
        let corrupted = String::from_utf8(corrupted).unwrap();
        assert!(base58check_decode(&corrupted).is_err());
    }

    #[test]
    fn wrap_widths() {
        assert_eq!(wrap("abcdefg", 3), vec!["abc", "def", "g"]);
        assert_eq!(wrap("abc", 0), vec!["abc"]);
        assert_eq!(wrap("", 4), vec![""]);
    }
}
