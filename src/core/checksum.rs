//! Non-cryptographic checksums: CRC-32 (IEEE), the POSIX `cksum` CRC and
//! the BSD / System V `sum` algorithms.

const IEEE_REFLECTED: u32 = 0xEDB8_8320;
const POSIX_POLY: u32 = 0x04C1_1DB7;

const fn ieee_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ IEEE_REFLECTED
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

const fn posix_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ POSIX_POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

static IEEE: [u32; 256] = ieee_table();
static POSIX: [u32; 256] = posix_table();

/// CRC-32 as used by zip, PNG and `checksum`.
#[derive(Debug, Clone)]
pub struct Crc32 {
    state: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    pub fn new() -> Self {
        Self { state: 0xFFFF_FFFF }
    }

    pub fn update(&mut self, data: &[u8]) {
        let mut crc = self.state;
        for &b in data {
            crc = (crc >> 8) ^ IEEE[((crc ^ b as u32) & 0xFF) as usize];
        }
        self.state = crc;
    }

    pub fn finish(&self) -> u32 {
        !self.state
    }
}

/// The POSIX `cksum` CRC: MSB-first CRC over the data, then over the
/// length in as few bytes as needed (low byte first), then inverted.
#[derive(Debug, Clone, Default)]
pub struct Cksum {
    state: u32,
    len: u64,
}

impl Cksum {
    pub fn new() -> Self {
        Self::default()
    }

    fn step(crc: u32, byte: u8) -> u32 {
        (crc << 8) ^ POSIX[(((crc >> 24) ^ byte as u32) & 0xFF) as usize]
    }

    pub fn update(&mut self, data: &[u8]) {
        let mut crc = self.state;
        for &b in data {
            crc = Self::step(crc, b);
        }
        self.state = crc;
        self.len += data.len() as u64;
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn finish(&self) -> u32 {
        let mut crc = self.state;
        let mut n = self.len;
        while n != 0 {
            crc = Self::step(crc, (n & 0xFF) as u8);
            n >>= 8;
        }
        !crc
    }
}

/// BSD `sum`: rotate right one bit, then add, in 16 bits.
#[derive(Debug, Clone, Default)]
pub struct BsdSum {
    state: u16,
    len: u64,
}

impl BsdSum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        let mut sum = self.state;
        for &b in data {
            sum = sum.rotate_right(1).wrapping_add(b as u16);
        }
        self.state = sum;
        self.len += data.len() as u64;
    }

    pub fn checksum(&self) -> u16 {
        self.state
    }

    /// Size in 1024-byte blocks, rounded up.
    pub fn blocks(&self) -> u64 {
        self.len.div_ceil(1024)
    }
}

/// System V `sum`: byte sum folded to 16 bits.
#[derive(Debug, Clone, Default)]
pub struct SysvSum {
    total: u64,
    len: u64,
}

impl SysvSum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        for &b in data {
            self.total = self.total.wrapping_add(b as u64);
        }
        self.len += data.len() as u64;
    }

    pub fn checksum(&self) -> u16 {
        let s = self.total & 0xFFFF_FFFF;
        let r = (s & 0xFFFF) + (s >> 16);
        ((r & 0xFFFF) + (r >> 16)) as u16
    }

    /// Size in 512-byte blocks, rounded up.
    pub fn blocks(&self) -> u64 {
        self.len.div_ceil(512)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crc32(data: &[u8]) -> u32 {
        let mut c = Crc32::new();
        c.update(data);
        c.finish()
    }

    #[test]
    fn crc32_check_value() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32(b""), 0);
    }

    #[test]
    fn crc32_streams_in_pieces() {
        let mut c = Crc32::new();
        c.update(b"1234");
        c.update(b"56789");
        assert_eq!(c.finish(), 0xCBF4_3926);
    }

    #[test]
    fn cksum_of_empty_input() {
        let c = Cksum::new();
        assert_eq!(c.finish(), 4_294_967_295);
        assert_eq!(c.len(), 0);
    }

    #[test]
    fn cksum_check_value() {
        let mut c = Cksum::new();
        c.update(b"123456789");
        assert_eq!(c.finish(), 930_766_865);
        assert_eq!(c.len(), 9);
    }

    #[test]
    fn cksum_detects_single_byte_change() {
        let mut a = Cksum::new();
        a.update(b"hello world");
        let mut b = Cksum::new();
        b.update(b"hello worle");
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn bsd_sum_rotates_then_adds() {
        let mut s = BsdSum::new();
        s.update(b"ab");
        // 'a' = 97; rotate(97) = 0x8030 + 98
        assert_eq!(s.checksum(), 0x8030u16.wrapping_add(98));
        assert_eq!(s.blocks(), 1);
    }

    #[test]
    fn sysv_sum_folds() {
        let mut s = SysvSum::new();
        s.update(b"abc");
        assert_eq!(s.checksum(), 97 + 98 + 99);
        assert_eq!(s.blocks(), 1);
    }
}
