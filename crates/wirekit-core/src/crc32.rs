//! Streaming CRC-32 (ISO-HDLC: reflected polynomial `0xEDB88320`, initial
//! state and final XOR `0xFFFFFFFF`).

use std::io;

use crate::bounds;
use crate::error::WireError;

const POLYNOMIAL: u32 = 0xedb8_8320;
const INITIAL_STATE: u32 = 0xffff_ffff;

static TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = i as u32;
        let mut bit = 0;
        while bit < 8 {
            c = if c & 1 != 0 { POLYNOMIAL ^ (c >> 1) } else { c >> 1 };
            bit += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
}

/// Rolling CRC-32 accumulator.
///
/// Reading [`Crc32::value`] does not finalize the state, so more data can be
/// fed afterwards and the checksum keeps covering every byte seen so far.
///
/// # Examples
/// ```
/// use wirekit_core::Crc32;
///
/// let mut crc = Crc32::new();
/// crc.update(b"12345");
/// crc.update(b"6789");
/// assert_eq!(crc.value(), 0xcbf4_3926);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Self {
            state: INITIAL_STATE,
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        let mut state = self.state;
        for &byte in data {
            state = TABLE[((state ^ u32::from(byte)) & 0xff) as usize] ^ (state >> 8);
        }
        self.state = state;
    }

    /// Feed `data[offset..offset + count]`.
    ///
    /// The span is validated before any byte is processed.
    pub fn update_range(
        &mut self,
        data: &[u8],
        offset: usize,
        count: usize,
    ) -> Result<(), WireError> {
        bounds::validate_range(data.len(), offset, count)?;
        self.update(&data[offset..offset + count]);
        Ok(())
    }

    pub fn value(&self) -> u32 {
        self.state ^ INITIAL_STATE
    }

    pub fn reset(&mut self) {
        self.state = INITIAL_STATE;
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl io::Write for Crc32 {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// CRC-32 of a complete byte slice.
///
/// # Examples
/// ```
/// assert_eq!(wirekit_core::crc32(b"123456789"), 0xcbf4_3926);
/// ```
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(data);
    crc.value()
}
