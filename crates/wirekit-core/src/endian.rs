//! Big- and little-endian integer codec.
//!
//! All operations work on a byte slice at an explicit offset and return
//! `WireError::OutOfBounds` instead of panicking when the field does not fit.
//! Values travel through `u64`/`i64`; the typed helpers narrow them to the
//! Rust type that carries each width (24-bit fields use `u32`/`i32`).
//!
//! Writes keep only the low `width * 8` bits of the value. Signed reads
//! sign-extend from the top bit of the field, so `80 00 00` read as a 24-bit
//! big-endian signed value is `-8388608`.

use crate::bounds;
use crate::error::WireError;

/// Byte order of a multi-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

/// Width of an encoded integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    W8,
    W16,
    W24,
    W32,
    W64,
}

impl Width {
    /// Number of bytes the field occupies.
    pub const fn bytes(self) -> usize {
        match self {
            Width::W8 => 1,
            Width::W16 => 2,
            Width::W24 => 3,
            Width::W32 => 4,
            Width::W64 => 8,
        }
    }

    pub const fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }

    /// Largest unsigned value the field can hold.
    pub const fn unsigned_max(self) -> u64 {
        u64::MAX >> (64 - self.bits())
    }

    /// Largest non-negative value a signed field of this width can hold.
    pub const fn signed_max(self) -> u64 {
        u64::MAX >> (65 - self.bits())
    }
}

impl Endian {
    /// Read an unsigned field, zero-extended to `u64`.
    ///
    /// # Examples
    /// ```
    /// use wirekit_core::{Endian, Width};
    ///
    /// let bytes = [0x12, 0x34, 0x56];
    /// assert_eq!(Endian::Big.read_uint(&bytes, 0, Width::W24).unwrap(), 0x123456);
    /// assert_eq!(Endian::Little.read_uint(&bytes, 0, Width::W24).unwrap(), 0x563412);
    /// ```
    pub fn read_uint(self, buf: &[u8], offset: usize, width: Width) -> Result<u64, WireError> {
        let len = width.bytes();
        bounds::require(buf.len(), offset, len)?;
        let field = &buf[offset..offset + len];
        let value = match self {
            Endian::Big => field
                .iter()
                .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte)),
            Endian::Little => field
                .iter()
                .rev()
                .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte)),
        };
        Ok(value)
    }

    /// Read a signed field, sign-extended from its top bit to `i64`.
    ///
    /// # Examples
    /// ```
    /// use wirekit_core::{Endian, Width};
    ///
    /// let bytes = [0x80, 0x00, 0x00];
    /// assert_eq!(Endian::Big.read_int(&bytes, 0, Width::W24).unwrap(), -8_388_608);
    /// ```
    pub fn read_int(self, buf: &[u8], offset: usize, width: Width) -> Result<i64, WireError> {
        let raw = self.read_uint(buf, offset, width)?;
        let shift = 64 - width.bits();
        Ok(((raw << shift) as i64) >> shift)
    }

    /// Write the low `width * 8` bits of `value`; higher bits are dropped.
    pub fn write_uint(
        self,
        buf: &mut [u8],
        offset: usize,
        width: Width,
        value: u64,
    ) -> Result<(), WireError> {
        let len = width.bytes();
        bounds::require(buf.len(), offset, len)?;
        self.encode(&mut buf[offset..offset + len], value);
        Ok(())
    }

    /// Fill `field` with the low `field.len()` bytes of `value`.
    pub(crate) fn encode(self, field: &mut [u8], value: u64) {
        let len = field.len();
        for (index, slot) in field.iter_mut().enumerate() {
            let shift = match self {
                Endian::Big => 8 * (len - 1 - index),
                Endian::Little => 8 * index,
            };
            *slot = (value >> shift) as u8;
        }
    }

    /// Write a signed value as its two's complement low bits.
    pub fn write_int(
        self,
        buf: &mut [u8],
        offset: usize,
        width: Width,
        value: i64,
    ) -> Result<(), WireError> {
        self.write_uint(buf, offset, width, value as u64)
    }

    pub fn read_u16(self, buf: &[u8], offset: usize) -> Result<u16, WireError> {
        self.read_uint(buf, offset, Width::W16).map(|v| v as u16)
    }

    pub fn read_i16(self, buf: &[u8], offset: usize) -> Result<i16, WireError> {
        self.read_int(buf, offset, Width::W16).map(|v| v as i16)
    }

    pub fn read_u24(self, buf: &[u8], offset: usize) -> Result<u32, WireError> {
        self.read_uint(buf, offset, Width::W24).map(|v| v as u32)
    }

    pub fn read_i24(self, buf: &[u8], offset: usize) -> Result<i32, WireError> {
        self.read_int(buf, offset, Width::W24).map(|v| v as i32)
    }

    pub fn read_u32(self, buf: &[u8], offset: usize) -> Result<u32, WireError> {
        self.read_uint(buf, offset, Width::W32).map(|v| v as u32)
    }

    pub fn read_i32(self, buf: &[u8], offset: usize) -> Result<i32, WireError> {
        self.read_int(buf, offset, Width::W32).map(|v| v as i32)
    }

    pub fn read_u64(self, buf: &[u8], offset: usize) -> Result<u64, WireError> {
        self.read_uint(buf, offset, Width::W64)
    }

    pub fn read_i64(self, buf: &[u8], offset: usize) -> Result<i64, WireError> {
        self.read_int(buf, offset, Width::W64)
    }

    pub fn write_u16(self, buf: &mut [u8], offset: usize, value: u16) -> Result<(), WireError> {
        self.write_uint(buf, offset, Width::W16, u64::from(value))
    }

    pub fn write_i16(self, buf: &mut [u8], offset: usize, value: i16) -> Result<(), WireError> {
        self.write_int(buf, offset, Width::W16, i64::from(value))
    }

    /// Write the low 24 bits of `value`.
    pub fn write_u24(self, buf: &mut [u8], offset: usize, value: u32) -> Result<(), WireError> {
        self.write_uint(buf, offset, Width::W24, u64::from(value))
    }

    /// Write the low 24 bits of `value` (two's complement).
    pub fn write_i24(self, buf: &mut [u8], offset: usize, value: i32) -> Result<(), WireError> {
        self.write_int(buf, offset, Width::W24, i64::from(value))
    }

    pub fn write_u32(self, buf: &mut [u8], offset: usize, value: u32) -> Result<(), WireError> {
        self.write_uint(buf, offset, Width::W32, u64::from(value))
    }

    pub fn write_i32(self, buf: &mut [u8], offset: usize, value: i32) -> Result<(), WireError> {
        self.write_int(buf, offset, Width::W32, i64::from(value))
    }

    pub fn write_u64(self, buf: &mut [u8], offset: usize, value: u64) -> Result<(), WireError> {
        self.write_uint(buf, offset, Width::W64, value)
    }

    pub fn write_i64(self, buf: &mut [u8], offset: usize, value: i64) -> Result<(), WireError> {
        self.write_int(buf, offset, Width::W64, value)
    }
}
