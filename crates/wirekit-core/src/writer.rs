use tracing::trace;

use crate::endian::{Endian, Width};
use crate::error::WireError;
use crate::placeholder::{FieldKind, FieldValue, Placeholder};

/// Capacity a writer starts with unless configured otherwise.
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

/// Construction options for [`ProtocolWriter`].
///
/// # Examples
/// ```
/// use wirekit_core::{ProtocolWriter, WriterOptions};
///
/// let writer = ProtocolWriter::with_options(WriterOptions { initial_capacity: 64 });
/// assert_eq!(writer.capacity(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// Starting buffer size in bytes. Zero is treated as one.
    pub initial_capacity: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

/// Append-only encoder over an auto-growing buffer.
///
/// The buffer doubles whenever an operation would not fit. Growth keeps every
/// byte at its logical offset, which is what lets [`Placeholder`]s reserved
/// earlier be filled in later. Write and mark operations never fail.
///
/// # Examples
/// ```
/// use wirekit_core::{ProtocolReader, ProtocolWriter};
///
/// let mut writer = ProtocolWriter::new();
/// let len = writer.mark_u24_be();
/// writer.write_i16_le(-3);
/// writer.write_bytes(b"xyz");
/// len.close(&mut writer)?;
///
/// let mut reader = ProtocolReader::new(writer.data());
/// assert_eq!(reader.read_u24_be()?, 5);
/// assert_eq!(reader.read_i16_le()?, -3);
/// # Ok::<(), wirekit_core::WireError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProtocolWriter {
    buffer: Vec<u8>,
    len: usize,
}

impl ProtocolWriter {
    pub fn new() -> Self {
        Self::with_options(WriterOptions::default())
    }

    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self::with_options(WriterOptions { initial_capacity })
    }

    pub fn with_options(options: WriterOptions) -> Self {
        Self {
            buffer: vec![0; options.initial_capacity.max(1)],
            len: 0,
        }
    }

    /// Logical length, which is also the offset of the next write.
    pub fn position(&self) -> usize {
        self.len
    }

    /// Allocated buffer size.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrow the written bytes.
    pub fn data(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Copy the written bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data().to_vec()
    }

    /// Consume the writer and keep only the written bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buffer.truncate(self.len);
        self.buffer
    }

    /// Forget everything written, keeping the allocation.
    ///
    /// Old bytes are not cleared. Placeholders obtained before the reset must
    /// not be used afterwards.
    pub fn reset(&mut self) {
        self.len = 0;
    }

    pub fn write_u8(&mut self, value: u8) {
        self.put(Width::W8, Endian::Big, u64::from(value));
    }

    pub fn write_i8(&mut self, value: i8) {
        self.put(Width::W8, Endian::Big, value.to_bits());
    }

    pub fn write_u16_be(&mut self, value: u16) {
        self.put(Width::W16, Endian::Big, u64::from(value));
    }

    pub fn write_u16_le(&mut self, value: u16) {
        self.put(Width::W16, Endian::Little, u64::from(value));
    }

    pub fn write_i16_be(&mut self, value: i16) {
        self.put(Width::W16, Endian::Big, value.to_bits());
    }

    pub fn write_i16_le(&mut self, value: i16) {
        self.put(Width::W16, Endian::Little, value.to_bits());
    }

    /// Write the low 24 bits of `value`.
    pub fn write_u24_be(&mut self, value: u32) {
        self.put(Width::W24, Endian::Big, u64::from(value));
    }

    /// Write the low 24 bits of `value`.
    pub fn write_u24_le(&mut self, value: u32) {
        self.put(Width::W24, Endian::Little, u64::from(value));
    }

    pub fn write_i24_be(&mut self, value: i32) {
        self.put(Width::W24, Endian::Big, value.to_bits());
    }

    pub fn write_i24_le(&mut self, value: i32) {
        self.put(Width::W24, Endian::Little, value.to_bits());
    }

    pub fn write_u32_be(&mut self, value: u32) {
        self.put(Width::W32, Endian::Big, u64::from(value));
    }

    pub fn write_u32_le(&mut self, value: u32) {
        self.put(Width::W32, Endian::Little, u64::from(value));
    }

    pub fn write_i32_be(&mut self, value: i32) {
        self.put(Width::W32, Endian::Big, value.to_bits());
    }

    pub fn write_i32_le(&mut self, value: i32) {
        self.put(Width::W32, Endian::Little, value.to_bits());
    }

    pub fn write_u64_be(&mut self, value: u64) {
        self.put(Width::W64, Endian::Big, value);
    }

    pub fn write_u64_le(&mut self, value: u64) {
        self.put(Width::W64, Endian::Little, value);
    }

    pub fn write_i64_be(&mut self, value: i64) {
        self.put(Width::W64, Endian::Big, value.to_bits());
    }

    pub fn write_i64_le(&mut self, value: i64) {
        self.put(Width::W64, Endian::Little, value.to_bits());
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        let at = self.reserve(data.len());
        self.buffer[at..at + data.len()].copy_from_slice(data);
    }

    pub fn mark_u8(&mut self) -> Placeholder<u8> {
        self.mark(Width::W8, Endian::Big, false)
    }

    pub fn mark_i8(&mut self) -> Placeholder<i8> {
        self.mark(Width::W8, Endian::Big, true)
    }

    pub fn mark_u16_be(&mut self) -> Placeholder<u16> {
        self.mark(Width::W16, Endian::Big, false)
    }

    pub fn mark_u16_le(&mut self) -> Placeholder<u16> {
        self.mark(Width::W16, Endian::Little, false)
    }

    pub fn mark_i16_be(&mut self) -> Placeholder<i16> {
        self.mark(Width::W16, Endian::Big, true)
    }

    pub fn mark_i16_le(&mut self) -> Placeholder<i16> {
        self.mark(Width::W16, Endian::Little, true)
    }

    pub fn mark_u24_be(&mut self) -> Placeholder<u32> {
        self.mark(Width::W24, Endian::Big, false)
    }

    pub fn mark_u24_le(&mut self) -> Placeholder<u32> {
        self.mark(Width::W24, Endian::Little, false)
    }

    pub fn mark_i24_be(&mut self) -> Placeholder<i32> {
        self.mark(Width::W24, Endian::Big, true)
    }

    pub fn mark_i24_le(&mut self) -> Placeholder<i32> {
        self.mark(Width::W24, Endian::Little, true)
    }

    pub fn mark_u32_be(&mut self) -> Placeholder<u32> {
        self.mark(Width::W32, Endian::Big, false)
    }

    pub fn mark_u32_le(&mut self) -> Placeholder<u32> {
        self.mark(Width::W32, Endian::Little, false)
    }

    pub fn mark_i32_be(&mut self) -> Placeholder<i32> {
        self.mark(Width::W32, Endian::Big, true)
    }

    pub fn mark_i32_le(&mut self) -> Placeholder<i32> {
        self.mark(Width::W32, Endian::Little, true)
    }

    pub fn mark_u64_be(&mut self) -> Placeholder<u64> {
        self.mark(Width::W64, Endian::Big, false)
    }

    pub fn mark_u64_le(&mut self) -> Placeholder<u64> {
        self.mark(Width::W64, Endian::Little, false)
    }

    pub fn mark_i64_be(&mut self) -> Placeholder<i64> {
        self.mark(Width::W64, Endian::Big, true)
    }

    pub fn mark_i64_le(&mut self) -> Placeholder<i64> {
        self.mark(Width::W64, Endian::Little, true)
    }

    /// Overwrite an already reserved field in place.
    pub(crate) fn patch(
        &mut self,
        offset: usize,
        kind: FieldKind,
        bits: u64,
    ) -> Result<(), WireError> {
        kind.endian.write_uint(&mut self.buffer, offset, kind.width, bits)
    }

    fn mark<T: FieldValue>(
        &mut self,
        width: Width,
        endian: Endian,
        signed: bool,
    ) -> Placeholder<T> {
        let at = self.reserve(width.bytes());
        Placeholder::new(at, FieldKind::new(width, endian, signed))
    }

    fn put(&mut self, width: Width, endian: Endian, bits: u64) {
        let len = width.bytes();
        let at = self.reserve(len);
        endian.encode(&mut self.buffer[at..at + len], bits);
    }

    /// Claim `count` bytes at the end, growing first if needed.
    fn reserve(&mut self, count: usize) -> usize {
        self.grow_to_accommodate(count);
        let at = self.len;
        self.len += count;
        at
    }

    fn grow_to_accommodate(&mut self, count: usize) {
        let required = self.len.saturating_add(count);
        let current = self.buffer.len();
        if required <= current {
            return;
        }
        let mut capacity = current;
        while capacity < required {
            capacity = capacity.saturating_mul(2);
        }
        trace!(from = current, to = capacity, "growing writer buffer");
        self.buffer.resize(capacity, 0);
    }
}

impl Default for ProtocolWriter {
    fn default() -> Self {
        Self::new()
    }
}
