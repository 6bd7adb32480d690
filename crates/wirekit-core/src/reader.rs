use crate::bounds;
use crate::endian::{Endian, Width};
use crate::error::WireError;

/// Sequential, bounds-checked decoder over a borrowed byte range.
///
/// Every consuming call is all-or-nothing: when fewer bytes remain than the
/// call needs it returns `WireError::OutOfBounds` and the cursor stays where
/// it was.
///
/// # Examples
/// ```
/// use wirekit_core::ProtocolReader;
///
/// let data = [0x00, 0x03, b'a', b'b', b'c', 0xff];
/// let mut reader = ProtocolReader::new(&data);
/// let len = reader.read_u16_be()? as usize;
/// let mut name = reader.slice(len)?;
/// assert_eq!(name.read_bytes(3)?, b"abc");
/// assert_eq!(reader.read_i8()?, -1);
/// assert_eq!(reader.available(), 0);
/// # Ok::<(), wirekit_core::WireError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProtocolReader<'a> {
    buffer: &'a [u8],
    start: usize,
    position: usize,
    end: usize,
}

impl<'a> ProtocolReader<'a> {
    /// Wrap the whole slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buffer: data,
            start: 0,
            position: 0,
            end: data.len(),
        }
    }

    /// Wrap `data[offset..offset + count]`.
    ///
    /// Fails with `WireError::InvalidRange` when the range falls outside
    /// `data`.
    pub fn with_range(data: &'a [u8], offset: usize, count: usize) -> Result<Self, WireError> {
        bounds::validate_range(data.len(), offset, count)?;
        Ok(Self {
            buffer: data,
            start: offset,
            position: offset,
            end: offset + count,
        })
    }

    /// Bytes left to read.
    pub fn available(&self) -> usize {
        self.end - self.position
    }

    /// Bytes consumed since construction.
    pub fn relative_position(&self) -> usize {
        self.position - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// The unread bytes, without consuming them.
    pub fn remaining(&self) -> &'a [u8] {
        &self.buffer[self.position..self.end]
    }

    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        let at = self.take(1)?;
        Ok(self.buffer[at])
    }

    pub fn read_i8(&mut self) -> Result<i8, WireError> {
        self.read_u8().map(|v| v as i8)
    }

    pub fn read_u16_be(&mut self) -> Result<u16, WireError> {
        self.read_uint(Width::W16, Endian::Big).map(|v| v as u16)
    }

    pub fn read_u16_le(&mut self) -> Result<u16, WireError> {
        self.read_uint(Width::W16, Endian::Little).map(|v| v as u16)
    }

    pub fn read_i16_be(&mut self) -> Result<i16, WireError> {
        self.read_int(Width::W16, Endian::Big).map(|v| v as i16)
    }

    pub fn read_i16_le(&mut self) -> Result<i16, WireError> {
        self.read_int(Width::W16, Endian::Little).map(|v| v as i16)
    }

    pub fn read_u24_be(&mut self) -> Result<u32, WireError> {
        self.read_uint(Width::W24, Endian::Big).map(|v| v as u32)
    }

    pub fn read_u24_le(&mut self) -> Result<u32, WireError> {
        self.read_uint(Width::W24, Endian::Little).map(|v| v as u32)
    }

    pub fn read_i24_be(&mut self) -> Result<i32, WireError> {
        self.read_int(Width::W24, Endian::Big).map(|v| v as i32)
    }

    pub fn read_i24_le(&mut self) -> Result<i32, WireError> {
        self.read_int(Width::W24, Endian::Little).map(|v| v as i32)
    }

    pub fn read_u32_be(&mut self) -> Result<u32, WireError> {
        self.read_uint(Width::W32, Endian::Big).map(|v| v as u32)
    }

    pub fn read_u32_le(&mut self) -> Result<u32, WireError> {
        self.read_uint(Width::W32, Endian::Little).map(|v| v as u32)
    }

    pub fn read_i32_be(&mut self) -> Result<i32, WireError> {
        self.read_int(Width::W32, Endian::Big).map(|v| v as i32)
    }

    pub fn read_i32_le(&mut self) -> Result<i32, WireError> {
        self.read_int(Width::W32, Endian::Little).map(|v| v as i32)
    }

    pub fn read_u64_be(&mut self) -> Result<u64, WireError> {
        self.read_uint(Width::W64, Endian::Big)
    }

    pub fn read_u64_le(&mut self) -> Result<u64, WireError> {
        self.read_uint(Width::W64, Endian::Little)
    }

    pub fn read_i64_be(&mut self) -> Result<i64, WireError> {
        self.read_int(Width::W64, Endian::Big)
    }

    pub fn read_i64_le(&mut self) -> Result<i64, WireError> {
        self.read_int(Width::W64, Endian::Little)
    }

    /// Copy the next `count` bytes into a new vector.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, WireError> {
        self.read_slice(count).map(<[u8]>::to_vec)
    }

    /// Borrow the next `count` bytes without copying.
    pub fn read_slice(&mut self, count: usize) -> Result<&'a [u8], WireError> {
        let at = self.take(count)?;
        Ok(&self.buffer[at..at + count])
    }

    /// Carve a child reader over the next `count` bytes and step past them.
    ///
    /// The child shares this reader's storage, starts at its own relative
    /// position zero and is unaffected by later reads on the parent.
    pub fn slice(&mut self, count: usize) -> Result<ProtocolReader<'a>, WireError> {
        let at = self.take(count)?;
        Ok(ProtocolReader {
            buffer: self.buffer,
            start: at,
            position: at,
            end: at + count,
        })
    }

    pub fn skip(&mut self, count: usize) -> Result<(), WireError> {
        self.take(count).map(|_| ())
    }

    fn read_uint(&mut self, width: Width, endian: Endian) -> Result<u64, WireError> {
        let at = self.take(width.bytes())?;
        endian.read_uint(self.buffer, at, width)
    }

    fn read_int(&mut self, width: Width, endian: Endian) -> Result<i64, WireError> {
        let at = self.take(width.bytes())?;
        endian.read_int(self.buffer, at, width)
    }

    /// Reserve `count` bytes at the cursor and return where they start.
    fn take(&mut self, count: usize) -> Result<usize, WireError> {
        let available = self.available();
        if count > available {
            return Err(WireError::OutOfBounds {
                offset: self.relative_position(),
                needed: count,
                available,
            });
        }
        let at = self.position;
        self.position += count;
        Ok(at)
    }
}

#[cfg(test)]
mod tests {
    use super::ProtocolReader;
    use crate::error::WireError;

    #[test]
    fn reads_mixed_primitives_in_order() {
        let data = [
            0x7f, // u8
            0xfe, // i8
            0x12, 0x34, // u16 be
            0x34, 0x12, // u16 le
            0xff, 0xff, 0xfe, // i24 be
            0x01, 0x00, 0x00, 0x80, // i32 le
            0, 0, 0, 0, 0, 0, 0, 42, // u64 be
        ];
        let mut reader = ProtocolReader::new(&data);
        assert_eq!(reader.read_u8().unwrap(), 0x7f);
        assert_eq!(reader.read_i8().unwrap(), -2);
        assert_eq!(reader.read_u16_be().unwrap(), 0x1234);
        assert_eq!(reader.read_u16_le().unwrap(), 0x1234);
        assert_eq!(reader.read_i24_be().unwrap(), -2);
        assert_eq!(reader.read_i32_le().unwrap(), i32::MIN + 1);
        assert_eq!(reader.read_u64_be().unwrap(), 42);
        assert!(reader.is_empty());
        assert_eq!(reader.relative_position(), data.len());
    }

    #[test]
    fn little_endian_signed_variants() {
        let data = [0xfe, 0xff, 0x00, 0x00, 0x80, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        let mut reader = ProtocolReader::new(&data);
        assert_eq!(reader.read_i16_le().unwrap(), -2);
        assert_eq!(reader.read_i24_le().unwrap(), -8_388_608);
        assert_eq!(reader.read_i64_le().unwrap(), -1);
    }

    #[test]
    fn failed_read_does_not_advance() {
        let data = [1, 2, 3];
        let mut reader = ProtocolReader::new(&data);
        reader.read_u8().unwrap();
        let before = reader.available();
        let err = reader.read_u32_be().unwrap_err();
        assert_eq!(
            err,
            WireError::OutOfBounds {
                offset: 1,
                needed: 4,
                available: 2
            }
        );
        assert_eq!(reader.available(), before);
        assert_eq!(reader.read_u16_be().unwrap(), 0x0203);
    }

    #[test]
    fn failed_bulk_reads_do_not_advance() {
        let data = [9u8; 4];
        let mut reader = ProtocolReader::new(&data);
        assert!(reader.read_bytes(5).is_err());
        assert!(reader.slice(5).is_err());
        assert!(reader.skip(5).is_err());
        assert_eq!(reader.available(), 4);
        assert_eq!(reader.relative_position(), 0);
    }

    #[test]
    fn with_range_limits_view() {
        let data = [0xaa, 0x01, 0x02, 0xbb];
        let mut reader = ProtocolReader::with_range(&data, 1, 2).unwrap();
        assert_eq!(reader.available(), 2);
        assert_eq!(reader.read_u16_be().unwrap(), 0x0102);
        assert_eq!(reader.relative_position(), 2);
        assert!(reader.read_u8().is_err());
    }

    #[test]
    fn with_range_rejects_out_of_bounds() {
        let data = [0u8; 4];
        let err = ProtocolReader::with_range(&data, 3, 2).unwrap_err();
        assert_eq!(
            err,
            WireError::InvalidRange {
                offset: 3,
                count: 2,
                len: 4
            }
        );
        assert!(ProtocolReader::with_range(&data, 5, 0).is_err());
        assert!(ProtocolReader::with_range(&data, 4, 0).is_ok());
    }

    #[test]
    fn slice_is_independent_of_parent() {
        let data = [1, 2, 3, 4, 5, 6];
        let mut parent = ProtocolReader::new(&data);
        parent.read_u8().unwrap();
        let mut child = parent.slice(3).unwrap();
        assert_eq!(parent.relative_position(), 4);
        assert_eq!(child.available(), 3);
        assert_eq!(child.relative_position(), 0);

        assert_eq!(parent.read_u16_be().unwrap(), 0x0506);
        assert_eq!(child.read_bytes(3).unwrap(), vec![2, 3, 4]);
        assert!(child.read_u8().is_err());
    }

    #[test]
    fn slice_matches_direct_reads() {
        let data: Vec<u8> = (0..32).collect();
        let mut direct = ProtocolReader::new(&data);
        direct.skip(5).unwrap();
        let expected = direct.read_bytes(10).unwrap();

        let mut parent = ProtocolReader::new(&data);
        parent.skip(5).unwrap();
        let mut child = parent.slice(10).unwrap();
        assert_eq!(child.read_bytes(10).unwrap(), expected);
        assert_eq!(parent.relative_position(), 15);
    }

    #[test]
    fn nested_slices() {
        let data = [0, 2, 0xab, 0xcd, 0xef];
        let mut outer = ProtocolReader::new(&data);
        let mut record = outer.slice(4).unwrap();
        let len = record.read_u16_be().unwrap() as usize;
        let mut inner = record.slice(len).unwrap();
        assert_eq!(inner.read_u16_be().unwrap(), 0xabcd);
        assert!(record.is_empty());
        assert_eq!(outer.read_u8().unwrap(), 0xef);
    }

    #[test]
    fn read_slice_borrows_and_remaining_peeks() {
        let data = *b"headbody";
        let mut reader = ProtocolReader::new(&data);
        assert_eq!(reader.read_slice(4).unwrap(), b"head");
        assert_eq!(reader.remaining(), b"body");
        assert_eq!(reader.available(), 4);
    }

    #[test]
    fn zero_length_operations_succeed_at_end() {
        let data: [u8; 0] = [];
        let mut reader = ProtocolReader::new(&data);
        assert!(reader.read_bytes(0).unwrap().is_empty());
        assert!(reader.slice(0).unwrap().is_empty());
        assert!(reader.read_u8().is_err());
    }
}
