use std::io::{self, Read};

use super::error::ContainerError;
use super::layout;
use crate::error::WireError;
use crate::io::read_exact_or_eof;
use crate::reader::ProtocolReader;

/// Fixed header fields, unvalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawHeader {
    pub magic: [u8; 4],
    pub version: u8,
    pub flags: u8,
    pub created_at: i64,
    pub entry_count: u32,
}

/// One record as laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub name: &'a [u8],
    pub payload: &'a [u8],
    pub stored_crc: u32,
}

/// Container byte conventions on top of [`ProtocolReader`].
pub struct ContainerReader<'a> {
    inner: ProtocolReader<'a>,
}

impl<'a> ContainerReader<'a> {
    /// `body` is the container without its trailer.
    pub fn new(body: &'a [u8]) -> Self {
        Self {
            inner: ProtocolReader::new(body),
        }
    }

    pub fn available(&self) -> usize {
        self.inner.available()
    }

    pub fn read_header(&mut self) -> Result<RawHeader, ContainerError> {
        Ok(RawHeader {
            magic: self.inner.read_u32_be()?.to_be_bytes(),
            version: self.inner.read_u8()?,
            flags: self.inner.read_u8()?,
            created_at: self.inner.read_i64_be()?,
            entry_count: self.inner.read_u32_be()?,
        })
    }

    /// Read the record at `index`, checking that its fields fill exactly the
    /// length it declares.
    pub fn read_record(&mut self, index: u32) -> Result<RawRecord<'a>, ContainerError> {
        let declared = self.inner.read_u32_be()? as usize;
        let mut record = self.inner.slice(declared)?;
        let raw = Self::read_record_fields(&mut record).map_err(|err| match err {
            WireError::OutOfBounds { offset, needed, .. } => ContainerError::RecordLength {
                index,
                declared,
                used: offset + needed,
            },
            other => other.into(),
        })?;
        if !record.is_empty() {
            return Err(ContainerError::RecordLength {
                index,
                declared,
                used: record.relative_position(),
            });
        }
        Ok(raw)
    }

    fn read_record_fields(
        record: &mut ProtocolReader<'a>,
    ) -> Result<RawRecord<'a>, WireError> {
        let name_len = usize::from(record.read_u16_be()?);
        let name = record.read_slice(name_len)?;
        let payload_len = record.read_u32_le()? as usize;
        let payload = record.read_slice(payload_len)?;
        let stored_crc = record.read_u32_be()?;
        Ok(RawRecord {
            name,
            payload,
            stored_crc,
        })
    }
}

/// Read the first four bytes of a stream.
///
/// Returns `Ok(None)` for an empty stream; a stream shorter than four bytes
/// is an `UnexpectedEof` error.
pub fn read_magic<R: Read + ?Sized>(reader: &mut R) -> io::Result<Option<[u8; 4]>> {
    let mut magic = [0u8; 4];
    if read_exact_or_eof(reader, &mut magic)? {
        Ok(Some(magic))
    } else {
        Ok(None)
    }
}

pub fn is_container_magic(magic: &[u8; 4]) -> bool {
    magic == layout::MAGIC
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use super::{ContainerReader, is_container_magic, read_magic};
    use crate::container::error::ContainerError;
    use crate::writer::ProtocolWriter;

    fn record(name: &[u8], payload: &[u8], pad: usize) -> Vec<u8> {
        let mut writer = ProtocolWriter::new();
        let length = writer.mark_u32_be();
        writer.write_u16_be(name.len() as u16);
        writer.write_bytes(name);
        writer.write_u32_le(payload.len() as u32);
        writer.write_bytes(payload);
        writer.write_u32_be(0xdead_beef);
        writer.write_bytes(&vec![0u8; pad]);
        length.close(&mut writer).unwrap();
        writer.into_bytes()
    }

    #[test]
    fn reads_well_formed_record() {
        let bytes = record(b"a", b"xyz", 0);
        let mut reader = ContainerReader::new(&bytes);
        let raw = reader.read_record(0).unwrap();
        assert_eq!(raw.name, b"a");
        assert_eq!(raw.payload, b"xyz");
        assert_eq!(raw.stored_crc, 0xdead_beef);
        assert_eq!(reader.available(), 0);
    }

    #[test]
    fn padding_inside_record_is_rejected() {
        let bytes = record(b"a", b"xyz", 2);
        let err = ContainerReader::new(&bytes).read_record(3).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::RecordLength {
                index: 3,
                declared: 16,
                used: 14
            }
        ));
    }

    #[test]
    fn fields_past_declared_length_are_rejected() {
        let mut bytes = record(b"a", b"xyz", 0);
        // shrink the declared length by one; the crc no longer fits
        bytes[3] -= 1;
        let err = ContainerReader::new(&bytes).read_record(0).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::RecordLength {
                declared: 13,
                used: 14,
                ..
            }
        ));
    }

    #[test]
    fn declared_length_past_body_is_wire_error() {
        let bytes = [0, 0, 0, 50, 0, 0];
        let err = ContainerReader::new(&bytes).read_record(0).unwrap_err();
        assert!(matches!(err, ContainerError::Wire(_)));
    }

    #[test]
    fn magic_sniffing() {
        let mut stream: &[u8] = b"WKC1rest";
        let magic = read_magic(&mut stream).unwrap().unwrap();
        assert!(is_container_magic(&magic));
        assert_eq!(stream, b"rest");

        let mut empty: &[u8] = &[];
        assert!(read_magic(&mut empty).unwrap().is_none());

        let mut short: &[u8] = b"WK";
        let err = read_magic(&mut short).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);

        assert!(!is_container_magic(b"PK\x03\x04"));
    }
}
