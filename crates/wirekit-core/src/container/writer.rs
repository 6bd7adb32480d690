use std::io::{ErrorKind, Read};

use tracing::debug;

use super::error::ContainerError;
use super::layout;
use crate::crc32::{Crc32, crc32};
use crate::error::WireError;
use crate::placeholder::Placeholder;
use crate::writer::{DEFAULT_INITIAL_CAPACITY, ProtocolWriter};

/// Tuning knobs for [`ContainerWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerOptions {
    /// Read size used by [`ContainerWriter::add_entry_from_reader`].
    pub chunk_size: usize,
    /// Starting size of the output buffer.
    pub initial_capacity: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            chunk_size: layout::DEFAULT_CHUNK_SIZE,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

/// Builds a container in memory.
///
/// Each record is framed by a big-endian length placeholder that is closed
/// once the record is complete; the payload length is a little-endian
/// placeholder closed right after the payload. The entry count in the header
/// is filled in by [`ContainerWriter::finish`], which also appends the CRC-32
/// trailer.
///
/// If adding an entry fails part way through, the partially written record
/// stays in the buffer and the writer should be discarded.
///
/// # Examples
/// ```
/// use wirekit_core::container::{ContainerWriter, parse_container};
///
/// let mut writer = ContainerWriter::new(0);
/// writer.add_entry("hello.txt", b"hello")?;
/// let bytes = writer.finish()?;
///
/// let container = parse_container(&bytes)?;
/// assert_eq!(container.entries[0].name, "hello.txt");
/// assert!(container.trailer_ok());
/// # Ok::<(), wirekit_core::container::ContainerError>(())
/// ```
#[derive(Debug)]
pub struct ContainerWriter {
    writer: ProtocolWriter,
    entry_count: Placeholder<u32>,
    entries: u64,
    options: ContainerOptions,
}

impl ContainerWriter {
    /// Start a container stamped with `created_at` (unix seconds).
    pub fn new(created_at: i64) -> Self {
        Self::with_options(created_at, ContainerOptions::default())
    }

    pub fn with_options(created_at: i64, options: ContainerOptions) -> Self {
        let mut writer = ProtocolWriter::with_capacity(options.initial_capacity);
        writer.write_bytes(layout::MAGIC);
        writer.write_u8(layout::VERSION);
        writer.write_u8(layout::FLAGS);
        writer.write_i64_be(created_at);
        let entry_count = writer.mark_u32_be();
        Self {
            writer,
            entry_count,
            entries: 0,
            options,
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.entries
    }

    /// Bytes written so far, trailer excluded.
    pub fn len(&self) -> usize {
        self.writer.position()
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn add_entry(&mut self, name: &str, payload: &[u8]) -> Result<(), ContainerError> {
        if u32::try_from(payload.len()).is_err() {
            return Err(WireError::Overflow {
                value: payload.len() as u64,
                max: u64::from(u32::MAX),
            }
            .into());
        }
        let record = self.begin_record(name)?;
        let payload_len = self.writer.mark_u32_le();
        self.writer.write_bytes(payload);
        self.end_record(name, record, payload_len, crc32(payload))
    }

    /// Stream an entry's payload from `reader`, returning its size.
    pub fn add_entry_from_reader<R: Read + ?Sized>(
        &mut self,
        name: &str,
        reader: &mut R,
    ) -> Result<u64, ContainerError> {
        let record = self.begin_record(name)?;
        let payload_len = self.writer.mark_u32_le();
        let mut chunk = vec![0u8; self.options.chunk_size.max(1)];
        let mut crc = Crc32::new();
        let mut total = 0u64;
        loop {
            let read = match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            self.writer.write_bytes(&chunk[..read]);
            crc.update(&chunk[..read]);
            total += read as u64;
        }
        self.end_record(name, record, payload_len, crc.value())?;
        Ok(total)
    }

    /// Fill in the entry count, append the trailer and return the bytes.
    pub fn finish(mut self) -> Result<Vec<u8>, ContainerError> {
        let count = u32::try_from(self.entries).map_err(|_| WireError::Overflow {
            value: self.entries,
            max: u64::from(u32::MAX),
        })?;
        self.entry_count.set_value(&mut self.writer, count)?;
        let trailer = crc32(self.writer.data());
        self.writer.write_u32_le(trailer);
        debug!(
            entries = count,
            bytes = self.writer.position(),
            "container finished"
        );
        Ok(self.writer.into_bytes())
    }

    fn begin_record(&mut self, name: &str) -> Result<Placeholder<u32>, ContainerError> {
        let name_len = u16::try_from(name.len()).map_err(|_| ContainerError::NameTooLong {
            len: name.len(),
            max: usize::from(u16::MAX),
        })?;
        let record = self.writer.mark_u32_be();
        self.writer.write_u16_be(name_len);
        self.writer.write_bytes(name.as_bytes());
        Ok(record)
    }

    fn end_record(
        &mut self,
        name: &str,
        record: Placeholder<u32>,
        payload_len: Placeholder<u32>,
        crc: u32,
    ) -> Result<(), ContainerError> {
        let size = payload_len.close(&mut self.writer)?;
        self.writer.write_u32_be(crc);
        record.close(&mut self.writer)?;
        self.entries += 1;
        debug!(name, size, crc = format_args!("{crc:08x}"), "container entry added");
        Ok(())
    }
}
