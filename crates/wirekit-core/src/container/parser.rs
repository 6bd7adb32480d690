use tracing::{debug, warn};

use super::error::ContainerError;
use super::layout;
use super::reader::ContainerReader;
use crate::crc32::crc32;
use crate::reader::ProtocolReader;

/// Decoded container borrowing its names and payloads from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container<'a> {
    pub version: u8,
    pub flags: u8,
    /// Creation time in unix seconds.
    pub created_at: i64,
    pub entries: Vec<Entry<'a>>,
    /// Trailer CRC as stored.
    pub stored_crc: u32,
    /// CRC of every byte before the trailer.
    pub computed_crc: u32,
}

impl Container<'_> {
    pub fn trailer_ok(&self) -> bool {
        self.stored_crc == self.computed_crc
    }

    pub fn corrupted_entries(&self) -> impl Iterator<Item = &Entry<'_>> {
        self.entries.iter().filter(|entry| !entry.crc_ok())
    }

    pub fn is_intact(&self) -> bool {
        self.trailer_ok() && self.corrupted_entries().next().is_none()
    }

    pub fn payload_bytes(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| entry.payload.len() as u64)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<'a> {
    pub index: u32,
    pub name: &'a str,
    pub payload: &'a [u8],
    pub stored_crc: u32,
    pub computed_crc: u32,
}

impl Entry<'_> {
    pub fn crc_ok(&self) -> bool {
        self.stored_crc == self.computed_crc
    }
}

/// Decode a complete container.
///
/// Structural problems (magic, version, record framing, names, trailing
/// bytes) are errors. Checksum mismatches are not: they are reported through
/// [`Entry::crc_ok`] and [`Container::trailer_ok`] so callers can decide how
/// strict to be.
///
/// # Examples
/// ```
/// use wirekit_core::container::{ContainerWriter, parse_container};
///
/// let mut writer = ContainerWriter::new(1_700_000_000);
/// writer.add_entry("a.bin", &[1, 2, 3])?;
/// let mut bytes = writer.finish()?;
/// bytes[33] ^= 0xff; // first payload byte
///
/// let container = parse_container(&bytes)?;
/// assert!(!container.entries[0].crc_ok());
/// assert!(!container.trailer_ok());
/// # Ok::<(), wirekit_core::container::ContainerError>(())
/// ```
pub fn parse_container(data: &[u8]) -> Result<Container<'_>, ContainerError> {
    let needed = layout::HEADER_LEN + layout::TRAILER_LEN;
    if data.len() < needed {
        return Err(ContainerError::TooShort {
            needed,
            actual: data.len(),
        });
    }
    let body_len = data.len() - layout::TRAILER_LEN;
    let stored_crc =
        ProtocolReader::with_range(data, body_len, layout::TRAILER_LEN)?.read_u32_le()?;
    let body = &data[..body_len];
    let computed_crc = crc32(body);

    let mut reader = ContainerReader::new(body);
    let header = reader.read_header()?;
    if &header.magic != layout::MAGIC {
        return Err(ContainerError::BadMagic {
            found: header.magic,
        });
    }
    if header.version != layout::VERSION {
        return Err(ContainerError::UnsupportedVersion {
            version: header.version,
        });
    }
    if header.flags != layout::FLAGS {
        debug!(flags = header.flags, "ignoring unknown container flags");
    }

    // A hostile count must not drive the allocation.
    let max_records = reader.available() / (4 + layout::MIN_RECORD_BODY_LEN);
    let mut entries = Vec::with_capacity((header.entry_count as usize).min(max_records));
    for index in 0..header.entry_count {
        let raw = reader.read_record(index)?;
        let name =
            std::str::from_utf8(raw.name).map_err(|_| ContainerError::InvalidName { index })?;
        let entry = Entry {
            index,
            name,
            payload: raw.payload,
            stored_crc: raw.stored_crc,
            computed_crc: crc32(raw.payload),
        };
        if !entry.crc_ok() {
            warn!(
                index,
                name,
                stored = format_args!("{:08x}", entry.stored_crc),
                computed = format_args!("{:08x}", entry.computed_crc),
                "entry checksum mismatch"
            );
        }
        entries.push(entry);
    }

    let trailing = reader.available();
    if trailing != 0 {
        return Err(ContainerError::TrailingBytes { trailing });
    }

    let container = Container {
        version: header.version,
        flags: header.flags,
        created_at: header.created_at,
        entries,
        stored_crc,
        computed_crc,
    };
    if !container.trailer_ok() {
        warn!(
            stored = format_args!("{stored_crc:08x}"),
            computed = format_args!("{computed_crc:08x}"),
            "container trailer checksum mismatch"
        );
    }
    debug!(
        entries = container.entries.len(),
        bytes = data.len(),
        "container parsed"
    );
    Ok(container)
}
