use thiserror::Error;

/// Errors returned by the codec, reader, writer placeholders and CRC-32.
///
/// Every variant is reported before any side effect: a failed read does not
/// move the cursor and a failed placeholder close leaves the reserved bytes
/// untouched.
///
/// # Examples
/// ```
/// use wirekit_core::{ProtocolReader, WireError};
///
/// let mut reader = ProtocolReader::new(&[0x01]);
/// let err = reader.read_u16_be().unwrap_err();
/// assert_eq!(err, WireError::OutOfBounds { offset: 0, needed: 2, available: 1 });
/// assert!(err.to_string().contains("need 2 bytes"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("out of bounds at offset {offset}: need {needed} bytes, got {available}")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("invalid range: offset {offset} and count {count} exceed length {len}")]
    InvalidRange {
        offset: usize,
        count: usize,
        len: usize,
    },
    #[error("placeholder overflow: value {value} does not fit field maximum {max}")]
    Overflow { value: u64, max: u64 },
    #[error("stale placeholder: field at offset {offset} is not below writer position {position}")]
    StalePlaceholder { offset: usize, position: usize },
}
