use thiserror::Error;

use crate::error::WireError;

/// Errors returned while building or decoding a container.
///
/// # Examples
/// ```
/// use wirekit_core::container::{ContainerError, parse_container};
///
/// let err = parse_container(b"nope").unwrap_err();
/// assert!(matches!(err, ContainerError::TooShort { .. }));
/// assert!(err.to_string().contains("too short"));
/// ```
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("container too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("bad container magic: {found:02x?}")]
    BadMagic { found: [u8; 4] },
    #[error("unsupported container version: {version}")]
    UnsupportedVersion { version: u8 },
    #[error("entry name too long: {len} bytes (max {max})")]
    NameTooLong { len: usize, max: usize },
    #[error("entry {index} has an invalid UTF-8 name")]
    InvalidName { index: u32 },
    #[error("entry {index} length mismatch: record declares {declared} bytes, fields use {used}")]
    RecordLength {
        index: u32,
        declared: usize,
        used: usize,
    },
    #[error("{trailing} unexpected bytes after the last entry")]
    TrailingBytes { trailing: usize },
    #[error("wire error: {0}")]
    Wire(#[from] WireError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
