//! WireKit core library for binary protocol encoding and decoding.
//!
//! The building blocks are layered bottom-up:
//! - `endian`: big/little-endian integers of 8, 16, 24, 32 and 64 bits at an
//!   explicit offset in a byte slice
//! - [`ProtocolReader`]: a bounds-checked cursor over a borrowed byte range
//! - [`ProtocolWriter`]: a growable encoder whose `mark_*` methods reserve
//!   fields ([`Placeholder`]) to be filled once lengths are known
//! - [`Crc32`]: a streaming CRC-32 accumulator
//! - [`io`]: blocking stream helpers (exact reads, windowed readers)
//! - [`container`]: a checksummed multi-entry file format built on the above
//!
//! Invariants:
//! - Decoding never panics on short input; every read is all-or-nothing.
//! - A placeholder never silently truncates: values that do not fit the
//!   reserved width are rejected and the reserved bytes stay untouched.
//!
//! Version française (résumé):
//! Cette crate fournit un codec d'entiers (gros/petit-boutiste, 8 à 64 bits),
//! un lecteur borné, un écrivain extensible avec champs réservés, un CRC-32
//! incrémental et un format de conteneur vérifié par sommes de contrôle.
//!
//! # Examples
//! ```
//! use wirekit_core::{ProtocolReader, ProtocolWriter, crc32};
//!
//! let mut writer = ProtocolWriter::new();
//! let length = writer.mark_u16_be();
//! writer.write_u24_le(0x0a0b0c);
//! writer.write_bytes(b"hi");
//! length.close(&mut writer)?;
//!
//! let mut reader = ProtocolReader::new(writer.data());
//! assert_eq!(reader.read_u16_be()?, 5);
//! assert_eq!(reader.read_u24_le()?, 0x0a0b0c);
//! assert_eq!(reader.read_slice(2)?, b"hi");
//! assert_eq!(crc32(b"123456789"), 0xcbf4_3926);
//! # Ok::<(), wirekit_core::WireError>(())
//! ```

mod bounds;
pub mod container;
mod crc32;
mod endian;
mod error;
pub mod io;
mod placeholder;
mod reader;
mod writer;

pub use crc32::{Crc32, crc32};
pub use endian::{Endian, Width};
pub use error::WireError;
pub use placeholder::{FieldKind, FieldValue, Placeholder};
pub use reader::ProtocolReader;
pub use writer::{DEFAULT_INITIAL_CAPACITY, ProtocolWriter, WriterOptions};
