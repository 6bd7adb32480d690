//! Deferred fields reserved in a [`ProtocolWriter`].
//!
//! A placeholder is a tag (`FieldKind`) plus the logical offset of the
//! reserved bytes. It holds no reference to the writer, so it stays valid
//! across buffer growth; the writer is passed back in when the value is
//! finally known.

use std::marker::PhantomData;

use tracing::debug;

use crate::endian::{Endian, Width};
use crate::error::WireError;
use crate::writer::ProtocolWriter;

/// Width, byte order and signedness of a reserved field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldKind {
    pub width: Width,
    pub endian: Endian,
    pub signed: bool,
}

impl FieldKind {
    pub const fn new(width: Width, endian: Endian, signed: bool) -> Self {
        Self {
            width,
            endian,
            signed,
        }
    }

    /// Largest delta `close` may store in this field.
    pub const fn max_value(self) -> u64 {
        if self.signed {
            self.width.signed_max()
        } else {
            self.width.unsigned_max()
        }
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for u8 {}
    impl Sealed for i8 {}
    impl Sealed for u16 {}
    impl Sealed for i16 {}
    impl Sealed for u32 {}
    impl Sealed for i32 {}
    impl Sealed for u64 {}
    impl Sealed for i64 {}
}

/// Integer types a placeholder can be set to.
pub trait FieldValue: sealed::Sealed + Copy {
    /// Two's complement bits of the value, widened to 64 bits.
    fn to_bits(self) -> u64;
}

impl FieldValue for u8 {
    fn to_bits(self) -> u64 {
        u64::from(self)
    }
}

impl FieldValue for i8 {
    fn to_bits(self) -> u64 {
        i64::from(self) as u64
    }
}

impl FieldValue for u16 {
    fn to_bits(self) -> u64 {
        u64::from(self)
    }
}

impl FieldValue for i16 {
    fn to_bits(self) -> u64 {
        i64::from(self) as u64
    }
}

impl FieldValue for u32 {
    fn to_bits(self) -> u64 {
        u64::from(self)
    }
}

impl FieldValue for i32 {
    fn to_bits(self) -> u64 {
        i64::from(self) as u64
    }
}

impl FieldValue for u64 {
    fn to_bits(self) -> u64 {
        self
    }
}

impl FieldValue for i64 {
    fn to_bits(self) -> u64 {
        self as u64
    }
}

/// Handle to a reserved field, returned by the writer's `mark_*` methods.
///
/// # Examples
/// ```
/// use wirekit_core::ProtocolWriter;
///
/// let mut writer = ProtocolWriter::new();
/// let length = writer.mark_u16_be();
/// writer.write_bytes(b"payload");
/// assert_eq!(length.close(&mut writer)?, 7);
/// assert_eq!(&writer.data()[..2], &[0x00, 0x07]);
/// # Ok::<(), wirekit_core::WireError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<T> {
    offset: usize,
    kind: FieldKind,
    _value: PhantomData<fn(T)>,
}

impl<T: FieldValue> Placeholder<T> {
    pub(crate) fn new(offset: usize, kind: FieldKind) -> Self {
        Self {
            offset,
            kind,
            _value: PhantomData,
        }
    }

    /// Offset of the reserved bytes from the start of the writer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn size(&self) -> usize {
        self.kind.width.bytes()
    }

    pub fn max_value(&self) -> u64 {
        self.kind.max_value()
    }

    /// Encode `value` into the reserved bytes.
    ///
    /// Leaves the writer position alone and may be repeated; the last write
    /// wins. Fails with `WireError::StalePlaceholder`, writing nothing, when
    /// the reserved bytes are no longer below the writer position (the writer
    /// was reset, or the placeholder belongs to a shorter writer).
    pub fn set_value(&self, writer: &mut ProtocolWriter, value: T) -> Result<(), WireError> {
        let position = writer.position();
        if self.offset + self.size() > position {
            return Err(WireError::StalePlaceholder {
                offset: self.offset,
                position,
            });
        }
        writer.patch(self.offset, self.kind, value.to_bits())
    }

    /// Store the number of bytes written after this field.
    ///
    /// Returns the stored value, or `WireError::Overflow` (field untouched)
    /// when it does not fit.
    pub fn close(&self, writer: &mut ProtocolWriter) -> Result<u64, WireError> {
        self.close_with(writer, false)
    }

    /// Store the number of bytes written from the start of this field,
    /// counting the field itself.
    pub fn close_including_self(&self, writer: &mut ProtocolWriter) -> Result<u64, WireError> {
        self.close_with(writer, true)
    }

    fn close_with(
        &self,
        writer: &mut ProtocolWriter,
        include_self: bool,
    ) -> Result<u64, WireError> {
        let position = writer.position();
        let delta = position
            .checked_sub(self.offset)
            .and_then(|delta| {
                if include_self {
                    Some(delta)
                } else {
                    delta.checked_sub(self.size())
                }
            })
            .ok_or(WireError::StalePlaceholder {
                offset: self.offset,
                position,
            })? as u64;
        let max = self.max_value();
        if delta > max {
            debug!(
                offset = self.offset,
                delta, max, "placeholder delta exceeds field capacity"
            );
            return Err(WireError::Overflow { value: delta, max });
        }
        writer.patch(self.offset, self.kind, delta)?;
        Ok(delta)
    }
}
