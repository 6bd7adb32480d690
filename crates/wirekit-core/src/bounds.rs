use crate::error::WireError;

/// Check that `offset..offset + count` lies inside a source of `len` bytes.
///
/// # Examples
/// This helper is crate-internal, so the example is marked as text.
/// ```text
/// use wirekit_core::bounds::validate_range;
///
/// assert!(validate_range(4, 1, 3).is_ok());
/// assert!(validate_range(4, 2, 3).is_err());
/// ```
pub(crate) fn validate_range(len: usize, offset: usize, count: usize) -> Result<(), WireError> {
    let end = offset.checked_add(count);
    match end {
        Some(end) if offset <= len && end <= len => Ok(()),
        _ => Err(WireError::InvalidRange { offset, count, len }),
    }
}

/// Check that `needed` bytes are readable at `offset` in a buffer of `len`.
pub(crate) fn require(len: usize, offset: usize, needed: usize) -> Result<(), WireError> {
    if offset.checked_add(needed).is_some_and(|end| end <= len) {
        return Ok(());
    }
    Err(WireError::OutOfBounds {
        offset,
        needed,
        available: len.saturating_sub(offset),
    })
}
