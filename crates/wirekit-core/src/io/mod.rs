//! Blocking stream helpers.
//!
//! `read_exact_or_eof` distinguishes a clean end of stream from a truncated
//! record, the subset readers expose a window of a seekable stream as a
//! stream of its own, and `ConcatReader` chains several streams into one.

mod concat;
mod subset;

pub use concat::ConcatReader;
pub use subset::{SharedSubsetReader, SubsetReader};

use std::io::{self, ErrorKind, Read};

/// Fill `buf` completely from `reader`.
///
/// Returns `Ok(false)` when the stream ends before the first byte, and an
/// `UnexpectedEof` error when it ends part way through. Interrupted reads are
/// retried.
///
/// # Examples
/// ```
/// use wirekit_core::io::read_exact_or_eof;
///
/// let mut stream: &[u8] = b"abcd";
/// let mut buf = [0u8; 4];
/// assert!(read_exact_or_eof(&mut stream, &mut buf)?);
/// assert!(!read_exact_or_eof(&mut stream, &mut buf)?);
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn read_exact_or_eof<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    format!("stream ended after {filled} of {} bytes", buf.len()),
                ));
            }
            Ok(read) => filled += read,
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::io::{self, ErrorKind, Read};

    use super::read_exact_or_eof;

    /// Hands out at most one byte per call and interrupts every other call.
    struct Trickle<'a> {
        data: &'a [u8],
        interrupt: bool,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            match (self.data.split_first(), buf.first_mut()) {
                (Some((&byte, rest)), Some(slot)) => {
                    *slot = byte;
                    self.data = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn fills_across_short_and_interrupted_reads() {
        let mut reader = Trickle {
            data: b"hello",
            interrupt: false,
        };
        let mut buf = [0u8; 5];
        assert!(read_exact_or_eof(&mut reader, &mut buf).unwrap());
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn clean_eof_returns_false() {
        let mut reader: &[u8] = &[];
        let mut buf = [0u8; 3];
        assert!(!read_exact_or_eof(&mut reader, &mut buf).unwrap());
    }

    #[test]
    fn partial_fill_is_unexpected_eof() {
        let mut reader: &[u8] = b"ab";
        let mut buf = [0u8; 3];
        let err = read_exact_or_eof(&mut reader, &mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn empty_buffer_is_trivially_filled() {
        let mut reader: &[u8] = &[];
        assert!(read_exact_or_eof(&mut reader, &mut []).unwrap());
    }
}
