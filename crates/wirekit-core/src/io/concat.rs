use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read};

/// Reads a queue of sources back to back.
///
/// Each read keeps pulling from the front source until the buffer is full;
/// a source is dropped as soon as it reports end of stream, so a single read
/// can span several sources. Returns 0 once every source is exhausted.
///
/// # Examples
/// ```
/// use std::io::Read;
///
/// use wirekit_core::io::ConcatReader;
///
/// let parts: [&[u8]; 3] = [b"wire", b"", b"kit"];
/// let mut reader = ConcatReader::new(parts);
/// let mut joined = String::new();
/// reader.read_to_string(&mut joined)?;
/// assert_eq!(joined, "wirekit");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct ConcatReader<R> {
    sources: VecDeque<R>,
}

impl<R: Read> ConcatReader<R> {
    pub fn new<I: IntoIterator<Item = R>>(sources: I) -> Self {
        Self {
            sources: sources.into_iter().collect(),
        }
    }

    /// Queue another source behind the current ones.
    pub fn push(&mut self, source: R) {
        self.sources.push_back(source);
    }

    /// Sources not yet exhausted, the current one included.
    pub fn pending(&self) -> usize {
        self.sources.len()
    }
}

impl<R: Read> Read for ConcatReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let Some(source) = self.sources.front_mut() else {
                break;
            };
            match source.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.sources.pop_front();
                }
                Ok(read) => filled += read,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                // Hand back what was read; the error resurfaces on the next call.
                Err(_) if filled > 0 => break,
                Err(err) => return Err(err),
            }
        }
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, ErrorKind, Read};

    use super::ConcatReader;

    #[test]
    fn no_sources_is_immediate_eof() {
        let mut reader = ConcatReader::new(Vec::<&[u8]>::new());
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(reader.pending(), 0);
    }

    #[test]
    fn only_empty_sources() {
        let parts: [&[u8]; 3] = [b"", b"", b""];
        let mut reader = ConcatReader::new(parts);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(reader.pending(), 0);
    }

    #[test]
    fn empty_sources_in_the_middle_are_skipped() {
        let parts: [&[u8]; 5] = [b"ab", b"", b"", b"cd", b""];
        let mut reader = ConcatReader::new(parts);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abcd");
    }

    #[test]
    fn single_read_spans_source_boundaries() {
        let parts: [&[u8]; 3] = [b"abc", b"de", b"fgh"];
        let mut reader = ConcatReader::new(parts);
        let mut buf = [0u8; 6];
        assert_eq!(reader.read(&mut buf).unwrap(), 6);
        assert_eq!(&buf, b"abcdef");
        // the first two sources are gone once the read crosses them
        assert_eq!(reader.pending(), 1);

        let mut rest = [0u8; 6];
        assert_eq!(reader.read(&mut rest).unwrap(), 2);
        assert_eq!(&rest[..2], b"gh");
        assert_eq!(reader.read(&mut rest).unwrap(), 0);
    }

    #[test]
    fn pushed_sources_are_read_last() {
        let mut reader = ConcatReader::new([&b"one"[..]]);
        reader.push(b"two");
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "onetwo");
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    enum Source {
        Data(&'static [u8]),
        Broken(Failing),
    }

    impl Read for Source {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self {
                Source::Data(data) => data.read(buf),
                Source::Broken(failing) => failing.read(buf),
            }
        }
    }

    #[test]
    fn error_after_data_is_deferred_to_next_read() {
        let mut reader = ConcatReader::new([Source::Data(b"xy"), Source::Broken(Failing)]);
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"xy");
        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
