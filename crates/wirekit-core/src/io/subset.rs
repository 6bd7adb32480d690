use std::io::{self, ErrorKind, Read, Seek, SeekFrom};
use std::sync::{Arc, Mutex};

/// Read-only window `[offset, offset + length)` over a seekable stream.
///
/// Positions are relative to the window. Seeking past the end is allowed and
/// reads there return 0 bytes; seeking before the start is an error.
///
/// # Examples
/// ```
/// use std::io::{Cursor, Read};
///
/// use wirekit_core::io::SubsetReader;
///
/// let stream = Cursor::new(b"..payload..".to_vec());
/// let mut window = SubsetReader::new(stream, 2, 7)?;
/// let mut text = String::new();
/// window.read_to_string(&mut text)?;
/// assert_eq!(text, "payload");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct SubsetReader<R> {
    inner: R,
    offset: u64,
    length: u64,
    position: u64,
}

impl<R: Read + Seek> SubsetReader<R> {
    /// Fails with `InvalidInput` when the window does not fit in the stream.
    pub fn new(mut inner: R, offset: u64, length: u64) -> io::Result<Self> {
        let stream_len = stream_len(&mut inner)?;
        validate_window(stream_len, offset, length)?;
        Ok(Self {
            inner,
            offset,
            length,
            position: 0,
        })
    }

    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Read for SubsetReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_window(
            &mut self.inner,
            self.offset,
            self.length,
            &mut self.position,
            buf,
        )
    }
}

impl<R: Read + Seek> Seek for SubsetReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        seek_window(self.length, &mut self.position, pos)
    }
}

/// Window over a stream shared with other windows through a mutex.
///
/// The lock is taken for the duration of each read and released on every
/// exit path, so several windows (possibly on different threads) can walk the
/// same underlying stream. Each window tracks its own position.
#[derive(Debug)]
pub struct SharedSubsetReader<R> {
    inner: Arc<Mutex<R>>,
    offset: u64,
    length: u64,
    position: u64,
}

impl<R: Read + Seek> SharedSubsetReader<R> {
    pub fn new(inner: Arc<Mutex<R>>, offset: u64, length: u64) -> io::Result<Self> {
        let stream_len = {
            let mut guard = lock(&inner)?;
            stream_len(&mut *guard)?
        };
        validate_window(stream_len, offset, length)?;
        Ok(Self {
            inner,
            offset,
            length,
            position: 0,
        })
    }

    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn position(&self) -> u64 {
        self.position
    }
}

impl<R> Clone for SharedSubsetReader<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            offset: self.offset,
            length: self.length,
            position: self.position,
        }
    }
}

impl<R: Read + Seek> Read for SharedSubsetReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut guard = lock(&self.inner)?;
        read_window(
            &mut *guard,
            self.offset,
            self.length,
            &mut self.position,
            buf,
        )
    }
}

impl<R: Read + Seek> Seek for SharedSubsetReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        seek_window(self.length, &mut self.position, pos)
    }
}

fn lock<R>(inner: &Mutex<R>) -> io::Result<std::sync::MutexGuard<'_, R>> {
    inner
        .lock()
        .map_err(|_| io::Error::other("shared stream lock poisoned"))
}

/// Length of the stream, leaving its position where it was.
fn stream_len<R: Seek>(inner: &mut R) -> io::Result<u64> {
    let current = inner.stream_position()?;
    let len = inner.seek(SeekFrom::End(0))?;
    if current != len {
        inner.seek(SeekFrom::Start(current))?;
    }
    Ok(len)
}

fn validate_window(stream_len: u64, offset: u64, length: u64) -> io::Result<()> {
    let fits = offset <= stream_len
        && offset
            .checked_add(length)
            .is_some_and(|end| end <= stream_len);
    if fits {
        return Ok(());
    }
    Err(io::Error::new(
        ErrorKind::InvalidInput,
        format!("window {offset}+{length} exceeds stream length {stream_len}"),
    ))
}

fn read_window<R: Read + Seek>(
    inner: &mut R,
    offset: u64,
    length: u64,
    position: &mut u64,
    buf: &mut [u8],
) -> io::Result<usize> {
    if *position >= length || buf.is_empty() {
        return Ok(0);
    }
    let remaining = length - *position;
    let count = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));
    let target = offset + *position;
    if inner.stream_position()? != target {
        inner.seek(SeekFrom::Start(target))?;
    }
    let read = inner.read(&mut buf[..count])?;
    *position += read as u64;
    Ok(read)
}

fn seek_window(length: u64, position: &mut u64, pos: SeekFrom) -> io::Result<u64> {
    let (base, delta) = match pos {
        SeekFrom::Start(target) => {
            *position = target;
            return Ok(target);
        }
        SeekFrom::Current(delta) => (*position, delta),
        SeekFrom::End(delta) => (length, delta),
    };
    let target = base.checked_add_signed(delta).ok_or_else(|| {
        io::Error::new(
            ErrorKind::InvalidInput,
            "seek would move before the start of the window",
        )
    })?;
    *position = target;
    Ok(target)
}
