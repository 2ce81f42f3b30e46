//! Line-at-a-time reading of source files.
//!
//! A [`LineReader`] owns its input and a single line buffer. Each call to
//! [`LineReader::read_line`] reuses that buffer: the length is reset, then the
//! next logical line is copied in. A line that doesn't fit doubles the buffer
//! and keeps going, so there is no line-length limit other than memory.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

/// Capacity of a fresh line buffer, in bytes.
pub const INITIAL_BUFFER_SIZE: usize = 128;

/// Errors from opening or reading a source file.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to grow line buffer to {requested} bytes")]
    Allocation { requested: usize },

    #[error("failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("reader is closed")]
    Closed,
}

/// Reads logical lines (bytes up to, not including, `\n`) from an input.
///
/// The buffer grows monotonically: its capacity starts at
/// [`INITIAL_BUFFER_SIZE`] (or whatever was passed to
/// [`LineReader::with_capacity`]) and doubles whenever it fills up in the
/// middle of a line.
#[derive(Debug)]
pub struct LineReader<R = File> {
    // None once closed.
    input: Option<BufReader<R>>,
    buffer: Vec<u8>,
    capacity: usize,
    line_number: usize,
}

impl LineReader<File> {
    /// Open the file at `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReaderError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ReaderError::Open {
            path: path.to_owned(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened source file");
        // If the buffer can't be allocated, the file is dropped (and closed) here.
        Self::new(file)
    }
}

impl<R: Read> LineReader<R> {
    /// Wrap an input with a buffer of [`INITIAL_BUFFER_SIZE`] bytes.
    pub fn new(input: R) -> Result<Self, ReaderError> {
        Self::with_capacity(input, INITIAL_BUFFER_SIZE)
    }

    /// Wrap an input with a buffer of `capacity` bytes (at least one).
    pub fn with_capacity(input: R, capacity: usize) -> Result<Self, ReaderError> {
        let capacity = capacity.max(1);
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| ReaderError::Allocation {
                requested: capacity,
            })?;

        Ok(LineReader {
            input: Some(BufReader::new(input)),
            buffer,
            capacity,
            line_number: 0,
        })
    }

    /// Read the next logical line.
    ///
    /// Returns `Ok(None)` once the input is exhausted and no partial line is
    /// pending. A final line without a trailing `\n` is still returned.
    /// The returned slice is only valid until the next call.
    ///
    /// A failure to grow the buffer closes the reader; whatever was read of the
    /// line so far is lost.
    pub fn read_line(&mut self) -> Result<Option<&[u8]>, ReaderError> {
        self.buffer.clear();

        loop {
            let Some(input) = self.input.as_mut() else {
                return Err(ReaderError::Closed);
            };
            let available = match input.fill_buf() {
                Ok(available) => available,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ReaderError::Read {
                        line: self.line_number + 1,
                        source,
                    })
                }
            };

            if available.is_empty() {
                // End of input: either nothing at all, or an unterminated last line.
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                self.line_number += 1;
                tracing::trace!(
                    line = self.line_number,
                    len = self.buffer.len(),
                    "read unterminated line"
                );
                return Ok(Some(&self.buffer));
            }

            // Never copy past the end of the buffer; that's what growth is for.
            let room = self.capacity - self.buffer.len();
            let window = &available[..available.len().min(room)];

            if let Some(end) = window.iter().position(|&byte| byte == b'\n') {
                self.buffer.extend_from_slice(&window[..end]);
                input.consume(end + 1);
                self.line_number += 1;
                tracing::trace!(line = self.line_number, len = self.buffer.len(), "read line");
                return Ok(Some(&self.buffer));
            }

            let taken = window.len();
            self.buffer.extend_from_slice(window);
            input.consume(taken);

            if self.buffer.len() == self.capacity {
                self.grow()?;
            }
        }
    }

    /// Double the buffer capacity, keeping its contents.
    fn grow(&mut self) -> Result<(), ReaderError> {
        let requested = self.capacity.saturating_mul(2);
        let additional = requested - self.buffer.len();
        if self.buffer.try_reserve_exact(additional).is_err() {
            self.close();
            return Err(ReaderError::Allocation { requested });
        }
        tracing::trace!(from = self.capacity, to = requested, "grew line buffer");
        self.capacity = requested;
        Ok(())
    }
}

impl<R> LineReader<R> {
    /// Release the input and the buffer. Closing twice is a no-op.
    pub fn close(&mut self) {
        self.input = None;
        self.buffer = Vec::new();
        self.capacity = 0;
    }

    pub fn is_closed(&self) -> bool {
        self.input.is_none()
    }

    /// Number of lines returned so far; also the 1-based number of the most
    /// recently returned line.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Current buffer capacity in bytes; zero once closed.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all<R: Read>(reader: &mut LineReader<R>) -> Result<Vec<Vec<u8>>, ReaderError> {
        let mut lines = Vec::new();
        while let Some(line) = reader.read_line()? {
            lines.push(line.to_vec());
        }
        Ok(lines)
    }

    #[test]
    fn empty_input_ends_immediately() -> Result<(), ReaderError> {
        let mut reader = LineReader::new(Cursor::new(b""))?;
        assert_eq!(reader.read_line()?, None);
        assert_eq!(reader.line_number(), 0);
        Ok(())
    }

    #[test]
    fn strips_terminators() -> Result<(), ReaderError> {
        let mut reader = LineReader::new(Cursor::new(b"one\ntwo\n\nfour\n"))?;
        let lines = read_all(&mut reader)?;
        assert_eq!(
            lines,
            vec![b"one".to_vec(), b"two".to_vec(), b"".to_vec(), b"four".to_vec()]
        );
        assert_eq!(reader.line_number(), 4);
        Ok(())
    }

    #[test]
    fn final_line_without_terminator() -> Result<(), ReaderError> {
        let mut reader = LineReader::new(Cursor::new(b"first\nlast"))?;
        assert_eq!(reader.read_line()?, Some(&b"first"[..]));
        assert_eq!(reader.read_line()?, Some(&b"last"[..]));
        assert_eq!(reader.read_line()?, None);
        // Exhausted readers keep reporting the end.
        assert_eq!(reader.read_line()?, None);
        assert_eq!(reader.line_number(), 2);
        Ok(())
    }

    #[test]
    fn carriage_returns_stay_in_the_line() -> Result<(), ReaderError> {
        let mut reader = LineReader::new(Cursor::new(b"dos\r\n"))?;
        assert_eq!(reader.read_line()?, Some(&b"dos\r"[..]));
        Ok(())
    }

    #[test]
    fn long_line_doubles_buffer() -> Result<(), ReaderError> {
        let long = vec![b'x'; 1000];
        let mut input = long.clone();
        input.extend_from_slice(b"\nshort\n");

        let mut reader = LineReader::with_capacity(Cursor::new(input), 8)?;
        assert_eq!(reader.capacity(), 8);
        assert_eq!(reader.read_line()?, Some(&long[..]));
        // 8 -> 16 -> ... -> 1024
        assert_eq!(reader.capacity(), 1024);
        assert_eq!(reader.read_line()?, Some(&b"short"[..]));
        // Never shrinks.
        assert_eq!(reader.capacity(), 1024);
        Ok(())
    }

    #[test]
    fn no_growth_when_line_fits() -> Result<(), ReaderError> {
        let mut reader = LineReader::with_capacity(Cursor::new(b"1234567\n"), 8)?;
        assert_eq!(reader.read_line()?, Some(&b"1234567"[..]));
        assert_eq!(reader.capacity(), 8);
        Ok(())
    }

    #[test]
    fn full_buffer_then_terminator() -> Result<(), ReaderError> {
        // Exactly fills the buffer before the newline shows up.
        let mut reader = LineReader::with_capacity(Cursor::new(b"12345678\nab"), 8)?;
        assert_eq!(reader.read_line()?, Some(&b"12345678"[..]));
        assert_eq!(reader.capacity(), 16);
        assert_eq!(reader.read_line()?, Some(&b"ab"[..]));
        Ok(())
    }

    #[test]
    fn zero_capacity_is_raised() -> Result<(), ReaderError> {
        let mut reader = LineReader::with_capacity(Cursor::new(b"abc"), 0)?;
        assert_eq!(reader.capacity(), 1);
        assert_eq!(reader.read_line()?, Some(&b"abc"[..]));
        assert_eq!(reader.capacity(), 4);
        Ok(())
    }

    #[test]
    fn close_is_idempotent() -> Result<(), ReaderError> {
        let mut reader = LineReader::new(Cursor::new(b"a\nb\n"))?;
        assert_eq!(reader.read_line()?, Some(&b"a"[..]));
        reader.close();
        reader.close();
        assert!(reader.is_closed());
        assert_eq!(reader.capacity(), 0);
        assert!(matches!(reader.read_line(), Err(ReaderError::Closed)));
        Ok(())
    }

    #[test]
    fn failed_growth_closes_reader() -> Result<(), ReaderError> {
        let mut reader = LineReader::new(Cursor::new(b"left\nover\n"))?;
        // Doubling this saturates at usize::MAX, which no Vec can reserve.
        reader.capacity = usize::MAX / 2 + 1;
        match reader.grow() {
            Err(ReaderError::Allocation { requested }) => assert_eq!(requested, usize::MAX),
            v => panic!("unexpected result: {v:?}"),
        }
        assert!(reader.is_closed());
        assert_eq!(reader.capacity(), 0);
        // The rest of the input is unreachable.
        assert!(matches!(reader.read_line(), Err(ReaderError::Closed)));
        Ok(())
    }

    #[test]
    fn open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.src");
        match LineReader::open(&path) {
            Err(ReaderError::Open { path: got, .. }) => assert_eq!(got, path),
            v => panic!("unexpected result: {v:?}"),
        }
    }

    #[test]
    fn open_reads_file() -> Result<(), ReaderError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.src");
        std::fs::write(&path, "alpha beta\ngamma\n").unwrap();

        let mut reader = LineReader::open(&path)?;
        let lines = read_all(&mut reader)?;
        assert_eq!(lines, vec![b"alpha beta".to_vec(), b"gamma".to_vec()]);
        Ok(())
    }

    /// Yields some bytes, then fails.
    struct Failing {
        data: Cursor<&'static [u8]>,
    }

    impl Read for Failing {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(std::io::Error::new(ErrorKind::Other, "disk on fire")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn read_error_reports_line() -> Result<(), ReaderError> {
        let mut reader = LineReader::new(Failing {
            data: Cursor::new(&b"ok\npartial"[..]),
        })?;
        assert_eq!(reader.read_line()?, Some(&b"ok"[..]));
        match reader.read_line() {
            Err(ReaderError::Read { line, .. }) => assert_eq!(line, 2),
            v => panic!("unexpected result: {v:?}"),
        }
        Ok(())
    }
}
