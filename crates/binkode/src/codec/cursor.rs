//! Byte cursors for encoding and decoding.
//!
//! Writing appends to a growable buffer. Reading consumes from the front of a
//! [`Source`]; there is no seeking.

use std::io;

use crate::error::DecodeError;

/// Upper bound on how far ahead of the data [`IoSource`] allocates when a
/// length prefix asks for a large run of bytes.
const READ_CHUNK: usize = 64 * 1024;

// =============================================================================
// DECODING
// =============================================================================

/// A run of bytes read from a [`Source`], borrowed from the input when the
/// source allows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bytes<'de> {
    Borrowed(&'de [u8]),
    Owned(Vec<u8>),
}

impl Bytes<'_> {
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Bytes::Borrowed(b) => b,
            Bytes::Owned(b) => b,
        }
    }

    pub fn into_vec(self) -> Vec<u8> {
        match self {
            Bytes::Borrowed(b) => b.to_vec(),
            Bytes::Owned(b) => b,
        }
    }
}

/// Forward-only byte input.
///
/// Every read either delivers exactly the requested bytes or fails; a short
/// input is [`DecodeError::UnexpectedEof`], never zero-filled.
pub trait Source<'de> {
    /// Fills `buf` completely.
    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), DecodeError>;

    /// Reads exactly `len` bytes.
    fn read_bytes(&mut self, len: usize, context: &'static str) -> Result<Bytes<'de>, DecodeError>;

    /// Returns true if no input is left. Does not consume anything.
    fn is_exhausted(&mut self) -> Result<bool, DecodeError>;

    /// Number of bytes left, when the source knows it.
    fn remaining_len(&self) -> Option<usize> {
        None
    }

    /// Total bytes consumed so far.
    fn bytes_read(&self) -> u64;

    /// Reads a single byte.
    #[inline]
    fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte, context)?;
        Ok(byte[0])
    }

    /// Reads a fixed-size array.
    #[inline]
    fn read_array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N], DecodeError>
    where
        Self: Sized,
    {
        let mut bytes = [0u8; N];
        self.read_exact(&mut bytes, context)?;
        Ok(bytes)
    }

    /// Reads one UTF-8 encoded code point (1 to 4 bytes, no length prefix).
    fn read_char(&mut self) -> Result<char, DecodeError> {
        let mut buf = [0u8; 4];
        buf[0] = self.read_byte("char")?;
        let width = utf8_width(buf[0]).ok_or_else(|| DecodeError::InvalidChar {
            bytes: vec![buf[0]],
        })?;
        if width > 1 {
            self.read_exact(&mut buf[1..width], "char")?;
        }
        std::str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or_else(|| DecodeError::InvalidChar {
                bytes: buf[..width].to_vec(),
            })
    }
}

/// Length of a UTF-8 sequence from its lead byte.
fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

/// Source over an in-memory byte slice. Reads borrow from the slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Creates a new source from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the remaining bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    #[inline]
    fn take(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        if n > self.data.len() - self.pos {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }
}

impl<'a> Source<'a> for SliceSource<'a> {
    #[inline]
    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), DecodeError> {
        let bytes = self.take(buf.len(), context)?;
        buf.copy_from_slice(bytes);
        Ok(())
    }

    #[inline]
    fn read_bytes(&mut self, len: usize, context: &'static str) -> Result<Bytes<'a>, DecodeError> {
        self.take(len, context).map(Bytes::Borrowed)
    }

    #[inline]
    fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        if self.pos >= self.data.len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    fn is_exhausted(&mut self) -> Result<bool, DecodeError> {
        Ok(self.pos >= self.data.len())
    }

    fn remaining_len(&self) -> Option<usize> {
        Some(self.data.len() - self.pos)
    }

    fn bytes_read(&self) -> u64 {
        self.pos as u64
    }
}

/// Source over any [`io::Read`]. Always produces owned bytes.
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
    peeked: Option<u8>,
    read: u64,
}

impl<R: io::Read> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            peeked: None,
            read: 0,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

fn map_io(err: io::Error, context: &'static str) -> DecodeError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        DecodeError::UnexpectedEof { context }
    } else {
        DecodeError::Io(err.to_string())
    }
}

impl<'de, R: io::Read> Source<'de> for IoSource<R> {
    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), DecodeError> {
        if buf.is_empty() {
            return Ok(());
        }
        let mut start = 0;
        if let Some(byte) = self.peeked.take() {
            buf[0] = byte;
            start = 1;
        }
        self.inner
            .read_exact(&mut buf[start..])
            .map_err(|e| map_io(e, context))?;
        self.read += buf.len() as u64;
        Ok(())
    }

    fn read_bytes(&mut self, len: usize, context: &'static str) -> Result<Bytes<'de>, DecodeError> {
        // Grow in chunks so a bogus length cannot allocate ahead of the data.
        let mut out = Vec::with_capacity(len.min(READ_CHUNK));
        let mut remaining = len;
        while remaining > 0 {
            let n = remaining.min(READ_CHUNK);
            let start = out.len();
            out.resize(start + n, 0);
            self.read_exact(&mut out[start..], context)?;
            remaining -= n;
        }
        Ok(Bytes::Owned(out))
    }

    fn is_exhausted(&mut self) -> Result<bool, DecodeError> {
        if self.peeked.is_some() {
            return Ok(false);
        }
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(true),
                Ok(_) => {
                    self.peeked = Some(byte[0]);
                    return Ok(false);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DecodeError::Io(e.to_string())),
            }
        }
    }

    fn bytes_read(&self) -> u64 {
        self.read
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding binary data.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes the UTF-8 encoding of a code point, without a length prefix.
    #[inline]
    pub fn write_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.buf.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_reads_in_order() {
        let data = [1u8, 2, 3, 4, 5];
        let mut source = SliceSource::new(&data);

        assert_eq!(source.read_byte("a").unwrap(), 1);
        assert_eq!(source.read_array::<2>("b").unwrap(), [2, 3]);
        assert_eq!(source.read_bytes(2, "c").unwrap(), Bytes::Borrowed(&[4u8, 5][..]));
        assert!(source.is_exhausted().unwrap());
        assert_eq!(source.bytes_read(), 5);
    }

    #[test]
    fn test_unexpected_eof() {
        let data = [0u8; 5];
        let mut source = SliceSource::new(&data);
        let result = source.read_bytes(10, "test");
        assert!(matches!(result, Err(DecodeError::UnexpectedEof { context: "test" })));
        // failed read consumes nothing
        assert_eq!(source.position(), 0);
    }

    #[test]
    fn test_char_widths() {
        for (c, width) in [('A', 1), ('é', 2), ('€', 3), ('😀', 4)] {
            let mut writer = Writer::new();
            writer.write_char(c);
            assert_eq!(writer.len(), width, "width of {c:?}");

            let mut source = SliceSource::new(writer.as_bytes());
            assert_eq!(source.read_char().unwrap(), c);
            assert!(source.is_exhausted().unwrap());
        }
    }

    #[test]
    fn test_invalid_char_rejected() {
        let mut source = SliceSource::new(&[0xFF]);
        assert!(matches!(source.read_char(), Err(DecodeError::InvalidChar { .. })));

        // lead byte promises two bytes, continuation is not 10xxxxxx
        let mut source = SliceSource::new(&[0xC3, 0x41]);
        assert!(matches!(source.read_char(), Err(DecodeError::InvalidChar { .. })));

        // surrogate range
        let mut source = SliceSource::new(&[0xED, 0xA0, 0x80]);
        assert!(matches!(source.read_char(), Err(DecodeError::InvalidChar { .. })));
    }

    #[test]
    fn test_io_source_peek_does_not_lose_bytes() {
        let data: &[u8] = &[9, 8, 7];
        let mut source = IoSource::new(data);

        assert!(!source.is_exhausted().unwrap());
        assert_eq!(source.read_byte("a").unwrap(), 9);
        assert!(!source.is_exhausted().unwrap());
        assert_eq!(source.read_bytes(2, "b").unwrap().into_vec(), vec![8, 7]);
        assert!(source.is_exhausted().unwrap());
        assert_eq!(source.bytes_read(), 3);
    }

    #[test]
    fn test_io_source_eof() {
        let data: &[u8] = &[1, 2];
        let mut source = IoSource::new(data);
        assert!(matches!(
            source.read_array::<4>("u32"),
            Err(DecodeError::UnexpectedEof { context: "u32" })
        ));
    }

    #[test]
    fn test_io_source_large_length_without_data() {
        let data: &[u8] = &[1, 2, 3];
        let mut source = IoSource::new(data);
        assert!(matches!(
            source.read_bytes(usize::MAX / 2, "string"),
            Err(DecodeError::UnexpectedEof { .. })
        ));
    }
}
