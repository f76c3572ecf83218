//! Byte-limit enforcement for decoding.

use tracing::debug;

use crate::codec::cursor::{Bytes, Source};
use crate::config::SizeLimit;
use crate::error::DecodeError;

/// Wraps a [`Source`] and fails any read that would take the cumulative
/// total past `limit`. The check happens before the inner read, so nothing
/// beyond the limit is ever consumed.
#[derive(Debug)]
pub struct Bounded<S> {
    inner: S,
    limit: Option<u64>,
    consumed: u64,
}

impl<S> Bounded<S> {
    pub fn new(inner: S, limit: SizeLimit) -> Self {
        let limit = match limit {
            SizeLimit::Infinite => None,
            SizeLimit::Bounded(n) => Some(n),
        };
        Self {
            inner,
            limit,
            consumed: 0,
        }
    }

    /// Bytes delivered through this decorator so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    #[inline]
    fn claim(&mut self, requested: usize) -> Result<(), DecodeError> {
        if let Some(limit) = self.limit {
            let requested = requested as u64;
            if self.consumed.saturating_add(requested) > limit {
                debug!(limit, consumed = self.consumed, requested, "byte limit reached");
                return Err(DecodeError::LimitExceeded {
                    limit,
                    consumed: self.consumed,
                    requested,
                });
            }
        }
        self.consumed = self.consumed.saturating_add(requested as u64);
        Ok(())
    }
}

impl<'de, S: Source<'de>> Source<'de> for Bounded<S> {
    #[inline]
    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), DecodeError> {
        self.claim(buf.len())?;
        self.inner.read_exact(buf, context)
    }

    #[inline]
    fn read_bytes(&mut self, len: usize, context: &'static str) -> Result<Bytes<'de>, DecodeError> {
        self.claim(len)?;
        self.inner.read_bytes(len, context)
    }

    fn is_exhausted(&mut self) -> Result<bool, DecodeError> {
        self.inner.is_exhausted()
    }

    fn remaining_len(&self) -> Option<usize> {
        self.inner.remaining_len()
    }

    fn bytes_read(&self) -> u64 {
        self.inner.bytes_read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::cursor::SliceSource;

    #[test]
    fn test_infinite_passes_through() {
        let data = [0u8; 64];
        let mut source = Bounded::new(SliceSource::new(&data), SizeLimit::Infinite);
        source.read_bytes(64, "all").unwrap();
        assert_eq!(source.consumed(), 64);
    }

    #[test]
    fn test_read_up_to_limit() {
        let data = [1u8, 2, 3, 4];
        let mut source = Bounded::new(SliceSource::new(&data), SizeLimit::Bounded(4));
        source.read_array::<4>("u32").unwrap();
        assert_eq!(source.consumed(), 4);
    }

    #[test]
    fn test_limit_aborts_before_consuming() {
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut source = Bounded::new(SliceSource::new(&data), SizeLimit::Bounded(5));

        source.read_array::<4>("first").unwrap();
        let result = source.read_array::<4>("second");
        assert_eq!(
            result,
            Err(DecodeError::LimitExceeded {
                limit: 5,
                consumed: 4,
                requested: 4
            })
        );
        // the inner source never saw the rejected read
        assert_eq!(source.into_inner().position(), 4);
    }

    #[test]
    fn test_huge_request_without_limit_is_eof() {
        let data = [1u8, 2];
        let mut source = Bounded::new(SliceSource::new(&data), SizeLimit::Infinite);
        source.read_byte("first").unwrap();
        assert!(matches!(
            source.read_bytes(usize::MAX, "string"),
            Err(DecodeError::UnexpectedEof { context: "string" })
        ));
        assert!(matches!(
            source.read_bytes(usize::MAX, "string"),
            Err(DecodeError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_limit_checked_before_eof() {
        let data = [1u8];
        let mut source = Bounded::new(SliceSource::new(&data), SizeLimit::Bounded(2));
        assert!(matches!(
            source.read_bytes(1000, "string"),
            Err(DecodeError::LimitExceeded { .. })
        ));
    }
}
