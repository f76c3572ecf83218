//! Decoder session: scalar and structural decoding.
//!
//! Decoding is strictly order-dependent. The caller's schema must match the
//! encoder's layout exactly; there is nothing on the wire to recover from a
//! mismatch.

use std::borrow::Cow;

use tracing::{debug, trace};

use crate::codec::bounded::Bounded;
use crate::codec::cursor::{Bytes, Source};
use crate::codec::encoder::sealed_name;
use crate::codec::int::IntCodec;
use crate::config::{Configuration, Trailing};
use crate::error::DecodeError;

/// Sequential field counter for one structure.
///
/// Yields `0..len` and then `None`. Each structure gets its own cursor, so
/// nested structures do not disturb the enclosing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldCursor {
    next: usize,
    len: usize,
}

impl FieldCursor {
    pub fn new(len: usize) -> Self {
        Self { next: 0, len }
    }

    /// Next field index, or `None` once every declared field was visited.
    #[inline]
    pub fn next_field_index(&mut self) -> Option<usize> {
        if self.next >= self.len {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(index)
    }

    pub fn remaining(&self) -> usize {
        self.len - self.next
    }
}

/// Per-call decoding state.
#[derive(Debug)]
pub struct Decoder<S> {
    source: S,
    ints: IntCodec,
    pending: Option<u32>,
}

impl<'de, S: Source<'de>> Decoder<Bounded<S>> {
    /// Wraps `source` in the configuration's byte limit.
    pub fn new(source: S, config: &Configuration) -> Self {
        Self::from_source(Bounded::new(source, config.byte_limit()), config.int_codec())
    }
}

impl<'de, S: Source<'de>> Decoder<S> {
    /// Uses `source` as-is, without a byte limit.
    pub fn from_source(source: S, ints: IntCodec) -> Self {
        Self {
            source,
            ints,
            pending: None,
        }
    }

    pub fn int_codec(&self) -> IntCodec {
        self.ints
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Applies the trailing-bytes policy after a complete top-level value.
    ///
    /// Under [`Trailing::Reject`] a reader-backed source is probed by reading
    /// one byte ahead. That byte is not counted against the byte limit and is
    /// lost to the caller if the reader is shared.
    pub fn finish(mut self, trailing: Trailing) -> Result<S, DecodeError> {
        if trailing == Trailing::Reject && !self.source.is_exhausted()? {
            let remaining = self.source.remaining_len();
            debug!(?remaining, "rejecting trailing input");
            return Err(match remaining {
                Some(remaining) => DecodeError::TrailingBytes { remaining },
                None => DecodeError::TrailingData,
            });
        }
        Ok(self.source)
    }

    // --- scalars ---

    #[inline]
    pub fn decode_bool(&mut self) -> Result<bool, DecodeError> {
        match self.source.read_byte("bool")? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(DecodeError::InvalidBool { value }),
        }
    }

    #[inline]
    pub fn decode_u8(&mut self) -> Result<u8, DecodeError> {
        self.source.read_byte("u8")
    }

    #[inline]
    pub fn decode_i8(&mut self) -> Result<i8, DecodeError> {
        self.source.read_byte("i8").map(|b| b as i8)
    }

    #[inline]
    pub fn decode_u16(&mut self) -> Result<u16, DecodeError> {
        self.ints.read_u16(&mut self.source, "u16")
    }

    #[inline]
    pub fn decode_u32(&mut self) -> Result<u32, DecodeError> {
        self.ints.read_u32(&mut self.source, "u32")
    }

    #[inline]
    pub fn decode_u64(&mut self) -> Result<u64, DecodeError> {
        self.ints.read_u64(&mut self.source, "u64")
    }

    #[inline]
    pub fn decode_i16(&mut self) -> Result<i16, DecodeError> {
        self.ints.read_i16(&mut self.source, "i16")
    }

    #[inline]
    pub fn decode_i32(&mut self) -> Result<i32, DecodeError> {
        self.ints.read_i32(&mut self.source, "i32")
    }

    #[inline]
    pub fn decode_i64(&mut self) -> Result<i64, DecodeError> {
        self.ints.read_i64(&mut self.source, "i64")
    }

    #[inline]
    pub fn decode_f32(&mut self) -> Result<f32, DecodeError> {
        let bits = self.ints.read_i32(&mut self.source, "f32")?;
        Ok(f32::from_bits(bits as u32))
    }

    #[inline]
    pub fn decode_f64(&mut self) -> Result<f64, DecodeError> {
        let bits = self.ints.read_i64(&mut self.source, "f64")?;
        Ok(f64::from_bits(bits as u64))
    }

    #[inline]
    pub fn decode_char(&mut self) -> Result<char, DecodeError> {
        self.source.read_char()
    }

    /// Reads a length-prefixed UTF-8 string, borrowing from the input when
    /// the source allows it.
    ///
    /// If a tagged-union discriminant is pending, nothing is read: the
    /// synthetic variant name is returned and the slot is cleared.
    pub fn decode_string(&mut self) -> Result<Cow<'de, str>, DecodeError> {
        if let Some(index) = self.pending.take() {
            trace!(index, "resolved pending discriminant");
            return Ok(Cow::Owned(sealed_name(index)));
        }
        match self.decode_bytes_for("string")? {
            Bytes::Borrowed(bytes) => std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|_| DecodeError::InvalidUtf8 { field: "string" }),
            Bytes::Owned(bytes) => String::from_utf8(bytes)
                .map(Cow::Owned)
                .map_err(|_| DecodeError::InvalidUtf8 { field: "string" }),
        }
    }

    /// Reads a length-prefixed byte array.
    pub fn decode_bytes(&mut self) -> Result<Bytes<'de>, DecodeError> {
        self.decode_bytes_for("bytes")
    }

    fn decode_bytes_for(&mut self, field: &'static str) -> Result<Bytes<'de>, DecodeError> {
        let len = self.decode_len_for(field)?;
        self.source.read_bytes(len, field)
    }

    // --- structure ---

    /// Element count of a collection.
    #[inline]
    pub fn decode_len(&mut self) -> Result<usize, DecodeError> {
        self.decode_len_for("length")
    }

    fn decode_len_for(&mut self, field: &'static str) -> Result<usize, DecodeError> {
        let len = self.ints.read_u64(&mut self.source, field)?;
        usize::try_from(len).map_err(|_| DecodeError::LengthOverflow { field, len })
    }

    /// Presence byte preceding an optional value.
    #[inline]
    pub fn decode_option_tag(&mut self) -> Result<bool, DecodeError> {
        match self.source.read_byte("option")? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(DecodeError::InvalidOptionTag { value }),
        }
    }

    /// Ordinal of a fieldless enum.
    #[inline]
    pub fn decode_enum(&mut self) -> Result<u32, DecodeError> {
        self.ints.read_i32(&mut self.source, "enum").map(|v| v as u32)
    }

    /// Variant index of a tagged union.
    #[inline]
    pub fn decode_discriminant(&mut self) -> Result<u32, DecodeError> {
        self.ints.read_u32(&mut self.source, "discriminant")
    }

    /// Starts a structure of `len` sequential fields.
    pub fn begin_structure(&self, len: usize) -> FieldCursor {
        FieldCursor::new(len)
    }

    /// Reads a tagged union's discriminant and holds it until the next
    /// [`Decoder::decode_string`], which returns the synthetic variant name
    /// instead of reading from the input.
    pub fn begin_tagged_union(&mut self) -> Result<u32, DecodeError> {
        let index = self.decode_discriminant()?;
        self.pending = Some(index);
        Ok(index)
    }

    /// Discriminant read by [`Decoder::begin_tagged_union`] and not consumed yet.
    pub fn pending_discriminant(&self) -> Option<u32> {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::cursor::{IoSource, SliceSource};
    use crate::codec::encoder::Encoder;
    use crate::config::{Endian, IntEncoding};

    fn decoder(bytes: &[u8]) -> Decoder<Bounded<SliceSource<'_>>> {
        Decoder::new(SliceSource::new(bytes), &Configuration::DEFAULT)
    }

    #[test]
    fn test_record_scenario() {
        let mut decoder = decoder(&[0x00, 0x53, 0x02, 0x68, 0x69]);
        assert!(!decoder.decode_bool().unwrap());
        assert_eq!(decoder.decode_i16().unwrap(), -42);
        assert_eq!(decoder.decode_string().unwrap(), "hi");
        decoder.finish(Trailing::Reject).unwrap();
    }

    #[test]
    fn test_invalid_bool() {
        let mut decoder = decoder(&[2]);
        assert_eq!(decoder.decode_bool(), Err(DecodeError::InvalidBool { value: 2 }));
    }

    #[test]
    fn test_invalid_option_tag() {
        let mut decoder = decoder(&[9]);
        assert_eq!(
            decoder.decode_option_tag(),
            Err(DecodeError::InvalidOptionTag { value: 9 })
        );
    }

    #[test]
    fn test_invalid_utf8_string() {
        let mut decoder = decoder(&[2, 0xC3, 0x28]);
        assert_eq!(
            decoder.decode_string(),
            Err(DecodeError::InvalidUtf8 { field: "string" })
        );
    }

    #[test]
    fn test_string_borrows_from_slice() {
        let mut decoder = decoder(&[3, b'a', b'b', b'c']);
        assert!(matches!(decoder.decode_string().unwrap(), Cow::Borrowed("abc")));
    }

    #[test]
    fn test_string_from_reader_is_owned() {
        let data: &[u8] = &[2, b'o', b'k'];
        let mut decoder = Decoder::new(IoSource::new(data), &Configuration::DEFAULT);
        let value = decoder.decode_string().unwrap();
        assert!(matches!(value, Cow::Owned(_)));
        assert_eq!(value, "ok");
    }

    #[test]
    fn test_pending_discriminant_used_once() {
        // discriminant 1, then a real string "x"
        let mut decoder = decoder(&[1, 1, b'x']);
        assert_eq!(decoder.begin_tagged_union().unwrap(), 1);
        assert_eq!(decoder.pending_discriminant(), Some(1));

        assert_eq!(decoder.decode_string().unwrap(), sealed_name(1));
        assert_eq!(decoder.pending_discriminant(), None);
        assert_eq!(decoder.decode_string().unwrap(), "x");
    }

    #[test]
    fn test_sealed_roundtrip_through_string_channel() {
        let config = Configuration::builder()
            .endian(Endian::Big)
            .int_encoding(IntEncoding::Fixed)
            .build();
        let mut encoder = Encoder::new(&config);
        encoder.encode_str(&sealed_name(7)).unwrap();
        encoder.encode_i32(-5);
        let bytes = encoder.into_bytes();

        let mut decoder = Decoder::new(SliceSource::new(&bytes), &config);
        decoder.begin_tagged_union().unwrap();
        assert_eq!(decoder.decode_string().unwrap(), "binkode.sealed.tag;7");
        assert_eq!(decoder.decode_i32().unwrap(), -5);
        decoder.finish(Trailing::Reject).unwrap();
    }

    #[test]
    fn test_field_cursor() {
        let decoder = decoder(&[]);
        let mut fields = decoder.begin_structure(3);
        assert_eq!(fields.next_field_index(), Some(0));
        assert_eq!(fields.next_field_index(), Some(1));
        assert_eq!(fields.remaining(), 1);
        assert_eq!(fields.next_field_index(), Some(2));
        assert_eq!(fields.next_field_index(), None);
        assert_eq!(fields.next_field_index(), None);

        let mut empty = decoder.begin_structure(0);
        assert_eq!(empty.next_field_index(), None);
    }

    #[test]
    fn test_trailing_policy() {
        let mut strict = decoder(&[1, 0]);
        strict.decode_u8().unwrap();
        assert_eq!(
            strict.finish(Trailing::Reject).unwrap_err(),
            DecodeError::TrailingBytes { remaining: 1 }
        );

        let mut lenient = decoder(&[1, 0]);
        lenient.decode_u8().unwrap();
        lenient.finish(Trailing::Allow).unwrap();
    }

    #[test]
    fn test_exact_input_under_both_policies() {
        for trailing in [Trailing::Reject, Trailing::Allow] {
            let mut exact = decoder(&[1, 0]);
            assert_eq!(exact.decode_u16().unwrap(), 1);
            assert_eq!(exact.decode_u8().unwrap(), 0);
            let source = exact.finish(trailing).unwrap();
            assert_eq!(source.consumed(), 2);

            let data: &[u8] = &[7];
            let mut reader = Decoder::new(IoSource::new(data), &Configuration::DEFAULT);
            assert_eq!(reader.decode_u8().unwrap(), 7);
            reader.finish(trailing).unwrap();
        }
    }

    #[test]
    fn test_reader_end_check_ignores_limit() {
        // the one-byte look-ahead is not claimed against the limit
        let data: &[u8] = &[7, 8];
        let config = Configuration::builder().limit(1).build();
        let mut reader = Decoder::new(IoSource::new(data), &config);
        assert_eq!(reader.decode_u8().unwrap(), 7);
        assert_eq!(reader.finish(Trailing::Reject).unwrap_err(), DecodeError::TrailingData);
    }

    #[test]
    fn test_trailing_from_reader() {
        let data: &[u8] = &[1, 0];
        let mut decoder = Decoder::new(IoSource::new(data), &Configuration::DEFAULT);
        decoder.decode_u8().unwrap();
        assert_eq!(decoder.finish(Trailing::Reject).unwrap_err(), DecodeError::TrailingData);
    }

    #[test]
    fn test_length_overflow_on_narrow_targets() {
        // a u64::MAX length either overflows usize or runs past the input
        let mut decoder = decoder(&[253, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        let err = decoder.decode_bytes().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::LengthOverflow { .. } | DecodeError::UnexpectedEof { .. }
        ));
    }

    #[test]
    fn test_float_roundtrip_all_modes() {
        for endian in [Endian::Big, Endian::Little] {
            for mode in [IntEncoding::Fixed, IntEncoding::Variable] {
                let config = Configuration::builder().endian(endian).int_encoding(mode).build();
                let mut encoder = Encoder::new(&config);
                for v in [0.0f64, -0.0, 1.5, -12345.6789, f64::INFINITY, f64::MIN_POSITIVE] {
                    encoder.encode_f64(v);
                }
                encoder.encode_f32(f32::NAN);
                let bytes = encoder.into_bytes();

                let mut decoder = Decoder::new(SliceSource::new(&bytes), &config);
                for v in [0.0f64, -0.0, 1.5, -12345.6789, f64::INFINITY, f64::MIN_POSITIVE] {
                    assert_eq!(decoder.decode_f64().unwrap().to_bits(), v.to_bits());
                }
                assert!(decoder.decode_f32().unwrap().is_nan());
                decoder.finish(Trailing::Reject).unwrap();
            }
        }
    }
}
