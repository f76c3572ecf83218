//! Encoder session: scalar and structural encoding.
//!
//! One [`Encoder`] is created per top-level encode call and owns the output
//! buffer. Structural drivers call one operation per field, in declared
//! order; nothing on the wire names the field.

use crate::codec::cursor::Writer;
use crate::codec::int::IntCodec;
use crate::config::Configuration;
use crate::error::EncodeError;

/// Prefix of the synthetic type name a driver emits in place of a tagged
/// union's variant name: `"<SEALED_TAG>;<index>"`.
pub const SEALED_TAG: &str = "binkode.sealed.tag";

/// Builds the synthetic name for variant `index`.
pub fn sealed_name(index: u32) -> String {
    format!("{SEALED_TAG};{index}")
}

/// Parses the variant index out of a synthetic name. Returns `None` when
/// `name` is not a sealed tag at all.
pub fn parse_sealed_name(name: &str) -> Option<Result<u32, EncodeError>> {
    let rest = name.strip_prefix(SEALED_TAG)?;
    Some(
        rest.strip_prefix(';')
            .and_then(|index| index.parse::<u32>().ok())
            .ok_or_else(|| EncodeError::InvalidSealedTag {
                tag: name.to_string(),
            }),
    )
}

/// Per-call encoding state.
#[derive(Debug, Clone)]
pub struct Encoder {
    writer: Writer,
    ints: IntCodec,
}

impl Encoder {
    pub fn new(config: &Configuration) -> Self {
        Self::with_writer(Writer::new(), config)
    }

    pub fn with_writer(writer: Writer, config: &Configuration) -> Self {
        Self {
            writer,
            ints: config.int_codec(),
        }
    }

    pub fn int_codec(&self) -> IntCodec {
        self.ints
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.writer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.writer.as_bytes()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_bytes()
    }

    // --- scalars ---

    #[inline]
    pub fn encode_bool(&mut self, value: bool) {
        self.writer.write_byte(value as u8);
    }

    /// 8-bit values are a raw byte in every mode.
    #[inline]
    pub fn encode_u8(&mut self, value: u8) {
        self.writer.write_byte(value);
    }

    #[inline]
    pub fn encode_i8(&mut self, value: i8) {
        self.writer.write_byte(value as u8);
    }

    #[inline]
    pub fn encode_u16(&mut self, value: u16) {
        self.ints.write_u16(&mut self.writer, value);
    }

    #[inline]
    pub fn encode_u32(&mut self, value: u32) {
        self.ints.write_u32(&mut self.writer, value);
    }

    #[inline]
    pub fn encode_u64(&mut self, value: u64) {
        self.ints.write_u64(&mut self.writer, value);
    }

    #[inline]
    pub fn encode_i16(&mut self, value: i16) {
        self.ints.write_i16(&mut self.writer, value);
    }

    #[inline]
    pub fn encode_i32(&mut self, value: i32) {
        self.ints.write_i32(&mut self.writer, value);
    }

    #[inline]
    pub fn encode_i64(&mut self, value: i64) {
        self.ints.write_i64(&mut self.writer, value);
    }

    /// The IEEE-754 bit pattern goes through the signed 32-bit path, so in
    /// variable mode it is zigzag + dense encoded.
    #[inline]
    pub fn encode_f32(&mut self, value: f32) {
        self.encode_i32(value.to_bits() as i32);
    }

    /// See [`Encoder::encode_f32`].
    #[inline]
    pub fn encode_f64(&mut self, value: f64) {
        self.encode_i64(value.to_bits() as i64);
    }

    #[inline]
    pub fn encode_char(&mut self, value: char) {
        self.writer.write_char(value);
    }

    /// Writes a length-prefixed UTF-8 string.
    ///
    /// A string starting with [`SEALED_TAG`] is a driver's variant name for
    /// a tagged union; it is replaced by the discriminant it carries.
    pub fn encode_str(&mut self, value: &str) -> Result<(), EncodeError> {
        if let Some(index) = parse_sealed_name(value) {
            self.encode_discriminant(index?);
            return Ok(());
        }
        self.encode_bytes(value.as_bytes());
        Ok(())
    }

    /// Writes a length-prefixed byte array.
    #[inline]
    pub fn encode_bytes(&mut self, value: &[u8]) {
        self.encode_len(value.len());
        self.writer.write_bytes(value);
    }

    // --- structure ---

    /// Element count of a collection, as an unsigned 64-bit value.
    #[inline]
    pub fn encode_len(&mut self, len: usize) {
        self.ints.write_u64(&mut self.writer, len as u64);
    }

    /// Presence byte preceding an optional value.
    #[inline]
    pub fn encode_option_tag(&mut self, present: bool) {
        self.writer.write_byte(present as u8);
    }

    /// Zero-based ordinal of a fieldless enum, through the signed 32-bit path.
    #[inline]
    pub fn encode_enum(&mut self, ordinal: u32) {
        self.encode_i32(ordinal as i32);
    }

    /// Variant index of a tagged union, through the unsigned 32-bit path.
    #[inline]
    pub fn encode_discriminant(&mut self, index: u32) {
        self.ints.write_u32(&mut self.writer, index);
    }
}
