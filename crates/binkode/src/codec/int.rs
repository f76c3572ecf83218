//! Integer encoding: byte order, fixed vs. variable width, zigzag.
//!
//! Every multi-byte integer in the format goes through an [`IntCodec`]:
//! plain integers, float bit patterns, enum ordinals, lengths and
//! discriminants.
//!
//! Variable mode uses the bincode dense encoding for an unsigned magnitude `u`:
//!
//! | range | bytes |
//! |---|---|
//! | `u < 251` | `u` |
//! | `251 <= u < 2^16` | `251`, then `u` as u16 |
//! | `2^16 <= u < 2^32` | `252`, then `u` as u32 |
//! | `2^32 <= u < 2^64` | `253`, then `u` as u64 |
//!
//! Marker `254` would introduce a u128 and is rejected. Signed values are
//! zigzag-mapped first so small negatives stay one byte.

use crate::codec::cursor::{Source, Writer};
use crate::config::IntEncoding;
use crate::error::DecodeError;

/// Largest magnitude stored in a single byte.
pub const SINGLE_BYTE_MAX: u8 = 250;
/// Marker: a u16 follows.
pub const U16_MARKER: u8 = 251;
/// Marker: a u32 follows.
pub const U32_MARKER: u8 = 252;
/// Marker: a u64 follows.
pub const U64_MARKER: u8 = 253;
/// Marker reserved for a u128. Not supported.
pub const U128_MARKER: u8 = 254;

// =============================================================================
// BYTE ORDER
// =============================================================================

/// Resolved byte order for fixed-width reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    #[inline]
    pub fn write_u16(self, writer: &mut Writer, value: u16) {
        match self {
            ByteOrder::Big => writer.write_bytes(&value.to_be_bytes()),
            ByteOrder::Little => writer.write_bytes(&value.to_le_bytes()),
        }
    }

    #[inline]
    pub fn write_u32(self, writer: &mut Writer, value: u32) {
        match self {
            ByteOrder::Big => writer.write_bytes(&value.to_be_bytes()),
            ByteOrder::Little => writer.write_bytes(&value.to_le_bytes()),
        }
    }

    #[inline]
    pub fn write_u64(self, writer: &mut Writer, value: u64) {
        match self {
            ByteOrder::Big => writer.write_bytes(&value.to_be_bytes()),
            ByteOrder::Little => writer.write_bytes(&value.to_le_bytes()),
        }
    }

    #[inline]
    pub fn read_u16<'de, S: Source<'de>>(
        self,
        source: &mut S,
        context: &'static str,
    ) -> Result<u16, DecodeError> {
        let bytes = source.read_array::<2>(context)?;
        Ok(match self {
            ByteOrder::Big => u16::from_be_bytes(bytes),
            ByteOrder::Little => u16::from_le_bytes(bytes),
        })
    }

    #[inline]
    pub fn read_u32<'de, S: Source<'de>>(
        self,
        source: &mut S,
        context: &'static str,
    ) -> Result<u32, DecodeError> {
        let bytes = source.read_array::<4>(context)?;
        Ok(match self {
            ByteOrder::Big => u32::from_be_bytes(bytes),
            ByteOrder::Little => u32::from_le_bytes(bytes),
        })
    }

    #[inline]
    pub fn read_u64<'de, S: Source<'de>>(
        self,
        source: &mut S,
        context: &'static str,
    ) -> Result<u64, DecodeError> {
        let bytes = source.read_array::<8>(context)?;
        Ok(match self {
            ByteOrder::Big => u64::from_be_bytes(bytes),
            ByteOrder::Little => u64::from_le_bytes(bytes),
        })
    }
}

// =============================================================================
// ZIGZAG ENCODING
// =============================================================================

/// Encodes a signed integer using zigzag encoding.
///
/// Maps negative numbers to odd positive numbers:
/// 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, 2 -> 4, ...
///
/// Narrower signed types can be sign-extended first; the result always fits
/// the original width.
#[inline]
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Decodes a zigzag-encoded unsigned integer back to signed.
#[inline]
pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}

// =============================================================================
// DENSE ENCODING
// =============================================================================

/// Writes `value` with the smallest marker that holds it.
#[inline]
pub fn write_dense(order: ByteOrder, writer: &mut Writer, value: u64) {
    if value <= SINGLE_BYTE_MAX as u64 {
        writer.write_byte(value as u8);
    } else if value <= u16::MAX as u64 {
        writer.write_byte(U16_MARKER);
        order.write_u16(writer, value as u16);
    } else if value <= u32::MAX as u64 {
        writer.write_byte(U32_MARKER);
        order.write_u32(writer, value as u32);
    } else {
        writer.write_byte(U64_MARKER);
        order.write_u64(writer, value);
    }
}

/// Reads a dense value declared as `width` bits. Markers wider than the
/// declared width are rejected.
#[inline]
pub fn read_dense<'de, S: Source<'de>>(
    order: ByteOrder,
    source: &mut S,
    width: u32,
    context: &'static str,
) -> Result<u64, DecodeError> {
    let marker = source.read_byte(context)?;
    match marker {
        0..=SINGLE_BYTE_MAX => Ok(marker as u64),
        U16_MARKER => order.read_u16(source, context).map(u64::from),
        U32_MARKER if width >= 32 => order.read_u32(source, context).map(u64::from),
        U64_MARKER if width >= 64 => order.read_u64(source, context),
        U32_MARKER | U64_MARKER => Err(DecodeError::VarintMarkerTooWide { marker, width }),
        _ => Err(DecodeError::UnsupportedVarintMarker { marker }),
    }
}

// =============================================================================
// CODEC
// =============================================================================

/// Integer strategy selected once from a configuration.
///
/// The `write_u*`/`read_u*` methods are the unsigned variant used for
/// lengths and discriminants; `write_i*`/`read_i*` are the signed path,
/// which applies zigzag in variable mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntCodec {
    BigFixed,
    LittleFixed,
    BigVariable,
    LittleVariable,
}

impl IntCodec {
    pub const fn new(order: ByteOrder, encoding: IntEncoding) -> Self {
        match (order, encoding) {
            (ByteOrder::Big, IntEncoding::Fixed) => IntCodec::BigFixed,
            (ByteOrder::Little, IntEncoding::Fixed) => IntCodec::LittleFixed,
            (ByteOrder::Big, IntEncoding::Variable) => IntCodec::BigVariable,
            (ByteOrder::Little, IntEncoding::Variable) => IntCodec::LittleVariable,
        }
    }

    #[inline]
    pub const fn byte_order(self) -> ByteOrder {
        match self {
            IntCodec::BigFixed | IntCodec::BigVariable => ByteOrder::Big,
            IntCodec::LittleFixed | IntCodec::LittleVariable => ByteOrder::Little,
        }
    }

    #[inline]
    pub const fn is_variable(self) -> bool {
        matches!(self, IntCodec::BigVariable | IntCodec::LittleVariable)
    }

    // --- unsigned ---

    #[inline]
    pub fn write_u16(self, writer: &mut Writer, value: u16) {
        if self.is_variable() {
            write_dense(self.byte_order(), writer, value as u64);
        } else {
            self.byte_order().write_u16(writer, value);
        }
    }

    #[inline]
    pub fn write_u32(self, writer: &mut Writer, value: u32) {
        if self.is_variable() {
            write_dense(self.byte_order(), writer, value as u64);
        } else {
            self.byte_order().write_u32(writer, value);
        }
    }

    #[inline]
    pub fn write_u64(self, writer: &mut Writer, value: u64) {
        if self.is_variable() {
            write_dense(self.byte_order(), writer, value);
        } else {
            self.byte_order().write_u64(writer, value);
        }
    }

    #[inline]
    pub fn read_u16<'de, S: Source<'de>>(
        self,
        source: &mut S,
        context: &'static str,
    ) -> Result<u16, DecodeError> {
        if self.is_variable() {
            read_dense(self.byte_order(), source, 16, context).map(|v| v as u16)
        } else {
            self.byte_order().read_u16(source, context)
        }
    }

    #[inline]
    pub fn read_u32<'de, S: Source<'de>>(
        self,
        source: &mut S,
        context: &'static str,
    ) -> Result<u32, DecodeError> {
        if self.is_variable() {
            read_dense(self.byte_order(), source, 32, context).map(|v| v as u32)
        } else {
            self.byte_order().read_u32(source, context)
        }
    }

    #[inline]
    pub fn read_u64<'de, S: Source<'de>>(
        self,
        source: &mut S,
        context: &'static str,
    ) -> Result<u64, DecodeError> {
        if self.is_variable() {
            read_dense(self.byte_order(), source, 64, context)
        } else {
            self.byte_order().read_u64(source, context)
        }
    }

    // --- signed ---

    #[inline]
    pub fn write_i16(self, writer: &mut Writer, value: i16) {
        if self.is_variable() {
            write_dense(self.byte_order(), writer, zigzag_encode(value as i64));
        } else {
            self.byte_order().write_u16(writer, value as u16);
        }
    }

    #[inline]
    pub fn write_i32(self, writer: &mut Writer, value: i32) {
        if self.is_variable() {
            write_dense(self.byte_order(), writer, zigzag_encode(value as i64));
        } else {
            self.byte_order().write_u32(writer, value as u32);
        }
    }

    #[inline]
    pub fn write_i64(self, writer: &mut Writer, value: i64) {
        if self.is_variable() {
            write_dense(self.byte_order(), writer, zigzag_encode(value));
        } else {
            self.byte_order().write_u64(writer, value as u64);
        }
    }

    #[inline]
    pub fn read_i16<'de, S: Source<'de>>(
        self,
        source: &mut S,
        context: &'static str,
    ) -> Result<i16, DecodeError> {
        if self.is_variable() {
            read_dense(self.byte_order(), source, 16, context).map(|u| zigzag_decode(u) as i16)
        } else {
            self.byte_order().read_u16(source, context).map(|v| v as i16)
        }
    }

    #[inline]
    pub fn read_i32<'de, S: Source<'de>>(
        self,
        source: &mut S,
        context: &'static str,
    ) -> Result<i32, DecodeError> {
        if self.is_variable() {
            read_dense(self.byte_order(), source, 32, context).map(|u| zigzag_decode(u) as i32)
        } else {
            self.byte_order().read_u32(source, context).map(|v| v as i32)
        }
    }

    #[inline]
    pub fn read_i64<'de, S: Source<'de>>(
        self,
        source: &mut S,
        context: &'static str,
    ) -> Result<i64, DecodeError> {
        if self.is_variable() {
            read_dense(self.byte_order(), source, 64, context).map(zigzag_decode)
        } else {
            self.byte_order().read_u64(source, context).map(|v| v as i64)
        }
    }
}
