//! Error types for bincode encoding and decoding.

use std::fmt::Display;

use thiserror::Error;

/// Stable error codes, one per failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Input ended before the value was complete
    UnexpectedEof,
    /// E002: Configured byte limit exceeded
    LimitExceeded,
    /// E003: Unread bytes after the top-level value
    TrailingBytes,
    /// E004: Invalid UTF-8 encoding
    InvalidUtf8,
    /// E005: Malformed primitive (bool, option tag, varint marker, discriminant)
    MalformedEncoding,
    /// E006: Type or request the format cannot express
    Unsupported,
    /// E007: Underlying reader/writer failed
    Io,
    /// E008: Error raised by a `Serialize`/`Deserialize` implementation
    Custom,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::UnexpectedEof => "E001",
            ErrorCode::LimitExceeded => "E002",
            ErrorCode::TrailingBytes => "E003",
            ErrorCode::InvalidUtf8 => "E004",
            ErrorCode::MalformedEncoding => "E005",
            ErrorCode::Unsupported => "E006",
            ErrorCode::Io => "E007",
            ErrorCode::Custom => "E008",
        }
    }
}

/// Error during binary decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === E001 ===
    #[error("[E001] unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    // === E002 ===
    #[error("[E002] byte limit reached: reading {requested} more byte(s) after {consumed} exceeds limit {limit}")]
    LimitExceeded {
        limit: u64,
        consumed: u64,
        requested: u64,
    },

    // === E003 ===
    #[error("[E003] {remaining} trailing byte(s) left after decoding")]
    TrailingBytes { remaining: usize },

    #[error("[E003] trailing data left in the source after decoding")]
    TrailingData,

    // === E004 ===
    #[error("[E004] invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    // === E005 ===
    #[error("[E005] invalid bool value: {value} (expected 0x00 or 0x01)")]
    InvalidBool { value: u8 },

    #[error("[E005] invalid option tag: {value} (expected 0x00 or 0x01)")]
    InvalidOptionTag { value: u8 },

    #[error("[E005] unsupported varint marker {marker}")]
    UnsupportedVarintMarker { marker: u8 },

    #[error("[E005] varint marker {marker} is too wide for a {width}-bit integer")]
    VarintMarkerTooWide { marker: u8, width: u32 },

    #[error("[E005] invalid UTF-8 sequence for char: {bytes:02x?}")]
    InvalidChar { bytes: Vec<u8> },

    #[error("[E005] discriminant {discriminant} has no matching variant in {name}")]
    InvalidDiscriminant { name: &'static str, discriminant: u32 },

    #[error("[E005] {field} length {len} does not fit in usize")]
    LengthOverflow { field: &'static str, len: u64 },

    // === E006 ===
    #[error("[E006] 128-bit integers are not supported")]
    Unsupported128BitInteger,

    #[error("[E006] the format is not self-describing; deserialize_any is not supported")]
    DeserializeAnyNotSupported,

    // === E007 ===
    #[error("[E007] read failed: {0}")]
    Io(String),

    // === E008 ===
    #[error("[E008] {0}")]
    Custom(String),
}

impl DecodeError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DecodeError::UnexpectedEof { .. } => ErrorCode::UnexpectedEof,
            DecodeError::LimitExceeded { .. } => ErrorCode::LimitExceeded,
            DecodeError::TrailingBytes { .. } | DecodeError::TrailingData => {
                ErrorCode::TrailingBytes
            }
            DecodeError::InvalidUtf8 { .. } => ErrorCode::InvalidUtf8,
            DecodeError::Unsupported128BitInteger | DecodeError::DeserializeAnyNotSupported => {
                ErrorCode::Unsupported
            }
            DecodeError::Io(_) => ErrorCode::Io,
            DecodeError::Custom(_) => ErrorCode::Custom,
            _ => ErrorCode::MalformedEncoding,
        }
    }
}

impl serde::de::Error for DecodeError {
    fn custom<T: Display>(msg: T) -> Self {
        DecodeError::Custom(msg.to_string())
    }
}

/// Error during binary encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("sequences and maps must report their length up front")]
    SequenceMustHaveLength,

    #[error("128-bit integers are not supported")]
    Unsupported128BitInteger,

    #[error("ordinal encoding only applies to fieldless enum variants")]
    NotFieldlessEnum,

    #[error("malformed sealed tag: {tag:?}")]
    InvalidSealedTag { tag: String },

    #[error("write failed: {0}")]
    Io(String),

    #[error("{0}")]
    Custom(String),
}

impl EncodeError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EncodeError::SequenceMustHaveLength
            | EncodeError::Unsupported128BitInteger
            | EncodeError::NotFieldlessEnum => ErrorCode::Unsupported,
            EncodeError::InvalidSealedTag { .. } => ErrorCode::MalformedEncoding,
            EncodeError::Io(_) => ErrorCode::Io,
            EncodeError::Custom(_) => ErrorCode::Custom,
        }
    }
}

impl serde::ser::Error for EncodeError {
    fn custom<T: Display>(msg: T) -> Self {
        EncodeError::Custom(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_codes() {
        assert_eq!(DecodeError::UnexpectedEof { context: "u8" }.code().code(), "E001");
        assert_eq!(
            DecodeError::LimitExceeded { limit: 1, consumed: 1, requested: 1 }.code(),
            ErrorCode::LimitExceeded
        );
        assert_eq!(DecodeError::TrailingData.code(), ErrorCode::TrailingBytes);
        assert_eq!(DecodeError::InvalidBool { value: 2 }.code(), ErrorCode::MalformedEncoding);
        assert_eq!(DecodeError::Unsupported128BitInteger.code().code(), "E006");
    }

    #[test]
    fn test_message_carries_code() {
        let err = DecodeError::InvalidBool { value: 7 };
        assert_eq!(err.to_string(), "[E005] invalid bool value: 7 (expected 0x00 or 0x01)");
    }

    #[test]
    fn test_custom_from_serde() {
        let err = <DecodeError as serde::de::Error>::custom("boom");
        assert_eq!(err, DecodeError::Custom("boom".to_string()));
        let err = <EncodeError as serde::ser::Error>::custom("bang");
        assert_eq!(err.code(), ErrorCode::Custom);
    }
}
