//! binkode: bincode-compatible binary serialization for `serde` types.
//!
//! Values are written as a compact, schema-driven byte sequence: fields in
//! declared order, no names or tags, collections prefixed with their length.
//! The layout matches the reference bincode format, including its variable
//! integer encoding.
//!
//! # Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Record {
//!     flag: bool,
//!     count: i16,
//!     name: String,
//! }
//!
//! let record = Record { flag: false, count: -42, name: "hi".to_string() };
//!
//! let bytes = binkode::encode(&record).unwrap();
//! assert_eq!(bytes, [0x00, 0x53, 0x02, b'h', b'i']);
//!
//! let decoded: Record = binkode::decode(&bytes).unwrap();
//! assert_eq!(record, decoded);
//! ```
//!
//! # Configuration
//!
//! ```rust
//! use binkode::Bincode;
//! use binkode::config::{Configuration, Endian, IntEncoding};
//!
//! let codec = Bincode::new(
//!     Configuration::builder()
//!         .endian(Endian::Big)
//!         .int_encoding(IntEncoding::Fixed)
//!         .limit(64)
//!         .build(),
//! );
//! assert_eq!(codec.encode(&1u32).unwrap(), [0, 0, 0, 1]);
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration and its builder
//! - [`codec`]: Byte cursors, integer codec, encoder/decoder sessions
//! - [`error`]: Error types
//! - [`ordinal`]: `serde(with)` helper for enums written as signed ordinals
//!
//! # Wire Format
//!
//! | value | encoding |
//! |---|---|
//! | `bool` | 1 byte, `0`/`1` |
//! | `u8`/`i8` | 1 raw byte |
//! | wider integers | fixed N bytes, or dense varint (zigzag for signed) |
//! | `f32`/`f64` | bit pattern through the signed integer path |
//! | `char` | UTF-8 bytes, no prefix |
//! | string, bytes | u64 length, then bytes |
//! | `Option<T>` | presence byte, then `T` if present |
//! | seq, map | u64 count, then elements (key, value) |
//! | enum | u32 discriminant, then the variant's fields |
//!
//! Floats go through the signed integer path, so in variable mode their bit
//! pattern is zigzag + varint encoded. The reference format always writes
//! floats fixed-width; this crate keeps the signed-path layout for
//! compatibility with existing peers.

use std::io;

use serde::Serialize;
use serde::de::{Deserialize, DeserializeOwned};
use tracing::debug;

pub mod codec;
pub mod config;
mod de;
pub mod error;
pub mod ordinal;
mod ser;

pub use codec::{Decoder, Encoder};
pub use config::{Configuration, ConfigurationBuilder, Endian, IntEncoding, SizeLimit, Trailing};
pub use error::{DecodeError, EncodeError, ErrorCode};

use codec::{Bounded, IoSource, SliceSource, Source};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A codec bound to one [`Configuration`].
///
/// Holds no state between calls; share it freely across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bincode {
    config: Configuration,
}

impl Bincode {
    /// Codec with [`Configuration::DEFAULT`].
    pub const DEFAULT: Bincode = Bincode {
        config: Configuration::DEFAULT,
    };

    pub const fn new(config: Configuration) -> Self {
        Self { config }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Encodes `value` into a new buffer.
    pub fn encode<T: ?Sized + Serialize>(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
        let mut encoder = Encoder::new(&self.config);
        value.serialize(&mut encoder)?;
        debug!(len = encoder.len(), config = ?self.config, "encoded value");
        Ok(encoder.into_bytes())
    }

    /// Encodes `value` and writes it to `writer`. Returns the byte count.
    pub fn encode_into<T: ?Sized + Serialize, W: io::Write>(
        &self,
        value: &T,
        mut writer: W,
    ) -> Result<usize, EncodeError> {
        let bytes = self.encode(value)?;
        writer
            .write_all(&bytes)
            .map_err(|e| EncodeError::Io(e.to_string()))?;
        Ok(bytes.len())
    }

    /// Decodes a `T` from `bytes`, borrowing strings and byte slices where
    /// `T` asks for them.
    pub fn decode<'de, T: Deserialize<'de>>(&self, bytes: &'de [u8]) -> Result<T, DecodeError> {
        let decoder = Decoder::new(SliceSource::new(bytes), &self.config);
        match drive(decoder, self.config.trailing()) {
            Ok((value, read)) => {
                debug!(len = bytes.len(), read, "decoded value");
                Ok(value)
            }
            Err(err) => {
                debug!(len = bytes.len(), %err, "decode failed");
                Err(err)
            }
        }
    }

    /// Decodes a `T` from any reader. Under [`Trailing::Reject`] the reader
    /// must be at its end afterwards.
    pub fn decode_from<T: DeserializeOwned, R: io::Read>(&self, reader: R) -> Result<T, DecodeError> {
        let decoder = Decoder::new(IoSource::new(reader), &self.config);
        match drive(decoder, self.config.trailing()) {
            Ok((value, read)) => {
                debug!(read, "decoded value from reader");
                Ok(value)
            }
            Err(err) => {
                debug!(%err, "decode from reader failed");
                Err(err)
            }
        }
    }
}

/// Runs one top-level decode and applies the trailing policy. Returns the
/// value and the number of bytes it consumed.
fn drive<'de, T, S>(mut decoder: Decoder<Bounded<S>>, trailing: Trailing) -> Result<(T, u64), DecodeError>
where
    T: Deserialize<'de>,
    S: Source<'de>,
{
    let value = T::deserialize(&mut decoder)?;
    let source = decoder.finish(trailing)?;
    Ok((value, source.consumed()))
}

/// Encodes `value` with the default configuration.
pub fn encode<T: ?Sized + Serialize>(value: &T) -> Result<Vec<u8>, EncodeError> {
    Bincode::DEFAULT.encode(value)
}

/// Decodes a `T` with the default configuration.
pub fn decode<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T, DecodeError> {
    Bincode::DEFAULT.decode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        flag: bool,
        count: i16,
        name: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    enum Event {
        Ping,
        Move { x: i64, y: i64 },
        Say(String, Option<char>),
    }

    fn codec_for(big: bool, variable: bool) -> Bincode {
        Bincode::new(
            Configuration::builder()
                .endian(if big { Endian::Big } else { Endian::Little })
                .int_encoding(if variable { IntEncoding::Variable } else { IntEncoding::Fixed })
                .build(),
        )
    }

    #[test]
    fn test_record_scenario() {
        let record = Record {
            flag: false,
            count: -42,
            name: "hi".to_string(),
        };
        let bytes = encode(&record).unwrap();
        assert_eq!(bytes, vec![0x00, 0x53, 0x02, 0x68, 0x69]);
        assert_eq!(decode::<Record>(&bytes).unwrap(), record);
    }

    #[test]
    fn test_varint_boundaries_through_serde() {
        let cases: [(u64, &[u8]); 7] = [
            (250, &[250]),
            (251, &[251, 251, 0]),
            (252, &[251, 252, 0]),
            (65535, &[251, 255, 255]),
            (65536, &[252, 0, 0, 1, 0]),
            (4294967295, &[252, 255, 255, 255, 255]),
            (4294967296, &[253, 0, 0, 0, 0, 1, 0, 0, 0]),
        ];
        for (value, expected) in cases {
            assert_eq!(encode(&value).unwrap(), expected, "u64 {value}");
            assert_eq!(decode::<u64>(expected).unwrap(), value);
            if let Ok(narrow) = u32::try_from(value) {
                assert_eq!(encode(&narrow).unwrap(), expected, "u32 {value}");
                assert_eq!(decode::<u32>(expected).unwrap(), narrow);
            }
        }
    }

    #[test]
    fn test_shared_codec_across_threads() {
        let codec = codec_for(true, true);
        let handles: Vec<_> = (0..4i64)
            .map(|i| {
                std::thread::spawn(move || {
                    let event = Event::Move { x: i, y: -i };
                    let bytes = codec.encode(&event).unwrap();
                    codec.decode::<Event>(&bytes).unwrap() == event
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    fn event_strategy() -> impl Strategy<Value = Event> {
        prop_oneof![
            Just(Event::Ping),
            (any::<i64>(), any::<i64>()).prop_map(|(x, y)| Event::Move { x, y }),
            (".*", any::<Option<char>>()).prop_map(|(s, c)| Event::Say(s, c)),
        ]
    }

    proptest! {
        #[test]
        fn prop_integers_roundtrip(
            big in any::<bool>(),
            variable in any::<bool>(),
            a in any::<i16>(),
            b in any::<i32>(),
            c in any::<i64>(),
            d in any::<u16>(),
            e in any::<u32>(),
            f in any::<u64>(),
        ) {
            let codec = codec_for(big, variable);
            let value = (a, b, c, d, e, f);
            let bytes = codec.encode(&value).unwrap();
            prop_assert_eq!(codec.decode::<(i16, i32, i64, u16, u32, u64)>(&bytes).unwrap(), value);
        }

        #[test]
        fn prop_floats_roundtrip_bitwise(
            big in any::<bool>(),
            variable in any::<bool>(),
            x in any::<f32>(),
            y in any::<f64>(),
        ) {
            let codec = codec_for(big, variable);
            let bytes = codec.encode(&(x, y)).unwrap();
            let (dx, dy) = codec.decode::<(f32, f64)>(&bytes).unwrap();
            prop_assert_eq!(dx.to_bits(), x.to_bits());
            prop_assert_eq!(dy.to_bits(), y.to_bits());
        }

        #[test]
        fn prop_events_roundtrip(
            big in any::<bool>(),
            variable in any::<bool>(),
            events in proptest::collection::vec(event_strategy(), 0..8),
        ) {
            let codec = codec_for(big, variable);
            let bytes = codec.encode(&events).unwrap();
            prop_assert_eq!(codec.decode::<Vec<Event>>(&bytes).unwrap(), events);
        }

        #[test]
        fn prop_zigzag_inverse(v in any::<i64>()) {
            prop_assert_eq!(codec::zigzag_decode(codec::zigzag_encode(v)), v);
        }

        #[test]
        fn prop_any_length_prefix_fails_cleanly(
            len in any::<u64>(),
            tail in proptest::collection::vec(any::<u8>(), 0..8),
        ) {
            let mut bytes = vec![253];
            bytes.extend_from_slice(&len.to_le_bytes());
            bytes.extend_from_slice(&tail);
            let _ = decode::<String>(&bytes);
            let _ = Bincode::DEFAULT.decode_from::<Vec<u8>, _>(bytes.as_slice());
        }

        #[test]
        fn prop_garbage_never_panics(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            let _ = decode::<Vec<Event>>(&data);
            let _ = decode::<Record>(&data);
        }
    }
}
