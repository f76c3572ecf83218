//! Byte-level encoding/decoding engine.
//!
//! Leaf-first: [`cursor`] moves bytes, [`int`] turns integers into bytes,
//! [`bounded`] caps how much a decode may read, and the [`encoder`] /
//! [`decoder`] sessions implement every scalar and structural operation on
//! top of them.

pub mod bounded;
pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod int;

pub use bounded::Bounded;
pub use cursor::{Bytes, IoSource, SliceSource, Source, Writer};
pub use decoder::{Decoder, FieldCursor};
pub use encoder::{parse_sealed_name, sealed_name, Encoder, SEALED_TAG};
pub use int::{zigzag_decode, zigzag_encode, ByteOrder, IntCodec};
