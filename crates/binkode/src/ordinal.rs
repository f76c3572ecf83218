//! Fieldless enums as a signed 32-bit ordinal.
//!
//! By default an enum variant is written as an unsigned 32-bit discriminant.
//! Peers that write plain enums as their zero-based ordinal through the
//! signed integer path (zigzag in variable mode) can be matched per field:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! enum Color { Red, Green, Blue }
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Pixel {
//!     #[serde(with = "binkode::ordinal")]
//!     color: Color,
//! }
//!
//! let bytes = binkode::encode(&Pixel { color: Color::Green }).unwrap();
//! assert_eq!(bytes, [2]);
//! assert_eq!(binkode::decode::<Pixel>(&bytes).unwrap().color, Color::Green);
//! ```
//!
//! Only unit variants are accepted. The same wire form is produced by
//! [`Encoder::encode_enum`](crate::Encoder::encode_enum).

use serde::de::value::U32Deserializer;
use serde::de::{self, Unexpected};
use serde::ser::{self, Impossible};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EncodeError;

/// Writes the variant of `value` as its ordinal.
pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: ?Sized + Serialize,
    S: Serializer,
{
    let index = value
        .serialize(VariantIndex)
        .map_err(<S::Error as ser::Error>::custom)?;
    let ordinal = i32::try_from(index)
        .map_err(|_| <S::Error as ser::Error>::custom("enum ordinal exceeds i32::MAX"))?;
    serializer.serialize_i32(ordinal)
}

/// Reads an ordinal and resolves it to a unit variant of `T`.
pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    let ordinal = i32::deserialize(deserializer)?;
    let index = u32::try_from(ordinal).map_err(|_| {
        <D::Error as de::Error>::invalid_value(
            Unexpected::Signed(ordinal as i64),
            &"a non-negative enum ordinal",
        )
    })?;
    T::deserialize(U32Deserializer::<D::Error>::new(index))
}

/// Captures the index of a unit variant and rejects everything else.
struct VariantIndex;

macro_rules! reject {
    ($($method:ident($($arg:ty),*);)*) => {
        $(
            fn $method(self, $(_: $arg),*) -> Result<u32, EncodeError> {
                Err(EncodeError::NotFieldlessEnum)
            }
        )*
    };
}

macro_rules! reject_compound {
    ($($method:ident($($arg:ty),*) -> $ret:ident;)*) => {
        $(
            fn $method(self, $(_: $arg),*) -> Result<Self::$ret, EncodeError> {
                Err(EncodeError::NotFieldlessEnum)
            }
        )*
    };
}

impl Serializer for VariantIndex {
    type Ok = u32;
    type Error = EncodeError;
    type SerializeSeq = Impossible<u32, EncodeError>;
    type SerializeTuple = Impossible<u32, EncodeError>;
    type SerializeTupleStruct = Impossible<u32, EncodeError>;
    type SerializeTupleVariant = Impossible<u32, EncodeError>;
    type SerializeMap = Impossible<u32, EncodeError>;
    type SerializeStruct = Impossible<u32, EncodeError>;
    type SerializeStructVariant = Impossible<u32, EncodeError>;

    reject! {
        serialize_bool(bool);
        serialize_i8(i8);
        serialize_i16(i16);
        serialize_i32(i32);
        serialize_i64(i64);
        serialize_u8(u8);
        serialize_u16(u16);
        serialize_u32(u32);
        serialize_u64(u64);
        serialize_f32(f32);
        serialize_f64(f64);
        serialize_char(char);
        serialize_str(&str);
        serialize_bytes(&[u8]);
        serialize_none();
        serialize_unit();
        serialize_unit_struct(&'static str);
    }

    reject_compound! {
        serialize_seq(Option<usize>) -> SerializeSeq;
        serialize_tuple(usize) -> SerializeTuple;
        serialize_tuple_struct(&'static str, usize) -> SerializeTupleStruct;
        serialize_tuple_variant(&'static str, u32, &'static str, usize) -> SerializeTupleVariant;
        serialize_map(Option<usize>) -> SerializeMap;
        serialize_struct(&'static str, usize) -> SerializeStruct;
        serialize_struct_variant(&'static str, u32, &'static str, usize) -> SerializeStructVariant;
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
    ) -> Result<u32, EncodeError> {
        Ok(variant_index)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<u32, EncodeError> {
        Err(EncodeError::NotFieldlessEnum)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<u32, EncodeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<u32, EncodeError> {
        Err(EncodeError::NotFieldlessEnum)
    }
}
