//! Codec configuration.
//!
//! Defaults match the reference bincode format: little-endian, variable
//! integer encoding, no byte limit, trailing bytes rejected.
//!
//! ```rust
//! use binkode::config::{Configuration, Endian, IntEncoding};
//!
//! let config = Configuration::builder()
//!     .endian(Endian::Big)
//!     .int_encoding(IntEncoding::Fixed)
//!     .limit(1024)
//!     .build();
//! assert!(config.is_big_endian());
//! assert!(!config.is_variable_int());
//! ```

use crate::codec::int::{ByteOrder, IntCodec};

/// Byte order for multi-byte integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    /// Host byte order, resolved when the configuration is built.
    Native,
    /// Most significant byte first (network order).
    Big,
    /// Least significant byte first.
    Little,
}

/// Integer width mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntEncoding {
    /// Dense varint with zigzag for signed values.
    Variable,
    /// Raw N-byte two's complement.
    Fixed,
}

/// Cumulative byte budget for a single decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeLimit {
    Infinite,
    Bounded(u64),
}

/// What to do with input left over after a complete top-level value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trailing {
    Reject,
    Allow,
}

/// Immutable codec settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Configuration {
    endian: Endian,
    int_encoding: IntEncoding,
    byte_limit: SizeLimit,
    trailing: Trailing,
    big_endian: bool,
}

impl Configuration {
    /// The reference bincode defaults.
    pub const DEFAULT: Configuration = Configuration {
        endian: Endian::Little,
        int_encoding: IntEncoding::Variable,
        byte_limit: SizeLimit::Infinite,
        trailing: Trailing::Reject,
        big_endian: false,
    };

    /// Starts a builder from [`Configuration::DEFAULT`].
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::from(Self::DEFAULT)
    }

    /// Starts a builder that copies this configuration.
    pub fn to_builder(self) -> ConfigurationBuilder {
        ConfigurationBuilder::from(self)
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn int_encoding(&self) -> IntEncoding {
        self.int_encoding
    }

    pub fn byte_limit(&self) -> SizeLimit {
        self.byte_limit
    }

    pub fn trailing(&self) -> Trailing {
        self.trailing
    }

    /// Resolved byte order. `Native` was fixed to the host order at build time.
    pub fn is_big_endian(&self) -> bool {
        self.big_endian
    }

    pub fn is_variable_int(&self) -> bool {
        self.int_encoding == IntEncoding::Variable
    }

    /// The integer strategy every primitive of this configuration goes through.
    pub fn int_codec(&self) -> IntCodec {
        let order = if self.big_endian {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        };
        IntCodec::new(order, self.int_encoding)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Derives a new [`Configuration`] from an existing one.
#[derive(Debug, Clone, Copy)]
pub struct ConfigurationBuilder {
    endian: Endian,
    int_encoding: IntEncoding,
    byte_limit: SizeLimit,
    trailing: Trailing,
}

impl From<Configuration> for ConfigurationBuilder {
    fn from(config: Configuration) -> Self {
        Self {
            endian: config.endian,
            int_encoding: config.int_encoding,
            byte_limit: config.byte_limit,
            trailing: config.trailing,
        }
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::from(Configuration::DEFAULT)
    }
}

impl ConfigurationBuilder {
    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn int_encoding(mut self, int_encoding: IntEncoding) -> Self {
        self.int_encoding = int_encoding;
        self
    }

    pub fn byte_limit(mut self, byte_limit: SizeLimit) -> Self {
        self.byte_limit = byte_limit;
        self
    }

    /// Shorthand for `byte_limit(SizeLimit::Bounded(limit))`.
    pub fn limit(self, limit: u64) -> Self {
        self.byte_limit(SizeLimit::Bounded(limit))
    }

    pub fn trailing(mut self, trailing: Trailing) -> Self {
        self.trailing = trailing;
        self
    }

    /// Shorthand for `trailing(Trailing::Allow)`.
    pub fn allow_trailing(self) -> Self {
        self.trailing(Trailing::Allow)
    }

    pub fn build(self) -> Configuration {
        let big_endian = match self.endian {
            Endian::Native => cfg!(target_endian = "big"),
            Endian::Big => true,
            Endian::Little => false,
        };
        Configuration {
            endian: self.endian,
            int_encoding: self.int_encoding,
            byte_limit: self.byte_limit,
            trailing: self.trailing,
            big_endian,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_format() {
        let config = Configuration::default();
        assert_eq!(config.endian(), Endian::Little);
        assert_eq!(config.int_encoding(), IntEncoding::Variable);
        assert_eq!(config.byte_limit(), SizeLimit::Infinite);
        assert_eq!(config.trailing(), Trailing::Reject);
        assert!(!config.is_big_endian());
        assert!(config.is_variable_int());
    }

    #[test]
    fn test_builder_from_default_is_identity() {
        assert_eq!(Configuration::builder().build(), Configuration::DEFAULT);
    }

    #[test]
    fn test_builder_derives_from_existing() {
        let base = Configuration::builder().endian(Endian::Big).limit(16).build();
        let derived = base.to_builder().int_encoding(IntEncoding::Fixed).build();

        assert!(derived.is_big_endian());
        assert_eq!(derived.byte_limit(), SizeLimit::Bounded(16));
        assert!(!derived.is_variable_int());
        // the source configuration is untouched
        assert!(base.is_variable_int());
    }

    #[test]
    fn test_native_resolves_to_host() {
        let config = Configuration::builder().endian(Endian::Native).build();
        assert_eq!(config.endian(), Endian::Native);
        assert_eq!(config.is_big_endian(), cfg!(target_endian = "big"));
    }

    #[test]
    fn test_allow_trailing() {
        let config = Configuration::builder().allow_trailing().build();
        assert_eq!(config.trailing(), Trailing::Allow);
    }
}
