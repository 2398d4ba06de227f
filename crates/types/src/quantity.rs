//! Serde helpers for the two numeric encodings the indexer speaks.
//!
//! The JSON-RPC node delivers quantities as `0x`-prefixed lowercase hex; the
//! document store carries anything wider than 64 bits as a base-10 decimal
//! string. `"0x0"`, `"0x"` and the empty string all decode to zero.

use alloy::primitives::U256;
use serde::{de, Deserialize, Deserializer, Serializer};

/// Parses a hex quantity string into a `u64`.
pub fn parse_hex_u64(s: &str) -> Result<u64, ParseQuantityError> {
    let digits = strip_prefix(s);
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16).map_err(|_| ParseQuantityError::new(s))
}

/// Parses a hex quantity string into a [`U256`].
pub fn parse_hex_u256(s: &str) -> Result<U256, ParseQuantityError> {
    let digits = strip_prefix(s);
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16).map_err(|_| ParseQuantityError::new(s))
}

/// Parses a base-10 decimal string into a [`U256`].
pub fn parse_dec_u256(s: &str) -> Result<U256, ParseQuantityError> {
    U256::from_str_radix(s, 10).map_err(|_| ParseQuantityError::new(s))
}

fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

/// A quantity string that is neither a hex nor a decimal number.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid quantity string: {0:?}")]
pub struct ParseQuantityError(String);

impl ParseQuantityError {
    fn new(s: &str) -> Self {
        Self(s.into())
    }
}

/// Serde adapter for `u64` fields encoded as hex quantity strings.
pub mod hex_u64 {
    use super::*;

    /// Serializes as `0x`-prefixed lowercase hex.
    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:#x}"))
    }

    /// Deserializes from a hex quantity string; empty and `0x` decode to 0.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_hex_u64(&s).map_err(de::Error::custom)
    }
}

/// Serde adapter for [`U256`] fields encoded as hex quantity strings.
pub mod hex_u256 {
    use super::*;

    /// Serializes as `0x`-prefixed lowercase hex.
    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:#x}"))
    }

    /// Deserializes from a hex quantity string; empty and `0x` decode to 0.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_hex_u256(&s).map_err(de::Error::custom)
    }
}

/// Serde adapter for [`U256`] fields stored as base-10 decimal strings.
pub mod dec_u256 {
    use super::*;

    /// Serializes as a base-10 decimal string.
    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    /// Deserializes from a base-10 decimal string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_dec_u256(&s).map_err(de::Error::custom)
    }
}
