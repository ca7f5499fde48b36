//! Value types for documents
//!
//! This module defines:
//! - Value: tagged union of the scalar payloads a document property can hold
//! - The value codec: `Value` <-> bytes stored under a property key
//!
//! ## Value Model
//!
//! The Value enum has exactly 6 variants:
//! - String, Iri, Int, Float, Binary, Empty
//!
//! `Empty(true)` is the tombstone payload written to a deleted document's marker.
//!
//! ### Type Rules
//!
//! - Different variants are NEVER equal: `Int(1) != Float(1.0)`,
//!   `Iri("a") != String("a")`
//! - Float uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`
//!
//! ## Encoding
//!
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────┐
//! │ Tag (1 byte)     │ Payload (variant)                            │
//! └──────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! Payloads are not length-prefixed: a stored value is always a whole byte string.
//! Numerics are little-endian. The layout is a persisted format; changing it is a
//! data migration.

use serde::{Deserialize, Serialize};

use crate::error::{DocStoreError, Result};

/// Value tag bytes
const TAG_STRING: u8 = 0x01;
const TAG_IRI: u8 = 0x02;
const TAG_INT: u8 = 0x03;
const TAG_FLOAT: u8 = 0x04;
const TAG_BINARY: u8 = 0x05;
const TAG_EMPTY: u8 = 0x06;

/// A property value
///
/// Values are immutable once constructed. Equality is structural and
/// variant-sensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// UTF-8 text
    String(String),
    /// Resource identifier, kept distinct from plain text
    Iri(String),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// Raw bytes
    Binary(Vec<u8>),
    /// Explicitly empty value; `Empty(true)` marks a tombstone
    Empty(bool),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Iri(a), Value::Iri(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Empty(a), Value::Empty(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// The tombstone payload
    pub const TOMBSTONE: Value = Value::Empty(true);

    /// Get the variant name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "String",
            Value::Iri(_) => "Iri",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Binary(_) => "Binary",
            Value::Empty(_) => "Empty",
        }
    }

    /// Check if this is an `Empty` value (either flag)
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty(_))
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as &str if this is an Iri value
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Value::Iri(s) => Some(s),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float value
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as &[u8] if this is a Binary value
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Serialize to the stored byte form.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Value::String(s) => tagged(TAG_STRING, s.as_bytes()),
            Value::Iri(s) => tagged(TAG_IRI, s.as_bytes()),
            Value::Int(i) => tagged(TAG_INT, &i.to_le_bytes()),
            Value::Float(f) => tagged(TAG_FLOAT, &f.to_bits().to_le_bytes()),
            Value::Binary(b) => tagged(TAG_BINARY, b),
            Value::Empty(flag) => tagged(TAG_EMPTY, &[u8::from(*flag)]),
        }
    }

    /// Deserialize from the stored byte form.
    ///
    /// Fails with `DataError` on empty input, an unknown tag, a fixed-width
    /// payload of the wrong length, invalid UTF-8, or an `Empty` flag other
    /// than 0 or 1.
    pub fn from_bytes(bytes: &[u8]) -> Result<Value> {
        let (&tag, payload) = bytes
            .split_first()
            .ok_or_else(|| DocStoreError::data("empty value encoding"))?;

        match tag {
            TAG_STRING => Ok(Value::String(utf8(payload)?)),
            TAG_IRI => Ok(Value::Iri(utf8(payload)?)),
            TAG_INT => Ok(Value::Int(i64::from_le_bytes(fixed::<8>(payload, "Int")?))),
            TAG_FLOAT => Ok(Value::Float(f64::from_bits(u64::from_le_bytes(
                fixed::<8>(payload, "Float")?,
            )))),
            TAG_BINARY => Ok(Value::Binary(payload.to_vec())),
            TAG_EMPTY => match payload {
                [0] => Ok(Value::Empty(false)),
                [1] => Ok(Value::Empty(true)),
                _ => Err(DocStoreError::data("malformed Empty payload")),
            },
            other => Err(DocStoreError::data(format!(
                "unknown value tag 0x{:02x}",
                other
            ))),
        }
    }
}

fn tagged(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(1 + payload.len());
    bytes.push(tag);
    bytes.extend_from_slice(payload);
    bytes
}

fn utf8(payload: &[u8]) -> Result<String> {
    String::from_utf8(payload.to_vec())
        .map_err(|e| DocStoreError::data(format!("invalid UTF-8 in value: {}", e)))
}

fn fixed<const N: usize>(payload: &[u8], variant: &str) -> Result<[u8; N]> {
    payload.try_into().map_err(|_| {
        DocStoreError::data(format!(
            "{} payload is {} bytes, expected {}",
            variant,
            payload.len(),
            N
        ))
    })
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Binary(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Binary(b.to_vec())
    }
}
