//! Key codec: (docid, property) <-> Store key
//!
//! ## Layout
//!
//! ```text
//! ┌────────────┬──────────────────┬──────┬──────────────────┬──────┐
//! │ 'v' (0x76) │ docid (UTF-8)    │ 0x00 │ property (UTF-8) │ 0x00 │
//! └────────────┴──────────────────┴──────┴──────────────────┴──────┘
//! ```
//!
//! `encode_prefix(D) = 'v' ++ D ++ 0x00` is the common prefix of every key of D.
//! Because docids contain no NUL, the NUL terminator makes the prefix exact: no
//! key of another docid starts with it, and under byte ordering all keys of one
//! document are contiguous.
//!
//! The liveness marker lives under the empty property name. Caller property
//! names must be non-empty, so the marker cannot collide with user data.
//!
//! This layout is the persisted contract with the Store.

use crate::error::{DocStoreError, Result};
use crate::limits::Limits;

/// Leading byte of every document key
pub const KEY_PREFIX_BYTE: u8 = b'v';

/// Separator/terminator byte
const NUL: u8 = 0x00;

/// Property name reserved for the liveness marker
pub const MARKER_PROPERTY: &str = "";

/// Encode the Store key of one property of a document.
///
/// Precondition: neither `docid` nor `property` contains a NUL byte.
pub fn encode_key(docid: &str, property: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(docid.len() + property.len() + 3);
    key.push(KEY_PREFIX_BYTE);
    key.extend_from_slice(docid.as_bytes());
    key.push(NUL);
    key.extend_from_slice(property.as_bytes());
    key.push(NUL);
    key
}

/// Encode the prefix selecting every key of `docid`.
pub fn encode_prefix(docid: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(docid.len() + 2);
    prefix.push(KEY_PREFIX_BYTE);
    prefix.extend_from_slice(docid.as_bytes());
    prefix.push(NUL);
    prefix
}

/// Encode the liveness marker key of `docid`.
pub fn marker_key(docid: &str) -> Vec<u8> {
    encode_key(docid, MARKER_PROPERTY)
}

/// Decode a Store key into `(docid, property)`.
///
/// The marker key decodes to an empty property name.
pub fn decode_key(key: &[u8]) -> Result<(String, String)> {
    let rest = match key.split_first() {
        Some((&KEY_PREFIX_BYTE, rest)) => rest,
        Some((other, _)) => {
            return Err(DocStoreError::data(format!(
                "key starts with 0x{:02x}, expected 0x{:02x}",
                other, KEY_PREFIX_BYTE
            )))
        }
        None => return Err(DocStoreError::data("empty key")),
    };

    let mut parts = rest.splitn(3, |b| *b == NUL);
    let (Some(docid), Some(property), Some(trailing)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(DocStoreError::data("key has fewer than two NUL separators"));
    };
    if !trailing.is_empty() {
        return Err(DocStoreError::data("trailing bytes after key terminator"));
    }
    if docid.is_empty() {
        return Err(DocStoreError::data("key has an empty docid"));
    }

    Ok((utf8(docid, "docid")?, utf8(property, "property")?))
}

/// Decode only the docid of a Store key.
pub fn decode_docid(key: &[u8]) -> Result<String> {
    decode_key(key).map(|(docid, _)| docid)
}

fn utf8(bytes: &[u8], what: &str) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| DocStoreError::data(format!("{} in key is not valid UTF-8", what)))
}

/// Validate a docid against `limits`.
///
/// Rules: non-empty, no NUL bytes, at most `max_docid_bytes`.
pub fn validate_docid(docid: &str, limits: &Limits) -> Result<()> {
    if docid.is_empty() {
        return Err(DocStoreError::invalid_argument("docid cannot be empty"));
    }
    if docid.contains('\x00') {
        return Err(DocStoreError::invalid_argument(
            "docid cannot contain NUL bytes",
        ));
    }
    if docid.len() > limits.max_docid_bytes {
        return Err(DocStoreError::invalid_argument(format!(
            "docid too long: {} bytes exceeds maximum {}",
            docid.len(),
            limits.max_docid_bytes
        )));
    }
    Ok(())
}

/// Validate a caller property name against `limits`.
///
/// Rules: non-empty (the empty name is the marker), no NUL bytes,
/// at most `max_property_bytes`.
pub fn validate_property(property: &str, limits: &Limits) -> Result<()> {
    if property.is_empty() {
        return Err(DocStoreError::invalid_argument(
            "property name cannot be empty",
        ));
    }
    if property.contains('\x00') {
        return Err(DocStoreError::invalid_argument(format!(
            "property name {:?} contains a NUL byte",
            property
        )));
    }
    if property.len() > limits.max_property_bytes {
        return Err(DocStoreError::invalid_argument(format!(
            "property name too long: {} bytes exceeds maximum {}",
            property.len(),
            limits.max_property_bytes
        )));
    }
    Ok(())
}
