//! Document assembler: sorted Store entries back into documents
//!
//! The key encoding keeps every entry of one document contiguous in key order,
//! with the liveness marker first. [`next_document`] consumes exactly one such
//! run from a peekable stream and stops at the first entry of another document.

use std::iter::Peekable;

use docstore_core::key::{decode_key, encode_prefix, MARKER_PROPERTY};
use docstore_core::{DocStoreError, Document, Result, StoreEntry, Value};

/// A document as read back from the Store, with its liveness marker
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    /// Document with every stored property
    pub document: Document,
    /// Marker value: `Iri(docid)` when live, `Empty(true)` when tombstoned
    pub marker: Value,
}

impl DocumentRecord {
    /// Check if the document is tombstoned
    pub fn is_deleted(&self) -> bool {
        self.marker.is_empty()
    }

    /// Docid of the record
    pub fn docid(&self) -> &str {
        self.document.docid()
    }

    /// Consume into the document
    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Assemble the next document from `entries`
///
/// Returns `Ok(None)` at end of input. Fails with `DataError` if a consumed key
/// or value does not decode, or if the run has no liveness marker; nothing
/// partial is returned on failure.
pub fn next_document<I>(entries: &mut Peekable<I>) -> Result<Option<DocumentRecord>>
where
    I: Iterator<Item = StoreEntry>,
{
    let Some(first) = entries.next() else {
        return Ok(None);
    };
    let (docid, property) = decode_key(&first.key)?;
    let prefix = encode_prefix(&docid);

    let mut document = Document::new(docid.clone());
    let mut marker = None;
    let mut add = |property: String, value: Value| {
        if property == MARKER_PROPERTY {
            marker = Some(value);
        } else {
            document.set(property, value);
        }
    };
    add(property, Value::from_bytes(&first.value)?);

    while let Some(entry) = entries.next_if(|entry| entry.key.starts_with(&prefix)) {
        let (_, property) = decode_key(&entry.key)?;
        add(property, Value::from_bytes(&entry.value)?);
    }

    match marker {
        Some(marker) => Ok(Some(DocumentRecord { document, marker })),
        None => Err(DocStoreError::data(format!(
            "document '{}' has no liveness marker",
            docid
        ))),
    }
}
