//! Documents and query filters
//!
//! A [`Document`] is a docid plus a map of property name to [`Value`]. Documents
//! are built by callers and mutated only through a transaction; deletion replaces
//! the stored state with a tombstone rather than removing the entity.
//!
//! A [`Filter`] selects documents by presence or equality of one property.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A structured document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    docid: String,
    properties: BTreeMap<String, Value>,
    /// Properties written with no value; a write issues a Store delete for each.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    cleared: BTreeSet<String>,
}

impl Document {
    /// Create an empty document
    pub fn new(docid: impl Into<String>) -> Self {
        Document {
            docid: docid.into(),
            properties: BTreeMap::new(),
            cleared: BTreeSet::new(),
        }
    }

    /// Builder-style property setter
    pub fn with(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(property, value);
        self
    }

    /// Document id
    pub fn docid(&self) -> &str {
        &self.docid
    }

    /// Set a property, replacing any previous value
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<Value>) {
        let property = property.into();
        self.cleared.remove(&property);
        self.properties.insert(property, value.into());
    }

    /// Mark a property as having no value
    ///
    /// Writing the document removes the property from the Store.
    pub fn clear(&mut self, property: impl Into<String>) {
        let property = property.into();
        self.properties.remove(&property);
        self.cleared.insert(property);
    }

    /// Get a property value
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.properties.get(property)
    }

    /// Check if the document has a property
    pub fn contains(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    /// All properties with a value, in name order
    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    /// Properties marked as having no value
    pub fn cleared(&self) -> &BTreeSet<String> {
        &self.cleared
    }

    /// Number of properties with a value
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if the document has no properties with a value
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Consume into (docid, properties)
    pub fn into_parts(self) -> (String, BTreeMap<String, Value>) {
        (self.docid, self.properties)
    }
}

/// Document selection predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Filter {
    /// Match every live document
    #[default]
    MatchAll,
    /// Presence (`value: None`) or equality (`value: Some(v)`) on one property
    Simple {
        /// Property name to test
        property: String,
        /// Required value, if any
        value: Option<Value>,
    },
}

impl Filter {
    /// Presence filter on `property`
    pub fn has(property: impl Into<String>) -> Self {
        Filter::Simple {
            property: property.into(),
            value: None,
        }
    }

    /// Equality filter on `property`
    pub fn equals(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Simple {
            property: property.into(),
            value: Some(value.into()),
        }
    }

    /// Evaluate against a live document
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::MatchAll => true,
            Filter::Simple {
                property,
                value: None,
            } => doc.contains(property),
            Filter::Simple {
                property,
                value: Some(expected),
            } => doc.get(property) == Some(expected),
        }
    }
}

/// A query over a snapshot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    /// Filter applied to each live document
    pub filter: Filter,
}

impl Query {
    /// Query with the given filter
    pub fn new(filter: Filter) -> Self {
        Query { filter }
    }
}

impl From<Filter> for Query {
    fn from(filter: Filter) -> Self {
        Query::new(filter)
    }
}
