//! Document store client.
//!
//! The store is a schemaless remote database addressed by collection name
//! and document id. Two backends share one API: [`HttpStore`] talks to the
//! managed store over its JSON API, [`MemoryStore`] keeps everything in
//! process memory for tests and local development.
//!
//! Backends are dispatched through the [`DocumentStore`] enum rather than a
//! trait object; the methods are async and the call sites only ever care
//! about these two implementations.

pub mod http;
pub mod memory;

use maplewood_core::DocumentId;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

pub use http::HttpStore;
pub use memory::MemoryStore;

/// The body of a document: a flat JSON object.
pub type Fields = Map<String, Value>;

/// A document read from the store: its assigned id plus its fields.
///
/// The id is never part of `fields`; it is carried alongside and attached
/// to typed records after decoding.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Fields,
}

impl Document {
    /// Decode the document body into a typed record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Parse` if the fields do not fit the target type.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(Value::Object(self.fields))?)
    }
}

/// Serialize a record into a document body.
///
/// # Errors
///
/// Returns `StoreError::Parse` if the value does not serialize to a JSON
/// object.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::NotAnObject(other)),
    }
}

/// Sort direction for ordered collection reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request.
    #[error("store returned {status}: {message}")]
    Status { status: u16, message: String },

    /// An ordered read the store cannot satisfy, e.g. ordering by a field
    /// absent from every document of the collection. Callers may fall back
    /// to an unordered read.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A record serialized to something other than a JSON object.
    #[error("document body must be a JSON object, got: {0}")]
    NotAnObject(Value),
}

/// A handle to one of the store backends.
#[derive(Clone)]
pub enum DocumentStore {
    Http(HttpStore),
    Memory(MemoryStore),
}

impl DocumentStore {
    /// Unordered collection read, in store insertion order, optionally
    /// capped at `limit` documents.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend call fails.
    pub async fn list(
        &self,
        collection: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        match self {
            Self::Http(store) => store.list(collection, limit).await,
            Self::Memory(store) => store.list(collection, limit),
        }
    }

    /// Ordered collection read. Documents missing `order_by` are excluded;
    /// if every document of a non-empty collection misses it the store
    /// reports `StoreError::InvalidQuery`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidQuery` for an unsatisfiable ordering, or
    /// another `StoreError` if the backend call fails.
    pub async fn list_ordered(
        &self,
        collection: &str,
        order_by: &str,
        direction: Direction,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        match self {
            Self::Http(store) => store.list_ordered(collection, order_by, direction, limit).await,
            Self::Memory(store) => store.list_ordered(collection, order_by, direction, limit),
        }
    }

    /// Point read by id. A missing document is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend call fails.
    pub async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        match self {
            Self::Http(store) => store.get(collection, id).await,
            Self::Memory(store) => Ok(store.get(collection, id)),
        }
    }

    /// Insert a new document; the store assigns and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend call fails.
    pub async fn insert(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<DocumentId, StoreError> {
        match self {
            Self::Http(store) => store.insert(collection, fields).await,
            Self::Memory(store) => Ok(store.insert(collection, fields)),
        }
    }

    /// Merge-write onto a document addressed by id: supplied fields are
    /// set, everything else is preserved. Creates the document when absent
    /// (fixed-identity records rely on this).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend call fails.
    pub async fn merge(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<(), StoreError> {
        match self {
            Self::Http(store) => store.merge(collection, id, fields).await,
            Self::Memory(store) => {
                store.merge(collection, id, fields);
                Ok(())
            }
        }
    }

    /// Delete by id. Deleting a nonexistent id succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend call fails.
    pub async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError> {
        match self {
            Self::Http(store) => store.delete(collection, id).await,
            Self::Memory(store) => {
                store.delete(collection, id);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Record {
        title: String,
    }

    #[test]
    fn test_to_fields_object() {
        let fields = to_fields(&Record {
            title: "Hi".to_string(),
        })
        .expect("fields");
        assert_eq!(fields["title"], "Hi");
    }

    #[test]
    fn test_to_fields_rejects_non_object() {
        let err = to_fields(&"just a string").unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject(_)));
    }

    #[test]
    fn test_document_decode() {
        let mut fields = Fields::new();
        fields.insert("title".to_string(), Value::String("Hi".to_string()));
        let doc = Document {
            id: DocumentId::from("a1"),
            fields,
        };
        #[derive(serde::Deserialize)]
        struct Out {
            title: String,
        }
        let out: Out = doc.decode().expect("decode");
        assert_eq!(out.title, "Hi");
    }
}
