//! In-memory store backend.
//!
//! Backs tests and credential-less local development. Collections are kept
//! in insertion order, mirroring the unordered-read contract of the remote
//! store, and the ordered-read failure mode (ordering by a field no
//! document carries) is reproduced so the fallback path can be exercised
//! without a live store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use maplewood_core::DocumentId;
use serde_json::Value;

use super::{Direction, Document, Fields, StoreError};

/// An in-memory document store.
///
/// Cheaply cloneable; clones share the same underlying collections.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, Vec<(String, Fields)>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unordered read in insertion order.
    ///
    /// # Errors
    ///
    /// Infallible for this backend; the signature matches the remote one.
    pub fn list(
        &self,
        collection: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.lock();
        let docs = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .take(limit.unwrap_or(usize::MAX))
                    .map(|(id, fields)| Document {
                        id: DocumentId::from(id.as_str()),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    /// Ordered read. Documents missing `order_by` are excluded; a non-empty
    /// collection where no document carries the field is an invalid query.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidQuery` when the ordering is
    /// unsatisfiable.
    pub fn list_ordered(
        &self,
        collection: &str,
        order_by: &str,
        direction: Direction,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.lock();
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matching: Vec<(String, Fields)> = docs
            .iter()
            .filter(|(_, fields)| {
                fields
                    .get(order_by)
                    .is_some_and(|value| !value.is_null())
            })
            .cloned()
            .collect();

        if matching.is_empty() && !docs.is_empty() {
            return Err(StoreError::InvalidQuery(format!(
                "no document in '{collection}' carries ordering field '{order_by}'"
            )));
        }

        matching.sort_by(|(_, a), (_, b)| {
            let ord = compare_values(a.get(order_by), b.get(order_by));
            match direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            }
        });

        Ok(matching
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|(id, fields)| Document {
                id: DocumentId::new(id),
                fields,
            })
            .collect())
    }

    /// Point read by id.
    #[must_use]
    pub fn get(&self, collection: &str, id: &DocumentId) -> Option<Document> {
        let collections = self.lock();
        collections.get(collection).and_then(|docs| {
            docs.iter()
                .find(|(doc_id, _)| doc_id == id.as_str())
                .map(|(doc_id, fields)| Document {
                    id: DocumentId::from(doc_id.as_str()),
                    fields: fields.clone(),
                })
        })
    }

    /// Insert a new document and assign it an id.
    pub fn insert(&self, collection: &str, fields: Fields) -> DocumentId {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut collections = self.lock();
        collections
            .entry(collection.to_owned())
            .or_default()
            .push((id.clone(), fields));
        DocumentId::new(id)
    }

    /// Merge-write by id; creates the document when absent.
    pub fn merge(&self, collection: &str, id: &DocumentId, fields: Fields) {
        let mut collections = self.lock();
        let docs = collections.entry(collection.to_owned()).or_default();
        if let Some((_, existing)) = docs.iter_mut().find(|(doc_id, _)| doc_id == id.as_str()) {
            for (key, value) in fields {
                existing.insert(key, value);
            }
        } else {
            docs.push((id.as_str().to_owned(), fields));
        }
    }

    /// Delete by id; a missing id is a no-op.
    pub fn delete(&self, collection: &str, id: &DocumentId) {
        let mut collections = self.lock();
        if let Some(docs) = collections.get_mut(collection) {
            docs.retain(|(doc_id, _)| doc_id != id.as_str());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<(String, Fields)>>> {
        // A poisoned lock means a panic mid-mutation in another test thread;
        // the data is still usable for our flat map of JSON values.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Compare two JSON values for ordering purposes. Strings compare
/// lexicographically (RFC 3339 timestamps sort chronologically this way),
/// numbers numerically; mixed or other types keep their relative order.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), Value::String((*v).to_owned())))
            .collect()
    }

    #[test]
    fn test_insert_then_list_preserves_order() {
        let store = MemoryStore::new();
        let first = store.insert("classes", fields(&[("title", "a")]));
        let second = store.insert("classes", fields(&[("title", "b")]));

        let docs = store.list("classes", None).expect("list");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, first);
        assert_eq!(docs[1].id, second);
    }

    #[test]
    fn test_list_respects_limit() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.insert("classes", fields(&[("title", &i.to_string())]));
        }
        let docs = store.list("classes", Some(3)).expect("list");
        assert_eq!(docs.len(), 3);
    }

    #[test]
    fn test_list_ordered_descending() {
        let store = MemoryStore::new();
        store.insert("announcements", fields(&[("timestamp", "2026-01-01T00:00:00Z")]));
        store.insert("announcements", fields(&[("timestamp", "2026-03-01T00:00:00Z")]));
        store.insert("announcements", fields(&[("timestamp", "2026-02-01T00:00:00Z")]));

        let docs = store
            .list_ordered("announcements", "timestamp", Direction::Descending, None)
            .expect("ordered");
        let stamps: Vec<&str> = docs
            .iter()
            .map(|d| d.fields["timestamp"].as_str().expect("string"))
            .collect();
        assert_eq!(
            stamps,
            vec![
                "2026-03-01T00:00:00Z",
                "2026-02-01T00:00:00Z",
                "2026-01-01T00:00:00Z"
            ]
        );
    }

    #[test]
    fn test_list_ordered_excludes_documents_missing_field() {
        let store = MemoryStore::new();
        store.insert("announcements", fields(&[("timestamp", "2026-01-01T00:00:00Z")]));
        store.insert("announcements", fields(&[("title", "no timestamp")]));

        let docs = store
            .list_ordered("announcements", "timestamp", Direction::Descending, None)
            .expect("ordered");
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_list_ordered_invalid_when_field_absent_everywhere() {
        let store = MemoryStore::new();
        store.insert("announcements", fields(&[("title", "legacy")]));

        let err = store
            .list_ordered("announcements", "timestamp", Direction::Descending, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuery(_)));
    }

    #[test]
    fn test_list_ordered_empty_collection_is_empty_not_invalid() {
        let store = MemoryStore::new();
        let docs = store
            .list_ordered("announcements", "timestamp", Direction::Descending, None)
            .expect("ordered");
        assert!(docs.is_empty());
    }

    #[test]
    fn test_merge_preserves_other_fields() {
        let store = MemoryStore::new();
        let id = DocumentId::from("default");
        store.merge("settings", &id, fields(&[("email", "a@b.c")]));
        store.merge("settings", &id, fields(&[("about", "hello")]));

        let doc = store.get("settings", &id).expect("present");
        assert_eq!(doc.fields["email"], "a@b.c");
        assert_eq!(doc.fields["about"], "hello");
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let store = MemoryStore::new();
        store.delete("classes", &DocumentId::from("ghost"));

        let id = store.insert("classes", fields(&[("title", "a")]));
        store.delete("classes", &id);
        store.delete("classes", &id);
        assert!(store.list("classes", None).expect("list").is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let store = MemoryStore::new();
        let clone = store.clone();
        store.insert("camps", fields(&[("title", "summer")]));
        assert_eq!(clone.list("camps", None).expect("list").len(), 1);
    }
}
