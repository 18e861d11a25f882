//! Content repository: one operation per (entity, verb) pair.
//!
//! Sits between the request handlers and the document store / blob stash.
//! No cross-entity joins and no validation beyond what the types enforce;
//! the handlers validate form input, the store enforces nothing.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use maplewood_core::{
    Announcement, Camp, ClassSession, DocumentId, Material, NewAnnouncement, NewCamp,
    NewClassSession, NewMaterial, SETTINGS_DOC_ID, SettingsUpdate, SiteSettings,
};

use crate::store::{Direction, Document, DocumentStore, StoreError, to_fields};
use crate::uploads::{BlobStash, StashError};

/// Collection names in the document store.
pub const CLASSES: &str = "classes";
pub const CAMPS: &str = "camps";
pub const MATERIALS: &str = "materials";
pub const ANNOUNCEMENTS: &str = "announcements";
pub const SETTINGS: &str = "settings";

/// The announcement ordering field.
const ORDER_FIELD: &str = "timestamp";

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Document store call failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Blob storage failed.
    #[error("upload storage error: {0}")]
    Stash(#[from] StashError),
}

/// Result of listing announcements.
///
/// The ordered query over `timestamp` can be unsatisfiable (a store state
/// where no document carries the field); the repository then falls back to
/// an unordered read rather than failing the page. The tag makes that
/// ordering loss visible to callers instead of hiding it behind a caught
/// error.
#[derive(Debug)]
pub enum AnnouncementFeed {
    /// Newest first by `timestamp`; documents without one were excluded.
    Ordered(Vec<Announcement>),
    /// Fallback path: store insertion order, documents without a
    /// `timestamp` retained.
    Unordered(Vec<Announcement>),
}

impl AnnouncementFeed {
    /// The announcements, whichever path produced them.
    #[must_use]
    pub fn items(&self) -> &[Announcement] {
        match self {
            Self::Ordered(items) | Self::Unordered(items) => items,
        }
    }

    /// Consume the feed, keeping the announcements.
    #[must_use]
    pub fn into_items(self) -> Vec<Announcement> {
        match self {
            Self::Ordered(items) | Self::Unordered(items) => items,
        }
    }

    /// Whether the primary ordered path produced this feed.
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        matches!(self, Self::Ordered(_))
    }
}

/// Repository over the document store and the blob stash.
pub struct ContentRepository {
    store: DocumentStore,
    stash: BlobStash,
}

impl ContentRepository {
    /// Create a repository over a store backend and a blob stash.
    #[must_use]
    pub const fn new(store: DocumentStore, stash: BlobStash) -> Self {
        Self { store, stash }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Recent announcements, newest first, at most `limit`.
    ///
    /// Primary path: ordered query on `timestamp` descending, documents
    /// without a timestamp dropped. If the store reports the ordering as
    /// unsatisfiable, fall back to an unordered capped read that retains
    /// every document. The fallback is the disaster-recovery path for
    /// legacy data, not an error; only `InvalidQuery` triggers it, other
    /// store failures propagate. This is deliberately narrower than
    /// retrying on any read failure: transport and decode errors surface
    /// instead of being masked by a second query.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the store call fails (on the fallback
    /// path too).
    #[instrument(skip(self))]
    pub async fn list_announcements(&self, limit: usize) -> Result<AnnouncementFeed, RepoError> {
        match self
            .store
            .list_ordered(ANNOUNCEMENTS, ORDER_FIELD, Direction::Descending, Some(limit))
            .await
        {
            Ok(docs) => {
                let items = decode_all::<Announcement>(docs, |ann, id| ann.id = id)?
                    .into_iter()
                    .filter(|ann| ann.timestamp.is_some())
                    .collect();
                Ok(AnnouncementFeed::Ordered(items))
            }
            Err(StoreError::InvalidQuery(reason)) => {
                tracing::warn!(%reason, "ordered announcement query failed, using unordered fallback");
                let docs = self.store.list(ANNOUNCEMENTS, Some(limit)).await?;
                let items = decode_all::<Announcement>(docs, |ann, id| ann.id = id)?;
                Ok(AnnouncementFeed::Unordered(items))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// All class sessions, in store insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the store call fails.
    #[instrument(skip(self))]
    pub async fn classes(&self) -> Result<Vec<ClassSession>, RepoError> {
        let docs = self.store.list(CLASSES, None).await?;
        Ok(decode_all(docs, |class: &mut ClassSession, id| class.id = id)?)
    }

    /// All camps, in store insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the store call fails.
    #[instrument(skip(self))]
    pub async fn camps(&self) -> Result<Vec<Camp>, RepoError> {
        let docs = self.store.list(CAMPS, None).await?;
        Ok(decode_all(docs, |camp: &mut Camp, id| camp.id = id)?)
    }

    /// All study materials, in store insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the store call fails.
    #[instrument(skip(self))]
    pub async fn materials(&self) -> Result<Vec<Material>, RepoError> {
        let docs = self.store.list(MATERIALS, None).await?;
        Ok(decode_all(docs, |mat: &mut Material, id| mat.id = id)?)
    }

    /// Site settings from the fixed-identity document. A missing document
    /// resolves to the empty record.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the store call fails.
    #[instrument(skip(self))]
    pub async fn settings(&self) -> Result<SiteSettings, RepoError> {
        let doc = self
            .store
            .get(SETTINGS, &DocumentId::from(SETTINGS_DOC_ID))
            .await?;
        match doc {
            Some(doc) => Ok(doc.decode()?),
            None => Ok(SiteSettings::default()),
        }
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Insert a new class session.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the insert fails.
    #[instrument(skip(self, new))]
    pub async fn add_class(&self, new: NewClassSession) -> Result<DocumentId, RepoError> {
        Ok(self.store.insert(CLASSES, to_fields(&new)?).await?)
    }

    /// Insert a new camp.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the insert fails.
    #[instrument(skip(self, new))]
    pub async fn add_camp(&self, new: NewCamp) -> Result<DocumentId, RepoError> {
        Ok(self.store.insert(CAMPS, to_fields(&new)?).await?)
    }

    /// Stash the uploaded file, then insert the material document with the
    /// derived `file_name`, `file_url` and `uploaded_at` fields.
    ///
    /// Not transactional: a failed insert leaves the already-written blob
    /// orphaned on disk. That window is accepted and logged, not corrected.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Stash` if the blob write fails, or
    /// `RepoError::Store` if the insert fails.
    #[instrument(skip(self, new, bytes), fields(size = bytes.len()))]
    pub async fn add_material(
        &self,
        new: NewMaterial,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<DocumentId, RepoError> {
        let stashed = self.stash.stash(original_name, bytes).await?;

        let mut fields = to_fields(&new)?;
        fields.insert("file_name".to_owned(), Value::String(stashed.file_name.clone()));
        fields.insert("file_url".to_owned(), Value::String(stashed.url));
        fields.insert("uploaded_at".to_owned(), serde_json::to_value(Utc::now()).map_err(StoreError::from)?);

        match self.store.insert(MATERIALS, fields).await {
            Ok(id) => Ok(id),
            Err(err) => {
                tracing::warn!(
                    file_name = %stashed.file_name,
                    "material insert failed after blob write; blob left orphaned"
                );
                Err(err.into())
            }
        }
    }

    /// Insert a new announcement, stamping both the sortable `timestamp`
    /// and its human-readable `created_at` duplicate.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the insert fails.
    #[instrument(skip(self, new))]
    pub async fn add_announcement(&self, new: NewAnnouncement) -> Result<DocumentId, RepoError> {
        let now = Utc::now();
        let mut fields = to_fields(&new)?;
        fields.insert(
            ORDER_FIELD.to_owned(),
            serde_json::to_value(now).map_err(StoreError::from)?,
        );
        fields.insert(
            "created_at".to_owned(),
            Value::String(now.format("%Y-%m-%d %H:%M:%S").to_string()),
        );

        let id = self.store.insert(ANNOUNCEMENTS, fields).await?;
        tracing::debug!(%id, "announcement added");
        Ok(id)
    }

    /// Merge-write onto the fixed settings document; fields absent from
    /// `update` are preserved.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the merge fails.
    #[instrument(skip(self, update))]
    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<(), RepoError> {
        self.store
            .merge(SETTINGS, &DocumentId::from(SETTINGS_DOC_ID), to_fields(&update)?)
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Deletes
    // ------------------------------------------------------------------

    /// Delete a class session by id. No existence check; deleting a
    /// missing id succeeds.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_class(&self, id: &DocumentId) -> Result<(), RepoError> {
        Ok(self.store.delete(CLASSES, id).await?)
    }

    /// Delete a camp by id.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_camp(&self, id: &DocumentId) -> Result<(), RepoError> {
        Ok(self.store.delete(CAMPS, id).await?)
    }

    /// Delete an announcement by id.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_announcement(&self, id: &DocumentId) -> Result<(), RepoError> {
        Ok(self.store.delete(ANNOUNCEMENTS, id).await?)
    }

    /// Delete a material: read the document to learn its `file_name`,
    /// best-effort remove the blob, then delete the document.
    ///
    /// A missing document is a no-op (double deletion looks like success),
    /// and a missing or unremovable blob never blocks the document delete.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Store` if a store call fails.
    #[instrument(skip(self))]
    pub async fn delete_material(&self, id: &DocumentId) -> Result<(), RepoError> {
        let Some(doc) = self.store.get(MATERIALS, id).await? else {
            return Ok(());
        };

        let material: Material = doc.decode()?;
        if let Some(file_name) = material.file_name.as_deref() {
            match self.stash.remove(file_name).await {
                Ok(true) => tracing::debug!(%file_name, "removed material blob"),
                Ok(false) => tracing::debug!(%file_name, "material blob already absent"),
                Err(err) => {
                    tracing::warn!(%file_name, error = %err, "failed to remove material blob");
                }
            }
        }

        Ok(self.store.delete(MATERIALS, id).await?)
    }
}

/// Decode a batch of documents into typed records, attaching each store id
/// via `set_id`.
fn decode_all<T: DeserializeOwned>(
    docs: Vec<Document>,
    set_id: impl Fn(&mut T, DocumentId),
) -> Result<Vec<T>, StoreError> {
    docs.into_iter()
        .map(|doc| {
            let id = doc.id.clone();
            let mut record: T = doc.decode()?;
            set_id(&mut record, id);
            Ok(record)
        })
        .collect()
}
