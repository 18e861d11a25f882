//! HTTP backend for the managed document store.
//!
//! Speaks the store's JSON API:
//!
//! ```text
//! GET    {endpoint}/collections/{name}/documents?limit=N
//! GET    {endpoint}/collections/{name}/documents?order_by=f&direction=desc&limit=N
//! GET    {endpoint}/collections/{name}/documents/{id}
//! POST   {endpoint}/collections/{name}/documents          {"fields": {...}}
//! PATCH  {endpoint}/collections/{name}/documents/{id}     {"fields": {...}}  (merge)
//! DELETE {endpoint}/collections/{name}/documents/{id}
//! ```
//!
//! All requests carry the bearer token from the decoded credentials. A 400
//! on an ordered read means the store cannot satisfy the ordering (no index
//! over the field); that maps to `StoreError::InvalidQuery` so the caller
//! can fall back to an unordered read.

use std::sync::Arc;

use maplewood_core::DocumentId;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use crate::config::StoreCredentials;

use super::{Direction, Document, Fields, StoreError};

/// Client for the document store's HTTP API.
#[derive(Clone)]
pub struct HttpStore {
    inner: Arc<HttpStoreInner>,
}

struct HttpStoreInner {
    client: reqwest::Client,
    endpoint: String,
    api_token: String,
}

/// Envelope for collection reads.
#[derive(Debug, Deserialize)]
struct ListResponse {
    documents: Vec<DocumentResponse>,
}

/// One document on the wire.
#[derive(Debug, Deserialize)]
struct DocumentResponse {
    id: String,
    #[serde(default)]
    fields: Fields,
}

/// Envelope for inserts.
#[derive(Debug, Deserialize)]
struct InsertResponse {
    id: String,
}

/// Error body the store returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
}

impl From<DocumentResponse> for Document {
    fn from(doc: DocumentResponse) -> Self {
        Self {
            id: DocumentId::new(doc.id),
            fields: doc.fields,
        }
    }
}

impl HttpStore {
    /// Create a client from decoded store credentials.
    #[must_use]
    pub fn new(credentials: &StoreCredentials) -> Self {
        Self {
            inner: Arc::new(HttpStoreInner {
                client: reqwest::Client::new(),
                endpoint: credentials.endpoint.trim_end_matches('/').to_owned(),
                api_token: credentials.api_token.expose_secret().to_owned(),
            }),
        }
    }

    fn documents_url(&self, collection: &str) -> String {
        format!("{}/collections/{collection}/documents", self.inner.endpoint)
    }

    fn document_url(&self, collection: &str, id: &DocumentId) -> String {
        format!("{}/{}", self.documents_url(collection), id)
    }

    /// Unordered collection read.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        collection: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        let mut request = self
            .inner
            .client
            .get(self.documents_url(collection))
            .bearer_auth(&self.inner.api_token);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit.to_string())]);
        }

        let response = check_status(request.send().await?, false).await?;
        let body: ListResponse = response.json().await?;
        Ok(body.documents.into_iter().map(Document::from).collect())
    }

    /// Ordered collection read; 400 maps to `InvalidQuery`.
    #[instrument(skip(self))]
    pub async fn list_ordered(
        &self,
        collection: &str,
        order_by: &str,
        direction: Direction,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        let direction = match direction {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        };
        let mut request = self
            .inner
            .client
            .get(self.documents_url(collection))
            .bearer_auth(&self.inner.api_token)
            .query(&[("order_by", order_by), ("direction", direction)]);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit.to_string())]);
        }

        let response = check_status(request.send().await?, true).await?;
        let body: ListResponse = response.json().await?;
        Ok(body.documents.into_iter().map(Document::from).collect())
    }

    /// Point read; 404 is `Ok(None)`.
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        let response = self
            .inner
            .client
            .get(self.document_url(collection, id))
            .bearer_auth(&self.inner.api_token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response, false).await?;
        let body: DocumentResponse = response.json().await?;
        Ok(Some(body.into()))
    }

    /// Insert a new document; the store assigns the id.
    #[instrument(skip(self, fields))]
    pub async fn insert(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<DocumentId, StoreError> {
        let response = self
            .inner
            .client
            .post(self.documents_url(collection))
            .bearer_auth(&self.inner.api_token)
            .json(&serde_json::json!({ "fields": fields }))
            .send()
            .await?;

        let response = check_status(response, false).await?;
        let body: InsertResponse = response.json().await?;
        Ok(DocumentId::new(body.id))
    }

    /// Merge-write by id; the store upserts, so fixed-identity documents
    /// come into existence on first write.
    #[instrument(skip(self, fields))]
    pub async fn merge(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let response = self
            .inner
            .client
            .patch(self.document_url(collection, id))
            .bearer_auth(&self.inner.api_token)
            .json(&serde_json::json!({ "fields": fields }))
            .send()
            .await?;

        check_status(response, false).await?;
        Ok(())
    }

    /// Delete by id; the store treats a missing id as already deleted, and
    /// so do we.
    #[instrument(skip(self))]
    pub async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError> {
        let response = self
            .inner
            .client
            .delete(self.document_url(collection, id))
            .bearer_auth(&self.inner.api_token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check_status(response, false).await?;
        Ok(())
    }
}

/// Map non-success statuses to `StoreError`. When `ordered_read` is set, a
/// 400 becomes `InvalidQuery` instead of a generic status error.
async fn check_status(
    response: reqwest::Response,
    ordered_read: bool,
) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorResponse>()
        .await
        .map(|body| body.message)
        .unwrap_or_default();

    if ordered_read && status == StatusCode::BAD_REQUEST {
        return Err(StoreError::InvalidQuery(message));
    }

    Err(StoreError::Status {
        status: status.as_u16(),
        message,
    })
}
