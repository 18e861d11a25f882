//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::repo::ContentRepository;

/// Handle to the content repository, carrying availability as a typed
/// state rather than a nullable global.
///
/// Built exactly once at startup: `Ready` when store credentials decoded
/// and the client constructed, `Unavailable` otherwise. There is no retry
/// or refresh path; an `Unavailable` handle stays unavailable for the
/// process lifetime. Handlers read it on every request: reads degrade to
/// empty results and writes are rejected with a user-visible message.
#[derive(Clone)]
pub enum RepositoryHandle {
    /// Store reachable; delegate operations to the repository.
    Ready(Arc<ContentRepository>),
    /// Store credentials absent or invalid; the site runs degraded.
    Unavailable,
}

impl RepositoryHandle {
    /// The repository, if the store initialized.
    #[must_use]
    pub fn get(&self) -> Option<&ContentRepository> {
        match self {
            Self::Ready(repo) => Some(repo),
            Self::Unavailable => None,
        }
    }

    /// Whether the store initialized. Reported by the health probe.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    repository: RepositoryHandle,
}

impl AppState {
    /// Create the application state.
    #[must_use]
    pub fn new(config: SiteConfig, repository: RepositoryHandle) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, repository }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get the repository handle.
    #[must_use]
    pub fn repository(&self) -> &RepositoryHandle {
        &self.inner.repository
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentStore, MemoryStore};
    use crate::uploads::BlobStash;

    #[test]
    fn test_unavailable_handle() {
        let handle = RepositoryHandle::Unavailable;
        assert!(handle.get().is_none());
        assert!(!handle.is_ready());
    }

    #[tokio::test]
    async fn test_ready_handle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let stash = BlobStash::new(dir.path(), "http://localhost:3000")
            .await
            .expect("stash");
        let repo = ContentRepository::new(DocumentStore::Memory(MemoryStore::new()), stash);
        let handle = RepositoryHandle::Ready(Arc::new(repo));
        assert!(handle.get().is_some());
        assert!(handle.is_ready());
    }
}
