//! Announcement entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DocumentId;

/// Default priority applied when the form omits one.
pub const DEFAULT_PRIORITY: &str = "normal";

/// A site announcement, as stored in the `announcements` collection.
///
/// `timestamp` is the sortable creation instant and the primary ordering
/// key for listings; `created_at` is its human-readable duplicate. Older
/// documents written before the timestamp field existed carry neither,
/// which is why both stay optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Announcement {
    /// Store-assigned id, attached after read.
    #[serde(skip)]
    pub id: DocumentId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    /// Sortable creation instant (listing order, newest first).
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Human-readable duplicate of `timestamp` (`%Y-%m-%d %H:%M:%S`).
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Input for creating an announcement. Timestamps are stamped by the
/// repository at insert time, not supplied here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnnouncement {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: String,
}

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_announcement_defaults_priority() {
        let new: NewAnnouncement =
            serde_json::from_str(r#"{"title":"Hi","content":"Welcome"}"#).expect("decode");
        assert_eq!(new.priority, "normal");
    }

    #[test]
    fn test_announcement_tolerates_missing_timestamp() {
        let ann: Announcement = serde_json::from_str(r#"{"title":"Old"}"#).expect("decode");
        assert!(ann.timestamp.is_none());
        assert!(ann.created_at.is_none());
    }
}
