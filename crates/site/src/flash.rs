//! One-shot flash messages carried in the session.
//!
//! Admin mutations report their outcome as a short message plus a redirect
//! back to the originating view; the message is stored in the session and
//! consumed by the next page render.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session key under which pending messages are stored.
const FLASH_KEY: &str = "flash_messages";

/// Message severity, mapped to an alert style in the templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashKind {
    /// CSS alert suffix for templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// A pending flash message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub message: String,
}

/// Queue a message for the next rendered page.
///
/// Session failures are swallowed: losing a flash message must never fail
/// the request that produced it.
pub async fn push(session: &Session, kind: FlashKind, message: impl Into<String>) {
    let mut pending: Vec<FlashMessage> = session
        .get(FLASH_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    pending.push(FlashMessage {
        kind,
        message: message.into(),
    });
    if let Err(err) = session.insert(FLASH_KEY, pending).await {
        tracing::warn!(error = %err, "failed to store flash message");
    }
}

/// Take and clear all pending messages.
pub async fn take(session: &Session) -> Vec<FlashMessage> {
    session
        .remove::<Vec<FlashMessage>>(FLASH_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_as_str() {
        assert_eq!(FlashKind::Success.as_str(), "success");
        assert_eq!(FlashKind::Danger.as_str(), "danger");
    }

    #[test]
    fn test_flash_message_serde_round_trip() {
        let msg = FlashMessage {
            kind: FlashKind::Warning,
            message: "Please log in to access this page.".to_string(),
        };
        let json = serde_json::to_string(&msg).expect("serialize");
        assert!(json.contains("\"warning\""));
        let back: FlashMessage = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.kind, FlashKind::Warning);
    }
}
