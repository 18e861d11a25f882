//! Class session entity.

use serde::{Deserialize, Serialize};

use super::DocumentId;

/// Default class type applied when the form omits one.
pub const DEFAULT_CLASS_TYPE: &str = "regular";

/// A scheduled class session, as stored in the `classes` collection.
///
/// All fields come straight from admin form input, so every one is
/// optional. There is no update operation; sessions are created and deleted
/// whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassSession {
    /// Store-assigned id, attached after read.
    #[serde(skip)]
    pub id: DocumentId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    /// Class type, e.g. "regular" or "trial".
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Input for creating a class session.
///
/// Deserializes directly from the admin form; the `type` field defaults to
/// [`DEFAULT_CLASS_TYPE`] when missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClassSession {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    DEFAULT_CLASS_TYPE.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_class_defaults_type() {
        let new: NewClassSession =
            serde_json::from_str(r#"{"title":"Algebra","date":"2026-09-01"}"#).expect("decode");
        assert_eq!(new.kind, "regular");
        assert_eq!(new.title.as_deref(), Some("Algebra"));
        assert!(new.duration.is_none());
    }

    #[test]
    fn test_class_id_not_serialized() {
        let class = ClassSession {
            id: DocumentId::from("abc"),
            title: Some("Geometry".to_owned()),
            ..ClassSession::default()
        };
        let value = serde_json::to_value(&class).expect("serialize");
        assert!(value.get("id").is_none());
        assert_eq!(value["title"], "Geometry");
    }
}
