//! Study material entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DocumentId;

/// Default category applied when the form omits one.
pub const DEFAULT_CATEGORY: &str = "general";

/// A downloadable study material, as stored in the `materials` collection.
///
/// `file_name`, `file_url` and `uploaded_at` are derived server-side when
/// the material is created; the rest comes from the upload form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Material {
    /// Store-assigned id, attached after read.
    #[serde(skip)]
    pub id: DocumentId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    /// Stored filename, timestamp-prefixed to avoid collisions.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Publicly resolvable download URL.
    #[serde(default)]
    pub file_url: Option<String>,
    /// Server-assigned creation time.
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// Input for creating a material. The file itself travels separately as a
/// multipart part; these are the metadata fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMaterial {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub grade: Option<String>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_material_defaults_category() {
        let new: NewMaterial =
            serde_json::from_str(r#"{"title":"Fractions worksheet"}"#).expect("decode");
        assert_eq!(new.category, "general");
    }
}
