//! Site-wide settings, a fixed-identity document.

use serde::{Deserialize, Serialize};

/// The constant id of the one meaningful document in the `settings`
/// collection.
pub const SETTINGS_DOC_ID: &str = "default";

/// Site-wide settings as read from `settings/default`.
///
/// A missing document resolves to the all-empty record; callers never see a
/// "not found" condition for settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default)]
    pub class_price: Option<String>,
    #[serde(default)]
    pub camp_price: Option<String>,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub teacher_name: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
}

/// Partial settings update.
///
/// Serializes only the fields that are present, so the store-level merge
/// write leaves everything else untouched. Two updates touching disjoint
/// fields compose instead of the second clobbering the first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camp_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_skips_absent_fields() {
        let update = SettingsUpdate {
            class_price: Some("25".to_owned()),
            ..SettingsUpdate::default()
        };
        let value = serde_json::to_value(&update).expect("serialize");
        let obj = value.as_object().expect("object");
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["class_price"], "25");
    }

    #[test]
    fn test_settings_default_is_empty() {
        let settings = SiteSettings::default();
        assert!(settings.email.is_none());
        assert!(settings.about.is_none());
    }
}
