//! Camp entity.

use serde::{Deserialize, Serialize};

use super::DocumentId;

/// A camp or special event, as stored in the `camps` collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Camp {
    /// Store-assigned id, attached after read.
    #[serde(skip)]
    pub id: DocumentId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Price as entered in the form; stored verbatim, never parsed.
    #[serde(default)]
    pub price: Option<String>,
}

/// Input for creating a camp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCamp {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
}
