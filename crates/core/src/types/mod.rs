//! Shared types for Maplewood entities.
//!
//! Every entity lives in the document store as a schemaless JSON document.
//! The store assigns an opaque [`DocumentId`]; it is attached to the record
//! after a read and is never serialized back into the document body (each
//! record's `id` field carries `#[serde(skip)]`).

mod announcement;
mod camp;
mod class;
mod id;
mod material;
mod settings;

pub use announcement::{Announcement, DEFAULT_PRIORITY, NewAnnouncement};
pub use camp::{Camp, NewCamp};
pub use class::{ClassSession, DEFAULT_CLASS_TYPE, NewClassSession};
pub use id::DocumentId;
pub use material::{DEFAULT_CATEGORY, Material, NewMaterial};
pub use settings::{SETTINGS_DOC_ID, SettingsUpdate, SiteSettings};
