//! Maplewood Core - Shared types library.
//!
//! Entity types shared between the site binary and its tests.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no document-store access,
//! no HTTP clients. Entities are plain records with named optional fields;
//! everything stored in the document store is a string supplied by an admin
//! form, so fields are `Option<String>` rather than parsed domain types.
//!
//! # Modules
//!
//! - [`types`] - `DocumentId` plus the per-entity records and their
//!   "new entity" input forms

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
