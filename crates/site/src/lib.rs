//! Maplewood Learning Center site library.
//!
//! This crate provides the site functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod flash;
pub mod middleware;
pub mod repo;
pub mod routes;
pub mod state;
pub mod store;
pub mod uploads;
