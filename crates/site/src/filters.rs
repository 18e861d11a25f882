//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Renders an optional string, falling back to an em-width dash.
///
/// Usage in templates: `{{ class.duration|or_dash }}`
#[askama::filter_fn]
pub fn or_dash(value: &Option<String>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.as_deref().unwrap_or("—").to_string())
}
