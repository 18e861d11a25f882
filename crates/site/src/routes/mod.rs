//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Public
//! GET  /                              - Home page (recent announcements)
//! GET  /calendar                      - Class calendar
//! GET  /materials                     - Study materials
//! GET  /camps                         - Camps and special events
//! GET  /contact                       - Contact page
//! GET  /about                         - About page
//! GET  /health                        - Liveness probe (reports store readiness)
//!
//! # Admin auth
//! GET  /admin/login                   - Login page
//! POST /admin/login                   - Login action
//! GET  /admin/logout                  - Logout action
//!
//! # Admin panel (session required)
//! GET  /admin/dashboard               - Dashboard
//! POST /admin/api/add_class           - Add a class
//! POST /admin/api/delete_class/{id}   - Delete a class
//! POST /admin/api/add_camp            - Add a camp
//! POST /admin/api/delete_camp/{id}    - Delete a camp
//! POST /admin/api/add_announcement    - Add an announcement
//! POST /admin/api/delete_announcement/{id} - Delete an announcement
//! POST /admin/api/update_settings     - Merge-update site settings
//! POST /admin/upload_material         - Upload a study material (multipart)
//! POST /admin/delete_material/{id}    - Delete a material and its file
//! ```

pub mod admin;
pub mod auth;
pub mod pages;

use axum::{Router, http::Uri, routing::get};

use crate::error::AppError;
use crate::state::AppState;

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/calendar", get(pages::calendar))
        .route("/materials", get(pages::materials))
        .route("/camps", get(pages::camps))
        .route("/contact", get(pages::contact))
        .route("/about", get(pages::about))
        .route("/health", get(pages::health))
        .merge(auth::routes())
        .merge(admin::routes())
        .fallback(not_found)
}

/// Fallback for unmatched paths.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_owned())
}
