//! Middleware: session layer and admin authentication.

mod auth;
mod session;

pub use auth::{CurrentAdmin, RequireAdmin, clear_current_admin, set_current_admin};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
