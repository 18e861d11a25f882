//! Admin authentication route handlers.
//!
//! A single shared credential from configuration; success sets the session
//! flag that [`crate::middleware::RequireAdmin`] checks. Login is allowed
//! even while the store is unavailable; the dashboard renders degraded
//! and writes are rejected there.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect},
    routing::get,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::flash::{self, FlashKind, FlashMessage};
use crate::middleware::{CurrentAdmin, clear_current_admin, set_current_admin};
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub flashes: Vec<FlashMessage>,
}

/// Login form fields.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Build the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/login", get(login_page).post(login))
        .route("/admin/logout", get(logout))
}

/// Render the login page.
///
/// GET /admin/login
async fn login_page(session: Session) -> impl IntoResponse {
    LoginTemplate {
        flashes: flash::take(&session).await,
    }
}

/// Check the shared credential and set the session flag.
///
/// POST /admin/login
#[instrument(skip(state, session, form), fields(username = %form.username))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> impl IntoResponse {
    if state.config().admin.matches(&form.username, &form.password) {
        let admin = CurrentAdmin {
            username: form.username,
        };
        if let Err(err) = set_current_admin(&session, &admin).await {
            tracing::error!(error = %err, "failed to store admin session");
            flash::push(&session, FlashKind::Danger, "Login failed, please try again.").await;
            return Redirect::to("/admin/login");
        }
        flash::push(&session, FlashKind::Success, "Login successful!").await;
        Redirect::to("/admin/dashboard")
    } else {
        tracing::warn!("failed admin login attempt");
        flash::push(&session, FlashKind::Danger, "Invalid username or password.").await;
        Redirect::to("/admin/login")
    }
}

/// Clear the session and return to the home page.
///
/// GET /admin/logout
async fn logout(session: Session) -> impl IntoResponse {
    if let Err(err) = clear_current_admin(&session).await {
        tracing::warn!(error = %err, "failed to clear session on logout");
    }
    flash::push(&session, FlashKind::Info, "You have been logged out.").await;
    Redirect::to("/")
}
