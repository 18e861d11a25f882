//! Public page handlers.
//!
//! Anonymous visitors never see a raw error: when the store is unavailable
//! or a read fails, pages render with empty collections and the failure is
//! traced server-side.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Json, extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use maplewood_core::{Announcement, Camp, ClassSession, Material, SiteSettings};

use crate::filters;
use crate::flash::{self, FlashMessage};
use crate::state::AppState;

/// Announcements shown on the home page.
const HOME_ANNOUNCEMENT_LIMIT: usize = 5;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub flashes: Vec<FlashMessage>,
    pub announcements: Vec<Announcement>,
    pub settings: SiteSettings,
}

/// Class calendar template.
#[derive(Template, WebTemplate)]
#[template(path = "calendar.html")]
pub struct CalendarTemplate {
    pub flashes: Vec<FlashMessage>,
    pub classes: Vec<ClassSession>,
    pub settings: SiteSettings,
}

/// Study materials template.
#[derive(Template, WebTemplate)]
#[template(path = "materials.html")]
pub struct MaterialsTemplate {
    pub flashes: Vec<FlashMessage>,
    pub materials: Vec<Material>,
}

/// Camps template.
#[derive(Template, WebTemplate)]
#[template(path = "camps.html")]
pub struct CampsTemplate {
    pub flashes: Vec<FlashMessage>,
    pub camps: Vec<Camp>,
    pub settings: SiteSettings,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub flashes: Vec<FlashMessage>,
    pub settings: SiteSettings,
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub flashes: Vec<FlashMessage>,
}

/// Display the home page with recent announcements.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let announcements = match state.repository().get() {
        Some(repo) => repo
            .list_announcements(HOME_ANNOUNCEMENT_LIMIT)
            .await
            .map_or_else(
                |err| {
                    tracing::error!(error = %err, "failed to fetch announcements");
                    Vec::new()
                },
                crate::repo::AnnouncementFeed::into_items,
            ),
        None => Vec::new(),
    };

    HomeTemplate {
        flashes: flash::take(&session).await,
        announcements,
        settings: load_settings(&state).await,
    }
}

/// Display the class calendar.
#[instrument(skip(state, session))]
pub async fn calendar(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let classes = match state.repository().get() {
        Some(repo) => repo.classes().await.unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to fetch classes");
            Vec::new()
        }),
        None => Vec::new(),
    };

    CalendarTemplate {
        flashes: flash::take(&session).await,
        classes,
        settings: load_settings(&state).await,
    }
}

/// Display the study materials page.
#[instrument(skip(state, session))]
pub async fn materials(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let materials = match state.repository().get() {
        Some(repo) => repo.materials().await.unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to fetch materials");
            Vec::new()
        }),
        None => Vec::new(),
    };

    MaterialsTemplate {
        flashes: flash::take(&session).await,
        materials,
    }
}

/// Display the camps and special events page.
#[instrument(skip(state, session))]
pub async fn camps(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let camps = match state.repository().get() {
        Some(repo) => repo.camps().await.unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to fetch camps");
            Vec::new()
        }),
        None => Vec::new(),
    };

    CampsTemplate {
        flashes: flash::take(&session).await,
        camps,
        settings: load_settings(&state).await,
    }
}

/// Display the contact page.
#[instrument(skip(state, session))]
pub async fn contact(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    ContactTemplate {
        flashes: flash::take(&session).await,
        settings: load_settings(&state).await,
    }
}

/// Display the about page.
#[instrument(skip(session))]
pub async fn about(session: Session) -> impl IntoResponse {
    AboutTemplate {
        flashes: flash::take(&session).await,
    }
}

/// Liveness probe.
///
/// Always returns 200 when the process is up; `store_connected` reports
/// whether the repository initialized at startup.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "store_connected": state.repository().is_ready(),
    }))
}

/// Load site settings, degrading to the empty record on any failure.
async fn load_settings(state: &AppState) -> SiteSettings {
    match state.repository().get() {
        Some(repo) => repo.settings().await.unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to fetch settings");
            SiteSettings::default()
        }),
        None => SiteSettings::default(),
    }
}
