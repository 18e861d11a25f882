//! Admin panel route handlers.
//!
//! Every mutation follows the same shape: check the session (extractor),
//! check store availability, call one repository operation, flash the
//! outcome, redirect back to the dashboard. Repository failures become a
//! flash message at this boundary, never a process error; whatever partial
//! effect already happened (e.g. a stashed blob) is not rolled back.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use tower_sessions::Session;
use tracing::instrument;

use maplewood_core::{
    Announcement, Camp, ClassSession, DEFAULT_CATEGORY, DocumentId, Material, NewAnnouncement,
    NewCamp, NewClassSession, NewMaterial, SettingsUpdate, SiteSettings,
};

use crate::filters;
use crate::flash::{self, FlashKind, FlashMessage};
use crate::middleware::RequireAdmin;
use crate::repo::ContentRepository;
use crate::state::AppState;

/// Where every mutation redirects back to.
const DASHBOARD: &str = "/admin/dashboard";

/// Announcements shown on the dashboard.
const DASHBOARD_ANNOUNCEMENT_LIMIT: usize = 10;

/// File extensions accepted for material uploads.
const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "ppt", "pptx", "txt"];

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub flashes: Vec<FlashMessage>,
    pub username: String,
    pub store_connected: bool,
    pub classes: Vec<ClassSession>,
    pub camps: Vec<Camp>,
    pub materials: Vec<Material>,
    pub announcements: Vec<Announcement>,
    pub settings: SiteSettings,
}

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/api/add_class", post(add_class))
        .route("/admin/api/delete_class/{id}", post(delete_class))
        .route("/admin/api/add_camp", post(add_camp))
        .route("/admin/api/delete_camp/{id}", post(delete_camp))
        .route("/admin/api/add_announcement", post(add_announcement))
        .route(
            "/admin/api/delete_announcement/{id}",
            post(delete_announcement),
        )
        .route("/admin/api/update_settings", post(update_settings))
        .route("/admin/upload_material", post(upload_material))
        .route("/admin/delete_material/{id}", post(delete_material))
}

/// Render the dashboard.
///
/// GET /admin/dashboard
///
/// Renders in degraded mode when the store is unavailable: every section
/// is empty and the template shows a warning banner.
#[instrument(skip(state, session, admin))]
async fn dashboard(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> impl IntoResponse {
    let repo = state.repository().get();

    let classes = read_or_empty(repo, "classes", ContentRepository::classes).await;
    let camps = read_or_empty(repo, "camps", ContentRepository::camps).await;
    let materials = read_or_empty(repo, "materials", ContentRepository::materials).await;
    let announcements = read_or_empty(repo, "announcements", |r| async move {
        r.list_announcements(DASHBOARD_ANNOUNCEMENT_LIMIT)
            .await
            .map(crate::repo::AnnouncementFeed::into_items)
    })
    .await;
    let settings = match repo {
        Some(r) => r.settings().await.unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to fetch settings");
            SiteSettings::default()
        }),
        None => SiteSettings::default(),
    };

    DashboardTemplate {
        flashes: flash::take(&session).await,
        username: admin.username,
        store_connected: state.repository().is_ready(),
        classes,
        camps,
        materials,
        announcements,
        settings,
    }
}

/// Add a class.
///
/// POST /admin/api/add_class
#[instrument(skip_all)]
async fn add_class(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(new): Form<NewClassSession>,
) -> impl IntoResponse {
    match state.repository().get() {
        None => flash_unavailable(&session).await,
        Some(repo) => match repo.add_class(new).await {
            Ok(_) => flash::push(&session, FlashKind::Success, "Class added successfully!").await,
            Err(err) => {
                tracing::error!(error = %err, "failed to add class");
                flash::push(&session, FlashKind::Danger, "Error adding class.").await;
            }
        },
    }
    Redirect::to(DASHBOARD)
}

/// Delete a class.
///
/// POST /admin/api/delete_class/{id}
#[instrument(skip_all, fields(%id))]
async fn delete_class(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if !valid_id(&id) {
        flash::push(&session, FlashKind::Danger, "Invalid class ID").await;
        return Redirect::to(DASHBOARD);
    }
    match state.repository().get() {
        None => flash_unavailable(&session).await,
        Some(repo) => match repo.delete_class(&DocumentId::from(id)).await {
            Ok(()) => {
                flash::push(&session, FlashKind::Success, "Class deleted successfully!").await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to delete class");
                flash::push(&session, FlashKind::Danger, "Error deleting class.").await;
            }
        },
    }
    Redirect::to(DASHBOARD)
}

/// Add a camp.
///
/// POST /admin/api/add_camp
#[instrument(skip_all)]
async fn add_camp(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(new): Form<NewCamp>,
) -> impl IntoResponse {
    match state.repository().get() {
        None => flash_unavailable(&session).await,
        Some(repo) => match repo.add_camp(new).await {
            Ok(_) => flash::push(&session, FlashKind::Success, "Camp added successfully!").await,
            Err(err) => {
                tracing::error!(error = %err, "failed to add camp");
                flash::push(&session, FlashKind::Danger, "Error adding camp.").await;
            }
        },
    }
    Redirect::to(DASHBOARD)
}

/// Delete a camp.
///
/// POST /admin/api/delete_camp/{id}
#[instrument(skip_all, fields(%id))]
async fn delete_camp(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if !valid_id(&id) {
        flash::push(&session, FlashKind::Danger, "Invalid camp ID").await;
        return Redirect::to(DASHBOARD);
    }
    match state.repository().get() {
        None => flash_unavailable(&session).await,
        Some(repo) => match repo.delete_camp(&DocumentId::from(id)).await {
            Ok(()) => {
                flash::push(&session, FlashKind::Success, "Camp deleted successfully!").await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to delete camp");
                flash::push(&session, FlashKind::Danger, "Error deleting camp.").await;
            }
        },
    }
    Redirect::to(DASHBOARD)
}

/// Add an announcement.
///
/// POST /admin/api/add_announcement
#[instrument(skip_all)]
async fn add_announcement(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(new): Form<NewAnnouncement>,
) -> impl IntoResponse {
    match state.repository().get() {
        None => flash_unavailable(&session).await,
        Some(repo) => match repo.add_announcement(new).await {
            Ok(id) => {
                tracing::debug!(%id, "announcement added");
                flash::push(
                    &session,
                    FlashKind::Success,
                    "Announcement added successfully!",
                )
                .await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to add announcement");
                flash::push(&session, FlashKind::Danger, "Error adding announcement.").await;
            }
        },
    }
    Redirect::to(DASHBOARD)
}

/// Delete an announcement.
///
/// POST /admin/api/delete_announcement/{id}
#[instrument(skip_all, fields(%id))]
async fn delete_announcement(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if !valid_id(&id) {
        flash::push(&session, FlashKind::Danger, "Invalid announcement ID").await;
        return Redirect::to(DASHBOARD);
    }
    match state.repository().get() {
        None => flash_unavailable(&session).await,
        Some(repo) => match repo.delete_announcement(&DocumentId::from(id)).await {
            Ok(()) => {
                flash::push(
                    &session,
                    FlashKind::Success,
                    "Announcement deleted successfully!",
                )
                .await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to delete announcement");
                flash::push(&session, FlashKind::Danger, "Error deleting announcement.").await;
            }
        },
    }
    Redirect::to(DASHBOARD)
}

/// Merge-update the site settings.
///
/// POST /admin/api/update_settings
#[instrument(skip_all)]
async fn update_settings(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(update): Form<SettingsUpdate>,
) -> impl IntoResponse {
    match state.repository().get() {
        None => flash_unavailable(&session).await,
        Some(repo) => match repo.update_settings(update).await {
            Ok(()) => {
                flash::push(&session, FlashKind::Success, "Settings updated successfully!").await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to update settings");
                flash::push(&session, FlashKind::Danger, "Error updating settings.").await;
            }
        },
    }
    Redirect::to(DASHBOARD)
}

/// Upload a study material.
///
/// POST /admin/upload_material (multipart)
///
/// Rejects a missing or empty file and disallowed extensions before any
/// repository call.
#[instrument(skip_all)]
async fn upload_material(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> impl IntoResponse {
    let parts = match read_material_form(multipart).await {
        Ok(parts) => parts,
        Err(err) => {
            tracing::error!(error = %err, "failed to read upload form");
            flash::push(&session, FlashKind::Danger, "Error uploading material.").await;
            return Redirect::to(DASHBOARD);
        }
    };

    let Some((file_name, bytes)) = parts.file else {
        flash::push(&session, FlashKind::Danger, "No file uploaded").await;
        return Redirect::to(DASHBOARD);
    };
    if file_name.is_empty() || bytes.is_empty() {
        flash::push(&session, FlashKind::Danger, "No file selected").await;
        return Redirect::to(DASHBOARD);
    }
    if !allowed_file(&file_name) {
        flash::push(&session, FlashKind::Danger, "File type not allowed").await;
        return Redirect::to(DASHBOARD);
    }

    match state.repository().get() {
        None => flash_unavailable(&session).await,
        Some(repo) => {
            let new = NewMaterial {
                title: parts.title,
                description: parts.description,
                category: parts
                    .category
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
                grade: parts.grade,
            };
            match repo.add_material(new, &file_name, &bytes).await {
                Ok(_) => {
                    flash::push(
                        &session,
                        FlashKind::Success,
                        "Material uploaded successfully!",
                    )
                    .await;
                }
                Err(err) => {
                    tracing::error!(error = %err, "failed to upload material");
                    flash::push(&session, FlashKind::Danger, "Error uploading material.").await;
                }
            }
        }
    }
    Redirect::to(DASHBOARD)
}

/// Delete a material and its backing file.
///
/// POST /admin/delete_material/{id}
#[instrument(skip_all, fields(%id))]
async fn delete_material(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if !valid_id(&id) {
        flash::push(&session, FlashKind::Danger, "Invalid material ID").await;
        return Redirect::to(DASHBOARD);
    }
    match state.repository().get() {
        None => flash_unavailable(&session).await,
        Some(repo) => match repo.delete_material(&DocumentId::from(id)).await {
            Ok(()) => {
                flash::push(&session, FlashKind::Success, "Material deleted successfully!").await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to delete material");
                flash::push(&session, FlashKind::Danger, "Error deleting material.").await;
            }
        },
    }
    Redirect::to(DASHBOARD)
}

// =============================================================================
// Helpers
// =============================================================================

/// Collected fields of the material upload form.
#[derive(Default)]
struct MaterialForm {
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    grade: Option<String>,
    file: Option<(String, Vec<u8>)>,
}

/// Drain the multipart stream into the known fields; unknown parts are
/// ignored.
async fn read_material_form(mut multipart: Multipart) -> Result<MaterialForm, axum::Error> {
    let mut form = MaterialForm::default();
    while let Some(field) = multipart.next_field().await.map_err(axum::Error::new)? {
        match field.name() {
            Some("title") => form.title = Some(field.text().await.map_err(axum::Error::new)?),
            Some("description") => {
                form.description = Some(field.text().await.map_err(axum::Error::new)?);
            }
            Some("category") => {
                form.category = Some(field.text().await.map_err(axum::Error::new)?);
            }
            Some("grade") => form.grade = Some(field.text().await.map_err(axum::Error::new)?),
            Some("file") => {
                let name = field.file_name().map(str::to_owned).unwrap_or_default();
                let bytes = field.bytes().await.map_err(axum::Error::new)?;
                form.file = Some((name, bytes.to_vec()));
            }
            _ => {}
        }
    }
    Ok(form)
}

/// An id from a form post must be a real store id; templates render "None"
/// for documents that never got one.
fn valid_id(id: &str) -> bool {
    !id.is_empty() && id != "None"
}

/// Whether the filename carries an accepted extension.
fn allowed_file(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Flash the standard unavailable-store rejection.
async fn flash_unavailable(session: &Session) {
    flash::push(
        session,
        FlashKind::Danger,
        "Database unavailable. Changes were not saved.",
    )
    .await;
}

/// Run a read when the repository is available, degrading to empty.
async fn read_or_empty<'a, T, F, Fut>(
    repo: Option<&'a ContentRepository>,
    what: &'static str,
    read: F,
) -> Vec<T>
where
    F: FnOnce(&'a ContentRepository) -> Fut,
    Fut: Future<Output = Result<Vec<T>, crate::repo::RepoError>>,
{
    match repo {
        Some(repo) => read(repo).await.unwrap_or_else(|err| {
            tracing::error!(error = %err, what, "dashboard read failed");
            Vec::new()
        }),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("notes.pdf"));
        assert!(allowed_file("HOMEWORK.DOCX"));
        assert!(allowed_file("slides.pptx"));
        assert!(!allowed_file("virus.exe"));
        assert!(!allowed_file("noextension"));
        assert!(!allowed_file(""));
    }

    #[test]
    fn test_valid_id() {
        assert!(valid_id("abc123"));
        assert!(!valid_id(""));
        assert!(!valid_id("None"));
    }
}
