//! Maplewood Learning Center - Public site and admin panel.
//!
//! This binary serves the public pages (announcements, class calendar,
//! study materials, camps) and a password-gated admin panel on one port.
//!
//! # Architecture
//!
//! - Axum web framework with server-rendered Askama templates
//! - Managed document store over HTTP for all content collections
//! - Local filesystem stash for uploaded material files
//!
//! The document store is optional at startup: when its credentials are
//! absent or malformed the site comes up in degraded mode, where public
//! pages render empty and admin writes are rejected with a message.

#![cfg_attr(not(test), forbid(unsafe_code))]

use sentry::integrations::tracing as sentry_tracing;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use maplewood_site::config::SiteConfig;
use maplewood_site::repo::ContentRepository;
use maplewood_site::state::{AppState, RepositoryHandle};
use maplewood_site::store::{DocumentStore, HttpStore};
use maplewood_site::uploads::BlobStash;
use maplewood_site::{middleware, routes};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &SiteConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Build the repository handle once at startup.
///
/// Any credential problem degrades the site instead of aborting: the
/// process still serves pages, just without store-backed content.
async fn build_repository(config: &SiteConfig) -> RepositoryHandle {
    let credentials = match config.store_credentials() {
        Ok(Some(credentials)) => credentials,
        Ok(None) => {
            tracing::warn!("STORE_CREDENTIALS_BASE64 not set, running in degraded mode");
            return RepositoryHandle::Unavailable;
        }
        Err(err) => {
            tracing::warn!(error = %err, "store credentials invalid, running in degraded mode");
            return RepositoryHandle::Unavailable;
        }
    };

    let stash = match BlobStash::new(config.upload_dir.clone(), &config.base_url).await {
        Ok(stash) => stash,
        Err(err) => {
            tracing::warn!(error = %err, "upload directory unusable, running in degraded mode");
            return RepositoryHandle::Unavailable;
        }
    };

    let store = DocumentStore::Http(HttpStore::new(&credentials));
    tracing::info!(endpoint = %credentials.endpoint, "document store client ready");
    RepositoryHandle::Ready(std::sync::Arc::new(ContentRepository::new(store, stash)))
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = SiteConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "maplewood_site=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if config.admin.is_default {
        tracing::warn!("admin credentials left at defaults, set ADMIN_USERNAME/ADMIN_PASSWORD");
    }

    let repository = build_repository(&config).await;
    let upload_dir = config.upload_dir.clone();

    // Build application state
    let state = AppState::new(config.clone(), repository);

    // Create session layer
    let session_layer = middleware::create_session_layer(&config);

    // Build router
    let app = routes::routes()
        .nest_service("/static/uploads", ServeDir::new(upload_dir))
        .layer(session_layer)
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Start server
    let addr = config.socket_addr();
    tracing::info!("site listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
