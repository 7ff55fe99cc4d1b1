//! arena-ui library - browser front end for blind image comparisons
//!
//! Hosts the voting page and exposes the arena session as a JSON API. All
//! session state lives in memory and is discarded on reset or shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use arena_common::export::DownloadSlot;
use arena_common::instructions::InstructionTable;
use arena_common::random::RandomSource;
use arena_common::{ArenaSession, VotePolicy};
use axum::Router;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod loader;

pub use crate::error::{ApiError, ApiResult};

/// URL prefix under which catalog images are served
pub const IMAGE_URL_PREFIX: &str = "/images";

/// Runtime settings resolved from CLI, environment and TOML
#[derive(Debug, Clone, Default)]
pub struct ArenaSettings {
    /// Catalog directory; uploads only when absent
    pub image_dir: Option<PathBuf>,
    pub vote_policy: VotePolicy,
    /// Default round cap when a start request does not name one
    pub max_rounds: Option<usize>,
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single active session; the write lock serializes votes
    pub session: Arc<RwLock<ArenaSession>>,
    /// Export sink shared with the session
    pub downloads: DownloadSlot,
    /// Prompt lookup, empty when no table could be loaded
    pub instructions: Arc<RwLock<InstructionTable>>,
    pub image_dir: Option<PathBuf>,
    pub max_rounds: Option<usize>,
    /// Latest non-fatal warning (catalog or instruction loading)
    pub last_warning: Arc<RwLock<Option<String>>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create application state around a fresh session
    pub fn new(settings: ArenaSettings, random: Box<dyn RandomSource>) -> Self {
        let downloads = DownloadSlot::new();
        let session = ArenaSession::new(random, Box::new(downloads.clone()))
            .with_policy(settings.vote_policy);

        Self {
            session: Arc::new(RwLock::new(session)),
            downloads,
            instructions: Arc::new(RwLock::new(InstructionTable::new())),
            image_dir: settings.image_dir,
            max_rounds: settings.max_rounds,
            last_warning: Arc::new(RwLock::new(None)),
            startup_time: Utc::now(),
        }
    }

    /// Remember a non-fatal warning for display in the UI
    pub async fn record_warning(&self, message: impl Into<String>) {
        *self.last_warning.write().await = Some(message.into());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let mut router = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes())
        .merge(api::catalog_routes())
        .merge(api::session_routes());

    if let Some(dir) = &state.image_dir {
        router = router.nest_service(IMAGE_URL_PREFIX, ServeDir::new(dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
