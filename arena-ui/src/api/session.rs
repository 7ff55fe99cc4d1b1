//! Session endpoints: start, vote, results, export and reset
//!
//! The round view is blind: each side exposes only a locator to render.
//! Directory images go through `/api/session/image/{round}/{side}`, so the URL
//! never carries the filename; uploads keep their browser object URL, which is
//! opaque. Model labels and filenames stay server-side until the results phase.

use std::path::{Component, Path as FsPath};

use arena_common::instructions::InstructionTable;
use arena_common::result::SessionResult;
use arena_common::session::VoteOutcome;
use arena_common::{ArenaSession, ImageOrigin, LoadedImage, SessionPhase, VoteChoice, VotePolicy};
use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::loader;
use crate::{AppState, IMAGE_URL_PREFIX};

/// Side of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Locator the browser renders for one side of a round
fn side_locator(round: usize, side: Side, image: &LoadedImage) -> String {
    match image.origin {
        ImageOrigin::CatalogProvided => {
            format!("/api/session/image/{}/{}", round, side.as_str())
        }
        ImageOrigin::Uploaded => image.locator.clone(),
    }
}

/// One side of the current round
#[derive(Debug, Serialize)]
pub struct SideView {
    pub locator: String,
}

/// The round awaiting a vote
#[derive(Debug, Serialize)]
pub struct RoundView {
    /// 1-based; echo it back when voting
    pub round: usize,
    pub total: usize,
    pub left: SideView,
    pub right: SideView,
    /// Instruction text for the pair's identifier, if any
    pub prompt: Option<String>,
}

/// Session status shared by most session endpoints
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub phase: SessionPhase,
    pub vote_policy: VotePolicy,
    pub choices: Vec<VoteChoice>,
    pub models: Vec<String>,
    pub rounds_planned: usize,
    pub rounds_completed: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub current: Option<RoundView>,
}

impl SessionStatus {
    fn from_session(session: &ArenaSession, instructions: &InstructionTable) -> Self {
        let current = session.current_round().map(|round| RoundView {
            round: round.index,
            total: round.total,
            left: SideView {
                locator: side_locator(round.index, Side::Left, &round.pair.left),
            },
            right: SideView {
                locator: side_locator(round.index, Side::Right, &round.pair.right),
            },
            prompt: instructions.lookup(&round.pair.id).map(str::to_string),
        });

        Self {
            session_id: session.session_id(),
            phase: session.phase(),
            vote_policy: session.policy(),
            choices: session.policy().choices(),
            models: session
                .models()
                .map(|(a, b)| vec![a.to_string(), b.to_string()])
                .unwrap_or_default(),
            rounds_planned: session.rounds_planned(),
            rounds_completed: session.votes().len(),
            started_at: session.started_at(),
            current,
        }
    }
}

/// POST /api/session/start request
#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    /// Round cap; falls back to the configured default
    #[serde(default)]
    pub rounds: Option<usize>,
}

/// POST /api/session/vote request
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    /// Round being answered; must match the current round
    pub round: usize,
    pub choice: VoteChoice,
}

/// POST /api/session/vote response
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub recorded_round: usize,
    pub finished: bool,
    pub status: SessionStatus,
}

async fn current_status(state: &AppState, session: &ArenaSession) -> SessionStatus {
    let instructions = state.instructions.read().await;
    SessionStatus::from_session(session, &instructions)
}

/// GET /api/session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionStatus> {
    let session = state.session.read().await;
    let status = current_status(&state, &session).await;
    Json(status)
}

/// POST /api/session/start
pub async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> ApiResult<Json<SessionStatus>> {
    let round_limit = request.rounds.or(state.max_rounds);

    let mut session = state.session.write().await;
    let rounds = session.start(round_limit).map_err(|e| {
        if e.is_start_failure() {
            info!(session_id = %session.session_id(), error = %e, "Session start rejected");
        }
        e
    })?;

    info!(
        session_id = %session.session_id(),
        rounds,
        round_limit = ?round_limit,
        "Session started from UI"
    );

    let status = current_status(&state, &session).await;
    Ok(Json(status))
}

/// POST /api/session/vote
pub async fn submit_vote(
    State(state): State<AppState>,
    Json(request): Json<VoteRequest>,
) -> ApiResult<Json<VoteResponse>> {
    let mut session = state.session.write().await;

    match session.current_round() {
        Some(current) if current.index == request.round => {}
        Some(current) => {
            return Err(ApiError::Conflict(format!(
                "round {} is not awaiting a vote (current round is {})",
                request.round, current.index
            )));
        }
        None => {
            return Err(ApiError::Conflict(format!(
                "no round is awaiting a vote in the {:?} phase",
                session.phase()
            )));
        }
    }

    let outcome = session.record_vote(request.choice)?;
    let status = current_status(&state, &session).await;

    Ok(Json(VoteResponse {
        recorded_round: request.round,
        finished: outcome == VoteOutcome::Finished,
        status,
    }))
}

/// GET /api/session/result
pub async fn get_result(State(state): State<AppState>) -> ApiResult<Json<SessionResult>> {
    let session = state.session.read().await;
    let result = session.result().cloned().ok_or_else(|| {
        ApiError::Conflict(format!(
            "results are not available in the {:?} phase",
            session.phase()
        ))
    })?;
    Ok(Json(result))
}

/// GET /api/session/export
///
/// Serves the file delivered when the session finished.
pub async fn download_export(State(state): State<AppState>) -> ApiResult<Response> {
    let file = state
        .downloads
        .latest()
        .ok_or_else(|| ApiError::NotFound("no exported results yet".to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.bytes,
    )
        .into_response())
}

/// GET /api/session/image/:round/:side
///
/// Serves a directory image of a planned round without exposing its filename.
pub async fn round_image(
    State(state): State<AppState>,
    Path((round, side)): Path<(usize, Side)>,
    request: Request,
) -> ApiResult<Response> {
    let locator = {
        let session = state.session.read().await;
        let pair = round
            .checked_sub(1)
            .and_then(|index| session.pairs().get(index))
            .ok_or_else(|| ApiError::NotFound(format!("round {} is not planned", round)))?;
        let image = match side {
            Side::Left => &pair.left,
            Side::Right => &pair.right,
        };
        if image.origin != ImageOrigin::CatalogProvided {
            return Err(ApiError::NotFound(
                "uploaded images are held by the browser".to_string(),
            ));
        }
        image.locator.clone()
    };

    let dir = state
        .image_dir
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("no image directory configured".to_string()))?;
    let relative = locator
        .strip_prefix(IMAGE_URL_PREFIX)
        .map(|rest| rest.trim_start_matches('/'))
        .ok_or_else(|| ApiError::Internal(format!("unexpected catalog locator: {}", locator)))?;
    if FsPath::new(relative)
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return Err(ApiError::BadRequest(format!(
            "catalog entry outside the image directory: {}",
            relative
        )));
    }

    let response = match ServeFile::new(dir.join(relative)).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    Ok(response.map(Body::new))
}

/// POST /api/session/reset
///
/// Clears the session and the pending download. When an image directory is
/// configured the catalog is rescanned in the background.
pub async fn reset_session(State(state): State<AppState>) -> ApiResult<Json<SessionStatus>> {
    let mut session = state.session.write().await;
    session.reset()?;
    state.downloads.clear();
    *state.last_warning.write().await = None;

    if state.image_dir.is_some() {
        loader::spawn_catalog_load(state.clone());
    }

    let status = current_status(&state, &session).await;
    Ok(Json(status))
}

/// Build session routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/session/start", post(start_session))
        .route("/api/session/vote", post(submit_vote))
        .route("/api/session/result", get(get_result))
        .route("/api/session/export", get(download_export))
        .route("/api/session/image/:round/:side", get(round_image))
        .route("/api/session/reset", post(reset_session))
}
