//! Catalog endpoints
//!
//! The catalog only changes while the session is configuring. Uploaded
//! images stay in the browser; the client registers each one by filename and
//! the object URL it will render from.

use arena_common::{ImageOrigin, LoadedImage, SessionPhase};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::loader;
use crate::AppState;

/// Per-model image count
#[derive(Debug, Serialize)]
pub struct ModelSummary {
    pub model: String,
    pub images: usize,
}

/// GET /api/catalog response
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub session_id: Uuid,
    pub phase: SessionPhase,
    pub total: usize,
    pub images: Vec<LoadedImage>,
    pub models: Vec<ModelSummary>,
    /// First two models; these are compared when voting starts
    pub detected_models: Vec<String>,
    pub warning: Option<String>,
}

/// One browser-held image
#[derive(Debug, Deserialize)]
pub struct UploadedImage {
    pub filename: String,
    pub locator: String,
}

/// POST /api/catalog/uploads request
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub images: Vec<UploadedImage>,
}

/// POST /api/catalog/uploads response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub added: usize,
    pub total: usize,
    pub detected_models: Vec<String>,
}

/// GET /api/catalog
pub async fn get_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let session = state.session.read().await;
    let catalog = session.catalog();

    let models = catalog
        .grouped_by_model()
        .into_iter()
        .map(|group| ModelSummary {
            model: group.model.to_string(),
            images: group.images.len(),
        })
        .collect();

    Json(CatalogResponse {
        session_id: session.session_id(),
        phase: session.phase(),
        total: catalog.len(),
        images: catalog.all_images().cloned().collect(),
        models,
        detected_models: catalog
            .detected_models()
            .into_iter()
            .map(str::to_string)
            .collect(),
        warning: state.last_warning.read().await.clone(),
    })
}

/// POST /api/catalog/uploads
pub async fn upload_images(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> ApiResult<Json<UploadResponse>> {
    if request.images.is_empty() {
        return Err(ApiError::BadRequest("no images in upload".to_string()));
    }

    if let Some(bad) = request
        .images
        .iter()
        .find(|image| image.filename.trim().is_empty() || image.locator.trim().is_empty())
    {
        return Err(ApiError::BadRequest(format!(
            "upload entry needs both filename and locator (filename: '{}')",
            bad.filename
        )));
    }

    let images: Vec<LoadedImage> = request
        .images
        .into_iter()
        .map(|image| {
            LoadedImage::from_filename(image.filename, image.locator, ImageOrigin::Uploaded)
        })
        .collect();

    let mut session = state.session.write().await;
    let added = session.add_images(images)?;
    let catalog = session.catalog();

    tracing::info!(
        session_id = %session.session_id(),
        added,
        total = catalog.len(),
        "Uploaded images registered"
    );

    Ok(Json(UploadResponse {
        added,
        total: catalog.len(),
        detected_models: catalog
            .detected_models()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }))
}

/// POST /api/catalog/refresh
///
/// Re-runs the catalog scan in the background. Progress shows up through
/// `GET /api/catalog`.
pub async fn refresh_catalog(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    if state.image_dir.is_none() {
        return Err(ApiError::BadRequest(
            "no image directory configured; use uploads instead".to_string(),
        ));
    }

    {
        let session = state.session.read().await;
        if session.phase() != SessionPhase::Configuring {
            return Err(ApiError::Conflict(
                "catalog is frozen until the session is reset".to_string(),
            ));
        }
    }

    *state.last_warning.write().await = None;
    loader::spawn_catalog_load(state);

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": "scanning" })),
    ))
}

/// Build catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/catalog", get(get_catalog))
        .route("/api/catalog/uploads", post(upload_images))
        .route("/api/catalog/refresh", post(refresh_catalog))
}
