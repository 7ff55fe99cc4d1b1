//! Background loading of external collaborators
//!
//! Catalog scans and instruction tables are loaded off the request path.
//! Failures are non-fatal: they are logged, kept as the latest warning, and
//! manual uploads / blank prompts keep the session usable.

use std::path::Path;

use arena_common::instructions::InstructionTable;
use arena_common::provider::{catalog_images, list_image_files};
use arena_common::Error;
use tracing::{info, warn};

use crate::{AppState, IMAGE_URL_PREFIX};

/// Scan the image directory and merge the result into the session catalog
///
/// Returns the number of newly added images. A scan that finishes after
/// voting started is dropped (the catalog is frozen) and reported as a
/// warning.
pub async fn load_catalog(state: &AppState) -> Result<usize, Error> {
    let outcome = scan_into_session(state).await;

    match &outcome {
        Ok(added) => {
            info!(added, "Catalog images loaded");
        }
        Err(e) => {
            warn!(error = %e, "Catalog load failed; manual uploads still available");
            state.record_warning(e.to_string()).await;
        }
    }

    outcome
}

async fn scan_into_session(state: &AppState) -> Result<usize, Error> {
    let dir = state
        .image_dir
        .clone()
        .ok_or_else(|| Error::CatalogFetch("no image directory configured".to_string()))?;

    let files = tokio::task::spawn_blocking(move || list_image_files(&dir))
        .await
        .map_err(|e| Error::CatalogFetch(format!("catalog scan task failed: {}", e)))??;

    let images = catalog_images(&files, IMAGE_URL_PREFIX);
    state.session.write().await.add_images(images)
}

/// Run [`load_catalog`] in a background task
pub fn spawn_catalog_load(state: AppState) {
    tokio::spawn(async move {
        // outcome already logged and recorded as a warning
        let _ = load_catalog(&state).await;
    });
}

/// Load the instruction table into the shared state
///
/// On failure the table stays empty and voting proceeds with blank prompts.
pub async fn load_instructions(state: &AppState, path: &Path) -> Result<usize, Error> {
    let owned = path.to_path_buf();
    let loaded = tokio::task::spawn_blocking(move || InstructionTable::load(&owned))
        .await
        .map_err(|e| Error::InstructionLoad(format!("instruction load task failed: {}", e)))
        .and_then(|table| table);

    match loaded {
        Ok(table) => {
            let count = table.len();
            info!(path = %path.display(), keys = count, "Instruction table loaded");
            *state.instructions.write().await = table;
            Ok(count)
        }
        Err(e) => {
            warn!(error = %e, "Instruction table unavailable; prompts will be blank");
            state.record_warning(e.to_string()).await;
            Err(e)
        }
    }
}
