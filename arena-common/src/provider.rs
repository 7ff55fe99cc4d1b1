//! Catalog provider: image listings from a directory
//!
//! A `manifest.json` in the directory is the explicit listing (a JSON array
//! of filenames, or an object with a `files` array). Without one, the
//! directory itself is listed one level deep and filtered by extension.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::catalog::{ImageOrigin, LoadedImage};
use crate::error::{Error, Result};

/// Image extensions accepted from directory listings and manifests
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];

/// Manifest filename looked up in the image directory
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Manifest {
    List(Vec<String>),
    Object { files: Vec<String> },
}

impl Manifest {
    fn into_files(self) -> Vec<String> {
        match self {
            Manifest::List(files) | Manifest::Object { files } => files,
        }
    }
}

/// True when the filename has a supported image extension (case-insensitive)
pub fn is_supported_image(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// List image filenames available in `dir`
///
/// Manifest entries keep their listed order; directory listings are sorted by
/// filename. Unsupported files are skipped either way.
pub fn list_image_files(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(Error::CatalogFetch(format!(
            "image directory not found: {}",
            dir.display()
        )));
    }

    let manifest_path = dir.join(MANIFEST_FILE);
    if manifest_path.is_file() {
        let text = std::fs::read_to_string(&manifest_path)
            .map_err(|e| Error::CatalogFetch(format!("{}: {}", manifest_path.display(), e)))?;
        let manifest: Manifest = serde_json::from_str(&text)
            .map_err(|e| Error::CatalogFetch(format!("{}: {}", manifest_path.display(), e)))?;
        let files: Vec<String> = manifest
            .into_files()
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| is_supported_image(name))
            .collect();
        debug!(count = files.len(), manifest = %manifest_path.display(), "Catalog listed from manifest");
        return Ok(files);
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| Error::CatalogFetch(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if is_supported_image(&name) {
            files.push(name);
        }
    }

    debug!(count = files.len(), dir = %dir.display(), "Catalog listed from directory");
    Ok(files)
}

/// Turn listed filenames into catalog entries served under `url_prefix`
///
/// Manifest entries may contain sub-paths; only the last segment is parsed
/// for model and identifier.
pub fn catalog_images(filenames: &[String], url_prefix: &str) -> Vec<LoadedImage> {
    let prefix = url_prefix.trim_end_matches('/');
    filenames
        .iter()
        .map(|name| {
            let display_name = name.rsplit('/').next().unwrap_or(name);
            LoadedImage::from_filename(
                display_name,
                format!("{}/{}", prefix, name.trim_start_matches('/')),
                ImageOrigin::CatalogProvided,
            )
        })
        .collect()
}
