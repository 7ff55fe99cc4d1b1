//! In-memory image catalog
//!
//! Holds every image loaded during the configuration phase. Entries are
//! deduplicated by locator, so merging uploads and catalog-provider results
//! gives the same catalog regardless of arrival order.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::filename::parse_model_and_id;

/// Where an image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageOrigin {
    /// Supplied by the user through the file picker
    Uploaded,
    /// Supplied by the catalog provider (manifest or directory listing)
    CatalogProvided,
}

/// One candidate image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedImage {
    /// Opaque reference to the image bytes (URL)
    pub locator: String,
    /// Parsed model label
    pub model: String,
    /// Original filename
    pub display_name: String,
    /// Normalized identifier used for matching
    pub id: String,
    pub origin: ImageOrigin,
}

impl LoadedImage {
    /// Build an image entry by parsing its filename
    pub fn from_filename(
        display_name: impl Into<String>,
        locator: impl Into<String>,
        origin: ImageOrigin,
    ) -> Self {
        let display_name = display_name.into();
        let parsed = parse_model_and_id(&display_name);
        Self {
            locator: locator.into(),
            model: parsed.model,
            display_name,
            id: parsed.id,
            origin,
        }
    }
}

/// Images of one model, in insertion order
#[derive(Debug, Clone)]
pub struct ModelGroup<'a> {
    pub model: &'a str,
    pub images: Vec<&'a LoadedImage>,
}

/// Append-only image collection, unique by locator
#[derive(Debug, Default)]
pub struct ImageCatalog {
    images: Vec<Arc<LoadedImage>>,
    locators: HashSet<String>,
}

impl ImageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge images into the catalog, skipping locators already present
    ///
    /// Returns the number of images actually added.
    pub fn add<I>(&mut self, images: I) -> usize
    where
        I: IntoIterator<Item = LoadedImage>,
    {
        let mut added = 0;
        for image in images {
            if self.locators.insert(image.locator.clone()) {
                self.images.push(Arc::new(image));
                added += 1;
            }
        }
        added
    }

    /// All images in insertion order
    pub fn all_images(&self) -> impl Iterator<Item = &LoadedImage> {
        self.images.iter().map(|image| image.as_ref())
    }

    /// Shared handles, used by the pair matcher so pairs never copy image data
    pub(crate) fn entries(&self) -> &[Arc<LoadedImage>] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn contains_locator(&self, locator: &str) -> bool {
        self.locators.contains(locator)
    }

    /// Distinct model labels in first-seen order
    pub fn models(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for image in &self.images {
            if !seen.contains(&image.model.as_str()) {
                seen.push(image.model.as_str());
            }
        }
        seen
    }

    /// Images grouped by model, groups ordered by first appearance
    pub fn grouped_by_model(&self) -> Vec<ModelGroup<'_>> {
        self.models()
            .into_iter()
            .map(|model| ModelGroup {
                model,
                images: self
                    .images
                    .iter()
                    .filter(|image| image.model == model)
                    .map(|image| image.as_ref())
                    .collect(),
            })
            .collect()
    }

    /// The first two distinct model labels encountered
    ///
    /// Insertion order decides, not frequency. Returns fewer than two labels
    /// when the catalog does not contain two models.
    pub fn detected_models(&self) -> Vec<&str> {
        let mut models = self.models();
        models.truncate(2);
        models
    }

    pub fn clear(&mut self) {
        self.images.clear();
        self.locators.clear();
    }
}
