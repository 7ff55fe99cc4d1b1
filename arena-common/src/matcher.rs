//! Pair matching between two models
//!
//! Joins the two models' images on normalized identifier, shuffles the
//! matched identifiers into round order and flips a coin per pair for the
//! left/right side.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::catalog::{ImageCatalog, LoadedImage};
use crate::error::{Error, Result};
use crate::random::{shuffle, RandomSource};

/// One evaluation unit: the same identifier rendered by both models
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    /// Normalized identifier shared by both images
    pub id: String,
    pub left: Arc<LoadedImage>,
    pub right: Arc<LoadedImage>,
}

/// Identifier index for one model
///
/// Keeps first-seen identifier order so the pre-shuffle order is stable. When
/// two files of the same model normalize to the same identifier, the later
/// one wins.
struct ModelIndex {
    order: Vec<String>,
    by_id: HashMap<String, Arc<LoadedImage>>,
}

impl ModelIndex {
    fn build(catalog: &ImageCatalog, model: &str) -> Self {
        let mut order = Vec::new();
        let mut by_id = HashMap::new();
        for image in catalog.entries().iter().filter(|image| image.model == model) {
            if by_id.insert(image.id.clone(), Arc::clone(image)).is_none() {
                order.push(image.id.clone());
            }
        }
        Self { order, by_id }
    }
}

/// Join of two model indexes on identifier
struct ModelJoin {
    index_a: ModelIndex,
    index_b: ModelIndex,
    /// Shared identifiers in `model_a` first-seen order
    ids: Vec<String>,
}

impl ModelJoin {
    fn build(catalog: &ImageCatalog, model_a: &str, model_b: &str) -> Self {
        let index_a = ModelIndex::build(catalog, model_a);
        let index_b = ModelIndex::build(catalog, model_b);
        let ids = index_a
            .order
            .iter()
            .filter(|id| index_b.by_id.contains_key(*id))
            .cloned()
            .collect();
        Self {
            index_a,
            index_b,
            ids,
        }
    }
}

/// Identifiers present for both models, in `model_a` first-seen order
pub fn matched_ids(catalog: &ImageCatalog, model_a: &str, model_b: &str) -> Vec<String> {
    ModelJoin::build(catalog, model_a, model_b).ids
}

/// Build the shuffled pair list for two distinct models
///
/// Identifiers present for only one model are dropped. Fails with
/// `InsufficientModels` when both labels are the same and with
/// `NoMatchedPairs` when the models share no identifier.
///
/// Randomness is consumed in a fixed order: the Fisher-Yates shuffle of the
/// matched identifiers first, then one coin flip per pair (heads puts
/// `model_a` on the left).
pub fn build_pairs(
    catalog: &ImageCatalog,
    model_a: &str,
    model_b: &str,
    random: &mut dyn RandomSource,
) -> Result<Vec<Pair>> {
    if model_a == model_b {
        return Err(Error::InsufficientModels { found: 1 });
    }

    let ModelJoin {
        index_a,
        index_b,
        mut ids,
    } = ModelJoin::build(catalog, model_a, model_b);

    if ids.is_empty() {
        return Err(Error::NoMatchedPairs {
            model_a: model_a.to_string(),
            model_b: model_b.to_string(),
        });
    }

    debug!(
        model_a = %model_a,
        model_b = %model_b,
        matched = ids.len(),
        unmatched_a = index_a.order.len() - ids.len(),
        unmatched_b = index_b.order.len() - ids.len(),
        "Matched identifiers across models"
    );

    shuffle(&mut ids, random);

    let pairs = ids
        .into_iter()
        .filter_map(|id| {
            let a = index_a.by_id.get(&id)?;
            let b = index_b.by_id.get(&id)?;
            let (left, right) = if random.coin_flip() {
                (Arc::clone(a), Arc::clone(b))
            } else {
                (Arc::clone(b), Arc::clone(a))
            };
            Some(Pair { id, left, right })
        })
        .collect();

    Ok(pairs)
}

/// Apply an optional round cap; `None` or `Some(0)` keeps every pair
pub fn limit_rounds(mut pairs: Vec<Pair>, round_limit: Option<usize>) -> Vec<Pair> {
    if let Some(limit) = round_limit.filter(|limit| *limit > 0) {
        pairs.truncate(limit);
    }
    pairs
}
