//! Filename parsing into (model, identifier)
//!
//! `alpha_001.png` → model `alpha`, id `1`. The model label is everything
//! before the first `_` or `-`; the identifier is the normalized remainder.

use crate::identifier::{is_separator, normalize};

/// Label used when a filename yields an empty model prefix
pub const FALLBACK_MODEL: &str = "model";

/// Result of parsing an image filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Source/model label (case preserved)
    pub model: String,
    /// Normalized identifier used for cross-model matching
    pub id: String,
}

/// Strip the final dot-extension, if present
fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) => &filename[..idx],
        None => filename,
    }
}

/// Split a filename into model label and normalized identifier
///
/// Filenames without any `_`/`-` separator end up with the whole base name as
/// model and id, so they cannot pair with anything unless two real models are
/// present.
///
/// # Examples
/// ```
/// use arena_common::filename::parse_model_and_id;
///
/// let parsed = parse_model_and_id("alpha_001.png");
/// assert_eq!(parsed.model, "alpha");
/// assert_eq!(parsed.id, "1");
/// ```
pub fn parse_model_and_id(filename: &str) -> ParsedName {
    let base = strip_extension(filename);

    let split_index = [base.find('_'), base.find('-')]
        .into_iter()
        .flatten()
        .min();

    let prefix = match split_index {
        Some(idx) => &base[..idx],
        None => base,
    };
    let model = if prefix.is_empty() {
        FALLBACK_MODEL
    } else {
        prefix
    };

    let residual = match split_index {
        Some(idx) => &base[idx + 1..],
        None => match base.get(..model.len()) {
            Some(head) if head.eq_ignore_ascii_case(model) => &base[model.len()..],
            _ => "",
        },
    };

    let id = normalize(residual.trim_start_matches(is_separator));
    let id = if id.is_empty() { base.to_string() } else { id };

    ParsedName {
        model: model.to_string(),
        id,
    }
}
