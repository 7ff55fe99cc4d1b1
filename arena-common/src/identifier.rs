//! Identifier normalization
//!
//! Normalized identifiers are the join key used to match outputs of the two
//! models, so `normalize` must stay pure and idempotent.

/// Characters treated as separators in filename-derived identifiers
pub fn is_separator(c: char) -> bool {
    matches!(c, '-' | '_' | '.') || c.is_whitespace()
}

/// Canonicalize a raw identifier for cross-model matching
///
/// - Trims whitespace and strips a leading run of separators
/// - All-digit identifiers lose their leading zeros (`"000"` becomes `"0"`)
/// - Anything else is returned as cleaned, case preserved
///
/// # Examples
/// ```
/// use arena_common::identifier::normalize;
///
/// assert_eq!(normalize("007"), "7");
/// assert_eq!(normalize("000"), "0");
/// assert_eq!(normalize("A-01"), "A-01");
/// ```
pub fn normalize(raw: &str) -> String {
    let cleaned = raw.trim().trim_start_matches(is_separator);

    if !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit()) {
        let stripped = cleaned.trim_start_matches('0');
        if stripped.is_empty() {
            "0".to_string()
        } else {
            stripped.to_string()
        }
    } else {
        cleaned.to_string()
    }
}
