//! Common error types for Image Arena

use thiserror::Error;

/// Common result type for arena operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds reported by the arena core
///
/// None of these is fatal: every failing operation leaves the session in a
/// usable state (configuration phase for start failures, unchanged otherwise).
#[derive(Error, Debug)]
pub enum Error {
    /// Session start attempted with an empty catalog
    #[error("No images provided: add images before starting a session")]
    NoImagesProvided,

    /// Fewer than two distinct model labels available for pairing
    #[error("Insufficient models: found {found} distinct model label(s), need two")]
    InsufficientModels { found: usize },

    /// No identifier is shared by both models
    #[error("No matched pairs: models '{model_a}' and '{model_b}' share no identifiers")]
    NoMatchedPairs { model_a: String, model_b: String },

    /// Instruction table missing or unparseable (voting continues with blank prompts)
    #[error("Instruction load failure: {0}")]
    InstructionLoad(String),

    /// Background catalog source could not be read (manual uploads still work)
    #[error("Catalog fetch failure: {0}")]
    CatalogFetch(String),

    /// Operation not allowed in the current session phase
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Vote choice rejected by the active vote policy
    #[error("Invalid choice: {0}")]
    InvalidChoice(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for the errors a session start can fail with
    pub fn is_start_failure(&self) -> bool {
        matches!(
            self,
            Error::NoImagesProvided | Error::InsufficientModels { .. } | Error::NoMatchedPairs { .. }
        )
    }
}
