//! # Image Arena Common Library
//!
//! Core of the blind pairwise image comparison tool:
//! - Identifier normalization and filename parsing
//! - Image catalog (dedup by locator, grouping by model)
//! - Pair matching with injectable randomness
//! - Voting session state machine and result aggregation
//! - Instruction table, catalog provider and export sink collaborators
//! - Configuration loading and timestamp utilities

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod filename;
pub mod identifier;
pub mod instructions;
pub mod matcher;
pub mod provider;
pub mod random;
pub mod result;
pub mod session;
pub mod time;
pub mod vote;

pub use catalog::{ImageCatalog, ImageOrigin, LoadedImage};
pub use error::{Error, Result};
pub use session::{ArenaSession, SessionPhase};
pub use vote::{VoteChoice, VotePolicy};
