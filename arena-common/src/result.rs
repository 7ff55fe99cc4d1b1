//! Final session result (export payload)

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, OverallWinner};
use crate::vote::Vote;

/// Export payload produced when the last round is voted
///
/// Serialized with camelCase keys. `overallWinner` sits at the top level next
/// to the tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub started_at: DateTime<Utc>,
    /// Exactly two distinct model labels
    pub models_compared: Vec<String>,
    pub rounds_planned: usize,
    pub rounds_completed: usize,
    pub wins_by_model: BTreeMap<String, usize>,
    pub ties: usize,
    pub neither_count: usize,
    pub votes: Vec<Vote>,
    pub overall_winner: OverallWinner,
}

impl SessionResult {
    /// Aggregate a finished vote log into the export payload
    pub fn from_votes(
        started_at: DateTime<Utc>,
        model_a: &str,
        model_b: &str,
        rounds_planned: usize,
        votes: Vec<Vote>,
    ) -> Self {
        let tally = aggregate(&votes, model_a, model_b);
        Self {
            started_at,
            models_compared: vec![model_a.to_string(), model_b.to_string()],
            rounds_planned,
            rounds_completed: votes.len(),
            wins_by_model: tally.wins_by_model,
            ties: tally.ties,
            neither_count: tally.neither_count,
            votes,
            overall_winner: tally.overall_winner,
        }
    }

    pub fn wins_for(&self, model: &str) -> usize {
        self.wins_by_model.get(model).copied().unwrap_or(0)
    }
}
