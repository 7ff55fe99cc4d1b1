//! Vote records and vote policy

use serde::{Deserialize, Serialize};

use crate::catalog::LoadedImage;
use crate::matcher::Pair;

/// Decision recorded for one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Left,
    Right,
    /// Both images equally good
    Tie,
    /// Neither image acceptable
    Neither,
}

impl VoteChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteChoice::Left => "left",
            VoteChoice::Right => "right",
            VoteChoice::Tie => "tie",
            VoteChoice::Neither => "neither",
        }
    }
}

/// Which choices a session accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VotePolicy {
    /// Forced choice: left or right only
    #[default]
    LeftRight,
    /// Also allows tie and neither
    Extended,
}

impl VotePolicy {
    pub fn allows(&self, choice: VoteChoice) -> bool {
        match (self, choice) {
            (_, VoteChoice::Left | VoteChoice::Right) => true,
            (VotePolicy::Extended, VoteChoice::Tie | VoteChoice::Neither) => true,
            (VotePolicy::LeftRight, VoteChoice::Tie | VoteChoice::Neither) => false,
        }
    }

    /// Accepted choices in display order
    pub fn choices(&self) -> Vec<VoteChoice> {
        [
            VoteChoice::Left,
            VoteChoice::Right,
            VoteChoice::Tie,
            VoteChoice::Neither,
        ]
        .into_iter()
        .filter(|choice| self.allows(*choice))
        .collect()
    }
}

/// Identifying fields of an image at vote time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSnapshot {
    pub display_name: String,
    pub model: String,
    pub id: String,
}

impl From<&LoadedImage> for ImageSnapshot {
    fn from(image: &LoadedImage) -> Self {
        Self {
            display_name: image.display_name.clone(),
            model: image.model.clone(),
            id: image.id.clone(),
        }
    }
}

/// One recorded decision (immutable once appended to the vote log)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    /// 1-based round number
    pub round_index: usize,
    pub left: ImageSnapshot,
    pub right: ImageSnapshot,
    pub choice: VoteChoice,
    /// Model credited with the win, `None` for tie/neither
    pub winning_model: Option<String>,
}

impl Vote {
    /// Snapshot a pair and the decision made on it
    pub fn new(round_index: usize, pair: &Pair, choice: VoteChoice) -> Self {
        let left = ImageSnapshot::from(pair.left.as_ref());
        let right = ImageSnapshot::from(pair.right.as_ref());
        let winning_model = match choice {
            VoteChoice::Left => Some(left.model.clone()),
            VoteChoice::Right => Some(right.model.clone()),
            VoteChoice::Tie | VoteChoice::Neither => None,
        };
        Self {
            round_index,
            left,
            right,
            choice,
            winning_model,
        }
    }
}
