//! Vote tally
//!
//! A pure fold over the vote log: per-model wins, ties, "neither" outcomes
//! and the overall winner.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::vote::{Vote, VoteChoice};

/// Label used for a tie in logs and the UI; never serialized
pub const TIE_LABEL: &str = "tie";

/// Overall outcome of a session
///
/// Serialized as the winning model label, or `null` for a tie. Any string is
/// a valid model label, so a tie has no string form in the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverallWinner {
    Model(String),
    Tie,
}

impl OverallWinner {
    /// Winning model, `None` for a tie
    pub fn model(&self) -> Option<&str> {
        match self {
            OverallWinner::Model(model) => Some(model),
            OverallWinner::Tie => None,
        }
    }

    /// Display form: the model label or [`TIE_LABEL`]
    pub fn as_str(&self) -> &str {
        self.model().unwrap_or(TIE_LABEL)
    }
}

impl Serialize for OverallWinner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.model().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OverallWinner {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<String>::deserialize(deserializer)? {
            Some(model) => OverallWinner::Model(model),
            None => OverallWinner::Tie,
        })
    }
}

/// Aggregated counts for one vote log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub wins_by_model: BTreeMap<String, usize>,
    pub ties: usize,
    pub neither_count: usize,
    pub overall_winner: OverallWinner,
}

impl Tally {
    /// Sum of every outcome; equals the number of votes tallied
    pub fn total(&self) -> usize {
        self.wins_by_model.values().sum::<usize>() + self.ties + self.neither_count
    }
}

/// Tally a vote log for the two compared models
///
/// Both models start at zero wins. The overall winner is the model with
/// strictly more wins; equal counts (0-0 included) yield a tie.
pub fn aggregate(votes: &[Vote], model_a: &str, model_b: &str) -> Tally {
    let mut wins_by_model = BTreeMap::from([(model_a.to_string(), 0), (model_b.to_string(), 0)]);
    let mut ties = 0;
    let mut neither_count = 0;

    for vote in votes {
        match vote.choice {
            VoteChoice::Left => *wins_by_model.entry(vote.left.model.clone()).or_insert(0) += 1,
            VoteChoice::Right => *wins_by_model.entry(vote.right.model.clone()).or_insert(0) += 1,
            VoteChoice::Tie => ties += 1,
            VoteChoice::Neither => neither_count += 1,
        }
    }

    let wins_a = wins_by_model.get(model_a).copied().unwrap_or(0);
    let wins_b = wins_by_model.get(model_b).copied().unwrap_or(0);
    let overall_winner = if wins_a > wins_b {
        OverallWinner::Model(model_a.to_string())
    } else if wins_b > wins_a {
        OverallWinner::Model(model_b.to_string())
    } else {
        OverallWinner::Tie
    };

    Tally {
        wins_by_model,
        ties,
        neither_count,
        overall_winner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vote::ImageSnapshot;

    fn snapshot(model: &str) -> ImageSnapshot {
        ImageSnapshot {
            display_name: format!("{}_1.png", model),
            model: model.to_string(),
            id: "1".to_string(),
        }
    }

    fn vote(round: usize, left: &str, right: &str, choice: VoteChoice) -> Vote {
        let winning_model = match choice {
            VoteChoice::Left => Some(left.to_string()),
            VoteChoice::Right => Some(right.to_string()),
            _ => None,
        };
        Vote {
            round_index: round,
            left: snapshot(left),
            right: snapshot(right),
            choice,
            winning_model,
        }
    }

    #[test]
    fn test_empty_log_is_tie() {
        let tally = aggregate(&[], "a", "b");
        assert_eq!(tally.wins_by_model["a"], 0);
        assert_eq!(tally.wins_by_model["b"], 0);
        assert_eq!(tally.overall_winner, OverallWinner::Tie);
        assert_eq!(tally.total(), 0);
    }

    #[test]
    fn test_wins_follow_side_model() {
        let votes = vec![
            vote(1, "a", "b", VoteChoice::Left),
            vote(2, "b", "a", VoteChoice::Left),
            vote(3, "b", "a", VoteChoice::Right),
        ];
        let tally = aggregate(&votes, "a", "b");
        assert_eq!(tally.wins_by_model["a"], 2);
        assert_eq!(tally.wins_by_model["b"], 1);
        assert_eq!(tally.overall_winner, OverallWinner::Model("a".to_string()));
    }

    #[test]
    fn test_ties_and_neither_counted() {
        let votes = vec![
            vote(1, "a", "b", VoteChoice::Tie),
            vote(2, "a", "b", VoteChoice::Neither),
            vote(3, "a", "b", VoteChoice::Neither),
            vote(4, "a", "b", VoteChoice::Right),
        ];
        let tally = aggregate(&votes, "a", "b");
        assert_eq!(tally.ties, 1);
        assert_eq!(tally.neither_count, 2);
        assert_eq!(tally.overall_winner, OverallWinner::Model("b".to_string()));
    }

    #[test]
    fn test_even_split_is_tie() {
        let votes = vec![
            vote(1, "a", "b", VoteChoice::Left),
            vote(2, "a", "b", VoteChoice::Right),
        ];
        assert_eq!(aggregate(&votes, "a", "b").overall_winner, OverallWinner::Tie);
    }

    #[test]
    fn test_only_undecided_votes_is_tie() {
        let votes = vec![vote(1, "a", "b", VoteChoice::Tie), vote(2, "a", "b", VoteChoice::Neither)];
        assert_eq!(aggregate(&votes, "a", "b").overall_winner, OverallWinner::Tie);
    }

    #[test]
    fn test_counts_sum_to_vote_count() {
        let choices = [VoteChoice::Left, VoteChoice::Right, VoteChoice::Tie, VoteChoice::Neither];
        let votes: Vec<Vote> = (0..23)
            .map(|i| {
                let (l, r) = if i % 3 == 0 { ("a", "b") } else { ("b", "a") };
                vote(i + 1, l, r, choices[i % choices.len()])
            })
            .collect();
        let tally = aggregate(&votes, "a", "b");
        assert_eq!(tally.total(), votes.len());
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let votes = vec![
            vote(1, "a", "b", VoteChoice::Left),
            vote(2, "b", "a", VoteChoice::Tie),
        ];
        assert_eq!(aggregate(&votes, "a", "b"), aggregate(&votes, "a", "b"));
    }

    #[test]
    fn test_overall_winner_serialization() {
        let json = serde_json::to_string(&OverallWinner::Tie).unwrap();
        assert_eq!(json, "null");
        let parsed: OverallWinner = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, OverallWinner::Tie);
        let json = serde_json::to_string(&OverallWinner::Model("alpha".into())).unwrap();
        assert_eq!(json, "\"alpha\"");
        let parsed: OverallWinner = serde_json::from_str("\"alpha\"").unwrap();
        assert_eq!(parsed, OverallWinner::Model("alpha".into()));
    }

    #[test]
    fn test_model_named_tie_is_not_a_draw() {
        let votes = vec![vote(1, "tie", "other", VoteChoice::Left)];
        let winner = aggregate(&votes, "tie", "other").overall_winner;
        assert_eq!(winner, OverallWinner::Model("tie".to_string()));

        let json = serde_json::to_string(&winner).unwrap();
        assert_eq!(json, "\"tie\"");
        let parsed: OverallWinner = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, winner);
        assert_ne!(parsed, OverallWinner::Tie);
    }
}
