//! Voting session state machine
//!
//! Configuring → Voting → Results, with an explicit reset back to
//! Configuring. The catalog only grows while configuring, pairs are fixed at
//! start, and the vote log only grows while voting. Finishing (aggregation
//! plus export) happens exactly once, on the vote that completes the last
//! planned round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{ImageCatalog, LoadedImage};
use crate::error::{Error, Result};
use crate::export::{ExportSink, ExportedFile};
use crate::matcher::{build_pairs, limit_rounds, Pair};
use crate::random::RandomSource;
use crate::result::SessionResult;
use crate::time;
use crate::vote::{Vote, VoteChoice, VotePolicy};

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Collecting images
    Configuring,
    /// Rounds being voted
    Voting,
    /// Finished; read-only until reset
    Results,
}

/// The round currently awaiting a vote
#[derive(Debug, Clone, Copy)]
pub struct CurrentRound<'a> {
    /// 1-based round number
    pub index: usize,
    /// Planned number of rounds
    pub total: usize,
    pub pair: &'a Pair,
}

/// What a recorded vote led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Voting continues with this 1-based round
    NextRound(usize),
    /// Last round voted; results are final
    Finished,
}

/// One comparison session between two models
pub struct ArenaSession {
    session_id: Uuid,
    phase: SessionPhase,
    catalog: ImageCatalog,
    models: Option<(String, String)>,
    pairs: Vec<Pair>,
    votes: Vec<Vote>,
    started_at: Option<DateTime<Utc>>,
    result: Option<SessionResult>,
    policy: VotePolicy,
    random: Box<dyn RandomSource>,
    sink: Box<dyn ExportSink>,
}

impl ArenaSession {
    /// Create a session in the configuring phase
    pub fn new(random: Box<dyn RandomSource>, sink: Box<dyn ExportSink>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            phase: SessionPhase::Configuring,
            catalog: ImageCatalog::new(),
            models: None,
            pairs: Vec::new(),
            votes: Vec::new(),
            started_at: None,
            result: None,
            policy: VotePolicy::default(),
            random,
            sink,
        }
    }

    pub fn with_policy(mut self, policy: VotePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn policy(&self) -> VotePolicy {
        self.policy
    }

    pub fn catalog(&self) -> &ImageCatalog {
        &self.catalog
    }

    /// Models being compared, once voting has started
    pub fn models(&self) -> Option<(&str, &str)> {
        self.models
            .as_ref()
            .map(|(a, b)| (a.as_str(), b.as_str()))
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn rounds_planned(&self) -> usize {
        self.pairs.len()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Final result, available in the results phase
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    /// Merge images into the catalog
    ///
    /// Only allowed while configuring; the catalog is frozen once voting
    /// starts. Returns the number of new images.
    pub fn add_images<I>(&mut self, images: I) -> Result<usize>
    where
        I: IntoIterator<Item = LoadedImage>,
    {
        if self.phase != SessionPhase::Configuring {
            return Err(Error::InvalidState(format!(
                "catalog is frozen while the session is in the {:?} phase",
                self.phase
            )));
        }

        let added = self.catalog.add(images);
        debug!(
            session_id = %self.session_id,
            added,
            total = self.catalog.len(),
            "Images added to catalog"
        );
        Ok(added)
    }

    /// Start voting on the first two models detected in the catalog
    pub fn start(&mut self, round_limit: Option<usize>) -> Result<usize> {
        self.ensure_configuring("start")?;

        if self.catalog.is_empty() {
            return Err(Error::NoImagesProvided);
        }

        let detected = self.catalog.detected_models();
        let (model_a, model_b) = match detected.as_slice() {
            [a, b] => (a.to_string(), b.to_string()),
            other => return Err(Error::InsufficientModels { found: other.len() }),
        };

        self.start_with_models(&model_a, &model_b, round_limit)
    }

    /// Start voting on an explicit pair of models
    ///
    /// On failure the session stays in the configuring phase, unchanged.
    /// Returns the number of planned rounds.
    pub fn start_with_models(
        &mut self,
        model_a: &str,
        model_b: &str,
        round_limit: Option<usize>,
    ) -> Result<usize> {
        self.ensure_configuring("start")?;

        if self.catalog.is_empty() {
            return Err(Error::NoImagesProvided);
        }

        let pairs = build_pairs(&self.catalog, model_a, model_b, self.random.as_mut())?;
        let pairs = limit_rounds(pairs, round_limit);

        self.pairs = pairs;
        self.votes.clear();
        self.models = Some((model_a.to_string(), model_b.to_string()));
        self.started_at = Some(time::now());
        self.result = None;
        self.phase = SessionPhase::Voting;

        info!(
            session_id = %self.session_id,
            model_a = %model_a,
            model_b = %model_b,
            rounds = self.pairs.len(),
            "Voting started"
        );

        Ok(self.pairs.len())
    }

    /// Round awaiting a vote, if voting
    pub fn current_round(&self) -> Option<CurrentRound<'_>> {
        if self.phase != SessionPhase::Voting {
            return None;
        }
        let cursor = self.votes.len();
        self.pairs.get(cursor).map(|pair| CurrentRound {
            index: cursor + 1,
            total: self.pairs.len(),
            pair,
        })
    }

    /// Record the decision for the current round and advance
    ///
    /// The vote that completes the last planned round aggregates the log,
    /// moves to the results phase and delivers the export. Any vote after
    /// that is rejected.
    pub fn record_vote(&mut self, choice: VoteChoice) -> Result<VoteOutcome> {
        if self.phase != SessionPhase::Voting {
            return Err(Error::InvalidState(format!(
                "cannot vote in the {:?} phase",
                self.phase
            )));
        }

        if !self.policy.allows(choice) {
            return Err(Error::InvalidChoice(format!(
                "'{}' is not allowed by the {:?} vote policy",
                choice.as_str(),
                self.policy
            )));
        }

        let cursor = self.votes.len();
        let pair = self.pairs.get(cursor).ok_or_else(|| {
            Error::InvalidState(format!(
                "all {} planned rounds already voted",
                self.pairs.len()
            ))
        })?;

        let vote = Vote::new(cursor + 1, pair, choice);
        debug!(
            session_id = %self.session_id,
            round = vote.round_index,
            choice = choice.as_str(),
            winner = ?vote.winning_model,
            "Vote recorded"
        );
        self.votes.push(vote);

        if self.votes.len() < self.pairs.len() {
            return Ok(VoteOutcome::NextRound(self.votes.len() + 1));
        }

        self.finish()?;
        Ok(VoteOutcome::Finished)
    }

    /// Aggregate, enter the results phase and deliver the export
    ///
    /// The phase changes before delivery, so a failing sink cannot cause a
    /// second finish; the error is still returned to the caller.
    fn finish(&mut self) -> Result<()> {
        let (model_a, model_b) = self
            .models
            .clone()
            .ok_or_else(|| Error::Internal("voting without selected models".to_string()))?;
        let started_at = self.started_at.unwrap_or_else(time::now);

        let result = SessionResult::from_votes(
            started_at,
            &model_a,
            &model_b,
            self.pairs.len(),
            self.votes.clone(),
        );
        let file = ExportedFile::from_result(&result, time::now())?;

        info!(
            session_id = %self.session_id,
            rounds = result.rounds_completed,
            winner = result.overall_winner.as_str(),
            export = %file.filename,
            "Session finished"
        );

        self.result = Some(result);
        self.phase = SessionPhase::Results;

        if let Err(e) = self.sink.deliver(file) {
            warn!(session_id = %self.session_id, error = %e, "Result export failed");
            return Err(e);
        }
        Ok(())
    }

    /// Discard catalog, pairs and votes and return to configuring
    ///
    /// Rejected while voting so the vote log never shrinks mid-session.
    pub fn reset(&mut self) -> Result<()> {
        if self.phase == SessionPhase::Voting {
            return Err(Error::InvalidState(
                "cannot reset while voting is in progress".to_string(),
            ));
        }

        let previous = self.session_id;
        self.session_id = Uuid::new_v4();
        self.phase = SessionPhase::Configuring;
        self.catalog.clear();
        self.models = None;
        self.pairs.clear();
        self.votes.clear();
        self.started_at = None;
        self.result = None;

        info!(
            previous_session_id = %previous,
            session_id = %self.session_id,
            "Session reset"
        );
        Ok(())
    }

    fn ensure_configuring(&self, operation: &str) -> Result<()> {
        if self.phase == SessionPhase::Configuring {
            Ok(())
        } else {
            Err(Error::InvalidState(format!(
                "cannot {} in the {:?} phase",
                operation, self.phase
            )))
        }
    }
}

impl std::fmt::Debug for ArenaSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaSession")
            .field("session_id", &self.session_id)
            .field("phase", &self.phase)
            .field("images", &self.catalog.len())
            .field("models", &self.models)
            .field("rounds_planned", &self.pairs.len())
            .field("votes", &self.votes.len())
            .field("policy", &self.policy)
            .finish()
    }
}
