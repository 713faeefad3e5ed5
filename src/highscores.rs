//! High score leaderboard system
//!
//! Tracks the top 20 finished sessions. Stored as JSON by the caller.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::settings::GameMode;
use crate::sim::VehicleId;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 20;

/// Emitted once per finished session (single round or full series)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentResult {
    /// Overall winner; `None` for a drawn single round
    pub winner: Option<VehicleId>,
    /// Display name of the winner, or "Draw"
    pub label: String,
    pub mode: GameMode,
    /// Round wins per vehicle slot
    pub scores: Vec<u32>,
    pub rounds: u32,
    pub duration_ticks: u64,
    pub duration_secs: f32,
}

impl TournamentResult {
    /// Winning round count
    pub fn top_score(&self) -> u32 {
        self.scores.iter().copied().max().unwrap_or(0)
    }

    /// Higher top score first, then the quicker session
    fn cmp_rank(&self, other: &Self) -> Ordering {
        other
            .top_score()
            .cmp(&self.top_score())
            .then(self.duration_ticks.cmp(&other.duration_ticks))
    }
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<TournamentResult>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a result makes the table
    pub fn qualifies(&self, result: &TournamentResult) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries
            .last()
            .map(|e| result.cmp_rank(e) == Ordering::Less)
            .unwrap_or(true)
    }

    /// Add a result to the leaderboard (if it qualifies).
    /// Returns the rank achieved (1-indexed).
    pub fn add_result(&mut self, result: TournamentResult) -> Option<usize> {
        if !self.qualifies(&result) {
            log::debug!("Result for {} did not make the table", result.label);
            return None;
        }

        let pos = self.insertion_point(&result);
        log::info!("New high score #{}: {}", pos + 1, result.label);
        self.entries.insert(pos, result);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(pos + 1)
    }

    // Ties go after existing entries
    fn insertion_point(&self, result: &TournamentResult) -> usize {
        self.entries
            .iter()
            .position(|e| result.cmp_rank(e) == Ordering::Less)
            .unwrap_or(self.entries.len())
    }

    pub fn top(&self, n: usize) -> &[TournamentResult] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores.entries.sort_by(|a, b| a.cmp_rank(b));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a stored table, starting fresh on malformed input
    pub fn load_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(scores) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Err(e) => {
                log::warn!("No usable high scores ({}), starting fresh", e);
                Self::new()
            }
        }
    }
}
