//! Persistence for win scores.
//!
//! A score is the number of questions a winning session took, so lower is
//! better. The record is append-only and chronological. Persistence is
//! best-effort in both directions: a missing or corrupt file reads as an
//! empty history, and a failed write is logged and swallowed. Score
//! bookkeeping must never interrupt the game.

use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// Append-only storage for win scores.
pub trait ScoreStore: Send {
    /// Returns the persisted record, oldest first. Missing or corrupt
    /// data reads as an empty history.
    fn load(&self) -> Vec<u32>;

    /// Appends one entry and persists the full updated record.
    /// Persistence failures are logged and swallowed.
    fn append(&mut self, value: u32);
}

/// Returns the best (lowest) score in a record.
pub fn best(scores: &[u32]) -> Option<u32> {
    scores.iter().copied().min()
}

/// Score store backed by a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonScoreStore {
    path: PathBuf,
    scores: Vec<u32>,
}

impl JsonScoreStore {
    /// Opens the store at the given path, reading any existing record.
    #[instrument(skip(path))]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let scores = read_scores(&path);
        info!(path = %path.display(), count = scores.len(), "Opened score store");
        Self { path, scores }
    }
}

impl ScoreStore for JsonScoreStore {
    #[instrument(skip(self))]
    fn load(&self) -> Vec<u32> {
        self.scores.clone()
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn append(&mut self, value: u32) {
        self.scores.push(value);

        match serde_json::to_string(&self.scores) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    warn!(error = %e, "Failed to persist scores");
                } else {
                    debug!(count = self.scores.len(), "Scores persisted");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize scores"),
        }
    }
}

/// Best-effort read of the persisted record.
fn read_scores(path: &PathBuf) -> Vec<u32> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No existing score file");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<u32>>(&content) {
        Ok(scores) => scores,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Score file unreadable, treating as empty");
            Vec::new()
        }
    }
}

/// In-memory score store for tests and no-persist play.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    scores: Vec<u32>,
}

impl MemoryScoreStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with an existing record.
    pub fn with_scores(scores: Vec<u32>) -> Self {
        Self { scores }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self) -> Vec<u32> {
        self.scores.clone()
    }

    fn append(&mut self, value: u32) {
        self.scores.push(value);
    }
}
