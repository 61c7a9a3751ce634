//! Rating ledger contract and an in-memory implementation.
//!
//! The ledger maps a player's display name to an integer skill rating.  The
//! session adjusts it by one point per finished game: `+1` when the remote
//! player wins, `-1` when the server wins or the player forfeits by
//! disconnecting.  A name seen for the first time starts at [`BASE_RATING`].
//!
//! Entries are never deleted here.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

/// Rating a new player starts with.
pub const BASE_RATING: i64 = 100;

/// Errors raised by ledger back-ends.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The backing store could not be read or written.
    #[error("rating store unavailable: {0}")]
    Unavailable(String),
}

/// Keyed rating store.
///
/// Implementations must be shareable across tasks; the session calls them
/// while holding its own lock, so calls should be quick.
#[cfg_attr(test, mockall::automock)]
pub trait RatingLedger: Send + Sync {
    /// Current rating for `name`, or `None` if the name has never been seen.
    fn rating(&self, name: &str) -> Result<Option<i64>, LedgerError>;

    /// Adds `delta` to the rating for `name`, creating the entry at
    /// [`BASE_RATING`] first if needed.
    fn adjust_rating(&self, name: &str, delta: i64) -> Result<(), LedgerError>;
}

/// Ledger kept in process memory; lost on exit.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    ratings: Mutex<HashMap<String, i64>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RatingLedger for InMemoryLedger {
    fn rating(&self, name: &str) -> Result<Option<i64>, LedgerError> {
        let ratings = self
            .ratings
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger lock poisoned".to_string()))?;
        Ok(ratings.get(name).copied())
    }

    fn adjust_rating(&self, name: &str, delta: i64) -> Result<(), LedgerError> {
        let mut ratings = self
            .ratings
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger lock poisoned".to_string()))?;
        *ratings.entry(name.to_string()).or_insert(BASE_RATING) += delta;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
