//! Bot strategies backed by a random number generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::board::{Grid, CENTER_COLUMN, COLUMNS};
use crate::strategy::{MoveStrategy, StrategyError};

/// Plays the center column, and after a rejection a random *different* column.
///
/// Only the immediately previous attempt is excluded on retry, so on a nearly
/// full board this can revisit a full column more than once before landing.
/// The caller's retry loop is the safety net.
pub struct CenterFirstStrategy {
    rng: StdRng,
    last_column: Option<i32>,
}

impl CenterFirstStrategy {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Uses the given generator; seed it for reproducible tests.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            last_column: None,
        }
    }
}

impl Default for CenterFirstStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveStrategy for CenterFirstStrategy {
    fn choose(&mut self, _board: &Grid, prior_rejected: bool) -> Result<i32, StrategyError> {
        let column = if prior_rejected {
            loop {
                let candidate = self.rng.random_range(0..COLUMNS as i32);
                if Some(candidate) != self.last_column {
                    break candidate;
                }
            }
        } else {
            CENTER_COLUMN
        };
        self.last_column = Some(column);
        Ok(column)
    }

    fn name(&self) -> &str {
        "center"
    }
}

/// Picks any column uniformly at random, every time.
pub struct UniformRandomStrategy {
    rng: StdRng,
}

impl UniformRandomStrategy {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self { rng }
    }
}

impl Default for UniformRandomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveStrategy for UniformRandomStrategy {
    fn choose(&mut self, _board: &Grid, _prior_rejected: bool) -> Result<i32, StrategyError> {
        Ok(self.rng.random_range(0..COLUMNS as i32))
    }

    fn name(&self) -> &str {
        "random"
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
