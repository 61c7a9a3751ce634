//! Move selection: the capability every player implementation provides.
//!
//! A [`MoveStrategy`] is asked for a column whenever its side has to move.
//! It sees a read-only snapshot of the board and whether its previous answer
//! was rejected (full or out-of-range column, or input that was not a number).
//! The caller owns the retry loop; a strategy is never trusted to terminate on
//! its own.
//!
//! Implementations:
//!
//! - [`CenterFirstStrategy`]: the center column unless retrying, then a random
//!   column different from the previous attempt.
//! - [`UniformRandomStrategy`]: any column, uniformly.
//! - [`ConsoleStrategy`]: a human typing column numbers on a terminal.

pub mod console;
pub mod random;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::board::Grid;

pub use console::ConsoleStrategy;
pub use random::{CenterFirstStrategy, UniformRandomStrategy};

/// Why a strategy could not produce a column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    /// The input could not be read as a column number.  Ask again.
    #[error("invalid column value: {0:?}")]
    InvalidInput(String),

    /// The input source is exhausted (e.g. stdin reached EOF).  Asking again
    /// will not help.
    #[error("move input closed")]
    InputClosed,
}

/// Chooses the next column to play.
///
/// `prior_rejected` is `true` when the previous answer for the same turn was
/// refused.  Implementations must not assume anything about board validity;
/// the board is the authority.
pub trait MoveStrategy: Send {
    /// Returns the column to drop a disc into.
    ///
    /// # Errors
    ///
    /// [`StrategyError::InvalidInput`] when the answer could not be parsed
    /// (the caller retries), [`StrategyError::InputClosed`] when no further
    /// answers will come.
    fn choose(&mut self, board: &Grid, prior_rejected: bool) -> Result<i32, StrategyError>;

    /// Short label used in log lines.
    fn name(&self) -> &str;
}

/// The strategies selectable from configuration and the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// A human at the terminal.
    #[default]
    Console,
    /// [`CenterFirstStrategy`].
    Center,
    /// [`UniformRandomStrategy`].
    Random,
}

impl StrategyKind {
    /// Builds a boxed strategy of this kind.  Console strategies use the
    /// process's stdin/stdout.
    pub fn build(self) -> Box<dyn MoveStrategy> {
        match self {
            StrategyKind::Console => Box::new(ConsoleStrategy::stdio()),
            StrategyKind::Center => Box::new(CenterFirstStrategy::new()),
            StrategyKind::Random => Box::new(UniformRandomStrategy::new()),
        }
    }

    /// Like [`build`](Self::build), for callers that draw every board
    /// themselves: the console prompt then leaves the board out.
    pub fn build_without_board(self) -> Box<dyn MoveStrategy> {
        match self {
            StrategyKind::Console => Box::new(ConsoleStrategy::stdio().without_board()),
            other => other.build(),
        }
    }

    /// The display name the bots have always announced themselves with.
    ///
    /// `None` for the console player, who is asked for a name instead.
    pub fn default_player_name(self) -> Option<&'static str> {
        match self {
            StrategyKind::Console => None,
            StrategyKind::Center => Some("random Janez"),
            StrategyKind::Random => Some("random Luka"),
        }
    }
}

/// Returned when a strategy name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy '{0}' (expected console, center or random)")]
pub struct UnknownStrategy(pub String);

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" | "human" => Ok(StrategyKind::Console),
            "center" => Ok(StrategyKind::Center),
            "random" => Ok(StrategyKind::Random),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::Console => "console",
            StrategyKind::Center => "center",
            StrategyKind::Random => "random",
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
