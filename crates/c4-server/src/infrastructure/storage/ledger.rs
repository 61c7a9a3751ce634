//! Rating ledger persisted to a TOML file.
//!
//! ```toml
//! [players]
//! "random Luka" = 98
//! alice = 103
//! ```
//!
//! The whole file is loaded on open and rewritten after every adjustment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::rating::{LedgerError, RatingLedger, BASE_RATING};
use crate::infrastructure::storage::config::ConfigError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    players: BTreeMap<String, i64>,
}

/// [`RatingLedger`] backed by a TOML file.
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    ratings: Mutex<BTreeMap<String, i64>>,
}

impl FileLedger {
    /// Opens the ledger at `path`.  A missing file is an empty ledger; it is
    /// created on the first adjustment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file exists but cannot be read, and
    /// [`ConfigError::Parse`] if it is not a valid ledger.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let file: LedgerFile = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LedgerFile::default(),
            Err(e) => return Err(ConfigError::Io { path, source: e }),
        };
        debug!("Loaded {} ratings from {}", file.players.len(), path.display());

        Ok(Self {
            path,
            ratings: Mutex::new(file.players),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, players: BTreeMap<String, i64>) -> Result<(), LedgerError> {
        let file = LedgerFile { players };
        let content = toml::to_string_pretty(&file)
            .map_err(|e| LedgerError::Unavailable(format!("serialize ratings: {e}")))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| LedgerError::Unavailable(format!("{}: {e}", dir.display())))?;
        }
        std::fs::write(&self.path, content)
            .map_err(|e| LedgerError::Unavailable(format!("{}: {e}", self.path.display())))
    }
}

impl RatingLedger for FileLedger {
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
        let rating = ratings.get(name).copied().unwrap_or(BASE_RATING) + delta;

        // The in-memory map only changes once the file holds the new value.
        let mut updated = ratings.clone();
        updated.insert(name.to_string(), rating);
        self.persist(updated)?;
        ratings.insert(name.to_string(), rating);
        debug!("Rating for '{name}' is now {rating}");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
