//! Storage infrastructure: configuration file and rating ledger persistence.
//!
//! Both files are TOML.  A missing file is never an error: the config falls
//! back to its defaults and the ledger starts empty.

pub mod config;
pub mod ledger;

pub use config::{load_config, ConfigError, ServerConfig};
pub use ledger::FileLedger;
