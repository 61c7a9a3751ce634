//! Infrastructure layer for the game server.
//!
//! Contains the OS-facing adapters: the WebSocket listener and the TOML
//! config and ledger files.
//!
//! **Dependency rule**: this layer may depend on `application` and `c4_core`,
//! but MUST NOT be imported by the `application` layer.

pub mod storage;
pub mod ws_server;

pub use ws_server::{run_server, serve, SharedSession};
