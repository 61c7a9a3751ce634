//! c4-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! The client connects to a Connect-Four server, announces a player name and
//! then answers every `your_turn` with a move chosen by its strategy: a human
//! typing at the terminal, or one of the bots.

/// Application layer: the player state machine.
pub mod application;

/// Infrastructure layer: WebSocket connection and console output.
pub mod infrastructure;
