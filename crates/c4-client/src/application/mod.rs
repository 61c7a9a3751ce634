//! Application layer for the client: the player's side of the protocol.
//!
//! - **`player`** – [`player::PlayerSession`], which turns server messages
//!   into moves, board renders and notices without doing any I/O itself.

pub mod player;

pub use player::{GameOutcome, PlayerAction, PlayerSession};
