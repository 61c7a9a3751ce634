//! # c4-core
//!
//! Shared library for the Connect-Four host and player: the board and its
//! win detection, the JSON wire protocol, and the move strategies.
//!
//! This crate is used by both the server and the client applications.
//! It has no dependency on sockets, async runtimes, or storage.
//!
//! - **`domain`** – The 6×7 [`Board`]: placement under gravity and win
//!   detection through the last disc.
//!
//! - **`protocol`** – The messages exchanged over the WebSocket, one JSON
//!   object per text frame, and the codec that turns them into text.
//!
//! - **`strategy`** – [`MoveStrategy`] and its bot and console
//!   implementations.  Either side of a game can be driven by any of them.

pub mod domain;
pub mod protocol;
pub mod strategy;

pub use domain::board::{
    render_grid, Board, Cell, Grid, PlaceError, Side, CENTER_COLUMN, COLUMNS, ROWS, WIN_LENGTH,
};
pub use protocol::codec::{decode, encode, CodecError};
pub use protocol::messages::{ClientMessage, MoveResult, ServerMessage, Winner};
pub use strategy::{MoveStrategy, StrategyError, StrategyKind};
