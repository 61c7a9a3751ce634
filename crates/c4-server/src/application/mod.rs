//! Application layer: the game session and the rating ledger contract.
//!
//! Nothing here touches sockets or files.  The session is driven by the
//! WebSocket layer and talks to storage only through [`rating::RatingLedger`].
//!
//! - **`session`** – The single hosted game: admission, turn order, win and
//!   forfeit handling.
//! - **`rating`** – The ledger trait plus an in-memory implementation.

pub mod rating;
pub mod session;

pub use rating::{InMemoryLedger, LedgerError, RatingLedger, BASE_RATING};
pub use session::{AdmissionError, ConnectionId, DisconnectOutcome, Session, SessionState};
