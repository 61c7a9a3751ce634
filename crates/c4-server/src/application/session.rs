//! The server-side game session: admission, turn alternation and outcomes.
//!
//! One [`Session`] lives for the whole process.  It owns the only board and
//! admits at most one remote player at a time; its per-game fields are reset
//! on every admission.
//!
//! # State machine
//!
//! ```text
//! AwaitingClient ──admit──► AwaitingName ──player_name──► ServerTurn
//! ServerTurn ──placed──► ClientTurn          ServerTurn ──win/draw──► GameOver
//! ClientTurn ──placed──► ServerTurn          ClientTurn ──win/draw──► GameOver
//! any state ──disconnect──► AwaitingClient
//! ```
//!
//! Messages are gated on the current state: a `move` outside `ClientTurn` or
//! a `player_name` outside `AwaitingName` is dropped without a reply.  A
//! rejected client move keeps `ClientTurn` and produces an error-bearing
//! `move_result`.
//!
//! # Ledger writes
//!
//! Each game writes the ledger at most once: `+1` for a client win, `-1` for a
//! server win or a forfeit (disconnect before the game ended).  Draws and
//! abandoned games (the server's move input closed) are not recorded.  Ledger
//! failures are logged and otherwise ignored.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use uuid::Uuid;

use c4_core::protocol::{ClientMessage, MoveResult, ServerMessage, Winner};
use c4_core::strategy::{MoveStrategy, StrategyError};
use c4_core::{Board, Side};

use crate::application::rating::{RatingLedger, BASE_RATING};

/// Opaque identity of one transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Creates a fresh random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where the session is in the game lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No player attached.
    AwaitingClient,
    /// A player is attached; waiting for its `player_name`.
    AwaitingName,
    /// The server is choosing its move.
    ServerTurn,
    /// Waiting for the player's `move`.
    ClientTurn,
    /// The game ended; the player is still attached.
    GameOver,
}

/// Why a connection was not admitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("another client is already connected")]
    AlreadyAttached,
}

/// What a disconnect did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// The identity was not the attached one; nothing changed.
    Ignored,
    /// The attached player left after the game had ended.
    Closed,
    /// The attached player left before the game ended and lost by forfeit.
    Forfeit,
}

/// The single game session hosted by the server.
pub struct Session {
    attached: Option<ConnectionId>,
    board: Board,
    state: SessionState,
    player_name: Option<String>,
    ledger_written: bool,
    ledger: Arc<dyn RatingLedger>,
    strategy: Box<dyn MoveStrategy>,
    admission_tx: Option<oneshot::Sender<ConnectionId>>,
}

impl Session {
    pub fn new(ledger: Arc<dyn RatingLedger>, strategy: Box<dyn MoveStrategy>) -> Self {
        Self {
            attached: None,
            board: Board::new(),
            state: SessionState::AwaitingClient,
            player_name: None,
            ledger_written: false,
            ledger,
            strategy,
            admission_tx: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    pub fn attached(&self) -> Option<ConnectionId> {
        self.attached
    }

    pub fn is_game_over(&self) -> bool {
        self.state == SessionState::GameOver
    }

    /// Arms a fresh one-shot signal that fires with the identity of the next
    /// admitted connection.  Arming again replaces an unfired signal.
    pub fn arm_admission_signal(&mut self) -> oneshot::Receiver<ConnectionId> {
        let (tx, rx) = oneshot::channel();
        self.admission_tx = Some(tx);
        rx
    }

    /// Attaches `id` and starts a new game, unless a player is already attached.
    ///
    /// # Errors
    ///
    /// [`AdmissionError::AlreadyAttached`] when another identity holds the
    /// session.  The running game is not touched.
    pub fn admit(&mut self, id: ConnectionId) -> Result<(), AdmissionError> {
        if let Some(current) = self.attached {
            debug!("Refusing {id}: {current} is attached");
            return Err(AdmissionError::AlreadyAttached);
        }

        self.attached = Some(id);
        self.board = Board::new();
        self.state = SessionState::AwaitingName;
        self.player_name = None;
        self.ledger_written = false;
        info!("Client {id} admitted");

        if let Some(tx) = self.admission_tx.take() {
            // The waiter may have given up; that is fine.
            let _ = tx.send(id);
        }
        Ok(())
    }

    /// Applies one message from `id` and returns the replies to send, in order.
    ///
    /// Messages from an identity that is not attached, or that do not fit the
    /// current state, produce no replies and no state change.
    pub fn handle_message(&mut self, id: ConnectionId, msg: ClientMessage) -> Vec<ServerMessage> {
        if self.attached != Some(id) {
            debug!("Ignoring {} from unattached connection {id}", msg.type_name());
            return Vec::new();
        }

        let mut out = Vec::new();
        match (self.state, msg) {
            (SessionState::AwaitingName, ClientMessage::PlayerName { name }) => {
                self.on_player_name(name, &mut out);
            }
            (SessionState::ClientTurn, ClientMessage::Move { column }) => {
                self.on_client_move(&column, &mut out);
            }
            (state, msg) => {
                debug!("Ignoring {} in state {:?}", msg.type_name(), state);
            }
        }
        out
    }

    /// Detaches `id` if it is the attached player.
    ///
    /// Leaving before the game ended is a forfeit, including leaving before
    /// the name arrived.  The forfeit costs one rating point only when a name
    /// was announced; an unnamed player has no ledger entry to charge.
    pub fn disconnect(&mut self, id: ConnectionId) -> DisconnectOutcome {
        if self.attached != Some(id) {
            return DisconnectOutcome::Ignored;
        }

        let outcome = match self.state {
            SessionState::AwaitingName | SessionState::ServerTurn | SessionState::ClientTurn => {
                info!(
                    "Player '{}' disconnected before the game ended: forfeit",
                    self.player_name.as_deref().unwrap_or("<unnamed>")
                );
                self.record_result(-1);
                DisconnectOutcome::Forfeit
            }
            SessionState::AwaitingClient | SessionState::GameOver => {
                info!("Client {id} disconnected");
                DisconnectOutcome::Closed
            }
        };

        self.attached = None;
        self.state = SessionState::AwaitingClient;
        outcome
    }

    // ── Message handlers ──────────────────────────────────────────────────────

    fn on_player_name(&mut self, name: String, out: &mut Vec<ServerMessage>) {
        match self.ledger.rating(&name) {
            Ok(Some(rating)) => info!("Player '{name}' joined with rating {rating}"),
            Ok(None) => info!("Player '{name}' is new, starting at {BASE_RATING}"),
            Err(e) => warn!("Could not look up rating for '{name}': {e}"),
        }
        self.player_name = Some(name);
        out.push(ServerMessage::GameStart);
        self.server_move(out);
    }

    fn on_client_move(&mut self, column: &str, out: &mut Vec<ServerMessage>) {
        let placed = column
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("'{column}' is not a column number"))
            .and_then(|col| self.board.place(Side::Client, col).map_err(|e| e.to_string()));

        if let Err(reason) = placed {
            debug!("Rejected client move: {reason}");
            out.push(ServerMessage::MoveResult(MoveResult::rejected(
                format!("Invalid move: {reason}"),
                self.board.snapshot(),
            )));
            return;
        }

        if self.board.has_won(Side::Client) {
            info!("Player '{}' wins", self.player_name.as_deref().unwrap_or("<unnamed>"));
            out.push(self.result(true, Side::Client));
            self.record_result(1);
            self.state = SessionState::GameOver;
        } else if self.board.is_full() {
            out.push(self.result(false, Side::Client));
            self.finish_draw();
        } else {
            out.push(self.result(false, Side::Client));
            self.server_move(out);
        }
    }

    /// Asks the strategy for a column until the board accepts one.
    fn server_move(&mut self, out: &mut Vec<ServerMessage>) {
        self.state = SessionState::ServerTurn;
        let mut prior_rejected = false;

        loop {
            let grid = self.board.snapshot();
            let column = match self.strategy.choose(&grid, prior_rejected) {
                Ok(column) => column,
                Err(StrategyError::InvalidInput(text)) => {
                    warn!("Server strategy gave invalid column {text:?}; asking again");
                    prior_rejected = true;
                    continue;
                }
                Err(StrategyError::InputClosed) => {
                    warn!("Server move input closed; abandoning the game");
                    self.state = SessionState::GameOver;
                    return;
                }
            };

            match self.board.place(Side::Server, column) {
                Ok(_) => break,
                Err(e) => {
                    debug!("Server move rejected ({}): {e}", self.strategy.name());
                    prior_rejected = true;
                }
            }
        }

        if self.board.has_won(Side::Server) {
            info!("Server wins");
            out.push(self.result(true, Side::Server));
            self.record_result(-1);
            self.state = SessionState::GameOver;
        } else if self.board.is_full() {
            out.push(self.result(false, Side::Server));
            self.finish_draw();
        } else {
            out.push(self.result(false, Side::Server));
            out.push(ServerMessage::YourTurn);
            self.state = SessionState::ClientTurn;
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn result(&self, win: bool, mover: Side) -> ServerMessage {
        ServerMessage::MoveResult(MoveResult::accepted(
            win,
            Winner::from(mover),
            self.board.snapshot(),
        ))
    }

    fn finish_draw(&mut self) {
        info!("Board full: draw");
        self.state = SessionState::GameOver;
    }

    /// Writes the game's single ledger adjustment for the remote player.
    fn record_result(&mut self, delta: i64) {
        if self.ledger_written {
            return;
        }
        self.ledger_written = true;

        let Some(name) = self.player_name.as_deref() else {
            debug!("No player name received; rating unchanged");
            return;
        };
        if let Err(e) = self.ledger.adjust_rating(name, delta) {
            warn!("Failed to update rating for '{name}': {e}");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
