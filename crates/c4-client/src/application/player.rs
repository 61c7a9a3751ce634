//! Client half of the protocol: reacts to server messages with moves.
//!
//! [`PlayerSession`] is a pure state machine.  It never touches the socket or
//! the terminal; every reaction is returned as a list of [`PlayerAction`]s
//! for the infrastructure layer to carry out in order.
//!
//! ```text
//! open ──► send player_name
//! game_start ──► notify
//! your_turn ──► choose ──► send move
//! move_result{error} ──► notify, choose again (prior rejected) ──► send move
//! move_result{win} ──► render, finished (won / lost)
//! move_result, board full ──► render, finished (draw)
//! ```
//!
//! Once finished, further messages are ignored.

use tracing::{debug, warn};

use c4_core::protocol::{ClientMessage, MoveResult, ServerMessage, Winner};
use c4_core::strategy::{MoveStrategy, StrategyError};
use c4_core::{Cell, Grid};

/// How the game ended for this player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Won,
    Lost,
    Draw,
    /// Our own move input closed before the game ended.
    Abandoned,
}

/// One thing the infrastructure must do in response to a server message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    /// Send this message to the server.
    Send(ClientMessage),
    /// Show the board.
    Render(Grid),
    /// Show a line of text to the player.
    Notify(String),
    /// The game is over; close the connection.
    Finished(GameOutcome),
}

/// Per-connection player state.
pub struct PlayerSession {
    name: String,
    strategy: Box<dyn MoveStrategy>,
    board: Grid,
    outcome: Option<GameOutcome>,
}

impl PlayerSession {
    pub fn new(name: impl Into<String>, strategy: Box<dyn MoveStrategy>) -> Self {
        Self {
            name: name.into(),
            strategy,
            board: Grid::default(),
            outcome: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The outcome, once the game has finished.
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// The first message to send once the connection is open.
    pub fn on_open(&self) -> ClientMessage {
        ClientMessage::PlayerName {
            name: self.name.clone(),
        }
    }

    /// Reacts to one server message.
    pub fn handle(&mut self, msg: ServerMessage) -> Vec<PlayerAction> {
        if self.outcome.is_some() {
            debug!("Ignoring {} after the game ended", msg.type_name());
            return Vec::new();
        }

        match msg {
            ServerMessage::GameStart => vec![PlayerAction::Notify(
                "The game has started. You are playing as 'X'.".to_string(),
            )],
            ServerMessage::YourTurn => self.make_move(false),
            ServerMessage::MoveResult(result) => self.on_move_result(result),
        }
    }

    fn on_move_result(&mut self, result: MoveResult) -> Vec<PlayerAction> {
        if let Some(error) = result.error {
            let mut actions = vec![PlayerAction::Notify(format!("Move rejected: {error}"))];
            actions.extend(self.make_move(true));
            return actions;
        }

        self.board = result.board;
        let mut actions = vec![PlayerAction::Render(self.board)];

        let outcome = if result.win {
            Some(if result.winner == Winner::Client {
                GameOutcome::Won
            } else {
                GameOutcome::Lost
            })
        } else if board_is_full(&self.board) {
            Some(GameOutcome::Draw)
        } else {
            None
        };

        if let Some(outcome) = outcome {
            actions.push(PlayerAction::Notify(
                match outcome {
                    GameOutcome::Won => "You won!",
                    GameOutcome::Lost => "You lost.",
                    _ => "The game ended in a draw.",
                }
                .to_string(),
            ));
            actions.extend(self.finish(outcome));
        }
        actions
    }

    /// Asks the strategy for a column, retrying locally on unparseable input.
    fn make_move(&mut self, mut prior_rejected: bool) -> Vec<PlayerAction> {
        loop {
            match self.strategy.choose(&self.board, prior_rejected) {
                Ok(column) => {
                    debug!("Playing column {column}");
                    return vec![PlayerAction::Send(ClientMessage::move_to(column))];
                }
                Err(StrategyError::InvalidInput(text)) => {
                    debug!("Invalid column {text:?}; asking again");
                    prior_rejected = true;
                }
                Err(StrategyError::InputClosed) => {
                    warn!("Move input closed; leaving the game");
                    let mut actions =
                        vec![PlayerAction::Notify("Input closed; leaving the game.".to_string())];
                    actions.extend(self.finish(GameOutcome::Abandoned));
                    return actions;
                }
            }
        }
    }

    fn finish(&mut self, outcome: GameOutcome) -> Vec<PlayerAction> {
        self.outcome = Some(outcome);
        vec![PlayerAction::Finished(outcome)]
    }
}

fn board_is_full(board: &Grid) -> bool {
    board[0].iter().all(|cell| *cell != Cell::Empty)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
