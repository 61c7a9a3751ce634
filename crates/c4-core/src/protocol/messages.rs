//! Wire message types for the Connect-Four protocol.
//!
//! Every message is one JSON object carried in a WebSocket text frame.  The
//! `"type"` field names the variant; the remaining fields sit in the same
//! object:
//!
//! ```json
//! {"type":"player_name","name":"random Luka"}
//! {"type":"move","column":"3"}
//! {"type":"move_result","win":false,"winner":0,"board":[[0,0,0,0,0,0,0], ...]}
//! ```
//!
//! The two directions carry different messages, so they are separate enums:
//! [`ClientMessage`] is only ever sent by the player, [`ServerMessage`] only by
//! the host.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::board::{Grid, Side};

/// Who won, as carried in `move_result.winner`.
///
/// Encoded as a bare integer: `0` none, `1` client, `2` server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Winner {
    #[default]
    None,
    Client,
    Server,
}

impl From<Side> for Winner {
    fn from(side: Side) -> Self {
        match side {
            Side::Client => Winner::Client,
            Side::Server => Winner::Server,
        }
    }
}

impl From<Winner> for u8 {
    fn from(winner: Winner) -> Self {
        match winner {
            Winner::None => 0,
            Winner::Client => 1,
            Winner::Server => 2,
        }
    }
}

impl TryFrom<u8> for Winner {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Winner::None),
            1 => Ok(Winner::Client),
            2 => Ok(Winner::Server),
            other => Err(format!("invalid winner value {other}, expected 0, 1 or 2")),
        }
    }
}

/// Messages sent by the player to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// First message after connecting; the name keys the rating ledger.
    PlayerName { name: String },

    /// A disc drop.
    ///
    /// The column travels as text so that whatever a human typed reaches the
    /// server verbatim; the server decides whether it is a valid column.
    Move {
        #[serde(deserialize_with = "column_from_string_or_int")]
        column: String,
    },
}

impl ClientMessage {
    /// Builds a `move` message for a numeric column.
    pub fn move_to(column: i32) -> Self {
        ClientMessage::Move {
            column: column.to_string(),
        }
    }

    /// The wire tag, for log lines that must not echo field values.
    pub fn type_name(&self) -> &'static str {
        match self {
            ClientMessage::PlayerName { .. } => "player_name",
            ClientMessage::Move { .. } => "move",
        }
    }
}

/// Messages sent by the server to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The name was accepted and a fresh game begins; the server moves first.
    GameStart,

    /// The player may now send a `move`.
    YourTurn,

    /// Outcome of the most recent placement by either side.
    MoveResult(MoveResult),
}

impl ServerMessage {
    /// The wire tag, for log lines.
    pub fn type_name(&self) -> &'static str {
        match self {
            ServerMessage::GameStart => "game_start",
            ServerMessage::YourTurn => "your_turn",
            ServerMessage::MoveResult(_) => "move_result",
        }
    }
}

/// Payload of a `move_result` message.
///
/// `error` is present only when the player's move was rejected; in that case
/// the board is unchanged and the player is expected to try again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    #[serde(default)]
    pub win: bool,
    #[serde(default)]
    pub winner: Winner,
    #[serde(default)]
    pub board: Grid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MoveResult {
    /// A placement that was applied.  `winner` is ignored unless `win` is set.
    pub fn accepted(win: bool, winner: Winner, board: Grid) -> Self {
        Self {
            win,
            winner: if win { winner } else { Winner::None },
            board,
            error: None,
        }
    }

    /// A rejected placement; `board` is the unchanged current grid.
    pub fn rejected(reason: impl Into<String>, board: Grid) -> Self {
        Self {
            win: false,
            winner: Winner::None,
            board,
            error: Some(reason.into()),
        }
    }

    /// `true` when this result reports a rejected move.
    pub fn is_rejection(&self) -> bool {
        self.error.is_some()
    }
}

/// Accepts `"column": "3"` as well as `"column": 3`.
///
/// Older bots send the column as a JSON number; both forms are normalised to
/// the decimal string.
fn column_from_string_or_int<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawColumn {
        Text(String),
        Number(i64),
    }

    Ok(match RawColumn::deserialize(deserializer)? {
        RawColumn::Text(s) => s,
        RawColumn::Number(n) => n.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
