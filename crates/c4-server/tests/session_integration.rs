//! Integration tests for the game session through its public API.
//!
//! Whole games are played between two bot strategies: the session's own
//! server strategy and a client-side strategy that answers every
//! `your_turn`, exactly as a remote player would.  The tests check the
//! protocol invariants over many seeded games rather than one scripted line.

use std::sync::Arc;

use c4_core::protocol::{ClientMessage, MoveResult, ServerMessage, Winner};
use c4_core::strategy::{CenterFirstStrategy, MoveStrategy, UniformRandomStrategy};
use c4_core::{Board, Side};
use c4_server::application::{
    ConnectionId, DisconnectOutcome, InMemoryLedger, RatingLedger, Session, SessionState,
    BASE_RATING,
};
use c4_server::infrastructure::storage::FileLedger;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// How a finished game ended, as seen by the remote player.
#[derive(Debug, PartialEq, Eq)]
enum Ending {
    ClientWon,
    ServerWon,
    Draw,
}

/// Plays one game to the end and returns how it ended.
///
/// Mirrors every accepted placement onto a local board so the board carried
/// by each `move_result` can be checked against an independent replay.
fn play_game(session: &mut Session, id: ConnectionId, client: &mut dyn MoveStrategy) -> Ending {
    let mut replies = session.handle_message(
        id,
        ClientMessage::PlayerName {
            name: "tester".to_string(),
        },
    );
    assert_eq!(replies.first(), Some(&ServerMessage::GameStart));
    replies.remove(0);

    let mut mirror = Board::new();
    let mut expected_mover = Side::Server;
    let mut pending_move: Option<i32> = None;
    let mut rejected = false;

    loop {
        let mut your_turn = false;
        for reply in replies.drain(..) {
            match reply {
                ServerMessage::MoveResult(MoveResult { error: Some(_), .. }) => {
                    // Rejected: the client must try again.
                    rejected = true;
                    your_turn = true;
                }
                ServerMessage::MoveResult(result) => {
                    let grid = result.board;
                    // Replay: find the column where the grids differ.
                    let before = mirror.snapshot();
                    let column = (0..c4_core::COLUMNS)
                        .find(|&c| (0..c4_core::ROWS).any(|r| before[r][c] != grid[r][c]))
                        .expect("an accepted move changes the board");
                    mirror.place(expected_mover, column as i32).unwrap();
                    assert_eq!(mirror.snapshot(), grid, "board must match replay");
                    if expected_mover == Side::Client {
                        assert_eq!(pending_move, Some(column as i32));
                    }

                    if result.win {
                        assert_eq!(result.winner, Winner::from(expected_mover));
                        assert_eq!(session.state(), SessionState::GameOver);
                        return match expected_mover {
                            Side::Client => Ending::ClientWon,
                            Side::Server => Ending::ServerWon,
                        };
                    }
                    assert_eq!(result.winner, Winner::None);
                    if mirror.is_full() {
                        assert_eq!(session.state(), SessionState::GameOver);
                        return Ending::Draw;
                    }
                    expected_mover = expected_mover.opponent();
                }
                ServerMessage::YourTurn => {
                    assert_eq!(expected_mover, Side::Client, "your_turn only after a server move");
                    your_turn = true;
                }
                ServerMessage::GameStart => panic!("game_start only once"),
            }
        }

        assert!(your_turn, "the session must either finish or hand over the turn");
        assert_eq!(session.state(), SessionState::ClientTurn);
        let column = client.choose(&mirror.snapshot(), rejected).unwrap();
        rejected = false;
        pending_move = Some(column);
        replies = session.handle_message(id, ClientMessage::move_to(column));
    }
}

#[test]
fn test_many_bot_games_keep_protocol_invariants() {
    for seed in 0..40u64 {
        // Arrange
        let ledger = Arc::new(InMemoryLedger::new());
        let server = Box::new(CenterFirstStrategy::with_rng(StdRng::seed_from_u64(seed)));
        let mut session = Session::new(ledger.clone(), server);
        let mut client = UniformRandomStrategy::with_rng(StdRng::seed_from_u64(seed + 1000));
        let id = ConnectionId::new();
        session.admit(id).unwrap();

        // Act
        let ending = play_game(&mut session, id, &mut client);

        // Assert: exactly the ledger effect the ending calls for
        let expected = match ending {
            Ending::ClientWon => Some(BASE_RATING + 1),
            Ending::ServerWon => Some(BASE_RATING - 1),
            Ending::Draw => None,
        };
        assert_eq!(ledger.rating("tester").unwrap(), expected, "seed {seed}");
        assert_eq!(session.disconnect(id), DisconnectOutcome::Closed);
        assert_eq!(ledger.rating("tester").unwrap(), expected, "no second write on close");
    }
}

#[test]
fn test_consecutive_games_accumulate_in_file_ledger() {
    // Arrange
    let dir = std::env::temp_dir().join(format!("c4_session_it_{}", uuid::Uuid::new_v4()));
    let path = dir.join("ratings.toml");
    let ledger = Arc::new(FileLedger::open(&path).unwrap());
    let server = Box::new(UniformRandomStrategy::with_rng(StdRng::seed_from_u64(7)));
    let mut session = Session::new(ledger.clone(), server);
    let mut client = CenterFirstStrategy::with_rng(StdRng::seed_from_u64(8));

    // Act
    let mut net = 0i64;
    for _ in 0..5 {
        let id = ConnectionId::new();
        session.admit(id).unwrap();
        net += match play_game(&mut session, id, &mut client) {
            Ending::ClientWon => 1,
            Ending::ServerWon => -1,
            Ending::Draw => 0,
        };
        session.disconnect(id);
    }

    // Assert
    let reopened = FileLedger::open(&path).unwrap();
    let stored = reopened.rating("tester").unwrap();
    assert_eq!(stored.unwrap_or(BASE_RATING), BASE_RATING + net);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_forfeit_mid_game_then_new_client_gets_fresh_board() {
    // Arrange
    let ledger = Arc::new(InMemoryLedger::new());
    let server = Box::new(CenterFirstStrategy::with_rng(StdRng::seed_from_u64(1)));
    let mut session = Session::new(ledger.clone(), server);
    let first = ConnectionId::new();
    session.admit(first).unwrap();
    session.handle_message(first, ClientMessage::PlayerName { name: "quitter".to_string() });
    session.handle_message(first, ClientMessage::move_to(0));

    // Act
    let outcome = session.disconnect(first);
    let second = ConnectionId::new();
    session.admit(second).unwrap();

    // Assert
    assert_eq!(outcome, DisconnectOutcome::Forfeit);
    assert_eq!(ledger.rating("quitter").unwrap(), Some(BASE_RATING - 1));
    assert_eq!(session.board(), &Board::new());
    assert!(session.handle_message(first, ClientMessage::move_to(1)).is_empty());
}
