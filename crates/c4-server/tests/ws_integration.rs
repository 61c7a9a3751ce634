//! End-to-end tests over a real WebSocket.
//!
//! Each test binds the server to an ephemeral localhost port, runs the accept
//! loop in a background task and talks to it with a `tokio-tungstenite`
//! client, exactly as a remote player would.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};

use c4_core::protocol::{decode, encode, ClientMessage, ServerMessage, Winner};
use c4_core::strategy::{MoveStrategy, StrategyError};
use c4_core::Grid;
use c4_server::application::{InMemoryLedger, RatingLedger, Session, SessionState};
use c4_server::infrastructure::ws_server::{GAME_OVER_REASON, REFUSAL_REASON};
use c4_server::infrastructure::{serve, SharedSession};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const STEP: Duration = Duration::from_secs(5);

/// Server strategy that plays a fixed list of columns.
struct Scripted(VecDeque<i32>);

impl MoveStrategy for Scripted {
    fn choose(&mut self, _board: &Grid, _prior_rejected: bool) -> Result<i32, StrategyError> {
        self.0.pop_front().ok_or(StrategyError::InputClosed)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct TestServer {
    addr: SocketAddr,
    session: SharedSession,
    ledger: Arc<InMemoryLedger>,
    running: Arc<AtomicBool>,
    task: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    async fn start(server_columns: &[i32]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let ledger = Arc::new(InMemoryLedger::new());
        let strategy = Box::new(Scripted(server_columns.iter().copied().collect()));
        let session: SharedSession = Arc::new(Mutex::new(Session::new(ledger.clone(), strategy)));
        let running = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(serve(listener, Arc::clone(&session), Arc::clone(&running)));
        Self {
            addr,
            session,
            ledger,
            running,
            task,
        }
    }

    async fn connect(&self) -> Client {
        let (ws, _response) = connect_async(format!("ws://{}", self.addr)).await.unwrap();
        ws
    }

    async fn stop(self) {
        self.running.store(false, Ordering::Relaxed);
        timeout(STEP, self.task).await.unwrap().unwrap().unwrap();
    }
}

async fn send(ws: &mut Client, msg: &ClientMessage) {
    ws.send(WsMessage::Text(encode(msg).unwrap())).await.unwrap();
}

/// Next frame that is not a ping/pong.
async fn next_frame(ws: &mut Client) -> WsMessage {
    loop {
        let frame = timeout(STEP, ws.next())
            .await
            .expect("timed out waiting for server")
            .expect("stream ended")
            .expect("websocket error");
        if !matches!(frame, WsMessage::Ping(_) | WsMessage::Pong(_)) {
            return frame;
        }
    }
}

async fn recv(ws: &mut Client) -> ServerMessage {
    match next_frame(ws).await {
        WsMessage::Text(text) => decode(&text).unwrap(),
        other => panic!("expected a text frame, got {:?}", other),
    }
}

async fn expect_close_reason(ws: &mut Client) -> String {
    match next_frame(ws).await {
        WsMessage::Close(Some(frame)) => frame.reason.to_string(),
        other => panic!("expected a Close frame, got {:?}", other),
    }
}

async fn join(ws: &mut Client, name: &str) {
    send(ws, &ClientMessage::PlayerName { name: name.to_string() }).await;
    assert_eq!(recv(ws).await, ServerMessage::GameStart);
    assert!(matches!(recv(ws).await, ServerMessage::MoveResult(_)));
    assert_eq!(recv(ws).await, ServerMessage::YourTurn);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_game_client_wins_and_is_credited() {
    // Arrange
    let server = TestServer::start(&[6, 6, 6, 5]).await;
    let mut ws = server.connect().await;
    join(&mut ws, "alice").await;

    // Act: bottom row 0..=2, each answered by the server
    for col in 0..3 {
        send(&mut ws, &ClientMessage::move_to(col)).await;
        assert!(matches!(recv(&mut ws).await, ServerMessage::MoveResult(r) if !r.win));
        assert!(matches!(recv(&mut ws).await, ServerMessage::MoveResult(r) if !r.win));
        assert_eq!(recv(&mut ws).await, ServerMessage::YourTurn);
    }
    send(&mut ws, &ClientMessage::move_to(3)).await;
    let last = recv(&mut ws).await;

    // Assert
    match last {
        ServerMessage::MoveResult(r) => {
            assert!(r.win);
            assert_eq!(r.winner, Winner::Client);
        }
        other => panic!("expected winning move_result, got {:?}", other),
    }
    assert_eq!(expect_close_reason(&mut ws).await, GAME_OVER_REASON);
    assert_eq!(server.ledger.rating("alice").unwrap(), Some(101));
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_second_client_is_refused_with_reason() {
    // Arrange
    let server = TestServer::start(&[3, 3]).await;
    let mut first = server.connect().await;
    join(&mut first, "alice").await;
    let board_before = server.session.lock().await.board().snapshot();

    // Act
    let mut second = server.connect().await;
    let reason = expect_close_reason(&mut second).await;

    // Assert
    assert_eq!(reason, REFUSAL_REASON);
    {
        let session = server.session.lock().await;
        assert_eq!(session.board().snapshot(), board_before);
        assert_eq!(session.state(), SessionState::ClientTurn);
    }

    // The first client is unaffected and can still move.
    send(&mut first, &ClientMessage::move_to(0)).await;
    assert!(matches!(recv(&mut first).await, ServerMessage::MoveResult(_)));
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_disconnect_mid_game_is_a_forfeit() {
    // Arrange
    let server = TestServer::start(&[3, 3]).await;
    let mut ws = server.connect().await;
    join(&mut ws, "quitter").await;

    // Act
    ws.close(None).await.unwrap();
    drop(ws);

    // Assert: the server notices asynchronously
    let ledger = Arc::clone(&server.ledger);
    timeout(STEP, async move {
        while ledger.rating("quitter").unwrap() != Some(99) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("forfeit was never recorded");
    assert_eq!(server.session.lock().await.state(), SessionState::AwaitingClient);
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_malformed_and_out_of_turn_frames_are_dropped() {
    // Arrange
    let server = TestServer::start(&[3, 3]).await;
    let mut ws = server.connect().await;

    // Act: garbage and a premature move get no reply; the name still works
    ws.send(WsMessage::Text("not json".to_string())).await.unwrap();
    send(&mut ws, &ClientMessage::move_to(0)).await;
    join(&mut ws, "alice").await;

    // An illegal column is answered with an error and the turn is kept.
    send(&mut ws, &ClientMessage::move_to(7)).await;
    let reply = recv(&mut ws).await;

    // Assert
    assert!(matches!(reply, ServerMessage::MoveResult(ref r) if r.is_rejection()));
    send(&mut ws, &ClientMessage::move_to(0)).await;
    assert!(matches!(recv(&mut ws).await, ServerMessage::MoveResult(r) if !r.is_rejection()));
    server.stop().await;
}
