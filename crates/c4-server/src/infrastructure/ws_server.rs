//! WebSocket server: accept loop, admission control and per-connection pump.
//!
//! Each accepted TCP connection is upgraded to a WebSocket in its own Tokio
//! task.  The task asks the shared [`Session`] to admit it; a refused
//! connection receives a Close frame carrying [`REFUSAL_REASON`] and is
//! dropped.  An admitted connection then loops:
//!
//! 1. read a text frame and decode it as a [`ClientMessage`];
//! 2. hand it to the session under the session mutex;
//! 3. encode and send every reply, in order.
//!
//! When the stream ends for any reason the session is told the connection is
//! gone, which turns an unfinished game into a forfeit.
//!
//! Shutdown is triggered by the shared `running` flag, which the accept loop
//! polls every [`ACCEPT_POLL`].

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{
        protocol::{frame::coding::CloseCode, CloseFrame},
        Error as WsError, Message as WsMessage,
    },
};
use tracing::{debug, error, info, warn};

use c4_core::protocol::{decode, encode, ClientMessage};

use crate::application::session::{ConnectionId, DisconnectOutcome, Session};
use crate::infrastructure::storage::ServerConfig;

/// Close reason sent to a connection that arrives while a game is hosted.
pub const REFUSAL_REASON: &str = "Another client is already connected.";

/// Close reason sent once the game has ended.
pub const GAME_OVER_REASON: &str = "Game over.";

/// How often the accept loop re-checks the shutdown flag.
pub const ACCEPT_POLL: Duration = Duration::from_millis(200);

/// How long a closing connection may take to answer our Close frame.
pub const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// The session as shared between connection tasks.
pub type SharedSession = Arc<Mutex<Session>>;

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds the configured address and serves connections until `running` is
/// cleared.
///
/// # Errors
///
/// Returns an error if the address is invalid or the listener cannot be bound.
/// Nothing that happens on an individual connection is an error here.
pub async fn run_server(
    config: &ServerConfig,
    session: SharedSession,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind WebSocket listener on {addr}"))?;

    info!("Connect-Four server listening on ws://{addr}");
    serve(listener, session, running).await
}

/// Runs the accept loop on an already bound listener.
pub async fn serve(
    listener: TcpListener,
    session: SharedSession,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        match timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                debug!("new connection from {peer_addr}");
                let session = Arc::clone(&session);
                tokio::spawn(async move {
                    handle_connection(stream, peer_addr, session).await;
                });
            }
            Ok(Err(e)) => {
                error!("accept error: {e}");
            }
            Err(_) => {
                // No connection within the poll window.
            }
        }
    }

    Ok(())
}

// ── Per-connection handler ────────────────────────────────────────────────────

async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, session: SharedSession) {
    match run_connection(stream, peer_addr, session).await {
        Ok(()) => debug!("connection {peer_addr} closed"),
        Err(e) => warn!("connection {peer_addr} closed with error: {e:#}"),
    }
}

async fn run_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    session: SharedSession,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    let id = ConnectionId::new();
    let admitted = session.lock().await.admit(id);
    if let Err(e) = admitted {
        info!("Refusing {peer_addr}: {e}");
        send_close(&mut ws_tx, CloseCode::Policy, REFUSAL_REASON).await;
        drain_until_closed(&mut ws_rx).await;
        return Ok(());
    }
    info!("Client connected from {peer_addr} as {id}");

    let result = async {
        while let Some(frame) = ws_rx.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(WsError::ConnectionClosed | WsError::Protocol(_)) => {
                    debug!("{id}: WebSocket closed");
                    break;
                }
                Err(e) => {
                    warn!("{id}: WebSocket error: {e}");
                    break;
                }
            };

            match frame {
                WsMessage::Text(text) => {
                    let msg: ClientMessage = match decode(&text) {
                        Ok(msg) => msg,
                        Err(e) => {
                            warn!("{id}: dropping message: {e}");
                            continue;
                        }
                    };
                    debug!("{id}: received {}", msg.type_name());

                    let (replies, game_over) = {
                        let mut guard = session.lock().await;
                        let replies = run_blocking(|| guard.handle_message(id, msg));
                        (replies, guard.is_game_over())
                    };

                    for reply in &replies {
                        let text = encode(reply)?;
                        debug!("{id}: sending {}", reply.type_name());
                        ws_tx.send(WsMessage::Text(text)).await.context("send failed")?;
                    }

                    if game_over {
                        send_close(&mut ws_tx, CloseCode::Normal, GAME_OVER_REASON).await;
                        drain_until_closed(&mut ws_rx).await;
                        break;
                    }
                }
                WsMessage::Binary(_) => {
                    warn!("{id}: ignoring binary frame");
                }
                WsMessage::Close(_) => {
                    debug!("{id}: client sent Close");
                    break;
                }
                WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => {}
            }
        }
        anyhow::Ok(())
    }
    .await;

    match session.lock().await.disconnect(id) {
        DisconnectOutcome::Forfeit => info!("Client {id} forfeited by disconnecting"),
        DisconnectOutcome::Closed => info!("Client {id} disconnected"),
        DisconnectOutcome::Ignored => {}
    }
    result
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Runs a session call that may block on terminal input without stalling the
/// other tasks of a multi-threaded runtime.
fn run_blocking<R>(f: impl FnOnce() -> R) -> R {
    if Handle::current().runtime_flavor() == RuntimeFlavor::MultiThread {
        tokio::task::block_in_place(f)
    } else {
        f()
    }
}

async fn send_close<S>(ws_tx: &mut S, code: CloseCode, reason: &'static str)
where
    S: Sink<WsMessage, Error = WsError> + Unpin,
{
    let frame = CloseFrame {
        code,
        reason: reason.into(),
    };
    if let Err(e) = ws_tx.send(WsMessage::Close(Some(frame))).await {
        debug!("failed to send Close frame: {e}");
    }
}

/// Reads and discards frames until the peer answers our Close frame or goes
/// quiet for [`CLOSE_GRACE`].
async fn drain_until_closed<S>(ws_rx: &mut S)
where
    S: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    while let Ok(Some(Ok(_))) = timeout(CLOSE_GRACE, ws_rx.next()).await {}
}
