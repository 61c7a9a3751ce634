//! WebSocket connection to the game server.
//!
//! [`run_client`] connects, signals that the connection is open, announces
//! the player's name and then feeds every decoded server message to the
//! [`PlayerSession`], carrying out the returned actions in order.  The run
//! ends when the game finishes, the server closes the connection (for
//! example because another player is already connected), or the stream
//! breaks.

use std::io::Write;

use anyhow::Context;
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::oneshot;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, info, warn};

use c4_core::protocol::{decode, encode, ClientMessage, ServerMessage};

use crate::application::{GameOutcome, PlayerAction, PlayerSession};
use crate::infrastructure::console::ConsoleView;

/// Where to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket URL of the server, e.g. `ws://localhost:9002`.
    pub endpoint: String,
}

/// Plays one game against the server at `config.endpoint`.
///
/// `opened` fires once the WebSocket handshake has completed.  Returns the
/// game's outcome, or `None` if the connection ended before the game did.
///
/// # Errors
///
/// Returns an error if the connection cannot be established, a message
/// cannot be sent, or the console cannot be written.
pub async fn run_client<W: Write>(
    config: &ClientConfig,
    mut session: PlayerSession,
    view: &mut ConsoleView<W>,
    opened: oneshot::Sender<()>,
) -> anyhow::Result<Option<GameOutcome>> {
    let (ws_stream, _response) = connect_async(config.endpoint.as_str())
        .await
        .with_context(|| format!("failed to connect to {}", config.endpoint))?;
    info!("Connected to {}", config.endpoint);
    // Nobody may be waiting; that is fine.
    let _ = opened.send(());

    let (mut ws_tx, mut ws_rx) = ws_stream.split();
    send(&mut ws_tx, &session.on_open()).await?;

    let mut outcome = None;
    while let Some(frame) = ws_rx.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(WsError::ConnectionClosed | WsError::Protocol(_)) => {
                debug!("WebSocket closed");
                break;
            }
            Err(e) => {
                warn!("WebSocket error: {e}");
                break;
            }
        };

        match frame {
            WsMessage::Text(text) => {
                let msg: ServerMessage = match decode(&text) {
                    Ok(msg) => msg,
                    Err(e) => {
                        warn!("dropping message: {e}");
                        continue;
                    }
                };
                debug!("received {}", msg.type_name());

                let actions = run_blocking(|| session.handle(msg));
                for action in &actions {
                    match action {
                        PlayerAction::Send(reply) => send(&mut ws_tx, reply).await?,
                        PlayerAction::Finished(result) => outcome = Some(*result),
                        PlayerAction::Render(_) | PlayerAction::Notify(_) => {}
                    }
                    view.show(action).context("failed to write to console")?;
                }

                if outcome.is_some() {
                    if let Err(e) = ws_tx.send(WsMessage::Close(None)).await {
                        debug!("failed to send Close frame: {e}");
                    }
                    break;
                }
            }
            WsMessage::Close(frame) => {
                let reason = frame
                    .map(|f| f.reason.to_string())
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| "no reason given".to_string());
                info!("Server closed the connection: {reason}");
                view.notice(&format!("Server closed the connection: {reason}"))
                    .context("failed to write to console")?;
                break;
            }
            WsMessage::Binary(_) => warn!("ignoring binary frame"),
            WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => {}
        }
    }

    Ok(outcome)
}

async fn send<S>(ws_tx: &mut S, msg: &ClientMessage) -> anyhow::Result<()>
where
    S: Sink<WsMessage, Error = WsError> + Unpin,
{
    let text = encode(msg)?;
    debug!("sending {}", msg.type_name());
    ws_tx.send(WsMessage::Text(text)).await.context("send failed")
}

/// Runs a call that may block on terminal input without stalling the other
/// tasks of a multi-threaded runtime.
fn run_blocking<R>(f: impl FnOnce() -> R) -> R {
    if Handle::current().runtime_flavor() == RuntimeFlavor::MultiThread {
        tokio::task::block_in_place(f)
    } else {
        f()
    }
}
