//! Connect-Four client entry point.
//!
//! Connects to a server, announces a player name and plays one game with the
//! chosen strategy.
//!
//! # Usage
//!
//! ```text
//! c4-client [OPTIONS] <ENDPOINT>
//!
//! Arguments:
//!   <ENDPOINT>                           Server URL, e.g. ws://localhost:9002
//!
//! Options:
//!   --strategy <console|center|random>   How moves are chosen [default: console]
//!   --name     <NAME>                    Player name (prompted for if omitted)
//! ```

use std::io;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use c4_client::application::{GameOutcome, PlayerSession};
use c4_client::infrastructure::console::prompt_name;
use c4_client::infrastructure::{run_client, ClientConfig, ConsoleView};
use c4_core::StrategyKind;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Connect-Four WebSocket client.
#[derive(Debug, Parser)]
#[command(name = "c4-client", about = "Plays Connect-Four against a server", version)]
struct Cli {
    /// WebSocket URL of the server.
    endpoint: String,

    /// How this player chooses its moves.
    #[arg(long, default_value = "console", env = "C4_STRATEGY")]
    strategy: StrategyKind,

    /// Name announced to the server and used for its rating.
    #[arg(long, env = "C4_NAME")]
    name: Option<String>,
}

impl Cli {
    /// The explicit name, else the bot's default name.  `None` means the
    /// player has to be asked.
    fn preset_name(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| self.strategy.default_player_name().map(str::to_string))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let name = match cli.preset_name() {
        Some(name) => name,
        None => {
            let stdin = io::stdin();
            match prompt_name(&mut stdin.lock(), &mut io::stdout())
                .context("failed to read player name")?
            {
                Some(name) => name,
                None => bail!("no player name given"),
            }
        }
    };

    info!(
        "Connect-Four client starting: endpoint={}, strategy={}, name={name}",
        cli.endpoint, cli.strategy
    );

    let config = ClientConfig {
        endpoint: cli.endpoint,
    };
    // The console view draws every board, so the prompt does not repeat it.
    let session = PlayerSession::new(name, cli.strategy.build_without_board());
    let mut view = ConsoleView::stdout();

    let (opened_tx, opened_rx) = oneshot::channel();
    tokio::spawn(async move {
        if opened_rx.await.is_ok() {
            info!("connection open; waiting for the game to start");
        }
    });

    match run_client(&config, session, &mut view, opened_tx).await? {
        Some(GameOutcome::Abandoned) => warn!("left the game before it ended"),
        Some(outcome) => info!("game finished: {outcome:?}"),
        None => info!("connection ended before the game finished"),
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
