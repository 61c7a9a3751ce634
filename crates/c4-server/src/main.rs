//! Connect-Four server entry point.
//!
//! Hosts one game at a time over WebSocket.  The server always moves first;
//! its moves come from the configured strategy (a human at this terminal, or
//! one of the bots).
//!
//! # Usage
//!
//! ```text
//! c4-server [OPTIONS]
//!
//! Options:
//!   --config   <PATH>                    Config file [default: connect-four.toml]
//!   --strategy <console|center|random>   Overrides [server] strategy
//!   --port     <PORT>                    Overrides [network] port
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  ├─ load ServerConfig (TOML, CLI overrides)
//!  ├─ Session::new(ledger, strategy)      -- shared as Arc<Mutex<_>>
//!  ├─ admission watcher                    -- one-shot per admission cycle
//!  └─ run_server()                         -- accept loop until Ctrl+C
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use c4_core::StrategyKind;
use c4_server::application::{InMemoryLedger, RatingLedger, Session};
use c4_server::infrastructure::storage::{load_config, FileLedger, ServerConfig};
use c4_server::infrastructure::{run_server, SharedSession};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Connect-Four WebSocket game server.
#[derive(Debug, Parser)]
#[command(name = "c4-server", about = "Hosts a Connect-Four game over WebSocket", version)]
struct Cli {
    /// Path to the TOML config file.  A missing file means defaults.
    #[arg(long, default_value = "connect-four.toml", env = "C4_CONFIG")]
    config: PathBuf,

    /// How the server chooses its moves.
    #[arg(long, env = "C4_STRATEGY")]
    strategy: Option<StrategyKind>,

    /// TCP port to listen on.
    #[arg(long, env = "C4_PORT")]
    port: Option<u16>,
}

impl Cli {
    /// Loads the config file and applies the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let mut config = load_config(&self.config)
            .with_context(|| format!("failed to load config from {}", self.config.display()))?;
        if let Some(strategy) = self.strategy {
            config.server.strategy = strategy;
        }
        if let Some(port) = self.port {
            config.network.port = port;
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_server_config()?;

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    info!(
        "Connect-Four server starting: strategy={}, port={}",
        config.server.strategy, config.network.port
    );

    let ledger: Arc<dyn RatingLedger> = match &config.ledger.path {
        Some(path) => {
            let ledger = FileLedger::open(path)
                .with_context(|| format!("failed to open rating ledger {}", path.display()))?;
            info!("ratings stored in {}", ledger.path().display());
            Arc::new(ledger)
        }
        None => {
            info!("ratings kept in memory only");
            Arc::new(InMemoryLedger::new())
        }
    };

    let session: SharedSession = Arc::new(Mutex::new(Session::new(
        ledger,
        config.server.strategy.build(),
    )));

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    let watcher = tokio::spawn(watch_admissions(Arc::clone(&session)));

    let result = run_server(&config, session, running).await;
    watcher.abort();
    result?;

    info!("Connect-Four server stopped");
    Ok(())
}

/// Waits for each admission in turn, arming a fresh signal per cycle.
async fn watch_admissions(session: SharedSession) {
    loop {
        let admitted = session.lock().await.arm_admission_signal();
        match admitted.await {
            Ok(id) => info!("game starting with client {id}; waiting for its name"),
            // The session was dropped: the server is going away.
            Err(_) => break,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
