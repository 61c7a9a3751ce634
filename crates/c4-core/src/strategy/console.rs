//! Human player at a terminal.
//!
//! Generic over the reader and writer so tests can drive it with in-memory
//! buffers; [`ConsoleStrategy::stdio`] wires it to the real terminal.
//!
//! Before each prompt the board is drawn, unless the strategy was built with
//! [`ConsoleStrategy::without_board`] because the caller already renders
//! every board it receives.

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use tracing::warn;

use crate::domain::board::{render_grid, Grid};
use crate::strategy::{MoveStrategy, StrategyError};

pub const PROMPT: &str = "Enter column (0-6) to drop your disc: ";
const RETRY_NOTICE: &str = "That column is full or out of bounds. Try again.";

/// Reads one column number per line.
pub struct ConsoleStrategy<R, W> {
    input: R,
    output: W,
    show_board: bool,
    /// The previous answer was not a number; it was already reported.
    last_unparsed: bool,
}

impl ConsoleStrategy<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleStrategy<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            show_board: true,
            last_unparsed: false,
        }
    }

    /// Prompts without drawing the board first.
    pub fn without_board(mut self) -> Self {
        self.show_board = false;
        self
    }

    /// Consumes the strategy and returns the writer, so tests can inspect
    /// what was shown.
    pub fn into_output(self) -> W {
        self.output
    }

    fn show(&mut self, board: &Grid, prior_rejected: bool) -> io::Result<()> {
        if self.show_board {
            writeln!(self.output)?;
            write!(self.output, "{}", render_grid(board))?;
        }
        if prior_rejected && !self.last_unparsed {
            writeln!(self.output, "{RETRY_NOTICE}")?;
        }
        write!(self.output, "{PROMPT}")?;
        self.output.flush()
    }
}

impl<R, W> MoveStrategy for ConsoleStrategy<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn choose(&mut self, board: &Grid, prior_rejected: bool) -> Result<i32, StrategyError> {
        if let Err(e) = self.show(board, prior_rejected) {
            warn!("Failed to write prompt: {}", e);
        }
        self.last_unparsed = false;

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => return Err(StrategyError::InputClosed),
            Ok(_) => {}
            Err(e) => {
                warn!("Failed to read move: {}", e);
                return Err(StrategyError::InputClosed);
            }
        }

        let answer = line.trim();
        let parsed = answer.parse::<i32>().map_err(|_| {
            let _ = writeln!(self.output, "Invalid column value!");
            StrategyError::InvalidInput(answer.to_string())
        });
        self.last_unparsed = parsed.is_err();
        parsed
    }

    fn name(&self) -> &str {
        "console"
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
