//! Terminal output for the player, and the name prompt.

use std::io::{self, BufRead, Write};

use c4_core::render_grid;

use crate::application::PlayerAction;

/// Writes boards and notices to a terminal (or any writer).
pub struct ConsoleView<W> {
    out: W,
}

impl ConsoleView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Shows the visible part of an action.  `Send` and `Finished` print
    /// nothing.
    pub fn show(&mut self, action: &PlayerAction) -> io::Result<()> {
        match action {
            PlayerAction::Render(grid) => {
                writeln!(self.out)?;
                write!(self.out, "{}", render_grid(grid))?;
            }
            PlayerAction::Notify(text) => writeln!(self.out, "{text}")?,
            PlayerAction::Send(_) | PlayerAction::Finished(_) => return Ok(()),
        }
        self.out.flush()
    }

    /// Prints a standalone line, e.g. the server's close reason.
    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }
}

/// Asks for a player name until a non-empty one is typed.
///
/// Returns `None` if the input ends first.
pub fn prompt_name<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<Option<String>> {
    loop {
        write!(out, "Enter your name: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let name = line.trim();
        if !name.is_empty() {
            return Ok(Some(name.to_string()));
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
