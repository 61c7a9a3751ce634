//! The Connect-Four board and its win-detection algorithm.
//!
//! The grid is 6 rows by 7 columns.  Row 0 is the **top** row, row 5 the
//! bottom; a dropped disc always settles into the lowest empty row of its
//! column.  This matches the row order of the `board` array on the wire, so a
//! [`Grid`] can be serialised without any reordering.
//!
//! # Win detection
//!
//! A win can only have been completed by the disc that was placed last, so
//! [`Board::has_won`] never scans the whole grid.  It walks the four axes
//! (horizontal, vertical and both diagonals) through the last placement and
//! counts contiguous discs of the requested side:
//!
//! ```text
//!   \ | /        for each axis, step outward in both directions until the
//!  -- X --       grid edge or a foreign/empty cell stops the run; the placed
//!   / | \        disc itself counts once.
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of rows on the board.
pub const ROWS: usize = 6;

/// Number of columns on the board.
pub const COLUMNS: usize = 7;

/// Number of contiguous discs needed to win.
pub const WIN_LENGTH: usize = 4;

/// Index of the middle column.
pub const CENTER_COLUMN: i32 = 3;

/// The four scan axes as (row step, column step).
const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// One of the two parties in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The remote player connected over the network.
    Client,
    /// The host process.
    Server,
}

impl Side {
    /// Returns the opposing side.
    pub fn opponent(self) -> Side {
        match self {
            Side::Client => Side::Server,
            Side::Server => Side::Client,
        }
    }
}

/// Contents of a single board cell.
///
/// On the wire a cell is a bare integer: `0` empty, `1` client disc,
/// `2` server disc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Cell {
    #[default]
    Empty,
    Client,
    Server,
}

impl From<Side> for Cell {
    fn from(side: Side) -> Self {
        match side {
            Side::Client => Cell::Client,
            Side::Server => Cell::Server,
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => 0,
            Cell::Client => 1,
            Cell::Server => 2,
        }
    }
}

impl TryFrom<u8> for Cell {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Cell::Empty),
            1 => Ok(Cell::Client),
            2 => Ok(Cell::Server),
            other => Err(format!("invalid cell value {other}, expected 0, 1 or 2")),
        }
    }
}

impl Cell {
    /// Console glyph: `.` empty, `X` client, `O` server.
    pub fn glyph(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Client => 'X',
            Cell::Server => 'O',
        }
    }
}

/// Read-only copy of the board contents, row 0 first.
pub type Grid = [[Cell; COLUMNS]; ROWS];

/// Reasons a placement is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceError {
    /// The column index is negative or not smaller than [`COLUMNS`].
    #[error("column {0} is out of bounds (expected 0-6)")]
    ColumnOutOfRange(i32),

    /// The column's top cell is already occupied.
    #[error("column {0} is full")]
    ColumnFull(usize),
}

/// The game board: a fixed grid plus the position of the last placement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    cells: Grid,
    last_placement: Option<(usize, usize)>,
}

impl Board {
    /// Creates an empty board with no last placement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops a disc for `side` into `column`.
    ///
    /// Returns the row the disc landed in.  A rejected placement leaves the
    /// board untouched.
    ///
    /// # Errors
    ///
    /// [`PlaceError::ColumnOutOfRange`] for negative or too-large columns (no
    /// wrapping), [`PlaceError::ColumnFull`] when the top cell is occupied.
    pub fn place(&mut self, side: Side, column: i32) -> Result<usize, PlaceError> {
        let col = usize::try_from(column)
            .ok()
            .filter(|c| *c < COLUMNS)
            .ok_or(PlaceError::ColumnOutOfRange(column))?;

        let row = (0..ROWS)
            .rev()
            .find(|&r| self.cells[r][col] == Cell::Empty)
            .ok_or(PlaceError::ColumnFull(col))?;

        self.cells[row][col] = side.into();
        self.last_placement = Some((row, col));
        Ok(row)
    }

    /// Returns `true` if the last placement completed a line of
    /// [`WIN_LENGTH`] discs belonging to `side`.
    ///
    /// Always `false` before the first placement, and `false` when the last
    /// disc belongs to the other side.
    pub fn has_won(&self, side: Side) -> bool {
        let Some((row, col)) = self.last_placement else {
            return false;
        };
        let target = Cell::from(side);
        if self.cells[row][col] != target {
            return false;
        }

        AXES.iter().any(|&(dr, dc)| {
            let run = 1 + self.run_length(row, col, dr, dc, target)
                + self.run_length(row, col, -dr, -dc, target);
            run >= WIN_LENGTH
        })
    }

    /// Counts contiguous `target` cells starting one step away from
    /// (`row`, `col`) in direction (`dr`, `dc`).  Leaving the grid ends the run.
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, target: Cell) -> usize {
        let mut count = 0;
        let (mut r, mut c) = (row as isize + dr, col as isize + dc);
        while r >= 0 && r < ROWS as isize && c >= 0 && c < COLUMNS as isize {
            if self.cells[r as usize][c as usize] != target {
                break;
            }
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }

    /// Returns a copy of the current grid.
    pub fn snapshot(&self) -> Grid {
        self.cells
    }

    /// Returns `true` when every column is full.
    pub fn is_full(&self) -> bool {
        self.cells[0].iter().all(|cell| *cell != Cell::Empty)
    }

    /// Position (row, column) of the most recent disc, if any.
    pub fn last_placement(&self) -> Option<(usize, usize)> {
        self.last_placement
    }

    /// Returns the cell at (`row`, `col`), or `None` outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_grid(&self.cells))
    }
}

/// Renders a grid the way the console players show it:
/// one line per row, glyphs separated by spaces.
pub fn render_grid(grid: &Grid) -> String {
    let mut out = String::with_capacity(ROWS * (COLUMNS * 2 + 1));
    for row in grid {
        let line: Vec<String> = row.iter().map(|cell| cell.glyph().to_string()).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
