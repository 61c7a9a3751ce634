//! Domain entities: pure game rules with no I/O.

/// The board, placement and win detection.
///
/// See [`board::Board`] for the main type.
pub mod board;
