//! Core data structures: piece shapes, pieces, and the playfield grid.
//!
//! - [`PieceKind`] - The seven shapes and their rotation tables
//! - [`Piece`] - A shape at a rotation and anchor position
//! - [`Playfield`] - The grid of locked cells, including the hidden spawn rows
//! - [`ClusterId`] - Coarse board classification used by learned policies

pub use self::{cluster_id::*, piece::*, playfield::*};

pub(crate) mod cluster_id;
pub(crate) mod piece;
pub(crate) mod playfield;

/// Columns of the standard board.
pub const STANDARD_WIDTH: usize = 10;
/// Visible rows of the standard board.
pub const STANDARD_VISIBLE_HEIGHT: usize = 20;
/// Rows above the visible area reserved for spawning pieces.
pub const HIDDEN_ROWS: usize = 4;
