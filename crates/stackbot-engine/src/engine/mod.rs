//! Game rules layered on the core data structures.
//!
//! - [`PlacementSearch`] - Breadth-first enumeration of resting placements
//! - [`GameStats`] - Score and line-clear bookkeeping
//! - [`PieceSelection`] / [`GameRng`] - Seeded choice of the next shape

pub use self::{game_stats::*, piece_source::*, placement_search::*};

mod game_stats;
mod piece_source;
mod placement_search;
