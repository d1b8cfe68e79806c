//! Exhaustive enumeration of the resting placements reachable by a piece.
//!
//! The search explores the graph whose nodes are piece states (anchor and
//! rotation) and whose edges are the four player actions:
//!
//! - move left
//! - move right
//! - soft drop one row
//! - rotate by −1 step
//!
//! It is a plain breadth-first traversal with a visited set keyed by state,
//! so each state is expanded at most once and the traversal ends when the
//! frontier empties (the state space is bounded by width × height × rotations).
//!
//! A state is *terminal* when the piece fits where it is but cannot drop one
//! more row. Terminal states are recorded and then **still expanded**: a
//! resting piece may slide or spin into positions it could not reach otherwise,
//! because there is no lock delay in this simplified model.

use std::collections::HashSet;

use crate::core::{piece::Piece, playfield::Playfield};

/// Breadth-first placement search over one board.
///
/// The board is only read; every result is a freshly allocated copy.
///
/// # Example
///
/// ```
/// use stackbot_engine::{Piece, PieceKind, PlacementSearch, Playfield};
///
/// let board = Playfield::standard();
/// let piece = Piece::spawn(PieceKind::O, board.width());
/// let candidates = PlacementSearch::new(&board).search(piece);
///
/// // The O piece can rest in any of the 9 column pairs.
/// assert_eq!(candidates.len(), 9);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PlacementSearch<'a> {
    board: &'a Playfield,
}

impl<'a> PlacementSearch<'a> {
    #[must_use]
    pub fn new(board: &'a Playfield) -> Self {
        Self { board }
    }

    /// Returns one candidate board per reachable terminal state: a copy of the
    /// board with the piece locked in that state.
    ///
    /// An empty result means the piece has no legal resting place.
    #[must_use]
    pub fn search(&self, spawn: Piece) -> Vec<Playfield> {
        self.terminal_pieces(spawn)
            .into_iter()
            .map(|piece| {
                let mut candidate = self.board.clone();
                let placed = candidate.place(piece);
                debug_assert!(placed, "terminal piece must lie inside the board");
                candidate
            })
            .collect()
    }

    /// Returns every reachable terminal piece state, in discovery order.
    #[must_use]
    pub fn terminal_pieces(&self, spawn: Piece) -> Vec<Piece> {
        let mut visited = HashSet::from([spawn.state_key()]);
        let mut frontier = vec![spawn];
        let mut terminals = vec![];

        while !frontier.is_empty() {
            let mut next = vec![];
            for piece in &frontier {
                if self.is_terminal(piece) {
                    terminals.push(*piece);
                }
                for neighbour in self.neighbours(piece) {
                    if visited.insert(neighbour.state_key()) {
                        next.push(neighbour);
                    }
                }
            }
            frontier = next;
        }

        terminals
    }

    fn is_terminal(&self, piece: &Piece) -> bool {
        piece.fits(self.board) && piece.moved_by(self.board, 0, 1).is_none()
    }

    fn neighbours(&self, piece: &Piece) -> impl Iterator<Item = Piece> + use<> {
        let board = self.board;
        [
            piece.moved_by(board, -1, 0),
            piece.moved_by(board, 1, 0),
            piece.moved_by(board, 0, 1),
            piece.rotated_by(board, -1),
        ]
        .into_iter()
        .flatten()
    }
}
