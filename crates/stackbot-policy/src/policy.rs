//! The policy contract: choose one candidate board per turn.
//!
//! A policy receives every resting placement found by
//! [`PlacementSearch`](stackbot_engine::PlacementSearch) for the current piece,
//! already locked into a copy of the board. It clears the completed lines of
//! the candidate(s) it evaluates, picks one, and reports how many lines that
//! candidate cleared. Candidates are moved into the policy and are consumed by
//! the call.
//!
//! # Heuristic Policies
//!
//! - [`RandomPolicy`] - Uniformly random candidate
//! - [`LeastFreeHeightPolicy`] - Maximizes [`Playfield::free_height`]
//! - [`QuadraticHeightPolicy`] - Minimizes [`Playfield::quadratic_height`]
//!
//! Both height policies break ties in favor of more cleared lines, and then in
//! favor of the earliest candidate.
//!
//! The learned policy lives in [`cluster`](crate::cluster).

use std::fmt;

use rand::Rng as _;
use stackbot_engine::{GameRng, Playfield};

/// Chooses one of the candidate boards of a turn.
pub trait Policy: fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Selects one candidate, clearing its completed lines.
    ///
    /// # Panics
    ///
    /// Panics if `candidates` is empty; callers end the game instead of
    /// asking for a choice among no placements.
    fn select(&mut self, candidates: Vec<Playfield>, rng: &mut GameRng) -> Selection;
}

/// The candidate chosen by a [`Policy`], with its lines already cleared.
#[derive(Debug, Clone)]
pub struct Selection {
    board: Playfield,
    cleared_lines: usize,
}

impl Selection {
    #[must_use]
    pub fn new(board: Playfield, cleared_lines: usize) -> Self {
        Self {
            board,
            cleared_lines,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Playfield {
        &self.board
    }

    /// Number of lines the chosen placement completed.
    #[must_use]
    pub fn cleared_lines(&self) -> usize {
        self.cleared_lines
    }

    #[must_use]
    pub fn into_board(self) -> Playfield {
        self.board
    }
}

/// Picks a uniformly random candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn select(&mut self, candidates: Vec<Playfield>, rng: &mut GameRng) -> Selection {
        select_random(candidates, rng)
    }
}

/// Uniformly picks one candidate and clears its lines.
///
/// # Panics
///
/// Panics if `candidates` is empty.
#[must_use]
pub fn select_random(mut candidates: Vec<Playfield>, rng: &mut GameRng) -> Selection {
    assert!(!candidates.is_empty(), "no candidate to select from");
    let index = rng.random_range(..candidates.len());
    let mut board = candidates.swap_remove(index);
    let cleared_lines = board.clear_completed_lines();
    Selection::new(board, cleared_lines)
}

/// Keeps the stack as low as possible.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastFreeHeightPolicy;

impl Policy for LeastFreeHeightPolicy {
    fn name(&self) -> &str {
        "least-height"
    }

    fn select(&mut self, candidates: Vec<Playfield>, _rng: &mut GameRng) -> Selection {
        select_max_by_key(candidates, Playfield::free_height)
    }
}

/// Penalizes cells near the top super-linearly.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadraticHeightPolicy;

impl Policy for QuadraticHeightPolicy {
    fn name(&self) -> &str {
        "quadratic"
    }

    fn select(&mut self, candidates: Vec<Playfield>, _rng: &mut GameRng) -> Selection {
        select_max_by_key(candidates, |board| {
            std::cmp::Reverse(board.quadratic_height())
        })
    }
}

/// Clears lines on every candidate and keeps the one with the greatest
/// `(key, cleared_lines)`; the earliest candidate wins exact ties.
fn select_max_by_key<K, F>(candidates: Vec<Playfield>, mut key: F) -> Selection
where
    K: Ord,
    F: FnMut(&Playfield) -> K,
{
    assert!(!candidates.is_empty(), "no candidate to select from");
    let mut best: Option<((K, usize), Selection)> = None;
    for mut board in candidates {
        let cleared_lines = board.clear_completed_lines();
        let rank = (key(&board), cleared_lines);
        if best.as_ref().is_none_or(|(best_rank, _)| rank > *best_rank) {
            best = Some((rank, Selection::new(board, cleared_lines)));
        }
    }
    let Some((_, selection)) = best else {
        unreachable!("candidates are not empty");
    };
    selection
}
