use serde::{Deserialize, Serialize};

use crate::ScoringError;

/// Score values for line clears.
///
/// Index corresponds to number of lines cleared simultaneously:
/// - 0 lines: 0 points
/// - 1 line: 40 points
/// - 2 lines: 100 points
/// - 3 lines: 300 points
/// - 4 lines: 1200 points
const SCORE_TABLE: [usize; 5] = [0, 40, 100, 300, 1200];

/// Converts a number of simultaneously cleared lines into points.
///
/// A piece spans at most four rows, so more than four lines can never be
/// cleared by one placement; such a count is reported as a [`ScoringError`].
///
/// # Example
///
/// ```
/// use stackbot_engine::score_for_lines;
///
/// assert_eq!(score_for_lines(1), Ok(40));
/// assert_eq!(score_for_lines(4), Ok(1200));
/// assert!(score_for_lines(5).is_err());
/// ```
pub fn score_for_lines(lines: usize) -> Result<usize, ScoringError> {
    SCORE_TABLE
        .get(lines)
        .copied()
        .ok_or(ScoringError { lines })
}

/// Game statistics tracking score, lines cleared, and piece count.
///
/// # Example
///
/// ```
/// use stackbot_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_placement(4).unwrap();
///
/// assert_eq!(stats.score(), 1200);
/// assert_eq!(stats.completed_pieces(), 1);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    score: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
    scoring_errors: usize,
}

impl GameStats {
    /// Creates a new game statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
            scoring_errors: 0,
        }
    }

    /// Returns the current score (sum of all line clear points).
    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of placements by lines cleared (`[0]` counts
    /// placements that cleared nothing, `[4]` counts four-line clears).
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Number of placements whose line count could not be scored.
    #[must_use]
    pub const fn scoring_errors(&self) -> usize {
        self.scoring_errors
    }

    /// Updates statistics after a piece is locked and returns the points it earned.
    ///
    /// The placement is always counted. An unscorable line count earns no
    /// points, is recorded in [`GameStats::scoring_errors`], and is returned
    /// as an error so the caller can report it.
    pub fn complete_placement(&mut self, cleared_lines: usize) -> Result<usize, ScoringError> {
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        match score_for_lines(cleared_lines) {
            Ok(points) => {
                self.line_cleared_counter[cleared_lines] += 1;
                self.score += points;
                Ok(points)
            }
            Err(e) => {
                self.scoring_errors += 1;
                Err(e)
            }
        }
    }
}
