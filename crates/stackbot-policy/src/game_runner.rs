//! Game and series orchestration.
//!
//! One turn of a game:
//!
//! 1. Spawn a piece (fixed or random shape, see [`PieceSelection`])
//! 2. Enumerate its resting placements with [`PlacementSearch`]
//! 3. Stop if there is none; otherwise let the [`Policy`] pick one
//! 4. Adopt the chosen board, score its cleared lines, and stop if it is lost
//!
//! A series plays several games on one random stream seeded once, so its
//! averages depend only on `(seed, piece selection, game count, policy)`.

use stackbot_engine::{
    GameRng, GameStats, Piece, PieceSelection, PlacementSearch, Playfield, STANDARD_VISIBLE_HEIGHT,
    STANDARD_WIDTH, seeded_rng,
};
use stackbot_stats::descriptive::DescriptiveStats;

use crate::policy::Policy;

/// Why a game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameEnd {
    /// The spawned piece had no resting placement.
    NoPlacement,
    /// The adopted board reached the hidden rows.
    Lost,
    /// The runner's move limit was reached.
    MoveLimit,
}

/// Outcome of one game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// Number of placements made.
    pub moves: usize,
    /// Points earned from cleared lines.
    pub points: usize,
    pub stats: GameStats,
    pub end: GameEnd,
    /// Boards after every placement, starting with the empty board.
    pub trace: Vec<Playfield>,
}

impl GameRecord {
    /// The board the game ended on.
    #[must_use]
    pub fn final_board(&self) -> Option<&Playfield> {
        self.trace.last()
    }
}

/// Averages over a series of games.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub games: usize,
    pub mean_moves: f64,
    pub mean_points: f64,
    /// Spread of moves per game; `None` for an empty series.
    pub moves: Option<DescriptiveStats>,
}

/// Plays games on boards of a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct GameRunner {
    width: usize,
    visible_height: usize,
    move_limit: Option<usize>,
}

impl Default for GameRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRunner {
    /// Runner for the standard 10×20 board without a move limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: STANDARD_WIDTH,
            visible_height: STANDARD_VISIBLE_HEIGHT,
            move_limit: None,
        }
    }

    #[must_use]
    pub fn with_board_size(self, width: usize, visible_height: usize) -> Self {
        Self {
            width,
            visible_height,
            ..self
        }
    }

    /// Stops every game after `move_limit` placements.
    #[must_use]
    pub fn with_move_limit(self, move_limit: Option<usize>) -> Self {
        Self { move_limit, ..self }
    }

    /// Plays one game from an empty board.
    pub fn play(
        &self,
        selection: PieceSelection,
        policy: &mut dyn Policy,
        rng: &mut GameRng,
    ) -> GameRecord {
        let mut board = Playfield::new(self.width, self.visible_height);
        let mut stats = GameStats::new();
        let mut points = 0;
        let mut trace = vec![board.clone()];

        let end = loop {
            if self.move_limit.is_some_and(|limit| stats.completed_pieces() >= limit) {
                break GameEnd::MoveLimit;
            }

            let piece = Piece::spawn(selection.next_kind(rng), board.width());
            let candidates = PlacementSearch::new(&board).search(piece);
            if candidates.is_empty() {
                break GameEnd::NoPlacement;
            }

            let chosen = policy.select(candidates, rng);
            match stats.complete_placement(chosen.cleared_lines()) {
                Ok(earned) => points += earned,
                Err(e) => tracing::error!(policy = policy.name(), "{e}"),
            }
            board = chosen.into_board();
            trace.push(board.clone());

            if board.is_lost() {
                break GameEnd::Lost;
            }
        };

        tracing::trace!(moves = stats.completed_pieces(), points, ?end, "game finished");
        GameRecord {
            moves: stats.completed_pieces(),
            points,
            stats,
            end,
            trace,
        }
    }

    /// Seeds a fresh stream and plays `game_count` games in sequence.
    #[expect(clippy::cast_precision_loss)]
    pub fn play_series(
        &self,
        seed: i64,
        selection: PieceSelection,
        game_count: usize,
        policy: &mut dyn Policy,
    ) -> SeriesSummary {
        let mut rng = seeded_rng(seed);
        let mut moves = Vec::with_capacity(game_count);
        let mut total_points = 0;
        for _ in 0..game_count {
            let record = self.play(selection, policy, &mut rng);
            moves.push(record.moves as f64);
            total_points += record.points;
        }

        let moves = DescriptiveStats::new(moves);
        let summary = SeriesSummary {
            games: game_count,
            mean_moves: moves.as_ref().map_or(0.0, |m| m.mean),
            mean_points: if game_count == 0 {
                0.0
            } else {
                total_points as f64 / game_count as f64
            },
            moves,
        };
        tracing::debug!(
            policy = policy.name(),
            seed,
            %selection,
            games = summary.games,
            mean_moves = summary.mean_moves,
            mean_points = summary.mean_points,
            moves = summary.moves.as_ref().map(tracing::field::display),
            "series finished"
        );
        summary
    }
}
