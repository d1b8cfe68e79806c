//! Self-play learner for cluster values.
//!
//! # Reward
//!
//! Each finished game is worth
//!
//! ```text
//! reward = moves - mean(moves of the previous `reward_window` games) / reward_baseline_divisor
//! ```
//!
//! so a game only earns a clearly positive reward when it lasts noticeably
//! longer than recent games did. Before any game has finished the baseline is
//! zero.
//!
//! # Credit Assignment
//!
//! The reward is spread over the game's trace from the final board back to the
//! empty one. Each visited cluster is blended toward the running value, and its
//! new estimate becomes the value carried to the previous board:
//!
//! ```text
//! value = reward, rate = learning_rate
//! for board in trace (newest → oldest), skipping lost boards:
//!     value = table[board] * (1 - rate) + value * rate
//!     table[board] = value
//!     rate *= credit_decay
//! ```
//!
//! Influence on early placements therefore decays geometrically with their
//! distance from the end of the game.

use std::sync::Arc;

use stackbot_engine::{ClusterId, GameRng, PieceSelection};
use stackbot_policy::{
    cluster::{ClusterValuePolicy, ClusterValueTable, DEFAULT_LOST_VALUE},
    game_runner::GameRunner,
};
use stackbot_stats::rolling::RollingMean;

use crate::exploring_policy::ExploringClusterPolicy;

/// Tunable training hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnerParams {
    /// Number of self-play games.
    pub training_games: usize,
    pub initial_explore_chance: f64,
    /// Factor applied to the exploration chance after every game.
    pub explore_decay: f64,
    /// Lower bound of the exploration chance.
    pub explore_floor: f64,
    /// Blend rate for the newest board of a game.
    pub learning_rate: f64,
    /// Factor applied to the blend rate at every step back through a game.
    pub credit_decay: f64,
    /// Pinned value of the lost cluster.
    pub lost_value: f64,
    /// Number of previous games in the reward baseline.
    pub reward_window: usize,
    pub reward_baseline_divisor: f64,
    /// Games between progress snapshots; `0` disables them.
    pub progress_interval: usize,
    pub piece_selection: PieceSelection,
    /// Optional cap on placements per training game.
    pub move_limit: Option<usize>,
}

impl Default for LearnerParams {
    fn default() -> Self {
        Self {
            training_games: 10_000,
            initial_explore_chance: 0.75,
            explore_decay: 0.999,
            explore_floor: 0.1,
            learning_rate: 0.05,
            credit_decay: 0.05,
            lost_value: DEFAULT_LOST_VALUE,
            reward_window: 10,
            reward_baseline_divisor: 1.5,
            progress_interval: 10,
            piece_selection: PieceSelection::Random,
            move_limit: None,
        }
    }
}

/// Training state reported every `progress_interval` games.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    /// Number of games finished so far.
    pub game: usize,
    /// Mean moves over the games since the previous snapshot.
    pub recent_mean_moves: f64,
    pub explore_chance: f64,
    /// Number of clusters with a learned value.
    pub clusters: usize,
}

/// Summary of a finished training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub games: usize,
    /// Mean moves over every training game.
    pub mean_moves: f64,
    pub final_explore_chance: f64,
    pub clusters: usize,
}

/// Result of training: the frozen policy and how training went.
#[derive(Debug, Clone)]
pub struct TrainedClusters {
    pub policy: ClusterValuePolicy,
    pub report: TrainingReport,
}

impl TrainedClusters {
    #[must_use]
    pub fn table(&self) -> &Arc<ClusterValueTable> {
        self.policy.table()
    }
}

#[derive(Debug, Clone)]
pub struct ClusterLearner {
    params: LearnerParams,
    runner: GameRunner,
}

impl ClusterLearner {
    #[must_use]
    pub fn new(params: LearnerParams) -> Self {
        let runner = GameRunner::new().with_move_limit(params.move_limit);
        Self { params, runner }
    }

    #[must_use]
    pub fn params(&self) -> &LearnerParams {
        &self.params
    }

    /// Runs all training games on `rng` and freezes the learned table.
    ///
    /// `on_progress` is called with a snapshot after every
    /// `progress_interval` games.
    #[expect(clippy::cast_precision_loss)]
    pub fn train<F>(&self, rng: &mut GameRng, mut on_progress: F) -> TrainedClusters
    where
        F: FnMut(&ProgressSnapshot),
    {
        let params = &self.params;
        let table = ClusterValueTable::with_lost_value(params.lost_value);
        let mut policy = ExploringClusterPolicy::new(table, params.initial_explore_chance);
        let mut baseline = RollingMean::new(params.reward_window.max(1));
        let mut recent = RollingMean::new(params.progress_interval.max(1));
        let mut total_moves = 0;

        tracing::info!(
            games = params.training_games,
            lost_value = policy.table().lost_value(),
            "cluster training started"
        );
        for game in 1..=params.training_games {
            let record = self
                .runner
                .play(params.piece_selection, &mut policy, rng);
            let moves = record.moves as f64;
            total_moves += record.moves;

            policy.decay_exploration(params.explore_decay, params.explore_floor);
            let reward = self.reward(moves, &baseline);
            baseline.push(moves);
            recent.push(moves);

            self.assign_credit(
                policy.table_mut(),
                record.trace.iter().map(|board| board.cluster_id()),
                reward,
            );

            if params.progress_interval > 0 && game % params.progress_interval == 0 {
                let snapshot = ProgressSnapshot {
                    game,
                    recent_mean_moves: recent.mean_or_zero(),
                    explore_chance: policy.explore_chance(),
                    clusters: policy.table().len(),
                };
                tracing::info!(
                    game,
                    recent_mean_moves = snapshot.recent_mean_moves,
                    explore_chance = snapshot.explore_chance,
                    clusters = snapshot.clusters,
                    "training progress"
                );
                on_progress(&snapshot);
            }
        }

        let report = TrainingReport {
            games: params.training_games,
            mean_moves: if params.training_games == 0 {
                0.0
            } else {
                total_moves as f64 / params.training_games as f64
            },
            final_explore_chance: policy.explore_chance(),
            clusters: policy.table().len(),
        };
        tracing::info!(
            games = report.games,
            mean_moves = report.mean_moves,
            clusters = report.clusters,
            "cluster training finished"
        );

        TrainedClusters {
            policy: ClusterValuePolicy::new(Arc::new(policy.into_table())),
            report,
        }
    }

    /// Reward of a game lasting `moves` placements against the recent baseline.
    #[must_use]
    pub fn reward(&self, moves: f64, baseline: &RollingMean) -> f64 {
        moves - baseline.mean_or_zero() / self.params.reward_baseline_divisor
    }

    /// Blends `reward` into the clusters of a game trace given oldest first.
    pub fn assign_credit<I>(&self, table: &mut ClusterValueTable, trace: I, reward: f64)
    where
        I: IntoIterator<Item = ClusterId>,
        I::IntoIter: DoubleEndedIterator,
    {
        let mut value = reward;
        let mut rate = self.params.learning_rate;
        for id in trace.into_iter().rev().filter(|id| !id.is_lost()) {
            value = table.blend(id, value, rate);
            rate *= self.params.credit_decay;
        }
    }
}

#[cfg(test)]
mod tests {
    use stackbot_engine::{PieceKind, seeded_rng};
    use stackbot_policy::policy::Policy as _;

    use super::*;

    fn stack(free_height: usize, holes: usize) -> ClusterId {
        ClusterId::Stack { free_height, holes }
    }

    fn small_params(training_games: usize) -> LearnerParams {
        LearnerParams {
            training_games,
            progress_interval: 5,
            ..LearnerParams::default()
        }
    }

    #[test]
    fn test_default_params() {
        let params = LearnerParams::default();
        assert_eq!(params.training_games, 10_000);
        assert_eq!(params.initial_explore_chance, 0.75);
        assert_eq!(params.explore_decay, 0.999);
        assert_eq!(params.explore_floor, 0.1);
        assert_eq!(params.learning_rate, 0.05);
        assert_eq!(params.credit_decay, 0.05);
        assert_eq!(params.lost_value, -100.0);
        assert_eq!(params.reward_window, 10);
        assert_eq!(params.reward_baseline_divisor, 1.5);
        assert_eq!(params.piece_selection, PieceSelection::Random);
    }

    #[test]
    fn test_reward_against_baseline() {
        let learner = ClusterLearner::new(LearnerParams::default());
        let mut baseline = RollingMean::new(10);
        assert_eq!(learner.reward(30.0, &baseline), 30.0);
        baseline.push(30.0);
        baseline.push(60.0);
        assert_eq!(learner.reward(30.0, &baseline), 0.0);
    }

    #[test]
    fn test_credit_flows_backward_with_decay() {
        let learner = ClusterLearner::new(LearnerParams {
            learning_rate: 0.5,
            credit_decay: 0.5,
            ..LearnerParams::default()
        });
        let mut table = ClusterValueTable::new();
        let trace = [stack(24, 0), stack(23, 0), stack(22, 1), ClusterId::Lost];
        learner.assign_credit(&mut table, trace, 10.0);

        // Newest live board first: 0 * 0.5 + 10 * 0.5
        assert_eq!(table.value(stack(22, 1)), 5.0);
        // Then 0 * 0.75 + 5 * 0.25
        assert_eq!(table.value(stack(23, 0)), 1.25);
        // Then 0 * 0.875 + 1.25 * 0.125
        assert_eq!(table.value(stack(24, 0)), 0.156_25);
        assert_eq!(table.value(ClusterId::Lost), -100.0);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_repeated_cluster_is_updated_twice() {
        let learner = ClusterLearner::new(LearnerParams {
            learning_rate: 0.5,
            credit_decay: 1.0,
            ..LearnerParams::default()
        });
        let mut table = ClusterValueTable::new();
        learner.assign_credit(&mut table, [stack(20, 0), stack(20, 0)], 8.0);
        // 4.0 after the newest step, then 4.0 * 0.5 + 4.0 * 0.5
        assert_eq!(table.value(stack(20, 0)), 4.0);
    }

    #[test]
    fn test_training_reports_progress() {
        let learner = ClusterLearner::new(small_params(20));
        let mut rng = seeded_rng(7);
        let mut snapshots = vec![];
        let trained = learner.train(&mut rng, |snapshot| snapshots.push(snapshot.clone()));

        assert_eq!(
            snapshots.iter().map(|s| s.game).collect::<Vec<_>>(),
            [5, 10, 15, 20]
        );
        assert!(snapshots.iter().all(|s| s.recent_mean_moves > 0.0));
        assert!(
            snapshots
                .windows(2)
                .all(|w| w[1].explore_chance < w[0].explore_chance)
        );
        assert_eq!(trained.report.games, 20);
        assert!(trained.report.clusters > 0);
        assert_eq!(trained.report.clusters, trained.table().len());
        assert!(trained.report.final_explore_chance < 0.75);
    }

    #[test]
    fn test_training_is_reproducible() {
        let learner = ClusterLearner::new(small_params(15));
        let first = learner.train(&mut seeded_rng(3), |_| {});
        let second = learner.train(&mut seeded_rng(3), |_| {});
        assert_eq!(first.table(), second.table());
        assert_eq!(first.report, second.report);
    }

    #[test]
    fn test_trained_policy_is_frozen() {
        let learner = ClusterLearner::new(LearnerParams {
            piece_selection: PieceSelection::Fixed(PieceKind::O),
            ..small_params(10)
        });
        let trained = learner.train(&mut seeded_rng(5), |_| {});
        let before = Arc::clone(trained.table());
        let mut policy = trained.policy;
        let summary = GameRunner::new()
            .with_move_limit(Some(30))
            .play_series(1, PieceSelection::Random, 3, &mut policy);
        assert_eq!(summary.games, 3);
        assert_eq!(policy.table(), &before);
        assert_eq!(policy.name(), "cluster-value");
    }

    #[test]
    fn test_zero_games() {
        let learner = ClusterLearner::new(small_params(0));
        let mut called = false;
        let trained = learner.train(&mut seeded_rng(1), |_| called = true);
        assert!(!called);
        assert_eq!(trained.report.mean_moves, 0.0);
        assert!(trained.table().is_empty());
    }
}
