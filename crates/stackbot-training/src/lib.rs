//! Self-play training of cluster values.
//!
//! # How Training Works
//!
//! 1. **Play** - An [`ExploringClusterPolicy`](exploring_policy::ExploringClusterPolicy)
//!    plays a game, mixing random moves with greedy moves on the current table
//! 2. **Reward** - The game is scored by its move count relative to recent games
//! 3. **Credit** - The reward is blended into the clusters visited by the game,
//!    newest first, with a learning rate that shrinks at every step back
//! 4. **Decay** - The exploration chance shrinks toward its floor
//! 5. **Freeze** - After the last game the table becomes an immutable
//!    [`ClusterValuePolicy`](stackbot_policy::cluster::ClusterValuePolicy)
//!
//! # Example
//!
//! ```
//! use stackbot_engine::seeded_rng;
//! use stackbot_training::cluster_learner::{ClusterLearner, LearnerParams};
//!
//! let params = LearnerParams {
//!     training_games: 20,
//!     ..LearnerParams::default()
//! };
//! let mut rng = seeded_rng(1);
//! let trained = ClusterLearner::new(params).train(&mut rng, |_| {});
//! assert_eq!(trained.report.games, 20);
//! ```

pub mod cluster_learner;
pub mod exploring_policy;
