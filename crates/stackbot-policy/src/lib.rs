//! Placement policies and the game loop that drives them.
//!
//! # Architecture
//!
//! ```text
//! GameRunner (play one game / a seeded series)
//!     ↓ each turn
//! PlacementSearch (every reachable resting placement)
//!     ↓ candidate boards
//! Policy (pick one candidate, report cleared lines)
//! ```
//!
//! # Modules
//!
//! - [`policy`] - The [`Policy`](policy::Policy) contract and the heuristic policies
//! - [`cluster`] - Cluster value table and the frozen cluster-value policy
//! - [`registry`] - Name lookup for policies referenced by series records
//! - [`game_runner`] - Game and series orchestration
//!
//! # Example
//!
//! ```
//! use stackbot_engine::{PieceKind, PieceSelection};
//! use stackbot_policy::{game_runner::GameRunner, policy::RandomPolicy};
//!
//! let runner = GameRunner::new();
//! let summary = runner.play_series(1, PieceSelection::Fixed(PieceKind::I), 3, &mut RandomPolicy);
//! assert_eq!(summary.games, 3);
//! ```

pub mod cluster;
pub mod game_runner;
pub mod policy;
pub mod registry;
