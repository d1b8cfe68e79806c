//! Learned values of board clusters and the policy that follows them.
//!
//! A [`ClusterValueTable`] maps each [`ClusterId`] to a long-run value
//! estimate. It is built and mutated only while training; once frozen it is
//! shared read-only through an [`Arc`] by every [`ClusterValuePolicy`] using it.
//!
//! The [`ClusterId::Lost`] cluster is never stored: it always reads as the
//! table's pinned `lost_value`.

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};
use stackbot_engine::{ClusterId, GameRng, Playfield};

use crate::policy::{Policy, Selection};

/// Value pinned to the lost cluster unless configured otherwise.
pub const DEFAULT_LOST_VALUE: f64 = -100.0;

/// Value estimates per board cluster.
///
/// # Example
///
/// ```
/// use stackbot_engine::ClusterId;
/// use stackbot_policy::cluster::ClusterValueTable;
///
/// let mut table = ClusterValueTable::new();
/// let id = ClusterId::Stack { free_height: 20, holes: 1 };
/// assert_eq!(table.value(id), 0.0);
///
/// table.blend(id, 10.0, 0.5);
/// assert_eq!(table.value(id), 5.0);
/// assert_eq!(table.value(ClusterId::Lost), -100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterValueTable {
    lost_value: f64,
    values: BTreeMap<ClusterId, f64>,
}

impl Default for ClusterValueTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterValueTable {
    #[must_use]
    pub fn new() -> Self {
        Self::with_lost_value(DEFAULT_LOST_VALUE)
    }

    #[must_use]
    pub fn with_lost_value(lost_value: f64) -> Self {
        Self {
            lost_value,
            values: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn lost_value(&self) -> f64 {
        self.lost_value
    }

    /// Current estimate for `id`; clusters never seen read as `0.0`.
    #[must_use]
    pub fn value(&self, id: ClusterId) -> f64 {
        match id {
            ClusterId::Lost => self.lost_value,
            ClusterId::Stack { .. } => self.values.get(&id).copied().unwrap_or(0.0),
        }
    }

    /// Moves the estimate for `id` toward `target` by `rate` and returns the
    /// new estimate: `value * (1 - rate) + target * rate`.
    ///
    /// The lost cluster is pinned; blending it only returns `lost_value`.
    pub fn blend(&mut self, id: ClusterId, target: f64, rate: f64) -> f64 {
        if id.is_lost() {
            return self.lost_value;
        }
        let value = self.values.entry(id).or_insert(0.0);
        *value = *value * (1.0 - rate) + target * rate;
        *value
    }

    /// Number of learned clusters (the pinned lost cluster is not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Learned clusters and their values, ordered by cluster id.
    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, f64)> + '_ {
        self.values.iter().map(|(id, value)| (*id, *value))
    }

    /// Clears lines on every candidate and picks the one whose cluster has
    /// the highest value. The earliest candidate wins ties.
    ///
    /// # Panics
    ///
    /// Panics if `candidates` is empty.
    #[must_use]
    pub fn select_best(&self, candidates: Vec<Playfield>) -> Selection {
        assert!(!candidates.is_empty(), "no candidate to select from");
        let mut best_value = f64::NEG_INFINITY;
        let mut best = None;
        for mut board in candidates {
            let cleared_lines = board.clear_completed_lines();
            let value = self.value(board.cluster_id());
            if best.is_none() || value > best_value {
                best_value = value;
                best = Some(Selection::new(board, cleared_lines));
            }
        }
        let Some(selection) = best else {
            unreachable!("candidates are not empty");
        };
        selection
    }
}

impl FromIterator<(ClusterId, f64)> for ClusterValueTable {
    /// Builds a table with the default lost value; entries for the lost
    /// cluster are ignored.
    fn from_iter<T: IntoIterator<Item = (ClusterId, f64)>>(iter: T) -> Self {
        let mut table = Self::new();
        table.values = iter.into_iter().filter(|(id, _)| !id.is_lost()).collect();
        table
    }
}

/// Greedy policy over a frozen [`ClusterValueTable`].
#[derive(Debug, Clone)]
pub struct ClusterValuePolicy {
    table: Arc<ClusterValueTable>,
}

impl ClusterValuePolicy {
    #[must_use]
    pub fn new(table: Arc<ClusterValueTable>) -> Self {
        Self { table }
    }

    #[must_use]
    pub fn table(&self) -> &Arc<ClusterValueTable> {
        &self.table
    }
}

impl Policy for ClusterValuePolicy {
    fn name(&self) -> &str {
        "cluster-value"
    }

    fn select(&mut self, candidates: Vec<Playfield>, _rng: &mut GameRng) -> Selection {
        self.table.select_best(candidates)
    }
}
