use rand::Rng as _;
use stackbot_engine::{GameRng, Playfield};
use stackbot_policy::{
    cluster::ClusterValueTable,
    policy::{Policy, Selection, select_random},
};

/// Cluster-value policy that explores while it learns.
///
/// With probability `explore_chance` a uniformly random candidate is played;
/// otherwise the candidate whose cluster has the highest value in the table.
/// The learner owns this policy and mutates its table between games.
#[derive(Debug, Clone)]
pub struct ExploringClusterPolicy {
    table: ClusterValueTable,
    explore_chance: f64,
}

impl ExploringClusterPolicy {
    #[must_use]
    pub fn new(table: ClusterValueTable, explore_chance: f64) -> Self {
        Self {
            table,
            explore_chance,
        }
    }

    #[must_use]
    pub fn table(&self) -> &ClusterValueTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut ClusterValueTable {
        &mut self.table
    }

    #[must_use]
    pub fn into_table(self) -> ClusterValueTable {
        self.table
    }

    #[must_use]
    pub fn explore_chance(&self) -> f64 {
        self.explore_chance
    }

    /// Multiplies the exploration chance by `decay` without going below `floor`.
    ///
    /// A chance already at or below the floor is left unchanged.
    pub fn decay_exploration(&mut self, decay: f64, floor: f64) {
        if self.explore_chance > floor {
            self.explore_chance = (self.explore_chance * decay).max(floor);
        }
    }
}

impl Policy for ExploringClusterPolicy {
    fn name(&self) -> &str {
        "exploring-cluster-value"
    }

    fn select(&mut self, candidates: Vec<Playfield>, rng: &mut GameRng) -> Selection {
        if rng.random::<f64>() < self.explore_chance {
            select_random(candidates, rng)
        } else {
            self.table.select_best(candidates)
        }
    }
}

#[cfg(test)]
mod tests {
    use stackbot_engine::{Piece, PieceKind, PlacementSearch, seeded_rng};

    use super::*;

    fn candidates() -> Vec<Playfield> {
        let board = Playfield::from_ascii(
            r"
            #.#.#.#...
            ",
        );
        PlacementSearch::new(&board).search(Piece::spawn(PieceKind::J, board.width()))
    }

    #[test]
    fn test_never_exploring_matches_greedy_choice() {
        let table: ClusterValueTable = candidates()
            .iter()
            .enumerate()
            .map(|(i, board)| (board.cluster_id(), f64::from(u32::try_from(i).unwrap())))
            .collect();
        let expected = table.select_best(candidates());

        let mut policy = ExploringClusterPolicy::new(table, 0.0);
        let mut rng = seeded_rng(1);
        for _ in 0..10 {
            let selection = policy.select(candidates(), &mut rng);
            assert_eq!(selection.board(), expected.board());
        }
    }

    #[test]
    fn test_always_exploring_varies_choice() {
        let mut policy = ExploringClusterPolicy::new(ClusterValueTable::new(), 1.0);
        let mut rng = seeded_rng(1);
        let first = policy.select(candidates(), &mut rng).into_board();
        let varied = (0..20).any(|_| policy.select(candidates(), &mut rng).into_board() != first);
        assert!(varied);
    }

    #[test]
    fn test_decay_stops_at_floor() {
        let mut policy = ExploringClusterPolicy::new(ClusterValueTable::new(), 0.75);
        policy.decay_exploration(0.5, 0.1);
        assert_eq!(policy.explore_chance(), 0.375);
        for _ in 0..10 {
            policy.decay_exploration(0.5, 0.1);
        }
        assert_eq!(policy.explore_chance(), 0.1);
    }
}
