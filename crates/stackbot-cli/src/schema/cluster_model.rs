use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stackbot_policy::cluster::{ClusterValuePolicy, ClusterValueTable};
use stackbot_training::cluster_learner::TrainedClusters;

/// Saved cluster values with a short training summary.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct ClusterModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub training_games: usize,
    pub mean_moves: f64,
    pub clusters: ClusterValueTable,
}

impl ClusterModel {
    pub(crate) fn from_trained(name: &str, trained: &TrainedClusters) -> Self {
        Self {
            name: name.to_owned(),
            trained_at: Utc::now(),
            training_games: trained.report.games,
            mean_moves: trained.report.mean_moves,
            clusters: ClusterValueTable::clone(trained.table()),
        }
    }

    pub(crate) fn into_policy(self) -> ClusterValuePolicy {
        ClusterValuePolicy::new(Arc::new(self.clusters))
    }
}

#[cfg(test)]
mod tests {
    use stackbot_engine::{PieceKind, PieceSelection, seeded_rng};
    use stackbot_training::cluster_learner::{ClusterLearner, LearnerParams};

    use super::*;

    fn trained() -> TrainedClusters {
        let params = LearnerParams {
            training_games: 5,
            piece_selection: PieceSelection::Fixed(PieceKind::O),
            ..LearnerParams::default()
        };
        ClusterLearner::new(params).train(&mut seeded_rng(3), |_| {})
    }

    #[test]
    fn test_model_keeps_trained_values() {
        let trained = trained();
        let model = ClusterModel::from_trained("cluster-value", &trained);
        assert_eq!(model.name, "cluster-value");
        assert_eq!(model.training_games, 5);
        assert_eq!(&model.clusters, trained.table().as_ref());

        let policy = model.clone().into_policy();
        assert_eq!(policy.table().as_ref(), &model.clusters);
    }

    #[test]
    fn test_model_json_round_trip() {
        let model = ClusterModel::from_trained("cluster-value", &trained());
        let json = serde_json::to_string(&model).unwrap();
        let loaded: ClusterModel = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.name, model.name);
        assert_eq!(loaded.trained_at, model.trained_at);
        assert_eq!(loaded.training_games, model.training_games);
        assert_eq!(loaded.clusters.len(), model.clusters.len());
        assert!((loaded.mean_moves - model.mean_moves).abs() < 1e-9);
    }

    #[test]
    fn test_model_keeps_lost_value() {
        let params = LearnerParams {
            training_games: 2,
            lost_value: -50.0,
            piece_selection: PieceSelection::Fixed(PieceKind::O),
            ..LearnerParams::default()
        };
        let trained = ClusterLearner::new(params).train(&mut seeded_rng(3), |_| {});
        let model = ClusterModel::from_trained("cluster-value", &trained);
        assert_eq!(model.clusters.lost_value(), -50.0);
        assert_eq!(model.into_policy().table().lost_value(), -50.0);
    }
}
