use std::path::PathBuf;

use rand::Rng as _;
use stackbot_engine::seeded_rng;

use super::learner::{LearnerArg, train_clusters};
use crate::{schema::cluster_model::ClusterModel, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Seed for the training stream (random when omitted)
    #[arg(long, allow_hyphen_values = true)]
    seed: Option<i64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write training progress as CSV to this path
    #[arg(long)]
    progress: Option<PathBuf>,
    /// Name stored in the model file
    #[arg(long, default_value = "cluster-value")]
    name: String,
    #[clap(flatten)]
    learner: LearnerArg,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        seed,
        output,
        progress,
        name,
        learner,
    } = arg;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let params = learner.params();
    eprintln!(
        "Training cluster values: {} games, seed {seed}",
        params.training_games
    );

    let mut progress = progress.clone().map(Output::open).transpose()?;
    let trained = train_clusters(params, &mut seeded_rng(seed), progress.as_mut())?;
    let model = ClusterModel::from_trained(name, &trained);
    Output::save_json(&model, output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Mean moves: {:.3}", model.mean_moves);
    eprintln!(
        "  Final explore chance: {:.3}",
        trained.report.final_explore_chance
    );
    eprintln!("  Clusters: {}", model.clusters.len());
    eprintln!("  Lost value: {}", model.clusters.lost_value());

    Ok(())
}
