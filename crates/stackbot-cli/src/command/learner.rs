use std::io::Write;

use anyhow::Context as _;
use stackbot_engine::{GameRng, PieceSelection};
use stackbot_training::cluster_learner::{
    ClusterLearner, LearnerParams, ProgressSnapshot, TrainedClusters,
};

/// Training hyperparameters shared by the commands that train.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct LearnerArg {
    /// Number of self-play training games
    #[arg(long, default_value_t = LearnerParams::default().training_games)]
    training_games: usize,
    /// Initial probability of playing a random placement
    #[arg(long, default_value_t = LearnerParams::default().initial_explore_chance)]
    explore_chance: f64,
    /// Factor applied to the exploration chance after every game
    #[arg(long, default_value_t = LearnerParams::default().explore_decay)]
    explore_decay: f64,
    /// Lowest exploration chance
    #[arg(long, default_value_t = LearnerParams::default().explore_floor)]
    explore_floor: f64,
    /// Blend rate for the last board of a game
    #[arg(long, default_value_t = LearnerParams::default().learning_rate)]
    learning_rate: f64,
    /// Factor applied to the blend rate for every earlier board
    #[arg(long, default_value_t = LearnerParams::default().credit_decay)]
    credit_decay: f64,
    /// Games between progress reports
    #[arg(long, default_value_t = LearnerParams::default().progress_interval)]
    progress_interval: usize,
    /// Piece selection during training (`random`, a code from -1 to 6, or a letter)
    #[arg(long, default_value = "random", allow_hyphen_values = true)]
    training_piece: PieceSelection,
    /// Stop training games after this many placements
    #[arg(long)]
    training_move_limit: Option<usize>,
}

impl LearnerArg {
    pub(crate) fn params(&self) -> LearnerParams {
        LearnerParams {
            training_games: self.training_games,
            initial_explore_chance: self.explore_chance,
            explore_decay: self.explore_decay,
            explore_floor: self.explore_floor,
            learning_rate: self.learning_rate,
            credit_decay: self.credit_decay,
            progress_interval: self.progress_interval,
            piece_selection: self.training_piece,
            move_limit: self.training_move_limit,
            ..LearnerParams::default()
        }
    }
}

/// Trains cluster values, writing each progress snapshot as a CSV row to
/// `progress` when given.
pub(crate) fn train_clusters<W>(
    params: LearnerParams,
    rng: &mut GameRng,
    mut progress: Option<&mut W>,
) -> anyhow::Result<TrainedClusters>
where
    W: Write,
{
    if let Some(output) = progress.as_deref_mut() {
        writeln!(output, "game,recent_mean_moves,explore_chance,clusters")
            .context("Failed to write training progress")?;
    }

    let mut write_error = None;
    let trained = ClusterLearner::new(params).train(rng, |snapshot| {
        if write_error.is_some() {
            return;
        }
        if let Some(output) = progress.as_deref_mut() {
            write_error = write_progress_row(output, snapshot).err();
        }
    });
    if let Some(e) = write_error {
        return Err(e);
    }
    if let Some(output) = progress {
        output
            .flush()
            .context("Failed to flush training progress")?;
    }
    Ok(trained)
}

fn write_progress_row<W>(output: &mut W, snapshot: &ProgressSnapshot) -> anyhow::Result<()>
where
    W: Write,
{
    let ProgressSnapshot {
        game,
        recent_mean_moves,
        explore_chance,
        clusters,
    } = snapshot;
    writeln!(
        output,
        "{game},{recent_mean_moves},{explore_chance},{clusters}"
    )
    .context("Failed to write training progress")
}
