use std::path::PathBuf;

use anyhow::bail;
use rand::Rng as _;
use stackbot_engine::{PieceSelection, seeded_rng};
use stackbot_policy::{
    game_runner::GameRunner,
    policy::Policy,
    registry::{PolicyRegistry, TRAINING_SENTINEL},
};

use crate::{schema::cluster_model::ClusterModel, util::read_json_file};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Policy name (ignored when `--model` is given)
    #[arg(long, default_value = "random")]
    policy: String,
    /// Piece selection (`random`, a code from -1 to 6, or a letter)
    #[arg(long, default_value = "random", allow_hyphen_values = true)]
    piece: PieceSelection,
    /// Seed for the game stream (random when omitted)
    #[arg(long, allow_hyphen_values = true)]
    seed: Option<i64>,
    /// Cluster model file saved by `train`
    #[arg(long)]
    model: Option<PathBuf>,
    /// Stop after this many placements
    #[arg(long)]
    max_moves: Option<usize>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        policy,
        piece,
        seed,
        model,
        max_moves,
    } = arg;
    let seed = seed.unwrap_or_else(|| rand::rng().random());

    let mut registry = PolicyRegistry::new();
    let mut model_policy;
    let policy: &mut dyn Policy = if let Some(path) = model {
        let model: ClusterModel = read_json_file("cluster model", path)?;
        model_policy = model.into_policy();
        &mut model_policy
    } else {
        if registry.resolve(policy)?.is_needs_training() {
            bail!(
                "Policy {policy:?} ({TRAINING_SENTINEL}) needs trained cluster values: \
                 run `train` and pass its output with --model"
            );
        }
        registry.get_mut(policy)?
    };

    let runner = GameRunner::new().with_move_limit(*max_moves);
    let record = runner.play(*piece, policy, &mut seeded_rng(seed));

    if let Some(board) = record.final_board() {
        println!("{board}");
    }
    println!("Policy: {}", policy.name());
    println!("Seed: {seed}");
    println!("Moves: {}", record.moves);
    println!("Points: {}", record.points);
    println!("Lines: {}", record.stats.total_cleared_lines());
    println!("End: {:?}", record.end);
    Ok(())
}
