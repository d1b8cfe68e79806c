use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Context as _;
use stackbot_engine::seeded_rng;
use stackbot_policy::{game_runner::GameRunner, registry::PolicyRegistry};
use stackbot_training::cluster_learner::LearnerParams;

use super::learner::{LearnerArg, train_clusters};
use crate::{
    schema::{
        cluster_model::ClusterModel,
        record::{SeriesRecord, read_records},
    },
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RunArg {
    /// Series file: a header line, then `games,policy,piece,seed` per line
    input: PathBuf,
    /// Write training progress as CSV to this path
    #[arg(long)]
    progress: Option<PathBuf>,
    /// Save the trained cluster values as JSON to this path
    #[arg(long)]
    table_out: Option<PathBuf>,
    /// Print the spread of moves per game of each series on stderr
    #[arg(long)]
    stats: bool,
    #[clap(flatten)]
    learner: LearnerArg,
}

pub(crate) fn run(arg: &RunArg) -> anyhow::Result<()> {
    let RunArg {
        input,
        progress,
        table_out,
        stats,
        learner,
    } = arg;
    let start = Instant::now();

    let file = File::open(input)
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;
    let records = read_records(BufReader::new(file))
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;

    let settings = RunSettings {
        params: learner.params(),
        progress: progress.as_deref(),
        table_out: table_out.as_deref(),
        stats: *stats,
    };
    let totals = play_records(records, &settings, &mut io::stdout().lock())?;
    tracing::info!(
        series = totals.series,
        trainings = totals.trainings,
        "input finished"
    );

    eprintln!("Elapsed: {:.3?}", start.elapsed());
    Ok(())
}

#[derive(Debug)]
struct RunSettings<'a> {
    params: LearnerParams,
    progress: Option<&'a Path>,
    table_out: Option<&'a Path>,
    stats: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct RunTotals {
    series: usize,
    trainings: usize,
}

/// Plays every record in order, writing `mean_moves mean_points` per series
/// to `out`.
///
/// The first record naming the training sentinel trains a cluster-value
/// policy on a stream seeded with that record's seed; later records reuse it.
/// Nothing is written for a record that fails.
fn play_records<I, W>(
    records: I,
    settings: &RunSettings<'_>,
    out: &mut W,
) -> anyhow::Result<RunTotals>
where
    I: IntoIterator<Item = anyhow::Result<(usize, SeriesRecord)>>,
    W: Write,
{
    let runner = GameRunner::new();
    let mut registry = PolicyRegistry::new();
    let mut totals = RunTotals::default();

    for record in records {
        let (line, record) = record?;
        let resolution = registry
            .resolve(&record.policy)
            .with_context(|| format!("Invalid record on line {line}"))?;
        if resolution.is_needs_training() {
            tracing::info!(line, seed = record.seed, "training cluster values");
            let mut progress = settings
                .progress
                .map(|path| Output::open(path.to_path_buf()))
                .transpose()?;
            let trained = train_clusters(
                settings.params.clone(),
                &mut seeded_rng(record.seed),
                progress.as_mut(),
            )?;
            if let Some(path) = settings.table_out {
                let model = ClusterModel::from_trained(&record.policy, &trained);
                Output::save_json(&model, Some(path.to_path_buf()))?;
                tracing::info!(path = %path.display(), "cluster values saved");
            }
            registry.register(&record.policy, Box::new(trained.policy));
            totals.trainings += 1;
        }

        let policy = registry
            .get_mut(&record.policy)
            .with_context(|| format!("Invalid record on line {line}"))?;
        let summary = runner.play_series(record.seed, record.piece, record.game_count, policy);
        writeln!(out, "{} {}", summary.mean_moves, summary.mean_points)
            .and_then(|()| out.flush())
            .context("Failed to write series result")?;
        if let Some(spread) = summary.moves.as_ref().filter(|_| settings.stats) {
            eprintln!("  line {line} moves: {spread}");
        }
        totals.series += 1;
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use stackbot_engine::{PieceKind, PieceSelection};
    use stackbot_policy::policy::{QuadraticHeightPolicy, RandomPolicy};

    use super::*;

    fn settings() -> RunSettings<'static> {
        RunSettings {
            params: LearnerParams {
                training_games: 5,
                progress_interval: 0,
                ..LearnerParams::default()
            },
            progress: None,
            table_out: None,
            stats: false,
        }
    }

    fn run_input(input: &str) -> (anyhow::Result<RunTotals>, String) {
        let records = read_records(input.as_bytes()).unwrap();
        let mut out = Vec::new();
        let result = play_records(records, &settings(), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_one_line_per_series() {
        let (result, out) = run_input("games,policy,piece,seed\n3,random,6,1\n2,quadratica,0,7\n");
        assert_eq!(
            result.unwrap(),
            RunTotals {
                series: 2,
                trainings: 0
            }
        );

        let runner = GameRunner::new();
        let first =
            runner.play_series(1, PieceSelection::Fixed(PieceKind::I), 3, &mut RandomPolicy);
        let second = runner.play_series(
            7,
            PieceSelection::Fixed(PieceKind::O),
            2,
            &mut QuadraticHeightPolicy,
        );
        assert_eq!(
            out,
            format!(
                "{} {}\n{} {}\n",
                first.mean_moves, first.mean_points, second.mean_moves, second.mean_points
            )
        );
    }

    #[test]
    fn test_sentinel_trains_once_with_record_seed() {
        let (result, out) = run_input(
            "games,policy,piece,seed\n2,reinforcement_learning,-1,4\n2,reinforcement-learning,0,5\n",
        );
        assert_eq!(
            result.unwrap(),
            RunTotals {
                series: 2,
                trainings: 1
            }
        );

        let trained =
            train_clusters(settings().params, &mut seeded_rng(4), None::<&mut Vec<u8>>).unwrap();
        let mut policy = trained.policy;
        let runner = GameRunner::new();
        let first = runner.play_series(4, PieceSelection::Random, 2, &mut policy);
        let second = runner.play_series(5, PieceSelection::Fixed(PieceKind::O), 2, &mut policy);
        assert_eq!(
            out,
            format!(
                "{} {}\n{} {}\n",
                first.mean_moves, first.mean_points, second.mean_moves, second.mean_points
            )
        );
    }

    #[test]
    fn test_unknown_policy_stops_before_its_output() {
        let (result, out) =
            run_input("games,policy,piece,seed\n3,random,6,1\n1,greedy,0,1\n2,random,6,1\n");
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Invalid record on line 3");
        assert!(format!("{err:#}").contains(r#"unknown policy "greedy""#));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_malformed_record_stops_before_its_output() {
        let (result, out) = run_input("games,policy,piece,seed\n3,random,6,1\n3,random,9,1\n");
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid record on line 3"
        );
        assert_eq!(out.lines().count(), 1);
    }
}
