#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for inspecting and verifying Tile World solutions.

mod config;
mod report;

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tileworld_core::LevelSetup;
use tileworld_system_replay::{verify, ReplayError, ReplayOptions, Verdict};
use tileworld_system_solution::{LevelRecord, SolutionFile};
use tileworld_world::InvariantPolicy;

#[derive(Debug, Parser)]
#[command(name = "tileworld", version, about = "Inspect and verify Tile World solution files")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Print the header and a summary of every record.
    Inspect {
        /// Solution file to read.
        solution: PathBuf,
    },
    /// Replay every recorded solution against its level.
    Verify {
        /// JSON array of level setups.
        #[arg(long, value_name = "FILE")]
        levels: PathBuf,
        /// Solution file to check.
        solution: PathBuf,
        /// Ticks after which a replay is abandoned.
        #[arg(long)]
        max_ticks: Option<u32>,
        /// Treatment of broken simulation invariants.
        #[arg(long, value_enum)]
        invariants: Option<InvariantsArg>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InvariantsArg {
    Abort,
    Warn,
}

impl From<InvariantsArg> for InvariantPolicy {
    fn from(arg: InvariantsArg) -> Self {
        match arg {
            InvariantsArg::Abort => Self::Abort,
            InvariantsArg::Warn => Self::Warn,
        }
    }
}

/// Entry point for the Tile World command-line interface.
fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    config::init_tracing(&config.log.filter);

    match cli.command {
        CliCommand::Inspect { solution } => {
            inspect(&solution)?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Verify {
            levels,
            solution,
            max_ticks,
            invariants,
        } => {
            let mut options = config.replay;
            if let Some(max_ticks) = max_ticks {
                options.max_ticks = max_ticks;
            }
            if let Some(invariants) = invariants {
                options.invariant_policy = invariants.into();
            }
            let failures = verify_all(&levels, &solution, options)?;
            Ok(if failures == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn read_solution_file(path: &Path) -> Result<SolutionFile> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read solution file at {}", path.display()))?;
    SolutionFile::parse(&bytes)
        .with_context(|| format!("failed to parse solution file {}", path.display()))
}

fn read_levels(path: &Path) -> Result<HashMap<u16, LevelSetup>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level set at {}", path.display()))?;
    let levels: Vec<LevelSetup> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse level set {}", path.display()))?;
    Ok(levels
        .into_iter()
        .map(|level| (level.number, level))
        .collect())
}

fn inspect(path: &Path) -> Result<()> {
    let file = read_solution_file(path)?;
    println!("{}", report::header_line(&file.header, file.records.len()));
    for record in &file.records {
        println!("{}", report::record_line(record));
    }
    Ok(())
}

/// Verifies every solution in the file and returns the number of failures.
fn verify_all(levels: &Path, solution: &Path, options: ReplayOptions) -> Result<usize> {
    let levels = read_levels(levels)?;
    let file = read_solution_file(solution)?;
    let ruleset = file.header.ruleset;

    let mut checked = 0;
    let mut failures = 0;
    for record in &file.records {
        let (number, verdict) = match record {
            LevelRecord::Solved(solution) => {
                let verdict = match levels.get(&solution.number) {
                    Some(setup) => verify(setup, ruleset, solution, options),
                    None => {
                        println!("level {:>4}: skipped, not in the level set", solution.number);
                        continue;
                    }
                };
                (solution.number, verdict)
            }
            LevelRecord::Invalid { number, error, .. } => {
                println!("level {:>4}: INVALID, {error}", report::level_label(*number));
                failures += 1;
                checked += 1;
                continue;
            }
            LevelRecord::Placeholder | LevelRecord::Attempted { .. } => continue,
        };

        checked += 1;
        if !matches!(verdict, Verdict::Solved { .. }) {
            failures += 1;
        }
        if let Verdict::Invalid(ReplayError::Level(error)) = &verdict {
            tracing::warn!(level = number, %error, "level data is unusable");
        }
        println!("{}", report::verdict_line(number, &verdict));
    }

    tracing::info!(checked, failures, ruleset = ruleset.name(), "verification finished");
    println!("{checked} solution(s) checked, {failures} failed");
    Ok(failures)
}
