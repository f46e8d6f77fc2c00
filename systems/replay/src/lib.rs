#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Live sessions that record solutions, and batch replay that checks them.

mod session;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tileworld_core::{Command, LevelError, LevelSetup, Ruleset, TickOutcome};
use tileworld_system_rules::{advance, rules_for};
use tileworld_system_solution::{Move, SolutionRecord};
use tileworld_world::{query, GameState, InvariantPolicy, InvariantViolation, StartConditions};

pub use session::{Recorder, Session};

/// Limits applied while replaying a recorded solution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayOptions {
    /// Ticks after which an unfinished replay is abandoned.
    pub max_ticks: u32,
    /// Treatment of broken simulation invariants.
    #[serde(rename = "invariants")]
    pub invariant_policy: InvariantPolicy,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            max_ticks: 100_000,
            invariant_policy: InvariantPolicy::Abort,
        }
    }
}

/// Reasons a replay could not run to a verdict.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// The level cannot be played.
    #[error("level cannot be played: {0}")]
    Level(#[from] LevelError),
    /// The simulation reached an inconsistent state.
    #[error("simulation invariant broken: {0}")]
    Invariant(#[from] InvariantViolation),
    /// The record belongs to another level.
    #[error("solution is for level {found}, not level {expected}")]
    LevelMismatch {
        /// Level being replayed.
        expected: u16,
        /// Level named by the record.
        found: u16,
    },
}

/// Final state of a replay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayReport {
    /// How the attempt ended, or `Continue` if the tick limit was hit.
    pub outcome: TickOutcome,
    /// Ticks simulated.
    pub ticks: u32,
    /// State after the last tick.
    pub snapshot: query::Snapshot,
}

/// Classification of a recorded solution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The solution reaches the exit.
    Solved {
        /// Tick count at completion.
        ticks: u32,
    },
    /// The solution plays out but does not reach the exit.
    Failed {
        /// Outcome at the end of the replay.
        outcome: TickOutcome,
    },
    /// The solution cannot be replayed.
    Invalid(ReplayError),
}

/// Start conditions recorded alongside a solution.
#[must_use]
pub fn start_conditions(record: &SolutionRecord) -> StartConditions {
    StartConditions {
        seed: record.seed,
        random_slide_dir: record.random_slide_dir,
        stepping: record.stepping,
    }
}

/// Replays a recorded solution from the level's starting state.
///
/// Recorded moves are fed on their ticks and every other tick waits. The
/// replay stops as soon as the attempt ends or `options.max_ticks` is hit.
pub fn replay(
    setup: &LevelSetup,
    ruleset: Ruleset,
    record: &SolutionRecord,
    options: ReplayOptions,
) -> Result<ReplayReport, ReplayError> {
    if record.number != setup.number {
        return Err(ReplayError::LevelMismatch {
            expected: setup.number,
            found: record.number,
        });
    }

    let mut state = GameState::new(setup, ruleset, start_conditions(record))?;
    let rules = rules_for(ruleset);
    let mut moves = record.moves.iter().peekable();
    let mut events = Vec::new();
    let mut outcome = state.outcome();

    while !outcome.is_terminal() && state.tick() < options.max_ticks {
        let tick = state.tick();
        let command = match moves.next_if(|entry| entry.tick <= tick) {
            Some(&Move { direction, .. }) => Command::Move(direction),
            None => Command::Wait,
        };
        events.clear();
        outcome = advance(
            &mut state,
            rules.as_ref(),
            command,
            options.invariant_policy,
            &mut events,
        )?;
    }

    Ok(ReplayReport {
        outcome,
        ticks: state.tick(),
        snapshot: query::snapshot(&state),
    })
}

/// Replays a solution and classifies the result.
#[must_use]
pub fn verify(
    setup: &LevelSetup,
    ruleset: Ruleset,
    record: &SolutionRecord,
    options: ReplayOptions,
) -> Verdict {
    let verdict = match replay(setup, ruleset, record, options) {
        Ok(ReplayReport {
            outcome: TickOutcome::Completed,
            ticks,
            ..
        }) => Verdict::Solved { ticks },
        Ok(report) => Verdict::Failed {
            outcome: report.outcome,
        },
        Err(error) => Verdict::Invalid(error),
    };

    match &verdict {
        Verdict::Solved { ticks } => {
            if *ticks != record.best_time {
                tracing::warn!(
                    level = setup.number,
                    recorded = record.best_time,
                    replayed = ticks,
                    "solution time differs from the recorded time"
                );
            }
            tracing::info!(level = setup.number, ticks, "solution verified");
        }
        Verdict::Failed { outcome } => {
            tracing::info!(level = setup.number, ?outcome, "solution does not solve the level");
        }
        Verdict::Invalid(error) => {
            tracing::info!(level = setup.number, %error, "solution cannot be replayed");
        }
    }
    verdict
}
