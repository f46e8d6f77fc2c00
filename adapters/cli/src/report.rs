//! Human-readable lines printed by the subcommands.

use tileworld_core::{DeathCause, TickOutcome, TICKS_PER_SECOND};
use tileworld_system_replay::Verdict;
use tileworld_system_solution::{LevelRecord, SolutionHeader};

pub(crate) fn header_line(header: &SolutionHeader, records: usize) -> String {
    format!(
        "ruleset {}, move-list format v{}, {} record(s), {} extra header byte(s)",
        header.ruleset.name(),
        header.format.version(),
        records,
        header.extra.len()
    )
}

pub(crate) fn record_line(record: &LevelRecord) -> String {
    match record {
        LevelRecord::Placeholder => "  ---- placeholder".to_owned(),
        LevelRecord::Attempted { number, password } => format!(
            "  {number:>4} {} attempted",
            String::from_utf8_lossy(password)
        ),
        LevelRecord::Solved(solution) => format!(
            "  {:>4} {} solved in {} ({} moves, seed {:#010x}, slide {:?}, stepping {})",
            solution.number,
            solution.password_text(),
            clock(solution.best_time),
            solution.moves.len(),
            solution.seed,
            solution.random_slide_dir,
            solution.stepping
        ),
        LevelRecord::Invalid { number, error, .. } => {
            format!("  {:>4} invalid: {error}", level_label(*number))
        }
    }
}

pub(crate) fn verdict_line(number: u16, verdict: &Verdict) -> String {
    match verdict {
        Verdict::Solved { ticks } => format!("level {number:>4}: ok, solved in {}", clock(*ticks)),
        Verdict::Failed { outcome } => {
            format!("level {number:>4}: FAILED, {}", outcome_text(*outcome))
        }
        Verdict::Invalid(error) => format!("level {number:>4}: INVALID, {error}"),
    }
}

fn outcome_text(outcome: TickOutcome) -> String {
    match outcome {
        TickOutcome::Continue => "tick limit reached".to_owned(),
        TickOutcome::Completed => "completed".to_owned(),
        TickOutcome::Died(DeathCause::Collided(kind)) => format!("chip was caught by a {kind:?}"),
        TickOutcome::Died(cause) => format!("chip died: {cause:?}"),
    }
}

/// Level number, or `?` for records too short to name one.
pub(crate) fn level_label(number: Option<u16>) -> String {
    number.map_or_else(|| "?".to_owned(), |number| number.to_string())
}

/// Formats a tick count as seconds and leftover ticks.
fn clock(ticks: u32) -> String {
    format!(
        "{}.{:02}s ({ticks} ticks)",
        ticks / TICKS_PER_SECOND,
        (ticks % TICKS_PER_SECOND) * 5
    )
}

#[cfg(test)]
mod tests {
    use super::{clock, record_line, verdict_line};
    use tileworld_core::{CreatureKind, DeathCause, TickOutcome};
    use tileworld_system_replay::Verdict;
    use tileworld_system_solution::{LevelRecord, RecordError};

    #[test]
    fn clock_shows_hundredths() {
        assert_eq!(clock(0), "0.00s (0 ticks)");
        assert_eq!(clock(47), "2.35s (47 ticks)");
    }

    #[test]
    fn verdicts_name_the_failure() {
        assert_eq!(
            verdict_line(
                3,
                &Verdict::Failed {
                    outcome: TickOutcome::Died(DeathCause::Collided(CreatureKind::Teeth))
                }
            ),
            "level    3: FAILED, chip was caught by a Teeth"
        );
        assert_eq!(
            verdict_line(12, &Verdict::Solved { ticks: 20 }),
            "level   12: ok, solved in 1.00s (20 ticks)"
        );
    }

    #[test]
    fn short_invalid_records_have_no_level_number() {
        let record = LevelRecord::Invalid {
            number: None,
            error: RecordError::Size(1),
            raw: vec![0],
        };
        assert_eq!(
            record_line(&record),
            "     ? invalid: record size 1 fits neither an attempt nor a solution"
        );
    }
}
