//! Interactive play with solution recording.

use tileworld_core::{Command, Direction, Event, LevelError, LevelSetup, Ruleset, TickOutcome};
use tileworld_system_rules::{advance, rules_for, Rules};
use tileworld_system_solution::{Move, SolutionRecord};
use tileworld_world::{GameState, InvariantPolicy, InvariantViolation, StartConditions};

/// Collects the directional inputs of a level attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Recorder {
    moves: Vec<Move>,
}

impl Recorder {
    /// Remembers a direction supplied on a tick.
    ///
    /// A second input for a tick already recorded replaces the first.
    pub fn record(&mut self, tick: u32, direction: Direction) {
        match self.moves.last_mut() {
            Some(last) if last.tick >= tick => {
                if last.tick == tick {
                    last.direction = direction;
                }
            }
            _ => self.moves.push(Move::new(tick, direction)),
        }
    }

    /// Moves recorded so far, in tick order.
    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }
}

/// A level attempt driven one command at a time.
pub struct Session {
    setup: LevelSetup,
    start: StartConditions,
    policy: InvariantPolicy,
    state: GameState,
    rules: Box<dyn Rules>,
    recorder: Recorder,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("level", &self.setup.number)
            .field("ruleset", &self.state.ruleset())
            .field("tick", &self.state.tick())
            .field("moves", &self.recorder.moves.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Starts an attempt at a level.
    pub fn new(
        setup: &LevelSetup,
        ruleset: Ruleset,
        start: StartConditions,
        policy: InvariantPolicy,
    ) -> Result<Self, LevelError> {
        let state = GameState::new(setup, ruleset, start)?;
        Ok(Self {
            setup: setup.clone(),
            start,
            policy,
            state,
            rules: rules_for(ruleset),
            recorder: Recorder::default(),
        })
    }

    /// Current game state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Inputs recorded so far.
    #[must_use]
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Advances one tick, recording directional input.
    pub fn step(
        &mut self,
        command: Command,
        out_events: &mut Vec<Event>,
    ) -> Result<TickOutcome, InvariantViolation> {
        if self.state.outcome().is_terminal() {
            return Ok(self.state.outcome());
        }
        if let Some(direction) = command.direction() {
            self.recorder.record(self.state.tick(), direction);
        }
        advance(
            &mut self.state,
            self.rules.as_ref(),
            command,
            self.policy,
            out_events,
        )
    }

    /// Solution record describing the attempt so far.
    #[must_use]
    pub fn record(&self) -> SolutionRecord {
        let mut password = [b' '; 4];
        for (slot, byte) in password.iter_mut().zip(self.setup.password.bytes()) {
            *slot = byte;
        }
        SolutionRecord {
            number: self.setup.number,
            password,
            flags: 0,
            random_slide_dir: self.start.random_slide_dir,
            stepping: self.start.stepping & 7,
            seed: self.start.seed,
            best_time: self.state.tick(),
            moves: self.recorder.moves.clone(),
        }
    }

    /// Ends the attempt, yielding a solution if the level was completed.
    #[must_use]
    pub fn finish(self) -> Option<SolutionRecord> {
        if self.state.outcome() != TickOutcome::Completed {
            return None;
        }
        let record = self.record();
        tracing::info!(
            level = record.number,
            ticks = record.best_time,
            moves = record.moves.len(),
            "level solved"
        );
        Some(record)
    }
}
