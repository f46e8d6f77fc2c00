//! Tick bookkeeping and simulation invariant checks.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tileworld_core::{Command, DeathCause, Event, Floor, Position, TickOutcome, MOVE_EIGHTHS};

use crate::{cell::CellFlags, creature::CreatureFlags, GameState, CHIP_INDEX};

/// How end-of-tick invariant failures are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvariantPolicy {
    /// Stop the simulation and report the violation.
    #[default]
    Abort,
    /// Log the violation and keep going.
    Warn,
}

/// What exactly was found to be inconsistent.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantDetail {
    /// A creature's sub-tile counter left `0..=8`.
    #[error("sub-tile counter {moving} exceeds a full tile")]
    MovingOutOfRange {
        /// Offending counter value.
        moving: u8,
    },
    /// The slip list names a creature twice.
    #[error("creature listed twice in the slip list")]
    DuplicateSlipEntry,
    /// The slip list names a slot past the end of the creature list.
    #[error("slip list names a missing creature")]
    DanglingSlipEntry,
    /// A slipping creature stands on a floor that does not push it.
    #[error("slipping creature stands on {floor:?}")]
    SlipOffForcedFloor {
        /// Floor under the creature.
        floor: Floor,
    },
    /// The number of live Chips is not one while the level is running.
    #[error("{count} live chips while the level is running")]
    ChipCount {
        /// Live Chips found.
        count: usize,
    },
    /// Cell state bits are set on a floor they do not belong to.
    #[error("cell flags {flags:#04x} set on {floor:?}")]
    StrayCellFlags {
        /// Floor of the cell.
        floor: Floor,
        /// Raw flag bits.
        flags: u8,
    },
}

/// A broken simulation invariant, with the context needed to track it down.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("tick {tick}: {detail} (creature {creature:?}, cell {position:?})")]
pub struct InvariantViolation {
    /// Tick at which the check ran.
    pub tick: u32,
    /// Slot of the creature involved, if any.
    pub creature: Option<usize>,
    /// Cell involved, if any.
    pub position: Option<Position>,
    /// The broken invariant.
    pub detail: InvariantDetail,
}

impl GameState {
    /// Opens a tick: latches the command and releases pending beartraps.
    pub fn begin_tick(&mut self, command: Command, out_events: &mut Vec<Event>) {
        self.command = command;
        match command {
            Command::DebugDump => self.dump(),
            Command::Mark => {
                self.marks.push(self.tick);
                out_events.push(Event::Marked { tick: self.tick });
            }
            Command::Wait | Command::Move(_) => {}
        }

        for cell_index in 0..self.cells.len() {
            let flags = self.cells[cell_index].flags_mut();
            if !flags.contains(CellFlags::RELEASE_PENDING) {
                continue;
            }
            flags.remove(CellFlags::RELEASE_PENDING);
            flags.insert(CellFlags::RELEASED);
            for creature in &mut self.creatures {
                if !creature.is_dead() && creature.pos.index() == cell_index {
                    creature.flags.insert(CreatureFlags::RELEASED);
                }
            }
        }
    }

    /// Closes a tick.
    ///
    /// Clears one-tick releases, removes dead creatures, advances the clock,
    /// applies the time limit and checks the simulation invariants.
    pub fn end_tick(
        &mut self,
        policy: InvariantPolicy,
        out_events: &mut Vec<Event>,
    ) -> Result<TickOutcome, InvariantViolation> {
        for creature in &mut self.creatures {
            creature.flags.remove(CreatureFlags::RELEASED);
        }
        for cell in &mut self.cells {
            cell.flags_mut().remove(CellFlags::RELEASED);
        }
        self.compact();

        self.tick = self.tick.saturating_add(1);
        if self.outcome == TickOutcome::Continue
            && self.time_limit > 0
            && self.tick >= self.time_limit
        {
            self.kill_chip(DeathCause::OutOfTime, out_events);
        }

        if let Err(violation) = self.check_invariants() {
            match policy {
                InvariantPolicy::Abort => return Err(violation),
                InvariantPolicy::Warn => {
                    tracing::warn!(%violation, "simulation invariant violated");
                }
            }
        }
        Ok(self.outcome)
    }

    /// Verifies the structural invariants of the state.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let violation = |creature: Option<usize>, position: Option<Position>, detail| {
            InvariantViolation {
                tick: self.tick,
                creature,
                position,
                detail,
            }
        };

        for (index, creature) in self.creatures.iter().enumerate() {
            if creature.moving > MOVE_EIGHTHS {
                return Err(violation(
                    Some(index),
                    Some(creature.pos),
                    InvariantDetail::MovingOutOfRange {
                        moving: creature.moving,
                    },
                ));
            }
        }

        let entries = self.slip.entries();
        for (place, &index) in entries.iter().enumerate() {
            if entries[..place].contains(&index) {
                return Err(violation(Some(index), None, InvariantDetail::DuplicateSlipEntry));
            }
            let Some(creature) = self.creatures.get(index) else {
                return Err(violation(Some(index), None, InvariantDetail::DanglingSlipEntry));
            };
            let floor = self.cell(creature.pos).floor();
            if !creature.is_dead() && !self.forced_for(creature.kind, floor) {
                return Err(violation(
                    Some(index),
                    Some(creature.pos),
                    InvariantDetail::SlipOffForcedFloor { floor },
                ));
            }
        }

        if self.outcome == TickOutcome::Continue {
            let count = self
                .creatures
                .iter()
                .filter(|creature| creature.is_chip() && !creature.is_dead())
                .count();
            if count != 1 {
                return Err(violation(None, None, InvariantDetail::ChipCount { count }));
            }
        }

        for (cell_index, cell) in self.cells.iter().enumerate() {
            let flags = cell.flags();
            let stray = match cell.floor() {
                Floor::CloneMachine => flags.bits() & !CellFlags::PRIMED.bits(),
                Floor::Beartrap => {
                    flags.bits() & !(CellFlags::RELEASE_PENDING.bits() | CellFlags::RELEASED.bits())
                }
                _ => flags.bits(),
            };
            if stray != 0 {
                let position = u16::try_from(cell_index).ok().and_then(Position::new);
                return Err(violation(
                    None,
                    position,
                    InvariantDetail::StrayCellFlags {
                        floor: cell.floor(),
                        flags: flags.bits(),
                    },
                ));
            }
        }

        Ok(())
    }

    fn compact(&mut self) {
        let any_dead = self
            .creatures
            .iter()
            .enumerate()
            .any(|(index, creature)| index != CHIP_INDEX && creature.is_dead());
        if !any_dead {
            return;
        }

        let mut remap = Vec::with_capacity(self.creatures.len());
        let mut survivors = Vec::with_capacity(self.creatures.len());
        for (index, creature) in self.creatures.iter().enumerate() {
            if index != CHIP_INDEX && creature.is_dead() {
                remap.push(None);
            } else {
                remap.push(Some(survivors.len()));
                survivors.push(*creature);
            }
        }
        self.creatures = survivors;
        self.slip.remap(&remap);
    }

    fn dump(&self) {
        tracing::debug!(
            level = self.level_number,
            tick = self.tick,
            chips_needed = self.chips_needed,
            keys = ?self.possessions.key_counts(),
            boots = ?self.possessions.boot_counts(),
            slipping = ?self.slip.entries(),
            "state dump"
        );
        for (slot, creature) in self.creatures.iter().enumerate() {
            tracing::debug!(
                slot,
                kind = ?creature.kind,
                x = creature.pos.x(),
                y = creature.pos.y(),
                dir = ?creature.dir,
                moving = creature.moving,
                flags = creature.flags.bits(),
                "creature"
            );
        }
    }
}
