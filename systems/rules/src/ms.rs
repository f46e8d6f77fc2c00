//! Rules of the Microsoft Windows port.

use tileworld_core::{CreatureKind, Direction, Ruleset};
use tileworld_world::{Creature, CreatureFlags, GameState};

use crate::{ai, stepped_tick, Motion, Rules};

/// MS ruleset engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MsRules;

impl Rules for MsRules {
    fn ruleset(&self) -> Ruleset {
        Ruleset::Ms
    }

    fn chip_may_decide(&self, state: &GameState) -> bool {
        state.tick() & 1 == 0
    }

    fn creature_may_decide(&self, state: &GameState, _kind: CreatureKind) -> bool {
        stepped_tick(state) & 3 == 0
    }

    fn cloners_fire(&self, state: &GameState) -> bool {
        stepped_tick(state) & 3 == 0
    }

    fn slipping_creatures_move(&self, state: &GameState) -> bool {
        state.tick() & 1 == 0
    }

    fn decision_order(&self, count: usize) -> Vec<usize> {
        (0..count).collect()
    }

    fn chip_may_leave_slide(&self, chip: &Creature, _input: Direction) -> bool {
        chip.flags().contains(CreatureFlags::SLIDE_TOKEN)
    }

    // A move lasts exactly until the mover's next decision tick.
    fn speed(&self, kind: CreatureKind, motion: Motion) -> u8 {
        match motion {
            Motion::Forced | Motion::Pushed => 4,
            Motion::Voluntary if kind == CreatureKind::Chip => 4,
            Motion::Voluntary => 2,
        }
    }

    fn candidates(&self, state: &mut GameState, index: usize) -> Vec<Direction> {
        let Some(creature) = state.creature(index).copied() else {
            return Vec::new();
        };
        let d = creature.dir();
        match creature.kind() {
            CreatureKind::Walker => {
                let mut turns = [d.left(), d.back(), d.right()];
                state.main_prng_mut().permute3(&mut turns);
                let mut choices = vec![d];
                choices.extend(turns);
                choices
            }
            CreatureKind::Blob => {
                let mut choices = [d, d.left(), d.back(), d.right()];
                state.main_prng_mut().permute4(&mut choices);
                choices.to_vec()
            }
            CreatureKind::Teeth => ai::toward_chip(state, index),
            kind => ai::fixed_candidates(kind, d),
        }
    }
}
