//! Rules of the Atari Lynx original.

use tileworld_core::{CreatureKind, Direction, Ruleset};
use tileworld_world::{Creature, GameState};

use crate::{ai, stepped_tick, Motion, Rules};

/// Lynx ruleset engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LynxRules;

impl Rules for LynxRules {
    fn ruleset(&self) -> Ruleset {
        Ruleset::Lynx
    }

    fn chip_may_decide(&self, _state: &GameState) -> bool {
        true
    }

    fn creature_may_decide(&self, state: &GameState, kind: CreatureKind) -> bool {
        // Teeth only move on alternate halves of an eight-tick cycle.
        kind != CreatureKind::Teeth || stepped_tick(state) & 4 == 0
    }

    fn cloners_fire(&self, state: &GameState) -> bool {
        state.tick() & 1 == 0
    }

    fn slipping_creatures_move(&self, _state: &GameState) -> bool {
        true
    }

    fn decision_order(&self, count: usize) -> Vec<usize> {
        (0..count).rev().collect()
    }

    fn chip_may_leave_slide(&self, chip: &Creature, input: Direction) -> bool {
        input.is_vertical() != chip.fdir().is_vertical()
    }

    fn speed(&self, kind: CreatureKind, motion: Motion) -> u8 {
        match motion {
            Motion::Forced => 4,
            Motion::Pushed => 2,
            Motion::Voluntary if kind == CreatureKind::Blob => 1,
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
                if state.peek(index, d) {
                    return vec![d];
                }
                let mut turns = [d.left(), d.back(), d.right()];
                let start = state.restart_prng_mut().next_of3(0, 1, 2);
                turns.rotate_left(start);
                turns.to_vec()
            }
            CreatureKind::Blob => {
                let draw = state.restart_prng_mut().next4();
                let base = Direction::from_index(draw).unwrap_or(d);
                vec![base, base.right(), base.back(), base.left()]
            }
            CreatureKind::Teeth => ai::toward_chip(state, index),
            kind => ai::fixed_candidates(kind, d),
        }
    }
}
