//! Candidate directions shared by both rulesets.

use std::cmp::Ordering;

use tileworld_core::{CreatureKind, Direction};
use tileworld_world::GameState;

/// Fixed preference lists of the deterministic monsters.
///
/// Returns an empty list for kinds whose choice depends on the ruleset.
pub(crate) fn fixed_candidates(kind: CreatureKind, facing: Direction) -> Vec<Direction> {
    let d = facing;
    match kind {
        CreatureKind::Tank => vec![d],
        CreatureKind::Ball => vec![d, d.back()],
        CreatureKind::Glider => vec![d, d.left(), d.right(), d.back()],
        CreatureKind::Fireball => vec![d, d.right(), d.left(), d.back()],
        CreatureKind::Bug => vec![d.left(), d, d.right(), d.back()],
        CreatureKind::Paramecium => vec![d.right(), d, d.left(), d.back()],
        CreatureKind::Chip
        | CreatureKind::Block
        | CreatureKind::Walker
        | CreatureKind::Blob
        | CreatureKind::Teeth => Vec::new(),
    }
}

/// Greedy pursuit of Chip, trying the axis with the larger offset first.
///
/// Ties favour the vertical axis. Yields nothing when Chip is gone or
/// stands on the creature's own cell.
pub(crate) fn toward_chip(state: &GameState, index: usize) -> Vec<Direction> {
    let Some(hunter) = state.creature(index) else {
        return Vec::new();
    };
    let Some(chip) = state.chip().filter(|chip| !chip.is_dead()) else {
        return Vec::new();
    };

    let dx = i32::from(chip.pos().x()) - i32::from(hunter.pos().x());
    let dy = i32::from(chip.pos().y()) - i32::from(hunter.pos().y());
    let horizontal = match dx.cmp(&0) {
        Ordering::Less => Some(Direction::West),
        Ordering::Greater => Some(Direction::East),
        Ordering::Equal => None,
    };
    let vertical = match dy.cmp(&0) {
        Ordering::Less => Some(Direction::North),
        Ordering::Greater => Some(Direction::South),
        Ordering::Equal => None,
    };

    let (first, second) = if dx.abs() > dy.abs() {
        (horizontal, vertical)
    } else {
        (vertical, horizontal)
    };
    [first, second].into_iter().flatten().collect()
}
