#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ruleset engines that advance a [`GameState`] one tick at a time.
//!
//! Both rulesets share the same tick skeleton, implemented by [`advance`].
//! Everything that differs between them (decision gating, creature order,
//! speeds, slide overrides and creature AI) sits behind the [`Rules`] trait.

mod ai;
mod lynx;
mod ms;

use tileworld_core::{
    Command, CreatureKind, Direction, Event, Floor, Ruleset, SoundEffect, TickOutcome,
};
use tileworld_world::{
    Creature, CreatureFlags, GameState, InvariantPolicy, InvariantViolation, Probe, CHIP_INDEX,
};

pub use lynx::LynxRules;
pub use ms::MsRules;

/// Kind of movement a speed is requested for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Motion {
    /// A move the creature chose itself.
    Voluntary,
    /// A move imposed by ice, a slide or a teleport.
    Forced,
    /// A block shoved by Chip.
    Pushed,
}

/// Behaviour that distinguishes one ruleset from the other.
pub trait Rules {
    /// Ruleset implemented.
    fn ruleset(&self) -> Ruleset;

    /// Reports whether Chip may act on the current tick.
    fn chip_may_decide(&self, state: &GameState) -> bool;

    /// Reports whether a creature of `kind` may select a move this tick.
    fn creature_may_decide(&self, state: &GameState, kind: CreatureKind) -> bool;

    /// Reports whether primed cloning machines fire this tick.
    fn cloners_fire(&self, state: &GameState) -> bool;

    /// Reports whether slipping creatures other than Chip move this tick.
    fn slipping_creatures_move(&self, state: &GameState) -> bool;

    /// Creature slots in the order they select moves.
    fn decision_order(&self, count: usize) -> Vec<usize>;

    /// Reports whether Chip, slipping on a slide floor, may obey `input`.
    fn chip_may_leave_slide(&self, chip: &Creature, input: Direction) -> bool;

    /// Eighths of a tile covered per tick.
    fn speed(&self, kind: CreatureKind, motion: Motion) -> u8;

    /// Directions a creature tries, best first.
    ///
    /// The first one that passes a peek is taken; if none does, the
    /// creature turns to face the first one.
    fn candidates(&self, state: &mut GameState, index: usize) -> Vec<Direction>;
}

/// Engine implementing the given ruleset.
#[must_use]
pub fn rules_for(ruleset: Ruleset) -> Box<dyn Rules> {
    match ruleset {
        Ruleset::Ms => Box::new(MsRules),
        Ruleset::Lynx => Box::new(LynxRules),
    }
}

/// Advances the game by exactly one tick.
///
/// Once the attempt has ended every further call returns the final outcome
/// without touching the state.
pub fn advance<R>(
    state: &mut GameState,
    rules: &R,
    command: Command,
    policy: InvariantPolicy,
    out_events: &mut Vec<Event>,
) -> Result<TickOutcome, InvariantViolation>
where
    R: Rules + ?Sized,
{
    if state.outcome().is_terminal() {
        return Ok(state.outcome());
    }

    state.begin_tick(command, out_events);
    if rules.cloners_fire(state) {
        state.resolve_cloners(|kind| rules.speed(kind, Motion::Voluntary), out_events);
    }
    chip_decides(state, rules, out_events);
    creatures_decide(state, rules, out_events);
    if rules.slipping_creatures_move(state) {
        slipping_creatures_move(state, rules, out_events);
    }
    state.advance_movement(out_events);

    let outcome = state.end_tick(policy, out_events)?;
    if outcome.is_terminal() {
        tracing::debug!(
            level = state.level_number(),
            ruleset = rules.ruleset().name(),
            tick = state.tick(),
            ?outcome,
            "level attempt ended"
        );
    }
    Ok(outcome)
}

fn chip_decides<R>(state: &mut GameState, rules: &R, out_events: &mut Vec<Event>)
where
    R: Rules + ?Sized,
{
    let Some(chip) = state.chip().copied() else {
        return;
    };
    if chip.is_dead() || chip.is_moving() || !rules.chip_may_decide(state) {
        return;
    }

    let input = state.command().direction();
    let push = rules.speed(CreatureKind::Block, Motion::Pushed);

    if state.slip_list().contains(CHIP_INDEX) {
        let on_slide = state.cell(chip.pos()).floor().is_slide();
        let overridden =
            on_slide && input.is_some_and(|dir| rules.chip_may_leave_slide(&chip, dir));
        if !overridden {
            let speed = rules.speed(CreatureKind::Chip, Motion::Forced);
            let _ = state.forced_move(CHIP_INDEX, speed, push, out_events);
            return;
        }
    }

    let Some(dir) = input else {
        return;
    };
    state.set_tdir(CHIP_INDEX, dir);
    if state.can_move(CHIP_INDEX, dir, Probe::Push(push), out_events) {
        let speed = rules.speed(CreatureKind::Chip, Motion::Voluntary);
        state.start_move(CHIP_INDEX, dir, speed, out_events);
    } else if state.chip().is_some_and(|chip| !chip.is_dead()) {
        state.face(CHIP_INDEX, dir);
        out_events.push(Event::Sound {
            effect: SoundEffect::Bump,
        });
    }
}

fn creatures_decide<R>(state: &mut GameState, rules: &R, out_events: &mut Vec<Event>)
where
    R: Rules + ?Sized,
{
    for index in rules.decision_order(state.creatures().len()) {
        let Some(creature) = state.creature(index).copied() else {
            continue;
        };
        if creature.is_chip()
            || creature.is_dead()
            || creature.is_moving()
            || creature.kind() == CreatureKind::Block
            || creature.flags().contains(CreatureFlags::INERT)
        {
            continue;
        }
        if state.slip_list().contains(index)
            || state.cell(creature.pos()).floor() == Floor::CloneMachine
            || state.in_closed_trap(index)
        {
            continue;
        }
        if !creature.flags().contains(CreatureFlags::RELEASED)
            && !rules.creature_may_decide(state, creature.kind())
        {
            continue;
        }

        let candidates = rules.candidates(state, index);
        let Some(&first) = candidates.first() else {
            continue;
        };
        match candidates.iter().copied().find(|&dir| state.peek(index, dir)) {
            Some(dir) => {
                let speed = rules.speed(creature.kind(), Motion::Voluntary);
                state.start_move(index, dir, speed, out_events);
            }
            None => state.face(index, first),
        }
    }
}

fn slipping_creatures_move<R>(state: &mut GameState, rules: &R, out_events: &mut Vec<Event>)
where
    R: Rules + ?Sized,
{
    let push = rules.speed(CreatureKind::Block, Motion::Pushed);
    let slipping = state.slip_list().entries().to_vec();
    for index in slipping {
        let Some(creature) = state.creature(index).copied() else {
            continue;
        };
        if creature.is_chip()
            || creature.is_dead()
            || creature.is_moving()
            || !state.slip_list().contains(index)
        {
            continue;
        }
        let speed = rules.speed(creature.kind(), Motion::Forced);
        let _ = state.forced_move(index, speed, push, out_events);
    }
}

/// Sum of the tick counter and the stepping offset used by timing checks.
fn stepped_tick(state: &GameState) -> u32 {
    state.tick().wrapping_add(u32::from(state.stepping()))
}
