#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state for the Tile World engine.
//!
//! [`GameState`] owns the cell grid, the dense creature list, Chip's
//! possessions, the slip list and both random streams. It exposes the
//! mechanics primitives the ruleset engines are assembled from: probing and
//! starting moves, forced movement, arrival effects, teleports, button
//! wiring, cloning and end-of-tick housekeeping. Read access for renderers
//! and tests lives in [`query`].

mod cell;
mod creature;
mod housekeeping;
mod laws;
mod mechanics;
mod slip;

use tileworld_core::{
    Command, CreatureKind, Direction, Floor, LevelError, LevelSetup, Position, Prng, Ruleset,
    TickOutcome, Wiring, TICKS_PER_SECOND,
};

pub use cell::{Cell, CellFlags, Possessions};
pub use creature::{Creature, CreatureFlags};
pub use housekeeping::{InvariantDetail, InvariantPolicy, InvariantViolation};
pub use laws::{law, Law, LawClass};
pub use slip::SlipList;

/// Slot Chip occupies in the creature list.
pub const CHIP_INDEX: usize = 0;

/// Strength of a movement probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Probe {
    /// Answer the question without touching the state.
    Peek,
    /// Also turn hidden walls Chip bumps into into real walls.
    Reveal,
    /// Reveal, and push a block in the way at the given speed.
    Push(u8),
}

/// Values recorded alongside a solution that shape a level attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StartConditions {
    /// Seed of the main random stream.
    pub seed: u32,
    /// Initial direction latched for random slide floors under Lynx.
    pub random_slide_dir: Direction,
    /// Offset added to the tick counter for MS timing checks, in `0..8`.
    pub stepping: u8,
}

impl Default for StartConditions {
    fn default() -> Self {
        Self {
            seed: 0,
            random_slide_dir: Direction::North,
            stepping: 0,
        }
    }
}

/// Mutable state of one level attempt.
#[derive(Clone, Debug)]
pub struct GameState {
    ruleset: Ruleset,
    level_number: u16,
    hint: String,
    cells: Vec<Cell>,
    creatures: Vec<Creature>,
    slip: SlipList,
    possessions: Possessions,
    chips_needed: u16,
    time_limit: u32,
    tick: u32,
    stepping: u8,
    random_slide_dir: Direction,
    main: Prng,
    restart: Prng,
    traps: Vec<Wiring>,
    cloners: Vec<Wiring>,
    command: Command,
    marks: Vec<u32>,
    outcome: TickOutcome,
}

impl GameState {
    /// Builds the starting state of a level attempt.
    ///
    /// Chip always occupies [`CHIP_INDEX`]. Under MS the remaining creatures
    /// follow the spawn list order and creatures missing from the list never
    /// select moves of their own; under Lynx they follow reading order.
    pub fn new(
        setup: &LevelSetup,
        ruleset: Ruleset,
        start: StartConditions,
    ) -> Result<Self, LevelError> {
        let level = setup.decode()?;
        if !level.buried.is_empty() {
            tracing::debug!(
                level = setup.number,
                buried = level.buried.len(),
                "creatures in the bottom layer stay inert"
            );
        }

        let cells = level
            .floors
            .iter()
            .zip(level.unders.iter())
            .map(|(&floor, &under)| Cell::new(floor, under))
            .collect();

        let chip_facing = level
            .creatures
            .iter()
            .find(|placed| placed.kind == CreatureKind::Chip)
            .map_or(Direction::South, |placed| placed.facing);
        let others: Vec<_> = level
            .creatures
            .iter()
            .filter(|placed| placed.kind != CreatureKind::Chip)
            .collect();

        let mut creatures = Vec::with_capacity(level.creatures.len());
        creatures.push(Creature::new(level.chip, CreatureKind::Chip, chip_facing));

        match ruleset {
            Ruleset::Lynx => creatures.extend(
                others
                    .iter()
                    .map(|placed| Creature::new(placed.position, placed.kind, placed.facing)),
            ),
            Ruleset::Ms => {
                let mut listed = vec![false; others.len()];
                for position in &setup.creatures {
                    let found = others
                        .iter()
                        .enumerate()
                        .find(|(slot, placed)| !listed[*slot] && placed.position == *position);
                    if let Some((slot, placed)) = found {
                        listed[slot] = true;
                        creatures.push(Creature::new(placed.position, placed.kind, placed.facing));
                    }
                }
                for (slot, placed) in others.iter().enumerate() {
                    if listed[slot] {
                        continue;
                    }
                    let mut creature = Creature::new(placed.position, placed.kind, placed.facing);
                    if placed.kind != CreatureKind::Block {
                        creature.flags.insert(CreatureFlags::INERT);
                    }
                    creatures.push(creature);
                }
            }
        }

        tracing::debug!(
            level = setup.number,
            ruleset = ruleset.name(),
            creatures = creatures.len(),
            "level attempt started"
        );

        Ok(Self {
            ruleset,
            level_number: setup.number,
            hint: setup.hint.clone(),
            cells,
            creatures,
            slip: SlipList::default(),
            possessions: Possessions::default(),
            chips_needed: setup.chips_needed,
            time_limit: u32::from(setup.time_limit) * TICKS_PER_SECOND,
            tick: 0,
            stepping: start.stepping & 7,
            random_slide_dir: start.random_slide_dir,
            main: Prng::new(start.seed),
            restart: Prng::new(0),
            traps: setup.traps.clone(),
            cloners: setup.cloners.clone(),
            command: Command::Wait,
            marks: Vec::new(),
            outcome: TickOutcome::Continue,
        })
    }

    /// Ruleset whose movement laws apply.
    #[must_use]
    pub const fn ruleset(&self) -> Ruleset {
        self.ruleset
    }

    /// Number of the level being played.
    #[must_use]
    pub const fn level_number(&self) -> u16 {
        self.level_number
    }

    /// Ticks elapsed since the attempt started.
    #[must_use]
    pub const fn tick(&self) -> u32 {
        self.tick
    }

    /// Timing offset applied by MS decision gating.
    #[must_use]
    pub const fn stepping(&self) -> u8 {
        self.stepping
    }

    /// Computer chips still required to open sockets.
    #[must_use]
    pub const fn chips_needed(&self) -> u16 {
        self.chips_needed
    }

    /// Time limit in ticks; zero means untimed.
    #[must_use]
    pub const fn time_limit(&self) -> u32 {
        self.time_limit
    }

    /// Keys and boots held by Chip.
    #[must_use]
    pub const fn possessions(&self) -> &Possessions {
        &self.possessions
    }

    /// Outcome of the attempt so far.
    #[must_use]
    pub const fn outcome(&self) -> TickOutcome {
        self.outcome
    }

    /// Command supplied for the current tick.
    #[must_use]
    pub const fn command(&self) -> Command {
        self.command
    }

    /// Direction latched for the next random slide under Lynx.
    #[must_use]
    pub const fn random_slide_dir(&self) -> Direction {
        self.random_slide_dir
    }

    /// Ticks bookmarked with [`Command::Mark`].
    #[must_use]
    pub fn marks(&self) -> &[u32] {
        &self.marks
    }

    /// Cell at a grid position.
    #[must_use]
    pub fn cell(&self, position: Position) -> &Cell {
        &self.cells[position.index()]
    }

    /// Every cell in linear order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Every creature, dead ones included until housekeeping runs.
    #[must_use]
    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    /// Creature stored in a slot.
    #[must_use]
    pub fn creature(&self, index: usize) -> Option<&Creature> {
        self.creatures.get(index)
    }

    /// Chip, alive or dead.
    #[must_use]
    pub fn chip(&self) -> Option<&Creature> {
        self.creatures.get(CHIP_INDEX).filter(|creature| creature.is_chip())
    }

    /// Creatures under forced movement.
    #[must_use]
    pub const fn slip_list(&self) -> &SlipList {
        &self.slip
    }

    /// Main random stream, used by MS creature AI and random slides.
    #[must_use]
    pub const fn main_prng(&self) -> &Prng {
        &self.main
    }

    /// Mutable access to the main random stream.
    pub fn main_prng_mut(&mut self) -> &mut Prng {
        &mut self.main
    }

    /// Restart stream, reseeded with zero at every level start.
    #[must_use]
    pub const fn restart_prng(&self) -> &Prng {
        &self.restart
    }

    /// Mutable access to the restart stream.
    pub fn restart_prng_mut(&mut self) -> &mut Prng {
        &mut self.restart
    }

    /// First live creature standing on a cell.
    #[must_use]
    pub fn occupant(&self, position: Position) -> Option<usize> {
        self.creatures
            .iter()
            .position(|creature| !creature.is_dead() && creature.pos == position)
    }

    /// Reports whether a beartrap currently lets its occupant go.
    ///
    /// A trap is open while it is released by its button this tick, or while
    /// a creature has come to rest on any button wired to it.
    #[must_use]
    pub fn trap_open(&self, position: Position) -> bool {
        self.cell(position).flags().contains(CellFlags::RELEASED)
            || self
                .traps
                .iter()
                .filter(|wiring| wiring.target == position)
                .any(|wiring| {
                    self.creatures.iter().any(|creature| {
                        !creature.is_dead()
                            && !creature.is_moving()
                            && creature.pos == wiring.button
                    })
                })
    }

    /// Reports whether a creature is held by a closed beartrap.
    #[must_use]
    pub fn in_closed_trap(&self, index: usize) -> bool {
        let Some(creature) = self.creatures.get(index) else {
            return false;
        };
        self.cell(creature.pos).floor() == Floor::Beartrap
            && !creature.flags.contains(CreatureFlags::RELEASED)
            && !self.trap_open(creature.pos)
    }

    /// Records the direction a creature decided on.
    pub fn set_tdir(&mut self, index: usize, dir: Direction) {
        if let Some(creature) = self.creatures.get_mut(index) {
            creature.tdir = Some(dir);
        }
    }
}

/// Query functions that provide read-only access to the game state.
pub mod query {
    use serde::{Deserialize, Serialize};
    use tileworld_core::{CreatureKind, Direction, Floor, Position, Ruleset, TickOutcome};

    use super::{Cell, Creature, GameState};

    /// Complete, comparable picture of a game state.
    #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Snapshot {
        /// Ruleset in effect.
        pub ruleset: Ruleset,
        /// Ticks elapsed.
        pub tick: u32,
        /// Outcome so far.
        pub outcome: TickOutcome,
        /// Chips still required.
        pub chips_needed: u16,
        /// Whole seconds left, if the level is timed.
        pub seconds_left: Option<u32>,
        /// Key counts in red, blue, yellow, green order.
        pub keys: [u8; 4],
        /// Boot counts in ice, slide, fire, water order.
        pub boots: [u8; 4],
        /// Every cell in linear order.
        pub cells: Vec<Cell>,
        /// Live creatures in slot order.
        pub creatures: Vec<CreatureSnapshot>,
        /// Slots of slipping creatures in processing order.
        pub slipping: Vec<usize>,
        /// State of the main random stream.
        pub main_prng: u32,
        /// State of the restart stream.
        pub restart_prng: u32,
        /// Latched random slide direction.
        pub random_slide_dir: Direction,
    }

    /// Render-oriented view of one creature.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CreatureSnapshot {
        /// Slot in the creature list.
        pub slot: usize,
        /// Cell occupied or being entered.
        pub position: Position,
        /// Kind of creature.
        pub kind: CreatureKind,
        /// Facing.
        pub direction: Direction,
        /// Eighths of a tile already covered by the current move.
        pub offset: u8,
        /// Raw state bits.
        pub flags: u8,
    }

    impl CreatureSnapshot {
        fn capture(slot: usize, creature: &Creature) -> Self {
            Self {
                slot,
                position: creature.pos(),
                kind: creature.kind(),
                direction: creature.dir(),
                offset: creature.offset(),
                flags: creature.flags().bits(),
            }
        }
    }

    /// Captures everything that determines the future of the attempt.
    #[must_use]
    pub fn snapshot(state: &GameState) -> Snapshot {
        Snapshot {
            ruleset: state.ruleset,
            tick: state.tick,
            outcome: state.outcome,
            chips_needed: state.chips_needed,
            seconds_left: seconds_left(state),
            keys: state.possessions.key_counts(),
            boots: state.possessions.boot_counts(),
            cells: state.cells.clone(),
            creatures: state
                .creatures
                .iter()
                .enumerate()
                .filter(|(_, creature)| !creature.is_dead())
                .map(|(slot, creature)| CreatureSnapshot::capture(slot, creature))
                .collect(),
            slipping: state.slip.entries().to_vec(),
            main_prng: state.main.value(),
            restart_prng: state.restart.value(),
            random_slide_dir: state.random_slide_dir,
        }
    }

    /// Whole seconds remaining on the clock, rounded up, if the level is timed.
    #[must_use]
    pub fn seconds_left(state: &GameState) -> Option<u32> {
        if state.time_limit == 0 {
            return None;
        }
        let ticks = state.time_limit.saturating_sub(state.tick);
        Some(ticks.div_ceil(tileworld_core::TICKS_PER_SECOND))
    }

    /// Cell Chip stands on, if Chip is alive.
    #[must_use]
    pub fn chip_position(state: &GameState) -> Option<Position> {
        state
            .chip()
            .filter(|chip| !chip.is_dead())
            .map(Creature::pos)
    }

    /// Hint text to display while Chip stands on a hint button.
    #[must_use]
    pub fn active_hint(state: &GameState) -> Option<&str> {
        let chip = state.chip().filter(|chip| !chip.is_dead() && !chip.is_moving())?;
        (state.cell(chip.pos()).floor() == Floor::HintButton).then_some(state.hint.as_str())
    }

    /// Live creature standing on a cell.
    #[must_use]
    pub fn creature_at(state: &GameState, position: Position) -> Option<&Creature> {
        state
            .occupant(position)
            .and_then(|index| state.creatures.get(index))
    }
}
