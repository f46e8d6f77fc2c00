#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tile World engine.
//!
//! This crate defines the vocabulary that connects level loading, the
//! authoritative game state, the ruleset engines and the solution codec.
//! Callers feed one [`Command`] per tick into a ruleset engine, the engine
//! mutates the game state and reports a [`TickOutcome`] together with a
//! stream of [`Event`] values that presentation layers may react to.

pub mod level;
pub mod prng;
pub mod tiles;

use serde::{Deserialize, Serialize};

pub use level::{
    compress_layer, decompress_layer, DecodedLevel, Layer, LevelBuilder, LevelError, LevelSetup,
    PlacedCreature, Wiring,
};
pub use prng::Prng;
pub use tiles::{BootKind, CreatureKind, Floor, KeyColor, TileCode};

/// Number of tile columns in every level.
pub const GRID_WIDTH: u16 = 32;

/// Number of tile rows in every level.
pub const GRID_HEIGHT: u16 = 32;

/// Total number of cells in a level grid.
pub const GRID_CELLS: usize = GRID_WIDTH as usize * GRID_HEIGHT as usize;

/// Simulation ticks that make up one second of game time.
pub const TICKS_PER_SECOND: u32 = 20;

/// Sub-tile steps a creature travels through while crossing one tile.
pub const MOVE_EIGHTHS: u8 = 8;

/// The two historical rule implementations understood by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ruleset {
    /// Rules of the Atari Lynx original.
    Lynx,
    /// Rules of the Microsoft Windows port.
    Ms,
}

impl Ruleset {
    /// Identifier stored in solution file headers.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Lynx => 1,
            Self::Ms => 2,
        }
    }

    /// Resolves a ruleset from its solution file identifier.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Lynx),
            2 => Some(Self::Ms),
            _ => None,
        }
    }

    /// Human readable ruleset name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lynx => "lynx",
            Self::Ms => "ms",
        }
    }
}

/// Cardinal directions in the order used by recorded move lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward decreasing column indices.
    West,
    /// Toward increasing row indices.
    South,
    /// Toward increasing column indices.
    East,
}

impl Direction {
    /// All directions in index order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::West,
        Direction::South,
        Direction::East,
    ];

    /// Zero-based index used by the move-list wire format.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::North => 0,
            Self::West => 1,
            Self::South => 2,
            Self::East => 3,
        }
    }

    /// Resolves a direction from its wire index.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::North),
            1 => Some(Self::West),
            2 => Some(Self::South),
            3 => Some(Self::East),
            _ => None,
        }
    }

    /// Bit value used inside movement-law masks.
    #[must_use]
    pub const fn bit(self) -> u8 {
        1 << self.index()
    }

    /// Direction after a quarter turn counter-clockwise.
    #[must_use]
    pub const fn left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    /// Direction after a quarter turn clockwise.
    #[must_use]
    pub const fn right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// Opposite direction.
    #[must_use]
    pub const fn back(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::West => Self::East,
            Self::South => Self::North,
            Self::East => Self::West,
        }
    }

    /// Reports whether the direction runs along the vertical axis.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::North | Self::South)
    }
}

/// Location of a single grid cell stored as its linear index `y * 32 + x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Position(u16);

impl TryFrom<u16> for Position {
    type Error = String;

    fn try_from(index: u16) -> Result<Self, Self::Error> {
        Self::new(index).ok_or_else(|| format!("cell index {index} lies outside the 32x32 grid"))
    }
}

impl From<Position> for u16 {
    fn from(position: Position) -> Self {
        position.0
    }
}

impl Position {
    /// Creates a position from a linear index, rejecting indices off the grid.
    #[must_use]
    pub const fn new(index: u16) -> Option<Self> {
        if (index as usize) < GRID_CELLS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Creates a position from column and row coordinates.
    #[must_use]
    pub const fn from_xy(x: u16, y: u16) -> Option<Self> {
        if x < GRID_WIDTH && y < GRID_HEIGHT {
            Some(Self(y * GRID_WIDTH + x))
        } else {
            None
        }
    }

    /// Linear index of the cell.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw linear index as stored in level data.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(self) -> u16 {
        self.0 % GRID_WIDTH
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn y(self) -> u16 {
        self.0 / GRID_WIDTH
    }

    /// Neighbouring cell in the given direction, if it lies on the grid.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Option<Self> {
        let x = self.x();
        let y = self.y();
        match direction {
            Direction::North if y > 0 => Some(Self(self.0 - GRID_WIDTH)),
            Direction::West if x > 0 => Some(Self(self.0 - 1)),
            Direction::South if y + 1 < GRID_HEIGHT => Some(Self(self.0 + GRID_WIDTH)),
            Direction::East if x + 1 < GRID_WIDTH => Some(Self(self.0 + 1)),
            _ => None,
        }
    }

    /// Previous cell in linear order, wrapping from the first cell to the last.
    #[must_use]
    pub const fn previous_wrapping(self) -> Self {
        if self.0 == 0 {
            Self(GRID_CELLS as u16 - 1)
        } else {
            Self(self.0 - 1)
        }
    }
}

/// One input command supplied to the engine per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// No directional input this tick.
    #[default]
    Wait,
    /// Request that Chip move in the given direction.
    Move(Direction),
    /// Emit a diagnostic dump of the game state.
    DebugDump,
    /// Remember the current tick as a bookmark.
    Mark,
}

impl Command {
    /// Direction carried by the command, if any.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Move(direction) => Some(direction),
            _ => None,
        }
    }
}

/// Reasons Chip can fail a level attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// Chip entered water without flippers.
    Drowned,
    /// Chip entered fire without fire boots.
    Burned,
    /// Chip stepped on a bomb.
    Bombed,
    /// Chip and a creature of the given kind ended up on the same tile.
    Collided(CreatureKind),
    /// The level's time limit ran out.
    OutOfTime,
}

/// Result of advancing a game by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickOutcome {
    /// The level is still in progress.
    Continue,
    /// Chip reached the exit.
    Completed,
    /// Chip died.
    Died(DeathCause),
}

impl TickOutcome {
    /// Reports whether the outcome ends the level attempt.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// Presentation cues fired by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Chip picked up a computer chip.
    ChipCollected,
    /// Chip picked up a key or boots.
    ItemCollected,
    /// A door or socket opened.
    DoorOpened,
    /// Chip bumped into something that would not budge.
    Bump,
    /// A creature pushed or was blocked by a block.
    BlockMoved,
    /// A button was pressed.
    ButtonPressed,
    /// A creature was teleported.
    Teleported,
    /// Something fell into water.
    Splash,
    /// A bomb went off.
    Explosion,
    /// Something burned up.
    Burn,
    /// A hidden wall was revealed.
    WallRevealed,
    /// The thief took Chip's boots.
    Thief,
    /// A creature was caught in a beartrap.
    Trapped,
    /// A cloning machine produced a copy.
    Cloned,
    /// Chip stepped on a hint button.
    Hint,
    /// Chip reached the exit.
    Exit,
    /// Chip died.
    ChipDeath,
}

impl SoundEffect {
    /// Stable key that presentation layers map to audio samples.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ChipCollected => "chip-collected",
            Self::ItemCollected => "item-collected",
            Self::DoorOpened => "door-opened",
            Self::Bump => "bump",
            Self::BlockMoved => "block-moved",
            Self::ButtonPressed => "button-pressed",
            Self::Teleported => "teleport",
            Self::Splash => "splash",
            Self::Explosion => "explosion",
            Self::Burn => "burn",
            Self::WallRevealed => "wall-revealed",
            Self::Thief => "thief",
            Self::Trapped => "trapped",
            Self::Cloned => "cloned",
            Self::Hint => "hint",
            Self::Exit => "exit",
            Self::ChipDeath => "chip-death",
        }
    }
}

/// Events broadcast by the engine while advancing a tick.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// A creature started moving between two cells.
    CreatureMoved {
        /// Slot of the creature in the creature list at the time of the move.
        slot: usize,
        /// Kind of the creature that moved.
        kind: CreatureKind,
        /// Cell the creature left.
        from: Position,
        /// Cell the creature is moving into.
        to: Position,
        /// Direction of travel.
        direction: Direction,
    },
    /// A creature was relocated by a teleport.
    CreatureTeleported {
        /// Slot of the creature in the creature list.
        slot: usize,
        /// Teleport the creature entered.
        from: Position,
        /// Teleport the creature emerged from.
        to: Position,
    },
    /// A cloning machine produced a new creature.
    CreatureCloned {
        /// Slot assigned to the copy.
        slot: usize,
        /// Kind of the copied creature.
        kind: CreatureKind,
        /// Location of the cloning machine.
        at: Position,
    },
    /// A non-Chip creature was destroyed.
    CreatureDied {
        /// Slot of the creature in the creature list.
        slot: usize,
        /// Kind of the creature that died.
        kind: CreatureKind,
        /// Cell where the creature died.
        at: Position,
    },
    /// Chip died.
    ChipDied {
        /// Reason for the death.
        cause: DeathCause,
    },
    /// Chip reached the exit.
    LevelCompleted,
    /// A presentation cue fired.
    Sound {
        /// Effect that fired.
        effect: SoundEffect,
    },
    /// The player bookmarked the current tick.
    Marked {
        /// Tick that was bookmarked.
        tick: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::{Direction, Position, Ruleset, TickOutcome, GRID_CELLS};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn rotations_are_consistent() {
        for direction in Direction::ALL {
            assert_eq!(direction.left().right(), direction);
            assert_eq!(direction.back().back(), direction);
            assert_eq!(direction.right().right(), direction.back());
            assert_eq!(Direction::from_index(direction.index()), Some(direction));
        }
    }

    #[test]
    fn stepping_off_the_grid_is_rejected() {
        let corner = Position::from_xy(0, 0).expect("corner");
        assert_eq!(corner.step(Direction::North), None);
        assert_eq!(corner.step(Direction::West), None);
        assert_eq!(
            corner.step(Direction::East),
            Position::from_xy(1, 0),
            "east of the corner"
        );

        let last = Position::new((GRID_CELLS - 1) as u16).expect("last");
        assert_eq!(last.step(Direction::South), None);
        assert_eq!(last.step(Direction::East), None);
        assert_eq!(corner.previous_wrapping(), last);
    }

    #[test]
    fn position_rejects_out_of_range_index() {
        assert!(Position::new(GRID_CELLS as u16).is_none());
        assert!(Position::from_xy(32, 0).is_none());
    }

    #[test]
    fn ruleset_ids_match_solution_headers() {
        assert_eq!(Ruleset::from_id(Ruleset::Lynx.id()), Some(Ruleset::Lynx));
        assert_eq!(Ruleset::from_id(Ruleset::Ms.id()), Some(Ruleset::Ms));
        assert_eq!(Ruleset::from_id(0), None);
    }

    #[test]
    fn contracts_round_trip_through_bincode() {
        assert_round_trip(&Position::from_xy(5, 7).expect("position"));
        assert_round_trip(&TickOutcome::Died(super::DeathCause::Collided(
            super::CreatureKind::Teeth,
        )));
    }
}
