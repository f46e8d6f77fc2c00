//! Creature records stored in the dense creature list.

use serde::{Deserialize, Serialize};
use tileworld_core::{CreatureKind, Direction, Position, MOVE_EIGHTHS};

/// Per-creature state bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreatureFlags(u8);

impl CreatureFlags {
    /// May leave a trap or cloning machine during the current tick.
    pub const RELEASED: Self = Self(0x01);
    /// Produced by a cloning machine.
    pub const CLONE: Self = Self(0x02);
    /// Destroyed; removed during end-of-tick housekeeping.
    pub const DEAD: Self = Self(0x04);
    /// Chip may make one voluntary move off a slide floor.
    pub const SLIDE_TOKEN: Self = Self(0x08);
    /// Never selects a move of its own.
    pub const INERT: Self = Self(0x10);
    /// The move in progress was forced by the floor.
    pub const SLIDING: Self = Self(0x20);

    /// Set with no bits.
    pub const EMPTY: Self = Self(0);

    /// Raw bit pattern.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Reports whether every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the bits of `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears the bits of `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

/// A single entity on the map, including Chip and blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Creature {
    pub(crate) pos: Position,
    pub(crate) kind: CreatureKind,
    pub(crate) dir: Direction,
    pub(crate) fdir: Direction,
    pub(crate) tdir: Option<Direction>,
    pub(crate) moving: u8,
    pub(crate) speed: u8,
    pub(crate) flags: CreatureFlags,
}

impl Creature {
    /// Creates a creature at rest.
    #[must_use]
    pub const fn new(pos: Position, kind: CreatureKind, dir: Direction) -> Self {
        Self {
            pos,
            kind,
            dir,
            fdir: dir,
            tdir: None,
            moving: 0,
            speed: 0,
            flags: CreatureFlags::EMPTY,
        }
    }

    /// Cell the creature occupies, or is moving into.
    #[must_use]
    pub const fn pos(&self) -> Position {
        self.pos
    }

    /// Kind of the creature.
    #[must_use]
    pub const fn kind(&self) -> CreatureKind {
        self.kind
    }

    /// Current facing.
    #[must_use]
    pub const fn dir(&self) -> Direction {
        self.dir
    }

    /// Direction the floor pushes the creature in while it is slipping.
    #[must_use]
    pub const fn fdir(&self) -> Direction {
        self.fdir
    }

    /// Direction chosen during the last decision, if any.
    #[must_use]
    pub const fn tdir(&self) -> Option<Direction> {
        self.tdir
    }

    /// Remaining eighths of a tile before the move in progress completes.
    #[must_use]
    pub const fn moving(&self) -> u8 {
        self.moving
    }

    /// Eighths of a tile covered per tick by the move in progress.
    #[must_use]
    pub const fn speed(&self) -> u8 {
        self.speed
    }

    /// State bits.
    #[must_use]
    pub const fn flags(&self) -> CreatureFlags {
        self.flags
    }

    /// Reports whether the creature has been destroyed.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.flags.contains(CreatureFlags::DEAD)
    }

    /// Reports whether the creature is between two cells.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.moving > 0
    }

    /// Reports whether this is Chip.
    #[must_use]
    pub const fn is_chip(&self) -> bool {
        matches!(self.kind, CreatureKind::Chip)
    }

    /// Eighths of a tile already covered, for smooth rendering.
    #[must_use]
    pub const fn offset(&self) -> u8 {
        if self.moving == 0 {
            0
        } else {
            MOVE_EIGHTHS - self.moving
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Creature, CreatureFlags};
    use tileworld_core::{CreatureKind, Direction, Position};

    #[test]
    fn new_creatures_rest_with_matching_forced_direction() {
        let position = Position::from_xy(4, 4).expect("position");
        let creature = Creature::new(position, CreatureKind::Glider, Direction::West);
        assert_eq!(creature.fdir(), Direction::West);
        assert!(!creature.is_moving());
        assert_eq!(creature.offset(), 0);
        assert_eq!(creature.flags(), CreatureFlags::EMPTY);
    }

    #[test]
    fn flag_bits_do_not_overlap() {
        let all = [
            CreatureFlags::RELEASED,
            CreatureFlags::CLONE,
            CreatureFlags::DEAD,
            CreatureFlags::SLIDE_TOKEN,
            CreatureFlags::INERT,
            CreatureFlags::SLIDING,
        ];
        let mut combined = CreatureFlags::EMPTY;
        for flag in all {
            assert!(!combined.contains(flag));
            combined.insert(flag);
        }
        assert_eq!(combined.bits(), 0x3F);
    }
}
