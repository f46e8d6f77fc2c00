//! Per-cell map state and Chip's inventory.

use serde::{Deserialize, Serialize};
use tileworld_core::{BootKind, Floor, KeyColor};

/// Small set of per-cell state bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellFlags(u8);

impl CellFlags {
    /// A cloning machine was activated and clones at the next matching tick.
    pub const PRIMED: Self = Self(0x01);
    /// A beartrap was released by its button and opens at the next tick.
    pub const RELEASE_PENDING: Self = Self(0x02);
    /// A beartrap is open for the current tick.
    pub const RELEASED: Self = Self(0x04);

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

    /// Reports whether no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
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

/// State of one grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    floor: Floor,
    under: Floor,
    flags: CellFlags,
}

impl Cell {
    /// Creates a cell from its visible and hidden floors.
    #[must_use]
    pub const fn new(floor: Floor, under: Floor) -> Self {
        Self {
            floor,
            under,
            flags: CellFlags::EMPTY,
        }
    }

    /// Floor creatures currently interact with.
    #[must_use]
    pub const fn floor(&self) -> Floor {
        self.floor
    }

    /// Floor revealed once the visible one is consumed.
    #[must_use]
    pub const fn under(&self) -> Floor {
        self.under
    }

    /// State bits of the cell.
    #[must_use]
    pub const fn flags(&self) -> CellFlags {
        self.flags
    }

    pub(crate) fn set_floor(&mut self, floor: Floor) {
        self.floor = floor;
    }

    pub(crate) fn flags_mut(&mut self) -> &mut CellFlags {
        &mut self.flags
    }

    /// Removes the visible floor, exposing the one beneath.
    pub(crate) fn pop(&mut self) {
        self.floor = self.under;
        self.under = Floor::Empty;
    }

    /// Swaps open and closed switch walls on both layers.
    pub(crate) fn toggle_switch_walls(&mut self) {
        self.floor = toggled(self.floor);
        self.under = toggled(self.under);
    }
}

const fn toggled(floor: Floor) -> Floor {
    match floor {
        Floor::SwitchWallOpen => Floor::SwitchWallClosed,
        Floor::SwitchWallClosed => Floor::SwitchWallOpen,
        other => other,
    }
}

/// Keys and boots carried by Chip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Possessions {
    keys: [u8; 4],
    boots: [u8; 4],
}

impl Possessions {
    /// Number of keys of the given colour.
    #[must_use]
    pub const fn keys(&self, color: KeyColor) -> u8 {
        self.keys[color.index()]
    }

    /// Reports whether Chip wears the given boots.
    #[must_use]
    pub const fn has_boots(&self, kind: BootKind) -> bool {
        self.boots[kind.index()] > 0
    }

    /// Raw key counts in red, blue, yellow, green order.
    #[must_use]
    pub const fn key_counts(&self) -> [u8; 4] {
        self.keys
    }

    /// Raw boot counts in ice, slide, fire, water order.
    #[must_use]
    pub const fn boot_counts(&self) -> [u8; 4] {
        self.boots
    }

    pub(crate) fn add_key(&mut self, color: KeyColor) {
        let slot = &mut self.keys[color.index()];
        *slot = slot.saturating_add(1);
    }

    /// Uses up a key; green keys are never consumed.
    pub(crate) fn use_key(&mut self, color: KeyColor) {
        if color != KeyColor::Green {
            let slot = &mut self.keys[color.index()];
            *slot = slot.saturating_sub(1);
        }
    }

    pub(crate) fn add_boots(&mut self, kind: BootKind) {
        self.boots[kind.index()] = 1;
    }

    pub(crate) fn clear_boots(&mut self) {
        self.boots = [0; 4];
    }
}
