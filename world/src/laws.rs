//! Static movement-law tables.
//!
//! Every floor carries three masks, one per creature class. The low nibble
//! lists the directions in which a creature may move *into* the floor and
//! the high nibble the directions in which it may move *out of* it, using
//! the direction bits north = 1, west = 2, south = 4, east = 8.

use tileworld_core::{CreatureKind, Direction, Floor, Ruleset};

const N: u8 = 0x1;
const W: u8 = 0x2;
const S: u8 = 0x4;
const E: u8 = 0x8;
const ALL: u8 = N | W | S | E;

const fn mask(enter: u8, exit: u8) -> u8 {
    (enter & ALL) | ((exit & ALL) << 4)
}

const OPEN: u8 = mask(ALL, ALL);
const SOLID: u8 = 0;
const EXIT_ONLY: u8 = mask(0, ALL);

/// Creature classes that share a movement-law column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LawClass {
    /// Chip.
    Chip,
    /// Pushable blocks.
    Block,
    /// Every monster.
    Creature,
}

impl LawClass {
    /// Column used by the given creature kind.
    #[must_use]
    pub const fn of(kind: CreatureKind) -> Self {
        match kind {
            CreatureKind::Chip => Self::Chip,
            CreatureKind::Block => Self::Block,
            _ => Self::Creature,
        }
    }
}

/// The three masks attached to one floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Law {
    chip: u8,
    block: u8,
    creature: u8,
}

impl Law {
    const fn uniform(bits: u8) -> Self {
        Self {
            chip: bits,
            block: bits,
            creature: bits,
        }
    }

    const fn split(chip: u8, block: u8, creature: u8) -> Self {
        Self {
            chip,
            block,
            creature,
        }
    }

    /// Raw mask for a creature class.
    #[must_use]
    pub const fn bits(self, class: LawClass) -> u8 {
        match class {
            LawClass::Chip => self.chip,
            LawClass::Block => self.block,
            LawClass::Creature => self.creature,
        }
    }

    /// Reports whether the class may move into the floor heading `dir`.
    #[must_use]
    pub const fn can_enter(self, class: LawClass, dir: Direction) -> bool {
        self.bits(class) & dir.bit() != 0
    }

    /// Reports whether the class may move out of the floor heading `dir`.
    #[must_use]
    pub const fn can_exit(self, class: LawClass, dir: Direction) -> bool {
        self.bits(class) & (dir.bit() << 4) != 0
    }
}

/// Thin wall along the given sides of the cell.
const fn walled(sides: u8) -> u8 {
    // Moving south enters through the north side, and so on.
    let blocked_entry =
        ((sides & N) << 2) | ((sides & S) >> 2) | ((sides & W) << 2) | ((sides & E) >> 2);
    mask(ALL & !blocked_entry, ALL & !sides)
}

/// Looks up the movement law of a floor under a ruleset.
#[must_use]
pub const fn law(ruleset: Ruleset, floor: Floor) -> Law {
    match ruleset {
        Ruleset::Ms => ms_law(floor),
        Ruleset::Lynx => lynx_law(floor),
    }
}

const fn ms_law(floor: Floor) -> Law {
    match floor {
        Floor::Empty
        | Floor::Ice
        | Floor::SlideNorth
        | Floor::SlideWest
        | Floor::SlideSouth
        | Floor::SlideEast
        | Floor::SlideRandom
        | Floor::Water
        | Floor::Fire
        | Floor::Bomb
        | Floor::Beartrap
        | Floor::ButtonBlue
        | Floor::ButtonGreen
        | Floor::ButtonRed
        | Floor::ButtonBrown
        | Floor::Teleport
        | Floor::SwitchWallOpen => Law::uniform(OPEN),

        Floor::Wall | Floor::HiddenWallPermanent | Floor::SwitchWallClosed => Law::uniform(SOLID),

        Floor::WallNorth => Law::uniform(walled(N)),
        Floor::WallWest => Law::uniform(walled(W)),
        Floor::WallSouth => Law::uniform(walled(S)),
        Floor::WallEast => Law::uniform(walled(E)),
        Floor::WallSoutheast => Law::uniform(walled(S | E)),
        Floor::IceWallNorthwest => Law::uniform(walled(N | W)),
        Floor::IceWallNortheast => Law::uniform(walled(N | E)),
        Floor::IceWallSouthwest => Law::uniform(walled(S | W)),
        Floor::IceWallSoutheast => Law::uniform(walled(S | E)),

        Floor::CloneMachine => Law::uniform(EXIT_ONLY),

        Floor::Gravel | Floor::Thief | Floor::HintButton => Law::split(OPEN, OPEN, SOLID),
        Floor::KeyRed | Floor::KeyBlue | Floor::KeyYellow | Floor::KeyGreen => {
            Law::split(OPEN, OPEN, SOLID)
        }

        Floor::HiddenWallTemporary
        | Floor::BlueWallReal
        | Floor::BlueWallFake
        | Floor::PopupWall
        | Floor::Dirt
        | Floor::DoorRed
        | Floor::DoorBlue
        | Floor::DoorYellow
        | Floor::DoorGreen
        | Floor::Socket
        | Floor::Exit
        | Floor::IcChip
        | Floor::BootsIce
        | Floor::BootsSlide
        | Floor::BootsFire
        | Floor::BootsWater => Law::split(OPEN, SOLID, SOLID),
    }
}

const fn lynx_law(floor: Floor) -> Law {
    match floor {
        Floor::KeyRed | Floor::KeyBlue | Floor::KeyYellow | Floor::KeyGreen => Law::uniform(OPEN),
        Floor::HintButton => Law::uniform(OPEN),
        Floor::Fire => Law::split(OPEN, SOLID, OPEN),
        other => ms_law(other),
    }
}
