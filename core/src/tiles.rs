//! Floor and creature identifiers plus the raw map byte-code table.

use serde::{Deserialize, Serialize};

use crate::Direction;

/// Colour of a key or the door it opens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyColor {
    /// Red key or door.
    Red,
    /// Blue key or door.
    Blue,
    /// Yellow key or door.
    Yellow,
    /// Green key or door. Green keys are never used up.
    Green,
}

impl KeyColor {
    /// Slot of the colour inside possession counters.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Blue => 1,
            Self::Yellow => 2,
            Self::Green => 3,
        }
    }
}

/// Kind of protective footwear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BootKind {
    /// Ice skates: no sliding on ice.
    Ice,
    /// Suction boots: no sliding on slide floors.
    Slide,
    /// Fire boots: safe passage through fire.
    Fire,
    /// Flippers: safe passage through water.
    Water,
}

impl BootKind {
    /// Slot of the boots inside possession counters.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Ice => 0,
            Self::Slide => 1,
            Self::Fire => 2,
            Self::Water => 3,
        }
    }
}

/// Static floor variants a cell can hold.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Floor {
    Empty,
    Wall,
    HiddenWallPermanent,
    HiddenWallTemporary,
    BlueWallReal,
    BlueWallFake,
    WallNorth,
    WallWest,
    WallSouth,
    WallEast,
    WallSoutheast,
    Ice,
    IceWallNorthwest,
    IceWallNortheast,
    IceWallSouthwest,
    IceWallSoutheast,
    SlideNorth,
    SlideWest,
    SlideSouth,
    SlideEast,
    SlideRandom,
    Gravel,
    Dirt,
    Water,
    Fire,
    Bomb,
    Beartrap,
    Thief,
    HintButton,
    ButtonBlue,
    ButtonGreen,
    ButtonRed,
    ButtonBrown,
    Teleport,
    SwitchWallOpen,
    SwitchWallClosed,
    PopupWall,
    CloneMachine,
    DoorRed,
    DoorBlue,
    DoorYellow,
    DoorGreen,
    Socket,
    Exit,
    IcChip,
    KeyRed,
    KeyBlue,
    KeyYellow,
    KeyGreen,
    BootsIce,
    BootsSlide,
    BootsFire,
    BootsWater,
}

impl Floor {
    /// Every floor variant in declaration order.
    pub const ALL: [Floor; 53] = [
        Floor::Empty,
        Floor::Wall,
        Floor::HiddenWallPermanent,
        Floor::HiddenWallTemporary,
        Floor::BlueWallReal,
        Floor::BlueWallFake,
        Floor::WallNorth,
        Floor::WallWest,
        Floor::WallSouth,
        Floor::WallEast,
        Floor::WallSoutheast,
        Floor::Ice,
        Floor::IceWallNorthwest,
        Floor::IceWallNortheast,
        Floor::IceWallSouthwest,
        Floor::IceWallSoutheast,
        Floor::SlideNorth,
        Floor::SlideWest,
        Floor::SlideSouth,
        Floor::SlideEast,
        Floor::SlideRandom,
        Floor::Gravel,
        Floor::Dirt,
        Floor::Water,
        Floor::Fire,
        Floor::Bomb,
        Floor::Beartrap,
        Floor::Thief,
        Floor::HintButton,
        Floor::ButtonBlue,
        Floor::ButtonGreen,
        Floor::ButtonRed,
        Floor::ButtonBrown,
        Floor::Teleport,
        Floor::SwitchWallOpen,
        Floor::SwitchWallClosed,
        Floor::PopupWall,
        Floor::CloneMachine,
        Floor::DoorRed,
        Floor::DoorBlue,
        Floor::DoorYellow,
        Floor::DoorGreen,
        Floor::Socket,
        Floor::Exit,
        Floor::IcChip,
        Floor::KeyRed,
        Floor::KeyBlue,
        Floor::KeyYellow,
        Floor::KeyGreen,
        Floor::BootsIce,
        Floor::BootsSlide,
        Floor::BootsFire,
        Floor::BootsWater,
    ];

    /// Plain ice or one of the ice corners.
    #[must_use]
    pub const fn is_ice(self) -> bool {
        matches!(
            self,
            Self::Ice
                | Self::IceWallNorthwest
                | Self::IceWallNortheast
                | Self::IceWallSouthwest
                | Self::IceWallSoutheast
        )
    }

    /// One of the directional or random slide floors.
    #[must_use]
    pub const fn is_slide(self) -> bool {
        matches!(
            self,
            Self::SlideNorth
                | Self::SlideWest
                | Self::SlideSouth
                | Self::SlideEast
                | Self::SlideRandom
        )
    }

    /// Fixed push direction of a directional slide floor.
    #[must_use]
    pub const fn slide_direction(self) -> Option<Direction> {
        match self {
            Self::SlideNorth => Some(Direction::North),
            Self::SlideWest => Some(Direction::West),
            Self::SlideSouth => Some(Direction::South),
            Self::SlideEast => Some(Direction::East),
            _ => None,
        }
    }

    /// Door colour, if the floor is a door.
    #[must_use]
    pub const fn door(self) -> Option<KeyColor> {
        match self {
            Self::DoorRed => Some(KeyColor::Red),
            Self::DoorBlue => Some(KeyColor::Blue),
            Self::DoorYellow => Some(KeyColor::Yellow),
            Self::DoorGreen => Some(KeyColor::Green),
            _ => None,
        }
    }

    /// Key colour, if the floor holds a key.
    #[must_use]
    pub const fn key(self) -> Option<KeyColor> {
        match self {
            Self::KeyRed => Some(KeyColor::Red),
            Self::KeyBlue => Some(KeyColor::Blue),
            Self::KeyYellow => Some(KeyColor::Yellow),
            Self::KeyGreen => Some(KeyColor::Green),
            _ => None,
        }
    }

    /// Boot kind, if the floor holds a pair of boots.
    #[must_use]
    pub const fn boots(self) -> Option<BootKind> {
        match self {
            Self::BootsIce => Some(BootKind::Ice),
            Self::BootsSlide => Some(BootKind::Slide),
            Self::BootsFire => Some(BootKind::Fire),
            Self::BootsWater => Some(BootKind::Water),
            _ => None,
        }
    }

    /// Any of the four coloured buttons.
    #[must_use]
    pub const fn is_button(self) -> bool {
        matches!(
            self,
            Self::ButtonBlue | Self::ButtonGreen | Self::ButtonRed | Self::ButtonBrown
        )
    }

    /// Direction a creature entering an ice corner is turned to.
    ///
    /// Returns `None` for floors that never deflect and for approach
    /// directions that leave the heading unchanged.
    #[must_use]
    pub const fn ice_deflection(self, heading: Direction) -> Option<Direction> {
        match (self, heading) {
            (Self::IceWallNorthwest, Direction::North) => Some(Direction::East),
            (Self::IceWallNorthwest, Direction::West) => Some(Direction::South),
            (Self::IceWallNortheast, Direction::North) => Some(Direction::West),
            (Self::IceWallNortheast, Direction::East) => Some(Direction::South),
            (Self::IceWallSouthwest, Direction::South) => Some(Direction::East),
            (Self::IceWallSouthwest, Direction::West) => Some(Direction::North),
            (Self::IceWallSoutheast, Direction::South) => Some(Direction::West),
            (Self::IceWallSoutheast, Direction::East) => Some(Direction::North),
            _ => None,
        }
    }

    /// Map byte that encodes the floor in the top or bottom layer.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Empty => 0x00,
            Self::Wall => 0x01,
            Self::IcChip => 0x02,
            Self::Water => 0x03,
            Self::Fire => 0x04,
            Self::HiddenWallPermanent => 0x05,
            Self::WallNorth => 0x06,
            Self::WallWest => 0x07,
            Self::WallSouth => 0x08,
            Self::WallEast => 0x09,
            Self::Dirt => 0x0B,
            Self::Ice => 0x0C,
            Self::SlideSouth => 0x0D,
            Self::SlideNorth => 0x12,
            Self::SlideEast => 0x13,
            Self::SlideWest => 0x14,
            Self::Exit => 0x15,
            Self::DoorBlue => 0x16,
            Self::DoorRed => 0x17,
            Self::DoorGreen => 0x18,
            Self::DoorYellow => 0x19,
            Self::IceWallSoutheast => 0x1A,
            Self::IceWallSouthwest => 0x1B,
            Self::IceWallNorthwest => 0x1C,
            Self::IceWallNortheast => 0x1D,
            Self::BlueWallFake => 0x1E,
            Self::BlueWallReal => 0x1F,
            Self::Thief => 0x21,
            Self::Socket => 0x22,
            Self::ButtonGreen => 0x23,
            Self::ButtonRed => 0x24,
            Self::SwitchWallClosed => 0x25,
            Self::SwitchWallOpen => 0x26,
            Self::ButtonBrown => 0x27,
            Self::ButtonBlue => 0x28,
            Self::Teleport => 0x29,
            Self::Bomb => 0x2A,
            Self::Beartrap => 0x2B,
            Self::HiddenWallTemporary => 0x2C,
            Self::Gravel => 0x2D,
            Self::PopupWall => 0x2E,
            Self::HintButton => 0x2F,
            Self::WallSoutheast => 0x30,
            Self::CloneMachine => 0x31,
            Self::SlideRandom => 0x32,
            Self::KeyBlue => 0x64,
            Self::KeyRed => 0x65,
            Self::KeyGreen => 0x66,
            Self::KeyYellow => 0x67,
            Self::BootsWater => 0x68,
            Self::BootsFire => 0x69,
            Self::BootsIce => 0x6A,
            Self::BootsSlide => 0x6B,
        }
    }
}

/// Kinds of mobile objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CreatureKind {
    /// The player.
    Chip,
    /// A pushable block.
    Block,
    /// Drives straight ahead; reversed by blue buttons.
    Tank,
    /// Bounces back and forth.
    Ball,
    /// Turns left when blocked; flies over water.
    Glider,
    /// Turns right when blocked; walks through fire.
    Fireball,
    /// Walks straight and turns randomly when blocked.
    Walker,
    /// Moves in a random direction every step.
    Blob,
    /// Chases Chip.
    Teeth,
    /// Follows the wall on its left.
    Bug,
    /// Follows the wall on its right.
    Paramecium,
}

impl CreatureKind {
    /// Base map byte of the creature facing north; the other facings follow
    /// in west, south, east order.
    #[must_use]
    pub const fn base_code(self) -> u8 {
        match self {
            Self::Chip => 0x6C,
            Self::Block => 0x0E,
            Self::Bug => 0x40,
            Self::Fireball => 0x44,
            Self::Ball => 0x48,
            Self::Tank => 0x4C,
            Self::Glider => 0x50,
            Self::Teeth => 0x54,
            Self::Walker => 0x58,
            Self::Blob => 0x5C,
            Self::Paramecium => 0x60,
        }
    }

    /// Map byte encoding the creature with the given facing.
    #[must_use]
    pub const fn code(self, facing: Direction) -> u8 {
        self.base_code() + facing.index()
    }
}

/// Meaning of a single raw map byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileCode {
    /// A static floor.
    Floor(Floor),
    /// A creature with its initial facing.
    Creature(CreatureKind, Direction),
}

/// Decodes a raw map byte.
///
/// Returns `None` for bytes with no defined meaning.
#[must_use]
pub const fn decode_tile(code: u8) -> Option<TileCode> {
    let floor = match code {
        0x00 => Floor::Empty,
        0x01 => Floor::Wall,
        0x02 => Floor::IcChip,
        0x03 | 0x33 => Floor::Water,
        0x04 | 0x34 | 0x35 => Floor::Fire,
        0x05 => Floor::HiddenWallPermanent,
        0x06 => Floor::WallNorth,
        0x07 => Floor::WallWest,
        0x08 => Floor::WallSouth,
        0x09 => Floor::WallEast,
        0x0A => return Some(TileCode::Creature(CreatureKind::Block, Direction::North)),
        0x0B => Floor::Dirt,
        0x0C => Floor::Ice,
        0x0D => Floor::SlideSouth,
        0x0E..=0x11 => {
            return creature_code(CreatureKind::Block, code - 0x0E);
        }
        0x12 => Floor::SlideNorth,
        0x13 => Floor::SlideEast,
        0x14 => Floor::SlideWest,
        0x15 | 0x39 | 0x3A | 0x3B => Floor::Exit,
        0x16 => Floor::DoorBlue,
        0x17 => Floor::DoorRed,
        0x18 => Floor::DoorGreen,
        0x19 => Floor::DoorYellow,
        0x1A => Floor::IceWallSoutheast,
        0x1B => Floor::IceWallSouthwest,
        0x1C => Floor::IceWallNorthwest,
        0x1D => Floor::IceWallNortheast,
        0x1E => Floor::BlueWallFake,
        0x1F => Floor::BlueWallReal,
        0x21 => Floor::Thief,
        0x22 => Floor::Socket,
        0x23 => Floor::ButtonGreen,
        0x24 => Floor::ButtonRed,
        0x25 => Floor::SwitchWallClosed,
        0x26 => Floor::SwitchWallOpen,
        0x27 => Floor::ButtonBrown,
        0x28 => Floor::ButtonBlue,
        0x29 => Floor::Teleport,
        0x2A => Floor::Bomb,
        0x2B => Floor::Beartrap,
        0x2C => Floor::HiddenWallTemporary,
        0x2D => Floor::Gravel,
        0x2E => Floor::PopupWall,
        0x2F => Floor::HintButton,
        0x30 => Floor::WallSoutheast,
        0x31 => Floor::CloneMachine,
        0x32 => Floor::SlideRandom,
        // Swimming Chip.
        0x3C..=0x3F => return creature_code(CreatureKind::Chip, code - 0x3C),
        0x40..=0x43 => return creature_code(CreatureKind::Bug, code - 0x40),
        0x44..=0x47 => return creature_code(CreatureKind::Fireball, code - 0x44),
        0x48..=0x4B => return creature_code(CreatureKind::Ball, code - 0x48),
        0x4C..=0x4F => return creature_code(CreatureKind::Tank, code - 0x4C),
        0x50..=0x53 => return creature_code(CreatureKind::Glider, code - 0x50),
        0x54..=0x57 => return creature_code(CreatureKind::Teeth, code - 0x54),
        0x58..=0x5B => return creature_code(CreatureKind::Walker, code - 0x58),
        0x5C..=0x5F => return creature_code(CreatureKind::Blob, code - 0x5C),
        0x60..=0x63 => return creature_code(CreatureKind::Paramecium, code - 0x60),
        0x64 => Floor::KeyBlue,
        0x65 => Floor::KeyRed,
        0x66 => Floor::KeyGreen,
        0x67 => Floor::KeyYellow,
        0x68 => Floor::BootsWater,
        0x69 => Floor::BootsFire,
        0x6A => Floor::BootsIce,
        0x6B => Floor::BootsSlide,
        0x6C..=0x6F => return creature_code(CreatureKind::Chip, code - 0x6C),
        _ => return None,
    };
    Some(TileCode::Floor(floor))
}

const fn creature_code(kind: CreatureKind, facing: u8) -> Option<TileCode> {
    match Direction::from_index(facing) {
        Some(direction) => Some(TileCode::Creature(kind, direction)),
        None => None,
    }
}
