//! Immutable per-level setup consumed by the engine.
//!
//! Level files store two map layers, each compressed with a simple run-length
//! scheme: a `0xFF` byte introduces a `count value` pair that expands to
//! `count` copies of `value`; every other byte stands for itself. A layer
//! must expand to exactly one byte per grid cell.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tiles::{decode_tile, CreatureKind, Floor, TileCode};
use crate::{Direction, Position, GRID_CELLS};

const RUN_ESCAPE: u8 = 0xFF;
const MAX_RUN: usize = u8::MAX as usize;

/// Which of the two map layers a problem was found in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// The upper layer holding creatures and items.
    Top,
    /// The lower layer holding what lies beneath.
    Bottom,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Top => f.write_str("top"),
            Self::Bottom => f.write_str("bottom"),
        }
    }
}

/// Reasons a level cannot be played.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// A run-length escape was cut off by the end of the layer.
    #[error("{0} layer ends inside a run-length escape")]
    Truncated(Layer),
    /// A layer expanded to the wrong number of cells.
    #[error("{layer} layer expands to {len} cells, expected {}", GRID_CELLS)]
    LayerSize {
        /// Offending layer.
        layer: Layer,
        /// Number of cells produced before giving up.
        len: usize,
    },
    /// A map byte has no defined meaning.
    #[error("unknown map byte {code:#04x} at cell {position} of the {layer} layer")]
    UnknownTile {
        /// Offending layer.
        layer: Layer,
        /// Linear index of the cell.
        position: usize,
        /// The raw byte.
        code: u8,
    },
    /// The map has no Chip.
    #[error("level has no starting position for Chip")]
    MissingChip,
    /// The map has more than one Chip.
    #[error("level places Chip twice, at cells {first} and {second}")]
    MultipleChips {
        /// First Chip found in reading order.
        first: usize,
        /// Second Chip found in reading order.
        second: usize,
    },
}

/// Static association between a button and the machine it controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wiring {
    /// Cell holding the button.
    pub button: Position,
    /// Cell holding the beartrap or cloning machine.
    pub target: Position,
}

/// Level description as handed over by the level-file loader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSetup {
    /// Level number within its set.
    pub number: u16,
    /// Time limit in seconds; zero means untimed.
    pub time_limit: u16,
    /// Computer chips Chip must collect before the socket opens.
    pub chips_needed: u16,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Four-letter password.
    #[serde(default)]
    pub password: String,
    /// Text shown on hint buttons.
    #[serde(default)]
    pub hint: String,
    /// Run-length compressed upper map layer.
    pub top_layer: Vec<u8>,
    /// Run-length compressed lower map layer.
    pub bottom_layer: Vec<u8>,
    /// Brown button to beartrap connections.
    #[serde(default)]
    pub traps: Vec<Wiring>,
    /// Red button to cloning machine connections.
    #[serde(default)]
    pub cloners: Vec<Wiring>,
    /// Cells whose creatures move under the MS rules, in processing order.
    #[serde(default)]
    pub creatures: Vec<Position>,
}

/// A creature found on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlacedCreature {
    /// Cell the creature starts on.
    pub position: Position,
    /// Kind of the creature.
    pub kind: CreatureKind,
    /// Initial facing.
    pub facing: Direction,
}

/// Fully validated, decompressed level contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedLevel {
    /// Visible floor of every cell.
    pub floors: Vec<Floor>,
    /// Floor revealed once the visible one is consumed.
    pub unders: Vec<Floor>,
    /// Creatures found on the map in reading order.
    pub creatures: Vec<PlacedCreature>,
    /// Creatures lying in the bottom layer. They sit under the visible tile,
    /// never act and leave empty floor behind.
    pub buried: Vec<PlacedCreature>,
    /// Starting cell of Chip.
    pub chip: Position,
}

impl LevelSetup {
    /// Expands and validates both map layers.
    pub fn decode(&self) -> Result<DecodedLevel, LevelError> {
        let top = decompress_layer(&self.top_layer, Layer::Top)?;
        let bottom = decompress_layer(&self.bottom_layer, Layer::Bottom)?;

        let mut floors = Vec::with_capacity(GRID_CELLS);
        let mut unders = Vec::with_capacity(GRID_CELLS);
        let mut creatures = Vec::new();
        let mut buried = Vec::new();
        let mut chip: Option<Position> = None;

        for (index, (&upper, &lower)) in top.iter().zip(bottom.iter()).enumerate() {
            let lower = match decode_tile(lower) {
                Some(TileCode::Floor(floor)) => floor,
                Some(TileCode::Creature(kind, facing)) => {
                    if let Some(position) = u16::try_from(index).ok().and_then(Position::new) {
                        buried.push(PlacedCreature {
                            position,
                            kind,
                            facing,
                        });
                    }
                    Floor::Empty
                }
                None => {
                    return Err(LevelError::UnknownTile {
                        layer: Layer::Bottom,
                        position: index,
                        code: lower,
                    })
                }
            };

            match decode_tile(upper) {
                Some(TileCode::Floor(floor)) => {
                    floors.push(floor);
                    unders.push(lower);
                }
                Some(TileCode::Creature(kind, facing)) => {
                    let Some(position) = u16::try_from(index).ok().and_then(Position::new) else {
                        return Err(LevelError::LayerSize {
                            layer: Layer::Top,
                            len: index,
                        });
                    };
                    if kind == CreatureKind::Chip {
                        if let Some(first) = chip {
                            return Err(LevelError::MultipleChips {
                                first: first.index(),
                                second: index,
                            });
                        }
                        chip = Some(position);
                    }
                    creatures.push(PlacedCreature {
                        position,
                        kind,
                        facing,
                    });
                    floors.push(lower);
                    unders.push(Floor::Empty);
                }
                None => {
                    return Err(LevelError::UnknownTile {
                        layer: Layer::Top,
                        position: index,
                        code: upper,
                    })
                }
            }
        }

        let chip = chip.ok_or(LevelError::MissingChip)?;
        Ok(DecodedLevel {
            floors,
            unders,
            creatures,
            buried,
            chip,
        })
    }
}

/// Expands a run-length compressed layer into one byte per cell.
pub fn decompress_layer(bytes: &[u8], layer: Layer) -> Result<Vec<u8>, LevelError> {
    let mut cells = Vec::with_capacity(GRID_CELLS);
    let mut iter = bytes.iter().copied();

    while let Some(byte) = iter.next() {
        if byte == RUN_ESCAPE {
            let (Some(count), Some(value)) = (iter.next(), iter.next()) else {
                return Err(LevelError::Truncated(layer));
            };
            let count = usize::from(count);
            if cells.len() + count > GRID_CELLS {
                return Err(LevelError::LayerSize {
                    layer,
                    len: cells.len() + count,
                });
            }
            cells.extend(std::iter::repeat(value).take(count));
        } else {
            if cells.len() == GRID_CELLS {
                return Err(LevelError::LayerSize {
                    layer,
                    len: cells.len() + 1,
                });
            }
            cells.push(byte);
        }
    }

    if cells.len() != GRID_CELLS {
        return Err(LevelError::LayerSize {
            layer,
            len: cells.len(),
        });
    }
    Ok(cells)
}

/// Compresses one byte per cell into the run-length layer format.
#[must_use]
pub fn compress_layer(cells: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut index = 0;

    while index < cells.len() {
        let value = cells[index];
        let run = cells[index..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&byte| byte == value)
            .count();

        if run > 3 || value == RUN_ESCAPE {
            out.extend([RUN_ESCAPE, run as u8, value]);
        } else {
            out.extend(std::iter::repeat(value).take(run));
        }
        index += run;
    }
    out
}

/// Incremental constructor for [`LevelSetup`] values.
///
/// Every cell starts out as empty floor on both layers. Creatures placed
/// with [`LevelBuilder::creature`] are also appended to the MS movement list,
/// except for Chip and blocks.
#[derive(Clone, Debug)]
pub struct LevelBuilder {
    number: u16,
    time_limit: u16,
    chips_needed: u16,
    name: String,
    password: String,
    hint: String,
    top: Vec<u8>,
    bottom: Vec<u8>,
    traps: Vec<Wiring>,
    cloners: Vec<Wiring>,
    creatures: Vec<Position>,
}

impl LevelBuilder {
    /// Starts an empty level with the given number.
    #[must_use]
    pub fn new(number: u16) -> Self {
        Self {
            number,
            time_limit: 0,
            chips_needed: 0,
            name: String::new(),
            password: String::from("AAAA"),
            hint: String::new(),
            top: vec![Floor::Empty.code(); GRID_CELLS],
            bottom: vec![Floor::Empty.code(); GRID_CELLS],
            traps: Vec::new(),
            cloners: Vec::new(),
            creatures: Vec::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    /// Sets the level password.
    #[must_use]
    pub fn password(mut self, password: &str) -> Self {
        self.password = password.to_owned();
        self
    }

    /// Sets the hint text.
    #[must_use]
    pub fn hint(mut self, hint: &str) -> Self {
        self.hint = hint.to_owned();
        self
    }

    /// Sets the time limit in seconds.
    #[must_use]
    pub fn time_limit(mut self, seconds: u16) -> Self {
        self.time_limit = seconds;
        self
    }

    /// Sets the number of chips required to open sockets.
    #[must_use]
    pub fn chips_needed(mut self, chips: u16) -> Self {
        self.chips_needed = chips;
        self
    }

    /// Places a floor on the upper layer.
    #[must_use]
    pub fn floor(mut self, position: Position, floor: Floor) -> Self {
        self.top[position.index()] = floor.code();
        self
    }

    /// Places a floor on the lower layer.
    #[must_use]
    pub fn under(mut self, position: Position, floor: Floor) -> Self {
        self.bottom[position.index()] = floor.code();
        self
    }

    /// Places a creature; monsters also join the MS movement list.
    ///
    /// The floor previously placed on the upper layer moves to the lower
    /// layer so the creature stands on it.
    #[must_use]
    pub fn creature(mut self, position: Position, kind: CreatureKind, facing: Direction) -> Self {
        let index = position.index();
        if let Some(TileCode::Floor(floor)) = decode_tile(self.top[index]) {
            if floor != Floor::Empty {
                self.bottom[index] = floor.code();
            }
        }
        self.top[index] = kind.code(facing);
        if !matches!(kind, CreatureKind::Chip | CreatureKind::Block) {
            self.creatures.push(position);
        }
        self
    }

    /// Wires a brown button to a beartrap.
    #[must_use]
    pub fn trap(mut self, button: Position, target: Position) -> Self {
        self.traps.push(Wiring { button, target });
        self
    }

    /// Wires a red button to a cloning machine.
    #[must_use]
    pub fn cloner(mut self, button: Position, target: Position) -> Self {
        self.cloners.push(Wiring { button, target });
        self
    }

    /// Finalises the level, compressing both layers.
    #[must_use]
    pub fn build(self) -> LevelSetup {
        LevelSetup {
            number: self.number,
            time_limit: self.time_limit,
            chips_needed: self.chips_needed,
            name: self.name,
            password: self.password,
            hint: self.hint,
            top_layer: compress_layer(&self.top),
            bottom_layer: compress_layer(&self.bottom),
            traps: self.traps,
            cloners: self.cloners,
            creatures: self.creatures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{compress_layer, decompress_layer, Layer, LevelBuilder, LevelError, PlacedCreature};
    use crate::{CreatureKind, Direction, Floor, Position, GRID_CELLS};

    fn at(x: u16, y: u16) -> Position {
        Position::from_xy(x, y).expect("position on grid")
    }

    #[test]
    fn run_length_escape_expands_runs() {
        let mut bytes = vec![0xFF, 255, 0x01, 0xFF, 255, 0x01, 0xFF, 255, 0x01];
        bytes.extend([0xFF, 255, 0x00, 0x02, 0x03, 0x04, 0x05]);
        let cells = decompress_layer(&bytes, Layer::Top).expect("valid layer");
        assert_eq!(cells.len(), GRID_CELLS);
        assert_eq!(cells[0], 0x01);
        assert_eq!(cells[3 * 255], 0x00);
        assert_eq!(&cells[GRID_CELLS - 4..], &[0x02, 0x03, 0x04, 0x05]);
    }

    #[test]
    fn compression_round_trips_cells() {
        let mut cells = vec![0u8; GRID_CELLS];
        cells[10] = 0xFF;
        cells[11] = 0x01;
        cells[12] = 0x01;
        for cell in &mut cells[500..520] {
            *cell = 0x2A;
        }
        let packed = compress_layer(&cells);
        assert!(packed.len() < GRID_CELLS);
        assert_eq!(decompress_layer(&packed, Layer::Bottom), Ok(cells));
    }

    #[test]
    fn truncated_escape_is_rejected() {
        assert_eq!(
            decompress_layer(&[0x00, 0xFF, 0x10], Layer::Top),
            Err(LevelError::Truncated(Layer::Top))
        );
    }

    #[test]
    fn short_and_long_layers_are_rejected() {
        assert!(matches!(
            decompress_layer(&[0xFF, 10, 0x00], Layer::Top),
            Err(LevelError::LayerSize { len: 10, .. })
        ));

        let mut long = compress_layer(&vec![0u8; GRID_CELLS]);
        long.push(0x00);
        assert!(matches!(
            decompress_layer(&long, Layer::Bottom),
            Err(LevelError::LayerSize { .. })
        ));
    }

    #[test]
    fn builder_places_creatures_over_their_floor() {
        let setup = LevelBuilder::new(1)
            .floor(at(3, 3), Floor::Beartrap)
            .creature(at(3, 3), CreatureKind::Tank, Direction::East)
            .creature(at(1, 1), CreatureKind::Chip, Direction::South)
            .build();
        let level = setup.decode().expect("valid level");

        assert_eq!(level.chip, at(1, 1));
        assert_eq!(level.floors[at(3, 3).index()], Floor::Beartrap);
        assert_eq!(level.creatures.len(), 2);
        assert_eq!(setup.creatures, vec![at(3, 3)]);
    }

    #[test]
    fn buried_creatures_leave_empty_floor() {
        let mut setup = LevelBuilder::new(1)
            .floor(at(4, 4), Floor::Gravel)
            .creature(at(1, 1), CreatureKind::Chip, Direction::South)
            .build();
        let mut bottom = decompress_layer(&setup.bottom_layer, Layer::Bottom).expect("valid layer");
        bottom[at(4, 4).index()] = CreatureKind::Tank.code(Direction::West);
        bottom[at(6, 6).index()] = CreatureKind::Chip.code(Direction::North);
        setup.bottom_layer = compress_layer(&bottom);

        let level = setup.decode().expect("valid level");
        assert_eq!(level.chip, at(1, 1), "a buried Chip is not a second Chip");
        assert_eq!(level.creatures.len(), 1);
        assert_eq!(
            level.buried,
            vec![
                PlacedCreature {
                    position: at(4, 4),
                    kind: CreatureKind::Tank,
                    facing: Direction::West,
                },
                PlacedCreature {
                    position: at(6, 6),
                    kind: CreatureKind::Chip,
                    facing: Direction::North,
                },
            ]
        );
        assert_eq!(level.floors[at(4, 4).index()], Floor::Gravel);
        assert_eq!(level.unders[at(4, 4).index()], Floor::Empty);
        assert_eq!(level.floors[at(6, 6).index()], Floor::Empty);
    }

    #[test]
    fn level_without_chip_is_rejected() {
        let setup = LevelBuilder::new(1).build();
        assert_eq!(setup.decode(), Err(LevelError::MissingChip));
    }

    #[test]
    fn second_chip_is_rejected() {
        let setup = LevelBuilder::new(1)
            .creature(at(0, 0), CreatureKind::Chip, Direction::South)
            .creature(at(5, 0), CreatureKind::Chip, Direction::South)
            .build();
        assert_eq!(
            setup.decode(),
            Err(LevelError::MultipleChips {
                first: 0,
                second: 5
            })
        );
    }
}
