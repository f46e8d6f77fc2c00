//! Variable-length encoding of the `(tick, direction)` moves of a solution.
//!
//! Every entry stores the number of ticks skipped since the previous move
//! (`tick - previous - 1`); the first entry stores its absolute tick. The
//! low two bits of the first byte select the entry form.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tileworld_core::Direction;

/// A directional input recorded at a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Tick the input was supplied on.
    pub tick: u32,
    /// Direction Chip was asked to move.
    pub direction: Direction,
}

impl Move {
    /// Creates a move.
    #[must_use]
    pub const fn new(tick: u32, direction: Direction) -> Self {
        Self { tick, direction }
    }
}

/// Version of the move-list byte layout, stored in the solution header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveListFormat {
    /// Original layout with two direction bits and a three-move packed form.
    Legacy,
    /// Layout with three direction bits per entry.
    #[default]
    Current,
}

impl MoveListFormat {
    /// Version number written to the solution header.
    #[must_use]
    pub const fn version(self) -> u8 {
        match self {
            Self::Legacy => 1,
            Self::Current => 2,
        }
    }

    /// Looks up a format by its header version number.
    #[must_use]
    pub const fn from_version(version: u8) -> Option<Self> {
        match version {
            1 => Some(Self::Legacy),
            2 => Some(Self::Current),
            _ => None,
        }
    }
}

/// Reasons a move list cannot be encoded or decoded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MoveListError {
    /// Moves are not in strictly increasing tick order.
    #[error("move {index} at tick {tick} does not follow the previous move")]
    NotIncreasing {
        /// Position of the offending move in the list.
        index: usize,
        /// Its tick.
        tick: u32,
    },
    /// The gap before a move is too long for the largest entry form.
    #[error("gap of {delta} ticks before move {index} cannot be encoded")]
    DeltaTooLarge {
        /// Position of the offending move in the list.
        index: usize,
        /// Ticks skipped before it.
        delta: u32,
    },
    /// The stream ends in the middle of an entry.
    #[error("move list ends inside the entry starting at byte {offset}")]
    Truncated {
        /// Offset of the entry's first byte.
        offset: usize,
    },
    /// An entry uses a tag that no format defines.
    #[error("reserved entry tag at byte {offset}")]
    ReservedTag {
        /// Offset of the entry's first byte.
        offset: usize,
    },
    /// An entry names a direction outside `0..4`.
    #[error("reserved direction {value} at byte {offset}")]
    ReservedDirection {
        /// Offset of the entry's first byte.
        offset: usize,
        /// Raw direction field.
        value: u8,
    },
    /// Accumulated ticks no longer fit the tick counter.
    #[error("tick counter overflows at byte {offset}")]
    TickOverflow {
        /// Offset of the entry's first byte.
        offset: usize,
    },
}

const CURRENT_ONE_BYTE_DELTA: u32 = 1 << 3;
const CURRENT_TWO_BYTE_DELTA: u32 = 1 << 11;
const CURRENT_FOUR_BYTE_DELTA: u32 = 1 << 27;

const LEGACY_ONE_BYTE_DELTA: u32 = 1 << 4;
const LEGACY_TWO_BYTE_DELTA: u32 = 1 << 12;
const LEGACY_FOUR_BYTE_DELTA: u32 = 1 << 28;
const LEGACY_PACKED_DELTA: u32 = 3;

/// Encodes moves in the given format using the shortest entry forms.
pub fn encode_moves(moves: &[Move], format: MoveListFormat) -> Result<Vec<u8>, MoveListError> {
    let deltas = deltas(moves)?;
    let mut out = Vec::with_capacity(moves.len());
    match format {
        MoveListFormat::Current => {
            for (index, (&delta, entry)) in deltas.iter().zip(moves).enumerate() {
                encode_current(&mut out, index, delta, entry.direction)?;
            }
        }
        MoveListFormat::Legacy => encode_legacy(&mut out, &deltas, moves)?,
    }
    Ok(out)
}

/// Decodes a move list written in the given format.
pub fn decode_moves(bytes: &[u8], format: MoveListFormat) -> Result<Vec<Move>, MoveListError> {
    let mut moves = Vec::new();
    let mut next_tick: u32 = 0;
    let mut offset = 0;

    while offset < bytes.len() {
        let tag = bytes[offset] & 0b11;
        let len = match (format, tag) {
            (MoveListFormat::Current, 0) => return Err(MoveListError::ReservedTag { offset }),
            (MoveListFormat::Legacy, 0) | (_, 1) => 1,
            (_, 2) => 2,
            _ => 4,
        };
        let Some(entry) = bytes.get(offset..offset + len) else {
            return Err(MoveListError::Truncated { offset });
        };
        let word = entry
            .iter()
            .rev()
            .fold(0u32, |word, &byte| (word << 8) | u32::from(byte));

        match (format, tag) {
            (MoveListFormat::Legacy, 0) => {
                for shift in [2, 4, 6] {
                    let value = ((word >> shift) & 0b11) as u8;
                    let tick = advance(&mut next_tick, LEGACY_PACKED_DELTA, offset)?;
                    moves.push(Move::new(tick, direction(value, offset)?));
                }
            }
            (MoveListFormat::Legacy, _) => {
                let value = ((word >> 2) & 0b11) as u8;
                let tick = advance(&mut next_tick, word >> 4, offset)?;
                moves.push(Move::new(tick, direction(value, offset)?));
            }
            (MoveListFormat::Current, _) => {
                let value = ((word >> 2) & 0b111) as u8;
                let tick = advance(&mut next_tick, word >> 5, offset)?;
                moves.push(Move::new(tick, direction(value, offset)?));
            }
        }
        offset += len;
    }

    Ok(moves)
}

fn deltas(moves: &[Move]) -> Result<Vec<u32>, MoveListError> {
    let mut deltas = Vec::with_capacity(moves.len());
    let mut previous: Option<u32> = None;
    for (index, entry) in moves.iter().enumerate() {
        let delta = match previous {
            None => entry.tick,
            Some(previous) if entry.tick > previous => entry.tick - previous - 1,
            Some(_) => {
                return Err(MoveListError::NotIncreasing {
                    index,
                    tick: entry.tick,
                })
            }
        };
        deltas.push(delta);
        previous = Some(entry.tick);
    }
    Ok(deltas)
}

fn encode_current(
    out: &mut Vec<u8>,
    index: usize,
    delta: u32,
    direction: Direction,
) -> Result<(), MoveListError> {
    let dir = u32::from(direction.index()) << 2;
    if delta < CURRENT_ONE_BYTE_DELTA {
        out.push((0b01 | dir | delta << 5) as u8);
    } else if delta < CURRENT_TWO_BYTE_DELTA {
        out.extend_from_slice(&((0b10 | dir | delta << 5) as u16).to_le_bytes());
    } else if delta < CURRENT_FOUR_BYTE_DELTA {
        out.extend_from_slice(&(0b11 | dir | delta << 5).to_le_bytes());
    } else {
        return Err(MoveListError::DeltaTooLarge { index, delta });
    }
    Ok(())
}

fn encode_legacy(out: &mut Vec<u8>, deltas: &[u32], moves: &[Move]) -> Result<(), MoveListError> {
    let mut index = 0;
    while index < moves.len() {
        let packable = deltas
            .get(index..index + 3)
            .is_some_and(|run| run.iter().all(|&delta| delta == LEGACY_PACKED_DELTA));
        if packable {
            let byte = moves[index..index + 3]
                .iter()
                .zip([2, 4, 6])
                .fold(0u8, |byte, (entry, shift)| {
                    byte | entry.direction.index() << shift
                });
            out.push(byte);
            index += 3;
            continue;
        }

        let delta = deltas[index];
        let dir = u32::from(moves[index].direction.index()) << 2;
        if delta < LEGACY_ONE_BYTE_DELTA {
            out.push((0b01 | dir | delta << 4) as u8);
        } else if delta < LEGACY_TWO_BYTE_DELTA {
            out.extend_from_slice(&((0b10 | dir | delta << 4) as u16).to_le_bytes());
        } else if delta < LEGACY_FOUR_BYTE_DELTA {
            out.extend_from_slice(&(0b11 | dir | delta << 4).to_le_bytes());
        } else {
            return Err(MoveListError::DeltaTooLarge { index, delta });
        }
        index += 1;
    }
    Ok(())
}

/// Returns the tick of the next move and moves the cursor past it.
fn advance(next_tick: &mut u32, delta: u32, offset: usize) -> Result<u32, MoveListError> {
    let tick = next_tick
        .checked_add(delta)
        .ok_or(MoveListError::TickOverflow { offset })?;
    *next_tick = tick
        .checked_add(1)
        .ok_or(MoveListError::TickOverflow { offset })?;
    Ok(tick)
}

fn direction(value: u8, offset: usize) -> Result<Direction, MoveListError> {
    Direction::from_index(value).ok_or(MoveListError::ReservedDirection { offset, value })
}
