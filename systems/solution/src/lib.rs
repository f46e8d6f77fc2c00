#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Recorded solutions: the compact move-list codec and the solution file
//! container that stores one record per level.

mod movelist;
mod record;

pub use movelist::{decode_moves, encode_moves, Move, MoveListError, MoveListFormat};
pub use record::{
    LevelRecord, RecordError, SolutionError, SolutionFile, SolutionHeader, SolutionRecord,
    PASSWORD_MASK, SOLUTION_SIGNATURE,
};
