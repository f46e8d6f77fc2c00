//! Solution file container: a small header followed by one record per level.
//!
//! All integers are little-endian. A record starts with the number of bytes
//! that follow its size field; size 0 marks a placeholder, size 6 a level
//! that was attempted but never solved, and full records need at least 16.
//! Any other size spoils that record alone, since its bytes can still be
//! skipped.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tileworld_core::{Direction, Ruleset};

use crate::movelist::{decode_moves, encode_moves, Move, MoveListError, MoveListFormat};

/// Signature opening every solution file.
pub const SOLUTION_SIGNATURE: u32 = 0x999B_3335;

/// Byte XORed into every stored password character.
pub const PASSWORD_MASK: u8 = 0x99;

const ATTEMPTED_SIZE: usize = 6;
const FULL_RECORD_SIZE: usize = 16;

/// File-level metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionHeader {
    /// Ruleset the solutions were recorded under.
    pub ruleset: Ruleset,
    /// Move-list layout used by every record, stored in the low flag byte.
    pub format: MoveListFormat,
    /// High flag byte, kept verbatim.
    pub flags_high: u8,
    /// Opaque extra header bytes, kept verbatim.
    pub extra: Vec<u8>,
}

impl SolutionHeader {
    /// Header for a new file using the current move-list layout.
    #[must_use]
    pub fn new(ruleset: Ruleset) -> Self {
        Self {
            ruleset,
            format: MoveListFormat::Current,
            flags_high: 0,
            extra: Vec::new(),
        }
    }
}

/// A recorded solution together with everything needed to replay it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionRecord {
    /// Level the solution belongs to.
    pub number: u16,
    /// Level password in clear text.
    pub password: [u8; 4],
    /// Record flags, kept verbatim.
    pub flags: u8,
    /// Initial direction of Lynx random slide floors.
    pub random_slide_dir: Direction,
    /// Timing offset for MS creature gating, in `0..8`.
    pub stepping: u8,
    /// Seed of the main random stream.
    pub seed: u32,
    /// Tick on which the level was completed.
    pub best_time: u32,
    /// Recorded directional inputs.
    pub moves: Vec<Move>,
}

impl SolutionRecord {
    /// Password as text, with invalid bytes replaced.
    #[must_use]
    pub fn password_text(&self) -> String {
        String::from_utf8_lossy(&self.password).into_owned()
    }
}

/// Problems confined to a single record.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The size field fits neither an attempt nor a solution.
    #[error("record size {0} fits neither an attempt nor a solution")]
    Size(u32),
    /// The packed random slide direction is outside `0..4`.
    #[error("random slide direction {0} is out of range")]
    SlideDirection(u8),
    /// The move list cannot be decoded.
    #[error("corrupt move list: {0}")]
    MoveList(#[from] MoveListError),
}

/// Content of one record slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelRecord {
    /// Empty slot.
    Placeholder,
    /// The level was visited but never solved.
    Attempted {
        /// Level number.
        number: u16,
        /// Level password in clear text.
        password: [u8; 4],
    },
    /// A usable solution.
    Solved(SolutionRecord),
    /// A record whose framing is intact but whose content is not.
    Invalid {
        /// Level number, when the record is long enough to hold one.
        number: Option<u16>,
        /// What is wrong with it.
        error: RecordError,
        /// Bytes following the size field, preserved for rewriting.
        raw: Vec<u8>,
    },
}

impl LevelRecord {
    /// Level the record refers to, if any.
    #[must_use]
    pub fn number(&self) -> Option<u16> {
        match self {
            Self::Placeholder => None,
            Self::Attempted { number, .. } => Some(*number),
            Self::Invalid { number, .. } => *number,
            Self::Solved(record) => Some(record.number),
        }
    }
}

/// Reasons a solution file cannot be read or written.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SolutionError {
    /// The file does not start with the solution signature.
    #[error("not a solution file (signature {0:#010x})")]
    BadSignature(u32),
    /// The header names an unknown ruleset.
    #[error("unknown ruleset id {0}")]
    UnknownRuleset(u8),
    /// The header names an unknown move-list layout.
    #[error("unsupported move-list format version {0}")]
    UnsupportedFormat(u8),
    /// The file ends in the middle of a field.
    #[error("file truncated at byte {offset}, {needed} more bytes expected")]
    Truncated {
        /// Offset of the field being read.
        offset: usize,
        /// Bytes the field needs.
        needed: usize,
    },
    /// A record declares more bytes than can be addressed.
    #[error("record at byte {offset} declares unaddressable size {size}")]
    InvalidRecordSize {
        /// Offset of the size field.
        offset: usize,
        /// Declared size.
        size: u32,
    },
    /// The extra header bytes do not fit their length field.
    #[error("{0} extra header bytes exceed the 255 byte limit")]
    ExtraTooLong(usize),
    /// A record's move list cannot be encoded.
    #[error("cannot encode the solution of level {level}: {source}")]
    Encode {
        /// Level of the offending record.
        level: u16,
        /// Underlying codec error.
        source: MoveListError,
    },
    /// A record grew past the range of its size field.
    #[error("record for level {0} is too large")]
    RecordTooLarge(u16),
}

/// A parsed solution file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolutionFile {
    /// File-level metadata.
    pub header: SolutionHeader,
    /// Record slots in file order.
    pub records: Vec<LevelRecord>,
}

impl SolutionFile {
    /// Creates an empty file.
    #[must_use]
    pub fn new(header: SolutionHeader) -> Self {
        Self {
            header,
            records: Vec::new(),
        }
    }

    /// Parses a complete solution file.
    ///
    /// Records with unusable content are kept as [`LevelRecord::Invalid`];
    /// only broken framing fails the whole file.
    pub fn parse(bytes: &[u8]) -> Result<Self, SolutionError> {
        let mut reader = Reader::new(bytes);

        let signature = reader.u32()?;
        if signature != SOLUTION_SIGNATURE {
            return Err(SolutionError::BadSignature(signature));
        }
        let id = reader.u8()?;
        let ruleset = Ruleset::from_id(id).ok_or(SolutionError::UnknownRuleset(id))?;
        let [version, flags_high] = reader.u16()?.to_le_bytes();
        let format =
            MoveListFormat::from_version(version).ok_or(SolutionError::UnsupportedFormat(version))?;
        let extra_len = usize::from(reader.u8()?);
        let extra = reader.take(extra_len)?.to_vec();

        let header = SolutionHeader {
            ruleset,
            format,
            flags_high,
            extra,
        };

        let mut records = Vec::new();
        while !reader.is_empty() {
            records.push(parse_record(&mut reader, format)?);
        }

        tracing::debug!(
            ruleset = ruleset.name(),
            records = records.len(),
            "solution file parsed"
        );
        Ok(Self { header, records })
    }

    /// Serialises the file, re-encoding every solved record.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SolutionError> {
        let extra_len = u8::try_from(self.header.extra.len())
            .map_err(|_| SolutionError::ExtraTooLong(self.header.extra.len()))?;

        let mut out = Vec::new();
        out.extend_from_slice(&SOLUTION_SIGNATURE.to_le_bytes());
        out.push(self.header.ruleset.id());
        out.push(self.header.format.version());
        out.push(self.header.flags_high);
        out.push(extra_len);
        out.extend_from_slice(&self.header.extra);

        for record in &self.records {
            let body = match record {
                LevelRecord::Placeholder => Vec::new(),
                LevelRecord::Attempted { number, password } => {
                    let mut body = number.to_le_bytes().to_vec();
                    body.extend(mask_password(password));
                    body
                }
                LevelRecord::Solved(solution) => record_body(solution, self.header.format)?,
                LevelRecord::Invalid { raw, .. } => raw.clone(),
            };
            let size = u32::try_from(body.len())
                .map_err(|_| SolutionError::RecordTooLarge(record.number().unwrap_or_default()))?;
            out.extend_from_slice(&size.to_le_bytes());
            out.extend_from_slice(&body);
        }
        Ok(out)
    }

    /// Usable solution for a level, if the file has one.
    #[must_use]
    pub fn solution_for(&self, number: u16) -> Option<&SolutionRecord> {
        self.solved().find(|record| record.number == number)
    }

    /// Every usable solution in file order.
    pub fn solved(&self) -> impl Iterator<Item = &SolutionRecord> {
        self.records.iter().filter_map(|record| match record {
            LevelRecord::Solved(solution) => Some(solution),
            _ => None,
        })
    }

    /// Stores a solution, replacing any record for the same level.
    pub fn store(&mut self, solution: SolutionRecord) {
        let number = solution.number;
        match self
            .records
            .iter_mut()
            .find(|record| record.number() == Some(number))
        {
            Some(slot) => *slot = LevelRecord::Solved(solution),
            None => self.records.push(LevelRecord::Solved(solution)),
        }
    }
}

fn parse_record(
    reader: &mut Reader<'_>,
    format: MoveListFormat,
) -> Result<LevelRecord, SolutionError> {
    let offset = reader.offset();
    let size = reader.u32()?;
    let len = usize::try_from(size).map_err(|_| SolutionError::InvalidRecordSize { offset, size })?;
    if len == 0 {
        return Ok(LevelRecord::Placeholder);
    }

    let raw = reader.take(len)?;
    if len != ATTEMPTED_SIZE && len < FULL_RECORD_SIZE {
        let number = raw.get(..2).map(|bytes| u16::from_le_bytes([bytes[0], bytes[1]]));
        tracing::debug!(offset, size, "solution record has an impossible size");
        return Ok(LevelRecord::Invalid {
            number,
            error: RecordError::Size(size),
            raw: raw.to_vec(),
        });
    }

    let mut body = Reader::new(raw);
    let number = body.u16()?;
    let password = unmask_password(body.take(4)?);
    if len == ATTEMPTED_SIZE {
        return Ok(LevelRecord::Attempted { number, password });
    }

    let flags = body.u8()?;
    let packed = body.u8()?;
    let seed = body.u32()?;
    let best_time = body.u32()?;
    let move_bytes = body.rest();

    let invalid = |error| LevelRecord::Invalid {
        number: Some(number),
        error,
        raw: raw.to_vec(),
    };
    let Some(random_slide_dir) = Direction::from_index(packed & 0b111) else {
        return Ok(invalid(RecordError::SlideDirection(packed & 0b111)));
    };
    let moves = match decode_moves(move_bytes, format) {
        Ok(moves) => moves,
        Err(error) => {
            tracing::debug!(level = number, %error, "unusable solution record");
            return Ok(invalid(RecordError::MoveList(error)));
        }
    };

    Ok(LevelRecord::Solved(SolutionRecord {
        number,
        password,
        flags,
        random_slide_dir,
        stepping: (packed >> 3) & 0b111,
        seed,
        best_time,
        moves,
    }))
}

fn record_body(
    solution: &SolutionRecord,
    format: MoveListFormat,
) -> Result<Vec<u8>, SolutionError> {
    let moves = encode_moves(&solution.moves, format).map_err(|source| SolutionError::Encode {
        level: solution.number,
        source,
    })?;
    let packed = solution.random_slide_dir.index() | (solution.stepping & 0b111) << 3;

    let mut body = Vec::with_capacity(FULL_RECORD_SIZE + moves.len());
    body.extend_from_slice(&solution.number.to_le_bytes());
    body.extend(mask_password(&solution.password));
    body.push(solution.flags);
    body.push(packed);
    body.extend_from_slice(&solution.seed.to_le_bytes());
    body.extend_from_slice(&solution.best_time.to_le_bytes());
    body.extend_from_slice(&moves);
    Ok(body)
}

fn mask_password(password: &[u8; 4]) -> [u8; 4] {
    password.map(|byte| byte ^ PASSWORD_MASK)
}

fn unmask_password(stored: &[u8]) -> [u8; 4] {
    let mut password = [0; 4];
    for (clear, &byte) in password.iter_mut().zip(stored) {
        *clear = byte ^ PASSWORD_MASK;
    }
    password
}

/// Bounds-checked little-endian cursor over a byte slice.
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn is_empty(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], SolutionError> {
        let truncated = SolutionError::Truncated {
            offset: self.offset,
            needed: len,
        };
        let end = self.offset.checked_add(len).ok_or(truncated.clone())?;
        let slice = self.bytes.get(self.offset..end).ok_or(truncated)?;
        self.offset = end;
        Ok(slice)
    }

    fn rest(&mut self) -> &'a [u8] {
        let rest = &self.bytes[self.offset.min(self.bytes.len())..];
        self.offset = self.bytes.len();
        rest
    }

    fn u8(&mut self) -> Result<u8, SolutionError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, SolutionError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn u32(&mut self) -> Result<u32, SolutionError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}
