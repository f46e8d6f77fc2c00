use tileworld_core::{Direction, Ruleset};
use tileworld_system_solution::{
    LevelRecord, Move, MoveListFormat, RecordError, SolutionError, SolutionFile, SolutionHeader,
    SolutionRecord, PASSWORD_MASK,
};

fn solved(number: u16) -> SolutionRecord {
    SolutionRecord {
        number,
        password: *b"BDHP",
        flags: 0,
        random_slide_dir: Direction::South,
        stepping: 5,
        seed: 0x0102_0304,
        best_time: 321,
        moves: vec![
            Move::new(2, Direction::East),
            Move::new(6, Direction::East),
            Move::new(300, Direction::North),
        ],
    }
}

fn sample_file() -> SolutionFile {
    let mut file = SolutionFile::new(SolutionHeader::new(Ruleset::Ms));
    file.records.push(LevelRecord::Placeholder);
    file.records.push(LevelRecord::Attempted {
        number: 2,
        password: *b"JXMJ",
    });
    file.store(solved(1));
    file
}

#[test]
fn header_layout_is_bit_exact() {
    let bytes = sample_file().to_bytes().expect("encodable");
    assert_eq!(&bytes[..4], &[0x35, 0x33, 0x9B, 0x99]);
    assert_eq!(bytes[4], 2, "MS ruleset id");
    assert_eq!(&bytes[5..7], &[2, 0], "format version in the low flag byte");
    assert_eq!(bytes[7], 0, "no extra header bytes");
    assert_eq!(&bytes[8..12], &[0, 0, 0, 0], "placeholder record");
    assert_eq!(&bytes[12..16], &[6, 0, 0, 0], "attempted record");
    assert_eq!(&bytes[16..18], &[2, 0]);
    assert_eq!(bytes[18], b'J' ^ PASSWORD_MASK);
}

#[test]
fn solved_records_pack_slide_direction_and_stepping() {
    let bytes = sample_file().to_bytes().expect("encodable");
    let record = &bytes[22..];
    let size = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
    assert_eq!(size as usize, record.len() - 4);
    assert_eq!(&record[4..6], &[1, 0]);
    assert_eq!(record[11], 2 | 5 << 3);
    assert_eq!(&record[12..16], &[4, 3, 2, 1]);
    assert_eq!(&record[16..20], &321u32.to_le_bytes());
}

#[test]
fn files_survive_a_round_trip() {
    let file = sample_file();
    let bytes = file.to_bytes().expect("encodable");
    let parsed = SolutionFile::parse(&bytes).expect("parsable");

    assert_eq!(parsed, file);
    assert_eq!(parsed.solution_for(1), Some(&solved(1)));
    assert!(parsed.solution_for(2).is_none());
    assert_eq!(parsed.solved().count(), 1);
}

#[test]
fn legacy_files_decode_with_the_legacy_codec() {
    let mut header = SolutionHeader::new(Ruleset::Lynx);
    header.format = MoveListFormat::Legacy;
    header.extra = vec![7, 7, 7];
    let mut file = SolutionFile::new(header);
    file.store(solved(4));

    let bytes = file.to_bytes().expect("encodable");
    assert_eq!(&bytes[5..7], &[1, 0]);
    assert_eq!(SolutionFile::parse(&bytes), Ok(file));
}

#[test]
fn corrupt_move_lists_only_spoil_their_record() {
    let mut bytes = sample_file().to_bytes().expect("encodable");
    // Replace the first move-list entry with the reserved tag.
    let first_move = 22 + 4 + 16;
    bytes[first_move] = 0b0000_0000;

    let parsed = SolutionFile::parse(&bytes).expect("framing intact");
    assert!(matches!(
        parsed.records[2],
        LevelRecord::Invalid {
            number: Some(1),
            error: RecordError::MoveList(_),
            ..
        }
    ));
    assert!(parsed.solution_for(1).is_none());
    assert_eq!(parsed.to_bytes(), Ok(bytes), "invalid records are kept verbatim");
}

#[test]
fn badly_sized_records_only_spoil_themselves() {
    let mut bytes = SolutionFile::new(SolutionHeader::new(Ruleset::Ms))
        .to_bytes()
        .expect("encodable");
    bytes.extend_from_slice(&10u32.to_le_bytes());
    bytes.extend_from_slice(&[9, 0, 1, 2, 3, 4, 5, 6, 7, 8]);
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.push(0xAA);
    let mut tail = SolutionFile::new(SolutionHeader::new(Ruleset::Ms));
    tail.store(solved(7));
    bytes.extend_from_slice(&tail.to_bytes().expect("encodable")[8..]);

    let parsed = SolutionFile::parse(&bytes).expect("framing intact");
    assert_eq!(parsed.records.len(), 3);
    assert_eq!(
        parsed.records[0],
        LevelRecord::Invalid {
            number: Some(9),
            error: RecordError::Size(10),
            raw: vec![9, 0, 1, 2, 3, 4, 5, 6, 7, 8],
        }
    );
    assert!(matches!(
        parsed.records[1],
        LevelRecord::Invalid {
            number: None,
            error: RecordError::Size(1),
            ..
        }
    ));
    assert_eq!(parsed.solution_for(7), Some(&solved(7)));
    assert_eq!(parsed.to_bytes(), Ok(bytes), "spoilt records are kept verbatim");
}

#[test]
fn broken_framing_is_rejected() {
    assert_eq!(
        SolutionFile::parse(&[0, 0, 0, 0, 2, 2, 0, 0]),
        Err(SolutionError::BadSignature(0))
    );

    let mut bytes = sample_file().to_bytes().expect("encodable");
    bytes.truncate(bytes.len() - 1);
    assert!(matches!(
        SolutionFile::parse(&bytes),
        Err(SolutionError::Truncated { .. })
    ));

    let mut bytes = SolutionFile::new(SolutionHeader::new(Ruleset::Ms))
        .to_bytes()
        .expect("encodable");
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    bytes.extend_from_slice(&[0; 8]);
    assert_eq!(
        SolutionFile::parse(&bytes),
        Err(SolutionError::Truncated {
            offset: 12,
            needed: u32::MAX as usize
        }),
        "an oversized record cannot run past the end"
    );
}
