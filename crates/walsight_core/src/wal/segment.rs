//! Segment record types, framing and file naming.

use crate::error::{CoreError, CoreResult};
use walsight_codec::raftpb::{Entry, HardState};
use walsight_codec::walpb::{Metadata, Snapshot};
use walsight_codec::{Decode, Encode};

/// Magic bytes identifying a segment record.
pub const SEGMENT_MAGIC: [u8; 4] = *b"RWAL";

/// Current segment format version.
pub const SEGMENT_VERSION: u16 = 1;

/// magic (4) + version (2) + type (1) + length (4)
pub const HEADER_SIZE: usize = 11;

/// Trailing CRC size.
pub const CRC_SIZE: usize = 4;

/// File extension of segment files.
pub const SEGMENT_EXTENSION: &str = "wal";

/// Type of a segment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SegmentRecordType {
    /// Identity of the writing member.
    Metadata = 1,
    /// A raft log entry.
    Entry = 2,
    /// Persistent raft state.
    State = 3,
    /// Snapshot position marker.
    Snapshot = 4,
}

impl SegmentRecordType {
    /// Converts a byte to a record type.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(Self::Metadata),
            2 => Some(Self::Entry),
            3 => Some(Self::State),
            4 => Some(Self::Snapshot),
            _ => None,
        }
    }

    /// Converts the record type to a byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Entry => "entry",
            Self::State => "state",
            Self::Snapshot => "snapshot",
        }
    }
}

/// A decoded segment record.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentRecord {
    /// Identity of the writing member.
    Metadata(Metadata),
    /// A raft log entry.
    Entry(Entry),
    /// Persistent raft state.
    State(HardState),
    /// Snapshot position marker.
    Snapshot(Snapshot),
}

impl SegmentRecord {
    /// Maximum payload size representable by the length field.
    pub const MAX_PAYLOAD_SIZE: usize = u32::MAX as usize;

    /// Returns the record type.
    #[must_use]
    pub fn record_type(&self) -> SegmentRecordType {
        match self {
            Self::Metadata(_) => SegmentRecordType::Metadata,
            Self::Entry(_) => SegmentRecordType::Entry,
            Self::State(_) => SegmentRecordType::State,
            Self::Snapshot(_) => SegmentRecordType::Snapshot,
        }
    }

    /// Serializes the record payload (without envelope).
    #[must_use]
    pub fn encode_payload(&self) -> Vec<u8> {
        match self {
            Self::Metadata(m) => m.encode_payload(),
            Self::Entry(e) => e.encode_payload(),
            Self::State(s) => s.encode_payload(),
            Self::Snapshot(s) => s.encode_payload(),
        }
    }

    /// Deserializes a record from its type and payload.
    ///
    /// # Errors
    ///
    /// Returns a corruption error if the payload does not match the schema
    /// of its record type.
    pub fn decode_payload(record_type: SegmentRecordType, payload: &[u8]) -> CoreResult<Self> {
        let undecodable = |e: walsight_codec::CodecError| {
            CoreError::wal_corruption(format!(
                "undecodable {} record: {e}",
                record_type.name()
            ))
        };
        let record = match record_type {
            SegmentRecordType::Metadata => {
                Self::Metadata(Metadata::decode_strict(payload).map_err(undecodable)?)
            }
            SegmentRecordType::Entry => {
                Self::Entry(Entry::decode_strict(payload).map_err(undecodable)?)
            }
            SegmentRecordType::State => {
                Self::State(HardState::decode_strict(payload).map_err(undecodable)?)
            }
            SegmentRecordType::Snapshot => {
                Self::Snapshot(Snapshot::decode_strict(payload).map_err(undecodable)?)
            }
        };
        Ok(record)
    }

    /// Serializes the full framed record: header, payload and CRC.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload exceeds [`Self::MAX_PAYLOAD_SIZE`].
    pub fn encode_framed(&self) -> CoreResult<Vec<u8>> {
        let payload = self.encode_payload();
        let len = u32::try_from(payload.len()).map_err(|_| {
            CoreError::invalid_argument(format!(
                "record payload too large: {} bytes exceeds maximum of {} bytes",
                payload.len(),
                Self::MAX_PAYLOAD_SIZE
            ))
        })?;

        let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len() + CRC_SIZE);
        buf.extend_from_slice(&SEGMENT_MAGIC);
        buf.extend_from_slice(&SEGMENT_VERSION.to_le_bytes());
        buf.push(self.record_type().as_byte());
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(&payload);
        let crc = compute_crc32(&buf);
        buf.extend_from_slice(&crc.to_le_bytes());
        Ok(buf)
    }
}

/// Computes the IEEE CRC32 of `data`.
#[must_use]
pub fn compute_crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Position of a segment file within the log, parsed from its file name.
///
/// Segment files are named `<seq>-<index>.wal` with both numbers as
/// sixteen lowercase hex digits, so lexicographic order is log order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SegmentName {
    /// Segment sequence number.
    pub seq: u64,
    /// Index of the first entry the segment may hold.
    pub index: u64,
}

impl SegmentName {
    /// Creates a segment name.
    #[must_use]
    pub const fn new(seq: u64, index: u64) -> Self {
        Self { seq, index }
    }

    /// Parses a segment file name, returning `None` for any other file.
    #[must_use]
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(SEGMENT_EXTENSION)?.strip_suffix('.')?;
        let (seq, index) = stem.split_once('-')?;
        if seq.len() != 16 || index.len() != 16 {
            return None;
        }
        Some(Self {
            seq: u64::from_str_radix(seq, 16).ok()?,
            index: u64::from_str_radix(index, 16).ok()?,
        })
    }

    /// Returns the file name for this segment.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{:016x}-{:016x}.{SEGMENT_EXTENSION}", self.seq, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_bytes() {
        for b in 1..=4 {
            let t = SegmentRecordType::from_byte(b).unwrap();
            assert_eq!(t.as_byte(), b);
        }
        assert!(SegmentRecordType::from_byte(0).is_none());
        assert!(SegmentRecordType::from_byte(5).is_none());
    }

    #[test]
    fn framed_layout() {
        let record = SegmentRecord::State(HardState {
            term: 1,
            vote: 2,
            commit: 3,
        });
        let framed = record.encode_framed().unwrap();
        let payload = record.encode_payload();

        assert_eq!(&framed[0..4], b"RWAL");
        assert_eq!(u16::from_le_bytes([framed[4], framed[5]]), SEGMENT_VERSION);
        assert_eq!(framed[6], SegmentRecordType::State.as_byte());
        assert_eq!(
            u32::from_le_bytes([framed[7], framed[8], framed[9], framed[10]]) as usize,
            payload.len()
        );
        assert_eq!(framed.len(), HEADER_SIZE + payload.len() + CRC_SIZE);

        let body_end = HEADER_SIZE + payload.len();
        let crc = u32::from_le_bytes(framed[body_end..].try_into().unwrap());
        assert_eq!(crc, compute_crc32(&framed[..body_end]));
    }

    #[test]
    fn decode_rejects_foreign_payload() {
        // field 9 is not part of walpb.Metadata
        let result = SegmentRecord::decode_payload(SegmentRecordType::Metadata, &[0x48, 0x01]);
        assert!(matches!(result, Err(CoreError::WalCorruption { .. })));
    }

    #[test]
    fn decode_entry_payload() {
        let entry = Entry {
            entry_type: 0,
            term: 4,
            index: 10,
            data: b"x".to_vec(),
        };
        let payload = SegmentRecord::Entry(entry.clone()).encode_payload();
        assert_eq!(
            SegmentRecord::decode_payload(SegmentRecordType::Entry, &payload).unwrap(),
            SegmentRecord::Entry(entry)
        );
    }

    #[test]
    fn segment_name_roundtrip() {
        let name = SegmentName::new(1, 0x22);
        assert_eq!(name.file_name(), "0000000000000001-0000000000000022.wal");
        assert_eq!(SegmentName::parse(&name.file_name()), Some(name));
    }

    #[test]
    fn segment_name_rejects_other_files() {
        assert_eq!(SegmentName::parse("0.tmp"), None);
        assert_eq!(SegmentName::parse("0000000000000000-0000000000000000.wal.broken"), None);
        assert_eq!(SegmentName::parse("00-00.wal"), None);
        assert_eq!(SegmentName::parse("zzzzzzzzzzzzzzzz-0000000000000000.wal"), None);
    }
}
