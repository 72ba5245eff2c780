//! Read-only access to WAL segments.
//!
//! ## Segment Record Format
//!
//! ```text
//! | magic "RWAL" (4) | version (2) | type (1) | length (4) | payload (N) | crc32 (4) |
//! ```
//!
//! The CRC covers header and payload. Payloads are protobuf messages:
//! `walpb.Metadata`, `raftpb.Entry`, `raftpb.HardState` or `walpb.Snapshot`.
//!
//! ## Recovery Policy
//!
//! ### Tolerated (treated as clean end of log)
//!
//! - **Truncated header or payload** at the end of the last segment
//!
//! ### Fatal (the whole run fails)
//!
//! - Truncation in any segment but the last
//! - CRC mismatch, invalid magic, unsupported version, unknown record type
//! - Undecodable record payload or unsupported entry type
//! - Conflicting metadata or an index gap
//!
//! ## Replay
//!
//! The last hard state and snapshot marker win. An entry whose index is at
//! or below the last replayed one replaces the tail from that index on.
//! Entries covered by the snapshot marker are dropped.

mod iterator;
mod reader;
mod segment;

pub use iterator::SegmentIterator;
pub use reader::{list_segments, read_wal, replay_segments, ReadOptions, WalContents};
pub use segment::{
    compute_crc32, SegmentName, SegmentRecord, SegmentRecordType, CRC_SIZE, HEADER_SIZE,
    SEGMENT_EXTENSION, SEGMENT_MAGIC, SEGMENT_VERSION,
};
