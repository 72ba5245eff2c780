//! WAL directory writer for fixtures.
//!
//! The shipping crates only read logs. This builder produces segment files
//! in the format the reader expects, split across as many segments as the
//! test asks for.

use std::fs;
use std::path::{Path, PathBuf};

use walsight_codec::raftpb::{Entry, HardState};
use walsight_codec::walpb::{Metadata, Snapshot};
use walsight_core::wal::{SegmentName, SegmentRecord};
use walsight_core::CoreResult;

/// Builds the records of a WAL directory segment by segment.
#[derive(Debug, Clone)]
pub struct WalBuilder {
    segments: Vec<Vec<SegmentRecord>>,
}

impl Default for WalBuilder {
    fn default() -> Self {
        Self {
            segments: vec![Vec::new()],
        }
    }
}

impl WalBuilder {
    /// Creates a builder with one empty segment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a raw segment record to the current segment.
    #[must_use]
    pub fn record(mut self, record: SegmentRecord) -> Self {
        if let Some(segment) = self.segments.last_mut() {
            segment.push(record);
        }
        self
    }

    /// Appends a metadata record.
    #[must_use]
    pub fn metadata(self, node_id: u64, cluster_id: u64) -> Self {
        self.record(SegmentRecord::Metadata(Metadata {
            node_id,
            cluster_id,
        }))
    }

    /// Appends a log entry.
    #[must_use]
    pub fn entry(self, entry: Entry) -> Self {
        self.record(SegmentRecord::Entry(entry))
    }

    /// Appends log entries in order.
    #[must_use]
    pub fn entries(self, entries: impl IntoIterator<Item = Entry>) -> Self {
        entries.into_iter().fold(self, Self::entry)
    }

    /// Appends a hard state record.
    #[must_use]
    pub fn hard_state(self, term: u64, vote: u64, commit: u64) -> Self {
        self.record(SegmentRecord::State(HardState { term, vote, commit }))
    }

    /// Appends a snapshot marker.
    #[must_use]
    pub fn snapshot(self, index: u64, term: u64) -> Self {
        self.record(SegmentRecord::Snapshot(Snapshot { index, term }))
    }

    /// Starts a new segment.
    #[must_use]
    pub fn cut(mut self) -> Self {
        self.segments.push(Vec::new());
        self
    }

    /// Framed bytes of every segment together with its file name.
    ///
    /// A segment is named after the index of its first entry, or the index
    /// following the previous segment's last entry when it holds none.
    ///
    /// # Errors
    ///
    /// Fails if a record cannot be framed.
    pub fn segment_files(&self) -> CoreResult<Vec<(String, Vec<u8>)>> {
        let mut next_index = 0;
        let mut files = Vec::with_capacity(self.segments.len());
        for (seq, records) in (0u64..).zip(&self.segments) {
            let first_index = records
                .iter()
                .find_map(|r| match r {
                    SegmentRecord::Entry(e) => Some(e.index),
                    _ => None,
                })
                .unwrap_or(next_index);

            let mut bytes = Vec::new();
            for record in records {
                bytes.extend(record.encode_framed()?);
                if let SegmentRecord::Entry(e) = record {
                    next_index = e.index + 1;
                }
            }
            files.push((SegmentName::new(seq, first_index).file_name(), bytes));
        }
        Ok(files)
    }

    /// Writes every segment into `dir`, which must exist.
    ///
    /// # Errors
    ///
    /// Fails on framing or I/O errors.
    pub fn write_to(&self, dir: &Path) -> CoreResult<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for (name, bytes) in self.segment_files()? {
            let path = dir.join(name);
            fs::write(&path, bytes)?;
            paths.push(path);
        }
        Ok(paths)
    }
}
