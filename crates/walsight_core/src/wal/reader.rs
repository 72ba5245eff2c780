//! Segment discovery and replay of a WAL directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walsight_codec::raftpb::{Entry, EntryType, HardState};
use walsight_codec::walpb::{Metadata, Snapshot};
use walsight_codec::EnumLabel;
use walsight_storage::{FileBackend, StorageBackend};

use crate::error::{CoreError, CoreResult};
use crate::record::{EntryKind, RawRecord};
use crate::wal::iterator::SegmentIterator;
use crate::wal::segment::{SegmentName, SegmentRecord};

/// Options controlling replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Drop entries whose index is below this value.
    pub start_index: Option<u64>,
}

/// The replayed state of a WAL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalContents {
    /// Identity of the writing member, if recorded.
    pub metadata: Option<Metadata>,
    /// The last persisted raft state.
    pub hard_state: HardState,
    /// The last snapshot marker, if any.
    pub snapshot: Option<Snapshot>,
    /// Committed entries in log order.
    pub entries: Vec<RawRecord>,
}

impl WalContents {
    /// Index of the last replayed entry.
    #[must_use]
    pub fn last_index(&self) -> Option<u64> {
        self.entries.last().map(|e| e.index)
    }
}

/// Lists segment files in `dir` in log order.
///
/// Files whose names do not parse as segment names are ignored.
///
/// # Errors
///
/// Returns [`CoreError::WalNotFound`] if the directory is missing or holds
/// no segment, and a corruption error if sequence numbers are not
/// consecutive.
pub fn list_segments(dir: &Path) -> CoreResult<Vec<(SegmentName, PathBuf)>> {
    if !dir.is_dir() {
        return Err(CoreError::WalNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut segments = Vec::new();
    for dirent in fs::read_dir(dir)? {
        let dirent = dirent?;
        let file_name = dirent.file_name();
        let Some(name) = file_name.to_str().and_then(SegmentName::parse) else {
            debug!("Skipping non-segment file {:?}", file_name);
            continue;
        };
        segments.push((name, dirent.path()));
    }
    segments.sort_by_key(|(name, _)| *name);

    let Some((first, _)) = segments.first() else {
        return Err(CoreError::WalNotFound {
            path: dir.to_path_buf(),
        });
    };
    let first_seq = first.seq;
    for (expected, (name, path)) in (first_seq..).zip(&segments) {
        if name.seq != expected {
            return Err(CoreError::wal_corruption(format!(
                "segment sequence gap: expected {expected}, found {} ({})",
                name.seq,
                path.display()
            )));
        }
    }

    Ok(segments)
}

/// Reads and replays every segment in `dir`.
///
/// # Errors
///
/// Fails for the whole run on any structural problem: missing directory,
/// unreadable or corrupt segment, truncation before the last segment,
/// conflicting metadata, unsupported entry types, or index gaps.
pub fn read_wal(dir: &Path, options: &ReadOptions) -> CoreResult<WalContents> {
    let paths = list_segments(dir)?;
    info!("Reading {} WAL segment(s) from {:?}", paths.len(), dir);

    let backends = paths
        .iter()
        .map(|(_, path)| FileBackend::open(path))
        .collect::<Result<Vec<_>, _>>()?;
    let segments: Vec<&dyn StorageBackend> = backends
        .iter()
        .map(|b| b as &dyn StorageBackend)
        .collect();
    replay_segments(&segments, options)
}

/// Replays segments already opened on storage backends, in the given order.
///
/// # Errors
///
/// See [`read_wal`].
pub fn replay_segments(
    segments: &[&dyn StorageBackend],
    options: &ReadOptions,
) -> CoreResult<WalContents> {
    let mut replay = Replay::default();
    let last = segments.len().saturating_sub(1);

    for (i, backend) in segments.iter().enumerate() {
        let mut iter = SegmentIterator::new(*backend)?;
        for item in iter.by_ref() {
            let (offset, record) = item?;
            replay.apply(record).map_err(|e| match e {
                CoreError::WalCorruption { message } => CoreError::wal_corruption(format!(
                    "segment {i} offset {offset}: {message}"
                )),
                other => other,
            })?;
        }
        if iter.truncated_tail() {
            if i != last {
                return Err(CoreError::wal_corruption(format!(
                    "segment {i} ends with a truncated record at offset {}",
                    iter.position()
                )));
            }
            warn!(
                "Ignoring truncated record at offset {} of the last segment",
                iter.position()
            );
        }
    }

    Ok(replay.finish(options))
}

#[derive(Default)]
struct Replay {
    metadata: Option<Metadata>,
    hard_state: HardState,
    snapshot: Option<Snapshot>,
    entries: Vec<RawRecord>,
}

impl Replay {
    fn apply(&mut self, record: SegmentRecord) -> CoreResult<()> {
        match record {
            SegmentRecord::Metadata(metadata) => match &self.metadata {
                Some(existing) if *existing != metadata => {
                    return Err(CoreError::wal_corruption(format!(
                        "conflicting metadata: node {:x} cluster {:x} after node {:x} cluster {:x}",
                        metadata.node_id, metadata.cluster_id, existing.node_id, existing.cluster_id
                    )));
                }
                _ => self.metadata = Some(metadata),
            },
            SegmentRecord::State(state) => self.hard_state = state,
            SegmentRecord::Snapshot(snapshot) => {
                self.entries.retain(|e| e.index > snapshot.index);
                self.snapshot = Some(snapshot);
            }
            SegmentRecord::Entry(entry) => self.push_entry(entry)?,
        }
        Ok(())
    }

    fn push_entry(&mut self, entry: Entry) -> CoreResult<()> {
        let kind = match EntryType::from_wire(entry.entry_type) {
            Ok(EntryType::EntryNormal) => EntryKind::Normal,
            Ok(EntryType::EntryConfChange) => EntryKind::ConfigChange,
            Ok(other) => {
                return Err(CoreError::wal_corruption(format!(
                    "entry {} has unsupported type {}",
                    entry.index,
                    other.label()
                )));
            }
            Err(e) => {
                return Err(CoreError::wal_corruption(format!(
                    "entry {}: {e}",
                    entry.index
                )));
            }
        };

        if let Some(snapshot) = &self.snapshot {
            if entry.index <= snapshot.index {
                return Ok(());
            }
        }

        let expected = match (self.entries.last(), &self.snapshot) {
            (Some(last), _) => Some(last.index + 1),
            (None, Some(snapshot)) => Some(snapshot.index + 1),
            (None, None) => None,
        };
        if let Some(expected) = expected {
            if entry.index > expected {
                return Err(CoreError::wal_corruption(format!(
                    "index gap: expected entry {expected}, found {}",
                    entry.index
                )));
            }
            if entry.index < expected {
                let keep = self.entries.partition_point(|e| e.index < entry.index);
                debug!(
                    "Entry {} overwrites {} replayed entries",
                    entry.index,
                    self.entries.len() - keep
                );
                self.entries.truncate(keep);
            }
        }

        self.entries.push(RawRecord {
            term: entry.term,
            index: entry.index,
            kind,
            payload: entry.data,
        });
        Ok(())
    }

    fn finish(mut self, options: &ReadOptions) -> WalContents {
        if let Some(start) = options.start_index {
            self.entries.retain(|e| e.index >= start);
        }
        WalContents {
            metadata: self.metadata,
            hard_state: self.hard_state,
            snapshot: self.snapshot,
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use walsight_storage::InMemoryBackend;

    fn entry(term: u64, index: u64, entry_type: EntryType) -> SegmentRecord {
        SegmentRecord::Entry(Entry {
            entry_type: entry_type as i32,
            term,
            index,
            data: vec![index as u8],
        })
    }

    fn normal(term: u64, index: u64) -> SegmentRecord {
        entry(term, index, EntryType::EntryNormal)
    }

    fn segment(records: &[SegmentRecord]) -> InMemoryBackend {
        InMemoryBackend::with_data(
            records
                .iter()
                .flat_map(|r| r.encode_framed().unwrap())
                .collect(),
        )
    }

    fn replay(segments: &[InMemoryBackend], options: &ReadOptions) -> CoreResult<WalContents> {
        let refs: Vec<&dyn StorageBackend> =
            segments.iter().map(|s| s as &dyn StorageBackend).collect();
        replay_segments(&refs, options)
    }

    fn indexes(contents: &WalContents) -> Vec<u64> {
        contents.entries.iter().map(|e| e.index).collect()
    }

    #[test]
    fn replay_across_segments() {
        let segments = [
            segment(&[
                SegmentRecord::Metadata(Metadata {
                    node_id: 1,
                    cluster_id: 2,
                }),
                entry(1, 1, EntryType::EntryConfChange),
                normal(1, 2),
            ]),
            segment(&[
                SegmentRecord::Metadata(Metadata {
                    node_id: 1,
                    cluster_id: 2,
                }),
                normal(2, 3),
                SegmentRecord::State(HardState {
                    term: 2,
                    vote: 1,
                    commit: 3,
                }),
            ]),
        ];
        let contents = replay(&segments, &ReadOptions::default()).unwrap();
        assert_eq!(indexes(&contents), vec![1, 2, 3]);
        assert_eq!(contents.entries[0].kind, EntryKind::ConfigChange);
        assert_eq!(contents.entries[1].kind, EntryKind::Normal);
        assert_eq!(contents.hard_state.commit, 3);
        assert_eq!(contents.last_index(), Some(3));
    }

    #[test]
    fn last_state_wins() {
        let segments = [segment(&[
            SegmentRecord::State(HardState {
                term: 1,
                vote: 0,
                commit: 0,
            }),
            SegmentRecord::State(HardState {
                term: 5,
                vote: 2,
                commit: 9,
            }),
        ])];
        let contents = replay(&segments, &ReadOptions::default()).unwrap();
        assert_eq!(contents.hard_state.term, 5);
        assert!(contents.entries.is_empty());
        assert_eq!(contents.last_index(), None);
    }

    #[test]
    fn overwrite_truncates_tail() {
        let segments = [segment(&[
            normal(1, 1),
            normal(1, 2),
            normal(1, 3),
            normal(2, 2),
            normal(2, 3),
        ])];
        let contents = replay(&segments, &ReadOptions::default()).unwrap();
        assert_eq!(indexes(&contents), vec![1, 2, 3]);
        assert_eq!(contents.entries[1].term, 2);
        assert_eq!(contents.entries[2].term, 2);
    }

    #[test]
    fn index_gap_is_fatal() {
        let segments = [segment(&[normal(1, 1), normal(1, 3)])];
        let err = replay(&segments, &ReadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("index gap"));
    }

    #[test]
    fn snapshot_drops_covered_entries() {
        let segments = [segment(&[
            normal(1, 4),
            normal(1, 5),
            SegmentRecord::Snapshot(Snapshot { index: 5, term: 1 }),
            normal(1, 5),
            normal(1, 6),
        ])];
        let contents = replay(&segments, &ReadOptions::default()).unwrap();
        assert_eq!(indexes(&contents), vec![6]);
        assert_eq!(contents.snapshot, Some(Snapshot { index: 5, term: 1 }));
    }

    #[test]
    fn snapshot_requires_next_index() {
        let segments = [segment(&[
            SegmentRecord::Snapshot(Snapshot { index: 5, term: 1 }),
            normal(1, 8),
        ])];
        assert!(replay(&segments, &ReadOptions::default()).is_err());
    }

    #[test]
    fn start_index_filters() {
        let segments = [segment(&[normal(1, 1), normal(1, 2), normal(1, 3)])];
        let options = ReadOptions {
            start_index: Some(2),
        };
        let contents = replay(&segments, &options).unwrap();
        assert_eq!(indexes(&contents), vec![2, 3]);
    }

    #[test]
    fn conflicting_metadata_is_fatal() {
        let segments = [segment(&[
            SegmentRecord::Metadata(Metadata {
                node_id: 1,
                cluster_id: 2,
            }),
            SegmentRecord::Metadata(Metadata {
                node_id: 3,
                cluster_id: 2,
            }),
        ])];
        let err = replay(&segments, &ReadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("conflicting metadata"));
    }

    #[test]
    fn unsupported_entry_type_is_fatal() {
        let segments = [segment(&[entry(1, 1, EntryType::EntryConfChangeV2)])];
        let err = replay(&segments, &ReadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("EntryConfChangeV2"));
    }

    #[test]
    fn truncation_in_last_segment_is_tolerated() {
        let mut bytes: Vec<u8> = [normal(1, 1), normal(1, 2)]
            .iter()
            .flat_map(|r| r.encode_framed().unwrap())
            .collect();
        bytes.truncate(bytes.len() - 3);
        let segments = [InMemoryBackend::with_data(bytes)];
        let contents = replay(&segments, &ReadOptions::default()).unwrap();
        assert_eq!(indexes(&contents), vec![1]);
    }

    #[test]
    fn truncation_before_last_segment_is_fatal() {
        let mut bytes: Vec<u8> = normal(1, 1).encode_framed().unwrap();
        bytes.truncate(bytes.len() - 1);
        let segments = [InMemoryBackend::with_data(bytes), segment(&[normal(1, 1)])];
        assert!(matches!(
            replay(&segments, &ReadOptions::default()),
            Err(CoreError::WalCorruption { .. })
        ));
    }

    #[test]
    fn list_segments_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        for name in [SegmentName::new(1, 5), SegmentName::new(0, 0)] {
            fs::write(dir.path().join(name.file_name()), b"").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::write(dir.path().join("0.tmp"), b"").unwrap();

        let segments = list_segments(dir.path()).unwrap();
        let names: Vec<_> = segments.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec![SegmentName::new(0, 0), SegmentName::new(1, 5)]);
    }

    #[test]
    fn list_segments_sequence_gap() {
        let dir = tempdir().unwrap();
        for name in [SegmentName::new(0, 0), SegmentName::new(2, 5)] {
            fs::write(dir.path().join(name.file_name()), b"").unwrap();
        }
        assert!(matches!(
            list_segments(dir.path()),
            Err(CoreError::WalCorruption { .. })
        ));
    }

    #[test]
    fn missing_or_empty_directory() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_wal(dir.path(), &ReadOptions::default()),
            Err(CoreError::WalNotFound { .. })
        ));
        assert!(matches!(
            read_wal(&dir.path().join("missing"), &ReadOptions::default()),
            Err(CoreError::WalNotFound { .. })
        ));
    }

    #[test]
    fn read_wal_from_files() {
        let dir = tempdir().unwrap();
        let bytes: Vec<u8> = [normal(1, 1), normal(1, 2)]
            .iter()
            .flat_map(|r| r.encode_framed().unwrap())
            .collect();
        fs::write(dir.path().join(SegmentName::new(0, 0).file_name()), bytes).unwrap();

        let contents = read_wal(dir.path(), &ReadOptions::default()).unwrap();
        assert_eq!(indexes(&contents), vec![1, 2]);
        assert_eq!(contents.entries[1].payload, vec![2]);
    }
}
