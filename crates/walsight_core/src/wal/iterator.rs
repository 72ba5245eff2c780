//! Streaming segment record iterator.
//!
//! Reads records one by one from a storage backend through a bounded read
//! buffer, so a large segment never has to be loaded whole.

use crate::error::{CoreError, CoreResult};
use crate::wal::segment::{
    compute_crc32, SegmentRecord, SegmentRecordType, CRC_SIZE, HEADER_SIZE, SEGMENT_MAGIC,
    SEGMENT_VERSION,
};
use walsight_storage::StorageBackend;

/// Read buffer size for streaming iteration.
const READ_BUFFER_SIZE: usize = 64 * 1024; // 64 KB

/// A streaming iterator over the records of one segment.
///
/// # Error Handling
///
/// - CRC mismatches return an error immediately
/// - Truncated records (incomplete header or payload) end iteration and
///   set [`Self::truncated_tail`]
/// - Invalid magic bytes return a corruption error
/// - Unknown record types return a corruption error
///
/// # Example
///
/// ```
/// use walsight_core::wal::SegmentIterator;
/// use walsight_storage::InMemoryBackend;
///
/// let backend = InMemoryBackend::new();
/// let mut iter = SegmentIterator::new(&backend).unwrap();
/// assert!(iter.next().is_none());
/// assert!(!iter.truncated_tail());
/// ```
pub struct SegmentIterator<'a> {
    backend: &'a dyn StorageBackend,
    /// Total size of the segment.
    total_size: u64,
    /// Offset of the next record.
    current_offset: u64,
    buffer: Vec<u8>,
    /// Position of `current_offset` within the buffer.
    buffer_pos: usize,
    /// Number of valid bytes in the buffer.
    buffer_len: usize,
    finished: bool,
    truncated: bool,
}

impl<'a> SegmentIterator<'a> {
    /// Creates an iterator positioned at the start of the segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend size cannot be determined.
    pub fn new(backend: &'a dyn StorageBackend) -> CoreResult<Self> {
        let total_size = backend.size()?;
        Ok(Self {
            backend,
            total_size,
            current_offset: 0,
            buffer: vec![0u8; READ_BUFFER_SIZE],
            buffer_pos: 0,
            buffer_len: 0,
            finished: false,
            truncated: false,
        })
    }

    /// Whether iteration stopped at an incomplete trailing record.
    #[must_use]
    pub fn truncated_tail(&self) -> bool {
        self.truncated
    }

    /// Offset just past the last complete record read so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.current_offset
    }

    /// Ensures at least `min_bytes` are buffered from the current position.
    ///
    /// Returns `false` if the segment ends first. Records larger than the
    /// buffer grow it to the next power of two.
    fn ensure_buffered(&mut self, min_bytes: usize) -> CoreResult<bool> {
        let available = self.buffer_len - self.buffer_pos;
        if available >= min_bytes {
            return Ok(true);
        }

        let unbuffered = self.total_size - self.current_offset - available as u64;
        if unbuffered < (min_bytes - available) as u64 {
            return Ok(false);
        }

        if self.buffer_pos > 0 && available > 0 {
            self.buffer.copy_within(self.buffer_pos..self.buffer_len, 0);
        }
        self.buffer_len = available;
        self.buffer_pos = 0;

        if min_bytes > self.buffer.len() {
            self.buffer.resize(min_bytes.next_power_of_two(), 0);
        }

        let room = (self.buffer.len() - self.buffer_len) as u64;
        #[allow(clippy::cast_possible_truncation)]
        let to_read = room.min(unbuffered) as usize;
        if to_read > 0 {
            let read_offset = self.current_offset + self.buffer_len as u64;
            let data = self.backend.read_at(read_offset, to_read)?;
            self.buffer[self.buffer_len..self.buffer_len + data.len()].copy_from_slice(&data);
            self.buffer_len += data.len();
        }

        Ok(self.buffer_len - self.buffer_pos >= min_bytes)
    }

    /// Reads the next record.
    ///
    /// Returns `Ok(None)` at the end of the segment or on a truncated record.
    fn read_next_record(&mut self) -> CoreResult<Option<(u64, SegmentRecord)>> {
        let offset = self.current_offset;

        if offset == self.total_size {
            return Ok(None);
        }
        if !self.ensure_buffered(HEADER_SIZE)? {
            self.truncated = true;
            return Ok(None);
        }

        let header = &self.buffer[self.buffer_pos..self.buffer_pos + HEADER_SIZE];

        if header[0..4] != SEGMENT_MAGIC {
            return Err(CoreError::wal_corruption(format!(
                "invalid magic at offset {offset}"
            )));
        }

        let version = u16::from_le_bytes([header[4], header[5]]);
        if version == 0 || version > SEGMENT_VERSION {
            return Err(CoreError::wal_corruption(format!(
                "unsupported version {version} at offset {offset}"
            )));
        }

        let type_byte = header[6];
        let record_type = SegmentRecordType::from_byte(type_byte).ok_or_else(|| {
            CoreError::wal_corruption(format!(
                "unknown record type {type_byte} at offset {offset}"
            ))
        })?;

        let payload_len =
            u32::from_le_bytes([header[7], header[8], header[9], header[10]]) as usize;
        let total_len = HEADER_SIZE + payload_len + CRC_SIZE;

        if !self.ensure_buffered(total_len)? {
            self.truncated = true;
            return Ok(None);
        }

        let payload_start = self.buffer_pos + HEADER_SIZE;
        let payload_end = payload_start + payload_len;
        let stored_crc = u32::from_le_bytes([
            self.buffer[payload_end],
            self.buffer[payload_end + 1],
            self.buffer[payload_end + 2],
            self.buffer[payload_end + 3],
        ]);
        let computed_crc = compute_crc32(&self.buffer[self.buffer_pos..payload_end]);
        if stored_crc != computed_crc {
            return Err(CoreError::ChecksumMismatch {
                offset,
                expected: stored_crc,
                actual: computed_crc,
            });
        }

        let record =
            SegmentRecord::decode_payload(record_type, &self.buffer[payload_start..payload_end])?;

        self.buffer_pos += total_len;
        self.current_offset += total_len as u64;

        Ok(Some((offset, record)))
    }
}

impl Iterator for SegmentIterator<'_> {
    type Item = CoreResult<(u64, SegmentRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_next_record() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walsight_codec::raftpb::{Entry, HardState};
    use walsight_codec::walpb::Metadata;
    use walsight_storage::InMemoryBackend;

    fn entry(index: u64, data: Vec<u8>) -> SegmentRecord {
        SegmentRecord::Entry(Entry {
            entry_type: 0,
            term: 1,
            index,
            data,
        })
    }

    fn frame_all(records: &[SegmentRecord]) -> Vec<u8> {
        records
            .iter()
            .flat_map(|r| r.encode_framed().unwrap())
            .collect()
    }

    fn collect(bytes: Vec<u8>) -> (Vec<CoreResult<(u64, SegmentRecord)>>, bool) {
        let backend = InMemoryBackend::with_data(bytes);
        let mut iter = SegmentIterator::new(&backend).unwrap();
        let items: Vec<_> = iter.by_ref().collect();
        (items, iter.truncated_tail())
    }

    #[test]
    fn iterator_empty_segment() {
        let (items, truncated) = collect(Vec::new());
        assert!(items.is_empty());
        assert!(!truncated);
    }

    #[test]
    fn iterator_reads_records_with_offsets() {
        let records = vec![
            SegmentRecord::Metadata(Metadata {
                node_id: 1,
                cluster_id: 2,
            }),
            entry(1, b"a".to_vec()),
            SegmentRecord::State(HardState {
                term: 1,
                vote: 1,
                commit: 1,
            }),
        ];
        let bytes = frame_all(&records);
        let (items, truncated) = collect(bytes);
        assert!(!truncated);

        let items: Vec<_> = items.into_iter().map(Result::unwrap).collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].0, 0);
        assert_eq!(
            items[1].0,
            records[0].encode_framed().unwrap().len() as u64
        );
        let decoded: Vec<_> = items.into_iter().map(|(_, r)| r).collect();
        assert_eq!(decoded, records);
    }

    #[test]
    fn iterator_truncated_header_is_clean_end() {
        let mut bytes = frame_all(&[entry(1, vec![1])]);
        bytes.extend_from_slice(&SEGMENT_MAGIC);
        let (items, truncated) = collect(bytes);
        assert_eq!(items.len(), 1);
        assert!(items[0].is_ok());
        assert!(truncated);
    }

    #[test]
    fn iterator_truncated_payload_is_clean_end() {
        let mut bytes = frame_all(&[entry(1, vec![1]), entry(2, vec![2; 40])]);
        bytes.truncate(bytes.len() - 10);
        let (items, truncated) = collect(bytes);
        assert_eq!(items.len(), 1);
        assert!(truncated);
    }

    #[test]
    fn iterator_crc_mismatch_is_fatal() {
        let mut bytes = frame_all(&[entry(1, b"payload".to_vec())]);
        bytes[HEADER_SIZE + 2] ^= 0xff;
        let (items, _) = collect(bytes);
        assert_eq!(items.len(), 1);
        assert!(matches!(
            items[0],
            Err(CoreError::ChecksumMismatch { offset: 0, .. })
        ));
    }

    #[test]
    fn iterator_bad_magic_is_fatal() {
        let mut bytes = frame_all(&[entry(1, vec![])]);
        bytes[0] = b'X';
        let (items, _) = collect(bytes);
        assert!(matches!(items[0], Err(CoreError::WalCorruption { .. })));
    }

    #[test]
    fn iterator_future_version_is_fatal() {
        let mut bytes = frame_all(&[entry(1, vec![])]);
        bytes[4] = 9;
        let (items, _) = collect(bytes);
        assert!(matches!(items[0], Err(CoreError::WalCorruption { .. })));
    }

    #[test]
    fn iterator_unknown_type_is_fatal() {
        let mut bytes = frame_all(&[entry(1, vec![])]);
        bytes[6] = 42;
        let (items, _) = collect(bytes);
        assert!(matches!(items[0], Err(CoreError::WalCorruption { .. })));
    }

    #[test]
    fn iterator_stops_after_error() {
        let mut bytes = frame_all(&[entry(1, vec![]), entry(2, vec![])]);
        bytes[0] = 0;
        let backend = InMemoryBackend::with_data(bytes);
        let mut iter = SegmentIterator::new(&backend).unwrap();
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }

    #[test]
    fn iterator_large_record_grows_buffer() {
        let big = vec![7u8; READ_BUFFER_SIZE * 2 + 3];
        let records = vec![entry(1, vec![1]), entry(2, big.clone()), entry(3, vec![3])];
        let (items, truncated) = collect(frame_all(&records));
        assert!(!truncated);
        let decoded: Vec<_> = items.into_iter().map(|r| r.unwrap().1).collect();
        assert_eq!(decoded, records);
    }

    #[test]
    fn iterator_many_small_records_cross_buffer_boundary() {
        let records: Vec<_> = (1..=5000).map(|i| entry(i, vec![(i % 251) as u8; 17])).collect();
        let (items, truncated) = collect(frame_all(&records));
        assert!(!truncated);
        assert_eq!(items.len(), records.len());
        assert!(items.iter().all(Result::is_ok));
    }
}
