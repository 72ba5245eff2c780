//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};

/// An in-memory storage backend.
///
/// Holds a fixed byte buffer, suitable for unit tests of the segment
/// reader without touching the file system.
///
/// # Example
///
/// ```rust
/// use walsight_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::with_data(b"test data".to_vec());
/// assert_eq!(backend.size().unwrap(), 9);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: Vec<u8>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with pre-existing data.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let size = self.data.len() as u64;
        let end = offset.saturating_add(len as u64);

        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        #[allow(clippy::cast_possible_truncation)]
        let start = offset as usize;
        Ok(self.data[start..start + len].to_vec())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(backend.read_at(0, 0).unwrap().is_empty());
    }

    #[test]
    fn memory_read_partial() {
        let backend = InMemoryBackend::with_data(b"hello world".to_vec());
        assert_eq!(backend.read_at(6, 5).unwrap(), b"world");
    }

    #[test]
    fn memory_read_past_end_fails() {
        let backend = InMemoryBackend::with_data(b"hello".to_vec());
        assert!(matches!(
            backend.read_at(10, 5),
            Err(StorageError::ReadPastEnd { .. })
        ));
        assert!(matches!(
            backend.read_at(u64::MAX, 1),
            Err(StorageError::ReadPastEnd { .. })
        ));
    }

    #[test]
    fn memory_remaining() {
        let backend = InMemoryBackend::with_data(vec![0; 8]);
        assert_eq!(backend.remaining(3).unwrap(), 5);
        assert_eq!(backend.remaining(20).unwrap(), 0);
    }

    proptest! {
        #[test]
        fn memory_read_matches_slice(
            data in proptest::collection::vec(any::<u8>(), 0..256),
            offset in 0usize..300,
            len in 0usize..300,
        ) {
            let backend = InMemoryBackend::with_data(data.clone());
            let result = backend.read_at(offset as u64, len);
            if offset + len <= data.len() {
                prop_assert_eq!(result.unwrap(), data[offset..offset + len].to_vec());
            } else {
                prop_assert!(result.is_err());
            }
        }
    }
}
