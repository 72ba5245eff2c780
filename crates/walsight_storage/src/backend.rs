//! Storage backend trait definition.

use crate::error::StorageResult;

/// A read-only storage backend.
///
/// Backends are **opaque byte stores**. The segment reader owns all
/// interpretation of the bytes; backends do not understand records,
/// checksums or payloads.
///
/// # Invariants
///
/// - `read_at` returns exactly `len` bytes or an error, never a short read
/// - `size` does not change for the lifetime of the backend
/// - Backends must be `Send + Sync`
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For segment files
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The read would extend beyond the current size
    /// - An I/O error occurs
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Returns the size of the storage in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Returns how many bytes remain after `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn remaining(&self, offset: u64) -> StorageResult<u64> {
        Ok(self.size()?.saturating_sub(offset))
    }
}
