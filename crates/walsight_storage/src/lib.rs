//! # Walsight Storage
//!
//! Read-only storage backends for walsight.
//!
//! Storage backends are **opaque byte stores** - they do not interpret
//! the data they hold. The log is never mutated, so backends expose
//! positioned reads and a size, nothing else.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing
//! - [`FileBackend`] - Segment files opened read-only
//!
//! ## Example
//!
//! ```rust
//! use walsight_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::with_data(b"hello world".to_vec());
//! let data = backend.read_at(0, 5).unwrap();
//! assert_eq!(&data, b"hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
