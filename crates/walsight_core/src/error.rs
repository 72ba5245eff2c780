//! Error types for walsight core.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that abort a report run.
///
/// Record-level problems (undecodable normal payloads, malformed decoder
/// replies) are not errors; they are carried in the decoded record and
/// annotated in the report.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] walsight_storage::StorageError),

    /// Schema decoding error outside of a record payload.
    #[error("codec error: {0}")]
    Codec(#[from] walsight_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The WAL directory is missing or holds no segment files.
    #[error("no WAL segments found in {}", path.display())]
    WalNotFound {
        /// The directory that was searched.
        path: PathBuf,
    },

    /// WAL is corrupted or invalid.
    #[error("WAL corruption: {message}")]
    WalCorruption {
        /// Description of the corruption.
        message: String,
    },

    /// Checksum mismatch detected.
    #[error("checksum mismatch at offset {offset}: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Offset of the record within its segment.
        offset: u64,
        /// Stored checksum.
        expected: u32,
        /// Computed checksum.
        actual: u32,
    },

    /// A membership change entry did not decode.
    #[error("cannot classify entry {index}: {source}")]
    Classification {
        /// Index of the offending entry.
        index: u64,
        /// The underlying decode failure.
        source: walsight_codec::CodecError,
    },

    /// Invalid user configuration.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// Invalid argument passed to an encoding helper.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// The external decoder could not be started.
    #[error("cannot start external decoder {}: {source}", program.display())]
    DecoderSpawn {
        /// The configured program.
        program: PathBuf,
        /// The spawn failure.
        source: io::Error,
    },

    /// The external decoder stopped serving requests.
    #[error("external decoder {} exited unexpectedly ({status})", program.display())]
    DecoderExited {
        /// The configured program.
        program: PathBuf,
        /// Exit status as far as it could be determined.
        status: String,
    },

    /// Reading from or writing to the external decoder failed.
    #[error("external decoder {} I/O error: {source}", program.display())]
    DecoderIo {
        /// The configured program.
        program: PathBuf,
        /// The I/O failure.
        source: io::Error,
    },

    /// The external decoder did not answer in time.
    #[error("external decoder {} did not answer entry {index} within {timeout:?}", program.display())]
    DecoderTimeout {
        /// The configured program.
        program: PathBuf,
        /// Index of the entry awaiting an answer.
        index: u64,
        /// The configured timeout.
        timeout: Duration,
    },
}

impl CoreError {
    /// Creates a WAL corruption error.
    pub fn wal_corruption(message: impl Into<String>) -> Self {
        Self::WalCorruption {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a classification error for the entry at `index`.
    pub fn classification(index: u64, source: walsight_codec::CodecError) -> Self {
        Self::Classification { index, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walsight_codec::CodecError;

    #[test]
    fn error_messages() {
        assert_eq!(
            CoreError::wal_corruption("bad magic").to_string(),
            "WAL corruption: bad magic"
        );
        assert_eq!(
            CoreError::config("unknown entry type \"Foo\"").to_string(),
            "invalid configuration: unknown entry type \"Foo\""
        );
        assert_eq!(
            CoreError::classification(3, CodecError::unknown_enum("ConfChangeType", 9)).to_string(),
            "cannot classify entry 3: unknown ConfChangeType value 9"
        );
    }

    #[test]
    fn checksum_message_is_hex() {
        let err = CoreError::ChecksumMismatch {
            offset: 15,
            expected: 0xdead_beef,
            actual: 0x1,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch at offset 15: expected deadbeef, got 00000001"
        );
    }
}
