//! Raw log records as produced by WAL replay.

use std::fmt;

/// Top-level kind of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryKind {
    /// Cluster membership change.
    ConfigChange,
    /// Application payload.
    Normal,
}

impl EntryKind {
    /// Short column label used in the report.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::ConfigChange => "conf",
            Self::Normal => "norm",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// One committed log entry with its payload still opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Raft term the entry was proposed in.
    pub term: u64,
    /// Position in the log.
    pub index: u64,
    /// Top-level kind.
    pub kind: EntryKind,
    /// Encoded payload.
    pub payload: Vec<u8>,
}

impl RawRecord {
    /// Creates a normal entry.
    #[must_use]
    pub fn normal(term: u64, index: u64, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            term,
            index,
            kind: EntryKind::Normal,
            payload: payload.into(),
        }
    }

    /// Creates a membership change entry.
    #[must_use]
    pub fn config_change(term: u64, index: u64, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            term,
            index,
            kind: EntryKind::ConfigChange,
            payload: payload.into(),
        }
    }
}
