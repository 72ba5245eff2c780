//! Raft consensus messages stored in the log.

use crate::scan::FieldSpec;
use crate::{EnumLabel, Schema};

/// Kind of a raft log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum EntryType {
    /// Application payload.
    EntryNormal = 0,
    /// Cluster membership change.
    EntryConfChange = 1,
    /// Joint-consensus membership change.
    EntryConfChangeV2 = 2,
}

impl EnumLabel for EntryType {
    const NAME: &'static str = "EntryType";

    fn label(self) -> &'static str {
        match self {
            Self::EntryNormal => "EntryNormal",
            Self::EntryConfChange => "EntryConfChange",
            Self::EntryConfChangeV2 => "EntryConfChangeV2",
        }
    }
}

/// One raft log entry.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Entry {
    #[prost(enumeration = "EntryType", tag = "1")]
    pub entry_type: i32,
    #[prost(uint64, tag = "2")]
    pub term: u64,
    #[prost(uint64, tag = "3")]
    pub index: u64,
    #[prost(bytes = "vec", tag = "4")]
    pub data: Vec<u8>,
}

impl Schema for Entry {
    const NAME: &'static str = "raftpb.Entry";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::varint(1),
        FieldSpec::varint(2),
        FieldSpec::varint(3),
        FieldSpec::len(4),
    ];
}

/// Kind of membership change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ConfChangeType {
    /// Add a voting member.
    ConfChangeAddNode = 0,
    /// Remove a member.
    ConfChangeRemoveNode = 1,
    /// Update a member's context.
    ConfChangeUpdateNode = 2,
    /// Add a non-voting learner.
    ConfChangeAddLearnerNode = 3,
}

impl EnumLabel for ConfChangeType {
    const NAME: &'static str = "ConfChangeType";

    fn label(self) -> &'static str {
        match self {
            Self::ConfChangeAddNode => "ConfChangeAddNode",
            Self::ConfChangeRemoveNode => "ConfChangeRemoveNode",
            Self::ConfChangeUpdateNode => "ConfChangeUpdateNode",
            Self::ConfChangeAddLearnerNode => "ConfChangeAddLearnerNode",
        }
    }
}

/// A single-step membership change.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConfChange {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(enumeration = "ConfChangeType", tag = "2")]
    pub change_type: i32,
    #[prost(uint64, tag = "3")]
    pub node_id: u64,
    #[prost(bytes = "vec", tag = "4")]
    pub context: Vec<u8>,
}

impl Schema for ConfChange {
    const NAME: &'static str = "raftpb.ConfChange";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::varint(1),
        FieldSpec::varint(2),
        FieldSpec::varint(3),
        FieldSpec::len(4),
    ];
}

/// Persistent raft state.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HardState {
    #[prost(uint64, tag = "1")]
    pub term: u64,
    #[prost(uint64, tag = "2")]
    pub vote: u64,
    #[prost(uint64, tag = "3")]
    pub commit: u64,
}

impl Schema for HardState {
    const NAME: &'static str = "raftpb.HardState";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::varint(1),
        FieldSpec::varint(2),
        FieldSpec::varint(3),
    ];
}
