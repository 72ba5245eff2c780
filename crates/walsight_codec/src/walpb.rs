//! Segment-level bookkeeping records.

use crate::scan::FieldSpec;
use crate::Schema;

/// Identity of the member that wrote the log.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Metadata {
    #[prost(uint64, tag = "1")]
    pub node_id: u64,
    #[prost(uint64, tag = "2")]
    pub cluster_id: u64,
}

impl Schema for Metadata {
    const NAME: &'static str = "walpb.Metadata";
    const FIELDS: &'static [FieldSpec] = &[FieldSpec::varint(1), FieldSpec::varint(2)];
}

/// Position of the snapshot the log continues from.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Snapshot {
    #[prost(uint64, tag = "1")]
    pub index: u64,
    #[prost(uint64, tag = "2")]
    pub term: u64,
}

impl Schema for Snapshot {
    const NAME: &'static str = "walpb.Snapshot";
    const FIELDS: &'static [FieldSpec] = &[FieldSpec::varint(1), FieldSpec::varint(2)];
}
