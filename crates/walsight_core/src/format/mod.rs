//! Deterministic text rendering of decoded records and report sections.
//!
//! One line per record:
//!
//! ```text
//! {term:>4}\t{index:>10}\t{conf|norm}\t{body}
//! ```
//!
//! Bodies print every field of the decoded message in wire order as
//! `name=value`. Strings and bytes are quoted with non-printable bytes
//! escaped, so output is byte-for-byte reproducible.

mod fields;
mod ops;

use walsight_codec::raftpb::HardState;
use walsight_codec::walpb::{Metadata, Snapshot};

use crate::classify::{
    ConfChangeBody, DecodedRecord, InternalRequest, LegacyRequest, NormalPayload, RecordBody,
    UnknownPayload, UnknownReason,
};
use crate::record::{EntryKind, RawRecord};

pub use fields::escape_bytes;
use fields::Fields;

/// Column header of the record section.
pub const COLUMN_HEADER: &str = "term\t     index\ttype\tdata";

/// Extra columns when decoder output is appended to every normal record.
pub const DECODER_COLUMN_HEADER: &str = "\tdecoder_status\tdecoded_data";

/// Renders the full line for a record.
#[must_use]
pub fn format_record(record: &DecodedRecord) -> String {
    format!("{}\t{}", entry_prefix(&record.raw), format_body(record))
}

/// Renders the term, index and kind columns of a record.
#[must_use]
pub fn entry_prefix(raw: &RawRecord) -> String {
    line_prefix(raw.term, raw.index, raw.kind)
}

/// Renders the term, index and kind columns.
#[must_use]
pub fn line_prefix(term: u64, index: u64, kind: EntryKind) -> String {
    format!("{term:>4}\t{index:>10}\t{}", kind.short_name())
}

/// Renders the decoded body of a record.
#[must_use]
pub fn format_body(record: &DecodedRecord) -> String {
    match &record.body {
        RecordBody::ConfChange(change) => conf_change(change),
        RecordBody::Normal(NormalPayload::Legacy(request)) => legacy(request),
        RecordBody::Normal(NormalPayload::Internal(request)) => internal(request),
        RecordBody::Normal(NormalPayload::Unknown(unknown)) => format_unknown(unknown),
    }
}

/// Renders an undecoded payload with its reason.
#[must_use]
pub fn format_unknown(unknown: &UnknownPayload) -> String {
    let data = escape_bytes(&unknown.bytes);
    match &unknown.reason {
        UnknownReason::Empty => "undecoded(empty)".to_string(),
        UnknownReason::NoShape => format!("undecoded(no known shape) data={data}"),
        UnknownReason::Exclusivity { populated } if populated.is_empty() => {
            format!("undecoded(0 sub-requests populated) data={data}")
        }
        UnknownReason::Exclusivity { populated } => format!(
            "undecoded({} sub-requests populated: {}) data={data}",
            populated.len(),
            populated.join(",")
        ),
    }
}

fn conf_change(change: &ConfChangeBody) -> String {
    let mut f = Fields::new();
    f.field("id", change.change_id)
        .field("type", change.change_type.label())
        .field("node_id", change.node_id)
        .bytes("context", &change.context);
    format!("conf_change {}", f.finish())
}

fn legacy(r: &LegacyRequest) -> String {
    let mut f = Fields::new();
    f.field("id", r.id)
        .field("method", &r.method)
        .text("path", &r.path)
        .text("val", &r.val)
        .field("dir", r.dir)
        .text("prev_value", &r.prev_value)
        .field("prev_index", r.prev_index)
        .optional("prev_exist", r.prev_exist)
        .field("expiration", r.expiration)
        .field("wait", r.wait)
        .field("since", r.since)
        .field("recursive", r.recursive)
        .field("sorted", r.sorted)
        .field("quorum", r.quorum)
        .field("time", r.time)
        .field("stream", r.stream)
        .optional("refresh", r.refresh);
    format!("request {}", f.finish())
}

fn internal(r: &InternalRequest) -> String {
    let mut f = Fields::new();
    f.field("id", r.id);
    if let Some(header) = &r.header {
        f.message("header", |f| ops::header(f, header));
    }
    ops::op(&mut f, &r.op);
    format!("internal_raft_request {}", f.finish())
}

/// Renders the snapshot section body.
#[must_use]
pub fn format_snapshot(snapshot: Option<&Snapshot>) -> String {
    match snapshot {
        Some(s) => format!("term={} index={}", s.term, s.index),
        None => "empty".to_string(),
    }
}

/// Renders the metadata section body. Member ids print in hex.
#[must_use]
pub fn format_metadata(metadata: Option<&Metadata>, state: &HardState) -> String {
    let (node_id, cluster_id) = metadata.map_or((0, 0), |m| (m.node_id, m.cluster_id));
    format!(
        "nodeID={node_id:x} clusterID={cluster_id:x} term={} commitIndex={} vote={:x}",
        state.term, state.commit, state.vote
    )
}

/// Renders the closing count line.
#[must_use]
pub fn format_footer(filter: &str, included: usize) -> String {
    format!("Entry types ({filter}) count is : {included}")
}
