//! Payload classification.
//!
//! Membership change entries have a fixed shape; failing to decode one is
//! fatal. Normal entries are probed in a fixed order:
//!
//! 1. an empty payload is undecoded
//! 2. the internal request envelope, decoded strictly (every top-level field
//!    must belong to the envelope with a matching wire type)
//! 3. the legacy flat request, decoded strictly
//! 4. anything else is undecoded
//!
//! The two shapes share field number 1. An envelope that parses but does
//! not hold exactly one sub-request is reported as undecoded; it is not
//! retried as a legacy request.

mod confchange;
mod internal;
mod legacy;

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::record::{EntryKind, RawRecord};
use crate::tags::KindTag;

pub use confchange::{ChangeType, ConfChangeBody};
pub use internal::{InternalOp, InternalRequest};
pub use legacy::{LegacyRequest, Method};

use internal::Envelope;

/// Why a normal payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownReason {
    /// The payload is empty.
    Empty,
    /// No known shape accepts the payload.
    NoShape,
    /// The internal envelope parsed with zero or several sub-requests.
    Exclusivity {
        /// Field names of the populated sub-requests, in field order.
        populated: Vec<&'static str>,
    },
}

/// A normal payload no built-in shape could decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPayload {
    /// The payload, verbatim.
    pub bytes: Vec<u8>,
    /// Why decoding failed.
    pub reason: UnknownReason,
}

/// Decoded body of a normal entry.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalPayload {
    /// Flat legacy request.
    Legacy(LegacyRequest),
    /// Internal request envelope.
    Internal(InternalRequest),
    /// Undecoded payload.
    Unknown(UnknownPayload),
}

/// Decoded body of an entry.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBody {
    /// Membership change.
    ConfChange(ConfChangeBody),
    /// Normal entry.
    Normal(NormalPayload),
}

/// A raw record together with its decoded body and kind tags.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    /// The record as read from the log.
    pub raw: RawRecord,
    /// The decoded body.
    pub body: RecordBody,
    /// Every kind tag the record matches.
    pub tags: BTreeSet<KindTag>,
}

impl DecodedRecord {
    /// Whether the normal payload could not be decoded.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self.body, RecordBody::Normal(NormalPayload::Unknown(_)))
    }

    /// The undecoded payload, if any.
    #[must_use]
    pub fn unknown(&self) -> Option<&UnknownPayload> {
        match &self.body {
            RecordBody::Normal(NormalPayload::Unknown(unknown)) => Some(unknown),
            _ => None,
        }
    }
}

/// Classifies and decodes one record.
///
/// Pure: the same record always yields the same result.
///
/// # Errors
///
/// Returns [`CoreError::Classification`] if a membership change entry does
/// not decode or carries an unknown change type. Normal entries never fail.
pub fn classify(raw: RawRecord) -> CoreResult<DecodedRecord> {
    let mut tags = BTreeSet::new();
    let body = match raw.kind {
        EntryKind::ConfigChange => {
            tags.insert(KindTag::ConfigChange);
            let change = confchange::decode(&raw.payload)
                .map_err(|e| CoreError::classification(raw.index, e))?;
            RecordBody::ConfChange(change)
        }
        EntryKind::Normal => {
            tags.insert(KindTag::Normal);
            let payload = classify_normal(&raw);
            match &payload {
                NormalPayload::Legacy(_) => {
                    tags.insert(KindTag::Request);
                }
                NormalPayload::Internal(request) => {
                    tags.insert(KindTag::InternalRaftRequest);
                    tags.insert(request.op.tag());
                }
                NormalPayload::Unknown(_) => {}
            }
            RecordBody::Normal(payload)
        }
    };
    Ok(DecodedRecord { raw, body, tags })
}

fn classify_normal(raw: &RawRecord) -> NormalPayload {
    let unknown = |reason| {
        NormalPayload::Unknown(UnknownPayload {
            bytes: raw.payload.clone(),
            reason,
        })
    };

    if raw.payload.is_empty() {
        return unknown(UnknownReason::Empty);
    }

    let envelope_err = match internal::decode(&raw.payload) {
        Ok(Envelope::Single(request)) => return NormalPayload::Internal(request),
        Ok(Envelope::Exclusivity(populated)) => {
            debug!(
                "Entry {}: internal request with {} sub-requests",
                raw.index,
                populated.len()
            );
            return unknown(UnknownReason::Exclusivity { populated });
        }
        Err(e) => e,
    };

    match legacy::decode(&raw.payload) {
        Ok(request) => NormalPayload::Legacy(request),
        Err(legacy_err) => {
            debug!(
                "Entry {}: no known shape (internal: {}; legacy: {})",
                raw.index, envelope_err, legacy_err
            );
            unknown(UnknownReason::NoShape)
        }
    }
}
