//! # Walsight Codec
//!
//! Protobuf schema of the consensus log and strict decoding against it.
//!
//! The message types are `prost` structs mirroring the wire schema of the
//! replicated log:
//!
//! - [`raftpb`]: log entries, membership changes, hard state
//! - [`walpb`]: segment metadata and snapshot markers
//! - [`etcdserverpb`]: the legacy flat request and the internal request envelope
//! - [`authpb`]: permissions and user options
//!
//! ## Strict decoding
//!
//! Protobuf decoders skip unknown fields, so unrelated message shapes can
//! accept the same bytes. [`Decode::decode_strict`] first walks the
//! top-level fields and rejects any field number or wire type the schema
//! does not declare, then hands the payload to `prost`.
//!
//! ```
//! use walsight_codec::raftpb::ConfChange;
//! use walsight_codec::{Decode, Encode};
//!
//! let change = ConfChange { id: 7, node_id: 2, ..Default::default() };
//! let bytes = change.encode_payload();
//! assert_eq!(ConfChange::decode_strict(&bytes).unwrap(), change);
//! assert!(ConfChange::decode_strict(b"?").is_err());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::borrow::Cow;

mod error;
mod scan;

#[allow(missing_docs)]
pub mod authpb;
#[allow(missing_docs)]
pub mod etcdserverpb;
#[allow(missing_docs)]
pub mod raftpb;
#[allow(missing_docs)]
pub mod walpb;

pub use error::{CodecError, CodecResult};
pub use scan::{check_fields, FieldScanner, FieldSpec, WireType};

/// A message whose top-level fields are known ahead of decoding.
pub trait Schema: prost::Message + Default {
    /// Fully qualified message name used in diagnostics.
    const NAME: &'static str;

    /// Every top-level field the message may carry.
    const FIELDS: &'static [FieldSpec];
}

/// A protobuf enumeration with a stable printable label per variant.
pub trait EnumLabel: TryFrom<i32> + Copy {
    /// Enumeration name used in diagnostics.
    const NAME: &'static str;

    /// The variant label as it appears in reports.
    fn label(self) -> &'static str;

    /// Converts a raw wire value, rejecting values outside the declared range.
    fn from_wire(value: i32) -> CodecResult<Self> {
        Self::try_from(value).map_err(|_| CodecError::unknown_enum(Self::NAME, value))
    }
}

/// Renders a raw enumeration value, falling back to the number itself for
/// values this schema revision does not know.
pub fn label_of<E: EnumLabel>(value: i32) -> Cow<'static, str> {
    match E::try_from(value) {
        Ok(variant) => Cow::Borrowed(variant.label()),
        Err(_) => Cow::Owned(value.to_string()),
    }
}

/// Trait for types that can be encoded to payload bytes.
pub trait Encode {
    /// Encode this value to protobuf bytes.
    fn encode_payload(&self) -> Vec<u8>;
}

impl<M: prost::Message> Encode for M {
    fn encode_payload(&self) -> Vec<u8> {
        self.encode_to_vec()
    }
}

/// Trait for types that can be decoded strictly from payload bytes.
pub trait Decode: Sized {
    /// Decode this value, rejecting fields outside the schema.
    fn decode_strict(bytes: &[u8]) -> CodecResult<Self>;
}

impl<M: Schema> Decode for M {
    fn decode_strict(bytes: &[u8]) -> CodecResult<Self> {
        check_fields(bytes, M::NAME, M::FIELDS)?;
        M::decode(bytes).map_err(|e| CodecError::malformed(M::NAME, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::etcdserverpb::{
        compare, request_op, Compare, DeleteRangeRequest, InternalRaftRequest, PutRequest,
        Request, RequestOp, TxnRequest,
    };
    use super::raftpb::{ConfChange, ConfChangeType, Entry, EntryType};
    use super::*;

    #[test]
    fn decode_conf_change() {
        let change = ConfChange {
            id: 1,
            change_type: ConfChangeType::ConfChangeRemoveNode as i32,
            node_id: 2,
            context: b"ctx".to_vec(),
        };
        let decoded = ConfChange::decode_strict(&change.encode_payload()).unwrap();
        assert_eq!(decoded, change);
        assert_eq!(
            ConfChangeType::from_wire(decoded.change_type).unwrap(),
            ConfChangeType::ConfChangeRemoveNode
        );
    }

    #[test]
    fn from_wire_rejects_unknown_value() {
        assert_eq!(
            ConfChangeType::from_wire(9),
            Err(CodecError::UnknownEnumValue {
                enumeration: "ConfChangeType",
                value: 9
            })
        );
    }

    #[test]
    fn label_of_falls_back_to_number() {
        assert_eq!(label_of::<EntryType>(1), "EntryConfChange");
        assert_eq!(label_of::<EntryType>(42), "42");
    }

    #[test]
    fn empty_payload_decodes_to_default() {
        assert_eq!(Entry::decode_strict(&[]).unwrap(), Entry::default());
    }

    #[test]
    fn legacy_request_fields_survive() {
        let request = Request {
            id: 5,
            method: "PUT".to_string(),
            path: "/foo".to_string(),
            val: "bar".to_string(),
            prev_exist: Some(false),
            refresh: Some(true),
            ..Default::default()
        };
        let decoded = Request::decode_strict(&request.encode_payload()).unwrap();
        assert_eq!(decoded.prev_exist, Some(false));
        assert_eq!(decoded.refresh, Some(true));
        assert_eq!(decoded, request);
    }

    #[test]
    fn internal_request_rejected_as_legacy() {
        let internal = InternalRaftRequest {
            id: 3,
            put: Some(PutRequest {
                key: b"k".to_vec(),
                value: b"v".to_vec(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let bytes = internal.encode_payload();
        // field 4 is a string in both shapes, field 1 is shared
        assert!(InternalRaftRequest::decode_strict(&bytes).is_ok());
        assert!(Request::decode_strict(&bytes).is_ok());

        let internal = InternalRaftRequest {
            id: 3,
            delete_range: Some(DeleteRangeRequest::default()),
            txn: Some(TxnRequest::default()),
            ..Default::default()
        };
        // fields 5 and 6 are varints in the legacy shape
        assert!(matches!(
            Request::decode_strict(&internal.encode_payload()),
            Err(CodecError::WireTypeMismatch { number: 5, .. })
        ));
    }

    #[test]
    fn legacy_request_rejected_as_internal() {
        let request = Request {
            id: 1,
            method: "GET".to_string(),
            ..Default::default()
        };
        assert_eq!(
            InternalRaftRequest::decode_strict(&request.encode_payload()),
            Err(CodecError::UnknownField {
                message: "etcdserverpb.InternalRaftRequest",
                number: 2
            })
        );
    }

    #[test]
    fn nested_txn_decodes_recursively() {
        let txn = TxnRequest {
            compare: vec![Compare {
                key: b"k".to_vec(),
                target_union: Some(compare::TargetUnion::Value(b"v".to_vec())),
                ..Default::default()
            }],
            success: vec![RequestOp {
                request: Some(request_op::Request::RequestDeleteRange(DeleteRangeRequest {
                    key: b"a".to_vec(),
                    range_end: b"b".to_vec(),
                    prev_kv: true,
                })),
            }],
            failure: vec![],
        };
        let internal = InternalRaftRequest {
            id: 9,
            txn: Some(txn.clone()),
            ..Default::default()
        };
        let decoded = InternalRaftRequest::decode_strict(&internal.encode_payload()).unwrap();
        assert_eq!(decoded.txn, Some(txn));
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let request = Request {
            path: "/truncated".to_string(),
            ..Default::default()
        };
        let bytes = request.encode_payload();
        assert_eq!(
            Request::decode_strict(&bytes[..bytes.len() - 1]),
            Err(CodecError::UnexpectedEof)
        );
    }
}
