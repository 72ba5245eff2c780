//! Property-based test generators using proptest.
//!
//! Provides strategies for generating log entries and filter inputs.

use std::collections::BTreeSet;

use proptest::prelude::*;
use walsight_codec::etcdserverpb::{InternalRaftRequest, PutRequest, RequestHeader};
use walsight_codec::raftpb::{ConfChange, Entry, EntryType};
use walsight_codec::Encode;
use walsight_core::{EntryKind, KindTag, RawRecord};

use crate::fixtures::internal_requests;

/// Offset of the first sub-request tag in [`KindTag::ALL`].
const FIRST_SUB_REQUEST_TAG: usize = 4;

/// Strategy for arbitrary payload bytes.
pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

/// Strategy for a single kind tag.
pub fn kind_tag_strategy() -> impl Strategy<Value = KindTag> {
    prop::sample::select(KindTag::ALL)
}

/// Strategy for a non-empty set of kind tags.
pub fn kind_tag_set_strategy() -> impl Strategy<Value = BTreeSet<KindTag>> {
    prop::collection::btree_set(kind_tag_strategy(), 1..6)
}

/// Strategy for a comma-separated filter string built from valid names,
/// paired with the tags it names.
pub fn filter_spec_strategy() -> impl Strategy<Value = (String, BTreeSet<KindTag>)> {
    prop::collection::vec(kind_tag_strategy(), 1..6).prop_map(|names| {
        let spec = names
            .iter()
            .map(|tag| tag.as_str())
            .collect::<Vec<_>>()
            .join(",");
        (spec, names.into_iter().collect())
    })
}

/// Strategy for an internal request carrying exactly one sub-request,
/// paired with the tag the classifier must assign it.
pub fn single_internal_request_strategy() -> impl Strategy<Value = (InternalRaftRequest, KindTag)>
{
    let count = internal_requests().len();
    (0..count, any::<u64>(), any::<bool>()).prop_map(|(i, id, with_header)| {
        let mut request = internal_requests().swap_remove(i);
        request.id = id;
        if with_header {
            request.header = Some(RequestHeader {
                id,
                username: "root".to_string(),
                auth_revision: 1,
            });
        }
        (request, KindTag::ALL[FIRST_SUB_REQUEST_TAG + i])
    })
}

/// Strategy for a put request with arbitrary key and value.
pub fn put_request_strategy() -> impl Strategy<Value = InternalRaftRequest> {
    (any::<u64>(), payload_strategy(), payload_strategy(), any::<i64>()).prop_map(
        |(id, key, value, lease)| InternalRaftRequest {
            id,
            put: Some(PutRequest {
                key,
                value,
                lease,
                ..Default::default()
            }),
            ..Default::default()
        },
    )
}

/// Strategy for a raw normal record with an arbitrary payload.
pub fn normal_record_strategy() -> impl Strategy<Value = RawRecord> {
    (1u64..100, 1u64..10_000, payload_strategy())
        .prop_map(|(term, index, payload)| RawRecord::normal(term, index, payload))
}

/// Strategy for a raw record of either kind whose payload always decodes.
pub fn decodable_record_strategy() -> impl Strategy<Value = RawRecord> {
    let conf = (1u64..100, 1u64..10_000, any::<u64>(), 0i32..4, any::<u64>()).prop_map(
        |(term, index, id, change_type, node_id)| {
            let change = ConfChange {
                id,
                change_type,
                node_id,
                context: Vec::new(),
            };
            RawRecord::config_change(term, index, change.encode_payload())
        },
    );
    let normal = (1u64..100, 1u64..10_000, single_internal_request_strategy()).prop_map(
        |(term, index, (request, _))| RawRecord::normal(term, index, request.encode_payload()),
    );
    prop_oneof![conf, normal]
}

/// Strategy for a run of entries with consecutive indexes starting at 1.
pub fn entry_run_strategy(max_len: usize) -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec(decodable_record_strategy(), 0..max_len).prop_map(|records| {
        records
            .into_iter()
            .zip(1u64..)
            .map(|(record, index)| Entry {
                entry_type: match record.kind {
                    EntryKind::ConfigChange => EntryType::EntryConfChange as i32,
                    EntryKind::Normal => EntryType::EntryNormal as i32,
                },
                term: record.term,
                index,
                data: record.payload,
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use walsight_core::classify;

    proptest! {
        #[test]
        fn single_requests_carry_their_tag((request, tag) in single_internal_request_strategy()) {
            let record = classify(RawRecord::normal(1, 1, request.encode_payload())).unwrap();
            prop_assert!(record.tags.contains(&tag));
            prop_assert!(record.tags.contains(&KindTag::InternalRaftRequest));
        }

        #[test]
        fn decodable_records_classify(record in decodable_record_strategy()) {
            let decoded = classify(record).unwrap();
            prop_assert!(!decoded.is_unknown());
        }

        #[test]
        fn filter_specs_parse((spec, tags) in filter_spec_strategy()) {
            let filter = walsight_core::TypeFilter::parse(&spec).unwrap();
            prop_assert_eq!(filter.requested(), &tags);
        }

        #[test]
        fn entry_runs_are_consecutive(entries in entry_run_strategy(20)) {
            for (entry, index) in entries.iter().zip(1u64..) {
                prop_assert_eq!(entry.index, index);
            }
        }
    }

    #[test]
    fn sub_request_tags_line_up() {
        let expected: Vec<_> = KindTag::ALL[FIRST_SUB_REQUEST_TAG..].to_vec();
        assert_eq!(expected.len(), internal_requests().len());
        assert_eq!(expected[0], KindTag::IrrRange);
        assert_eq!(expected[expected.len() - 1], KindTag::IrrAuthRoleRevokePermission);
    }
}
