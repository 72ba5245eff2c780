//! Test fixtures and WAL directory helpers.
//!
//! The reference corpus holds 34 entries covering every shape the
//! classifier knows:
//!
//! | Index | Term | Content |
//! |-------|------|---------|
//! | 1-4 | 1, 2, 2, 2 | membership changes, one per change type |
//! | 5-9 | 3 | legacy requests (methods "", QGET, SYNC, DELETE, RANDOM) |
//! | 10-33 | 4-27 | internal requests, one per sub-request kind |
//! | 34 | 27 | the single byte `?` |

use std::path::Path;

use tempfile::TempDir;
use walsight_codec::authpb::{Permission, PermissionType, UserAddOptions};
use walsight_codec::etcdserverpb::{
    request_op, AlarmRequest, AuthDisableRequest, AuthEnableRequest, AuthRoleAddRequest,
    AuthRoleDeleteRequest, AuthRoleGetRequest, AuthRoleGrantPermissionRequest,
    AuthRoleListRequest, AuthRoleRevokePermissionRequest, AuthUserAddRequest,
    AuthUserChangePasswordRequest, AuthUserDeleteRequest, AuthUserGetRequest,
    AuthUserGrantRoleRequest, AuthUserListRequest, AuthUserRevokeRoleRequest, CompactionRequest,
    DeleteRangeRequest, InternalAuthenticateRequest, InternalRaftRequest, LeaseGrantRequest,
    LeaseRevokeRequest, PutRequest, RangeRequest, Request, RequestOp, TxnRequest,
};
use walsight_codec::raftpb::{ConfChange, ConfChangeType, Entry, EntryType};
use walsight_codec::Encode;

use crate::writer::WalBuilder;

/// Index of the undecodable entry in the reference corpus.
pub const UNKNOWN_ENTRY_INDEX: u64 = 34;

/// Term of the undecodable entry in the reference corpus.
pub const UNKNOWN_ENTRY_TERM: u64 = 27;

/// Creates a normal entry.
#[must_use]
pub fn normal_entry(term: u64, index: u64, data: Vec<u8>) -> Entry {
    Entry {
        entry_type: EntryType::EntryNormal as i32,
        term,
        index,
        data,
    }
}

/// Creates a membership change entry.
#[must_use]
pub fn conf_change_entry(term: u64, index: u64, change: &ConfChange) -> Entry {
    Entry {
        entry_type: EntryType::EntryConfChange as i32,
        term,
        index,
        data: change.encode_payload(),
    }
}

/// Membership changes at indexes 1-4.
#[must_use]
pub fn conf_change_entries() -> Vec<Entry> {
    let changes = [
        (1, ConfChangeType::ConfChangeAddNode, 2),
        (2, ConfChangeType::ConfChangeRemoveNode, 2),
        (3, ConfChangeType::ConfChangeUpdateNode, 2),
        (4, ConfChangeType::ConfChangeAddLearnerNode, 3),
    ];
    let terms = [1, 2, 2, 2];
    changes
        .iter()
        .zip(terms)
        .map(|(&(id, change_type, node_id), term)| {
            let change = ConfChange {
                id,
                change_type: change_type as i32,
                node_id,
                context: Vec::new(),
            };
            conf_change_entry(term, id, &change)
        })
        .collect()
}

/// The long path of the fifth legacy request.
#[must_use]
pub fn long_path() -> String {
    format!("/path4/superlong{}", "/path".repeat(30))
}

/// Legacy requests at indexes 5-9, all in term 3.
#[must_use]
pub fn legacy_request_entries() -> Vec<Entry> {
    let hey = r#"{"hey":"ho","hi":["yo"]}"#;
    let nums = r#"{"0":"1","2":["3"]}"#;
    let requests = [
        (0, "", "/path0".to_string(), hey, true, false, 9),
        (1, "QGET", "/path1".to_string(), nums, false, false, 9),
        (2, "SYNC", "/path2".to_string(), nums, false, false, 2),
        (3, "DELETE", "/path3".to_string(), hey, false, true, 2),
        (4, "RANDOM", long_path(), hey, false, false, 2),
    ];
    requests
        .into_iter()
        .zip(5u64..)
        .map(|((id, method, path, val, dir, prev_exist, expiration), index)| {
            let request = Request {
                id,
                method: method.to_string(),
                path,
                val: val.to_string(),
                dir,
                prev_exist: Some(prev_exist),
                expiration,
                since: 1,
                time: 1,
                refresh: Some(false),
                ..Default::default()
            };
            normal_entry(3, index, request.encode_payload())
        })
        .collect()
}

/// One internal request per sub-request kind, in field order, with ids
/// starting at 5.
#[must_use]
pub fn internal_requests() -> Vec<InternalRaftRequest> {
    let delete_in_txn = RequestOp {
        request: Some(request_op::Request::RequestDeleteRange(DeleteRangeRequest {
            key: b"a".to_vec(),
            range_end: b"b".to_vec(),
            prev_kv: false,
        })),
    };
    let base = InternalRaftRequest::default;
    let mut requests = vec![
        InternalRaftRequest {
            range: Some(RangeRequest {
                key: b"1".to_vec(),
                range_end: b"hi".to_vec(),
                limit: 6,
                revision: 1,
                sort_order: 1,
                max_mod_revision: 20000,
                max_create_revision: 20000,
                ..Default::default()
            }),
            ..base()
        },
        InternalRaftRequest {
            put: Some(PutRequest {
                key: b"foo1".to_vec(),
                value: b"bar1".to_vec(),
                lease: 1,
                ignore_lease: true,
                ..Default::default()
            }),
            ..base()
        },
        InternalRaftRequest {
            delete_range: Some(DeleteRangeRequest {
                key: b"0".to_vec(),
                range_end: b"9".to_vec(),
                prev_kv: true,
            }),
            ..base()
        },
        InternalRaftRequest {
            txn: Some(TxnRequest {
                compare: Vec::new(),
                success: vec![delete_in_txn.clone()],
                failure: vec![delete_in_txn],
            }),
            ..base()
        },
        InternalRaftRequest {
            compaction: Some(CompactionRequest {
                revision: 0,
                physical: true,
            }),
            ..base()
        },
        InternalRaftRequest {
            lease_grant: Some(LeaseGrantRequest { ttl: 1, id: 1 }),
            ..base()
        },
        InternalRaftRequest {
            lease_revoke: Some(LeaseRevokeRequest { id: 2 }),
            ..base()
        },
        InternalRaftRequest {
            alarm: Some(AlarmRequest {
                action: 3,
                member_id: 4,
                alarm: 5,
            }),
            ..base()
        },
        InternalRaftRequest {
            auth_enable: Some(AuthEnableRequest {}),
            ..base()
        },
        InternalRaftRequest {
            auth_disable: Some(AuthDisableRequest {}),
            ..base()
        },
        InternalRaftRequest {
            authenticate: Some(InternalAuthenticateRequest {
                name: "myname".to_string(),
                password: "password".to_string(),
                simple_token: "token".to_string(),
            }),
            ..base()
        },
        InternalRaftRequest {
            auth_user_add: Some(AuthUserAddRequest {
                name: "name1".to_string(),
                password: "pass1".to_string(),
                options: Some(UserAddOptions { no_password: false }),
                hashed_password: String::new(),
            }),
            ..base()
        },
        InternalRaftRequest {
            auth_user_delete: Some(AuthUserDeleteRequest {
                name: "name1".to_string(),
            }),
            ..base()
        },
        InternalRaftRequest {
            auth_user_get: Some(AuthUserGetRequest {
                name: "name1".to_string(),
            }),
            ..base()
        },
        InternalRaftRequest {
            auth_user_change_password: Some(AuthUserChangePasswordRequest {
                name: "name1".to_string(),
                password: "pass2".to_string(),
                hashed_password: String::new(),
            }),
            ..base()
        },
        InternalRaftRequest {
            auth_user_grant_role: Some(AuthUserGrantRoleRequest {
                user: "user1".to_string(),
                role: "role1".to_string(),
            }),
            ..base()
        },
        InternalRaftRequest {
            auth_user_revoke_role: Some(AuthUserRevokeRoleRequest {
                name: "user2".to_string(),
                role: "role2".to_string(),
            }),
            ..base()
        },
        InternalRaftRequest {
            auth_user_list: Some(AuthUserListRequest {}),
            ..base()
        },
        InternalRaftRequest {
            auth_role_list: Some(AuthRoleListRequest {}),
            ..base()
        },
        InternalRaftRequest {
            auth_role_add: Some(AuthRoleAddRequest {
                name: "role2".to_string(),
            }),
            ..base()
        },
        InternalRaftRequest {
            auth_role_delete: Some(AuthRoleDeleteRequest {
                role: "role1".to_string(),
            }),
            ..base()
        },
        InternalRaftRequest {
            auth_role_get: Some(AuthRoleGetRequest {
                role: "role3".to_string(),
            }),
            ..base()
        },
        InternalRaftRequest {
            auth_role_grant_permission: Some(AuthRoleGrantPermissionRequest {
                name: "role3".to_string(),
                perm: Some(Permission {
                    perm_type: PermissionType::Write as i32,
                    key: b"Keys".to_vec(),
                    range_end: b"RangeEnd".to_vec(),
                }),
            }),
            ..base()
        },
        InternalRaftRequest {
            auth_role_revoke_permission: Some(AuthRoleRevokePermissionRequest {
                role: "role3".to_string(),
                key: b"key".to_vec(),
                range_end: b"rangeend".to_vec(),
            }),
            ..base()
        },
    ];
    for (request, id) in requests.iter_mut().zip(5u64..) {
        request.id = id;
    }
    requests
}

/// Internal requests at indexes 10-33, in terms 4-27.
#[must_use]
pub fn internal_request_entries() -> Vec<Entry> {
    internal_requests()
        .iter()
        .zip(0u64..)
        .map(|(request, i)| normal_entry(i + 4, i + 10, request.encode_payload()))
        .collect()
}

/// The undecodable entry at index 34.
#[must_use]
pub fn unknown_entries() -> Vec<Entry> {
    vec![normal_entry(
        UNKNOWN_ENTRY_TERM,
        UNKNOWN_ENTRY_INDEX,
        b"?".to_vec(),
    )]
}

/// All 34 entries of the reference corpus in log order.
#[must_use]
pub fn corpus_entries() -> Vec<Entry> {
    let mut entries = conf_change_entries();
    entries.extend(legacy_request_entries());
    entries.extend(internal_request_entries());
    entries.extend(unknown_entries());
    entries
}

/// The reference corpus followed by a zero hard state.
#[must_use]
pub fn corpus_builder() -> WalBuilder {
    WalBuilder::new()
        .entries(corpus_entries())
        .hard_state(0, 0, 0)
}

/// A WAL directory with automatic cleanup.
pub struct TestWal {
    dir: TempDir,
}

impl TestWal {
    /// Writes `builder` into a fresh temporary directory.
    pub fn new(builder: &WalBuilder) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        builder
            .write_to(dir.path())
            .expect("Failed to write WAL segments");
        Self { dir }
    }

    /// A WAL directory holding the reference corpus.
    pub fn corpus() -> Self {
        Self::new(&corpus_builder())
    }

    /// The WAL directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_layout() {
        let entries = corpus_entries();
        assert_eq!(entries.len(), 34);
        for (entry, index) in entries.iter().zip(1u64..) {
            assert_eq!(entry.index, index);
        }
        assert_eq!(entries[0].term, 1);
        assert_eq!(entries[4].term, 3);
        assert_eq!(entries[9].term, 4);
        assert_eq!(entries[32].term, 27);
        assert_eq!(entries[33].data, b"?");
    }

    #[test]
    fn internal_request_ids() {
        let ids: Vec<u64> = internal_requests().iter().map(|r| r.id).collect();
        assert_eq!(ids, (5..=28).collect::<Vec<_>>());
    }

    #[test]
    fn corpus_directory_is_written() {
        let wal = TestWal::corpus();
        let files: Vec<_> = std::fs::read_dir(wal.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }
}
