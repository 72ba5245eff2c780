//! Request envelopes replicated through the log.
//!
//! Two envelope shapes share the normal-entry payload space: the flat
//! [`Request`] of the v2 store and the [`InternalRaftRequest`] wrapper of
//! the v3 store, which carries exactly one sub-request.

use crate::authpb::{Permission, UserAddOptions};
use crate::scan::FieldSpec;
use crate::{EnumLabel, Schema};

/// Flat v2 request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Request {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(string, tag = "2")]
    pub method: String,
    #[prost(string, tag = "3")]
    pub path: String,
    #[prost(string, tag = "4")]
    pub val: String,
    #[prost(bool, tag = "5")]
    pub dir: bool,
    #[prost(string, tag = "6")]
    pub prev_value: String,
    #[prost(uint64, tag = "7")]
    pub prev_index: u64,
    #[prost(bool, optional, tag = "8")]
    pub prev_exist: Option<bool>,
    #[prost(int64, tag = "9")]
    pub expiration: i64,
    #[prost(bool, tag = "10")]
    pub wait: bool,
    #[prost(uint64, tag = "11")]
    pub since: u64,
    #[prost(bool, tag = "12")]
    pub recursive: bool,
    #[prost(bool, tag = "13")]
    pub sorted: bool,
    #[prost(bool, tag = "14")]
    pub quorum: bool,
    #[prost(int64, tag = "15")]
    pub time: i64,
    #[prost(bool, tag = "16")]
    pub stream: bool,
    #[prost(bool, optional, tag = "17")]
    pub refresh: Option<bool>,
}

impl Schema for Request {
    const NAME: &'static str = "etcdserverpb.Request";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::varint(1),
        FieldSpec::len(2),
        FieldSpec::len(3),
        FieldSpec::len(4),
        FieldSpec::varint(5),
        FieldSpec::len(6),
        FieldSpec::varint(7),
        FieldSpec::varint(8),
        FieldSpec::varint(9),
        FieldSpec::varint(10),
        FieldSpec::varint(11),
        FieldSpec::varint(12),
        FieldSpec::varint(13),
        FieldSpec::varint(14),
        FieldSpec::varint(15),
        FieldSpec::varint(16),
        FieldSpec::varint(17),
    ];
}

/// Caller identity attached to a v3 request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RequestHeader {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(string, tag = "2")]
    pub username: String,
    #[prost(uint64, tag = "3")]
    pub auth_revision: u64,
}

/// v3 envelope. At most one sub-request field should be set.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InternalRaftRequest {
    #[prost(message, optional, tag = "100")]
    pub header: Option<RequestHeader>,
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(message, optional, tag = "3")]
    pub range: Option<RangeRequest>,
    #[prost(message, optional, tag = "4")]
    pub put: Option<PutRequest>,
    #[prost(message, optional, tag = "5")]
    pub delete_range: Option<DeleteRangeRequest>,
    #[prost(message, optional, tag = "6")]
    pub txn: Option<TxnRequest>,
    #[prost(message, optional, tag = "7")]
    pub compaction: Option<CompactionRequest>,
    #[prost(message, optional, tag = "8")]
    pub lease_grant: Option<LeaseGrantRequest>,
    #[prost(message, optional, tag = "9")]
    pub lease_revoke: Option<LeaseRevokeRequest>,
    #[prost(message, optional, tag = "10")]
    pub alarm: Option<AlarmRequest>,
    #[prost(message, optional, tag = "1000")]
    pub auth_enable: Option<AuthEnableRequest>,
    #[prost(message, optional, tag = "1011")]
    pub auth_disable: Option<AuthDisableRequest>,
    #[prost(message, optional, tag = "1012")]
    pub authenticate: Option<InternalAuthenticateRequest>,
    #[prost(message, optional, tag = "1100")]
    pub auth_user_add: Option<AuthUserAddRequest>,
    #[prost(message, optional, tag = "1101")]
    pub auth_user_delete: Option<AuthUserDeleteRequest>,
    #[prost(message, optional, tag = "1102")]
    pub auth_user_get: Option<AuthUserGetRequest>,
    #[prost(message, optional, tag = "1103")]
    pub auth_user_change_password: Option<AuthUserChangePasswordRequest>,
    #[prost(message, optional, tag = "1104")]
    pub auth_user_grant_role: Option<AuthUserGrantRoleRequest>,
    #[prost(message, optional, tag = "1105")]
    pub auth_user_revoke_role: Option<AuthUserRevokeRoleRequest>,
    #[prost(message, optional, tag = "1106")]
    pub auth_user_list: Option<AuthUserListRequest>,
    #[prost(message, optional, tag = "1107")]
    pub auth_role_list: Option<AuthRoleListRequest>,
    #[prost(message, optional, tag = "1200")]
    pub auth_role_add: Option<AuthRoleAddRequest>,
    #[prost(message, optional, tag = "1201")]
    pub auth_role_delete: Option<AuthRoleDeleteRequest>,
    #[prost(message, optional, tag = "1202")]
    pub auth_role_get: Option<AuthRoleGetRequest>,
    #[prost(message, optional, tag = "1203")]
    pub auth_role_grant_permission: Option<AuthRoleGrantPermissionRequest>,
    #[prost(message, optional, tag = "1204")]
    pub auth_role_revoke_permission: Option<AuthRoleRevokePermissionRequest>,
}

impl Schema for InternalRaftRequest {
    const NAME: &'static str = "etcdserverpb.InternalRaftRequest";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::len(100),
        FieldSpec::varint(1),
        FieldSpec::len(3),
        FieldSpec::len(4),
        FieldSpec::len(5),
        FieldSpec::len(6),
        FieldSpec::len(7),
        FieldSpec::len(8),
        FieldSpec::len(9),
        FieldSpec::len(10),
        FieldSpec::len(1000),
        FieldSpec::len(1011),
        FieldSpec::len(1012),
        FieldSpec::len(1100),
        FieldSpec::len(1101),
        FieldSpec::len(1102),
        FieldSpec::len(1103),
        FieldSpec::len(1104),
        FieldSpec::len(1105),
        FieldSpec::len(1106),
        FieldSpec::len(1107),
        FieldSpec::len(1200),
        FieldSpec::len(1201),
        FieldSpec::len(1202),
        FieldSpec::len(1203),
        FieldSpec::len(1204),
    ];
}

/// Result ordering of a range read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SortOrder {
    /// Unsorted.
    None = 0,
    /// Lowest target value first.
    Ascend = 1,
    /// Highest target value first.
    Descend = 2,
}

impl EnumLabel for SortOrder {
    const NAME: &'static str = "RangeRequest.SortOrder";

    fn label(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Ascend => "ASCEND",
            Self::Descend => "DESCEND",
        }
    }
}

/// Key attribute a range read sorts by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SortTarget {
    /// Sort by key.
    Key = 0,
    /// Sort by version.
    Version = 1,
    /// Sort by creation revision.
    Create = 2,
    /// Sort by modification revision.
    Mod = 3,
    /// Sort by value.
    Value = 4,
}

impl EnumLabel for SortTarget {
    const NAME: &'static str = "RangeRequest.SortTarget";

    fn label(self) -> &'static str {
        match self {
            Self::Key => "KEY",
            Self::Version => "VERSION",
            Self::Create => "CREATE",
            Self::Mod => "MOD",
            Self::Value => "VALUE",
        }
    }
}

/// Range read.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RangeRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub key: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub range_end: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub limit: i64,
    #[prost(int64, tag = "4")]
    pub revision: i64,
    #[prost(enumeration = "SortOrder", tag = "5")]
    pub sort_order: i32,
    #[prost(enumeration = "SortTarget", tag = "6")]
    pub sort_target: i32,
    #[prost(bool, tag = "7")]
    pub serializable: bool,
    #[prost(bool, tag = "8")]
    pub keys_only: bool,
    #[prost(bool, tag = "9")]
    pub count_only: bool,
    #[prost(int64, tag = "10")]
    pub min_mod_revision: i64,
    #[prost(int64, tag = "11")]
    pub max_mod_revision: i64,
    #[prost(int64, tag = "12")]
    pub min_create_revision: i64,
    #[prost(int64, tag = "13")]
    pub max_create_revision: i64,
}

/// Single-key write.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PutRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub key: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub lease: i64,
    #[prost(bool, tag = "4")]
    pub prev_kv: bool,
    #[prost(bool, tag = "5")]
    pub ignore_value: bool,
    #[prost(bool, tag = "6")]
    pub ignore_lease: bool,
}

/// Range delete.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteRangeRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub key: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub range_end: Vec<u8>,
    #[prost(bool, tag = "3")]
    pub prev_kv: bool,
}

/// One operation inside a transaction branch.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RequestOp {
    #[prost(oneof = "request_op::Request", tags = "1, 2, 3, 4")]
    pub request: Option<request_op::Request>,
}

/// Nested types for [`RequestOp`].
pub mod request_op {
    /// The operation carried by a transaction step.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Request {
        /// Range read.
        #[prost(message, tag = "1")]
        RequestRange(super::RangeRequest),
        /// Single-key write.
        #[prost(message, tag = "2")]
        RequestPut(super::PutRequest),
        /// Range delete.
        #[prost(message, tag = "3")]
        RequestDeleteRange(super::DeleteRangeRequest),
        /// Nested transaction.
        #[prost(message, tag = "4")]
        RequestTxn(super::TxnRequest),
    }
}

/// Comparison operator of a transaction guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum CompareResult {
    /// Equal.
    Equal = 0,
    /// Greater than.
    Greater = 1,
    /// Less than.
    Less = 2,
    /// Not equal.
    NotEqual = 3,
}

impl EnumLabel for CompareResult {
    const NAME: &'static str = "Compare.CompareResult";

    fn label(self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::Greater => "GREATER",
            Self::Less => "LESS",
            Self::NotEqual => "NOT_EQUAL",
        }
    }
}

/// Key attribute a transaction guard inspects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum CompareTarget {
    /// Key version.
    Version = 0,
    /// Creation revision.
    Create = 1,
    /// Modification revision.
    Mod = 2,
    /// Value bytes.
    Value = 3,
    /// Attached lease.
    Lease = 4,
}

impl EnumLabel for CompareTarget {
    const NAME: &'static str = "Compare.CompareTarget";

    fn label(self) -> &'static str {
        match self {
            Self::Version => "VERSION",
            Self::Create => "CREATE",
            Self::Mod => "MOD",
            Self::Value => "VALUE",
            Self::Lease => "LEASE",
        }
    }
}

/// Transaction guard.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Compare {
    #[prost(enumeration = "CompareResult", tag = "1")]
    pub result: i32,
    #[prost(enumeration = "CompareTarget", tag = "2")]
    pub target: i32,
    #[prost(bytes = "vec", tag = "3")]
    pub key: Vec<u8>,
    #[prost(oneof = "compare::TargetUnion", tags = "4, 5, 6, 7, 8")]
    pub target_union: Option<compare::TargetUnion>,
    #[prost(bytes = "vec", tag = "64")]
    pub range_end: Vec<u8>,
}

/// Nested types for [`Compare`].
pub mod compare {
    /// Value the guard compares against.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum TargetUnion {
        /// Key version.
        #[prost(int64, tag = "4")]
        Version(i64),
        /// Creation revision.
        #[prost(int64, tag = "5")]
        CreateRevision(i64),
        /// Modification revision.
        #[prost(int64, tag = "6")]
        ModRevision(i64),
        /// Value bytes.
        #[prost(bytes = "vec", tag = "7")]
        Value(Vec<u8>),
        /// Lease id.
        #[prost(int64, tag = "8")]
        Lease(i64),
    }
}

/// Guarded multi-operation transaction.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxnRequest {
    #[prost(message, repeated, tag = "1")]
    pub compare: Vec<Compare>,
    #[prost(message, repeated, tag = "2")]
    pub success: Vec<RequestOp>,
    #[prost(message, repeated, tag = "3")]
    pub failure: Vec<RequestOp>,
}

/// History compaction.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CompactionRequest {
    #[prost(int64, tag = "1")]
    pub revision: i64,
    #[prost(bool, tag = "2")]
    pub physical: bool,
}

/// Lease creation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LeaseGrantRequest {
    #[prost(int64, tag = "1")]
    pub ttl: i64,
    #[prost(int64, tag = "2")]
    pub id: i64,
}

/// Lease removal.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LeaseRevokeRequest {
    #[prost(int64, tag = "1")]
    pub id: i64,
}

/// Alarm operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AlarmAction {
    /// List alarms.
    Get = 0,
    /// Raise an alarm.
    Activate = 1,
    /// Clear an alarm.
    Deactivate = 2,
}

impl EnumLabel for AlarmAction {
    const NAME: &'static str = "AlarmRequest.AlarmAction";

    fn label(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Activate => "ACTIVATE",
            Self::Deactivate => "DEACTIVATE",
        }
    }
}

/// Alarm condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AlarmType {
    /// No alarm.
    None = 0,
    /// Backend quota exhausted.
    Nospace = 1,
    /// Data corruption detected.
    Corrupt = 2,
}

impl EnumLabel for AlarmType {
    const NAME: &'static str = "AlarmType";

    fn label(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Nospace => "NOSPACE",
            Self::Corrupt => "CORRUPT",
        }
    }
}

/// Alarm change.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AlarmRequest {
    #[prost(enumeration = "AlarmAction", tag = "1")]
    pub action: i32,
    #[prost(uint64, tag = "2")]
    pub member_id: u64,
    #[prost(enumeration = "AlarmType", tag = "3")]
    pub alarm: i32,
}

/// Turn authentication on.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthEnableRequest {}

/// Turn authentication off.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthDisableRequest {}

/// Token issuance after a successful password check.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InternalAuthenticateRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub password: String,
    #[prost(string, tag = "3")]
    pub simple_token: String,
}

/// User creation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthUserAddRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub password: String,
    #[prost(message, optional, tag = "3")]
    pub options: Option<UserAddOptions>,
    #[prost(string, tag = "4")]
    pub hashed_password: String,
}

/// User lookup.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthUserGetRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// User removal.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthUserDeleteRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// Password change.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthUserChangePasswordRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub password: String,
    #[prost(string, tag = "3")]
    pub hashed_password: String,
}

/// Role assignment.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthUserGrantRoleRequest {
    #[prost(string, tag = "1")]
    pub user: String,
    #[prost(string, tag = "2")]
    pub role: String,
}

/// Role unassignment.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthUserRevokeRoleRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub role: String,
}

/// User listing.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthUserListRequest {}

/// Role listing.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthRoleListRequest {}

/// Role creation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthRoleAddRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// Role lookup.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthRoleGetRequest {
    #[prost(string, tag = "1")]
    pub role: String,
}

/// Role removal.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthRoleDeleteRequest {
    #[prost(string, tag = "1")]
    pub role: String,
}

/// Permission grant.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthRoleGrantPermissionRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub perm: Option<Permission>,
}

/// Permission revocation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthRoleRevokePermissionRequest {
    #[prost(string, tag = "1")]
    pub role: String,
    #[prost(bytes = "vec", tag = "2")]
    pub key: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub range_end: Vec<u8>,
}
