//! The internal request envelope and its sub-requests.

use walsight_codec::etcdserverpb::{
    AlarmRequest, AuthDisableRequest, AuthEnableRequest, AuthRoleAddRequest,
    AuthRoleDeleteRequest, AuthRoleGetRequest, AuthRoleGrantPermissionRequest,
    AuthRoleListRequest, AuthRoleRevokePermissionRequest, AuthUserAddRequest,
    AuthUserChangePasswordRequest, AuthUserDeleteRequest, AuthUserGetRequest,
    AuthUserGrantRoleRequest, AuthUserListRequest, AuthUserRevokeRoleRequest, CompactionRequest,
    DeleteRangeRequest, InternalAuthenticateRequest, InternalRaftRequest, LeaseGrantRequest,
    LeaseRevokeRequest, PutRequest, RangeRequest, RequestHeader, TxnRequest,
};
use walsight_codec::{CodecResult, Decode};

use crate::tags::KindTag;

macro_rules! internal_ops {
    ($($variant:ident($ty:ty) => $field:ident, $tag:ident;)+) => {
        /// The single sub-request carried by an internal request.
        #[derive(Debug, Clone, PartialEq)]
        pub enum InternalOp {
            $(
                #[doc = concat!("`", stringify!($field), "`")]
                $variant($ty),
            )+
        }

        impl InternalOp {
            /// Field name of the sub-request in the envelope.
            #[must_use]
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => stringify!($field),)+
                }
            }

            /// The specific kind tag of the sub-request.
            #[must_use]
            pub const fn tag(&self) -> KindTag {
                match self {
                    $(Self::$variant(_) => KindTag::$tag,)+
                }
            }
        }

        /// Moves every populated sub-request out of `request`, in field order.
        fn take_ops(request: &mut InternalRaftRequest) -> Vec<InternalOp> {
            let mut ops = Vec::new();
            $(ops.extend(request.$field.take().map(InternalOp::$variant));)+
            ops
        }
    };
}

internal_ops! {
    Range(RangeRequest) => range, IrrRange;
    Put(PutRequest) => put, IrrPut;
    DeleteRange(DeleteRangeRequest) => delete_range, IrrDeleteRange;
    Txn(TxnRequest) => txn, IrrTxn;
    Compaction(CompactionRequest) => compaction, IrrCompaction;
    LeaseGrant(LeaseGrantRequest) => lease_grant, IrrLeaseGrant;
    LeaseRevoke(LeaseRevokeRequest) => lease_revoke, IrrLeaseRevoke;
    Alarm(AlarmRequest) => alarm, IrrAlarm;
    AuthEnable(AuthEnableRequest) => auth_enable, IrrAuthEnable;
    AuthDisable(AuthDisableRequest) => auth_disable, IrrAuthDisable;
    Authenticate(InternalAuthenticateRequest) => authenticate, IrrAuthenticate;
    AuthUserAdd(AuthUserAddRequest) => auth_user_add, IrrAuthUserAdd;
    AuthUserDelete(AuthUserDeleteRequest) => auth_user_delete, IrrAuthUserDelete;
    AuthUserGet(AuthUserGetRequest) => auth_user_get, IrrAuthUserGet;
    AuthUserChangePassword(AuthUserChangePasswordRequest) => auth_user_change_password, IrrAuthUserChangePassword;
    AuthUserGrantRole(AuthUserGrantRoleRequest) => auth_user_grant_role, IrrAuthUserGrantRole;
    AuthUserRevokeRole(AuthUserRevokeRoleRequest) => auth_user_revoke_role, IrrAuthUserRevokeRole;
    AuthUserList(AuthUserListRequest) => auth_user_list, IrrAuthUserList;
    AuthRoleList(AuthRoleListRequest) => auth_role_list, IrrAuthRoleList;
    AuthRoleAdd(AuthRoleAddRequest) => auth_role_add, IrrAuthRoleAdd;
    AuthRoleDelete(AuthRoleDeleteRequest) => auth_role_delete, IrrAuthRoleDelete;
    AuthRoleGet(AuthRoleGetRequest) => auth_role_get, IrrAuthRoleGet;
    AuthRoleGrantPermission(AuthRoleGrantPermissionRequest) => auth_role_grant_permission, IrrAuthRoleGrantPermission;
    AuthRoleRevokePermission(AuthRoleRevokePermissionRequest) => auth_role_revoke_permission, IrrAuthRoleRevokePermission;
}

/// A decoded internal request with exactly one sub-request.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalRequest {
    /// Request identifier.
    pub id: u64,
    /// Caller identity, when present.
    pub header: Option<RequestHeader>,
    /// The sub-request.
    pub op: InternalOp,
}

/// Outcome of decoding a payload as an internal request envelope.
#[derive(Debug)]
pub(crate) enum Envelope {
    /// Exactly one sub-request was populated.
    Single(InternalRequest),
    /// The envelope parsed, but zero or several sub-requests were populated.
    Exclusivity(Vec<&'static str>),
}

pub(crate) fn decode(payload: &[u8]) -> CodecResult<Envelope> {
    let mut request = InternalRaftRequest::decode_strict(payload)?;
    let mut ops = take_ops(&mut request);
    if ops.len() != 1 {
        return Ok(Envelope::Exclusivity(ops.iter().map(InternalOp::name).collect()));
    }
    let op = ops.remove(0);
    Ok(Envelope::Single(InternalRequest {
        id: request.id,
        header: request.header,
        op,
    }))
}
