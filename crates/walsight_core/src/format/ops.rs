//! Field-ordered rendering of internal sub-requests.

use walsight_codec::authpb::{Permission, PermissionType};
use walsight_codec::etcdserverpb::{
    compare::TargetUnion, request_op, AlarmAction, AlarmRequest, AlarmType, Compare, CompareResult,
    CompareTarget, DeleteRangeRequest, PutRequest, RangeRequest, RequestHeader, RequestOp,
    SortOrder, SortTarget, TxnRequest,
};
use walsight_codec::label_of;

use crate::classify::InternalOp;
use crate::format::fields::Fields;

pub(crate) fn header(f: &mut Fields, h: &RequestHeader) {
    f.field("id", h.id)
        .text("username", &h.username)
        .field("auth_revision", h.auth_revision);
}

/// Writes `op` as `<field name>={...}`.
pub(crate) fn op(f: &mut Fields, op: &InternalOp) {
    let name = op.name();
    match op {
        InternalOp::Range(r) => f.message(name, |f| range(f, r)),
        InternalOp::Put(r) => f.message(name, |f| put(f, r)),
        InternalOp::DeleteRange(r) => f.message(name, |f| delete_range(f, r)),
        InternalOp::Txn(r) => f.message(name, |f| txn(f, r)),
        InternalOp::Compaction(r) => f.message(name, |f| {
            f.field("revision", r.revision).field("physical", r.physical);
        }),
        InternalOp::LeaseGrant(r) => f.message(name, |f| {
            f.field("ttl", r.ttl).field("id", r.id);
        }),
        InternalOp::LeaseRevoke(r) => f.message(name, |f| {
            f.field("id", r.id);
        }),
        InternalOp::Alarm(r) => f.message(name, |f| alarm(f, r)),
        InternalOp::AuthEnable(_)
        | InternalOp::AuthDisable(_)
        | InternalOp::AuthUserList(_)
        | InternalOp::AuthRoleList(_) => f.message(name, |_| {}),
        InternalOp::Authenticate(r) => f.message(name, |f| {
            f.text("name", &r.name)
                .text("password", &r.password)
                .text("simple_token", &r.simple_token);
        }),
        InternalOp::AuthUserAdd(r) => f.message(name, |f| {
            f.text("name", &r.name).text("password", &r.password);
            if let Some(options) = &r.options {
                f.message("options", |f| {
                    f.field("no_password", options.no_password);
                });
            }
            f.text("hashed_password", &r.hashed_password);
        }),
        InternalOp::AuthUserDelete(r) => f.message(name, |f| {
            f.text("name", &r.name);
        }),
        InternalOp::AuthUserGet(r) => f.message(name, |f| {
            f.text("name", &r.name);
        }),
        InternalOp::AuthUserChangePassword(r) => f.message(name, |f| {
            f.text("name", &r.name)
                .text("password", &r.password)
                .text("hashed_password", &r.hashed_password);
        }),
        InternalOp::AuthUserGrantRole(r) => f.message(name, |f| {
            f.text("user", &r.user).text("role", &r.role);
        }),
        InternalOp::AuthUserRevokeRole(r) => f.message(name, |f| {
            f.text("name", &r.name).text("role", &r.role);
        }),
        InternalOp::AuthRoleAdd(r) => f.message(name, |f| {
            f.text("name", &r.name);
        }),
        InternalOp::AuthRoleDelete(r) => f.message(name, |f| {
            f.text("role", &r.role);
        }),
        InternalOp::AuthRoleGet(r) => f.message(name, |f| {
            f.text("role", &r.role);
        }),
        InternalOp::AuthRoleGrantPermission(r) => f.message(name, |f| {
            f.text("name", &r.name);
            if let Some(perm) = &r.perm {
                f.message("perm", |f| permission(f, perm));
            }
        }),
        InternalOp::AuthRoleRevokePermission(r) => f.message(name, |f| {
            f.text("role", &r.role)
                .bytes("key", &r.key)
                .bytes("range_end", &r.range_end);
        }),
    };
}

fn range(f: &mut Fields, r: &RangeRequest) {
    f.bytes("key", &r.key)
        .bytes("range_end", &r.range_end)
        .field("limit", r.limit)
        .field("revision", r.revision)
        .field("sort_order", label_of::<SortOrder>(r.sort_order))
        .field("sort_target", label_of::<SortTarget>(r.sort_target))
        .field("serializable", r.serializable)
        .field("keys_only", r.keys_only)
        .field("count_only", r.count_only)
        .field("min_mod_revision", r.min_mod_revision)
        .field("max_mod_revision", r.max_mod_revision)
        .field("min_create_revision", r.min_create_revision)
        .field("max_create_revision", r.max_create_revision);
}

fn put(f: &mut Fields, r: &PutRequest) {
    f.bytes("key", &r.key)
        .bytes("value", &r.value)
        .field("lease", r.lease)
        .field("prev_kv", r.prev_kv)
        .field("ignore_value", r.ignore_value)
        .field("ignore_lease", r.ignore_lease);
}

fn delete_range(f: &mut Fields, r: &DeleteRangeRequest) {
    f.bytes("key", &r.key)
        .bytes("range_end", &r.range_end)
        .field("prev_kv", r.prev_kv);
}

fn txn(f: &mut Fields, r: &TxnRequest) {
    f.list("compare", &r.compare, compare_fields)
        .list("success", &r.success, request_op_fields)
        .list("failure", &r.failure, request_op_fields);
}

fn request_op_fields(f: &mut Fields, op: &RequestOp) {
    match &op.request {
        Some(request_op::Request::RequestRange(r)) => f.message("request_range", |f| range(f, r)),
        Some(request_op::Request::RequestPut(r)) => f.message("request_put", |f| put(f, r)),
        Some(request_op::Request::RequestDeleteRange(r)) => {
            f.message("request_delete_range", |f| delete_range(f, r))
        }
        Some(request_op::Request::RequestTxn(r)) => f.message("request_txn", |f| txn(f, r)),
        None => f,
    };
}

fn compare_fields(f: &mut Fields, c: &Compare) {
    f.field("result", label_of::<CompareResult>(c.result))
        .field("target", label_of::<CompareTarget>(c.target))
        .bytes("key", &c.key);
    match &c.target_union {
        Some(TargetUnion::Version(v)) => f.field("version", v),
        Some(TargetUnion::CreateRevision(v)) => f.field("create_revision", v),
        Some(TargetUnion::ModRevision(v)) => f.field("mod_revision", v),
        Some(TargetUnion::Value(v)) => f.bytes("value", v),
        Some(TargetUnion::Lease(v)) => f.field("lease", v),
        None => f,
    };
    f.bytes("range_end", &c.range_end);
}

fn alarm(f: &mut Fields, r: &AlarmRequest) {
    f.field("action", label_of::<AlarmAction>(r.action))
        .field("member_id", r.member_id)
        .field("alarm", label_of::<AlarmType>(r.alarm));
}

fn permission(f: &mut Fields, p: &Permission) {
    f.field("perm_type", label_of::<PermissionType>(p.perm_type))
        .bytes("key", &p.key)
        .bytes("range_end", &p.range_end);
}
