//! Authentication messages nested inside auth requests.

use crate::EnumLabel;

/// Permission kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum PermissionType {
    /// Read-only access.
    Read = 0,
    /// Write-only access.
    Write = 1,
    /// Read and write access.
    Readwrite = 2,
}

impl EnumLabel for PermissionType {
    const NAME: &'static str = "Permission.Type";

    fn label(self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Readwrite => "READWRITE",
        }
    }
}

/// A key-range permission granted to a role.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Permission {
    #[prost(enumeration = "PermissionType", tag = "1")]
    pub perm_type: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub key: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub range_end: Vec<u8>,
}

/// Options supplied when a user is created.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserAddOptions {
    #[prost(bool, tag = "1")]
    pub no_password: bool,
}
