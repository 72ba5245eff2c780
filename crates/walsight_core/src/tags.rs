//! Kind tags attached to decoded records.
//!
//! A record carries a set of tags: the generic kind of its entry plus, for
//! normal entries, the envelope it decoded to and the specific internal
//! sub-request. Filtering is set intersection over these tags.

use std::fmt;

macro_rules! kind_tags {
    ($($variant:ident => $name:literal,)+) => {
        /// A classification label used for filtering.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum KindTag {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )+
        }

        impl KindTag {
            /// Every tag, in declaration order.
            pub const ALL: &'static [KindTag] = &[$(Self::$variant,)+];

            /// The exact name accepted on the command line.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Looks a tag up by its exact, case-sensitive name.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

kind_tags! {
    ConfigChange => "ConfigChange",
    Normal => "Normal",
    Request => "Request",
    InternalRaftRequest => "InternalRaftRequest",
    IrrRange => "IRRRange",
    IrrPut => "IRRPut",
    IrrDeleteRange => "IRRDeleteRange",
    IrrTxn => "IRRTxn",
    IrrCompaction => "IRRCompaction",
    IrrLeaseGrant => "IRRLeaseGrant",
    IrrLeaseRevoke => "IRRLeaseRevoke",
    IrrAlarm => "IRRAlarm",
    IrrAuthEnable => "IRRAuthEnable",
    IrrAuthDisable => "IRRAuthDisable",
    IrrAuthenticate => "IRRAuthenticate",
    IrrAuthUserAdd => "IRRAuthUserAdd",
    IrrAuthUserDelete => "IRRAuthUserDelete",
    IrrAuthUserGet => "IRRAuthUserGet",
    IrrAuthUserChangePassword => "IRRAuthUserChangePassword",
    IrrAuthUserGrantRole => "IRRAuthUserGrantRole",
    IrrAuthUserRevokeRole => "IRRAuthUserRevokeRole",
    IrrAuthUserList => "IRRAuthUserList",
    IrrAuthRoleList => "IRRAuthRoleList",
    IrrAuthRoleAdd => "IRRAuthRoleAdd",
    IrrAuthRoleDelete => "IRRAuthRoleDelete",
    IrrAuthRoleGet => "IRRAuthRoleGet",
    IrrAuthRoleGrantPermission => "IRRAuthRoleGrantPermission",
    IrrAuthRoleRevokePermission => "IRRAuthRoleRevokePermission",
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
