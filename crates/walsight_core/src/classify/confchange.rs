//! Membership change bodies.

use walsight_codec::raftpb::{ConfChange, ConfChangeType};
use walsight_codec::{CodecResult, Decode, EnumLabel};

/// Kind of membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// Add a voting member.
    AddNode,
    /// Remove a member.
    RemoveNode,
    /// Update a member's context.
    UpdateNode,
    /// Add a non-voting learner.
    AddLearnerNode,
}

impl ChangeType {
    /// Label as printed in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AddNode => "ConfChangeAddNode",
            Self::RemoveNode => "ConfChangeRemoveNode",
            Self::UpdateNode => "ConfChangeUpdateNode",
            Self::AddLearnerNode => "ConfChangeAddLearnerNode",
        }
    }
}

impl From<ConfChangeType> for ChangeType {
    fn from(value: ConfChangeType) -> Self {
        match value {
            ConfChangeType::ConfChangeAddNode => Self::AddNode,
            ConfChangeType::ConfChangeRemoveNode => Self::RemoveNode,
            ConfChangeType::ConfChangeUpdateNode => Self::UpdateNode,
            ConfChangeType::ConfChangeAddLearnerNode => Self::AddLearnerNode,
        }
    }
}

/// A decoded membership change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfChangeBody {
    /// Change identifier.
    pub change_id: u64,
    /// What kind of change.
    pub change_type: ChangeType,
    /// The member affected.
    pub node_id: u64,
    /// Opaque context, possibly empty.
    pub context: Vec<u8>,
}

pub(crate) fn decode(payload: &[u8]) -> CodecResult<ConfChangeBody> {
    let change = ConfChange::decode_strict(payload)?;
    let change_type = ConfChangeType::from_wire(change.change_type)?;
    Ok(ConfChangeBody {
        change_id: change.id,
        change_type: change_type.into(),
        node_id: change.node_id,
        context: change.context,
    })
}
