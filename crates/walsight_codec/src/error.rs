//! Error types for the codec crate.

use thiserror::Error;

use crate::scan::WireType;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding a payload against a schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A varint ran past ten bytes.
    #[error("varint overflow at offset {offset}")]
    VarintOverflow {
        /// Offset of the first byte of the varint.
        offset: usize,
    },

    /// A field key carried a wire type outside the protobuf range.
    #[error("invalid wire type {value} at offset {offset}")]
    InvalidWireType {
        /// The raw wire type bits.
        value: u8,
        /// Offset of the field key.
        offset: usize,
    },

    /// Field number zero or above the protobuf maximum.
    #[error("invalid field number {number} at offset {offset}")]
    InvalidFieldNumber {
        /// The decoded field number.
        number: u64,
        /// Offset of the field key.
        offset: usize,
    },

    /// Group wire types are not used by any supported schema.
    #[error("group encoding is not supported (field {number})")]
    GroupsUnsupported {
        /// The field number carrying the group.
        number: u32,
    },

    /// The field number is not part of the message schema.
    #[error("{message}: unknown field {number}")]
    UnknownField {
        /// Name of the message being decoded.
        message: &'static str,
        /// The unknown field number.
        number: u32,
    },

    /// The field is known but was encoded with a different wire type.
    #[error("{message}: field {number} expected {expected:?}, found {actual:?}")]
    WireTypeMismatch {
        /// Name of the message being decoded.
        message: &'static str,
        /// The field number.
        number: u32,
        /// Wire type declared by the schema.
        expected: WireType,
        /// Wire type found in the payload.
        actual: WireType,
    },

    /// The protobuf decoder rejected the payload.
    #[error("{message}: {reason}")]
    Malformed {
        /// Name of the message being decoded.
        message: &'static str,
        /// Decoder-supplied reason.
        reason: String,
    },

    /// An enumeration field held a value outside its declared variants.
    #[error("unknown {enumeration} value {value}")]
    UnknownEnumValue {
        /// Name of the enumeration.
        enumeration: &'static str,
        /// The raw value.
        value: i32,
    },
}

impl CodecError {
    /// Create a malformed-payload error.
    pub fn malformed(message: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            message,
            reason: reason.into(),
        }
    }

    /// Create an unknown enumeration value error.
    pub fn unknown_enum(enumeration: &'static str, value: i32) -> Self {
        Self::UnknownEnumValue { enumeration, value }
    }
}
