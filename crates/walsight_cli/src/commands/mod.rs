//! CLI command implementations.

pub mod dump;
pub mod entry_types;
