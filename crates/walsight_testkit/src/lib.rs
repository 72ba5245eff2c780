//! # Walsight Testkit
//!
//! Test utilities for walsight.
//!
//! This crate provides:
//! - A WAL directory writer, since the shipping crates only read logs
//! - The reference corpus and temporary WAL directories
//! - Property-based test generators using proptest
//! - Golden test utilities for report verification
//! - Fuzz testing harnesses
//!
//! ## Usage
//!
//! ```rust,ignore
//! use walsight_testkit::prelude::*;
//! use walsight_core::{run_report, ReportConfig, TextSink};
//!
//! #[test]
//! fn report_over_corpus() {
//!     let wal = TestWal::corpus();
//!     let mut sink = TextSink::new(Vec::new());
//!     run_report(&ReportConfig::new(wal.path()), &mut sink).unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod golden;
pub mod writer;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::golden::*;
    pub use crate::writer::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use golden::*;
pub use writer::*;
