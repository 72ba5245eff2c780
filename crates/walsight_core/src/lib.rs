//! # Walsight Core
//!
//! Read-only inspection of a replicated consensus log.
//!
//! This crate provides:
//! - WAL segment reading and replay
//! - Payload classification into membership changes, legacy requests and
//!   internal request envelopes
//! - Kind tags and the type filter over them
//! - Deterministic text formatting of decoded records
//! - A bridge to an external decoder process for unknown payloads
//! - The report driver tying it all together
//!
//! ```no_run
//! use walsight_core::{run_report, ReportConfig, TextSink};
//!
//! let config = ReportConfig::new("/var/lib/etcd/member/wal").entry_types("IRRPut");
//! let mut sink = TextSink::new(std::io::stdout().lock());
//! let summary = run_report(&config, &mut sink).unwrap();
//! eprintln!("{} of {} entries", summary.included, summary.total);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod bridge;
pub mod classify;
mod config;
mod error;
mod filter;
pub mod format;
mod record;
mod report;
mod tags;
pub mod wal;

pub use bridge::{DecoderReply, DecoderScope, MalformedReason, ProcessDecoder, StreamDecoder};
pub use classify::{classify, DecodedRecord, NormalPayload, RecordBody, UnknownPayload, UnknownReason};
pub use config::{DecoderConfig, ReportConfig};
pub use error::{CoreError, CoreResult};
pub use filter::TypeFilter;
pub use format::format_record;
pub use record::{EntryKind, RawRecord};
pub use report::{
    run_report, run_report_with, DecoderColumn, Placement, ReportHeader, ReportLine, ReportSink,
    ReportSummary, TextSink,
};
pub use tags::KindTag;
pub use wal::{read_wal, ReadOptions, WalContents};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
