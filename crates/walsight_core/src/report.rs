//! Report driver.
//!
//! One strictly sequential pass: records are classified, filtered, formatted
//! and, where configured, sent to the external decoder in log order.

use std::collections::BTreeSet;
use std::io::Write;

use tracing::debug;
use walsight_codec::raftpb::HardState;
use walsight_codec::walpb::{Metadata, Snapshot};

use crate::bridge::{DecoderReply, DecoderScope, ProcessDecoder, StreamDecoder};
use crate::classify::classify;
use crate::config::ReportConfig;
use crate::error::CoreResult;
use crate::filter::TypeFilter;
use crate::format::{
    escape_bytes, format_body, format_footer, format_metadata, format_snapshot, line_prefix,
    COLUMN_HEADER, DECODER_COLUMN_HEADER,
};
use crate::record::EntryKind;
use crate::tags::KindTag;
use crate::wal::read_wal;

/// Where decoder output goes on a record line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// In place of the built-in body.
    Replace,
    /// After the built-in body, in two extra columns.
    Append,
}

impl From<DecoderScope> for Placement {
    fn from(scope: DecoderScope) -> Self {
        match scope {
            DecoderScope::Unknown => Self::Replace,
            DecoderScope::AllNormal => Self::Append,
        }
    }
}

/// Everything printed before the first record.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportHeader {
    /// Last snapshot marker.
    pub snapshot: Option<Snapshot>,
    /// Identity of the writing member.
    pub metadata: Option<Metadata>,
    /// Last persisted raft state.
    pub hard_state: HardState,
    /// Number of replayed entries.
    pub entry_count: usize,
    /// Index of the last replayed entry.
    pub last_index: Option<u64>,
    /// Whether record lines carry decoder columns.
    pub decoder_columns: bool,
}

/// Decoder output attached to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderColumn {
    /// Where the output goes.
    pub placement: Placement,
    /// The decoder's reply.
    pub reply: DecoderReply,
}

impl DecoderColumn {
    /// `ok`, or `decoder_error(<reason>)`.
    #[must_use]
    pub fn status(&self) -> String {
        match &self.reply {
            DecoderReply::Decoded(_) => "ok".to_string(),
            DecoderReply::Malformed { reason, .. } => format!("decoder_error({reason})"),
        }
    }

    /// The decoded text, or the escaped offending reply.
    #[must_use]
    pub fn text(&self) -> String {
        match &self.reply {
            DecoderReply::Decoded(text) => text.clone(),
            DecoderReply::Malformed { raw, .. } => escape_bytes(raw),
        }
    }
}

/// One included record, ready to print.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    /// Raft term.
    pub term: u64,
    /// Log index.
    pub index: u64,
    /// Top-level kind.
    pub kind: EntryKind,
    /// Kind tags of the record.
    pub tags: BTreeSet<KindTag>,
    /// Built-in rendering of the body.
    pub body: String,
    /// Decoder output, when the record was sent to the decoder.
    pub decoder: Option<DecoderColumn>,
}

impl ReportLine {
    /// The tab-separated text line.
    #[must_use]
    pub fn render(&self) -> String {
        let prefix = line_prefix(self.term, self.index, self.kind);
        match &self.decoder {
            None => format!("{prefix}\t{}", self.body),
            Some(column) => match (column.placement, &column.reply) {
                (Placement::Replace, DecoderReply::Decoded(text)) => format!("{prefix}\t{text}"),
                (Placement::Replace, DecoderReply::Malformed { .. }) => {
                    format!("{prefix}\t{}\t{}", column.status(), column.text())
                }
                (Placement::Append, _) => format!(
                    "{prefix}\t{}\t{}\t{}",
                    self.body,
                    column.status(),
                    column.text()
                ),
            },
        }
    }
}

/// Counters of a finished pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    /// Description of the type filter.
    pub filter: String,
    /// Entries read.
    pub total: usize,
    /// Entries that passed the filter.
    pub included: usize,
    /// Included entries the classifier could not decode.
    pub undecoded: usize,
    /// Malformed decoder replies.
    pub decoder_errors: usize,
}

/// Receiver of report sections.
pub trait ReportSink {
    /// Called once before any record.
    ///
    /// # Errors
    ///
    /// Output failures abort the run.
    fn begin(&mut self, header: &ReportHeader) -> CoreResult<()>;

    /// Called once per included record, in log order.
    ///
    /// # Errors
    ///
    /// Output failures abort the run.
    fn record(&mut self, line: &ReportLine) -> CoreResult<()>;

    /// Called once after the last record.
    ///
    /// # Errors
    ///
    /// Output failures abort the run.
    fn finish(&mut self, summary: &ReportSummary) -> CoreResult<()>;
}

/// Writes the plain text report.
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    /// Creates a sink writing to `out`.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextSink<W> {
    fn begin(&mut self, header: &ReportHeader) -> CoreResult<()> {
        writeln!(self.out, "Snapshot:")?;
        writeln!(self.out, "{}", format_snapshot(header.snapshot.as_ref()))?;
        writeln!(self.out, "WAL metadata:")?;
        writeln!(
            self.out,
            "{}",
            format_metadata(header.metadata.as_ref(), &header.hard_state)
        )?;
        writeln!(self.out, "WAL entries: {}", header.entry_count)?;
        if let Some(last) = header.last_index {
            writeln!(self.out, "lastIndex={last}")?;
        }
        if header.decoder_columns {
            writeln!(self.out, "{COLUMN_HEADER}{DECODER_COLUMN_HEADER}")?;
        } else {
            writeln!(self.out, "{COLUMN_HEADER}")?;
        }
        Ok(())
    }

    fn record(&mut self, line: &ReportLine) -> CoreResult<()> {
        writeln!(self.out, "{}", line.render())?;
        Ok(())
    }

    fn finish(&mut self, summary: &ReportSummary) -> CoreResult<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "{}",
            format_footer(&summary.filter, summary.included)
        )?;
        self.out.flush()?;
        Ok(())
    }
}

/// Runs a report, starting the configured external decoder if any.
///
/// # Errors
///
/// Fails on an unknown filter name, an unreadable or corrupt WAL, an
/// undecodable membership change, a failed decoder, or an output error.
pub fn run_report(config: &ReportConfig, sink: &mut dyn ReportSink) -> CoreResult<ReportSummary> {
    match &config.decoder {
        Some(decoder_config) => {
            let mut decoder = ProcessDecoder::new(decoder_config);
            run_report_with(config, Some(&mut decoder), sink)
        }
        None => run_report_with(config, None, sink),
    }
}

/// Runs a report with a caller-supplied decoder.
///
/// The decoder is used with the scope of `config.decoder`, or
/// [`DecoderScope::Unknown`] if none is configured, and is shut down when
/// the pass ends, whether it succeeded or not.
///
/// # Errors
///
/// As [`run_report`].
pub fn run_report_with(
    config: &ReportConfig,
    mut decoder: Option<&mut dyn StreamDecoder>,
    sink: &mut dyn ReportSink,
) -> CoreResult<ReportSummary> {
    let filter = TypeFilter::parse(&config.entry_types)?;
    let scope = config
        .decoder
        .as_ref()
        .map(|d| d.scope)
        .unwrap_or_default();

    let result = emit(config, &filter, scope, &mut decoder, sink);

    let stopped = decoder.map_or(Ok(()), |d| d.shutdown());
    let summary = result?;
    stopped?;
    sink.finish(&summary)?;
    Ok(summary)
}

fn emit(
    config: &ReportConfig,
    filter: &TypeFilter,
    scope: DecoderScope,
    decoder: &mut Option<&mut dyn StreamDecoder>,
    sink: &mut dyn ReportSink,
) -> CoreResult<ReportSummary> {
    let contents = read_wal(&config.wal_dir, &config.read_options())?;
    debug!(
        "Replayed {} entries, filter {}",
        contents.entries.len(),
        filter.describe()
    );

    let entry_count = contents.entries.len();
    let last_index = contents.last_index();
    sink.begin(&ReportHeader {
        snapshot: contents.snapshot,
        metadata: contents.metadata,
        hard_state: contents.hard_state,
        entry_count,
        last_index,
        decoder_columns: decoder.is_some() && scope == DecoderScope::AllNormal,
    })?;

    let mut summary = ReportSummary {
        filter: filter.describe(),
        ..ReportSummary::default()
    };

    for raw in contents.entries {
        summary.total += 1;
        let record = classify(raw)?;
        if !filter.accepts(&record.tags) {
            continue;
        }
        summary.included += 1;
        if record.is_unknown() {
            summary.undecoded += 1;
        }

        let column = match decoder.as_deref_mut() {
            Some(decoder) if scope.is_eligible(&record) => {
                let reply = decoder.decode(&record.raw)?;
                if reply.is_malformed() {
                    summary.decoder_errors += 1;
                }
                Some(DecoderColumn {
                    placement: scope.into(),
                    reply,
                })
            }
            _ => None,
        };

        sink.record(&ReportLine {
            term: record.raw.term,
            index: record.raw.index,
            kind: record.raw.kind,
            body: format_body(&record),
            tags: record.tags,
            decoder: column,
        })?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{parse_reply, MalformedReason};
    use crate::config::DecoderConfig;
    use crate::error::CoreError;
    use crate::record::RawRecord;
    use crate::wal::{SegmentName, SegmentRecord};
    use std::path::Path;
    use walsight_codec::etcdserverpb::{DeleteRangeRequest, InternalRaftRequest, PutRequest};
    use walsight_codec::raftpb::{ConfChange, Entry, EntryType};
    use walsight_codec::Encode;

    fn entry(term: u64, index: u64, entry_type: EntryType, data: Vec<u8>) -> SegmentRecord {
        SegmentRecord::Entry(Entry {
            entry_type: entry_type as i32,
            term,
            index,
            data,
        })
    }

    fn write_wal(dir: &Path, records: &[SegmentRecord]) {
        let bytes: Vec<u8> = records
            .iter()
            .flat_map(|r| r.encode_framed().unwrap())
            .collect();
        std::fs::write(dir.join(SegmentName::new(0, 0).file_name()), bytes).unwrap();
    }

    fn sample_wal() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let conf = ConfChange {
            id: 1,
            change_type: 0,
            node_id: 2,
            context: Vec::new(),
        };
        let put = InternalRaftRequest {
            id: 6,
            put: Some(PutRequest {
                key: b"foo".to_vec(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let delete = InternalRaftRequest {
            id: 7,
            delete_range: Some(DeleteRangeRequest {
                key: b"a".to_vec(),
                ..Default::default()
            }),
            ..Default::default()
        };
        write_wal(
            dir.path(),
            &[
                SegmentRecord::Metadata(Metadata {
                    node_id: 1,
                    cluster_id: 2,
                }),
                entry(1, 1, EntryType::EntryConfChange, conf.encode_payload()),
                entry(2, 2, EntryType::EntryNormal, put.encode_payload()),
                entry(2, 3, EntryType::EntryNormal, delete.encode_payload()),
                entry(2, 4, EntryType::EntryNormal, b"?".to_vec()),
                SegmentRecord::State(HardState {
                    term: 2,
                    vote: 1,
                    commit: 4,
                }),
            ],
        );
        dir
    }

    fn text_report(config: &ReportConfig) -> CoreResult<(String, ReportSummary)> {
        let mut sink = TextSink::new(Vec::new());
        let summary = run_report_with(config, None, &mut sink)?;
        Ok((String::from_utf8(sink.into_inner()).unwrap(), summary))
    }

    /// Answers every request from a fixed function.
    struct FakeDecoder<F: FnMut(&RawRecord) -> String> {
        answer: F,
        seen: Vec<u64>,
        shutdowns: usize,
    }

    impl<F: FnMut(&RawRecord) -> String> FakeDecoder<F> {
        fn new(answer: F) -> Self {
            Self {
                answer,
                seen: Vec::new(),
                shutdowns: 0,
            }
        }
    }

    impl<F: FnMut(&RawRecord) -> String> StreamDecoder for FakeDecoder<F> {
        fn decode(&mut self, record: &RawRecord) -> CoreResult<DecoderReply> {
            self.seen.push(record.index);
            Ok(parse_reply(&(self.answer)(record), record.index))
        }

        fn shutdown(&mut self) -> CoreResult<()> {
            self.shutdowns += 1;
            Ok(())
        }
    }

    #[test]
    fn full_text_report() {
        let dir = sample_wal();
        let (text, summary) = text_report(&ReportConfig::new(dir.path())).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Snapshot:");
        assert_eq!(lines[1], "empty");
        assert_eq!(lines[2], "WAL metadata:");
        assert_eq!(
            lines[3],
            "nodeID=1 clusterID=2 term=2 commitIndex=4 vote=1"
        );
        assert_eq!(lines[4], "WAL entries: 4");
        assert_eq!(lines[5], "lastIndex=4");
        assert_eq!(lines[6], COLUMN_HEADER);
        assert!(lines[7].starts_with("   1\t         1\tconf\tconf_change id=1"));
        assert!(lines[8].contains("\tinternal_raft_request id=6 put={key=\"foo\""));
        assert_eq!(
            lines[10],
            "   2\t         4\tnorm\tundecoded(no known shape) data=\"?\""
        );
        assert_eq!(lines[11], "");
        assert_eq!(lines[12], "Entry types (all) count is : 4");
        assert_eq!(
            summary,
            ReportSummary {
                filter: "all".to_string(),
                total: 4,
                included: 4,
                undecoded: 1,
                decoder_errors: 0,
            }
        );
    }

    #[test]
    fn filter_restricts_records() {
        let dir = sample_wal();
        let config = ReportConfig::new(dir.path()).entry_types("IRRDeleteRange");
        let (text, summary) = text_report(&config).unwrap();
        assert_eq!(summary.included, 1);
        assert!(text.contains("delete_range={key=\"a\""));
        assert!(text.ends_with("Entry types (IRRDeleteRange) count is : 1\n"));

        let config = ReportConfig::new(dir.path()).entry_types("IRRCompaction");
        let (_, summary) = text_report(&config).unwrap();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.included, 0);
    }

    #[test]
    fn unknown_filter_name_fails_before_reading() {
        let config = ReportConfig::new("/nonexistent/wal").entry_types("IRRPut,Bogus");
        let err = text_report(&config).unwrap_err();
        assert!(matches!(err, CoreError::Config { .. }));
    }

    #[test]
    fn missing_wal_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = text_report(&ReportConfig::new(dir.path())).unwrap_err();
        assert!(matches!(err, CoreError::WalNotFound { .. }));
    }

    #[test]
    fn decoder_replaces_unknown_bodies() {
        let dir = sample_wal();
        let config = ReportConfig::new(dir.path());
        let mut decoder = FakeDecoder::new(|r| format!("{}|custom term={}", r.index, r.term));
        let mut sink = TextSink::new(Vec::new());
        let summary = run_report_with(&config, Some(&mut decoder), &mut sink).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();

        assert_eq!(decoder.seen, vec![4]);
        assert_eq!(decoder.shutdowns, 1);
        assert!(text.contains("\n   2\t         4\tnorm\tcustom term=2\n"));
        assert!(text.contains(&format!("\n{COLUMN_HEADER}\n")));
        assert_eq!(summary.decoder_errors, 0);
    }

    #[test]
    fn malformed_reply_is_annotated() {
        let dir = sample_wal();
        let config = ReportConfig::new(dir.path());
        let mut decoder = FakeDecoder::new(|_| "|custom".to_string());
        let mut sink = TextSink::new(Vec::new());
        let summary = run_report_with(&config, Some(&mut decoder), &mut sink).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();

        assert!(text.contains(
            "\n   2\t         4\tnorm\tdecoder_error(missing identifier)\t\"|custom\"\n"
        ));
        assert_eq!(summary.decoder_errors, 1);
        assert!(text.ends_with("count is : 4\n"));
    }

    #[test]
    fn all_normal_scope_appends_columns() {
        let dir = sample_wal();
        let config = ReportConfig::new(dir.path())
            .decoder(DecoderConfig::new("unused").scope(DecoderScope::AllNormal));
        let mut decoder = FakeDecoder::new(|r| format!("{}|seen", r.index));
        let mut sink = TextSink::new(Vec::new());
        run_report_with(&config, Some(&mut decoder), &mut sink).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();

        assert_eq!(decoder.seen, vec![2, 3, 4]);
        assert!(text.contains(&format!("{COLUMN_HEADER}{DECODER_COLUMN_HEADER}\n")));
        assert!(text.contains(
            "\n   2\t         4\tnorm\tundecoded(no known shape) data=\"?\"\tok\tseen\n"
        ));
        let conf_line = text.lines().find(|l| l.contains("\tconf\t")).unwrap();
        assert!(!conf_line.ends_with("\tseen"));
    }

    #[test]
    fn decoder_failure_is_fatal_and_still_shuts_down() {
        struct Failing {
            shutdowns: usize,
        }
        impl StreamDecoder for Failing {
            fn decode(&mut self, _: &RawRecord) -> CoreResult<DecoderReply> {
                Err(CoreError::DecoderExited {
                    program: "failing".into(),
                    status: "exit status: 1".to_string(),
                })
            }
            fn shutdown(&mut self) -> CoreResult<()> {
                self.shutdowns += 1;
                Ok(())
            }
        }

        let dir = sample_wal();
        let mut decoder = Failing { shutdowns: 0 };
        let mut sink = TextSink::new(Vec::new());
        let err = run_report_with(&ReportConfig::new(dir.path()), Some(&mut decoder), &mut sink)
            .unwrap_err();
        assert!(matches!(err, CoreError::DecoderExited { .. }));
        assert_eq!(decoder.shutdowns, 1);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(!text.contains("count is"));
    }

    #[test]
    fn start_index_skips_earlier_entries() {
        let dir = sample_wal();
        let (text, summary) = text_report(&ReportConfig::new(dir.path()).start_index(3)).unwrap();
        assert_eq!(summary.total, 2);
        assert!(text.contains("WAL entries: 2\n"));
        assert!(!text.contains("\tconf\t"));
    }

    #[test]
    fn decoder_column_rendering() {
        let column = DecoderColumn {
            placement: Placement::Append,
            reply: DecoderReply::Malformed {
                reason: MalformedReason::MissingSeparator,
                raw: b"bad\x01".to_vec(),
            },
        };
        assert_eq!(column.status(), "decoder_error(missing separator)");
        assert_eq!(column.text(), "\"bad\\x01\"");
    }
}
