//! Dump command implementation.

use serde::Serialize;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use walsight_core::{
    run_report, CoreResult, DecoderConfig, DecoderScope, ReportConfig, ReportHeader, ReportLine,
    ReportSink, ReportSummary, TextSink,
};

/// Options of the dump command.
#[derive(Debug, Clone)]
pub struct DumpOptions {
    /// Directory holding the WAL segments.
    pub wal_dir: PathBuf,
    /// Comma-separated entry type names.
    pub entry_types: String,
    /// External decoder program.
    pub decoder: Option<PathBuf>,
    /// Arguments of the external decoder.
    pub decoder_args: Vec<String>,
    /// `unknown` or `normal`.
    pub decoder_scope: String,
    /// Reply timeout in milliseconds.
    pub decoder_timeout_ms: Option<u64>,
    /// First index to print.
    pub start_index: Option<u64>,
}

impl DumpOptions {
    fn report_config(&self) -> Result<ReportConfig, Box<dyn std::error::Error>> {
        let mut config = ReportConfig::new(&self.wal_dir).entry_types(self.entry_types.clone());
        if let Some(index) = self.start_index {
            config = config.start_index(index);
        }
        if let Some(program) = &self.decoder {
            let scope = match self.decoder_scope.as_str() {
                "unknown" => DecoderScope::Unknown,
                "normal" => DecoderScope::AllNormal,
                other => return Err(format!("unknown decoder scope {other:?}").into()),
            };
            let mut decoder = self
                .decoder_args
                .iter()
                .fold(DecoderConfig::new(program), |d, arg| d.arg(arg.clone()))
                .scope(scope);
            if let Some(ms) = self.decoder_timeout_ms {
                decoder = decoder.timeout(Duration::from_millis(ms));
            }
            config = config.decoder(decoder);
        }
        Ok(config)
    }
}

/// Runs the dump command.
pub fn run(options: &DumpOptions, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = options.report_config()?;
    let stdout = io::stdout();

    let summary = match format {
        "json" => run_report(&config, &mut JsonSink::new(stdout.lock()))?,
        "text" => run_report(&config, &mut TextSink::new(BufWriter::new(stdout.lock())))?,
        other => return Err(format!("unknown output format {other:?}").into()),
    };

    debug!(
        "Printed {} of {} entries ({} undecoded, {} decoder errors)",
        summary.included, summary.total, summary.undecoded, summary.decoder_errors
    );
    Ok(())
}

/// Snapshot marker representation for output.
#[derive(Debug, Serialize)]
pub struct SnapshotView {
    /// Snapshot index.
    pub index: u64,
    /// Snapshot term.
    pub term: u64,
}

/// Report header representation for output.
#[derive(Debug, Serialize)]
pub struct HeaderView {
    /// Last snapshot marker.
    pub snapshot: Option<SnapshotView>,
    /// Member id, hex-encoded.
    pub node_id: String,
    /// Cluster id, hex-encoded.
    pub cluster_id: String,
    /// Last persisted term.
    pub term: u64,
    /// Last persisted commit index.
    pub commit_index: u64,
    /// Last persisted vote, hex-encoded.
    pub vote: String,
    /// Number of replayed entries.
    pub entry_count: usize,
    /// Index of the last replayed entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_index: Option<u64>,
}

impl From<&ReportHeader> for HeaderView {
    fn from(header: &ReportHeader) -> Self {
        let (node_id, cluster_id) = header
            .metadata
            .as_ref()
            .map_or((0, 0), |m| (m.node_id, m.cluster_id));
        Self {
            snapshot: header.snapshot.as_ref().map(|s| SnapshotView {
                index: s.index,
                term: s.term,
            }),
            node_id: format!("{node_id:x}"),
            cluster_id: format!("{cluster_id:x}"),
            term: header.hard_state.term,
            commit_index: header.hard_state.commit,
            vote: format!("{:x}", header.hard_state.vote),
            entry_count: header.entry_count,
            last_index: header.last_index,
        }
    }
}

/// Record representation for output.
#[derive(Debug, Serialize)]
pub struct RecordView {
    /// Raft term.
    pub term: u64,
    /// Log index.
    pub index: u64,
    /// `conf` or `norm`.
    pub kind: &'static str,
    /// Kind tag names.
    pub tags: Vec<&'static str>,
    /// Built-in rendering of the body.
    pub body: String,
    /// `ok` or `decoder_error(..)`, when an external decoder was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoder_status: Option<String>,
    /// External decoder output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded_data: Option<String>,
}

impl From<&ReportLine> for RecordView {
    fn from(line: &ReportLine) -> Self {
        Self {
            term: line.term,
            index: line.index,
            kind: line.kind.short_name(),
            tags: line.tags.iter().map(|t| t.as_str()).collect(),
            body: line.body.clone(),
            decoder_status: line.decoder.as_ref().map(|c| c.status()),
            decoded_data: line.decoder.as_ref().map(|c| c.text()),
        }
    }
}

/// Pass counters for output.
#[derive(Debug, Serialize)]
pub struct SummaryView {
    /// Entry type filter.
    pub entry_types: String,
    /// Entries read.
    pub total: usize,
    /// Entries printed.
    pub included: usize,
    /// Printed entries without a known shape.
    pub undecoded: usize,
    /// Malformed external decoder replies.
    pub decoder_errors: usize,
}

#[derive(Serialize)]
struct Document<'a> {
    header: &'a HeaderView,
    records: &'a [RecordView],
    summary: SummaryView,
}

/// Collects the report and writes it as one JSON document.
pub struct JsonSink<W: Write> {
    out: W,
    header: Option<HeaderView>,
    records: Vec<RecordView>,
}

impl<W: Write> JsonSink<W> {
    /// Creates a sink writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            header: None,
            records: Vec::new(),
        }
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn begin(&mut self, header: &ReportHeader) -> CoreResult<()> {
        self.header = Some(header.into());
        Ok(())
    }

    fn record(&mut self, line: &ReportLine) -> CoreResult<()> {
        self.records.push(line.into());
        Ok(())
    }

    fn finish(&mut self, summary: &ReportSummary) -> CoreResult<()> {
        let Some(header) = &self.header else {
            return Ok(());
        };
        let document = Document {
            header,
            records: &self.records,
            summary: SummaryView {
                entry_types: summary.filter.clone(),
                total: summary.total,
                included: summary.included,
                undecoded: summary.undecoded,
                decoder_errors: summary.decoder_errors,
            },
        };
        serde_json::to_writer_pretty(&mut self.out, &document).map_err(io::Error::from)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
