//! Report configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bridge::DecoderScope;
use crate::wal::ReadOptions;

/// Configuration for one report run.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Directory holding the WAL segments.
    pub wal_dir: PathBuf,

    /// Comma-separated kind tag names (empty = every record).
    pub entry_types: String,

    /// External decoder, if any.
    pub decoder: Option<DecoderConfig>,

    /// First entry index to report (inclusive).
    pub start_index: Option<u64>,
}

impl ReportConfig {
    /// Creates a configuration reporting every record of `wal_dir`.
    #[must_use]
    pub fn new(wal_dir: impl Into<PathBuf>) -> Self {
        Self {
            wal_dir: wal_dir.into(),
            entry_types: String::new(),
            decoder: None,
            start_index: None,
        }
    }

    /// Sets the kind tag filter.
    #[must_use]
    pub fn entry_types(mut self, names: impl Into<String>) -> Self {
        self.entry_types = names.into();
        self
    }

    /// Sets the external decoder.
    #[must_use]
    pub fn decoder(mut self, decoder: DecoderConfig) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Sets the first entry index to report.
    #[must_use]
    pub const fn start_index(mut self, index: u64) -> Self {
        self.start_index = Some(index);
        self
    }

    /// Options handed to the WAL reader.
    #[must_use]
    pub const fn read_options(&self) -> ReadOptions {
        ReadOptions {
            start_index: self.start_index,
        }
    }
}

/// Configuration of the external decoder process.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Program to run.
    pub program: PathBuf,

    /// Arguments passed to the program.
    pub args: Vec<String>,

    /// Which records are sent to the decoder.
    pub scope: DecoderScope,

    /// Maximum wait for one reply (`None` = wait forever).
    pub timeout: Option<Duration>,

    /// How long the decoder may take to exit after its input is closed.
    pub shutdown_grace: Duration,
}

impl DecoderConfig {
    /// Creates a configuration for `program` with default settings.
    #[must_use]
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            scope: DecoderScope::default(),
            timeout: None,
            shutdown_grace: Duration::from_millis(500),
        }
    }

    /// Appends a program argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets which records are sent to the decoder.
    #[must_use]
    pub const fn scope(mut self, scope: DecoderScope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the per-reply timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the exit grace period.
    #[must_use]
    pub const fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_report_config() {
        let config = ReportConfig::new("/var/lib/etcd/member/wal");
        assert!(config.entry_types.is_empty());
        assert!(config.decoder.is_none());
        assert_eq!(config.read_options().start_index, None);
    }

    #[test]
    fn builder_pattern() {
        let config = ReportConfig::new("wal")
            .entry_types("IRRPut,ConfigChange")
            .start_index(7)
            .decoder(
                DecoderConfig::new("/usr/local/bin/decoder")
                    .arg("--proto")
                    .scope(DecoderScope::AllNormal)
                    .timeout(Duration::from_secs(2)),
            );

        assert_eq!(config.entry_types, "IRRPut,ConfigChange");
        assert_eq!(config.read_options().start_index, Some(7));
        let decoder = config.decoder.unwrap();
        assert_eq!(decoder.args, vec!["--proto".to_string()]);
        assert_eq!(decoder.scope, DecoderScope::AllNormal);
        assert_eq!(decoder.timeout, Some(Duration::from_secs(2)));
        assert_eq!(decoder.shutdown_grace, Duration::from_millis(500));
    }
}
