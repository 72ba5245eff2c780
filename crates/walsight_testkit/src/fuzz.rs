//! Fuzz testing harnesses for walsight.
//!
//! This module provides fuzz targets that can be used with cargo-fuzz
//! or other fuzzing frameworks.

use walsight_core::wal::{replay_segments, ReadOptions};
use walsight_core::{classify, format_record, RawRecord, TypeFilter};
use walsight_storage::InMemoryBackend;

/// Fuzz target for normal-entry classification.
///
/// Normal payloads never fail to classify, and an undecoded record keeps
/// its payload verbatim.
pub fn fuzz_classify_normal(data: &[u8]) {
    let record = classify(RawRecord::normal(1, 1, data)).expect("normal entries always classify");
    if let Some(unknown) = record.unknown() {
        assert_eq!(unknown.bytes, data);
    }
    let _ = format_record(&record);
}

/// Fuzz target for membership change classification.
///
/// Tests that arbitrary payloads either decode or return an error.
pub fn fuzz_classify_conf_change(data: &[u8]) {
    if let Ok(record) = classify(RawRecord::config_change(1, 1, data)) {
        let _ = format_record(&record);
    }
}

/// Fuzz target for segment replay.
///
/// The first byte chooses a split point; the rest is replayed as two
/// segments. Replay must return an error rather than panic.
pub fn fuzz_replay(data: &[u8]) {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).min(rest.len());
    let first = InMemoryBackend::with_data(rest[..split].to_vec());
    let second = InMemoryBackend::with_data(rest[split..].to_vec());
    if let Ok(contents) = replay_segments(&[&first, &second], &ReadOptions::default()) {
        for raw in contents.entries {
            let _ = classify(raw);
        }
    }
}

/// Fuzz target for filter parsing.
///
/// Only the empty spec parses to the accept-all filter.
pub fn fuzz_filter(data: &[u8]) {
    let spec = String::from_utf8_lossy(data);
    if let Ok(filter) = TypeFilter::parse(&spec) {
        assert_eq!(filter.is_empty(), spec.is_empty());
    }
}
