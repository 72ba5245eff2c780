//! Type filter over kind tags.

use std::collections::BTreeSet;

use crate::error::{CoreError, CoreResult};
use crate::tags::KindTag;

/// The set of kind tags a report is restricted to.
///
/// An empty filter accepts every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeFilter {
    requested: BTreeSet<KindTag>,
    /// Names in the order given, for the report footer.
    names: Vec<KindTag>,
}

impl TypeFilter {
    /// A filter that accepts everything.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list of exact tag names.
    ///
    /// The empty string means no filtering.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first unknown entry.
    pub fn parse(spec: &str) -> CoreResult<Self> {
        if spec.is_empty() {
            return Ok(Self::all());
        }
        let mut filter = Self::default();
        for name in spec.split(',') {
            let tag = KindTag::from_name(name).ok_or_else(|| {
                CoreError::config(format!("unknown entry type {name:?}"))
            })?;
            if filter.requested.insert(tag) {
                filter.names.push(tag);
            }
        }
        Ok(filter)
    }

    /// Builds a filter from tags directly.
    pub fn from_tags(tags: impl IntoIterator<Item = KindTag>) -> Self {
        let mut filter = Self::default();
        for tag in tags {
            if filter.requested.insert(tag) {
                filter.names.push(tag);
            }
        }
        filter
    }

    /// The requested tags.
    #[must_use]
    pub fn requested(&self) -> &BTreeSet<KindTag> {
        &self.requested
    }

    /// Whether no tag was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requested.is_empty()
    }

    /// Whether a record carrying `tags` passes the filter.
    #[must_use]
    pub fn accepts(&self, tags: &BTreeSet<KindTag>) -> bool {
        self.requested.is_empty() || !tags.is_disjoint(&self.requested)
    }

    /// Human-readable description: the requested names, or `all`.
    #[must_use]
    pub fn describe(&self) -> String {
        if self.names.is_empty() {
            return "all".to_string();
        }
        self.names
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}
