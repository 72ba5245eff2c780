//! Golden test utilities for report verification.
//!
//! Provides helpers for verifying that rendered reports match
//! expected golden files.

use std::fs;
use std::path::{Path, PathBuf};

/// A golden test that compares output against expected files.
pub struct GoldenTest {
    name: String,
    golden_dir: PathBuf,
    update_mode: bool,
}

impl GoldenTest {
    /// Creates a new golden test.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the test (used for file naming)
    /// * `golden_dir` - Directory containing golden files
    pub fn new(name: impl Into<String>, golden_dir: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            golden_dir: golden_dir.as_ref().to_path_buf(),
            update_mode: std::env::var("UPDATE_GOLDEN").is_ok(),
        }
    }

    /// Creates a golden test using the `golden` directory of this crate.
    pub fn with_default_dir(name: impl Into<String>) -> Self {
        Self::new(name, default_golden_dir())
    }

    /// Asserts that the given report matches the golden file.
    ///
    /// If `UPDATE_GOLDEN` environment variable is set, updates the golden file instead.
    pub fn assert_text(&self, suffix: &str, actual: &str) {
        let path = self.file_path(suffix);

        if self.update_mode {
            self.update_golden_file(&path, actual.as_bytes());
            return;
        }

        if !path.exists() {
            panic!(
                "Golden file not found: {:?}\n\
                 Run with UPDATE_GOLDEN=1 to create it.\n\
                 Actual:\n{}",
                path, actual
            );
        }

        let expected = fs::read_to_string(&path).expect("Failed to read golden file");

        if actual != expected {
            panic!(
                "Golden test '{}' failed for '{}':\n\
                 {}\n\
                 Run with UPDATE_GOLDEN=1 to update.",
                self.name,
                suffix,
                line_diff(&expected, actual)
            );
        }
    }

    fn file_path(&self, suffix: &str) -> PathBuf {
        let filename = if suffix.is_empty() {
            format!("{}.golden", self.name)
        } else {
            format!("{}_{}.golden", self.name, suffix)
        };
        self.golden_dir.join(filename)
    }

    fn update_golden_file(&self, path: &Path, data: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create golden directory");
        }
        fs::write(path, data).expect("Failed to write golden file");
        println!("Updated golden file: {:?}", path);
    }
}

/// The golden directory shipped with this crate.
#[must_use]
pub fn default_golden_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("golden")
}

/// Lists the lines that differ between two reports, one `-`/`+` pair per
/// differing line number. Tabs are shown as `\t`.
#[must_use]
pub fn line_diff(expected: &str, actual: &str) -> String {
    let show = |line: Option<&str>| line.map_or("<missing>".to_string(), |l| l.replace('\t', "\\t"));
    let expected_lines: Vec<_> = expected.lines().collect();
    let actual_lines: Vec<_> = actual.lines().collect();
    let len = expected_lines.len().max(actual_lines.len());

    let mut out = String::new();
    for i in 0..len {
        let e = expected_lines.get(i).copied();
        let a = actual_lines.get(i).copied();
        if e != a {
            out.push_str(&format!("line {}:\n- {}\n+ {}\n", i + 1, show(e), show(a)));
        }
    }
    if out.is_empty() && expected != actual {
        out.push_str("reports differ only in trailing newlines\n");
    }
    out
}
