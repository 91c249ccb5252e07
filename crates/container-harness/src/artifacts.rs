// crates/container-harness/src/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Per-test artifact roots and run summaries.
// Purpose: Record pass/skip/panic outcomes and fixture notes for each test.
// Dependencies: serde, serde_jcs
// ============================================================================

//! ## Overview
//! Every container test owns a [`TestReporter`]. `finish` writes
//! `summary.json` (canonical JCS) and `summary.md`; if a test panics or
//! returns early before `finish`, `Drop` still writes a summary.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::config::HarnessConfig;

/// Summary persisted for one test.
#[derive(Debug, Serialize)]
struct TestSummary {
    /// Test name.
    test_name: String,
    /// Outcome label (`pass`, `skip`, `panic`, `unknown`).
    status: String,
    /// Start time in Unix milliseconds.
    started_at_ms: u64,
    /// End time in Unix milliseconds.
    ended_at_ms: u64,
    /// Wall-clock duration in milliseconds.
    duration_ms: u64,
    /// Free-form notes.
    notes: Vec<String>,
    /// Artifact file names relative to the root.
    artifacts: Vec<String>,
}

/// Current wall-clock time in Unix milliseconds. Stays `u64`: `serde_jcs`
/// cannot serialize `u128`.
fn now_millis() -> u64 {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Default artifact root for a test.
fn default_run_root(test_name: &str) -> PathBuf {
    let stamp = now_millis();
    PathBuf::from("target/system-tests").join(format!("run_{stamp}")).join(test_name)
}

/// Artifact manager for a single test.
#[derive(Debug, Clone)]
pub struct TestArtifacts {
    /// Directory all artifacts are written under.
    root: PathBuf,
}

impl TestArtifacts {
    /// Creates the artifact root for a test. A configured run root is shared
    /// by all tests, so the test name is appended to it.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    pub fn new(config: &HarnessConfig, test_name: &str) -> io::Result<Self> {
        let root = config
            .run_root
            .as_ref()
            .map_or_else(|| default_run_root(test_name), |root| root.join(test_name));
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Returns the root directory for the test artifacts.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the write fails.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        let bytes = serde_jcs::to_vec(value).map_err(|err| io::Error::other(err.to_string()))?;
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes a text artifact with UTF-8 encoding.
    ///
    /// # Errors
    ///
    /// Returns an error when the write fails.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, value.as_bytes())?;
        Ok(path)
    }
}

/// Helper that writes summaries even when a test panics.
pub struct TestReporter {
    /// Artifact manager.
    artifacts: TestArtifacts,
    /// Test name.
    test_name: String,
    /// Start time in Unix milliseconds.
    started_at_ms: u64,
    /// Set once a summary has been written.
    finalized: bool,
}

impl TestReporter {
    /// Creates a reporter for the named test.
    ///
    /// # Errors
    ///
    /// Returns an error when the artifact root cannot be created.
    pub fn new(config: &HarnessConfig, test_name: &str) -> io::Result<Self> {
        Ok(Self {
            artifacts: TestArtifacts::new(config, test_name)?,
            test_name: test_name.to_string(),
            started_at_ms: now_millis(),
            finalized: false,
        })
    }

    /// Returns the artifact manager.
    #[must_use]
    pub const fn artifacts(&self) -> &TestArtifacts {
        &self.artifacts
    }

    /// Writes the final summary for the test.
    ///
    /// # Errors
    ///
    /// Returns an error when either summary file cannot be written.
    pub fn finish(&mut self, status: &str, notes: Vec<String>) -> io::Result<()> {
        let ended_at_ms = now_millis();
        let summary = TestSummary {
            test_name: self.test_name.clone(),
            status: status.to_string(),
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
            notes,
            artifacts: vec!["summary.json".to_string(), "summary.md".to_string()],
        };
        self.finalized = true;
        self.artifacts.write_json("summary.json", &summary)?;
        self.artifacts.write_text("summary.md", &summary_markdown(&summary))?;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let status = if std::thread::panicking() { "panic" } else { "unknown" };
        let _ = self.finish(status, vec!["test terminated without explicit summary".to_string()]);
    }
}

/// Renders a summary as Markdown.
fn summary_markdown(summary: &TestSummary) -> String {
    let mut out = String::new();
    out.push_str("# System-Test Summary\n\n");
    out.push_str("## Status\n\n");
    let _ = writeln!(out, "- Test: {}", summary.test_name);
    let _ = writeln!(out, "- Status: {}", summary.status);
    let _ = writeln!(out, "- Duration (ms): {}", summary.duration_ms);
    out.push_str("\n## Notes\n\n");
    push_list(&mut out, &summary.notes);
    out.push_str("\n## Artifacts\n\n");
    push_list(&mut out, &summary.artifacts);
    out
}

/// Appends a Markdown bullet list, or `- None` when empty.
fn push_list(out: &mut String, items: &[String]) {
    if items.is_empty() {
        out.push_str("- None\n");
        return;
    }
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}
