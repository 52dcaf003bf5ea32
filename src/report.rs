//! Status reporting for the provisioning workflow.
//!
//! The workflow never writes to the terminal directly. It reports through a
//! [`Reporter`], which the binary backs with [`TracingReporter`] (rendered by
//! the severity-tag formatter in [`crate::telemetry`]) and tests back with
//! [`MemoryReporter`].

use std::sync::Mutex;

/// Severity of a reported line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Progress the user should see
    Status,
    /// Something needs the user's attention but the run goes on
    Warn,
    /// A failure
    Error,
    /// Diagnostics shown only with `--debug`
    Debug,
}

/// Sink for user-facing workflow output.
pub trait Reporter: Send + Sync {
    /// Report progress.
    fn status(&self, message: &str);

    /// Report something that did not stop the run.
    fn warn(&self, message: &str);

    /// Report a failure.
    fn error(&self, message: &str);

    /// Report diagnostics.
    fn debug(&self, message: &str);
}

/// Reporter that emits `tracing` events under the `status` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn status(&self, message: &str) {
        tracing::info!(target: "arm_vm_sample::status", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "arm_vm_sample::status", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "arm_vm_sample::status", "{}", message);
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "arm_vm_sample::status", "{}", message);
    }
}

/// Reporter that keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<(Severity, String)>>,
}

impl MemoryReporter {
    /// Create an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded lines in order.
    pub fn lines(&self) -> Vec<(Severity, String)> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Recorded messages of one severity.
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m)
            .collect()
    }

    fn push(&self, severity: Severity, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((severity, message.to_string()));
        }
    }
}

impl Reporter for MemoryReporter {
    fn status(&self, message: &str) {
        self.push(Severity::Status, message);
    }

    fn warn(&self, message: &str) {
        self.push(Severity::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Severity::Error, message);
    }

    fn debug(&self, message: &str) {
        self.push(Severity::Debug, message);
    }
}
