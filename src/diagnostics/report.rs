// SPDX-License-Identifier: MPL-2.0
//! The JSON document written by `export-diagnostics`.
//!
//! A report is a header, a short description of the host, per-session
//! statistics and the raw event list with times relative to the start of
//! collection.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysinfo::System;
use uuid::Uuid;

use super::{AppOperation, DiagnosticEvent, DiagnosticEventKind};

/// Identifies one exported report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportHeader {
    /// Random v4 id, so reports attached to bug reports can be told apart.
    pub report_id: String,
    pub app_version: String,
    /// RFC 3339.
    pub generated_at: String,
    /// RFC 3339 time the collector was created.
    pub collecting_since: String,
    pub span_ms: u64,
}

impl ReportHeader {
    #[must_use]
    pub fn new(collecting_since: DateTime<Utc>, span_ms: u64) -> Self {
        Self {
            report_id: Uuid::new_v4().to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now().to_rfc3339(),
            collecting_since: collecting_since.to_rfc3339(),
            span_ms,
        }
    }
}

/// The machine the camera ran on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostInfo {
    /// `linux`, `macos` or `windows`.
    pub os: String,
    pub os_version: String,
    pub arch: String,
    pub cpu_cores: usize,
    pub memory_mb: u64,
}

impl HostInfo {
    /// Probes the current machine.
    #[must_use]
    pub fn probe() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        system.refresh_cpu_all();

        Self {
            os: std::env::consts::OS.to_string(),
            os_version: System::long_os_version().unwrap_or_else(|| "unknown".to_string()),
            arch: std::env::consts::ARCH.to_string(),
            cpu_cores: system.cpus().len(),
            memory_mb: system.total_memory() >> 20,
        }
    }
}

/// One event as written to the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportEntry {
    /// Milliseconds since collection started.
    pub at_ms: u64,
    #[serde(flatten)]
    pub kind: DiagnosticEventKind,
}

impl ReportEntry {
    #[must_use]
    pub fn relative_to(origin: Instant, event: &DiagnosticEvent) -> Self {
        Self {
            at_ms: millis(event.timestamp.saturating_duration_since(origin)),
            kind: event.kind.clone(),
        }
    }
}

/// Attempts, failures and timings of one kind of collaborator call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationStats {
    pub attempts: usize,
    pub failures: usize,
    /// Mean over successful attempts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_ms: Option<u64>,
    pub slowest_ms: u64,
    #[serde(skip)]
    total_ok_ms: u64,
}

impl OperationStats {
    fn record(&mut self, duration_ms: u64, success: bool) {
        self.attempts += 1;
        self.slowest_ms = self.slowest_ms.max(duration_ms);
        if success {
            self.total_ok_ms += duration_ms;
            let ok = (self.attempts - self.failures) as u64;
            self.mean_ms = Some(self.total_ok_ms / ok);
        } else {
            self.failures += 1;
        }
    }
}

/// What the session did while the collector was running.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSummary {
    pub user_actions: usize,
    pub phase_changes: usize,
    pub warnings: usize,
    pub errors: usize,
    pub acquisitions: OperationStats,
    pub releases: usize,
    pub captures: OperationStats,
    pub uploads: OperationStats,
    pub gallery_loads: usize,
}

impl SessionSummary {
    #[must_use]
    pub fn tally<'a>(kinds: impl IntoIterator<Item = &'a DiagnosticEventKind>) -> Self {
        let mut summary = Self::default();
        for kind in kinds {
            match kind {
                DiagnosticEventKind::UserAction { .. } => summary.user_actions += 1,
                DiagnosticEventKind::AppState { .. } => summary.phase_changes += 1,
                DiagnosticEventKind::Warning { .. } => summary.warnings += 1,
                DiagnosticEventKind::Error { .. } => summary.errors += 1,
                DiagnosticEventKind::Operation { operation } => summary.count(operation),
            }
        }
        summary
    }

    fn count(&mut self, operation: &AppOperation) {
        match *operation {
            AppOperation::AcquireStream {
                duration_ms,
                success,
                ..
            } => self.acquisitions.record(duration_ms, success),
            AppOperation::ReleaseStream { .. } => self.releases += 1,
            AppOperation::CaptureFrame { duration_ms, .. } => {
                self.captures.record(duration_ms, true);
            }
            AppOperation::Upload {
                duration_ms,
                success,
                ..
            } => self.uploads.record(duration_ms, success),
            AppOperation::LoadGallery { .. } => self.gallery_loads += 1,
        }
    }
}

/// Everything written by one export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticReport {
    pub header: ReportHeader,
    pub host: HostInfo,
    pub summary: SessionSummary,
    pub events: Vec<ReportEntry>,
}

impl DiagnosticReport {
    /// Assembles a report; the summary is computed from `events`.
    #[must_use]
    pub fn assemble(header: ReportHeader, host: HostInfo, events: Vec<ReportEntry>) -> Self {
        let summary = SessionSummary::tally(events.iter().map(|entry| &entry.kind));
        Self {
            header,
            host,
            summary,
            events,
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[allow(clippy::cast_possible_truncation)]
pub(super) fn millis(duration: std::time::Duration) -> u64 {
    duration.as_millis().min(u128::from(u64::MAX)) as u64
}
