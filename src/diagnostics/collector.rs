// SPDX-License-Identifier: MPL-2.0
//! Event intake: a cloneable handle for producers and a single collector
//! that drains them into a bounded buffer.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Local, Utc};
use crossbeam_channel::{bounded, Receiver, Sender};

use super::export::{self, ExportError};
use super::report::{millis, DiagnosticReport, HostInfo, ReportEntry, ReportHeader};
use super::{
    sanitize_message, AppOperation, BufferCapacity, CircularBuffer, DiagnosticEvent,
    DiagnosticEventKind, ErrorEvent, UserAction, WarningEvent,
};

/// Events queued between two drains. Further events are dropped.
const INTAKE_CAPACITY: usize = 256;

/// Producer side, held by the session, the gallery and the notification queue.
///
/// Logging never blocks: when the intake is full the event is dropped.
/// Free-form text is sanitized before it is queued.
#[derive(Clone, Debug)]
pub struct DiagnosticsHandle {
    intake: Sender<DiagnosticEvent>,
}

impl DiagnosticsHandle {
    /// Queues an event. Returns `false` if it was dropped.
    pub fn record(&self, kind: DiagnosticEventKind) -> bool {
        self.intake.try_send(DiagnosticEvent::new(kind)).is_ok()
    }

    pub fn log_action(&self, action: UserAction) {
        self.log_action_with_details(action, None);
    }

    pub fn log_action_with_details(&self, action: UserAction, details: Option<String>) {
        let details = details.as_deref().map(sanitize_message);
        self.record(DiagnosticEventKind::UserAction { action, details });
    }

    /// Logs a session phase change.
    pub fn log_state(&self, from: &str, to: &str) {
        self.record(DiagnosticEventKind::AppState {
            from: from.to_owned(),
            to: to.to_owned(),
        });
    }

    pub fn log_operation(&self, operation: AppOperation) {
        self.record(DiagnosticEventKind::Operation { operation });
    }

    pub fn log_warning(&self, mut event: WarningEvent) {
        event.message = sanitize_message(&event.message);
        self.record(DiagnosticEventKind::Warning { event });
    }

    pub fn log_error(&self, mut event: ErrorEvent) {
        event.message = sanitize_message(&event.message);
        self.record(DiagnosticEventKind::Error { event });
    }
}

/// Consumer side, owned by the front end.
///
/// Call [`process_pending`](Self::process_pending) periodically; events wait
/// in the intake until then.
pub struct DiagnosticsCollector {
    buffer: CircularBuffer<DiagnosticEvent>,
    intake: Receiver<DiagnosticEvent>,
    producer: Sender<DiagnosticEvent>,
    started: Instant,
    started_utc: DateTime<Utc>,
}

impl DiagnosticsCollector {
    #[must_use]
    pub fn new(capacity: BufferCapacity) -> Self {
        let (producer, intake) = bounded(INTAKE_CAPACITY);
        Self {
            buffer: CircularBuffer::new(capacity),
            intake,
            producer,
            started: Instant::now(),
            started_utc: Utc::now(),
        }
    }

    #[must_use]
    pub fn handle(&self) -> DiagnosticsHandle {
        DiagnosticsHandle {
            intake: self.producer.clone(),
        }
    }

    /// Moves queued events into the buffer, evicting the oldest when full.
    pub fn process_pending(&mut self) {
        for event in self.intake.try_iter() {
            self.buffer.push(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Buffered events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticEvent> {
        self.buffer.iter()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Builds a report from the buffered events.
    #[must_use]
    pub fn report(&self) -> DiagnosticReport {
        let entries = self
            .buffer
            .iter()
            .map(|event| ReportEntry::relative_to(self.started, event))
            .collect();
        let header = ReportHeader::new(self.started_utc, millis(self.started.elapsed()));
        DiagnosticReport::assemble(header, HostInfo::probe(), entries)
    }

    /// Writes a report to `path`.
    ///
    /// # Errors
    ///
    /// See [`export::write_report`].
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let path = path.as_ref();
        export::write_report(&self.report(), path)?;
        Ok(path.to_path_buf())
    }

    /// Writes a timestamped report into the data directory.
    ///
    /// # Errors
    ///
    /// See [`export::write_report`].
    pub fn export_to_default_location(&self) -> Result<PathBuf, ExportError> {
        let name = export::report_file_name(Local::now());
        self.export_to_file(export::reports_directory().join(name))
    }
}

impl Default for DiagnosticsCollector {
    fn default() -> Self {
        Self::new(BufferCapacity::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{ErrorType, WarningType};
    use tempfile::tempdir;

    #[test]
    fn events_wait_in_intake_until_drained() {
        let mut collector = DiagnosticsCollector::default();
        collector.handle().log_action(UserAction::EnableCamera);

        assert!(collector.is_empty());
        collector.process_pending();
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn free_text_is_sanitized_on_the_way_in() {
        let mut collector = DiagnosticsCollector::default();
        let handle = collector.handle();

        handle.log_warning(WarningEvent::new(
            WarningType::ConfigurationIssue,
            "cannot parse /home/me/.config/Snappy/settings.toml",
        ));
        handle.log_error(ErrorEvent::new(
            ErrorType::UploadError,
            "POST https://bridge.local/upload failed",
        ));
        handle.log_action_with_details(
            UserAction::SelectAsset,
            Some("https://arweave.net/abc".into()),
        );
        collector.process_pending();

        let texts: Vec<String> = collector
            .iter()
            .filter_map(|event| match &event.kind {
                DiagnosticEventKind::Warning { event } => Some(event.message.clone()),
                DiagnosticEventKind::Error { event } => Some(event.message.clone()),
                DiagnosticEventKind::UserAction { details, .. } => details.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(texts, ["cannot parse <path>", "POST <url> failed", "<url>"]);
    }

    #[test]
    fn full_intake_drops_instead_of_blocking() {
        let collector = DiagnosticsCollector::default();
        let handle = collector.handle();
        let kind = DiagnosticEventKind::UserAction {
            action: UserAction::Capture,
            details: None,
        };

        for _ in 0..INTAKE_CAPACITY {
            assert!(handle.record(kind.clone()));
        }
        assert!(!handle.record(kind));
        handle.log_action(UserAction::Capture);
    }

    #[test]
    fn buffer_keeps_only_the_newest_events() {
        let mut collector = DiagnosticsCollector::new(BufferCapacity::new(0));
        let handle = collector.handle();
        let capacity = collector.capacity();

        for _ in 0..capacity + 5 {
            handle.log_action(UserAction::SwitchFacing);
            collector.process_pending();
        }
        assert_eq!(collector.len(), capacity);
    }

    #[test]
    fn report_summarizes_buffered_events() {
        let mut collector = DiagnosticsCollector::default();
        let handle = collector.handle();
        handle.log_state("idle", "live");
        handle.log_operation(AppOperation::AcquireStream {
            facing: "back".into(),
            duration_ms: 12,
            success: true,
        });
        collector.process_pending();

        let report = collector.report();
        assert_eq!(report.events.len(), 2);
        assert_eq!(report.summary.phase_changes, 1);
        assert_eq!(report.summary.acquisitions.mean_ms, Some(12));
    }

    #[test]
    fn export_to_file_returns_written_path() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("nested").join("report.json");

        let written = DiagnosticsCollector::default()
            .export_to_file(&path)
            .expect("export should succeed");

        assert_eq!(written, path);
        let content = std::fs::read_to_string(&path).expect("report exists");
        assert!(content.contains("\"app_version\""));
    }
}
