// SPDX-License-Identifier: MPL-2.0
//! Diagnostics module for collecting and exporting activity reports.
//!
//! The session controller and the front end log user actions, phase changes,
//! timed device/upload operations, warnings and errors through cheap
//! [`DiagnosticsHandle`]s. Events land in a memory-bounded circular buffer
//! and can be exported as a sanitized JSON report.
//!
//! # Architecture
//!
//! - [`CircularBuffer`]: Generic ring buffer with configurable capacity
//! - [`DiagnosticEvent`]: Timestamped event with a typed payload
//! - [`DiagnosticsCollector`]: Owns the buffer, drains handles, builds reports
//! - [`DiagnosticReport`]: Header, host, [`SessionSummary`] and the events
//!
//! # Privacy
//!
//! Free text is sanitized when it is logged. File paths, URLs and wallet
//! addresses never reach the buffer.

mod buffer;
mod collector;
mod events;
mod export;
mod report;
mod sanitizer;

pub use buffer::{BufferCapacity, CircularBuffer};
pub use collector::{DiagnosticsCollector, DiagnosticsHandle};
pub use events::{
    AppOperation, DiagnosticEvent, DiagnosticEventKind, ErrorEvent, ErrorType, UserAction,
    WarningEvent, WarningType,
};
pub use export::ExportError;
pub use report::{
    DiagnosticReport, HostInfo, OperationStats, ReportEntry, ReportHeader, SessionSummary,
};
pub use sanitizer::sanitize_message;
