// SPDX-License-Identifier: MPL-2.0
//! Writing reports to disk.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::report::DiagnosticReport;

/// Sub-directory of the data directory holding reports.
const REPORTS_DIR: &str = "diagnostics";

/// Why a report could not be written.
#[derive(Debug)]
pub enum ExportError {
    Io(io::Error),
    Serialization(serde_json::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Serialization(err) => write!(f, "serialization error: {err}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

/// `snappy_diagnostics_YYYYMMDD_HHMMSS.json`, in local time.
#[must_use]
pub fn report_file_name(at: DateTime<Local>) -> String {
    format!("snappy_diagnostics_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Where `export-diagnostics` writes when no path is given.
///
/// Falls back to the working directory when no data directory resolves.
#[must_use]
pub fn reports_directory() -> PathBuf {
    match crate::paths::get_app_data_dir() {
        Some(dir) => dir.join(REPORTS_DIR),
        None => PathBuf::from("."),
    }
}

/// Serializes `report` to `path`, creating parent directories.
///
/// The JSON goes to a sibling `.partial` file first and is renamed into
/// place, so a crash never leaves a truncated report behind.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or any file operation fails.
pub fn write_report(report: &DiagnosticReport, path: &Path) -> Result<(), ExportError> {
    let json = report.to_json()?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    fs::write(&partial, json)?;
    fs::rename(&partial, path).inspect_err(|_| {
        let _ = fs::remove_file(&partial);
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::report::{HostInfo, ReportHeader};
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn empty_report() -> DiagnosticReport {
        DiagnosticReport::assemble(
            ReportHeader::new(chrono::Utc::now(), 0),
            HostInfo::probe(),
            Vec::new(),
        )
    }

    #[test]
    fn file_name_embeds_local_timestamp() {
        let at = Local
            .with_ymd_and_hms(2026, 3, 9, 14, 5, 7)
            .single()
            .expect("unambiguous time");
        assert_eq!(report_file_name(at), "snappy_diagnostics_20260309_140507.json");
    }

    #[test]
    fn io_errors_convert_and_display() {
        let err: ExportError = io::Error::other("read-only").into();
        assert!(matches!(err, ExportError::Io(_)));
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn write_report_creates_directories_and_leaves_no_partial_file() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("a").join("b").join("report.json");

        write_report(&empty_report(), &path).expect("write should succeed");

        let written = fs::read_to_string(&path).expect("report exists");
        assert!(written.contains("\"report_id\""));
        assert!(!dir.path().join("a/b/report.json.partial").exists());
    }

    #[test]
    fn write_report_fails_when_parent_is_a_file() {
        let dir = tempdir().expect("create temp dir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").expect("write");

        let err = write_report(&empty_report(), &blocker.join("report.json"))
            .expect_err("parent is a file");
        assert!(matches!(err, ExportError::Io(_)));
    }
}
