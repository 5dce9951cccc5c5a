// SPDX-License-Identifier: MPL-2.0
//! Diagnostic event types for activity tracking.
//!
//! This module defines the various types of events that can be captured
//! during a capture session for diagnostic purposes.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// User-initiated actions, one per session command.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UserAction {
    // ==========================================================================
    // Camera Actions
    // ==========================================================================
    /// Camera turned on.
    EnableCamera,

    /// Camera turned off.
    DisableCamera,

    /// Front/back camera toggle.
    SwitchFacing,

    // ==========================================================================
    // Capture Actions
    // ==========================================================================
    /// Still image requested.
    Capture,

    /// Captured image discarded.
    CancelReview,

    /// Upload of the captured image confirmed.
    BeginUpload,

    // ==========================================================================
    // Screen Navigation
    // ==========================================================================
    /// Gallery view opened.
    OpenGallery,

    /// Gallery view closed.
    CloseGallery,

    /// Gallery image expanded.
    SelectAsset,

    /// Error notification dismissed.
    DismissError,

    /// Diagnostics report exported.
    ExportDiagnostics,
}

/// Timed operations performed against collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum AppOperation {
    /// Camera stream acquisition.
    AcquireStream {
        /// Requested camera.
        facing: String,
        /// Time until the device answered.
        duration_ms: u64,
        /// Whether a stream was obtained.
        success: bool,
    },

    /// Camera stream release.
    ReleaseStream {
        /// Time until the device was closed.
        duration_ms: u64,
    },

    /// Frame capture and encoding.
    CaptureFrame {
        /// Encoding time.
        duration_ms: u64,
        /// Encoded size.
        size_bytes: u64,
    },

    /// Image upload.
    Upload {
        /// Time until the upload settled.
        duration_ms: u64,
        /// Uploaded payload size.
        size_bytes: u64,
        /// Whether a receipt was returned.
        success: bool,
    },

    /// Gallery listing.
    LoadGallery {
        /// Time until the search service answered.
        duration_ms: u64,
        /// Number of images listed.
        item_count: usize,
    },
}

/// What a warning is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningType {
    ConfigurationIssue,
    /// A device completion arrived after its request was superseded.
    StaleCompletion,
    NetworkError,
    Other,
}

/// Which part of the session failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    AcquisitionError,
    /// Frame grab or JPEG encoding.
    CaptureError,
    UploadError,
    GalleryError,
    /// Settings or report files.
    IoError,
    Other,
}

/// A categorized warning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WarningEvent {
    /// Warning category.
    pub warning_type: WarningType,
    /// Sanitized message.
    pub message: String,
    /// Module that raised the warning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_module: Option<String>,
}

impl WarningEvent {
    /// Creates a warning without source information.
    pub fn new(warning_type: WarningType, message: impl Into<String>) -> Self {
        Self {
            warning_type,
            message: message.into(),
            source_module: None,
        }
    }

    /// Attaches the module that raised the warning.
    #[must_use]
    pub fn with_source(mut self, module: impl Into<String>) -> Self {
        self.source_module = Some(module.into());
        self
    }
}

/// A categorized error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEvent {
    /// Error category.
    pub error_type: ErrorType,
    /// Sanitized message.
    pub message: String,
    /// Localization key of the user-facing message, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Module that raised the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_module: Option<String>,
}

impl ErrorEvent {
    /// Creates an error without code or source information.
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            error_code: None,
            source_module: None,
        }
    }

    /// Attaches the localization key of the surfaced message.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    /// Attaches the module that raised the error.
    #[must_use]
    pub fn with_source(mut self, module: impl Into<String>) -> Self {
        self.source_module = Some(module.into());
        self
    }
}

/// A diagnostic event with its capture time.
#[derive(Debug, Clone)]
pub struct DiagnosticEvent {
    /// Monotonic capture time.
    pub timestamp: Instant,
    /// Event payload.
    pub kind: DiagnosticEventKind,
}

impl DiagnosticEvent {
    /// Creates an event stamped with the current instant.
    #[must_use]
    pub fn new(kind: DiagnosticEventKind) -> Self {
        Self {
            timestamp: Instant::now(),
            kind,
        }
    }

    /// Creates an event with an explicit timestamp.
    #[must_use]
    pub fn with_timestamp(kind: DiagnosticEventKind, timestamp: Instant) -> Self {
        Self { timestamp, kind }
    }
}

/// Payload of a diagnostic event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticEventKind {
    /// User action.
    UserAction {
        /// What the user did.
        action: UserAction,
        /// Optional free-form details.
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },

    /// Session phase change.
    AppState {
        /// Phase name before the change.
        from: String,
        /// Phase name after the change.
        to: String,
    },

    /// Timed collaborator operation.
    Operation {
        /// Operation details.
        operation: AppOperation,
    },

    /// Warning.
    Warning {
        /// Warning details.
        event: WarningEvent,
    },

    /// Error.
    Error {
        /// Error details.
        event: ErrorEvent,
    },
}
