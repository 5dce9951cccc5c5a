// SPDX-License-Identifier: MPL-2.0
//! Camera session domain types.
//!
//! These value types describe the capture session as the user sees it:
//! which camera is targeted, which view is shown, which phase the session is
//! in and what error (if any) is being surfaced.

use std::fmt;
use std::str::FromStr;

// =============================================================================
// Facing
// =============================================================================

/// Which physical camera a capture request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    /// User-facing ("selfie") camera.
    Front,
    /// Environment-facing camera. Requested first, like a phone camera app.
    #[default]
    Back,
}

impl Facing {
    /// Returns the opposite camera.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Facing::Front => Facing::Back,
            Facing::Back => Facing::Front,
        }
    }

    /// Returns the stable lowercase name used in config files and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Facing::Front => "front",
            Facing::Back => "back",
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" | "user" => Ok(Facing::Front),
            "back" | "environment" => Ok(Facing::Back),
            other => Err(format!("unknown facing mode: {other}")),
        }
    }
}

// =============================================================================
// View
// =============================================================================

/// Which top-level view is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Camera preview and capture controls.
    #[default]
    Capture,
    /// Previously uploaded images. The capture state machine is suspended.
    Gallery,
}

// =============================================================================
// SessionPhase
// =============================================================================

/// Observable phase of the capture session.
///
/// Phases are derived from the session state rather than stored, so they can
/// never disagree with the flags they summarize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Camera disabled.
    Idle,
    /// Camera enabled, live preview running (or being acquired).
    Live,
    /// Still image captured, waiting for the user to confirm or cancel.
    Reviewing,
    /// Captured image being uploaded.
    Uploading,
    /// Facing change in progress.
    Switching,
    /// Gallery shown, capture suspended.
    Gallery,
}

impl SessionPhase {
    /// Returns the stable lowercase name used in logs and status output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Live => "live",
            SessionPhase::Reviewing => "reviewing",
            SessionPhase::Uploading => "uploading",
            SessionPhase::Switching => "switching",
            SessionPhase::Gallery => "gallery",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ErrorInfo
// =============================================================================

/// Origin of a user-facing session error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Camera could not be acquired (permission, missing or busy device).
    Acquisition,
    /// A still frame could not be captured.
    Capture,
    /// The captured image could not be uploaded. Retry stays possible.
    Upload,
}

/// The single error currently surfaced to the user.
///
/// `message` is plain English text; `message_key` is the localization key
/// the presentation layer resolves for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    kind: ErrorKind,
    message: String,
    message_key: String,
}

impl ErrorInfo {
    /// Creates a new error description.
    pub fn new(kind: ErrorKind, message: impl Into<String>, message_key: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            message_key: message_key.into(),
        }
    }

    /// Returns the error origin.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the localization key.
    #[must_use]
    pub fn message_key(&self) -> &str {
        &self.message_key
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
