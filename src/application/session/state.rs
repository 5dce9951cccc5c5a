// SPDX-License-Identifier: MPL-2.0
//! Session state and its read-only snapshot.

use crate::application::port::{CapturedImage, Receipt, StreamHandle};
use crate::domain::media::StreamId;
use crate::domain::session::{ErrorInfo, Facing, SessionPhase, View};

/// Mutable state owned by the controller.
///
/// `live` is only written by the task holding the device lock.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub camera_enabled: bool,
    pub facing: Facing,
    pub live: Option<StreamHandle>,
    pub captured: Option<CapturedImage>,
    pub uploading: bool,
    pub switching: bool,
    pub acquiring: bool,
    pub error: Option<ErrorInfo>,
    pub view: View,
    pub last_receipt: Option<Receipt>,
    /// Set by `disable_camera` during an upload; the image is dropped once
    /// the upload settles instead of being kept for retry.
    pub discard_after_upload: bool,
    pub torn_down: bool,
}

impl SessionState {
    /// Facing of the stream that should be live right now, if any.
    pub fn wanted_facing(&self) -> Option<Facing> {
        let wanted = !self.torn_down
            && self.camera_enabled
            && self.view == View::Capture
            && self.captured.is_none();
        wanted.then_some(self.facing)
    }

    pub fn phase(&self) -> SessionPhase {
        derive_phase(
            self.view,
            self.switching,
            self.uploading,
            self.captured.is_some(),
            self.camera_enabled,
        )
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            camera_enabled: self.camera_enabled,
            facing: self.facing,
            live_stream: self.live.as_ref().map(StreamHandle::id),
            captured: self.captured.clone(),
            uploading: self.uploading,
            switching: self.switching,
            acquiring: self.acquiring,
            error: self.error.clone(),
            view: self.view,
            last_receipt: self.last_receipt.clone(),
            shut_down: self.torn_down,
        }
    }
}

fn derive_phase(
    view: View,
    switching: bool,
    uploading: bool,
    reviewing: bool,
    enabled: bool,
) -> SessionPhase {
    if view == View::Gallery {
        SessionPhase::Gallery
    } else if switching {
        SessionPhase::Switching
    } else if uploading {
        SessionPhase::Uploading
    } else if reviewing {
        SessionPhase::Reviewing
    } else if enabled {
        SessionPhase::Live
    } else {
        SessionPhase::Idle
    }
}

/// Point-in-time copy of the session state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Whether the user wants the camera on.
    pub camera_enabled: bool,
    /// Camera targeted by acquisitions.
    pub facing: Facing,
    /// Stream currently held, if any.
    pub live_stream: Option<StreamId>,
    /// Still image awaiting confirmation.
    pub captured: Option<CapturedImage>,
    /// An upload is in flight.
    pub uploading: bool,
    /// A facing change is in flight.
    pub switching: bool,
    /// A stream acquisition is in flight.
    pub acquiring: bool,
    /// Error currently surfaced to the user.
    pub error: Option<ErrorInfo>,
    /// Top-level view.
    pub view: View,
    /// Receipt of the most recent successful upload.
    pub last_receipt: Option<Receipt>,
    /// The session has been shut down.
    pub shut_down: bool,
}

impl SessionSnapshot {
    /// Derives the observable phase.
    ///
    /// Precedence: gallery, switching, uploading, reviewing, live, idle.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        derive_phase(
            self.view,
            self.switching,
            self.uploading,
            self.captured.is_some(),
            self.camera_enabled,
        )
    }

    /// Returns true if a stream is held.
    #[must_use]
    pub fn has_live_stream(&self) -> bool {
        self.live_stream.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::JPEG_CONTENT_TYPE;

    fn image() -> CapturedImage {
        CapturedImage::new(vec![1, 2, 3], 2, 2, JPEG_CONTENT_TYPE)
    }

    #[test]
    fn default_state_is_idle_back_facing() {
        let snapshot = SessionState::default().snapshot();
        assert_eq!(snapshot.phase(), SessionPhase::Idle);
        assert_eq!(snapshot.facing, Facing::Back);
        assert!(!snapshot.has_live_stream());
    }

    #[test]
    fn stream_wanted_only_when_enabled_in_capture_without_image() {
        let mut state = SessionState {
            camera_enabled: true,
            ..SessionState::default()
        };
        assert_eq!(state.wanted_facing(), Some(Facing::Back));

        state.captured = Some(image());
        assert_eq!(state.wanted_facing(), None);

        state.captured = None;
        state.view = View::Gallery;
        assert_eq!(state.wanted_facing(), None);

        state.view = View::Capture;
        state.torn_down = true;
        assert_eq!(state.wanted_facing(), None);
    }

    #[test]
    fn phase_precedence() {
        let mut state = SessionState {
            camera_enabled: true,
            captured: Some(image()),
            ..SessionState::default()
        };
        assert_eq!(state.snapshot().phase(), SessionPhase::Reviewing);

        state.uploading = true;
        assert_eq!(state.snapshot().phase(), SessionPhase::Uploading);

        state.switching = true;
        assert_eq!(state.snapshot().phase(), SessionPhase::Switching);

        state.view = View::Gallery;
        assert_eq!(state.snapshot().phase(), SessionPhase::Gallery);
    }

    #[test]
    fn enabled_without_image_is_live() {
        let state = SessionState {
            camera_enabled: true,
            acquiring: true,
            ..SessionState::default()
        };
        let snapshot = state.snapshot();
        assert_eq!(snapshot.phase(), SessionPhase::Live);
        assert!(snapshot.acquiring);
    }
}
