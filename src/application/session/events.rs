// SPDX-License-Identifier: MPL-2.0
//! Notifications broadcast by the session controller.

use crate::application::port::Receipt;
use crate::domain::media::StreamId;
use crate::domain::session::{ErrorInfo, Facing};

/// Something observable happened in the session.
///
/// Delivered over a `tokio::sync::broadcast` channel; slow subscribers may
/// miss events and should fall back to [`SessionController::snapshot`].
///
/// [`SessionController::snapshot`]: super::SessionController::snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The camera was turned on.
    CameraEnabled,
    /// The camera was turned off.
    CameraDisabled,
    /// A stream is now live.
    StreamAcquired { id: StreamId, facing: Facing },
    /// A stream was released.
    StreamReleased { id: StreamId },
    /// The camera could not be opened. The camera is now disabled.
    AcquisitionFailed(ErrorInfo),
    /// A still image was captured.
    Captured {
        /// Hex BLAKE3 digest of the encoded image.
        digest: String,
        width: u32,
        height: u32,
    },
    /// The live frame could not be frozen.
    CaptureFailed(ErrorInfo),
    /// The captured image was discarded.
    ReviewCancelled,
    /// An upload started.
    UploadStarted,
    /// The image was stored.
    UploadSucceeded(Receipt),
    /// The upload failed; the image is kept for retry unless the camera was
    /// turned off meanwhile.
    UploadFailed(ErrorInfo),
    /// The targeted camera changed.
    FacingChanged(Facing),
    /// The gallery view was opened.
    GalleryOpened,
    /// The gallery view was closed.
    GalleryClosed,
    /// The surfaced error was dismissed.
    ErrorDismissed,
    /// The session was shut down; no further events follow.
    ShutDown,
}
