// SPDX-License-Identifier: MPL-2.0
//! Device media source port definition.
//!
//! This module defines the [`MediaSource`] trait used by the session to
//! acquire and release the device camera, along with the [`StreamHandle`]
//! shared between the session and the device backend.

use crate::domain::media::{AspectRatio, RawImage, ResolutionHint, StreamId};
use crate::domain::session::{ErrorInfo, ErrorKind, Facing};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

// =============================================================================
// AcquisitionError
// =============================================================================

/// Errors that can occur while acquiring the device camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    /// The user or the OS refused camera access.
    PermissionDenied,

    /// No camera matches the requested constraints.
    DeviceNotFound,

    /// The camera exists but another process holds it.
    DeviceBusy,

    /// Any other backend failure, with the raw message.
    Other(String),
}

impl AcquisitionError {
    /// Returns the i18n message key for this error type.
    #[must_use]
    pub fn i18n_key(&self) -> &'static str {
        match self {
            AcquisitionError::PermissionDenied => "error-camera-permission-denied",
            AcquisitionError::DeviceNotFound => "error-camera-not-found",
            AcquisitionError::DeviceBusy => "error-camera-busy",
            AcquisitionError::Other(_) => "error-camera-general",
        }
    }

    /// Classifies a raw backend error message into a specific variant.
    ///
    /// Device backends report failures as text (errno strings, driver
    /// messages); this keeps the classification in one place.
    #[must_use]
    pub fn from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("permission denied")
            || msg_lower.contains("not permitted")
            || msg_lower.contains("access denied")
            || msg_lower.contains("notallowed")
        {
            return AcquisitionError::PermissionDenied;
        }

        if msg_lower.contains("busy") || msg_lower.contains("in use") {
            return AcquisitionError::DeviceBusy;
        }

        if msg_lower.contains("no such file")
            || msg_lower.contains("no such device")
            || msg_lower.contains("not found")
            || msg_lower.contains("no camera")
        {
            return AcquisitionError::DeviceNotFound;
        }

        AcquisitionError::Other(msg.to_string())
    }
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionError::PermissionDenied => {
                write!(f, "Unable to access the camera. Please check your permissions.")
            }
            AcquisitionError::DeviceNotFound => write!(f, "No camera was found"),
            AcquisitionError::DeviceBusy => write!(f, "The camera is in use by another application"),
            AcquisitionError::Other(msg) => write!(f, "Camera error: {msg}"),
        }
    }
}

impl std::error::Error for AcquisitionError {}

impl From<&AcquisitionError> for ErrorInfo {
    fn from(err: &AcquisitionError) -> Self {
        ErrorInfo::new(ErrorKind::Acquisition, err.to_string(), err.i18n_key())
    }
}

// =============================================================================
// CaptureConstraints
// =============================================================================

/// Constraints passed to the device when acquiring a stream.
///
/// The session only interprets `facing`; the remaining fields are handed to
/// the backend untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureConstraints {
    /// Which camera to open.
    pub facing: Facing,
    /// Preferred frame size.
    pub resolution: Option<ResolutionHint>,
    /// Preferred frame aspect ratio.
    pub aspect_ratio: Option<AspectRatio>,
}

impl CaptureConstraints {
    /// Returns a copy of these constraints targeting another camera.
    #[must_use]
    pub fn with_facing(self, facing: Facing) -> Self {
        Self { facing, ..self }
    }
}

// =============================================================================
// StreamHandle
// =============================================================================

struct StreamShared {
    id: StreamId,
    facing: Facing,
    latest_frame: Mutex<Option<RawImage>>,
    stopped: AtomicBool,
}

/// Handle to an active live stream.
///
/// Cheap to clone. The device backend publishes frames into the handle and
/// watches [`StreamHandle::is_stopped`] to know when to shut the device down.
#[derive(Clone)]
pub struct StreamHandle {
    shared: Arc<StreamShared>,
}

impl StreamHandle {
    /// Creates a handle for a freshly opened stream.
    #[must_use]
    pub fn new(facing: Facing) -> Self {
        Self {
            shared: Arc::new(StreamShared {
                id: StreamId::next(),
                facing,
                latest_frame: Mutex::new(None),
                stopped: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the unique id of this acquisition.
    #[must_use]
    pub fn id(&self) -> StreamId {
        self.shared.id
    }

    /// Returns the camera this stream was opened for.
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.shared.facing
    }

    /// Replaces the latest frame. Ignored once the stream is stopped.
    pub fn publish_frame(&self, frame: RawImage) {
        if self.is_stopped() {
            return;
        }
        let mut slot = self
            .shared
            .latest_frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(frame);
    }

    /// Returns the most recent frame, if the device has delivered one.
    #[must_use]
    pub fn latest_frame(&self) -> Option<RawImage> {
        self.shared
            .latest_frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Marks the stream as stopped and drops the buffered frame.
    ///
    /// Returns `true` only for the call that actually stopped the stream,
    /// so backends can make `release` idempotent.
    pub fn stop(&self) -> bool {
        let first = !self.shared.stopped.swap(true, Ordering::SeqCst);
        if first {
            self.shared
                .latest_frame
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
        }
        first
    }

    /// Returns `true` once the stream has been released.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("id", &self.shared.id)
            .field("facing", &self.shared.facing)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

impl PartialEq for StreamHandle {
    fn eq(&self, other: &Self) -> bool {
        self.shared.id == other.shared.id
    }
}

impl Eq for StreamHandle {}

// =============================================================================
// MediaSource Trait
// =============================================================================

/// Port for the device camera.
///
/// Both calls may suspend for an arbitrarily long time. The session never
/// issues two calls concurrently, and always releases a stream before
/// acquiring one with different constraints.
///
/// # Example
///
/// ```ignore
/// use snappy::application::port::camera::{CaptureConstraints, MediaSource};
///
/// async fn probe(source: &impl MediaSource) -> bool {
///     match source.acquire(&CaptureConstraints::default()).await {
///         Ok(stream) => {
///             source.release(&stream).await;
///             true
///         }
///         Err(_) => false,
///     }
/// }
/// ```
pub trait MediaSource: Send + Sync + 'static {
    /// Opens the camera matching `constraints`.
    ///
    /// # Errors
    ///
    /// Returns an [`AcquisitionError`] if access is denied, no device matches,
    /// or the device is busy.
    fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> impl Future<Output = Result<StreamHandle, AcquisitionError>> + Send;

    /// Releases a stream. Must tolerate streams that are already released.
    fn release(&self, stream: &StreamHandle) -> impl Future<Output = ()> + Send;
}
