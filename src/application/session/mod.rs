// SPDX-License-Identifier: MPL-2.0
//! Camera session lifecycle and capture/upload coordination.
//!
//! [`SessionController`] is the sole owner of the session state. It decides
//! when the device camera is acquired, released and re-acquired, and how
//! capture and upload requests interact with that lifecycle.
//!
//! # Concurrency
//!
//! The controller is a cheap `Clone` handle; events may be issued from
//! several tasks at once. Three rules keep the device consistent:
//!
//! - every acquire/release runs under one async device lock, inside a
//!   reconcile loop that drives the held stream towards the stream the
//!   current state asks for
//! - a completed acquisition is kept only if the state still wants a stream
//!   with that facing; otherwise it is released on the spot
//! - `uploading` and the switch latch reject or serialize re-entrant
//!   operations
//!
//! State is guarded by a `std::sync::Mutex` that is never held across an
//! await point.
//!
//! # Errors
//!
//! Collaborator failures never escape. They become the single
//! [`ErrorInfo`] of the session and a [`SessionEvent`]. Events arriving in a
//! state where they make no sense are ignored and the call returns `false`.

mod events;
mod state;

pub use events::SessionEvent;
pub use state::SessionSnapshot;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tokio::sync::{broadcast, Mutex as AsyncMutex};

use crate::application::port::{
    CaptureConstraints, CapturedImage, FrameCapturer, MediaSource, StreamHandle, UploadClient,
};
use crate::diagnostics::{
    AppOperation, DiagnosticsHandle, ErrorEvent, ErrorType, UserAction, WarningEvent, WarningType,
};
use crate::domain::session::{ErrorInfo, Facing, View};
use state::SessionState;

/// Capacity of the event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Source module name attached to diagnostics.
const DIAGNOSTICS_SOURCE: &str = "session";

/// Construction options for a [`SessionController`].
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Constraints passed to the media source. `facing` is the initial camera.
    pub constraints: CaptureConstraints,
    /// Where to log actions, operations and errors.
    pub diagnostics: Option<DiagnosticsHandle>,
}

struct Inner<M, C, U> {
    media: M,
    capturer: C,
    uploader: U,
    constraints: CaptureConstraints,
    state: Mutex<SessionState>,
    /// Serializes every acquire/release.
    device: AsyncMutex<()>,
    /// Serializes facing changes.
    switch_latch: AsyncMutex<()>,
    events: broadcast::Sender<SessionEvent>,
    /// Set once `ShutDown` has been broadcast.
    closed: AtomicBool,
    diagnostics: Option<DiagnosticsHandle>,
}

impl<M, C, U> Drop for Inner<M, C, U> {
    fn drop(&mut self) {
        // Last handle gone without shutdown: stop the device backend anyway.
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(stream) = state.live.take() {
            stream.stop();
        }
    }
}

/// Next step of the reconcile loop.
enum Step {
    Settled,
    Release(StreamHandle),
    Acquire(Facing),
}

/// Owns the camera session and orchestrates its collaborators.
///
/// # Example
///
/// ```ignore
/// let session = SessionController::new(camera, capturer, uploader);
/// session.enable_camera().await;
/// session.capture().await;
/// session.begin_upload().await;
/// ```
pub struct SessionController<M, C, U> {
    inner: Arc<Inner<M, C, U>>,
}

impl<M, C, U> Clone for SessionController<M, C, U> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M, C, U> SessionController<M, C, U>
where
    M: MediaSource,
    C: FrameCapturer,
    U: UploadClient,
{
    /// Creates an idle session targeting the back camera.
    pub fn new(media: M, capturer: C, uploader: U) -> Self {
        Self::with_options(media, capturer, uploader, SessionOptions::default())
    }

    /// Creates an idle session with explicit constraints and diagnostics.
    pub fn with_options(media: M, capturer: C, uploader: U, options: SessionOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let state = SessionState {
            facing: options.constraints.facing,
            ..SessionState::default()
        };

        Self {
            inner: Arc::new(Inner {
                media,
                capturer,
                uploader,
                constraints: options.constraints,
                state: Mutex::new(state),
                device: AsyncMutex::new(()),
                switch_latch: AsyncMutex::new(()),
                events,
                closed: AtomicBool::new(false),
                diagnostics: options.diagnostics,
            }),
        }
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock_state().snapshot()
    }

    /// Returns the image awaiting confirmation.
    #[must_use]
    pub fn captured_image(&self) -> Option<CapturedImage> {
        self.lock_state().captured.clone()
    }

    /// Subscribes to session events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    // =========================================================================
    // Camera
    // =========================================================================

    /// Turns the camera on and acquires a stream with the current facing.
    ///
    /// On acquisition failure the camera is turned back off and the error is
    /// surfaced; nothing is retried.
    pub async fn enable_camera(&self) -> bool {
        let accepted = self.update(|state| {
            if state.torn_down || state.camera_enabled {
                return false;
            }
            state.camera_enabled = true;
            state.error = None;
            true
        });
        if !accepted {
            return false;
        }

        self.log_action(UserAction::EnableCamera);
        self.emit(SessionEvent::CameraEnabled);
        self.reconcile().await;
        true
    }

    /// Turns the camera off, releasing the stream and dropping any captured
    /// image.
    ///
    /// During an upload the image is only dropped once the upload settles.
    /// A pending acquisition or release completes before the stream is
    /// released.
    pub async fn disable_camera(&self) -> bool {
        let accepted = self.update(|state| {
            if state.torn_down || !state.camera_enabled {
                return false;
            }
            state.camera_enabled = false;
            state.error = None;
            if state.uploading {
                state.discard_after_upload = true;
            } else {
                state.captured = None;
            }
            true
        });
        if !accepted {
            return false;
        }

        self.log_action(UserAction::DisableCamera);
        self.emit(SessionEvent::CameraDisabled);
        self.reconcile().await;
        true
    }

    /// Toggles between front and back camera.
    ///
    /// Calls are serialized: a second call waits for the first to settle and
    /// then applies its own toggle. While reviewing, only the facing changes;
    /// the new camera is acquired once the review ends. Ignored in the
    /// gallery.
    pub async fn switch_facing(&self) -> bool {
        let _latch = self.inner.switch_latch.lock().await;

        let facing = self.update(|state| {
            if state.torn_down || !state.camera_enabled || state.view != View::Capture {
                return None;
            }
            state.switching = true;
            state.facing = state.facing.flipped();
            state.error = None;
            Some(state.facing)
        });
        let Some(facing) = facing else {
            return false;
        };

        self.log_action(UserAction::SwitchFacing);
        self.emit(SessionEvent::FacingChanged(facing));
        self.reconcile().await;
        self.update(|state| state.switching = false);
        true
    }

    // =========================================================================
    // Capture and review
    // =========================================================================

    /// Freezes the current live frame and releases the stream.
    ///
    /// Ignored unless a stream is live, no error is shown and no device
    /// operation is pending.
    pub async fn capture(&self) -> bool {
        {
            // A pending acquire/release means there is no stable frame to take.
            let Ok(_device) = self.inner.device.try_lock() else {
                return false;
            };

            let stream = {
                let state = self.lock_state();
                let ready = !state.torn_down
                    && state.camera_enabled
                    && state.error.is_none()
                    && state.view == View::Capture
                    && state.captured.is_none()
                    && !state.uploading;
                match (&state.live, ready) {
                    (Some(stream), true) => stream.clone(),
                    _ => return false,
                }
            };

            self.log_action(UserAction::Capture);
            let started = Instant::now();
            match self.inner.capturer.snapshot(&stream) {
                Ok(image) => {
                    self.log_operation(AppOperation::CaptureFrame {
                        duration_ms: elapsed_ms(started),
                        size_bytes: image.len() as u64,
                    });
                    let event = SessionEvent::Captured {
                        digest: image.digest().to_string(),
                        width: image.width(),
                        height: image.height(),
                    };
                    self.update(|state| state.captured = Some(image));
                    self.emit(event);
                }
                Err(err) => {
                    let info = ErrorInfo::from(&err);
                    self.log_error(ErrorType::CaptureError, &info);
                    self.update(|state| state.error = Some(info.clone()));
                    self.emit(SessionEvent::CaptureFailed(info));
                }
            }
        }

        self.reconcile().await;
        true
    }

    /// Discards the captured image and resumes the live preview.
    ///
    /// Ignored while the image is being uploaded and in the gallery.
    pub async fn cancel_review(&self) -> bool {
        let accepted = self.update(|state| {
            if state.torn_down
                || state.uploading
                || state.view != View::Capture
                || state.captured.is_none()
            {
                return false;
            }
            state.captured = None;
            true
        });
        if !accepted {
            return false;
        }

        self.log_action(UserAction::CancelReview);
        self.emit(SessionEvent::ReviewCancelled);
        self.reconcile().await;
        true
    }

    // =========================================================================
    // Upload
    // =========================================================================

    /// Uploads the captured image.
    ///
    /// At most one upload is in flight; re-entrant calls and calls from the
    /// gallery are ignored. On success the image is cleared and the preview
    /// resumes. On failure the image is kept so the same bytes can be
    /// uploaded again.
    pub async fn begin_upload(&self) -> bool {
        let image = self.update(|state| {
            if state.torn_down || state.uploading || state.view != View::Capture {
                return None;
            }
            let image = state.captured.clone()?;
            state.uploading = true;
            state.error = None;
            Some(image)
        });
        let Some(image) = image else {
            return false;
        };

        self.log_action(UserAction::BeginUpload);
        self.emit(SessionEvent::UploadStarted);

        let started = Instant::now();
        let result = self.inner.uploader.upload(&image).await;
        self.log_operation(AppOperation::Upload {
            duration_ms: elapsed_ms(started),
            size_bytes: image.len() as u64,
            success: result.is_ok(),
        });

        match result {
            Ok(receipt) => {
                self.update(|state| {
                    state.uploading = false;
                    state.discard_after_upload = false;
                    if state.captured.as_ref() == Some(&image) {
                        state.captured = None;
                    }
                    state.last_receipt = Some(receipt.clone());
                });
                self.emit(SessionEvent::UploadSucceeded(receipt));
            }
            Err(err) => {
                let info = ErrorInfo::from(&err);
                self.log_error(ErrorType::UploadError, &info);
                self.update(|state| {
                    state.uploading = false;
                    if std::mem::take(&mut state.discard_after_upload) {
                        state.captured = None;
                    }
                    if !state.torn_down {
                        state.error = Some(info.clone());
                    }
                });
                self.emit(SessionEvent::UploadFailed(info));
            }
        }

        self.reconcile().await;
        true
    }

    // =========================================================================
    // Gallery
    // =========================================================================

    /// Shows the gallery and suspends the capture state machine: capture,
    /// review, upload and facing changes are ignored until it is closed.
    pub async fn open_gallery(&self) -> bool {
        self.set_view(View::Gallery, UserAction::OpenGallery, SessionEvent::GalleryOpened)
            .await
    }

    /// Returns to the capture view, re-acquiring the camera if enabled.
    pub async fn close_gallery(&self) -> bool {
        self.set_view(View::Capture, UserAction::CloseGallery, SessionEvent::GalleryClosed)
            .await
    }

    async fn set_view(&self, view: View, action: UserAction, event: SessionEvent) -> bool {
        let accepted = self.update(|state| {
            if state.torn_down || state.view == view {
                return false;
            }
            state.view = view;
            true
        });
        if !accepted {
            return false;
        }

        self.log_action(action);
        self.emit(event);
        self.reconcile().await;
        true
    }

    // =========================================================================
    // Errors and teardown
    // =========================================================================

    /// Clears the surfaced error without touching anything else.
    pub fn dismiss_error(&self) -> bool {
        let dismissed = self.update(|state| state.error.take().is_some());
        if dismissed {
            self.log_action(UserAction::DismissError);
            self.emit(SessionEvent::ErrorDismissed);
        }
        dismissed
    }

    /// Releases every held stream and ignores all later events.
    ///
    /// Waits for any pending acquisition to settle first. An upload still in
    /// flight completes, but its result is no longer reported.
    pub async fn shutdown(&self) -> bool {
        let first = self.update(|state| {
            if state.torn_down {
                return false;
            }
            state.torn_down = true;
            state.camera_enabled = false;
            state.captured = None;
            state.error = None;
            true
        });
        if !first {
            return false;
        }

        self.reconcile().await;
        self.emit(SessionEvent::ShutDown);
        self.inner.closed.store(true, Ordering::Release);
        true
    }

    // =========================================================================
    // Device reconciliation
    // =========================================================================

    /// Drives the held stream towards the stream the state asks for.
    ///
    /// Runs under the device lock, so acquisitions and releases never
    /// overlap and results are applied in the order they were requested.
    async fn reconcile(&self) {
        let _device = self.inner.device.lock().await;

        loop {
            let step = self.update(|state| {
                let wanted = state.wanted_facing();
                let held = state.live.as_ref().map(StreamHandle::facing);
                match (held, wanted) {
                    (Some(held), Some(wanted)) if held == wanted => {
                        state.acquiring = false;
                        Step::Settled
                    }
                    (Some(_), _) => state.live.take().map_or(Step::Settled, Step::Release),
                    (None, Some(wanted)) => {
                        state.acquiring = true;
                        state.error = None;
                        Step::Acquire(wanted)
                    }
                    (None, None) => {
                        state.acquiring = false;
                        Step::Settled
                    }
                }
            });

            match step {
                Step::Settled => return,
                Step::Release(stream) => self.release_stream(&stream).await,
                Step::Acquire(facing) => {
                    if !self.acquire_stream(facing).await {
                        return;
                    }
                }
            }
        }
    }

    /// Acquires a stream for `facing`. Returns `false` once a failure has
    /// been surfaced and the loop must stop.
    async fn acquire_stream(&self, facing: Facing) -> bool {
        let constraints = self.inner.constraints.with_facing(facing);
        let started = Instant::now();
        let result = self.inner.media.acquire(&constraints).await;
        self.log_operation(AppOperation::AcquireStream {
            facing: facing.as_str().to_string(),
            duration_ms: elapsed_ms(started),
            success: result.is_ok(),
        });

        match result {
            Ok(stream) => {
                let kept = self.update(|state| {
                    if state.wanted_facing() == Some(facing) {
                        state.live = Some(stream.clone());
                        state.acquiring = false;
                        true
                    } else {
                        false
                    }
                });
                if kept {
                    self.emit(SessionEvent::StreamAcquired {
                        id: stream.id(),
                        facing,
                    });
                } else {
                    self.log_warning(format!(
                        "discarding {facing} stream acquired after the request was superseded"
                    ));
                    self.release_stream(&stream).await;
                }
                true
            }
            Err(err) => {
                let info = ErrorInfo::from(&err);
                let surfaced = self.update(|state| {
                    if state.wanted_facing() == Some(facing) {
                        state.camera_enabled = false;
                        state.acquiring = false;
                        state.error = Some(info.clone());
                        true
                    } else {
                        false
                    }
                });
                if surfaced {
                    self.log_error(ErrorType::AcquisitionError, &info);
                    self.emit(SessionEvent::AcquisitionFailed(info));
                    false
                } else {
                    self.log_warning(format!(
                        "ignoring {facing} acquisition failure after the request was superseded: {err}"
                    ));
                    true
                }
            }
        }
    }

    async fn release_stream(&self, stream: &StreamHandle) {
        let started = Instant::now();
        self.inner.media.release(stream).await;
        self.log_operation(AppOperation::ReleaseStream {
            duration_ms: elapsed_ms(started),
        });
        self.emit(SessionEvent::StreamReleased { id: stream.id() });
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `f` to the state and logs the phase change it causes.
    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let (result, before, after) = {
            let mut state = self.lock_state();
            let before = state.phase();
            let result = f(&mut state);
            (result, before, state.phase())
        };
        if before != after {
            if let Some(diagnostics) = &self.inner.diagnostics {
                diagnostics.log_state(before.as_str(), after.as_str());
            }
        }
        result
    }

    fn emit(&self, event: SessionEvent) {
        if self.inner.closed.load(Ordering::Acquire) {
            return;
        }
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    fn log_action(&self, action: UserAction) {
        if let Some(diagnostics) = &self.inner.diagnostics {
            diagnostics.log_action(action);
        }
    }

    fn log_operation(&self, operation: AppOperation) {
        if let Some(diagnostics) = &self.inner.diagnostics {
            diagnostics.log_operation(operation);
        }
    }

    fn log_error(&self, error_type: ErrorType, info: &ErrorInfo) {
        if let Some(diagnostics) = &self.inner.diagnostics {
            diagnostics.log_error(
                ErrorEvent::new(error_type, info.message())
                    .with_code(info.message_key())
                    .with_source(DIAGNOSTICS_SOURCE),
            );
        }
    }

    fn log_warning(&self, message: String) {
        if let Some(diagnostics) = &self.inner.diagnostics {
            diagnostics.log_warning(
                WarningEvent::new(WarningType::StaleCompletion, message)
                    .with_source(DIAGNOSTICS_SOURCE),
            );
        }
    }
}

#[allow(clippy::cast_possible_truncation)] // Duration in ms fits comfortably in u64
fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
