// SPDX-License-Identifier: MPL-2.0
//! In-memory collaborators for tests and the `--simulate` mode.
//!
//! Every fake is a cheap `Clone` handle over shared state, so a test can keep
//! one copy for inspection while the session owns another. Fakes count their
//! calls and can be gated to hold an operation in flight until the test
//! lets it through.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Semaphore;

use crate::application::port::{
    AcquisitionError, AssetRef, CaptureConstraints, CaptureError, CapturedImage, FrameCapturer,
    GalleryError, GalleryQuery, MediaSource, Receipt, StreamHandle, UploadClient, UploadError,
    JPEG_CONTENT_TYPE,
};
use crate::domain::media::{RawImage, StreamId};
use crate::domain::session::Facing;

/// Width of the frames published by [`FakeMediaSource`].
pub const FAKE_FRAME_WIDTH: u32 = 64;
/// Height of the frames published by [`FakeMediaSource`].
pub const FAKE_FRAME_HEIGHT: u32 = 48;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds operations in flight until permits are added.
#[derive(Default)]
struct Gate {
    semaphore: Mutex<Option<Arc<Semaphore>>>,
    waiting: AtomicUsize,
}

impl Gate {
    fn close(&self) {
        *lock(&self.semaphore) = Some(Arc::new(Semaphore::new(0)));
    }

    fn open(&self) {
        if let Some(semaphore) = lock(&self.semaphore).take() {
            semaphore.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    fn let_one_through(&self) {
        if let Some(semaphore) = lock(&self.semaphore).as_ref() {
            semaphore.add_permits(1);
        }
    }

    async fn pass(&self) {
        let semaphore = lock(&self.semaphore).clone();
        if let Some(semaphore) = semaphore {
            self.waiting.fetch_add(1, Ordering::SeqCst);
            if let Ok(permit) = semaphore.acquire().await {
                permit.forget();
            }
            self.waiting.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}

/// Yields to the runtime until `condition` holds.
///
/// # Panics
///
/// Panics if the condition is still false after many scheduler rounds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

/// Builds a deterministic RGBA test frame; the pattern depends on `facing`.
#[must_use]
pub fn sample_frame(facing: Facing) -> RawImage {
    let tint = match facing {
        Facing::Front => 200u8,
        Facing::Back => 40u8,
    };
    let mut pixels = Vec::with_capacity((FAKE_FRAME_WIDTH * FAKE_FRAME_HEIGHT * 4) as usize);
    for y in 0..FAKE_FRAME_HEIGHT {
        for x in 0..FAKE_FRAME_WIDTH {
            pixels.extend_from_slice(&[(x * 4) as u8, (y * 5) as u8, tint, 255]);
        }
    }
    RawImage::from_rgba(FAKE_FRAME_WIDTH, FAKE_FRAME_HEIGHT, pixels)
        .unwrap_or_else(|| unreachable!("frame buffer matches its dimensions"))
}

// =============================================================================
// FakeMediaSource
// =============================================================================

#[derive(Default)]
struct MediaState {
    acquire_calls: AtomicUsize,
    release_calls: AtomicUsize,
    requested: Mutex<Vec<Facing>>,
    open: Mutex<Vec<StreamId>>,
    max_open: AtomicUsize,
    failure: Mutex<Option<AcquisitionError>>,
    gate: Gate,
}

/// Device media source that hands out frame-filled handles.
#[derive(Clone, Default)]
pub struct FakeMediaSource {
    inner: Arc<MediaState>,
}

impl FakeMediaSource {
    /// Creates a source where every acquisition succeeds immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following acquisition fail with `error` (or succeed
    /// again with `None`).
    pub fn set_failure(&self, error: Option<AcquisitionError>) {
        *lock(&self.inner.failure) = error;
    }

    /// Holds acquisitions until [`FakeMediaSource::let_one_through`] or
    /// [`FakeMediaSource::open_gate`].
    pub fn close_gate(&self) {
        self.inner.gate.close();
    }

    /// Releases every held and future acquisition.
    pub fn open_gate(&self) {
        self.inner.gate.open();
    }

    /// Lets exactly one held acquisition complete.
    pub fn let_one_through(&self) {
        self.inner.gate.let_one_through();
    }

    /// Number of acquisitions currently held at the gate.
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.inner.gate.waiting()
    }

    /// Number of `acquire` calls so far.
    #[must_use]
    pub fn acquire_calls(&self) -> usize {
        self.inner.acquire_calls.load(Ordering::SeqCst)
    }

    /// Number of `release` calls so far, double releases included.
    #[must_use]
    pub fn release_calls(&self) -> usize {
        self.inner.release_calls.load(Ordering::SeqCst)
    }

    /// Streams handed out and not yet released.
    #[must_use]
    pub fn open_streams(&self) -> usize {
        lock(&self.inner.open).len()
    }

    /// Largest number of streams that were ever open at the same time.
    #[must_use]
    pub fn max_open_streams(&self) -> usize {
        self.inner.max_open.load(Ordering::SeqCst)
    }

    /// Facing of every acquisition request, in call order.
    #[must_use]
    pub fn requested_facings(&self) -> Vec<Facing> {
        lock(&self.inner.requested).clone()
    }
}

impl MediaSource for FakeMediaSource {
    fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> impl Future<Output = Result<StreamHandle, AcquisitionError>> + Send {
        let inner = Arc::clone(&self.inner);
        let facing = constraints.facing;
        async move {
            inner.acquire_calls.fetch_add(1, Ordering::SeqCst);
            lock(&inner.requested).push(facing);
            inner.gate.pass().await;

            let failure = lock(&inner.failure).clone();
            if let Some(error) = failure {
                return Err(error);
            }

            let stream = StreamHandle::new(facing);
            stream.publish_frame(sample_frame(facing));
            let open_now = {
                let mut open = lock(&inner.open);
                open.push(stream.id());
                open.len()
            };
            inner.max_open.fetch_max(open_now, Ordering::SeqCst);
            Ok(stream)
        }
    }

    fn release(&self, stream: &StreamHandle) -> impl Future<Output = ()> + Send {
        let inner = Arc::clone(&self.inner);
        let stream = stream.clone();
        async move {
            inner.release_calls.fetch_add(1, Ordering::SeqCst);
            stream.stop();
            lock(&inner.open).retain(|id| *id != stream.id());
        }
    }
}

// =============================================================================
// FakeCapturer
// =============================================================================

#[derive(Default)]
struct CapturerState {
    calls: AtomicUsize,
    failure: Mutex<Option<CaptureError>>,
}

/// Frame capturer that wraps the raw frame bytes instead of encoding them.
#[derive(Clone, Default)]
pub struct FakeCapturer {
    inner: Arc<CapturerState>,
}

impl FakeCapturer {
    /// Creates a capturer that always succeeds when a frame is present.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following snapshot fail with `error` (or succeed again
    /// with `None`).
    pub fn set_failure(&self, error: Option<CaptureError>) {
        *lock(&self.inner.failure) = error;
    }

    /// Number of `snapshot` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

impl FrameCapturer for FakeCapturer {
    fn snapshot(&self, stream: &StreamHandle) -> Result<CapturedImage, CaptureError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = lock(&self.inner.failure).clone() {
            return Err(error);
        }
        let frame = stream.latest_frame().ok_or(CaptureError::NoFrame)?;
        Ok(CapturedImage::new(
            frame.rgba_bytes().to_vec(),
            frame.width(),
            frame.height(),
            JPEG_CONTENT_TYPE,
        ))
    }
}

// =============================================================================
// FakeUploadClient
// =============================================================================

#[derive(Default)]
struct UploadState {
    calls: AtomicUsize,
    digests: Mutex<Vec<String>>,
    failure: Mutex<Option<UploadError>>,
    receipt_id: Mutex<Option<String>>,
    gate: Gate,
    in_flight: AtomicBool,
}

/// Upload client that records payload digests and returns `tx<N>` receipts.
#[derive(Clone, Default)]
pub struct FakeUploadClient {
    inner: Arc<UploadState>,
}

impl FakeUploadClient {
    /// Creates a client where every upload succeeds immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following upload fail with `error` (or succeed again
    /// with `None`).
    pub fn set_failure(&self, error: Option<UploadError>) {
        *lock(&self.inner.failure) = error;
    }

    /// Uses a fixed receipt id instead of `tx<N>`.
    pub fn set_receipt_id(&self, id: impl Into<String>) {
        *lock(&self.inner.receipt_id) = Some(id.into());
    }

    /// Holds uploads until the gate is opened.
    pub fn close_gate(&self) {
        self.inner.gate.close();
    }

    /// Releases every held and future upload.
    pub fn open_gate(&self) {
        self.inner.gate.open();
    }

    /// Lets exactly one held upload complete.
    pub fn let_one_through(&self) {
        self.inner.gate.let_one_through();
    }

    /// Number of uploads currently held at the gate.
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.inner.gate.waiting()
    }

    /// Number of `upload` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// Digest of every uploaded payload, in call order.
    #[must_use]
    pub fn uploaded_digests(&self) -> Vec<String> {
        lock(&self.inner.digests).clone()
    }
}

impl UploadClient for FakeUploadClient {
    fn upload(
        &self,
        image: &CapturedImage,
    ) -> impl Future<Output = Result<Receipt, UploadError>> + Send {
        let inner = Arc::clone(&self.inner);
        let digest = image.digest().to_string();
        async move {
            let call = inner.calls.fetch_add(1, Ordering::SeqCst) + 1;
            assert!(
                !inner.in_flight.swap(true, Ordering::SeqCst),
                "concurrent uploads"
            );
            lock(&inner.digests).push(digest);
            inner.gate.pass().await;
            inner.in_flight.store(false, Ordering::SeqCst);

            let failure = lock(&inner.failure).clone();
            if let Some(error) = failure {
                return Err(error);
            }
            let id = lock(&inner.receipt_id)
                .clone()
                .unwrap_or_else(|| format!("tx{call}"));
            Ok(Receipt::new(id))
        }
    }
}

// =============================================================================
// FakeGallery
// =============================================================================

#[derive(Default)]
struct GalleryState {
    ids: Mutex<Vec<String>>,
    failure: Mutex<Option<GalleryError>>,
    owners: Mutex<Vec<String>>,
}

/// Gallery query serving a fixed list of ids.
#[derive(Clone, Default)]
pub struct FakeGallery {
    inner: Arc<GalleryState>,
}

impl FakeGallery {
    /// Creates a gallery listing `ids`.
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let gallery = Self::default();
        *lock(&gallery.inner.ids) = ids.into_iter().map(Into::into).collect();
        gallery
    }

    /// Adds an id, as if an upload had just been indexed.
    pub fn push_id(&self, id: impl Into<String>) {
        lock(&self.inner.ids).insert(0, id.into());
    }

    /// Makes every following query fail with `error` (or succeed again with
    /// `None`).
    pub fn set_failure(&self, error: Option<GalleryError>) {
        *lock(&self.inner.failure) = error;
    }

    /// Owners queried so far.
    #[must_use]
    pub fn queried_owners(&self) -> Vec<String> {
        lock(&self.inner.owners).clone()
    }
}

impl GalleryQuery for FakeGallery {
    fn list_uploads(
        &self,
        owner: &str,
    ) -> impl Future<Output = Result<Vec<AssetRef>, GalleryError>> + Send {
        let inner = Arc::clone(&self.inner);
        let owner = owner.to_string();
        async move {
            lock(&inner.owners).push(owner);
            let failure = lock(&inner.failure).clone();
            if let Some(error) = failure {
                return Err(error);
            }
            Ok(lock(&inner.ids).iter().map(AssetRef::new).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn media_source_tracks_open_streams() {
        let source = FakeMediaSource::new();
        let stream = source
            .acquire(&CaptureConstraints::default())
            .await
            .expect("acquire");
        assert_eq!(source.open_streams(), 1);
        assert!(stream.latest_frame().is_some());

        source.release(&stream).await;
        source.release(&stream).await;
        assert_eq!(source.open_streams(), 0);
        assert_eq!(source.release_calls(), 2);
        assert!(stream.is_stopped());
    }

    #[tokio::test]
    async fn media_source_gate_holds_acquisition() {
        let source = FakeMediaSource::new();
        source.close_gate();

        let pending = tokio::spawn({
            let source = source.clone();
            async move { source.acquire(&CaptureConstraints::default()).await }
        });
        wait_until(|| source.waiting() == 1).await;
        assert_eq!(source.open_streams(), 0);

        source.let_one_through();
        let stream = pending.await.expect("task").expect("acquire");
        assert_eq!(stream.facing(), Facing::Back);
    }

    #[tokio::test]
    async fn media_source_failure_is_reported() {
        let source = FakeMediaSource::new();
        source.set_failure(Some(AcquisitionError::DeviceBusy));
        let result = source.acquire(&CaptureConstraints::default()).await;
        assert_eq!(result.unwrap_err(), AcquisitionError::DeviceBusy);
        assert_eq!(source.acquire_calls(), 1);
    }

    #[test]
    fn capturer_needs_a_frame() {
        let capturer = FakeCapturer::new();
        let empty = StreamHandle::new(Facing::Front);
        assert_eq!(capturer.snapshot(&empty), Err(CaptureError::NoFrame));

        empty.publish_frame(sample_frame(Facing::Front));
        let image = capturer.snapshot(&empty).expect("snapshot");
        assert_eq!(image.width(), FAKE_FRAME_WIDTH);
        assert_eq!(capturer.calls(), 2);
    }

    #[tokio::test]
    async fn upload_client_numbers_receipts() {
        let client = FakeUploadClient::new();
        let image = CapturedImage::new(vec![1], 1, 1, JPEG_CONTENT_TYPE);
        assert_eq!(client.upload(&image).await.unwrap().id(), "tx1");
        client.set_receipt_id("tx123");
        assert_eq!(client.upload(&image).await.unwrap().id(), "tx123");
        assert_eq!(client.uploaded_digests().len(), 2);
    }

    #[tokio::test]
    async fn gallery_lists_configured_ids() {
        let gallery = FakeGallery::with_ids(["a", "b"]);
        gallery.push_id("c");
        let assets = gallery.list_uploads("owner").await.unwrap();
        let ids: Vec<_> = assets.iter().map(AssetRef::id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(gallery.queried_owners(), vec!["owner".to_string()]);
    }
}
