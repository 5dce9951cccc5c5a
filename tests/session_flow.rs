// SPDX-License-Identifier: MPL-2.0
//! End-to-end capture flow through the public API, with the real JPEG
//! encoder and in-memory camera, storage and gallery.

use snappy::application::port::UploadError;
use snappy::application::query::{GalleryBrowser, GalleryStatus};
use snappy::application::session::{SessionController, SessionEvent, SessionOptions};
use snappy::config::Config;
use snappy::diagnostics::{DiagnosticEventKind, DiagnosticsCollector};
use snappy::domain::diagnostics::BufferCapacity;
use snappy::domain::session::{ErrorKind, Facing, SessionPhase, View};
use snappy::infrastructure::JpegFrameCapturer;
use snappy::test_utils::{
    FakeGallery, FakeMediaSource, FakeUploadClient, FAKE_FRAME_HEIGHT, FAKE_FRAME_WIDTH,
};
use tokio::sync::broadcast::Receiver;

type Session = SessionController<FakeMediaSource, JpegFrameCapturer, FakeUploadClient>;

fn session(media: &FakeMediaSource, uploader: &FakeUploadClient) -> Session {
    SessionController::new(media.clone(), JpegFrameCapturer::default(), uploader.clone())
}

fn drain(rx: &mut Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn photo_is_captured_uploaded_and_listed() {
    let media = FakeMediaSource::new();
    let uploader = FakeUploadClient::new();
    uploader.set_receipt_id("tx-first");
    let session = session(&media, &uploader);
    let mut events = session.subscribe();

    assert!(session.enable_camera().await);
    assert!(session.capture().await);

    let image = session.captured_image().expect("photo under review");
    assert_eq!(image.width(), FAKE_FRAME_WIDTH);
    assert_eq!(image.height(), FAKE_FRAME_HEIGHT);
    assert_eq!(&image.bytes()[..2], &[0xFF, 0xD8]);

    assert!(session.begin_upload().await);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase(), SessionPhase::Live);
    assert_eq!(snapshot.last_receipt.map(|r| r.id().to_string()), Some("tx-first".into()));
    assert_eq!(uploader.uploaded_digests(), [image.digest().to_string()]);

    let events = drain(&mut events);
    assert!(events.contains(&SessionEvent::CameraEnabled));
    assert!(events.contains(&SessionEvent::UploadStarted));
    assert!(events
        .iter()
        .any(|e| matches!(e, SessionEvent::UploadSucceeded(r) if r.id() == "tx-first")));

    // The gallery shows the id once the index has caught up.
    let gallery = FakeGallery::default();
    gallery.push_id("tx-first");
    assert!(session.open_gallery().await);
    assert_eq!(session.snapshot().view, View::Gallery);
    assert_eq!(media.open_streams(), 0);

    let mut browser = GalleryBrowser::new("https://arweave.net");
    browser.load(&gallery, "wallet").await;
    match browser.status() {
        GalleryStatus::Loaded(items) => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].url, "https://arweave.net/tx-first");
        }
        other => panic!("unexpected gallery status: {other:?}"),
    }

    assert!(session.close_gallery().await);
    assert_eq!(session.snapshot().phase(), SessionPhase::Live);
    assert_eq!(media.open_streams(), 1);

    assert!(session.shutdown().await);
    assert_eq!(media.open_streams(), 0);
}

#[tokio::test]
async fn failed_upload_keeps_photo_for_retry() {
    let media = FakeMediaSource::new();
    let uploader = FakeUploadClient::new();
    let session = session(&media, &uploader);

    session.enable_camera().await;
    session.capture().await;
    let digest = session.captured_image().map(|image| image.digest().to_string());

    uploader.set_failure(Some(UploadError::Network("connection reset".into())));
    assert!(session.begin_upload().await);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase(), SessionPhase::Reviewing);
    assert_eq!(snapshot.error.as_ref().map(|e| e.kind()), Some(ErrorKind::Upload));

    uploader.set_failure(None);
    uploader.set_receipt_id("tx-retry");
    assert!(session.begin_upload().await);

    let snapshot = session.snapshot();
    assert!(snapshot.error.is_none());
    assert!(snapshot.captured.is_none());
    assert_eq!(uploader.uploaded_digests().last().cloned(), digest);
}

#[tokio::test]
async fn switching_while_live_reopens_the_other_camera() {
    let media = FakeMediaSource::new();
    let session = session(&media, &FakeUploadClient::new());

    session.enable_camera().await;
    assert!(session.switch_facing().await);

    assert_eq!(session.snapshot().facing, Facing::Front);
    assert_eq!(media.requested_facings(), [Facing::Back, Facing::Front]);
    assert_eq!(media.open_streams(), 1);
    assert!(media.max_open_streams() <= 1);
}

#[tokio::test]
async fn diagnostics_record_the_flow() {
    let config = Config::default();
    let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
    let session = SessionController::with_options(
        FakeMediaSource::new(),
        JpegFrameCapturer::new(config.jpeg_quality()),
        FakeUploadClient::new(),
        SessionOptions {
            constraints: config.capture_constraints(),
            diagnostics: Some(collector.handle()),
        },
    );

    session.enable_camera().await;
    session.capture().await;
    session.shutdown().await;
    collector.process_pending();

    assert!(collector
        .iter()
        .any(|event| matches!(event.kind, DiagnosticEventKind::UserAction { .. })));
    assert!(collector
        .iter()
        .any(|event| matches!(event.kind, DiagnosticEventKind::Operation { .. })));
}
