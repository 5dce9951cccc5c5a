// SPDX-License-Identifier: MPL-2.0
//! `FFmpeg` adapter implementing the [`MediaSource`] port trait.
//!
//! [`FfmpegCameraSource`] opens a capture device through libavdevice
//! (`v4l2` on Linux, `avfoundation` on macOS, `dshow` on Windows) and keeps
//! the latest decoded frame, converted to RGBA, in the [`StreamHandle`].
//!
//! # Design Notes
//!
//! - `FFmpeg` contexts are not `Send`, so each stream lives entirely on one
//!   blocking thread; only the open result crosses back through a oneshot
//! - The thread exits once the handle is stopped; `release` waits for it so
//!   the device is closed before the next acquisition
//!
//! [`MediaSource`]: crate::application::port::MediaSource

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::application::port::{AcquisitionError, CaptureConstraints, MediaSource, StreamHandle};
use crate::domain::media::{RawImage, ResolutionHint, StreamId};
use crate::domain::session::Facing;

/// Outcome of the one-time `FFmpeg` setup, shared by every later call.
static FFMPEG_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Initializes `FFmpeg` and its device layer once per process.
///
/// # Errors
///
/// Returns the `FFmpeg` error message if initialization fails. The failure is
/// remembered and returned again on every later call.
pub fn init_ffmpeg() -> Result<(), String> {
    init_once(&FFMPEG_INIT, || {
        ffmpeg_next::init().map_err(|e| format!("FFmpeg initialization failed: {e}"))?;
        ffmpeg_next::device::register_all();

        // SAFETY: av_log_set_level is thread-safe and only affects logging
        unsafe {
            ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_ERROR);
        }
        Ok(())
    })
}

fn init_once(
    cell: &OnceLock<Result<(), String>>,
    init: impl FnOnce() -> Result<(), String>,
) -> Result<(), String> {
    cell.get_or_init(init).clone()
}

/// Returns the capture input format of the current platform.
#[must_use]
pub fn default_input_format() -> &'static str {
    if cfg!(target_os = "macos") {
        "avfoundation"
    } else if cfg!(target_os = "windows") {
        "dshow"
    } else {
        "v4l2"
    }
}

/// Returns the device names used for each facing on the current platform.
///
/// On laptops the built-in camera is the only one, so both point to it
/// unless configured otherwise.
#[must_use]
pub fn default_devices() -> (&'static str, &'static str) {
    if cfg!(target_os = "macos") {
        ("0", "0")
    } else if cfg!(target_os = "windows") {
        ("video=Integrated Camera", "video=Integrated Camera")
    } else {
        ("/dev/video0", "/dev/video0")
    }
}

/// Device selection for [`FfmpegCameraSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevices {
    /// libavdevice input format name.
    pub input_format: String,
    /// Device opened for [`Facing::Front`].
    pub front: String,
    /// Device opened for [`Facing::Back`].
    pub back: String,
}

impl CameraDevices {
    /// Returns the device name for `facing`.
    #[must_use]
    pub fn device_for(&self, facing: Facing) -> &str {
        match facing {
            Facing::Front => &self.front,
            Facing::Back => &self.back,
        }
    }
}

impl Default for CameraDevices {
    fn default() -> Self {
        let (front, back) = default_devices();
        Self {
            input_format: default_input_format().to_string(),
            front: front.to_string(),
            back: back.to_string(),
        }
    }
}

/// Camera source backed by libavdevice.
pub struct FfmpegCameraSource {
    devices: CameraDevices,
    workers: Arc<Mutex<HashMap<StreamId, JoinHandle<()>>>>,
}

impl FfmpegCameraSource {
    /// Creates a source opening the given devices.
    #[must_use]
    pub fn new(devices: CameraDevices) -> Self {
        Self {
            devices,
            workers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the configured devices.
    #[must_use]
    pub fn devices(&self) -> &CameraDevices {
        &self.devices
    }
}

impl Default for FfmpegCameraSource {
    fn default() -> Self {
        Self::new(CameraDevices::default())
    }
}

impl MediaSource for FfmpegCameraSource {
    fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> impl Future<Output = Result<StreamHandle, AcquisitionError>> + Send {
        let input_format = self.devices.input_format.clone();
        let device = self.devices.device_for(constraints.facing).to_string();
        let resolution = constraints.resolution;
        let handle = StreamHandle::new(constraints.facing);
        let workers = Arc::clone(&self.workers);

        async move {
            let (opened_tx, opened_rx) = oneshot::channel();
            let worker_handle = handle.clone();
            let worker = tokio::task::spawn_blocking(move || {
                capture_loop(&input_format, &device, resolution, &worker_handle, opened_tx);
            });

            match opened_rx.await {
                Ok(Ok(())) => {
                    workers
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(handle.id(), worker);
                    Ok(handle)
                }
                Ok(Err(err)) => Err(err),
                Err(_) => Err(AcquisitionError::Other(
                    "capture thread exited before opening the device".to_string(),
                )),
            }
        }
    }

    fn release(&self, stream: &StreamHandle) -> impl Future<Output = ()> + Send {
        stream.stop();
        let worker = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&stream.id());

        async move {
            if let Some(worker) = worker {
                if let Err(e) = worker.await {
                    eprintln!("Camera capture thread failed: {e}");
                }
            }
        }
    }
}

/// Opens the device and publishes frames until the handle is stopped.
///
/// The open outcome is reported through `opened` exactly once.
fn capture_loop(
    input_format: &str,
    device: &str,
    resolution: Option<ResolutionHint>,
    handle: &StreamHandle,
    opened: oneshot::Sender<Result<(), AcquisitionError>>,
) {
    let mut session = match DeviceSession::open(input_format, device, resolution) {
        Ok(session) => session,
        Err(err) => {
            let _ = opened.send(Err(err));
            return;
        }
    };

    if opened.send(Ok(())).is_err() {
        // The acquiring task is gone; nobody will ever release this stream.
        handle.stop();
        return;
    }

    pump_frames(handle, || session.next_frame());
}

/// Publishes decoded frames until the handle is stopped.
///
/// A decode failure ends the stream: the handle is stopped so its last frame
/// can no longer be captured.
fn pump_frames(
    handle: &StreamHandle,
    mut next_frame: impl FnMut() -> Result<Option<RawImage>, String>,
) {
    while !handle.is_stopped() {
        match next_frame() {
            Ok(Some(frame)) => handle.publish_frame(frame),
            Ok(None) => {}
            Err(message) => {
                eprintln!("Camera stream {} stopped: {message}", handle.id());
                handle.stop();
                break;
            }
        }
    }
}

/// Open capture device with its decoder and RGBA scaler.
struct DeviceSession {
    input: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
}

impl DeviceSession {
    fn open(
        input_format: &str,
        device: &str,
        resolution: Option<ResolutionHint>,
    ) -> Result<Self, AcquisitionError> {
        init_ffmpeg().map_err(AcquisitionError::Other)?;

        let format = ffmpeg_next::device::input::video()
            .find(|format| format.name() == input_format)
            .ok_or_else(|| {
                AcquisitionError::Other(format!("capture input format {input_format} unavailable"))
            })?;

        let mut options = ffmpeg_next::Dictionary::new();
        if let Some(resolution) = resolution {
            options.set("video_size", &resolution.to_string());
        }

        let format = ffmpeg_next::format::format::Format::Input(format);
        let context = ffmpeg_next::format::open_with(&device, &format, options)
            .map_err(|e| AcquisitionError::from_message(&e.to_string()))?;
        if !context.is_input() {
            return Err(AcquisitionError::Other(format!("{device} is not an input")));
        }
        let input = context.input();

        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or(AcquisitionError::DeviceNotFound)?;
        let stream_index = stream.index();

        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|e| AcquisitionError::Other(format!("Failed to create decoder: {e}")))?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg_next::format::Pixel::RGBA,
            decoder.width(),
            decoder.height(),
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| AcquisitionError::Other(format!("Failed to create scaler: {e}")))?;

        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
        })
    }

    /// Reads one packet and returns the frame it completed, if any.
    fn next_frame(&mut self) -> Result<Option<RawImage>, String> {
        let packet = self
            .input
            .packets()
            .find(|(stream, _)| stream.index() == self.stream_index);
        let Some((_, packet)) = packet else {
            return Err("device closed the stream".to_string());
        };

        self.decoder
            .send_packet(&packet)
            .map_err(|e| format!("Packet send failed: {e}"))?;

        let mut decoded = ffmpeg_next::frame::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }

        let mut rgba = ffmpeg_next::frame::Video::empty();
        self.scaler
            .run(&decoded, &mut rgba)
            .map_err(|e| format!("Scaling failed: {e}"))?;

        Ok(RawImage::from_rgba(
            rgba.width(),
            rgba.height(),
            extract_rgba_data(&rgba),
        ))
    }
}

/// Copies RGBA rows out of a frame, dropping the stride padding.
fn extract_rgba_data(frame: &ffmpeg_next::frame::Video) -> Vec<u8> {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let stride = frame.stride(0);
    let data = frame.data(0);

    let mut rgba_bytes = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        let row_start = y * stride;
        rgba_bytes.extend_from_slice(&data[row_start..row_start + width * 4]);
    }
    rgba_bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::{CaptureError, FrameCapturer};
    use crate::infrastructure::JpegFrameCapturer;
    use crate::test_utils::sample_frame;

    #[test]
    fn init_failure_is_remembered() {
        let cell = OnceLock::new();
        let first = init_once(&cell, || Err("no libavdevice".to_string()));
        let second = init_once(&cell, || Ok(()));

        assert_eq!(first, Err("no libavdevice".to_string()));
        assert_eq!(second, first);
    }

    #[test]
    fn init_success_runs_once() {
        let cell = OnceLock::new();
        let mut runs = 0;
        assert_eq!(
            init_once(&cell, || {
                runs += 1;
                Ok(())
            }),
            Ok(())
        );
        assert_eq!(init_once(&cell, || Err("again".to_string())), Ok(()));
        assert_eq!(runs, 1);
    }

    #[test]
    fn decode_failure_stops_the_stream() {
        let handle = StreamHandle::new(Facing::Back);
        let mut frames = vec![
            Err("Decoding failed: device unplugged".to_string()),
            Ok(None),
            Ok(Some(sample_frame(Facing::Back))),
        ];

        pump_frames(&handle, || frames.pop().unwrap_or(Ok(None)));

        assert!(handle.is_stopped());
        assert!(frames.is_empty());
        assert_eq!(
            JpegFrameCapturer::default().snapshot(&handle).unwrap_err(),
            CaptureError::NoFrame
        );
    }

    #[test]
    fn released_stream_stops_pumping() {
        let handle = StreamHandle::new(Facing::Front);
        let mut delivered = 0;

        pump_frames(&handle, || {
            delivered += 1;
            if delivered == 3 {
                handle.stop();
            }
            Ok(Some(sample_frame(Facing::Front)))
        });

        assert_eq!(delivered, 3);
        assert!(handle.latest_frame().is_none());
    }

    #[test]
    fn devices_map_facing() {
        let devices = CameraDevices {
            input_format: "v4l2".into(),
            front: "/dev/video1".into(),
            back: "/dev/video0".into(),
        };
        assert_eq!(devices.device_for(Facing::Front), "/dev/video1");
        assert_eq!(devices.device_for(Facing::Back), "/dev/video0");
    }

    #[test]
    fn default_devices_match_platform_format() {
        let devices = CameraDevices::default();
        assert_eq!(devices.input_format, default_input_format());
        assert!(!devices.front.is_empty());
        assert!(!devices.back.is_empty());
    }

    #[tokio::test]
    async fn missing_device_is_not_found() {
        let source = FfmpegCameraSource::new(CameraDevices {
            input_format: default_input_format().to_string(),
            front: "/nonexistent/snappy-camera".into(),
            back: "/nonexistent/snappy-camera".into(),
        });

        let result = source.acquire(&CaptureConstraints::default()).await;

        assert!(result.is_err());
        assert!(source
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty());
    }

    #[tokio::test]
    async fn release_of_unknown_stream_is_tolerated() {
        let source = FfmpegCameraSource::default();
        let stream = StreamHandle::new(Facing::Back);
        source.release(&stream).await;
        source.release(&stream).await;
        assert!(stream.is_stopped());
    }
}
