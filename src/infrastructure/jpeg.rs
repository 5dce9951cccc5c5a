// SPDX-License-Identifier: MPL-2.0
//! JPEG still capture implementing the [`FrameCapturer`] port trait.
//!
//! [`FrameCapturer`]: crate::application::port::FrameCapturer

use image_rs::codecs::jpeg::JpegEncoder;
use image_rs::{DynamicImage, ImageBuffer, Rgba};

use crate::application::port::{
    CaptureError, CapturedImage, FrameCapturer, StreamHandle, JPEG_CONTENT_TYPE,
};
use crate::domain::media::{JpegQuality, RawImage};

/// Freezes the latest live frame into a JPEG at its native resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegFrameCapturer {
    quality: JpegQuality,
}

impl JpegFrameCapturer {
    /// Creates a capturer encoding at `quality`.
    #[must_use]
    pub fn new(quality: JpegQuality) -> Self {
        Self { quality }
    }

    /// Returns the encoding quality.
    #[must_use]
    pub fn quality(&self) -> JpegQuality {
        self.quality
    }

    /// Encodes one RGBA frame. Alpha is dropped since JPEG has none.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Encode`] if the encoder fails.
    pub fn encode(&self, frame: &RawImage) -> Result<CapturedImage, CaptureError> {
        let rgba: ImageBuffer<Rgba<u8>, _> =
            ImageBuffer::from_raw(frame.width(), frame.height(), frame.rgba_bytes().to_vec())
                .ok_or_else(|| {
                    CaptureError::Encode("frame buffer does not match its size".to_string())
                })?;
        let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();

        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, self.quality.value())
            .encode_image(&rgb)
            .map_err(|e| CaptureError::Encode(e.to_string()))?;

        Ok(CapturedImage::new(
            bytes,
            frame.width(),
            frame.height(),
            JPEG_CONTENT_TYPE,
        ))
    }
}

impl FrameCapturer for JpegFrameCapturer {
    fn snapshot(&self, stream: &StreamHandle) -> Result<CapturedImage, CaptureError> {
        let frame = stream.latest_frame().ok_or(CaptureError::NoFrame)?;
        self.encode(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::Facing;
    use crate::test_utils::{sample_frame, FAKE_FRAME_HEIGHT, FAKE_FRAME_WIDTH};

    #[test]
    fn snapshot_encodes_native_resolution_jpeg() {
        let stream = StreamHandle::new(Facing::Back);
        stream.publish_frame(sample_frame(Facing::Back));

        let image = JpegFrameCapturer::default()
            .snapshot(&stream)
            .expect("snapshot");

        assert_eq!(image.width(), FAKE_FRAME_WIDTH);
        assert_eq!(image.height(), FAKE_FRAME_HEIGHT);
        assert_eq!(image.content_type(), "image/jpeg");
        // SOI marker
        assert_eq!(&image.bytes()[..2], &[0xFF, 0xD8]);

        let decoded = image_rs::load_from_memory(image.bytes()).expect("decode");
        assert_eq!(decoded.width(), FAKE_FRAME_WIDTH);
        assert_eq!(decoded.height(), FAKE_FRAME_HEIGHT);
    }

    #[test]
    fn snapshot_without_frame_fails() {
        let stream = StreamHandle::new(Facing::Front);
        let result = JpegFrameCapturer::default().snapshot(&stream);
        assert_eq!(result.unwrap_err(), CaptureError::NoFrame);
    }

    #[test]
    fn lower_quality_produces_smaller_file() {
        let frame = sample_frame(Facing::Front);
        let high = JpegFrameCapturer::new(JpegQuality::new(100))
            .encode(&frame)
            .expect("encode");
        let low = JpegFrameCapturer::new(JpegQuality::new(10))
            .encode(&frame)
            .expect("encode");
        assert!(low.len() <= high.len());
    }

    #[test]
    fn same_frame_same_digest() {
        let frame = sample_frame(Facing::Back);
        let capturer = JpegFrameCapturer::default();
        let first = capturer.encode(&frame).expect("encode");
        let second = capturer.encode(&frame).expect("encode");
        assert_eq!(first.digest(), second.digest());
    }
}
