// SPDX-License-Identifier: MPL-2.0
//! Frame capture port definition.
//!
//! This module defines the [`FrameCapturer`] trait that freezes the current
//! live frame into an encoded still, and the [`CapturedImage`] it produces.

use super::camera::StreamHandle;
use crate::domain::session::{ErrorInfo, ErrorKind};
use std::fmt;
use std::sync::Arc;

/// MIME type of the stills produced by the default capturer.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

// =============================================================================
// CaptureError
// =============================================================================

/// Errors that can occur while freezing a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The stream has not delivered a frame yet (or was already released).
    NoFrame,

    /// The frame could not be encoded.
    Encode(String),
}

impl CaptureError {
    /// Returns the i18n message key for this error type.
    #[must_use]
    pub fn i18n_key(&self) -> &'static str {
        match self {
            CaptureError::NoFrame => "error-capture-no-frame",
            CaptureError::Encode(_) => "error-capture-encode",
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NoFrame => write!(f, "The camera has not delivered a frame yet"),
            CaptureError::Encode(msg) => write!(f, "Failed to encode image: {msg}"),
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<&CaptureError> for ErrorInfo {
    fn from(err: &CaptureError) -> Self {
        ErrorInfo::new(ErrorKind::Capture, err.to_string(), err.i18n_key())
    }
}

// =============================================================================
// CapturedImage
// =============================================================================

/// An encoded still image pending user confirmation.
///
/// Never mutated after creation; cloning shares the underlying bytes.
/// Identity is the BLAKE3 digest of the encoded bytes.
#[derive(Clone)]
pub struct CapturedImage {
    bytes: Arc<Vec<u8>>,
    width: u32,
    height: u32,
    content_type: &'static str,
    digest: String,
}

impl CapturedImage {
    /// Wraps encoded image bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>, width: u32, height: u32, content_type: &'static str) -> Self {
        let digest = blake3::hash(&bytes).to_hex().to_string();
        Self {
            bytes: Arc::new(bytes),
            width,
            height,
            content_type,
            digest,
        }
    }

    /// Returns the encoded bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the encoded size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the encoded payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the pixel width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the pixel height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the MIME type of the encoded bytes.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Returns the hex BLAKE3 digest of the encoded bytes.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Returns a short digest prefix for logs and status lines.
    #[must_use]
    pub fn short_digest(&self) -> &str {
        &self.digest[..12]
    }
}

impl PartialEq for CapturedImage {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

impl Eq for CapturedImage {}

impl fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedImage")
            .field("len", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("content_type", &self.content_type)
            .field("digest", &self.short_digest())
            .finish()
    }
}

// =============================================================================
// FrameCapturer Trait
// =============================================================================

/// Port for freezing the current live frame.
///
/// Synchronous: the still is taken from the frame already buffered in the
/// stream handle, without waiting on the device.
pub trait FrameCapturer: Send + Sync + 'static {
    /// Encodes the latest frame of `stream` at its native resolution.
    ///
    /// # Errors
    ///
    /// Returns a [`CaptureError`] if no frame is available or encoding fails.
    fn snapshot(&self, stream: &StreamHandle) -> Result<CapturedImage, CaptureError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captured_image_identity_is_content_based() {
        let a = CapturedImage::new(vec![1, 2, 3], 1, 1, JPEG_CONTENT_TYPE);
        let b = CapturedImage::new(vec![1, 2, 3], 1, 1, JPEG_CONTENT_TYPE);
        let c = CapturedImage::new(vec![3, 2, 1], 1, 1, JPEG_CONTENT_TYPE);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn captured_image_digest_is_blake3_hex() {
        let image = CapturedImage::new(b"snap".to_vec(), 4, 3, JPEG_CONTENT_TYPE);
        assert_eq!(image.digest(), blake3::hash(b"snap").to_hex().as_str());
        assert_eq!(image.short_digest().len(), 12);
        assert_eq!(image.len(), 4);
        assert!(!image.is_empty());
    }

    #[test]
    fn clones_share_bytes() {
        let image = CapturedImage::new(vec![9; 1024], 32, 8, JPEG_CONTENT_TYPE);
        let clone = image.clone();
        assert_eq!(image.bytes().as_ptr(), clone.bytes().as_ptr());
    }

    #[test]
    fn capture_error_display_and_keys() {
        assert_eq!(CaptureError::NoFrame.i18n_key(), "error-capture-no-frame");
        assert!(CaptureError::Encode("bad".into()).to_string().contains("bad"));
    }
}
