// SPDX-License-Identifier: MPL-2.0
//! Live frames and the ids of the streams that produce them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One decoded camera frame, tightly packed RGBA8.
///
/// Cloning shares the pixel buffer, so frames can be handed from the decode
/// thread to the capturer without copying.
///
/// ```
/// use snappy::domain::media::RawImage;
///
/// let frame = RawImage::from_rgba(2, 1, vec![0; 8]).unwrap();
/// assert_eq!((frame.width(), frame.height()), (2, 1));
/// assert!(RawImage::from_rgba(2, 1, vec![0; 7]).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl RawImage {
    /// `None` unless both sides are non-zero and `pixels` holds exactly
    /// `width * height` RGBA quadruplets.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = usize::try_from(u64::from(width) * u64::from(height) * 4).ok()?;
        (expected > 0 && pixels.len() == expected).then(|| Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA bytes, no stride padding.
    #[must_use]
    pub fn rgba_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

/// Identifies one successful stream acquisition.
///
/// Ids only grow, so a completion carrying an older id than the session's
/// current stream is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(u64);

impl StreamId {
    #[must_use]
    pub fn next() -> Self {
        static LAST: AtomicU64 = AtomicU64::new(0);
        Self(LAST.fetch_add(1, Ordering::Relaxed) + 1)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stream-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_size_must_match_buffer() {
        assert!(RawImage::from_rgba(3, 2, vec![0; 24]).is_some());
        assert!(RawImage::from_rgba(3, 2, vec![0; 23]).is_none());
        assert!(RawImage::from_rgba(0, 2, Vec::new()).is_none());
    }

    #[test]
    fn clones_share_pixels() {
        let frame = RawImage::from_rgba(1, 1, vec![9, 8, 7, 6]).unwrap();
        let copy = frame.clone();
        assert!(std::ptr::eq(frame.rgba_bytes(), copy.rgba_bytes()));
        assert_eq!(copy, frame);
    }

    #[test]
    fn stream_ids_grow_and_display() {
        let first = StreamId::next();
        let second = StreamId::next();
        assert!(second > first);
        assert_eq!(second.to_string(), format!("stream-{}", second.value()));
    }
}
