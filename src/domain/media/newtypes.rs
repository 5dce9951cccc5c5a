// SPDX-License-Identifier: MPL-2.0
//! Capture newtypes.
//!
//! This module provides type-safe wrappers for capture parameters,
//! ensuring they are always within valid ranges.

use std::fmt;
use std::str::FromStr;

// =============================================================================
// JPEG Quality Bounds
// =============================================================================

/// JPEG quality bounds (1 to 100).
pub mod jpeg_quality_bounds {
    /// Minimum JPEG quality.
    pub const MIN: u8 = 1;
    /// Maximum JPEG quality.
    pub const MAX: u8 = 100;
    /// Default JPEG quality.
    pub const DEFAULT: u8 = 90;
}

// =============================================================================
// JpegQuality
// =============================================================================

/// JPEG encoder quality, guaranteed to be within 1–100.
///
/// # Example
///
/// ```
/// use snappy::domain::media::JpegQuality;
///
/// assert_eq!(JpegQuality::new(0).value(), 1);
/// assert_eq!(JpegQuality::new(250).value(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegQuality(u8);

impl JpegQuality {
    /// Creates a new quality value, clamping to the valid range.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.clamp(jpeg_quality_bounds::MIN, jpeg_quality_bounds::MAX))
    }

    /// Returns the raw quality value.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for JpegQuality {
    fn default() -> Self {
        Self(jpeg_quality_bounds::DEFAULT)
    }
}

// =============================================================================
// Parse errors
// =============================================================================

/// Error returned when a textual capture parameter cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDimensionsError {
    input: String,
}

impl fmt::Display for ParseDimensionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid dimensions: {:?}", self.input)
    }
}

impl std::error::Error for ParseDimensionsError {}

fn parse_pair(input: &str, separator: char) -> Result<(u32, u32), ParseDimensionsError> {
    let err = || ParseDimensionsError {
        input: input.to_string(),
    };
    let (left, right) = input.trim().split_once(separator).ok_or_else(err)?;
    let left: u32 = left.trim().parse().map_err(|_| err())?;
    let right: u32 = right.trim().parse().map_err(|_| err())?;
    if left == 0 || right == 0 {
        return Err(err());
    }
    Ok((left, right))
}

// =============================================================================
// AspectRatio
// =============================================================================

/// Requested frame aspect ratio, written as `"W:H"` (e.g. `"9:16"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    width: u32,
    height: u32,
}

impl AspectRatio {
    /// Portrait 9:16, the ratio requested from the camera by default.
    pub const PORTRAIT: Self = Self {
        width: 9,
        height: 16,
    };

    /// Creates a ratio; returns `None` if either side is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    /// Returns the ratio as a float (width / height).
    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Returns `true` if the ratio is taller than wide.
    #[must_use]
    pub fn is_portrait(self) -> bool {
        self.height > self.width
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::PORTRAIT
    }
}

impl FromStr for AspectRatio {
    type Err = ParseDimensionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = parse_pair(s, ':')?;
        Ok(Self { width, height })
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

// =============================================================================
// ResolutionHint
// =============================================================================

/// Preferred capture resolution, written as `"WxH"` (e.g. `"1280x720"`).
///
/// Device backends treat this as a hint; the delivered frames may differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionHint {
    width: u32,
    height: u32,
}

impl ResolutionHint {
    /// Creates a hint; returns `None` if either side is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    /// Returns the requested width in pixels.
    #[must_use]
    pub fn width(self) -> u32 {
        self.width
    }

    /// Returns the requested height in pixels.
    #[must_use]
    pub fn height(self) -> u32 {
        self.height
    }
}

impl FromStr for ResolutionHint {
    type Err = ParseDimensionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = parse_pair(&s.to_ascii_lowercase(), 'x')?;
        Ok(Self { width, height })
    }
}

impl fmt::Display for ResolutionHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// =============================================================================
// Tests
// =============================================================================
