// SPDX-License-Identifier: MPL-2.0
//! Frames, stream ids and the capture settings that shape them.

mod frame;
mod newtypes;

pub use frame::{RawImage, StreamId};
pub use newtypes::{
    jpeg_quality_bounds, AspectRatio, JpegQuality, ParseDimensionsError, ResolutionHint,
};
