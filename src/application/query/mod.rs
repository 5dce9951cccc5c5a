// SPDX-License-Identifier: MPL-2.0
//! Query services (read side).
//!
//! These services never touch the capture session; they only read data
//! produced by earlier uploads.
//!
//! - [`gallery`]: Browsing previously uploaded images (`GalleryBrowser`)

pub mod gallery;

pub use gallery::{GalleryBrowser, GalleryItem, GalleryStatus, INDEXING_DELAY_NOTE_KEY};
