// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! This module defines abstract interfaces that infrastructure adapters implement.
//! These traits use only domain and port types, so the session controller can
//! run against real devices and services or against in-memory fakes.
//!
//! # Available Ports
//!
//! - [`camera`]: Device media source (acquire/release a live stream)
//! - [`capture`]: Frame capturer (freeze the live frame into a still)
//! - [`upload`]: Upload client (store a still, return a receipt)
//! - [`gallery`]: Gallery query (list previous uploads)
//!
//! # Design Notes
//!
//! - Async methods return `impl Future + Send` so controllers can be driven
//!   from spawned Tokio tasks
//! - Traits are `Send + Sync + 'static` and are used as generic parameters
//! - Methods return `Result` with port-specific error types

pub mod camera;
pub mod capture;
pub mod gallery;
pub mod upload;

pub use camera::{AcquisitionError, CaptureConstraints, MediaSource, StreamHandle};
pub use capture::{CaptureError, CapturedImage, FrameCapturer, JPEG_CONTENT_TYPE};
pub use gallery::{AssetRef, GalleryError, GalleryQuery};
pub use upload::{Receipt, UploadClient, UploadError};
