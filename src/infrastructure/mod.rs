// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! This module contains concrete implementations of the port traits defined in
//! `application::port`. These adapters wrap external dependencies like `FFmpeg`,
//! the JPEG encoder and HTTP services.
//!
//! # Available Adapters
//!
//! - [`ffmpeg`]: Device camera via libavdevice (implements [`MediaSource`])
//! - [`jpeg`]: Still capture (implements [`FrameCapturer`])
//! - [`upload`]: Wallet bridge upload (implements [`UploadClient`])
//! - [`graphql`]: Transaction search (implements [`GalleryQuery`])
//!
//! [`MediaSource`]: crate::application::port::MediaSource
//! [`FrameCapturer`]: crate::application::port::FrameCapturer
//! [`UploadClient`]: crate::application::port::UploadClient
//! [`GalleryQuery`]: crate::application::port::GalleryQuery

pub mod ffmpeg;
pub mod graphql;
pub mod jpeg;
pub mod upload;

pub use ffmpeg::{CameraDevices, FfmpegCameraSource};
pub use graphql::{GallerySettings, GraphqlGalleryClient};
pub use jpeg::JpegFrameCapturer;
pub use upload::{HttpUploadClient, UploadSettings};
