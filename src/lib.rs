// SPDX-License-Identifier: MPL-2.0
//! `snappy` is a camera capture client that stores photos on permanent
//! storage through a wallet bridge.
//!
//! The [`application::session::SessionController`] owns the camera lifecycle
//! and the capture, review and upload flow. Collaborators sit behind the
//! ports in [`application::port`]; [`infrastructure`] provides the FFmpeg,
//! JPEG, HTTP and GraphQL implementations and [`test_utils`] the in-memory
//! ones used by tests and `--simulate`.

#![doc(html_root_url = "https://docs.rs/snappy/0.1.0")]

pub mod app;
pub mod application;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod i18n;
pub mod infrastructure;
pub mod paths;
pub mod test_utils;
pub mod ui;
