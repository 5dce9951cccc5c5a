// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the application. Constants are organized by category.
//!
//! # Categories
//!
//! - **Camera**: Start-up behavior and still encoding
//! - **Upload**: Storage tags and request timeout
//! - **Gallery**: Search endpoint and display gateway

// ==========================================================================
// Camera Defaults
// ==========================================================================

/// Whether the camera is switched on at start-up.
pub const DEFAULT_START_ENABLED: bool = true;

// ==========================================================================
// Upload Defaults
// ==========================================================================

/// `App-Name` tag written on uploads.
pub const DEFAULT_APP_NAME: &str = "Snappy";

/// `App-Name` tag used by earlier releases. Still searched by the gallery.
pub const LEGACY_APP_NAME: &str = "SnappyCam";

/// `App-Version` tag written on uploads.
pub const DEFAULT_APP_VERSION: &str = "0.1.0";

/// Default network timeout for uploads and gallery queries (in seconds).
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Minimum network timeout (in seconds).
pub const MIN_UPLOAD_TIMEOUT_SECS: u64 = 5;

/// Maximum network timeout (in seconds).
pub const MAX_UPLOAD_TIMEOUT_SECS: u64 = 600;

// ==========================================================================
// Gallery Defaults
// ==========================================================================

/// GraphQL endpoint indexing storage transactions.
pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://arweave-search.goldsky.com/graphql";

/// Gateway serving stored images as `{gateway}/{id}`.
pub const DEFAULT_GATEWAY_URL: &str = "https://arweave.net";

/// App names searched by the gallery: current first, then legacy.
#[must_use]
pub fn default_gallery_app_names() -> Vec<String> {
    vec![DEFAULT_APP_NAME.to_string(), LEGACY_APP_NAME.to_string()]
}
