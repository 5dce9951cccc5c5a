// SPDX-License-Identifier: MPL-2.0
//! Gallery query port definition.
//!
//! This module defines the [`GalleryQuery`] trait used to list the images a
//! wallet has uploaded.

use std::fmt;
use std::future::Future;

/// Errors that can occur while listing uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryError {
    /// The search service could not be reached.
    Network(String),

    /// The search service answered with a non-success status.
    Status(u16),

    /// The response could not be decoded.
    InvalidResponse(String),
}

impl GalleryError {
    /// Returns the i18n message key for this error type.
    #[must_use]
    pub fn i18n_key(&self) -> &'static str {
        match self {
            GalleryError::Network(_) => "error-gallery-network",
            GalleryError::Status(_) | GalleryError::InvalidResponse(_) => "error-gallery-load",
        }
    }
}

impl fmt::Display for GalleryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GalleryError::Network(msg) => write!(f, "Gallery request failed: {msg}"),
            GalleryError::Status(code) => write!(f, "Gallery request failed with HTTP {code}"),
            GalleryError::InvalidResponse(msg) => write!(f, "Invalid gallery response: {msg}"),
        }
    }
}

impl std::error::Error for GalleryError {}

/// Reference to one uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRef {
    id: String,
}

impl AssetRef {
    /// Creates a reference from a transaction id.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Returns the transaction id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display URL of this asset on `gateway`.
    ///
    /// ```
    /// use snappy::application::port::AssetRef;
    ///
    /// let asset = AssetRef::new("abc");
    /// assert_eq!(asset.url("https://arweave.net/"), "https://arweave.net/abc");
    /// ```
    #[must_use]
    pub fn url(&self, gateway: &str) -> String {
        format!("{}/{}", gateway.trim_end_matches('/'), self.id)
    }
}

/// Port for the upload search service.
pub trait GalleryQuery: Send + Sync + 'static {
    /// Lists the uploads made by `owner`, newest first when the service sorts.
    ///
    /// # Errors
    ///
    /// Returns a [`GalleryError`] if the request or decoding fails.
    fn list_uploads(
        &self,
        owner: &str,
    ) -> impl Future<Output = Result<Vec<AssetRef>, GalleryError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_url_joins_gateway_and_id() {
        let asset = AssetRef::new("tx123");
        assert_eq!(asset.url("https://arweave.net"), "https://arweave.net/tx123");
        assert_eq!(asset.url("https://arweave.net//"), "https://arweave.net/tx123");
    }

    #[test]
    fn gallery_error_keys() {
        assert_eq!(
            GalleryError::Network("dns".into()).i18n_key(),
            "error-gallery-network"
        );
        assert_eq!(GalleryError::Status(500).i18n_key(), "error-gallery-load");
    }
}
