// SPDX-License-Identifier: MPL-2.0
//! Upload port definition.
//!
//! This module defines the [`UploadClient`] trait that hands a captured
//! image to the storage network, and the [`Receipt`] it returns.
//! Signing and chunking belong to the implementation, not to this port.

use super::capture::CapturedImage;
use crate::domain::session::{ErrorInfo, ErrorKind};
use std::fmt;
use std::future::Future;

// =============================================================================
// UploadError
// =============================================================================

/// Errors that can occur during an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// No upload endpoint is configured.
    NotConfigured,

    /// The request could not be delivered.
    Network(String),

    /// The endpoint answered with a non-success status.
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Reason reported by the endpoint.
        reason: String,
    },

    /// The endpoint answered, but not with a receipt.
    InvalidResponse(String),
}

impl UploadError {
    /// Returns the i18n message key for this error type.
    #[must_use]
    pub fn i18n_key(&self) -> &'static str {
        match self {
            UploadError::NotConfigured => "error-upload-not-configured",
            UploadError::Network(_) => "error-upload-network",
            UploadError::Rejected { .. } => "error-upload-rejected",
            UploadError::InvalidResponse(_) => "error-upload-invalid-response",
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::NotConfigured => write!(f, "No upload endpoint is configured"),
            UploadError::Network(msg) => write!(f, "Upload failed: {msg}"),
            UploadError::Rejected { status, reason } => {
                write!(f, "Upload rejected (HTTP {status}): {reason}")
            }
            UploadError::InvalidResponse(msg) => write!(f, "Unexpected upload response: {msg}"),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<&UploadError> for ErrorInfo {
    fn from(err: &UploadError) -> Self {
        ErrorInfo::new(ErrorKind::Upload, err.to_string(), err.i18n_key())
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// Opaque identifier confirming durable storage of an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Receipt {
    id: String,
}

impl Receipt {
    /// Creates a receipt from the transaction id returned by the network.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Returns the transaction id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

// =============================================================================
// UploadClient Trait
// =============================================================================

/// Port for durable image storage.
pub trait UploadClient: Send + Sync + 'static {
    /// Uploads the encoded image and returns its receipt.
    ///
    /// # Errors
    ///
    /// Returns an [`UploadError`]; the caller keeps the image so the same
    /// bytes can be uploaded again.
    fn upload(
        &self,
        image: &CapturedImage,
    ) -> impl Future<Output = Result<Receipt, UploadError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_error_display() {
        let err = UploadError::Rejected {
            status: 402,
            reason: "insufficient balance".into(),
        };
        assert_eq!(
            err.to_string(),
            "Upload rejected (HTTP 402): insufficient balance"
        );
        assert!(UploadError::Network("timeout".into())
            .to_string()
            .contains("timeout"));
    }

    #[test]
    fn upload_error_i18n_keys() {
        assert_eq!(
            UploadError::NotConfigured.i18n_key(),
            "error-upload-not-configured"
        );
        assert_eq!(
            UploadError::InvalidResponse(String::new()).i18n_key(),
            "error-upload-invalid-response"
        );
    }

    #[test]
    fn receipt_displays_id() {
        let receipt = Receipt::new("tx123");
        assert_eq!(receipt.id(), "tx123");
        assert_eq!(receipt.to_string(), "tx123");
    }
}
