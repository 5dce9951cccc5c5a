// SPDX-License-Identifier: MPL-2.0
//! HTTP adapter implementing the [`UploadClient`] port trait.
//!
//! The image is posted to a wallet bridge: a local or remote service that
//! owns the wallet keys, signs the storage transaction and posts it. Storage
//! tags travel as `X-Tag-<Name>` headers; the bridge answers with the
//! transaction id as `{"id": "..."}`.
//!
//! [`UploadClient`]: crate::application::port::UploadClient

use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;

use crate::application::port::{CapturedImage, Receipt, UploadClient, UploadError};

/// Longest rejection body kept in an error message.
const MAX_REASON_LEN: usize = 200;

/// Settings of [`HttpUploadClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    /// Bridge URL. `None` disables uploading.
    pub endpoint: Option<String>,
    /// Value of the `App-Name` tag.
    pub app_name: String,
    /// Value of the `App-Version` tag.
    pub app_version: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            app_name: crate::config::DEFAULT_APP_NAME.to_string(),
            app_version: crate::config::DEFAULT_APP_VERSION.to_string(),
            timeout: Duration::from_secs(crate::config::DEFAULT_UPLOAD_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    id: String,
}

/// Parses the bridge's JSON answer into a receipt.
///
/// # Errors
///
/// Returns [`UploadError::InvalidResponse`] if the body is not
/// `{"id": "<non-empty>"}`.
pub fn parse_receipt(body: &[u8]) -> Result<Receipt, UploadError> {
    let response: BridgeResponse =
        serde_json::from_slice(body).map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
    let id = response.id.trim();
    if id.is_empty() {
        return Err(UploadError::InvalidResponse("empty transaction id".to_string()));
    }
    Ok(Receipt::new(id))
}

/// Upload client posting JPEG bytes to a wallet bridge.
#[derive(Debug, Clone)]
pub struct HttpUploadClient {
    client: reqwest::Client,
    settings: UploadSettings,
}

impl HttpUploadClient {
    /// Creates a client for `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Network`] if the HTTP client cannot be built
    /// (e.g. no TLS backend).
    pub fn new(settings: UploadSettings) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("Snappy/{}", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(|e| UploadError::Network(e.to_string()))?;
        Ok(Self { client, settings })
    }

    /// Returns the settings.
    #[must_use]
    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }
}

impl UploadClient for HttpUploadClient {
    fn upload(
        &self,
        image: &CapturedImage,
    ) -> impl Future<Output = Result<Receipt, UploadError>> + Send {
        let client = self.client.clone();
        let settings = self.settings.clone();
        let body = image.bytes().to_vec();
        let content_type = image.content_type();

        async move {
            let endpoint = settings
                .endpoint
                .as_deref()
                .map(str::trim)
                .filter(|endpoint| !endpoint.is_empty())
                .ok_or(UploadError::NotConfigured)?;

            let response = client
                .post(endpoint)
                .header(CONTENT_TYPE, content_type)
                .header(ACCEPT, "application/json")
                .header("X-Tag-Content-Type", content_type)
                .header("X-Tag-App-Name", &settings.app_name)
                .header("X-Tag-App-Version", &settings.app_version)
                .body(body)
                .send()
                .await
                .map_err(|e| UploadError::Network(e.to_string()))?;

            let status = response.status();
            let payload = response
                .bytes()
                .await
                .map_err(|e| UploadError::Network(e.to_string()))?;

            if !status.is_success() {
                let mut reason = String::from_utf8_lossy(&payload).trim().to_string();
                if reason.is_empty() {
                    reason = status.canonical_reason().unwrap_or("unknown").to_string();
                }
                reason.truncate(
                    reason
                        .char_indices()
                        .nth(MAX_REASON_LEN)
                        .map_or(reason.len(), |(index, _)| index),
                );
                return Err(UploadError::Rejected {
                    status: status.as_u16(),
                    reason,
                });
            }

            parse_receipt(&payload)
        }
    }
}
