// SPDX-License-Identifier: MPL-2.0
//! GraphQL adapter implementing the [`GalleryQuery`] port trait.
//!
//! Uploaded images are found by searching transactions signed by the wallet
//! and tagged with one of the app names Snappy has used.
//!
//! [`GalleryQuery`]: crate::application::port::GalleryQuery

use std::future::Future;
use std::time::Duration;

use serde_json::{json, Value};

use crate::application::port::{AssetRef, GalleryError, GalleryQuery};

const UPLOADS_QUERY: &str = "query Uploads($owners: [String!], $appNames: [String!]!) {
  transactions(owners: $owners, tags: [{ name: \"App-Name\", values: $appNames }], first: 100) {
    edges { node { id } }
  }
}";

/// Settings of [`GraphqlGalleryClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GallerySettings {
    /// GraphQL search endpoint.
    pub endpoint: String,
    /// Accepted `App-Name` tag values.
    pub app_names: Vec<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            endpoint: crate::config::DEFAULT_GRAPHQL_ENDPOINT.to_string(),
            app_names: crate::config::default_gallery_app_names(),
            timeout: Duration::from_secs(crate::config::DEFAULT_UPLOAD_TIMEOUT_SECS),
        }
    }
}

/// Builds the request body listing the uploads of `owner`.
#[must_use]
pub fn build_request(owner: &str, app_names: &[String]) -> Value {
    json!({
        "query": UPLOADS_QUERY,
        "variables": {
            "owners": [owner],
            "appNames": app_names,
        }
    })
}

/// Extracts asset ids from a GraphQL response.
///
/// A response without `data.transactions.edges` lists nothing.
///
/// # Errors
///
/// Returns [`GalleryError::InvalidResponse`] if the server reported errors.
pub fn parse_response(body: &Value) -> Result<Vec<AssetRef>, GalleryError> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if let Some(first) = errors.first() {
            let message = first
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("query failed");
            return Err(GalleryError::InvalidResponse(message.to_string()));
        }
    }

    let edges = body
        .pointer("/data/transactions/edges")
        .and_then(Value::as_array);

    Ok(edges
        .into_iter()
        .flatten()
        .filter_map(|edge| edge.pointer("/node/id").and_then(Value::as_str))
        .map(AssetRef::new)
        .collect())
}

/// Gallery query client for a GraphQL transaction search service.
#[derive(Debug, Clone)]
pub struct GraphqlGalleryClient {
    client: reqwest::Client,
    settings: GallerySettings,
}

impl GraphqlGalleryClient {
    /// Creates a client for `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::Network`] if the HTTP client cannot be built.
    pub fn new(settings: GallerySettings) -> Result<Self, GalleryError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("Snappy/{}", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GalleryError::Network(e.to_string()))?;
        Ok(Self { client, settings })
    }
}

impl GalleryQuery for GraphqlGalleryClient {
    fn list_uploads(
        &self,
        owner: &str,
    ) -> impl Future<Output = Result<Vec<AssetRef>, GalleryError>> + Send {
        let client = self.client.clone();
        let endpoint = self.settings.endpoint.clone();
        let owner = owner.trim().to_string();
        let request = build_request(&owner, &self.settings.app_names);

        async move {
            if owner.is_empty() {
                return Ok(Vec::new());
            }

            let response = client
                .post(&endpoint)
                .json(&request)
                .send()
                .await
                .map_err(|e| GalleryError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(GalleryError::Status(status.as_u16()));
            }

            let payload = response
                .bytes()
                .await
                .map_err(|e| GalleryError::Network(e.to_string()))?;
            let body: Value = serde_json::from_slice(&payload)
                .map_err(|e| GalleryError::InvalidResponse(e.to_string()))?;

            parse_response(&body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_owner_and_app_names() {
        let request = build_request("wallet-address", &["Snappy".into(), "SnappyCam".into()]);

        assert_eq!(request["variables"]["owners"], json!(["wallet-address"]));
        assert_eq!(request["variables"]["appNames"], json!(["Snappy", "SnappyCam"]));
        assert!(request["query"]
            .as_str()
            .is_some_and(|query| query.contains("App-Name")));
    }

    #[test]
    fn parse_reads_edge_ids_in_order() {
        let body = json!({
            "data": { "transactions": { "edges": [
                { "node": { "id": "tx2" } },
                { "node": { "id": "tx1" } },
                { "node": {} }
            ]}}
        });

        let ids: Vec<String> = parse_response(&body)
            .expect("ids")
            .into_iter()
            .map(|asset| asset.id().to_string())
            .collect();

        assert_eq!(ids, vec!["tx2", "tx1"]);
    }

    #[test]
    fn parse_without_data_is_empty() {
        assert!(parse_response(&json!({})).expect("ids").is_empty());
        assert!(parse_response(&json!({ "data": null }))
            .expect("ids")
            .is_empty());
    }

    #[test]
    fn parse_surfaces_graphql_errors() {
        let body = json!({ "errors": [{ "message": "rate limited" }] });
        assert_eq!(
            parse_response(&body),
            Err(GalleryError::InvalidResponse("rate limited".into()))
        );
    }

    #[test]
    fn default_settings_search_both_app_names() {
        let settings = GallerySettings::default();
        assert_eq!(settings.app_names, vec!["Snappy", "SnappyCam"]);
        assert!(settings.endpoint.ends_with("/graphql"));
    }

    #[tokio::test]
    async fn blank_owner_lists_nothing_without_network() {
        let client = GraphqlGalleryClient::new(GallerySettings {
            endpoint: "http://127.0.0.1:9/graphql".into(),
            ..GallerySettings::default()
        })
        .expect("client");

        assert_eq!(client.list_uploads("  ").await, Ok(Vec::new()));
    }
}
