// SPDX-License-Identifier: MPL-2.0
//! Gallery browsing state.
//!
//! [`GalleryBrowser`] lists the images a wallet has uploaded and tracks
//! which one is expanded. It owns the asset list; the session controller
//! only knows whether the gallery view is shown.

use std::time::Instant;

use crate::application::port::{AssetRef, GalleryError, GalleryQuery};
use crate::diagnostics::{AppOperation, DiagnosticsHandle, ErrorEvent, ErrorType};

/// Localization key of the note shown above the list.
pub const INDEXING_DELAY_NOTE_KEY: &str = "gallery-indexing-note";

/// One listed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    /// Transaction id.
    pub id: String,
    /// Display URL on the configured gateway.
    pub url: String,
}

impl GalleryItem {
    fn from_asset(asset: &AssetRef, gateway: &str) -> Self {
        Self {
            id: asset.id().to_string(),
            url: asset.url(gateway),
        }
    }
}

/// Loading state of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryStatus {
    /// Nothing requested yet.
    NotLoaded,
    /// A request is in flight.
    Loading,
    /// The list arrived (possibly empty).
    Loaded(Vec<GalleryItem>),
    /// The request failed.
    Failed(GalleryError),
}

/// Browses the uploads of one wallet.
#[derive(Debug, Clone)]
pub struct GalleryBrowser {
    gateway: String,
    status: GalleryStatus,
    selected: Option<String>,
    diagnostics: Option<DiagnosticsHandle>,
}

impl GalleryBrowser {
    /// Creates an empty browser building URLs on `gateway`.
    pub fn new(gateway: impl Into<String>) -> Self {
        Self {
            gateway: gateway.into(),
            status: GalleryStatus::NotLoaded,
            selected: None,
            diagnostics: None,
        }
    }

    /// Logs load timings and failures to `handle`.
    #[must_use]
    pub fn with_diagnostics(mut self, handle: DiagnosticsHandle) -> Self {
        self.diagnostics = Some(handle);
        self
    }

    /// Fetches the uploads of `owner`, replacing the current list.
    ///
    /// The expanded image is collapsed.
    pub async fn load<Q: GalleryQuery>(&mut self, client: &Q, owner: &str) {
        self.status = GalleryStatus::Loading;
        self.selected = None;

        let started = Instant::now();
        let result = client.list_uploads(owner).await;

        self.status = match result {
            Ok(assets) => {
                let items: Vec<GalleryItem> = assets
                    .iter()
                    .map(|asset| GalleryItem::from_asset(asset, &self.gateway))
                    .collect();
                if let Some(diagnostics) = &self.diagnostics {
                    #[allow(clippy::cast_possible_truncation)]
                    diagnostics.log_operation(AppOperation::LoadGallery {
                        duration_ms: started.elapsed().as_millis() as u64,
                        item_count: items.len(),
                    });
                }
                GalleryStatus::Loaded(items)
            }
            Err(err) => {
                if let Some(diagnostics) = &self.diagnostics {
                    diagnostics.log_error(
                        ErrorEvent::new(ErrorType::GalleryError, err.to_string())
                            .with_code(err.i18n_key())
                            .with_source("gallery"),
                    );
                }
                GalleryStatus::Failed(err)
            }
        };
    }

    /// Returns the loading state.
    #[must_use]
    pub fn status(&self) -> &GalleryStatus {
        &self.status
    }

    /// Returns the listed items, empty unless loaded.
    #[must_use]
    pub fn items(&self) -> &[GalleryItem] {
        match &self.status {
            GalleryStatus::Loaded(items) => items,
            _ => &[],
        }
    }

    /// Expands the image with transaction id `id`.
    ///
    /// Returns `false` if no such image is listed.
    pub fn select(&mut self, id: &str) -> bool {
        let found = self.items().iter().any(|item| item.id == id);
        if found {
            self.selected = Some(id.to_string());
        }
        found
    }

    /// Collapses the expanded image. Returns `false` if none was expanded.
    pub fn back(&mut self) -> bool {
        self.selected.take().is_some()
    }

    /// Returns the expanded image.
    #[must_use]
    pub fn selected(&self) -> Option<&GalleryItem> {
        let id = self.selected.as_deref()?;
        self.items().iter().find(|item| item.id == id)
    }

    /// Forgets the list, e.g. when the gallery view closes.
    pub fn reset(&mut self) {
        self.status = GalleryStatus::NotLoaded;
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeGallery;

    const GATEWAY: &str = "https://arweave.net";

    #[tokio::test]
    async fn load_maps_ids_to_gateway_urls() {
        let client = FakeGallery::with_ids(["tx1", "tx2"]);
        let mut browser = GalleryBrowser::new(GATEWAY);

        browser.load(&client, "owner").await;

        assert_eq!(
            browser.items(),
            &[
                GalleryItem {
                    id: "tx1".into(),
                    url: "https://arweave.net/tx1".into()
                },
                GalleryItem {
                    id: "tx2".into(),
                    url: "https://arweave.net/tx2".into()
                },
            ]
        );
        assert_eq!(client.queried_owners(), vec!["owner".to_string()]);
    }

    #[tokio::test]
    async fn empty_listing_is_loaded_not_failed() {
        let client = FakeGallery::default();
        let mut browser = GalleryBrowser::new(GATEWAY);
        browser.load(&client, "owner").await;
        assert_eq!(browser.status(), &GalleryStatus::Loaded(Vec::new()));
    }

    #[tokio::test]
    async fn failure_is_kept_in_status() {
        let client = FakeGallery::default();
        client.set_failure(Some(GalleryError::Status(503)));
        let mut browser = GalleryBrowser::new(GATEWAY);

        browser.load(&client, "owner").await;

        assert_eq!(
            browser.status(),
            &GalleryStatus::Failed(GalleryError::Status(503))
        );
        assert!(browser.items().is_empty());
    }

    #[tokio::test]
    async fn select_and_back() {
        let client = FakeGallery::with_ids(["tx1", "tx2"]);
        let mut browser = GalleryBrowser::new(GATEWAY);
        browser.load(&client, "owner").await;

        assert!(!browser.select("missing"));
        assert!(browser.selected().is_none());

        assert!(browser.select("tx2"));
        assert_eq!(browser.selected().map(|item| item.id.as_str()), Some("tx2"));

        assert!(browser.back());
        assert!(browser.selected().is_none());
        assert!(!browser.back());
    }

    #[tokio::test]
    async fn reload_collapses_selection() {
        let client = FakeGallery::with_ids(["tx1"]);
        let mut browser = GalleryBrowser::new(GATEWAY);
        browser.load(&client, "owner").await;
        browser.select("tx1");

        client.push_id("tx9");
        browser.load(&client, "owner").await;

        assert!(browser.selected().is_none());
        assert_eq!(browser.items().len(), 2);
        assert_eq!(browser.items()[0].id, "tx9");
    }

    #[test]
    fn reset_forgets_everything() {
        let mut browser = GalleryBrowser::new(GATEWAY);
        browser.reset();
        assert_eq!(browser.status(), &GalleryStatus::NotLoaded);
    }
}
