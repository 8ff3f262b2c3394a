use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use pipeline::{
    build_boundary_overlay, build_overlay, decode_feed, deferred_boundary_overlay,
    layers::circle_style, map_features, BoundarySource, MapComposer, MapProfile, TileAccessToken,
};
use reqwest::Client;
use serde_json::{json, Value};
use shared::{
    domain::{BoundaryLoading, Dataset},
    error::MapError,
    protocol::{MapDocument, OverlayLayer},
};
use tracing::{error, info, warn};
use url::Url;

/// Something that can hand back the JSON document behind a feed URL.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_json(&self, dataset: Dataset, url: &str) -> Result<Value, MapError>;
}

#[derive(Clone, Default)]
pub struct HttpFeedSource {
    http: Client,
}

impl HttpFeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_json(&self, dataset: Dataset, url: &str) -> Result<Value, MapError> {
        let parsed = Url::parse(url).map_err(|e| MapError::fetch(dataset, url, e))?;
        let res = self
            .http
            .get(parsed)
            .send()
            .await
            .map_err(|e| MapError::fetch(dataset, url, e))?
            .error_for_status()
            .map_err(|e| MapError::fetch(dataset, url, e))?;
        res.json::<Value>()
            .await
            .map_err(|e| MapError::fetch(dataset, url, e))
    }
}

/// Serves documents registered up front, keyed by URL.
#[derive(Clone, Default)]
pub struct StaticFeedSource {
    documents: HashMap<String, Value>,
}

impl StaticFeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, document: Value) -> Self {
        self.documents.insert(url.into(), document);
        self
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    async fn fetch_json(&self, dataset: Dataset, url: &str) -> Result<Value, MapError> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| MapError::fetch(dataset, url, "no document registered for url"))
    }
}

/// One fetch-and-compose cycle per call; holds no state between calls.
#[derive(Clone)]
pub struct QuakeMapService {
    source: Arc<dyn FeedSource>,
    profile: MapProfile,
    composer: MapComposer,
}

impl QuakeMapService {
    pub fn new(source: Arc<dyn FeedSource>, profile: MapProfile, token: TileAccessToken) -> Self {
        let composer = MapComposer::new(profile.variant, &profile.tiers, token);
        Self {
            source,
            profile,
            composer,
        }
    }

    pub fn profile(&self) -> &MapProfile {
        &self.profile
    }

    pub fn composer(&self) -> &MapComposer {
        &self.composer
    }

    /// Fetches the earthquake feed and turns it into the "Earthquakes" overlay.
    pub async fn load_earthquakes(&self) -> Result<OverlayLayer, MapError> {
        let url = &self.profile.earthquake_feed_url;
        let document = self.source.fetch_json(Dataset::Earthquakes, url).await?;
        let decoded = decode_feed(&document, self.profile.malformed_policy)?;
        if !decoded.skipped.is_empty() {
            warn!(
                skipped = decoded.skipped.len(),
                kept = decoded.records.len(),
                "earthquake feed contained malformed records"
            );
        }
        let markers = map_features(&decoded.records, &self.profile.tiers, &self.profile.popup);
        info!(%url, markers = markers.len(), "earthquake overlay ready");
        Ok(build_overlay(markers, circle_style(self.profile.variant)))
    }

    /// The raw boundary document, or `None` when this deployment draws no
    /// plate boundaries.
    pub async fn load_boundaries(&self) -> Result<Option<Value>, MapError> {
        let Some(source) = &self.profile.boundaries else {
            return Ok(None);
        };
        let document = self
            .source
            .fetch_json(Dataset::TectonicPlates, &source.url)
            .await?;
        info!(url = %source.url, "boundary dataset fetched");
        Ok(Some(document))
    }

    /// Fetches what the profile asks for and composes the document.
    ///
    /// A failed dataset leaves its overlay empty and adds a notice; it never
    /// fails the whole document. With deferred boundary loading the plates
    /// overlay is handed over empty and may fill in after first paint.
    pub async fn compose(&self) -> MapDocument {
        let (earthquakes, plates) = match &self.profile.boundaries {
            Some(BoundarySource {
                loading: BoundaryLoading::Joined,
                ..
            }) => {
                let (earthquakes, plates) =
                    tokio::join!(self.load_earthquakes(), self.load_boundaries());
                let plates = plates.map(|document| document.map(build_boundary_overlay));
                (earthquakes, plates)
            }
            Some(BoundarySource {
                loading: BoundaryLoading::Deferred,
                page_source,
                ..
            }) => (
                self.load_earthquakes().await,
                Ok(Some(deferred_boundary_overlay(page_source.clone()))),
            ),
            None => (self.load_earthquakes().await, Ok(None)),
        };

        let mut overlays = Vec::with_capacity(2);
        let mut notices = Vec::new();

        match earthquakes {
            Ok(layer) => overlays.push(layer),
            Err(err) => {
                error!(error = %err, "earthquake overlay unavailable");
                notices.push(notice_for(Dataset::Earthquakes, &err));
                overlays.push(build_overlay(
                    Vec::new(),
                    circle_style(self.profile.variant),
                ));
            }
        }

        match plates {
            Ok(Some(layer)) => overlays.push(layer),
            Ok(None) => {}
            Err(err) => {
                error!(error = %err, "boundary overlay unavailable");
                notices.push(notice_for(Dataset::TectonicPlates, &err));
                overlays.push(build_boundary_overlay(empty_collection()));
            }
        }

        self.composer.compose(overlays, notices)
    }
}

fn notice_for(dataset: Dataset, err: &MapError) -> String {
    let what = match dataset {
        Dataset::Earthquakes => "Earthquake data",
        Dataset::TectonicPlates => "Tectonic plate data",
    };
    format!("{what} could not be loaded: {err}")
}

fn empty_collection() -> Value {
    json!({ "type": "FeatureCollection", "features": [] })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
