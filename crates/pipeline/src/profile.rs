use shared::domain::{BoundaryLoading, MalformedPolicy, Variant};

use crate::{mapper::PopupOptions, tiers::TierTable};

pub const DEFAULT_EARTHQUAKE_FEED: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_month.geojson";
pub const DEFAULT_BOUNDARY_FEED: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";
/// Where a served page looks for boundaries when loading is deferred.
pub const BOUNDARIES_ROUTE: &str = "/api/boundaries";

#[derive(Debug, Clone)]
pub struct BoundarySource {
    pub url: String,
    pub loading: BoundaryLoading,
    /// What the page fetches itself under deferred loading.
    pub page_source: String,
}

/// Everything that differs between deployments of the map.
#[derive(Debug, Clone)]
pub struct MapProfile {
    pub variant: Variant,
    pub tiers: TierTable,
    pub malformed_policy: MalformedPolicy,
    pub popup: PopupOptions,
    pub earthquake_feed_url: String,
    /// Only the enhanced variant draws plate boundaries.
    pub boundaries: Option<BoundarySource>,
}

impl MapProfile {
    pub fn for_variant(variant: Variant) -> Self {
        let boundaries = match variant {
            Variant::Baseline => None,
            Variant::Enhanced => Some(BoundarySource {
                url: DEFAULT_BOUNDARY_FEED.to_string(),
                loading: BoundaryLoading::default(),
                page_source: BOUNDARIES_ROUTE.to_string(),
            }),
        };
        Self {
            variant,
            tiers: TierTable::for_variant(variant),
            malformed_policy: MalformedPolicy::default(),
            popup: PopupOptions::default(),
            earthquake_feed_url: DEFAULT_EARTHQUAKE_FEED.to_string(),
            boundaries,
        }
    }

    pub fn with_tiers(mut self, tiers: TierTable) -> Self {
        self.tiers = tiers;
        self
    }

    pub fn with_boundary_url(mut self, url: impl Into<String>) -> Self {
        if let Some(source) = self.boundaries.as_mut() {
            source.url = url.into();
        }
        self
    }

    pub fn with_boundary_loading(mut self, loading: BoundaryLoading) -> Self {
        if let Some(source) = self.boundaries.as_mut() {
            source.loading = loading;
        }
        self
    }

    /// Points a deferred page straight at the upstream boundary feed, for
    /// pages that are not served next to `/api/boundaries`.
    pub fn with_upstream_page_source(mut self) -> Self {
        if let Some(source) = self.boundaries.as_mut() {
            source.page_source = source.url.clone();
        }
        self
    }
}
