//! Wires base layers, overlays and the legend into a [`MapDocument`].

use std::fmt;

use serde_json::{json, Map, Value};
use shared::{
    domain::{LatLng, Variant},
    error::MapError,
    protocol::{BaseLayer, LayerControl, LegendPanel, MapDocument, OverlayLayer, Viewport},
};

use crate::{legend::legend_panel, tiers::TierTable};

pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 15.5994,
    lng: -28.6731,
};
pub const DEFAULT_ZOOM: u8 = 2;

const MAPBOX_STYLE_URL: &str =
    "https://api.mapbox.com/styles/v1/{id}/tiles/{z}/{x}/{y}?access_token={accessToken}";
const MAPBOX_LIGHT_URL: &str =
    "https://api.mapbox.com/styles/v1/mapbox/{id}/tiles/{z}/{x}/{y}?access_token={accessToken}";
const MAPBOX_ATTRIBUTION: &str = "Map data &copy; <a href=\"https://www.openstreetmap.org/\">OpenStreetMap</a> contributors, <a href=\"https://creativecommons.org/licenses/by-sa/2.0/\">CC-BY-SA</a>, Imagery &copy; <a href=\"https://www.mapbox.com/\">Mapbox</a>";
const GIBS_URL: &str = "https://map1.vis.earthdata.nasa.gov/wmts-webmerc/VIIRS_CityLights_2012/default/{time}/{tilematrixset}{maxZoom}/{z}/{y}/{x}.{format}";
const GIBS_ATTRIBUTION: &str = "Imagery provided by services from the Global Imagery Browse Services (GIBS), operated by the NASA/GSFC/Earth Science Data and Information System (<a href=\"https://earthdata.nasa.gov\">ESDIS</a>) with funding provided by NASA/HQ.";
const ESRI_TOPO_URL: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Topo_Map/MapServer/tile/{z}/{y}/{x}";
const ESRI_ATTRIBUTION: &str = "Tiles &copy; Esri &mdash; Esri, DeLorme, NAVTEQ, TomTom, Intermap, iPC, USGS, FAO, NPS, NRCAN, GeoBase, Kadaster NL, Ordnance Survey, Esri Japan, METI, Esri China (Hong Kong), and the GIS User Community";

/// Tile provider access token. Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct TileAccessToken(String);

impl TileAccessToken {
    pub fn new(raw: impl Into<String>) -> Result<Self, MapError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MapError::ConfigurationMissing(
                "tile provider access token is empty".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Takes the first non-empty candidate, in order.
    pub fn first_of<I>(candidates: I) -> Result<Self, MapError>
    where
        I: IntoIterator<Item = Option<String>>,
    {
        candidates
            .into_iter()
            .flatten()
            .find_map(|candidate| Self::new(candidate).ok())
            .ok_or_else(|| {
                MapError::ConfigurationMissing(
                    "tile provider access token is not set (API_KEY or APP__TILE_ACCESS_TOKEN)"
                        .into(),
                )
            })
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TileAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TileAccessToken(***)")
    }
}

#[derive(Debug, Clone)]
pub struct MapComposer {
    variant: Variant,
    token: TileAccessToken,
    legend: LegendPanel,
}

impl MapComposer {
    pub fn new(variant: Variant, tiers: &TierTable, token: TileAccessToken) -> Self {
        Self {
            variant,
            token,
            legend: legend_panel(tiers),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn legend(&self) -> &LegendPanel {
        &self.legend
    }

    pub fn base_layers(&self) -> Vec<BaseLayer> {
        let token = self.token.expose();
        match self.variant {
            Variant::Baseline => vec![
                BaseLayer {
                    name: "Satellite".into(),
                    url_template: MAPBOX_STYLE_URL.into(),
                    attribution: MAPBOX_ATTRIBUTION.into(),
                    options: options(json!({
                        "tileSize": 512,
                        "maxZoom": 18,
                        "zoomOffset": -1,
                        "id": "mapbox/satellite-v9",
                        "accessToken": token,
                    })),
                },
                lightmap(token),
            ],
            Variant::Enhanced => vec![
                BaseLayer {
                    name: "Nasa".into(),
                    url_template: GIBS_URL.into(),
                    attribution: GIBS_ATTRIBUTION.into(),
                    options: options(json!({
                        "bounds": [[-85.0511287776, -179.999999975], [85.0511287776, 179.999999975]],
                        "minZoom": 1,
                        "maxZoom": 8,
                        "format": "jpg",
                        "time": "",
                        "tilematrixset": "GoogleMapsCompatible_Level",
                    })),
                },
                BaseLayer {
                    name: "Terrain".into(),
                    url_template: ESRI_TOPO_URL.into(),
                    attribution: ESRI_ATTRIBUTION.into(),
                    options: Map::new(),
                },
                lightmap(token),
            ],
        }
    }

    pub fn active_base_layer(&self) -> &'static str {
        match self.variant {
            Variant::Baseline => "Satellite",
            Variant::Enhanced => "Lightmap",
        }
    }

    /// Overlays keep the order they are given in; all start visible.
    pub fn compose(&self, overlays: Vec<OverlayLayer>, notices: Vec<String>) -> MapDocument {
        MapDocument {
            variant: self.variant,
            viewport: Viewport {
                center: DEFAULT_CENTER,
                zoom: DEFAULT_ZOOM,
            },
            base_layers: self.base_layers(),
            active_base_layer: self.active_base_layer().to_string(),
            overlays,
            layer_control: LayerControl { collapsed: false },
            legend: self.legend.clone(),
            notices,
        }
    }
}

fn lightmap(token: &str) -> BaseLayer {
    BaseLayer {
        name: "Lightmap".into(),
        url_template: MAPBOX_LIGHT_URL.into(),
        attribution: MAPBOX_ATTRIBUTION.into(),
        options: options(json!({
            "maxZoom": 18,
            "id": "light-v10",
            "accessToken": token,
        })),
    }
}

fn options(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
#[path = "tests/composer_tests.rs"]
mod tests;
