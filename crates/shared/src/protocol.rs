use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{LatLng, LegendEntry, MarkerDescriptor, Variant};

/// A single entry of the `features` array in the earthquake feed.
///
/// Every field is optional on the wire; validation happens when the feature is
/// turned into an `EventRecord`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedFeature {
    #[serde(default)]
    pub properties: FeedProperties,
    #[serde(default)]
    pub geometry: Option<FeedGeometry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedProperties {
    #[serde(default)]
    pub mag: Option<f64>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedGeometry {
    /// `[lng, lat, depth?]`; depth is often `null` and is never read.
    #[serde(default)]
    pub coordinates: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleStyle {
    pub stroke: bool,
    pub color: String,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStyle {
    pub color: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum OverlayContent {
    Circles {
        style: CircleStyle,
        markers: Vec<MarkerDescriptor>,
    },
    Shapes {
        style: PathStyle,
        geojson: Value,
    },
    /// Shapes the page fetches from `source` after the map is on screen.
    RemoteShapes { style: PathStyle, source: String },
}

impl OverlayContent {
    pub fn primitive_count(&self) -> usize {
        match self {
            Self::Circles { markers, .. } => markers.len(),
            Self::Shapes { geojson, .. } => geojson
                .get("features")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
            Self::RemoteShapes { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayLayer {
    pub name: String,
    pub visible_on_load: bool,
    pub content: OverlayContent,
}

/// A tile source handed to the map widget as-is. `options` uses the widget's
/// own (camelCase) option names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseLayer {
    pub name: String,
    pub url_template: String,
    pub attribution: String,
    #[serde(default)]
    pub options: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerControl {
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendPanel {
    pub title: String,
    pub position: String,
    pub entries: Vec<LegendEntry>,
}

/// Everything the map widget needs to draw one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    pub variant: Variant,
    pub viewport: Viewport,
    pub base_layers: Vec<BaseLayer>,
    pub active_base_layer: String,
    pub overlays: Vec<OverlayLayer>,
    pub layer_control: LayerControl,
    pub legend: LegendPanel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

impl MapDocument {
    pub fn overlay(&self, name: &str) -> Option<&OverlayLayer> {
        self.overlays.iter().find(|overlay| overlay.name == name)
    }
}
