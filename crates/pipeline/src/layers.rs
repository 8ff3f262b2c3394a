use serde_json::Value;
use shared::{
    domain::{MarkerDescriptor, Variant},
    protocol::{CircleStyle, OverlayContent, OverlayLayer, PathStyle},
};

pub const EARTHQUAKES_OVERLAY: &str = "Earthquakes";
pub const PLATES_OVERLAY: &str = "Tectonic Plates";

pub fn circle_style(variant: Variant) -> CircleStyle {
    CircleStyle {
        stroke: false,
        color: "white".to_string(),
        fill_opacity: match variant {
            Variant::Baseline => 0.5,
            Variant::Enhanced => 0.7,
        },
    }
}

pub fn plate_style() -> PathStyle {
    PathStyle {
        color: "hotpink".to_string(),
        weight: 1.2,
    }
}

/// Earthquake markers sharing one circle style.
#[derive(Debug, Clone)]
pub struct CircleMarkers {
    pub markers: Vec<MarkerDescriptor>,
    pub style: CircleStyle,
}

/// Boundary GeoJSON drawn with one style regardless of feature identity.
#[derive(Debug, Clone)]
pub struct BoundaryShapes {
    pub geojson: Value,
    pub style: PathStyle,
}

/// Boundary GeoJSON the page loads itself from `source`.
#[derive(Debug, Clone)]
pub struct RemoteBoundaryShapes {
    pub source: String,
    pub style: PathStyle,
}

impl From<CircleMarkers> for OverlayContent {
    fn from(circles: CircleMarkers) -> Self {
        Self::Circles {
            style: circles.style,
            markers: circles.markers,
        }
    }
}

impl From<BoundaryShapes> for OverlayContent {
    fn from(shapes: BoundaryShapes) -> Self {
        Self::Shapes {
            style: shapes.style,
            geojson: shapes.geojson,
        }
    }
}

impl From<RemoteBoundaryShapes> for OverlayContent {
    fn from(shapes: RemoteBoundaryShapes) -> Self {
        Self::RemoteShapes {
            style: shapes.style,
            source: shapes.source,
        }
    }
}

/// Groups primitives of any kind under one toggleable name.
pub fn overlay(name: impl Into<String>, content: impl Into<OverlayContent>) -> OverlayLayer {
    OverlayLayer {
        name: name.into(),
        visible_on_load: true,
        content: content.into(),
    }
}

pub fn build_overlay(descriptors: Vec<MarkerDescriptor>, style: CircleStyle) -> OverlayLayer {
    overlay(
        EARTHQUAKES_OVERLAY,
        CircleMarkers {
            markers: descriptors,
            style,
        },
    )
}

pub fn build_boundary_overlay(geojson: Value) -> OverlayLayer {
    overlay(
        PLATES_OVERLAY,
        BoundaryShapes {
            geojson,
            style: plate_style(),
        },
    )
}

/// The plates overlay as an empty group that fills in once `source` answers.
pub fn deferred_boundary_overlay(source: impl Into<String>) -> OverlayLayer {
    overlay(
        PLATES_OVERLAY,
        RemoteBoundaryShapes {
            source: source.into(),
            style: plate_style(),
        },
    )
}

#[cfg(test)]
#[path = "tests/layers_tests.rs"]
mod tests;
