//! Magnitude-to-visual encoding: classify quakes, turn them into markers,
//! group them into overlays and compose the map document.

pub mod composer;
pub mod layers;
pub mod legend;
pub mod mapper;
pub mod page;
pub mod profile;
pub mod tiers;

pub use composer::{MapComposer, TileAccessToken};
pub use layers::{build_boundary_overlay, build_overlay, deferred_boundary_overlay};
pub use legend::build_legend;
pub use mapper::{decode_feed, map_features, DecodedFeed, PopupOptions};
pub use page::render_page;
pub use profile::{BoundarySource, MapProfile};
pub use tiers::{TierTable, SCALE_FACTOR};
