//! # quakemap
//!
//! Weekly earthquakes and tectonic-plate boundaries drawn over selectable
//! raster basemaps, in the manner of a Leaflet page.
//!
//! The crate keeps a headless map session ([`Map`]) holding the basemap
//! registry, the two overlay layers, the depth legend and popups. Feeds are
//! fetched concurrently and each populates its own overlay once. With the
//! `egui` feature the session can be drawn and driven interactively.

pub mod background;
pub mod core;
pub mod data;
pub mod layers;
pub mod prelude;
pub mod spatial;
pub mod style;
pub mod tiles;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    builder::MapBuilder,
    config::MapConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{FeedKind, FetchOutcome, Map, OverlayReport},
    viewport::Viewport,
};

pub use layers::{
    base::LayerTrait, basemap::BasemapRegistry, overlay::OverlayLayer, tile::TileLayer,
    vector::VectorFeature,
};

pub use data::{
    earthquake::Earthquake,
    feeds::{FeatureSource, HttpFeatureSource},
    geojson::GeoJson,
};

pub use style::{depth_color, magnitude_radius, DepthBucket, DepthScale, DEPTH_BUCKETS};

pub use ui::{controls::LayerControl, legend::Legend, popup::Popup};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown basemap: {0}")]
    UnknownBasemap(String),

    #[error("Unknown overlay: {0}")]
    UnknownOverlay(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Task error: {0}")]
    Task(String),
}

/// Error type alias for convenience
pub type Error = MapError;
