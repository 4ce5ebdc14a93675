//! Prelude module for common quakemap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use quakemap::prelude::*;`

pub use crate::core::{
    builder::MapBuilder,
    config::{FeedConfig, FetchConfig, MapConfig, TileLoadingConfig, ViewConfig},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{FeedKind, FetchOutcome, Map, OverlayReport},
    viewport::Viewport,
};

pub use crate::layers::{
    base::{LayerProperties, LayerTrait, LayerType},
    basemap::BasemapRegistry,
    manager::LayerManager,
    overlay::{LoadState, OverlayLayer},
    tile::TileLayer,
    vector::{CircleStyle, Color, PathStyle, VectorFeature},
};

pub use crate::data::{
    earthquake::Earthquake,
    feeds::{FeatureSource, HttpFeatureSource},
    geojson::{GeoJson, GeoJsonFeature},
};

pub use crate::style::{DepthBucket, DepthScale};

pub use crate::spatial::index::{SpatialIndex, SpatialItem};

pub use crate::tiles::{TileCache, TileKey, TileLoader, TileSource};

pub use crate::ui::{ControlPosition, LayerControl, Legend, Popup, PopupContent};

#[cfg(feature = "egui")]
pub use crate::ui::MapWidget;

#[cfg(feature = "tokio-runtime")]
pub use crate::background::OverlayLoader;

pub use crate::{MapError, Result};

pub use std::{sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
