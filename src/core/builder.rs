//! Fluent construction of [`Map`] sessions.

use crate::{
    core::{
        config::{FetchConfig, MapConfig, TileLoadingConfig},
        geo::{LatLng, Point},
        map::Map,
    },
    layers::{basemap::BasemapRegistry, tile::TileLayer},
    style::{DepthBucket, DepthScale},
    Result,
};

/// Builder for creating and configuring Map instances
pub struct MapBuilder {
    config: MapConfig,
    size: Point,
    basemaps: Option<Vec<TileLayer>>,
    depth_buckets: Option<Vec<DepthBucket>>,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self {
            config: MapConfig::default(),
            size: Point::new(800.0, 600.0),
            basemaps: None,
            depth_buckets: None,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: MapConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the initial center and zoom level
    pub fn with_center_and_zoom(mut self, center: LatLng, zoom: f64) -> Self {
        self.config.view.center = center;
        self.config.view.zoom = zoom;
        self
    }

    pub fn with_min_zoom(mut self, min_zoom: f64) -> Self {
        self.config.view.min_zoom = min_zoom;
        self
    }

    /// Initial viewport size in pixels
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Point::new(width, height);
        self
    }

    pub fn with_plates_url(mut self, url: impl Into<String>) -> Self {
        self.config.feeds.plates_url = url.into();
        self
    }

    pub fn with_earthquakes_url(mut self, url: impl Into<String>) -> Self {
        self.config.feeds.earthquakes_url = url.into();
        self
    }

    pub fn with_fetch_config(mut self, fetch: FetchConfig) -> Self {
        self.config.fetch = fetch;
        self
    }

    pub fn with_tile_config(mut self, tiles: TileLoadingConfig) -> Self {
        self.config.tiles = tiles;
        self
    }

    /// Use these basemaps instead of the standard four; the first is active
    pub fn with_basemaps(mut self, layers: Vec<TileLayer>) -> Self {
        self.basemaps = Some(layers);
        self
    }

    /// Use a custom depth table for marker colors and the legend
    pub fn with_depth_buckets(mut self, buckets: Vec<DepthBucket>) -> Self {
        self.depth_buckets = Some(buckets);
        self
    }

    /// Validates basemaps and depth table and builds the session
    pub fn build(self) -> Result<Map> {
        let basemaps = match self.basemaps {
            Some(layers) => BasemapRegistry::new(layers)?,
            None => BasemapRegistry::standard(),
        };
        let depth_scale = match self.depth_buckets {
            Some(buckets) => DepthScale::new(buckets)?,
            None => DepthScale::default(),
        };

        log::debug!(
            "map at {:?} z{} with {} basemaps",
            self.config.view.center,
            self.config.view.zoom,
            basemaps.len()
        );
        Ok(Map::from_parts(self.config, basemaps, depth_scale, self.size))
    }
}

impl Default for MapBuilder {
    fn default() -> Self {
        Self::new()
    }
}
