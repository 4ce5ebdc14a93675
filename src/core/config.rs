//! Session configuration, built in code.
//!
//! Every section has working defaults, so `MapConfig::default()` reproduces
//! the stock map: United States view, the USGS weekly feed and the PB2002
//! plate boundaries.

use crate::{
    constants::{DEFAULT_CENTER, DEFAULT_ZOOM, EARTHQUAKES_FEED_URL, PLATES_FEED_URL},
    core::geo::LatLng,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapConfig {
    pub view: ViewConfig,
    pub feeds: FeedConfig,
    pub fetch: FetchConfig,
    pub tiles: TileLoadingConfig,
}

/// Initial view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub center: LatLng,
    pub zoom: f64,
    pub min_zoom: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center: LatLng::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            zoom: DEFAULT_ZOOM,
            min_zoom: 1.0,
        }
    }
}

/// Overlay data sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub plates_url: String,
    pub earthquakes_url: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            plates_url: PLATES_FEED_URL.to_string(),
            earthquakes_url: EARTHQUAKES_FEED_URL.to_string(),
        }
    }
}

/// HTTP settings shared by feed and tile requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLoadingConfig {
    /// Decoded tiles kept in memory
    pub cache_size: usize,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// Request `@2x` tiles from sources that offer them
    pub retina: bool,
}

impl TileLoadingConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for TileLoadingConfig {
    fn default() -> Self {
        Self {
            cache_size: 512,
            max_retries: 2,
            retry_delay_ms: 500,
            retina: false,
        }
    }
}
