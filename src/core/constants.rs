//! Engine-wide defaults, mostly mirroring Leaflet conventions.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Initial map center (latitude, longitude): the middle of the contiguous US.
pub const DEFAULT_CENTER: (f64, f64) = (39.0119, -98.4842);

/// Initial zoom level.
pub const DEFAULT_ZOOM: f64 = 5.0;

/// Tectonic plate boundaries (PB2002 model).
pub const PLATES_FEED_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

/// USGS summary feed: all earthquakes, past seven days.
pub const EARTHQUAKES_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson";

/// Radius used for point geometries in the plate overlay.
pub const PLATE_POINT_RADIUS: f64 = 3.0;

/// Extra pixels around a marker that still count as a click on it.
pub const CLICK_TOLERANCE: f64 = 2.0;
