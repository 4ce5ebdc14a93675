use crate::{
    constants::TILE_SIZE,
    core::{
        geo::{Point, TileCoord},
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
};
use serde::{Deserialize, Serialize};

/// Configuration for a raster tile layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayerOptions {
    /// URL template with `{s}`, `{z}`, `{x}`, `{y}` and `{r}` placeholders
    pub url_template: String,
    /// Available subdomains for `{s}`
    pub subdomains: Vec<String>,
    /// Attribution text (plain text)
    pub attribution: String,
    /// Tile size in pixels
    pub tile_size: u32,
    /// Maximum zoom level for this tile source
    pub max_zoom: u8,
    /// Minimum zoom level for this tile source
    pub min_zoom: u8,
}

impl Default for TileLayerOptions {
    fn default() -> Self {
        Self {
            url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            attribution: "© OpenStreetMap contributors".to_string(),
            tile_size: TILE_SIZE,
            max_zoom: 18,
            min_zoom: 0,
        }
    }
}

fn subdomains(letters: &str) -> Vec<String> {
    letters.chars().map(String::from).collect()
}

/// A tile placed on screen: which tile to draw and where
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub coord: TileCoord,
    /// Top-left corner in container pixels
    pub min: Point,
    /// Edge length in pixels at the current (fractional) zoom
    pub size: f64,
}

/// A raster basemap served by a slippy-map tile server
#[derive(Debug, Clone)]
pub struct TileLayer {
    properties: LayerProperties,
    options: TileLayerOptions,
}

impl TileLayer {
    pub fn with_options(id: String, name: String, options: TileLayerOptions) -> Self {
        Self {
            properties: LayerProperties::new(id, name, LayerType::Tile),
            options,
        }
    }

    /// OpenStreetMap standard tiles
    pub fn openstreetmap(id: String, name: String) -> Self {
        let options = TileLayerOptions {
            url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            subdomains: vec![],
            attribution: "© OpenStreetMap contributors".to_string(),
            max_zoom: 19,
            ..Default::default()
        };
        Self::with_options(id, name, options)
    }

    /// CARTO light (gray scale) tiles
    pub fn carto_light(id: String, name: String) -> Self {
        let options = TileLayerOptions {
            url_template: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png"
                .to_string(),
            subdomains: subdomains("abcd"),
            attribution: "© OpenStreetMap contributors © CARTO".to_string(),
            max_zoom: 20,
            ..Default::default()
        };
        Self::with_options(id, name, options)
    }

    /// Esri National Geographic world map
    pub fn national_geographic(id: String, name: String) -> Self {
        let options = TileLayerOptions {
            url_template: "https://server.arcgisonline.com/ArcGIS/rest/services/NatGeo_World_Map/MapServer/tile/{z}/{y}/{x}".to_string(),
            subdomains: vec![],
            attribution: "Tiles © Esri — National Geographic, Esri, DeLorme, NAVTEQ, UNEP-WCMC, USGS, NASA, ESA, METI, NRCAN, GEBCO, NOAA, iPC".to_string(),
            max_zoom: 16,
            ..Default::default()
        };
        Self::with_options(id, name, options)
    }

    /// OpenTopoMap topographic tiles
    pub fn open_topo_map(id: String, name: String) -> Self {
        let options = TileLayerOptions {
            url_template: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png".to_string(),
            subdomains: subdomains("abc"),
            attribution: "Map data: © OpenStreetMap contributors, SRTM | Map style: © OpenTopoMap (CC-BY-SA)".to_string(),
            max_zoom: 17,
            ..Default::default()
        };
        Self::with_options(id, name, options)
    }

    pub fn options(&self) -> &TileLayerOptions {
        &self.options
    }

    pub fn attribution(&self) -> &str {
        &self.options.attribution
    }

    pub fn max_zoom(&self) -> u8 {
        self.options.max_zoom
    }

    /// Subdomain for a tile, rotating by `|x + y|`
    pub fn subdomain(&self, coord: &TileCoord) -> Option<&str> {
        if self.options.subdomains.is_empty() {
            return None;
        }
        let index = (coord.x as u64 + coord.y as u64) % self.options.subdomains.len() as u64;
        Some(self.options.subdomains[index as usize].as_str())
    }

    /// Expands the URL template for `coord`. `{r}` becomes `@2x` when
    /// `retina` is set and is dropped otherwise.
    pub fn tile_url(&self, coord: &TileCoord, retina: bool) -> String {
        let mut url = self
            .options
            .url_template
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
            .replace("{r}", if retina { "@2x" } else { "" });
        if let Some(subdomain) = self.subdomain(coord) {
            url = url.replace("{s}", subdomain);
        }
        url
    }

    /// Integer zoom at which tiles are requested for a viewport zoom
    pub fn tile_zoom(&self, zoom: f64) -> u8 {
        let zoom = zoom.round().max(0.0) as u8;
        // an inverted range resolves to min_zoom
        zoom.min(self.options.max_zoom).max(self.options.min_zoom)
    }

    /// Tiles covering the viewport, with their on-screen placement.
    /// Columns wrap around the antimeridian; rows outside the world are
    /// skipped.
    pub fn visible_tiles(&self, viewport: &Viewport) -> Vec<TilePlacement> {
        let zoom = self.tile_zoom(viewport.zoom);
        let scale = 2_f64.powf(viewport.zoom - zoom as f64);
        let tile_size = self.options.tile_size as f64;

        let (min_px, max_px) = self.tiled_pixel_bounds(viewport, zoom, scale);
        let min_x = (min_px.x / tile_size).floor() as i64;
        let max_x = (max_px.x / tile_size).ceil() as i64;
        let min_y = (min_px.y / tile_size).floor() as i64;
        let max_y = (max_px.y / tile_size).ceil() as i64;
        let tiles_per_axis = 1_i64 << zoom;

        let mut tiles = Vec::new();
        for y in min_y..max_y {
            if y < 0 || y >= tiles_per_axis {
                continue;
            }
            for x in min_x..max_x {
                let wrapped_x = x.rem_euclid(tiles_per_axis);
                let min = Point::new(
                    (x as f64 * tile_size - min_px.x) * scale,
                    (y as f64 * tile_size - min_px.y) * scale,
                );
                tiles.push(TilePlacement {
                    coord: TileCoord::new(wrapped_x as u32, y as u32, zoom),
                    min,
                    size: tile_size * scale,
                });
            }
        }

        log::debug!(
            "{}: {} tiles at z{} for view zoom {:.2}",
            self.properties.name,
            tiles.len(),
            zoom,
            viewport.zoom
        );
        tiles
    }

    // World-pixel rectangle (at tile zoom) covered by the viewport.
    fn tiled_pixel_bounds(&self, viewport: &Viewport, zoom: u8, scale: f64) -> (Point, Point) {
        let pixel_center = viewport.project(&viewport.center, Some(zoom as f64));
        let half_size = Point::new(
            viewport.size.x / (scale * 2.0),
            viewport.size.y / (scale * 2.0),
        );
        (
            pixel_center.subtract(&half_size),
            pixel_center.add(&half_size),
        )
    }
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(TileLayer, properties);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;

    #[test]
    fn test_tile_layer_creation() {
        let layer = TileLayer::openstreetmap("osm".to_string(), "Default".to_string());
        assert_eq!(layer.id(), "osm");
        assert_eq!(layer.name(), "Default");
        assert_eq!(layer.layer_type(), LayerType::Tile);
        assert_eq!(layer.max_zoom(), 19);
    }

    #[test]
    fn test_url_templating() {
        let coord = TileCoord::new(7, 12, 5);

        let osm = TileLayer::openstreetmap("osm".into(), "Default".into());
        assert_eq!(
            osm.tile_url(&coord, false),
            "https://tile.openstreetmap.org/5/7/12.png"
        );

        let gray = TileLayer::carto_light("gray".into(), "Gray Scale".into());
        // (7 + 12) % 4 == 3 -> "d"
        assert_eq!(
            gray.tile_url(&coord, false),
            "https://d.basemaps.cartocdn.com/light_all/5/7/12.png"
        );
        assert_eq!(
            gray.tile_url(&coord, true),
            "https://d.basemaps.cartocdn.com/light_all/5/7/12@2x.png"
        );

        let natgeo = TileLayer::national_geographic("natgeo".into(), "National Geographic".into());
        assert!(natgeo.tile_url(&coord, false).ends_with("/tile/5/12/7"));

        let topo = TileLayer::open_topo_map("topo".into(), "Topography".into());
        // (7 + 12) % 3 == 1 -> "b"
        assert_eq!(
            topo.tile_url(&coord, false),
            "https://b.tile.opentopomap.org/5/7/12.png"
        );
    }

    #[test]
    fn test_visible_tiles_cover_viewport() {
        let layer = TileLayer::openstreetmap("osm".into(), "Default".into());
        let viewport = Viewport::new(LatLng::new(39.0119, -98.4842), 5.0, Point::new(800.0, 600.0));
        let tiles = layer.visible_tiles(&viewport);

        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|t| t.coord.z == 5 && t.coord.is_valid()));
        assert!(tiles.iter().all(|t| (t.size - 256.0).abs() < 1e-9));

        let min_x = tiles.iter().map(|t| t.min.x).fold(f64::INFINITY, f64::min);
        let min_y = tiles.iter().map(|t| t.min.y).fold(f64::INFINITY, f64::min);
        let max_x = tiles.iter().map(|t| t.min.x + t.size).fold(f64::NEG_INFINITY, f64::max);
        let max_y = tiles.iter().map(|t| t.min.y + t.size).fold(f64::NEG_INFINITY, f64::max);
        assert!(min_x <= 0.0 && min_y <= 0.0);
        assert!(max_x >= 800.0 && max_y >= 600.0);
    }

    #[test]
    fn test_visible_tiles_wrap_and_clip() {
        let layer = TileLayer::openstreetmap("osm".into(), "Default".into());
        // Whole world at z0 in a wide viewport: x wraps, y has only one row
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 0.0, Point::new(1024.0, 512.0));
        let tiles = layer.visible_tiles(&viewport);

        assert!(tiles.iter().all(|t| t.coord == TileCoord::new(0, 0, 0)));
        assert!(tiles.len() >= 4);
    }

    #[test]
    fn test_tile_zoom_clamped_to_source() {
        let natgeo = TileLayer::national_geographic("natgeo".into(), "National Geographic".into());
        assert_eq!(natgeo.tile_zoom(18.0), 16);
        assert_eq!(natgeo.tile_zoom(4.4), 4);
    }
}
