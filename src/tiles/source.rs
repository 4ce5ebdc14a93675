use crate::{
    core::geo::TileCoord,
    layers::{base::LayerTrait, tile::TileLayer},
};

/// Anything that can produce tile URLs for a given coordinate
pub trait TileSource: Send + Sync {
    /// Stable id used to key cached tiles
    fn source_id(&self) -> &str;

    /// URL for `coord`, asking for high-DPI tiles when `retina` is set
    fn url(&self, coord: &TileCoord, retina: bool) -> String;
}

impl TileSource for TileLayer {
    fn source_id(&self) -> &str {
        self.id()
    }

    fn url(&self, coord: &TileCoord, retina: bool) -> String {
        self.tile_url(coord, retina)
    }
}
