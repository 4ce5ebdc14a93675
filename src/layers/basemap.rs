use crate::{
    layers::{base::LayerTrait, tile::TileLayer},
    MapError, Result,
};

/// Ordered set of selectable basemaps with exactly one active
#[derive(Debug, Clone)]
pub struct BasemapRegistry {
    layers: Vec<TileLayer>,
    active: usize,
}

impl BasemapRegistry {
    /// Creates a registry with the first layer active. Fails when `layers`
    /// is empty, two layers share a name, or a layer's zoom range is
    /// inverted.
    pub fn new(layers: Vec<TileLayer>) -> Result<Self> {
        if layers.is_empty() {
            return Err(MapError::Layer("basemap registry needs at least one layer".into()));
        }
        for (i, layer) in layers.iter().enumerate() {
            let options = layer.options();
            if options.min_zoom > options.max_zoom {
                return Err(MapError::Layer(format!(
                    "basemap '{}' has min zoom {} above max zoom {}",
                    layer.name(),
                    options.min_zoom,
                    options.max_zoom
                )));
            }
            if layers[..i].iter().any(|other| other.name() == layer.name()) {
                return Err(MapError::Layer(format!(
                    "duplicate basemap name '{}'",
                    layer.name()
                )));
            }
        }

        let mut registry = Self { layers, active: 0 };
        registry.sync_visibility();
        Ok(registry)
    }

    /// Default, Gray Scale, National Geographic, Topography
    pub fn standard() -> Self {
        let layers = vec![
            TileLayer::openstreetmap("default".to_string(), "Default".to_string()),
            TileLayer::carto_light("grayscale".to_string(), "Gray Scale".to_string()),
            TileLayer::national_geographic(
                "national_geographic".to_string(),
                "National Geographic".to_string(),
            ),
            TileLayer::open_topo_map("topography".to_string(), "Topography".to_string()),
        ];
        let mut registry = Self { layers, active: 0 };
        registry.sync_visibility();
        registry
    }

    /// Names in display order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|layer| layer.name())
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|layer| layer.name() == name)
    }

    pub fn active(&self) -> &TileLayer {
        &self.layers[self.active]
    }

    pub fn active_name(&self) -> &str {
        self.active().name()
    }

    /// Makes `name` the only active basemap
    pub fn select(&mut self, name: &str) -> Result<&TileLayer> {
        let index = self
            .layers
            .iter()
            .position(|layer| layer.name() == name)
            .ok_or_else(|| MapError::UnknownBasemap(name.to_string()))?;

        if index != self.active {
            log::info!("basemap: {} -> {}", self.active_name(), name);
            self.active = index;
            self.sync_visibility();
        }
        Ok(&self.layers[self.active])
    }

    fn sync_visibility(&mut self) {
        let active = self.active;
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.set_visible(i == active);
        }
    }
}

impl Default for BasemapRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
