use crate::{layers::base::LayerTrait, prelude::HashMap, MapError, Result};

/// Owns layers by id and keeps them in z-index order
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Layer IDs sorted by z-index, insertion order breaking ties
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Adds a layer; ids must be unique
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        if self.layers.contains_key(&layer_id) {
            return Err(MapError::Layer(format!("duplicate layer id '{}'", layer_id)));
        }
        let z_index = layer.z_index();

        self.layers.insert(layer_id.clone(), layer);

        let insert_pos = self
            .render_order
            .iter()
            .position(|id| {
                self.layers
                    .get(id)
                    .map(|l| l.z_index() > z_index)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, layer_id);
        Ok(())
    }

    /// Applies a function to a specific layer mutably
    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layers.get_mut(layer_id).map(|layer| f(layer.as_mut()))
    }

    /// Downcasts a layer to its concrete type
    pub fn get_as<T: 'static>(&self, layer_id: &str) -> Option<&T> {
        self.layers.get(layer_id)?.as_any().downcast_ref::<T>()
    }

    pub fn get_as_mut<T: 'static>(&mut self, layer_id: &str) -> Option<&mut T> {
        self.layers.get_mut(layer_id)?.as_any_mut().downcast_mut::<T>()
    }

    /// Id of the layer with display name `name`
    pub fn find_by_name(&self, name: &str) -> Option<&str> {
        self.render_order
            .iter()
            .find(|id| self.layers.get(*id).is_some_and(|l| l.name() == name))
            .map(String::as_str)
    }

    /// Gets all layers in render order
    pub fn layers(&self) -> Vec<&dyn LayerTrait> {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|l| l.as_ref()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{overlay::OverlayLayer, tile::TileLayer};

    #[test]
    fn test_render_order_follows_z_index() {
        let mut manager = LayerManager::new();
        manager
            .add_layer(Box::new(
                OverlayLayer::new("quakes".into(), "Earthquake Data".into()).with_z_index(3),
            ))
            .unwrap();
        manager
            .add_layer(Box::new(
                OverlayLayer::new("plates".into(), "Tectonic Plates".into()).with_z_index(2),
            ))
            .unwrap();

        let order: Vec<_> = manager.layers().iter().map(|l| l.id().to_string()).collect();
        assert_eq!(order, vec!["plates", "quakes"]);
        assert_eq!(manager.find_by_name("Earthquake Data"), Some("quakes"));
        assert_eq!(manager.find_by_name("Nope"), None);
    }

    #[test]
    fn test_downcast_and_duplicates() {
        let mut manager = LayerManager::new();
        manager
            .add_layer(Box::new(OverlayLayer::new("plates".into(), "Tectonic Plates".into())))
            .unwrap();

        assert!(manager.get_as::<OverlayLayer>("plates").is_some());
        assert!(manager.get_as::<TileLayer>("plates").is_none());
        assert!(manager
            .add_layer(Box::new(OverlayLayer::new("plates".into(), "Again".into())))
            .is_err());
        assert_eq!(manager.len(), 1);
    }
}
