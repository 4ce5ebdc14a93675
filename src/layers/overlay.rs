use crate::{
    core::geo::LatLngBounds,
    layers::{
        base::{LayerProperties, LayerTrait, LayerType},
        vector::VectorFeature,
    },
    MapError, Result,
};

/// Load lifecycle of an overlay
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Pending,
    Loaded { features: usize, skipped: usize },
    Failed { reason: String },
}

impl LoadState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, LoadState::Pending)
    }
}

/// A named group of vector features, filled once from a feed
#[derive(Debug, Clone)]
pub struct OverlayLayer {
    properties: LayerProperties,
    state: LoadState,
    features: Vec<VectorFeature>,
}

impl OverlayLayer {
    pub fn new(id: String, name: String) -> Self {
        let mut properties = LayerProperties::new(id, name, LayerType::Overlay);
        properties.z_index = 1;
        Self {
            properties,
            state: LoadState::Pending,
            features: Vec::new(),
        }
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.properties.z_index = z_index;
        self
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn features(&self) -> &[VectorFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn marker_count(&self) -> usize {
        self.features.iter().filter(|f| f.is_marker()).count()
    }

    /// Fills the layer. Only a pending layer accepts features.
    pub fn populate(&mut self, features: Vec<VectorFeature>, skipped: usize) -> Result<()> {
        self.ensure_pending()?;
        self.state = LoadState::Loaded {
            features: features.len(),
            skipped,
        };
        self.features = features;
        Ok(())
    }

    /// Records a failed load; the layer stays empty
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.ensure_pending()?;
        self.state = LoadState::Failed {
            reason: reason.into(),
        };
        Ok(())
    }

    fn ensure_pending(&self) -> Result<()> {
        if self.state.is_settled() {
            return Err(MapError::Layer(format!(
                "overlay '{}' already loaded",
                self.properties.name
            )));
        }
        Ok(())
    }
}

impl LayerTrait for OverlayLayer {
    crate::impl_layer_trait!(OverlayLayer, properties);

    fn bounds(&self) -> Option<LatLngBounds> {
        self.features
            .iter()
            .filter_map(VectorFeature::bounds)
            .reduce(|acc, b| acc.union(&b))
    }
}
