use crate::{
    constants::CLICK_TOLERANCE,
    core::{
        config::MapConfig,
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    data::{
        feeds::{fetch_collection, render_earthquakes, render_plates, FeatureSource, Rendered},
        geojson::GeoJson,
    },
    layers::{
        base::LayerTrait,
        basemap::BasemapRegistry,
        manager::LayerManager,
        overlay::{LoadState, OverlayLayer},
        tile::TileLayer,
        vector::VectorFeature,
    },
    spatial::index::{SpatialIndex, SpatialItem},
    style::DepthScale,
    ui::{
        legend::Legend,
        popup::{Popup, PopupManager},
    },
    MapError, Result,
};

/// Display name of the plate-boundary overlay
pub const PLATES_OVERLAY: &str = "Tectonic Plates";

/// Display name of the earthquake overlay
pub const EARTHQUAKES_OVERLAY: &str = "Earthquake Data";

/// The two overlay feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Plates,
    Earthquakes,
}

impl FeedKind {
    /// Control order: plates first
    pub const ALL: [FeedKind; 2] = [FeedKind::Plates, FeedKind::Earthquakes];

    pub fn layer_id(&self) -> &'static str {
        match self {
            FeedKind::Plates => "tectonic_plates",
            FeedKind::Earthquakes => "earthquakes",
        }
    }

    pub fn layer_name(&self) -> &'static str {
        match self {
            FeedKind::Plates => PLATES_OVERLAY,
            FeedKind::Earthquakes => EARTHQUAKES_OVERLAY,
        }
    }

    pub fn url<'a>(&self, config: &'a MapConfig) -> &'a str {
        match self {
            FeedKind::Plates => &config.feeds.plates_url,
            FeedKind::Earthquakes => &config.feeds.earthquakes_url,
        }
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.layer_name())
    }
}

/// What happened to one feed. An empty feed is `Loaded` with zero
/// features, never `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded { features: usize, skipped: usize },
    Failed { reason: String },
}

impl FetchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed { .. })
    }

    pub fn feature_count(&self) -> usize {
        match self {
            FetchOutcome::Loaded { features, .. } => *features,
            FetchOutcome::Failed { .. } => 0,
        }
    }
}

/// Outcome of both feeds after a joined load
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayReport {
    pub plates: FetchOutcome,
    pub earthquakes: FetchOutcome,
}

// Marker entry in the hit-test index: feature slot and pixel radius.
#[derive(Debug, Clone, Copy)]
struct MarkerRef {
    feature: usize,
    radius: f64,
}

/// One interactive map session: view, basemaps, overlays, legend, popups
pub struct Map {
    config: MapConfig,
    viewport: Viewport,
    basemaps: BasemapRegistry,
    overlays: LayerManager,
    depth_scale: DepthScale,
    legend: Legend,
    popups: PopupManager,
    /// Earthquake markers at zoom-0 world pixels
    markers: SpatialIndex<MarkerRef>,
    max_marker_radius: f64,
}

impl Map {
    /// Stock map: the four standard basemaps and the default depth scale
    pub fn new(config: MapConfig) -> Self {
        Self::from_parts(
            config,
            BasemapRegistry::standard(),
            DepthScale::default(),
            Point::new(800.0, 600.0),
        )
    }

    pub(crate) fn from_parts(
        config: MapConfig,
        basemaps: BasemapRegistry,
        depth_scale: DepthScale,
        size: Point,
    ) -> Self {
        let mut viewport = Viewport::new(config.view.center, config.view.zoom, size);
        viewport.set_zoom_limits(config.view.min_zoom, basemaps.active().max_zoom() as f64);

        let mut overlays = LayerManager::new();
        for (z_index, kind) in (1..).zip(FeedKind::ALL) {
            let layer = OverlayLayer::new(kind.layer_id().to_string(), kind.layer_name().to_string())
                .with_z_index(z_index);
            // ids are distinct constants
            if let Err(e) = overlays.add_layer(Box::new(layer)) {
                log::error!("{}", e);
            }
        }

        let legend = Legend::from_scale(&depth_scale);

        Self {
            config,
            viewport,
            basemaps,
            overlays,
            depth_scale,
            legend,
            popups: PopupManager::new(),
            markers: SpatialIndex::new(),
            max_marker_radius: 0.0,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Recenters and zooms (zoom is clamped to the active basemap)
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);
    }

    pub fn basemaps(&self) -> &BasemapRegistry {
        &self.basemaps
    }

    pub fn active_basemap(&self) -> &TileLayer {
        self.basemaps.active()
    }

    /// Switches the basemap and limits zoom to what it serves
    pub fn select_basemap(&mut self, name: &str) -> Result<()> {
        let max_zoom = self.basemaps.select(name)?.max_zoom() as f64;
        self.viewport
            .set_zoom_limits(self.config.view.min_zoom, max_zoom);
        Ok(())
    }

    /// Overlays in z-index order, which is also control order
    pub fn overlays(&self) -> Vec<&OverlayLayer> {
        self.overlays
            .layers()
            .into_iter()
            .filter_map(|layer| layer.as_any().downcast_ref::<OverlayLayer>())
            .collect()
    }

    pub fn overlay(&self, name: &str) -> Option<&OverlayLayer> {
        let id = self.overlays.find_by_name(name)?;
        self.overlays.get_as::<OverlayLayer>(id)
    }

    pub fn overlay_for(&self, kind: FeedKind) -> Option<&OverlayLayer> {
        self.overlays.get_as::<OverlayLayer>(kind.layer_id())
    }

    pub fn set_overlay_visible(&mut self, name: &str, visible: bool) -> Result<()> {
        let id = self
            .overlays
            .find_by_name(name)
            .ok_or_else(|| MapError::UnknownOverlay(name.to_string()))?
            .to_string();
        self.overlays.with_layer_mut(&id, |layer| layer.set_visible(visible));

        if name == EARTHQUAKES_OVERLAY && !visible {
            self.popups.close();
        }
        log::debug!("overlay '{}' visible={}", name, visible);
        Ok(())
    }

    pub fn depth_scale(&self) -> &DepthScale {
        &self.depth_scale
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn popups(&self) -> &PopupManager {
        &self.popups
    }

    pub fn popups_mut(&mut self) -> &mut PopupManager {
        &mut self.popups
    }

    /// Populates the overlay for `kind` from a fetch result, or records
    /// the failure. Errors only when the overlay was already settled.
    pub fn apply_feed(&mut self, kind: FeedKind, result: Result<GeoJson>) -> Result<FetchOutcome> {
        let rendered = match result {
            Ok(doc) => Ok(match kind {
                FeedKind::Plates => render_plates(&doc),
                FeedKind::Earthquakes => render_earthquakes(&doc, &self.depth_scale),
            }),
            Err(e) => Err(e.to_string()),
        };

        let layer = self
            .overlays
            .get_as_mut::<OverlayLayer>(kind.layer_id())
            .ok_or_else(|| MapError::UnknownOverlay(kind.layer_name().to_string()))?;

        let outcome = match rendered {
            Ok(Rendered { features, skipped }) => {
                let count = features.len();
                layer.populate(features, skipped)?;
                if count == 0 {
                    log::info!("{}: feed is empty", kind);
                } else {
                    log::info!("{}: {} features ({} skipped)", kind, count, skipped);
                }
                FetchOutcome::Loaded {
                    features: count,
                    skipped,
                }
            }
            Err(reason) => {
                layer.fail(reason.clone())?;
                log::warn!("{}: load failed: {}", kind, reason);
                FetchOutcome::Failed { reason }
            }
        };

        if kind == FeedKind::Earthquakes {
            self.rebuild_marker_index();
        }
        Ok(outcome)
    }

    /// Fetches both feeds concurrently and applies each result
    pub async fn load_overlays(&mut self, source: &dyn FeatureSource) -> Result<OverlayReport> {
        let plates_url = self.config.feeds.plates_url.clone();
        let earthquakes_url = self.config.feeds.earthquakes_url.clone();
        log::info!("loading overlays");

        let (plates, earthquakes) = futures::join!(
            fetch_collection(source, &plates_url),
            fetch_collection(source, &earthquakes_url)
        );

        Ok(OverlayReport {
            plates: self.apply_feed(FeedKind::Plates, plates)?,
            earthquakes: self.apply_feed(FeedKind::Earthquakes, earthquakes)?,
        })
    }

    /// True once both overlays have loaded or failed
    pub fn overlays_settled(&self) -> bool {
        self.overlays().iter().all(|layer| layer.state().is_settled())
    }

    /// Opens the popup of the earthquake marker under `pixel` (container
    /// pixels), or closes the open popup when nothing is hit.
    pub fn handle_click(&mut self, pixel: Point) -> Option<&Popup> {
        match self.hit_test(pixel) {
            Some(popup) => self.popups.open(popup),
            None => {
                self.popups.close();
            }
        }
        self.popups.current()
    }

    fn hit_test(&self, pixel: Point) -> Option<Popup> {
        let layer = self.overlay_for(FeedKind::Earthquakes)?;
        if !layer.is_visible() || self.markers.is_empty() {
            return None;
        }

        let scale = Viewport::world_size(self.viewport.zoom) / Viewport::world_size(0.0);
        let world = pixel.add(&self.viewport.pixel_origin()).multiply(1.0 / scale);
        let reach = (self.max_marker_radius + CLICK_TOLERANCE) / scale;

        // Later markers are drawn on top
        let hit = self
            .markers
            .query_radius(&world, reach)
            .into_iter()
            .filter(|item| {
                item.position.distance_to(&world) * scale <= item.data.radius + CLICK_TOLERANCE
            })
            .max_by_key(|item| item.data.feature)?;

        match &layer.features()[hit.data.feature] {
            VectorFeature::CircleMarker {
                position,
                popup: Some(content),
                ..
            } => Some(Popup::new(*position, content.clone())),
            _ => None,
        }
    }

    fn rebuild_marker_index(&mut self) {
        let Some(layer) = self.overlays.get_as::<OverlayLayer>(FeedKind::Earthquakes.layer_id())
        else {
            return;
        };

        let items: Vec<_> = layer
            .features()
            .iter()
            .enumerate()
            .filter_map(|(feature, f)| match f {
                VectorFeature::CircleMarker {
                    position, style, ..
                } => Some(SpatialItem::new(
                    self.viewport.project(position, Some(0.0)),
                    MarkerRef {
                        feature,
                        radius: style.radius.abs(),
                    },
                )),
                _ => None,
            })
            .collect();

        self.max_marker_radius = items
            .iter()
            .map(|item| item.data.radius)
            .fold(0.0, f64::max);
        log::debug!("indexed {} earthquake markers", items.len());
        self.markers = SpatialIndex::bulk_load(items);
    }

    /// Short text describing the load state of both overlays
    pub fn status_line(&self) -> String {
        self.overlays()
            .iter()
            .map(|layer| {
                let state = match layer.state() {
                    LoadState::Pending => "loading…".to_string(),
                    LoadState::Loaded { features: 0, .. } => "no data".to_string(),
                    LoadState::Loaded { features, .. } => format!("{} features", features),
                    LoadState::Failed { reason } => format!("failed ({})", reason),
                };
                format!("{}: {}", layer.name(), state)
            })
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new(MapConfig::default())
    }
}
