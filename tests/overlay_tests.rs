use async_trait::async_trait;
use quakemap::{
    background::OverlayLoader,
    core::map::{EARTHQUAKES_OVERLAY, PLATES_OVERLAY},
    layers::overlay::LoadState,
    prelude::*,
    style::DEPTH_BUCKETS,
};
use std::collections::HashMap as StdHashMap;
use tokio::sync::Barrier;

const PLATES_URL: &str = "mem://plates";
const QUAKES_URL: &str = "mem://quakes";

const EMPTY: &str = r#"{"type": "FeatureCollection", "features": []}"#;

const ONE_QUAKE: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "id": "us7000abcd",
     "properties": {"mag": 4, "place": "12 km SSW of Somewhere, Kansas"},
     "geometry": {"type": "Point", "coordinates": [-98.4842, 39.0119, 45]}}
]}"#;

const TWO_BOUNDARIES: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "properties": {"Name": "AF-AN"},
     "geometry": {"type": "LineString", "coordinates": [[-0.4, -54.8], [0.0, -54.5], [1.2, -54.1]]}},
    {"type": "Feature", "properties": {"Name": "AN-SA"},
     "geometry": {"type": "LineString", "coordinates": [[-30.0, -58.0], [-25.0, -56.5]]}}
]}"#;

/// Serves canned bodies; unknown URLs and `None` bodies fail like a 503.
/// With a barrier every fetch waits until all parties have started.
#[derive(Default)]
struct MemorySource {
    bodies: StdHashMap<String, Option<String>>,
    barrier: Option<Barrier>,
}

impl MemorySource {
    fn with(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), Some(body.to_string()));
        self
    }

    fn failing(mut self, url: &str) -> Self {
        self.bodies.insert(url.to_string(), None);
        self
    }

    fn rendezvous(mut self, parties: usize) -> Self {
        self.barrier = Some(Barrier::new(parties));
        self
    }
}

#[async_trait]
impl FeatureSource for MemorySource {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        match self.bodies.get(url) {
            Some(Some(body)) => Ok(body.clone()),
            _ => Err(MapError::Http {
                status: 503,
                url: url.to_string(),
            }),
        }
    }
}

fn test_map() -> Map {
    MapBuilder::new()
        .with_plates_url(PLATES_URL)
        .with_earthquakes_url(QUAKES_URL)
        .with_center_and_zoom(LatLng::new(39.0119, -98.4842), 4.0)
        .with_size(800.0, 600.0)
        .build()
        .unwrap()
}

#[cfg(test)]
mod overlay_tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_single_earthquake_fixture() {
        let source = MemorySource::default()
            .with(PLATES_URL, EMPTY)
            .with(QUAKES_URL, ONE_QUAKE);
        let mut map = test_map();

        let report = map.load_overlays(&source).await.unwrap();
        assert_eq!(report.earthquakes.feature_count(), 1);

        let layer = map.overlay(EARTHQUAKES_OVERLAY).unwrap();
        assert_eq!(layer.marker_count(), 1);
        match &layer.features()[0] {
            VectorFeature::CircleMarker { style, popup, .. } => {
                assert_eq!(style.fill_color, DEPTH_BUCKETS[2].color);
                assert_eq!(style.fill_color.to_hex(), "#fce703");
                assert_eq!(style.radius, 12.0);
                let text = popup.as_ref().unwrap().text();
                assert!(text.contains("Magnitude: 4"));
                assert!(text.contains("Depth: 45"));
                assert!(text.contains("12 km SSW of Somewhere, Kansas"));
            }
            other => panic!("expected a circle marker, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_feeds_yield_no_markers() {
        let source = MemorySource::default()
            .with(PLATES_URL, EMPTY)
            .with(QUAKES_URL, EMPTY);
        let mut map = test_map();

        let report = map.load_overlays(&source).await.unwrap();
        assert_eq!(
            report.plates,
            FetchOutcome::Loaded {
                features: 0,
                skipped: 0
            }
        );
        assert!(!report.earthquakes.is_failed());
        assert!(map.overlays().iter().all(|layer| layer.is_empty()));
        assert!(map.overlays_settled());
        assert!(map.status_line().contains("no data"));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_empty() {
        let source = MemorySource::default()
            .with(PLATES_URL, TWO_BOUNDARIES)
            .failing(QUAKES_URL);
        let mut map = test_map();

        let report = map.load_overlays(&source).await.unwrap();
        assert_eq!(report.plates.feature_count(), 2);
        assert!(report.earthquakes.is_failed());

        let quakes = map.overlay(EARTHQUAKES_OVERLAY).unwrap();
        assert!(matches!(quakes.state(), LoadState::Failed { reason } if reason.contains("503")));
        // one failure leaves the other overlay intact
        assert_eq!(map.overlay(PLATES_OVERLAY).unwrap().len(), 2);
        assert!(map.status_line().contains("failed"));
    }

    #[tokio::test]
    async fn test_malformed_feed_fails() {
        let source = MemorySource::default()
            .with(PLATES_URL, "{not json")
            .with(QUAKES_URL, ONE_QUAKE);
        let mut map = test_map();

        let report = map.load_overlays(&source).await.unwrap();
        assert!(report.plates.is_failed());
        assert_eq!(report.earthquakes.feature_count(), 1);
    }

    #[tokio::test]
    async fn test_feeds_are_fetched_concurrently() {
        // each fetch blocks until the other one has started
        let source = MemorySource::default()
            .with(PLATES_URL, TWO_BOUNDARIES)
            .with(QUAKES_URL, ONE_QUAKE)
            .rendezvous(2);
        let mut map = test_map();

        let report = tokio::time::timeout(Duration::from_secs(5), map.load_overlays(&source))
            .await
            .expect("fetches were serialized")
            .unwrap();
        assert_eq!(report.plates.feature_count(), 2);
        assert_eq!(report.earthquakes.feature_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_spawned_loader_settles_both_overlays() {
        let source: Arc<dyn FeatureSource> = Arc::new(
            MemorySource::default()
                .with(PLATES_URL, TWO_BOUNDARIES)
                .with(QUAKES_URL, ONE_QUAKE)
                .rendezvous(2),
        );
        let mut map = test_map();

        let loader =
            OverlayLoader::spawn(&tokio::runtime::Handle::current(), source, map.config());
        assert_eq!(loader.pending(), 2);

        let report = tokio::time::timeout(Duration::from_secs(5), loader.finish(&mut map))
            .await
            .expect("tasks did not finish")
            .unwrap();
        assert_eq!(report.plates.feature_count(), 2);
        assert_eq!(report.earthquakes.feature_count(), 1);
        assert!(map.overlays_settled());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_polling_loader_reports_each_feed_once() {
        let source: Arc<dyn FeatureSource> = Arc::new(
            MemorySource::default()
                .with(PLATES_URL, EMPTY)
                .failing(QUAKES_URL),
        );
        let mut map = test_map();
        let mut loader =
            OverlayLoader::spawn(&tokio::runtime::Handle::current(), source, map.config());

        let mut seen = Vec::new();
        for _ in 0..100 {
            seen.extend(loader.poll(&mut map).unwrap());
            if loader.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert!(loader.is_finished());
        assert_eq!(seen.len(), 2);
        let quakes = seen
            .iter()
            .find(|(kind, _)| *kind == FeedKind::Earthquakes)
            .unwrap();
        assert!(quakes.1.is_failed());
        assert!(map.overlays_settled());
        assert!(loader.poll(&mut map).unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_polling_loader_applies_feeds_after_a_rejected_one() {
        let source: Arc<dyn FeatureSource> = Arc::new(
            MemorySource::default()
                .with(PLATES_URL, EMPTY)
                .with(QUAKES_URL, EMPTY),
        );
        let mut map = test_map();
        // plates already settled, so applying them again is rejected
        map.apply_feed(FeedKind::Plates, GeoJson::parse(EMPTY))
            .unwrap();

        let mut loader =
            OverlayLoader::spawn(&tokio::runtime::Handle::current(), source, map.config());
        // let both tasks finish so one poll sees them together
        tokio::time::sleep(Duration::from_millis(300)).await;

        let mut errors = Vec::new();
        for _ in 0..100 {
            if let Err(e) = loader.poll(&mut map) {
                errors.push(e);
            }
            if loader.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert!(loader.is_finished());
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], MapError::Layer(_)));

        let quakes = map.overlay(EARTHQUAKES_OVERLAY).unwrap();
        assert_eq!(
            quakes.state(),
            &LoadState::Loaded {
                features: 0,
                skipped: 0
            }
        );
        assert!(map.overlays_settled());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_finished_loader_applies_feeds_after_a_rejected_one() {
        let source: Arc<dyn FeatureSource> = Arc::new(
            MemorySource::default()
                .with(PLATES_URL, EMPTY)
                .with(QUAKES_URL, ONE_QUAKE),
        );
        let mut map = test_map();
        map.apply_feed(FeedKind::Plates, GeoJson::parse(EMPTY))
            .unwrap();

        let loader =
            OverlayLoader::spawn(&tokio::runtime::Handle::current(), source, map.config());
        let result = loader.finish(&mut map).await;

        assert!(matches!(result, Err(MapError::Layer(_))));
        assert_eq!(map.overlay(EARTHQUAKES_OVERLAY).unwrap().len(), 1);
        assert!(map.overlays_settled());
    }

    #[tokio::test]
    async fn test_overlay_populates_only_once() {
        let source = MemorySource::default()
            .with(PLATES_URL, EMPTY)
            .with(QUAKES_URL, ONE_QUAKE);
        let mut map = test_map();
        map.load_overlays(&source).await.unwrap();

        let again = map.load_overlays(&source).await;
        assert!(matches!(again, Err(MapError::Layer(_))));
        assert_eq!(map.overlay(EARTHQUAKES_OVERLAY).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_click_marker_shows_popup() {
        let source = MemorySource::default()
            .with(PLATES_URL, EMPTY)
            .with(QUAKES_URL, ONE_QUAKE);
        let mut map = test_map();
        map.load_overlays(&source).await.unwrap();

        // the marker sits at the view center
        let popup = map.handle_click(Point::new(400.0, 300.0)).unwrap();
        assert!(popup.content.text().contains("Magnitude: 4"));
        assert!(map.popups().is_open());

        assert!(map.handle_click(Point::new(10.0, 10.0)).is_none());
        assert!(!map.popups().is_open());
    }

    #[test]
    fn test_layer_control_shape() {
        let mut map = test_map();
        let mut control = LayerControl::from_map(&map);

        assert_eq!(control.basemap_options().len(), 4);
        assert_eq!(control.overlay_toggles().len(), 2);

        for name in ["Gray Scale", "National Geographic", "Topography", "Default"] {
            control.choose_basemap(name);
            control.apply(&mut map).unwrap();
            assert_eq!(map.active_basemap().name(), name);
            let selected = LayerControl::from_map(&map)
                .basemap_options()
                .iter()
                .filter(|o| o.selected)
                .count();
            assert_eq!(selected, 1);
        }

        control.set_overlay(EARTHQUAKES_OVERLAY, false);
        control.apply(&mut map).unwrap();
        assert!(map.overlay(PLATES_OVERLAY).unwrap().is_visible());
        assert!(!map.overlay(EARTHQUAKES_OVERLAY).unwrap().is_visible());
    }

    #[test]
    fn test_legend_matches_marker_colors() {
        let map = test_map();
        let legend = map.legend();

        assert_eq!(legend.rows.len(), 6);
        assert!(legend.rows.last().unwrap().label.ends_with('+'));
        for (row, bucket) in legend.rows.iter().zip(map.depth_scale().buckets()) {
            assert_eq!(row.color, bucket.color);
            assert_eq!(map.depth_scale().color_for(bucket.lower_km + 1.0), bucket.color);
        }
    }
}
