use crate::{
    core::{
        config::MapConfig,
        map::{FeedKind, FetchOutcome, Map, OverlayReport},
    },
    data::{
        feeds::{fetch_collection, FeatureSource},
        geojson::GeoJson,
    },
    MapError, Result,
};
use futures::FutureExt;
use std::sync::Arc;
use tokio::{runtime::Handle, task::JoinHandle};

/// Runs the two feed fetches as independent tokio tasks and hands their
/// results to a [`Map`] as they finish. Meant to be polled once per frame.
pub struct OverlayLoader {
    pending: Vec<(FeedKind, JoinHandle<Result<GeoJson>>)>,
}

impl OverlayLoader {
    /// Spawns one task per feed on `handle`
    pub fn spawn(handle: &Handle, source: Arc<dyn FeatureSource>, config: &MapConfig) -> Self {
        let pending = FeedKind::ALL
            .iter()
            .map(|&kind| {
                let source = Arc::clone(&source);
                let url = kind.url(config).to_string();
                log::info!("{}: fetching {}", kind, url);
                let task = handle.spawn(async move { fetch_collection(source.as_ref(), &url).await });
                (kind, task)
            })
            .collect();

        Self { pending }
    }

    /// Applies every fetch that has finished since the last call and
    /// returns their outcomes. Never blocks. When applying a feed fails the
    /// remaining finished feeds are still applied and the first error is
    /// returned.
    pub fn poll(&mut self, map: &mut Map) -> Result<Vec<(FeedKind, FetchOutcome)>> {
        let mut finished = Vec::new();
        let mut still_running = Vec::new();

        for (kind, mut task) in self.pending.drain(..) {
            match (&mut task).now_or_never() {
                Some(joined) => finished.push((kind, flatten(joined))),
                None => still_running.push((kind, task)),
            }
        }
        self.pending = still_running;

        let mut outcomes = Vec::with_capacity(finished.len());
        let mut first_error = None;
        for (kind, result) in finished {
            match map.apply_feed(kind, result) {
                Ok(outcome) => outcomes.push((kind, outcome)),
                Err(e) => {
                    log::warn!("{}: could not apply feed: {}", kind, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(outcomes),
        }
    }

    /// Waits for both fetches and applies them, all of them even when one
    /// fails to apply
    pub async fn finish(self, map: &mut Map) -> Result<OverlayReport> {
        let mut plates = None;
        let mut earthquakes = None;
        let mut first_error = None;

        for (kind, task) in self.pending {
            let outcome = match map.apply_feed(kind, flatten(task.await)) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::warn!("{}: could not apply feed: {}", kind, e);
                    first_error.get_or_insert(e);
                    continue;
                }
            };
            match kind {
                FeedKind::Plates => plates = Some(outcome),
                FeedKind::Earthquakes => earthquakes = Some(outcome),
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        // feeds applied by an earlier poll are read back from their layers
        Ok(OverlayReport {
            plates: plates.unwrap_or_else(|| settled_outcome(map, FeedKind::Plates)),
            earthquakes: earthquakes
                .unwrap_or_else(|| settled_outcome(map, FeedKind::Earthquakes)),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

fn flatten(joined: std::result::Result<Result<GeoJson>, tokio::task::JoinError>) -> Result<GeoJson> {
    joined.map_err(|e| MapError::Task(e.to_string()))?
}

fn settled_outcome(map: &Map, kind: FeedKind) -> FetchOutcome {
    use crate::layers::overlay::LoadState;

    match map.overlay_for(kind).map(|layer| layer.state()) {
        Some(LoadState::Loaded { features, skipped }) => FetchOutcome::Loaded {
            features: *features,
            skipped: *skipped,
        },
        Some(LoadState::Failed { reason }) => FetchOutcome::Failed {
            reason: reason.clone(),
        },
        _ => FetchOutcome::Failed {
            reason: "not loaded".to_string(),
        },
    }
}
