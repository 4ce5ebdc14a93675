use super::{cache::TileKey, source::TileSource};
use crate::{
    core::{
        config::{FetchConfig, TileLoadingConfig},
        geo::TileCoord,
    },
    prelude::HashSet,
    MapError, Result,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use reqwest::blocking::Client;
use std::{thread, time::Duration};

/// A finished download, successful or not
#[derive(Debug)]
pub struct TileResult {
    pub key: TileKey,
    pub data: Result<Vec<u8>>,
}

/// Fetches tiles on background threads and reports them over a channel.
/// A key is requested at most once while in flight; keys that failed after
/// all retries are not requested again.
pub struct TileLoader {
    client: Client,
    config: TileLoadingConfig,
    tx: Sender<TileResult>,
    rx: Receiver<TileResult>,
    in_flight: HashSet<TileKey>,
    failed: HashSet<TileKey>,
}

impl TileLoader {
    /// Builds the shared blocking client. Must not be called from inside an
    /// async runtime.
    pub fn new(fetch: &FetchConfig, config: TileLoadingConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(fetch.user_agent.as_str())
            .timeout(fetch.timeout())
            .build()?;
        let (tx, rx) = unbounded();

        Ok(Self {
            client,
            config,
            tx,
            rx,
            in_flight: HashSet::default(),
            failed: HashSet::default(),
        })
    }

    pub fn retina(&self) -> bool {
        self.config.retina
    }

    /// Starts downloading `coord` from `source` unless it is already in
    /// flight or known to fail. Returns whether a download was started.
    pub fn request(&mut self, source: &dyn TileSource, coord: TileCoord) -> bool {
        let key = TileKey::new(source.source_id(), coord);
        if self.in_flight.contains(&key) || self.failed.contains(&key) {
            return false;
        }

        let url = source.url(&coord, self.config.retina);
        let client = self.client.clone();
        let tx = self.tx.clone();
        let attempts = self.config.max_retries + 1;
        let retry_delay = self.config.retry_delay();
        self.in_flight.insert(key.clone());

        thread::spawn(move || {
            let data = download_with_retries(&client, &url, attempts, retry_delay);
            // the receiver is gone when the loader was dropped
            let _ = tx.send(TileResult { key, data });
        });
        true
    }

    /// Drains finished downloads without blocking
    pub fn poll(&mut self) -> Vec<TileResult> {
        let results: Vec<_> = self.rx.try_iter().collect();
        for result in &results {
            self.settle(result);
        }
        results
    }

    /// Waits up to `timeout` for the next finished download
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<TileResult> {
        let result = self.rx.recv_timeout(timeout).ok()?;
        self.settle(&result);
        Some(result)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn has_failed(&self, key: &TileKey) -> bool {
        self.failed.contains(key)
    }

    fn settle(&mut self, result: &TileResult) {
        self.in_flight.remove(&result.key);
        if result.data.is_err() {
            self.failed.insert(result.key.clone());
        }
    }
}

fn download_with_retries(
    client: &Client,
    url: &str,
    attempts: u32,
    retry_delay: Duration,
) -> Result<Vec<u8>> {
    let mut attempt = 1;
    loop {
        log::debug!("fetch tile {} attempt {}", url, attempt);
        match download(client, url) {
            Ok(data) => {
                log::debug!("downloaded tile {} ({} bytes)", url, data.len());
                return Ok(data);
            }
            Err(e) if attempt < attempts => {
                log::debug!("tile {} attempt {} failed: {}", url, attempt, e);
                thread::sleep(retry_delay);
                attempt += 1;
            }
            Err(e) => {
                log::warn!("giving up on tile {}: {}", url, e);
                return Err(e);
            }
        }
    }
}

fn download(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(MapError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.bytes()?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on port 1, so requests fail fast without network access
    struct Unreachable;

    impl TileSource for Unreachable {
        fn source_id(&self) -> &str {
            "unreachable"
        }

        fn url(&self, coord: &TileCoord, _retina: bool) -> String {
            format!("http://127.0.0.1:1/{}/{}/{}.png", coord.z, coord.x, coord.y)
        }
    }

    fn loader() -> TileLoader {
        let tiles = TileLoadingConfig {
            max_retries: 0,
            retry_delay_ms: 0,
            ..Default::default()
        };
        let fetch = FetchConfig {
            timeout_secs: 5,
            ..Default::default()
        };
        TileLoader::new(&fetch, tiles).unwrap()
    }

    #[test]
    fn test_request_is_deduplicated() {
        let mut loader = loader();
        let coord = TileCoord::new(1, 1, 1);

        assert!(loader.request(&Unreachable, coord));
        assert!(!loader.request(&Unreachable, coord));
        assert_eq!(loader.in_flight(), 1);
    }

    #[test]
    fn test_failure_is_reported_and_remembered() {
        let mut loader = loader();
        let coord = TileCoord::new(0, 0, 0);
        loader.request(&Unreachable, coord);

        let result = loader.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(result.key, TileKey::new("unreachable", coord));
        assert!(result.data.is_err());

        assert!(!loader.is_loading());
        assert!(loader.has_failed(&result.key));
        assert!(!loader.request(&Unreachable, coord));
    }
}
