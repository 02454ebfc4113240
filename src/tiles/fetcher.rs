use crate::core::config::FileSourceConfig;
use crate::prelude::HashMap;
use crate::traits::{backoff_delay, Fetcher};
use crate::{Error, Result};
use reqwest::blocking::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Blocking HTTP fetcher with retry and backoff
///
/// Runs on scheduler workers. The underlying client is blocking, so it must
/// not be created or used from inside an async task.
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    retry_delay_ms: u64,
    exponential_backoff: bool,
}

impl HttpFetcher {
    pub fn new(config: &FileSourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(16)
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
            exponential_backoff: config.exponential_backoff,
        })
    }

    fn fetch_once(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound(url.to_string()));
        }
        let response = response.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            log::debug!("fetch {} attempt {}", url, attempt + 1);
            match self.fetch_once(url) {
                Ok(data) => {
                    log::debug!("downloaded {} ({} bytes)", url, data.len());
                    return Ok(data);
                }
                // a missing tile will stay missing
                Err(err @ Error::NotFound(_)) => return Err(err),
                Err(err) if attempt >= self.max_retries => {
                    log::error!("giving up on {} after {} attempts: {}", url, attempt + 1, err);
                    return Err(err);
                }
                Err(err) => {
                    log::warn!("fetch {} failed on attempt {}: {}", url, attempt + 1, err);
                    let delay = backoff_delay(attempt, self.retry_delay_ms, self.exponential_backoff);
                    std::thread::sleep(Duration::from_millis(delay));
                    attempt += 1;
                }
            }
        }
    }
}

/// Fetcher answering from a fixed table; used by tests and offline demos
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: Mutex<HashMap<String, Vec<u8>>>,
    requests: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, url: impl Into<String>, data: Vec<u8>) -> Self {
        self.insert(url, data);
        self
    }

    pub fn insert(&self, url: impl Into<String>, data: Vec<u8>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(url.into(), data);
        }
    }

    /// Number of fetches attempted, hits and misses alike
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Acquire)
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.fetch_add(1, Ordering::AcqRel);
        self.responses
            .lock()
            .map_err(|_| Error::NotFound(url.to_string()))?
            .get(url)
            .cloned()
            .ok_or_else(|| Error::NotFound(url.to_string()))
    }
}
