//! Default [`FileSource`]: an LRU cache in front of a [`Fetcher`], gated by the
//! network mode and running fetches on the shared scheduler
//!
//! The network mode is read once per request, when it is issued. Online
//! requests that miss the cache are fetched on a worker and cached; offline
//! requests are answered from the cache or fail with [`Error::Offline`]. A
//! fetch already handed to a worker completes even if the mode flips to
//! offline in the meantime.

use crate::core::config::FileSourceConfig;
use crate::core::geo::TileCoord;
use crate::network::{NetworkMode, NetworkStatus};
use crate::tiles::cache::TileCache;
use crate::tiles::fetcher::HttpFetcher;
use crate::tiles::TilePriority;
use crate::traits::{Fetcher, FileSource, ResponseCallback, Scheduler};
use crate::{Error, Result};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub type RequestId = u64;

/// A tile to load and where to load it from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    pub url: String,
    pub tile: TileCoord,
    pub priority: TilePriority,
}

impl Resource {
    pub fn tile(url: impl Into<String>, coord: TileCoord, priority: TilePriority) -> Self {
        Self {
            url: url.into(),
            tile: coord,
            priority,
        }
    }
}

/// Outcome of one request
#[derive(Debug)]
pub struct Response {
    pub resource: Resource,
    pub data: Result<Arc<Vec<u8>>>,
    /// Answered from the cache without a fetch
    pub from_cache: bool,
    /// Network mode the request was issued under
    pub mode: NetworkMode,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        self.data.is_ok()
    }
}

/// Counters describing how requests were answered
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileSourceStats {
    pub requests: usize,
    pub cache_hits: usize,
    pub fetches: usize,
    pub offline_misses: usize,
    pub failures: usize,
}

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicUsize,
    cache_hits: AtomicUsize,
    fetches: AtomicUsize,
    offline_misses: AtomicUsize,
    failures: AtomicUsize,
}

pub struct DefaultFileSource {
    cache: TileCache,
    fetcher: Arc<dyn Fetcher>,
    scheduler: Arc<dyn Scheduler>,
    network: Arc<NetworkStatus>,
    next_id: AtomicU64,
    counters: Arc<Counters>,
}

impl DefaultFileSource {
    /// HTTP-backed file source
    pub fn new(
        config: &FileSourceConfig,
        scheduler: Arc<dyn Scheduler>,
        network: Arc<NetworkStatus>,
    ) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(config)?);
        Ok(Self::with_fetcher(config.cache_size, fetcher, scheduler, network))
    }

    pub fn with_fetcher(
        cache_size: usize,
        fetcher: Arc<dyn Fetcher>,
        scheduler: Arc<dyn Scheduler>,
        network: Arc<NetworkStatus>,
    ) -> Self {
        Self {
            cache: TileCache::new(cache_size),
            fetcher,
            scheduler,
            network,
            next_id: AtomicU64::new(1),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn network(&self) -> &NetworkStatus {
        &self.network
    }

    pub fn stats(&self) -> FileSourceStats {
        let counters = &self.counters;
        FileSourceStats {
            requests: counters.requests.load(Ordering::Acquire),
            cache_hits: counters.cache_hits.load(Ordering::Acquire),
            fetches: counters.fetches.load(Ordering::Acquire),
            offline_misses: counters.offline_misses.load(Ordering::Acquire),
            failures: counters.failures.load(Ordering::Acquire),
        }
    }
}

impl FileSource for DefaultFileSource {
    fn request(&self, resource: Resource, callback: ResponseCallback) -> RequestId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mode = self.network.get();
        self.counters.requests.fetch_add(1, Ordering::AcqRel);

        if let Some(data) = self.cache.get(&resource.url) {
            self.counters.cache_hits.fetch_add(1, Ordering::AcqRel);
            callback(Response {
                resource,
                data: Ok(data),
                from_cache: true,
                mode,
            });
            return id;
        }

        if !mode.allows_network() {
            log::debug!("request {} for {} unanswerable offline", id, resource.url);
            self.counters.offline_misses.fetch_add(1, Ordering::AcqRel);
            let url = resource.url.clone();
            callback(Response {
                resource,
                data: Err(Error::Offline(url)),
                from_cache: false,
                mode,
            });
            return id;
        }

        // Shared with the task so a rejected schedule can still answer
        let slot = Arc::new(Mutex::new(Some((resource, callback))));
        let task_slot = Arc::clone(&slot);
        let cache = self.cache.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let counters = Arc::clone(&self.counters);

        let scheduled = self.scheduler.schedule(Box::new(move || {
            let Some((resource, callback)) = task_slot.lock().ok().and_then(|mut s| s.take()) else {
                return;
            };
            counters.fetches.fetch_add(1, Ordering::AcqRel);
            let data = fetcher
                .fetch(&resource.url)
                .map(|bytes| cache.insert(resource.url.clone(), bytes));
            if let Err(err) = &data {
                counters.failures.fetch_add(1, Ordering::AcqRel);
                log::warn!("request {} for {} failed: {}", id, resource.url, err);
            }
            callback(Response {
                resource,
                data,
                from_cache: false,
                mode,
            });
        }));

        if let Err(err) = scheduled {
            if let Some((resource, callback)) = slot.lock().ok().and_then(|mut s| s.take()) {
                log::warn!("request {} for {} not scheduled: {}", id, resource.url, err);
                self.counters.failures.fetch_add(1, Ordering::AcqRel);
                callback(Response {
                    resource,
                    data: Err(err),
                    from_cache: false,
                    mode,
                });
            }
        }

        id
    }

    fn is_cached(&self, resource: &Resource) -> bool {
        self.cache.contains(&resource.url)
    }
}
