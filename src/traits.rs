//! Shared trait abstractions for the resources threaded through a frame
//!
//! Every handle carried by [`UpdateParameters`](crate::update::UpdateParameters)
//! is a borrow of one of these traits. Implementations are long-lived, shared
//! between the render thread and the worker pool, and must be usable from both
//! at once.

use crate::tiles::file_source::{RequestId, Resource, Response};
use crate::update::UpdateParameters;
use crate::Result;

/// Unit of work executed by a [`Scheduler`]
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Callback invoked exactly once with the outcome of a [`FileSource`] request
pub type ResponseCallback = Box<dyn FnOnce(Response) + Send + 'static>;

/// Shared worker pool running tile fetch and decode work
pub trait Scheduler: Send + Sync {
    /// Queue a task. Never blocks on the task itself; a full or stopped
    /// scheduler rejects the task instead.
    fn schedule(&self, task: Task) -> Result<()>;

    /// Human readable name used in log output
    fn name(&self) -> &str {
        "scheduler"
    }
}

/// Shared tile retrieval from network and/or local cache
pub trait FileSource: Send + Sync {
    /// Issue a request. The callback may run on any thread, possibly before
    /// this method returns.
    fn request(&self, resource: Resource, callback: ResponseCallback) -> RequestId;

    /// Whether the resource can be answered without touching the network
    fn is_cached(&self, _resource: &Resource) -> bool {
        false
    }
}

/// Blocking byte fetcher used by file sources on worker threads
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// The style subsystem driven once per frame
pub trait Style: Send + Sync {
    /// Consume the frame's parameters. Must return promptly; tile work is
    /// handed to the scheduler rather than awaited.
    fn update(&self, parameters: &UpdateParameters<'_>);
}

/// Manager of user-added overlays. Only its handle crosses the frame seam.
pub trait AnnotationManager: Send + Sync {
    /// Monotonic counter bumped whenever annotations change
    fn revision(&self) -> u64;
}

/// Delay to wait before attempt `retry_count + 1`
pub fn backoff_delay(retry_count: u32, retry_delay_ms: u64, exponential_backoff: bool) -> u64 {
    if exponential_backoff {
        retry_delay_ms.saturating_mul(2_u64.saturating_pow(retry_count))
    } else {
        retry_delay_ms
    }
}
