//! Worker schedulers shared by the file source and the style
//!
//! [`ThreadPool`] is the default: a fixed set of named worker threads fed from
//! a bounded crossbeam channel. [`ImmediateScheduler`] runs every task inline,
//! which keeps tests deterministic. With the `tokio-runtime` feature,
//! [`TokioScheduler`] hands tasks to a tokio runtime's blocking pool.

use crate::core::config::SchedulerConfig;
use crate::traits::{Scheduler, Task};
use crate::{Error, Result};
use crossbeam_channel::{bounded, Sender, TrySendError};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Fixed-size pool of worker threads
pub struct ThreadPool {
    sender: Option<Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
    in_flight: Arc<AtomicUsize>,
}

impl ThreadPool {
    pub fn new(config: &SchedulerConfig) -> Result<Self> {
        if config.worker_threads == 0 {
            return Err(Error::Config("thread pool needs at least one worker".into()));
        }

        let (sender, receiver) = bounded::<Task>(config.max_queue_size.max(1));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let mut workers = Vec::with_capacity(config.worker_threads);

        for index in 0..config.worker_threads {
            let receiver = receiver.clone();
            let in_flight = Arc::clone(&in_flight);
            let worker = std::thread::Builder::new()
                .name(format!("tileframe-worker-{index}"))
                .spawn(move || {
                    // Ends once every sender is gone and the queue is drained
                    for task in receiver.iter() {
                        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                            log::error!("tileframe worker task panicked");
                        }
                        in_flight.fetch_sub(1, Ordering::AcqRel);
                    }
                })?;
            workers.push(worker);
        }

        log::debug!("thread pool started with {} workers", workers.len());
        Ok(Self {
            sender: Some(sender),
            workers,
            in_flight,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Tasks queued or running
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl Scheduler for ThreadPool {
    fn schedule(&self, task: Task) -> Result<()> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| Error::Scheduler("thread pool is shut down".into()))?;

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        match sender.try_send(task) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.in_flight.fetch_sub(1, Ordering::AcqRel);
                match err {
                    TrySendError::Full(_) => Err(Error::Scheduler("worker queue is full".into())),
                    TrySendError::Disconnected(_) => {
                        Err(Error::Scheduler("thread pool is shut down".into()))
                    }
                }
            }
        }
    }

    fn name(&self) -> &str {
        "thread-pool"
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("tileframe worker panicked");
            }
        }
    }
}

/// Runs every task on the calling thread before `schedule` returns
#[derive(Debug, Default)]
pub struct ImmediateScheduler {
    executed: AtomicUsize,
}

impl ImmediateScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::Acquire)
    }
}

impl Scheduler for ImmediateScheduler {
    fn schedule(&self, task: Task) -> Result<()> {
        task();
        self.executed.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn name(&self) -> &str {
        "immediate"
    }
}

#[cfg(feature = "tokio-runtime")]
pub use tokio_impl::TokioScheduler;

#[cfg(feature = "tokio-runtime")]
mod tokio_impl {
    use super::*;
    use ::tokio::runtime::Handle;

    /// Tokio-based scheduler; tasks run on the runtime's blocking pool
    #[derive(Debug, Clone)]
    pub struct TokioScheduler {
        handle: Handle,
    }

    impl TokioScheduler {
        pub fn new(handle: Handle) -> Self {
            Self { handle }
        }

        /// Bind to the runtime driving the current thread
        pub fn current() -> Result<Self> {
            Handle::try_current()
                .map(Self::new)
                .map_err(|err| Error::Scheduler(err.to_string()))
        }
    }

    impl Scheduler for TokioScheduler {
        fn schedule(&self, task: Task) -> Result<()> {
            drop(self.handle.spawn_blocking(task));
            Ok(())
        }

        fn name(&self) -> &str {
            "tokio"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    #[test]
    fn test_thread_pool_runs_tasks() {
        let pool = ThreadPool::new(&SchedulerConfig::default()).unwrap();
        let (tx, rx) = unbounded();

        for i in 0..16 {
            let tx = tx.clone();
            pool.schedule(Box::new(move || {
                let _ = tx.send(i);
            }))
            .unwrap();
        }

        let mut seen: Vec<i32> = (0..16)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_thread_pool_rejects_when_full() {
        let config = SchedulerConfig {
            worker_threads: 1,
            max_queue_size: 1,
        };
        let pool = ThreadPool::new(&config).unwrap();
        let (release_tx, release_rx) = bounded::<()>(0);
        let (started_tx, started_rx) = bounded::<()>(1);

        pool.schedule(Box::new(move || {
            let _ = started_tx.send(());
            let _ = release_rx.recv();
        }))
        .unwrap();
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        // worker busy: one slot in the queue, then full
        pool.schedule(Box::new(|| {})).unwrap();
        assert!(matches!(pool.schedule(Box::new(|| {})), Err(Error::Scheduler(_))));

        release_tx.send(()).unwrap();
    }

    #[test]
    fn test_worker_survives_panicking_task() {
        let pool = ThreadPool::new(&SchedulerConfig {
            worker_threads: 1,
            max_queue_size: 4,
        })
        .unwrap();
        let (tx, rx) = unbounded();

        pool.schedule(Box::new(|| panic!("tile decode failed"))).unwrap();
        pool.schedule(Box::new(move || {
            let _ = tx.send(7);
        }))
        .unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
        for _ in 0..200 {
            if pool.in_flight() == 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(pool.in_flight(), 0);
        assert_eq!(pool.worker_count(), 1);
    }

    #[test]
    fn test_drop_drains_queue() {
        let (tx, rx) = unbounded();
        {
            let pool = ThreadPool::new(&SchedulerConfig {
                worker_threads: 2,
                max_queue_size: 64,
            })
            .unwrap();
            for _ in 0..32 {
                let tx = tx.clone();
                pool.schedule(Box::new(move || {
                    let _ = tx.send(());
                }))
                .unwrap();
            }
        }
        assert_eq!(rx.try_iter().count(), 32);
    }

    #[test]
    fn test_zero_workers_is_config_error() {
        let config = SchedulerConfig {
            worker_threads: 0,
            max_queue_size: 8,
        };
        assert!(matches!(ThreadPool::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_immediate_scheduler_runs_inline() {
        let scheduler = ImmediateScheduler::new();
        let flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let task_flag = Arc::clone(&flag);
        scheduler
            .schedule(Box::new(move || task_flag.store(true, Ordering::Release)))
            .unwrap();
        assert!(flag.load(Ordering::Acquire));
        assert_eq!(scheduler.executed(), 1);
    }

    #[cfg(feature = "tokio-runtime")]
    #[::tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_tokio_scheduler() {
        let scheduler = TokioScheduler::current().unwrap();
        let (tx, rx) = ::tokio::sync::oneshot::channel();
        scheduler
            .schedule(Box::new(move || {
                let _ = tx.send(42);
            }))
            .unwrap();

        let value = ::tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, 42);
    }

    #[cfg(feature = "tokio-runtime")]
    #[test]
    fn test_tokio_scheduler_needs_runtime() {
        assert!(TokioScheduler::current().is_err());
    }
}
