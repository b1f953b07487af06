//! Worker pool that runs blend requests off the caller's thread

use std::sync::mpsc;

use blend_core::{BlendError, BlendRequest};
use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;

use crate::backends::Codecs;
use crate::pipeline::{blend, BlendOutput};

/// Terminal outcome of a submitted request
pub type BlendResult = Result<BlendOutput, BlendError>;

/// Worker pool could not be started
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Thread pool construction failed
    #[error("Failed to start blend workers: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
}

/// Service configuration
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Worker threads, 0 picks one per logical CPU
    pub workers: usize,
    /// Codecs shared by all workers
    pub codecs: Codecs,
}

impl ServiceConfig {
    /// Set the worker count
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the codecs
    #[must_use]
    pub fn with_codecs(mut self, codecs: Codecs) -> Self {
        self.codecs = codecs;
        self
    }
}

/// Bounded pool of blend workers
///
/// Each request runs start to finish on one worker and its outcome is
/// delivered exactly once. There is no cancellation.
pub struct BlendService {
    pool: ThreadPool,
    codecs: Codecs,
}

impl BlendService {
    /// Start the worker pool
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::PoolBuild` if the threads cannot be spawned.
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|index| format!("blend-worker-{index}"))
            .build()?;
        debug!("started {} blend workers", pool.current_num_threads());
        Ok(Self {
            pool,
            codecs: config.codecs,
        })
    }

    /// Number of worker threads
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `request` on a worker and hand the outcome to `callback`
    pub fn submit<F>(&self, request: BlendRequest, callback: F)
    where
        F: FnOnce(BlendResult) + Send + 'static,
    {
        let codecs = self.codecs.clone();
        self.pool.spawn(move || callback(blend(request, &codecs)));
    }

    /// Run `request` on a worker and receive the outcome on a channel
    pub fn submit_channel(&self, request: BlendRequest) -> mpsc::Receiver<BlendResult> {
        let (sender, receiver) = mpsc::sync_channel(1);
        self.submit(request, move |result| {
            // The caller may have dropped the receiver; nobody is left to tell.
            let _ = sender.send(result);
        });
        receiver
    }

    /// Run `request` on a worker and block until it finishes
    ///
    /// # Errors
    ///
    /// The request's own failure.
    pub fn blend(&self, request: BlendRequest) -> BlendResult {
        self.pool.install(|| blend(request, &self.codecs))
    }
}

impl std::fmt::Debug for BlendService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlendService")
            .field("workers", &self.workers())
            .finish_non_exhaustive()
    }
}
