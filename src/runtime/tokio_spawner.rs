//! Tokio runtime spawner implementation.

use std::future::Future;
use std::sync::Arc;

use crate::config::SchedulerOptions;
use crate::core::Spawn;

/// Tokio-based spawner that runs fired units on a tokio runtime.
///
/// When built with [`TokioSpawner::with_worker_threads`] the spawner owns its
/// runtime, giving a batch run an execution pool of its own.
#[derive(Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
    _runtime: Option<Arc<tokio::runtime::Runtime>>,
}

impl TokioSpawner {
    /// Create a `TokioSpawner` from a tokio runtime handle.
    #[must_use]
    pub const fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle,
            _runtime: None,
        }
    }

    /// Create a `TokioSpawner` owning a new multi-threaded runtime.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the runtime cannot be built.
    pub fn with_worker_threads(worker_threads: usize) -> Result<Self, std::io::Error> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads)
            .thread_name("batch-dispatch-worker")
            .enable_all()
            .build()?;
        Ok(Self {
            handle: runtime.handle().clone(),
            _runtime: Some(Arc::new(runtime)),
        })
    }

    /// Create a dedicated runtime sized by `thread_count`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the runtime cannot be built.
    pub fn from_options(options: &SchedulerOptions) -> Result<Self, std::io::Error> {
        Self::with_worker_threads(options.thread_count)
    }

    /// Handle of the runtime units are spawned on.
    #[must_use]
    pub const fn handle(&self) -> &tokio::runtime::Handle {
        &self.handle
    }
}

impl Spawn for TokioSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(fut);
    }
}
