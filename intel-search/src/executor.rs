//! Bounded executor for blocking fetch work.
//!
//! [`BlockingPool`] runs synchronous closures on tokio's blocking thread pool
//! while limiting how many run at once. Cloning the pool shares the same
//! permits, so one instance created at startup bounds stealth-fetch load for
//! the whole process regardless of how many requests are in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::error::SearchError;

/// Default number of concurrent blocking jobs.
pub const DEFAULT_WORKERS: usize = 4;

/// A fixed-size pool for blocking jobs.
#[derive(Debug, Clone)]
pub struct BlockingPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl BlockingPool {
    /// Create a pool allowing `size` concurrent jobs. A size of zero is
    /// raised to one.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Maximum number of jobs that may run at once.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of free slots right now.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `job` on a blocking thread once a slot is free.
    ///
    /// The slot stays occupied until `job` returns, even if the caller stops
    /// waiting. `timeout` covers run time only and starts once the slot is
    /// acquired; queueing for a slot is unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Timeout`] when `timeout` elapses first and
    /// [`SearchError::Worker`] when the job panics or the pool is closed.
    pub async fn run<F, T>(&self, timeout: Duration, job: F) -> Result<T, SearchError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| SearchError::Worker("pool closed".into()))?;
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        match tokio::time::timeout(timeout, handle).await {
            Ok(joined) => {
                joined.map_err(|e| SearchError::Worker(format!("blocking job failed: {e}")))
            }
            Err(_) => Err(SearchError::Timeout(format!(
                "blocking job exceeded {}s",
                timeout.as_secs_f32()
            ))),
        }
    }
}

impl Default for BlockingPool {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}
