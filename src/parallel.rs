//! Parallel processing configuration
//!
//! Batch jobs are independent, so they can be spread over a Rayon pool. Each
//! series is still processed on a single thread.

use crate::errors::{Result, SeaIceError};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::info;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    /// Create a configuration that uses all available CPU cores
    pub fn all_cores() -> Self {
        Self {
            num_threads: Some(num_cpus::get()),
        }
    }

    /// Create a configuration that uses a specific number of threads
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
        }
    }

    /// Build a dedicated pool, `None` when the global pool should be used
    fn build_pool(&self) -> Result<Option<ThreadPool>> {
        let Some(num_threads) = self.num_threads else {
            return Ok(None);
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| {
                SeaIceError::ThreadPool(format!(
                    "Failed to initialize thread pool with {num_threads} threads: {e}"
                ))
            })?;
        info!("Configured parallel processing with {num_threads} threads");
        Ok(Some(pool))
    }

    /// Run `op` inside the configured pool.
    ///
    /// # Errors
    ///
    /// Returns [`SeaIceError::ThreadPool`] if the pool cannot be built.
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> Result<R> {
        match self.build_pool()? {
            Some(pool) => Ok(pool.install(op)),
            None => {
                info!(
                    "Using default thread pool with {} threads",
                    rayon::current_num_threads()
                );
                Ok(op())
            }
        }
    }
}
