use crate::engine::error::EngineError;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

/// Builds a dedicated pool so a task's worker count is independent of the global rayon pool.
pub fn worker_pool(threads: usize) -> Result<ThreadPool, EngineError> {
    debug!(threads, "Building worker pool.");
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("cryowater-worker-{}", i))
        .build()
        .map_err(|e| EngineError::WorkerPool {
            threads,
            reason: e.to_string(),
        })
}
