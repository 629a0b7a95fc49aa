//! Actor driver configuration

use tracing::warn;

/// Upper bound on concurrently executing actors
///
/// Each worker may occupy one thread of the blocking pool.
pub const MAX_WORKERS: usize = 4096;

/// Configuration for running actors
///
/// Controls how many actors execute at once and whether each actor opens its
/// own account before running its operation.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    /// Maximum number of actors executing concurrently
    pub workers: usize,

    /// Ensure the actor's account exists (opened with the request amount)
    /// before running the operation
    pub auto_create: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            auto_create: true,
        }
    }
}

impl DriverConfig {
    /// Create a DriverConfig
    ///
    /// Zero workers falls back to the default; anything above [`MAX_WORKERS`]
    /// is capped.
    pub fn new(workers: usize, auto_create: bool) -> Self {
        let default = Self::default();

        let workers = if workers == 0 {
            warn!(
                "Invalid workers ({}), using default ({})",
                workers, default.workers
            );
            default.workers
        } else if workers > MAX_WORKERS {
            warn!(
                "Workers ({}) above limit, using maximum ({})",
                workers, MAX_WORKERS
            );
            MAX_WORKERS
        } else {
            workers
        };

        Self {
            workers,
            auto_create,
        }
    }
}
