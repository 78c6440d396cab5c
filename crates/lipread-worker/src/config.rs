//! Worker pool configuration.

/// Pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of workers to spawn. Fixed for the pool's lifetime.
    pub workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

impl PoolConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            workers: std::env::var("WORKER_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(4),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_size() {
        assert_eq!(PoolConfig::default().workers, 4);
    }
}
