//! Batcher configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// How many requests a batch may hold before it is flushed.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;
/// How many workers resolve batches concurrently.
pub const DEFAULT_WORKER_COUNT: usize = 4;
/// Longest a partial batch waits before flushing. Short enough to be
/// imperceptible next to a store round trip, long enough to accumulate a
/// meaningful batch under load.
pub const DEFAULT_BATCHING_TIMEOUT: Duration = Duration::from_micros(500);
/// Caller-side wait bound for a single read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Tuning knobs for a [`ReadBatcher`](crate::ReadBatcher).
///
/// Reads from environment variables via [`BatcherConfig::from_env`]:
/// - `READ_BATCH_SIZE` — batch size flush trigger (default: `100`)
/// - `READ_WORKERS` — worker parallelism (default: `4`)
/// - `READ_BATCHING_TIMEOUT_US` — partial-batch flush timeout in µs (default: `500`)
/// - `READ_TIMEOUT_MS` — caller-side wait bound in ms (default: `100`)
/// - `READ_ARRIVAL_CAPACITY` — arrival queue bound (default: `READ_BATCH_SIZE`)
#[derive(Debug, Clone)]
pub struct BatcherConfig {
    pub max_batch_size: usize,
    pub worker_count: usize,
    pub batching_timeout: Duration,
    pub read_timeout: Duration,
    /// Capacity of the arrival queue, the admission-control boundary.
    /// Submissions await when it is full.
    pub arrival_capacity: usize,
}

impl BatcherConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let max_batch_size = env_or("READ_BATCH_SIZE", DEFAULT_MAX_BATCH_SIZE);
        Self {
            max_batch_size,
            worker_count: env_or("READ_WORKERS", DEFAULT_WORKER_COUNT),
            batching_timeout: Duration::from_micros(env_or("READ_BATCHING_TIMEOUT_US", 500)),
            read_timeout: Duration::from_millis(env_or("READ_TIMEOUT_MS", 100)),
            arrival_capacity: env_or("READ_ARRIVAL_CAPACITY", max_batch_size),
        }
    }

    /// Rejects configurations that would hang or never batch, so they fail
    /// at start rather than surface as stuck reads.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.batching_timeout.is_zero() {
            return Err(ConfigError::ZeroBatchingTimeout);
        }
        if self.read_timeout.is_zero() {
            return Err(ConfigError::ZeroReadTimeout);
        }
        if self.arrival_capacity == 0 {
            return Err(ConfigError::ZeroArrivalCapacity);
        }
        Ok(())
    }
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            worker_count: DEFAULT_WORKER_COUNT,
            batching_timeout: DEFAULT_BATCHING_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            arrival_capacity: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = BatcherConfig::default();
        assert_eq!(config.max_batch_size, 100);
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.batching_timeout, Duration::from_micros(500));
        assert_eq!(config.read_timeout, Duration::from_millis(100));
        assert_eq!(config.arrival_capacity, config.max_batch_size);
    }

    #[test]
    fn default_config_validates() {
        assert!(BatcherConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let config = BatcherConfig {
            worker_count: 0,
            ..BatcherConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroWorkers)));
    }

    #[test]
    fn zero_batch_size_rejected() {
        let config = BatcherConfig {
            max_batch_size: 0,
            ..BatcherConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroBatchSize)));
    }

    #[test]
    fn zero_timeouts_rejected() {
        let config = BatcherConfig {
            batching_timeout: Duration::ZERO,
            ..BatcherConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroBatchingTimeout)
        ));

        let config = BatcherConfig {
            read_timeout: Duration::ZERO,
            ..BatcherConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroReadTimeout)
        ));
    }

    #[test]
    fn zero_arrival_capacity_rejected() {
        let config = BatcherConfig {
            arrival_capacity: 0,
            ..BatcherConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroArrivalCapacity)
        ));
    }
}
