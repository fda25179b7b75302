// src/crawl/config.rs
// Engine settings. Fixed for the lifetime of a run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("worker count must be greater than zero")]
    NoWorkers,
    #[error("queue size must be greater than zero")]
    EmptyQueue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent fetch/parse workers
    pub worker_count: usize,
    /// Capacity of the bounded job queue
    pub queue_size: usize,
    /// Deepest level that still gets fetched; the seed is level 0
    pub max_depth: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            worker_count: 100,
            queue_size: 100,
            max_depth: 100,
        }
    }
}

impl CrawlerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.queue_size == 0 {
            return Err(ConfigError::EmptyQueue);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(CrawlerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = CrawlerConfig {
            worker_count: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoWorkers));
    }

    #[test]
    fn test_zero_queue_rejected() {
        let config = CrawlerConfig {
            queue_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyQueue));
    }

    #[test]
    fn test_zero_depth_is_allowed() {
        let config = CrawlerConfig {
            max_depth: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
