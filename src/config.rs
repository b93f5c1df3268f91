//! Runtime configuration for the COB orchestration core.
//!
//! Defaults are suitable for tests and small deployments; production
//! values come from `LOAN_COB_*` environment variables.

use crate::error::{CobError, Result};

#[derive(Debug, Clone)]
pub struct CobConfig {
    /// Maximum number of loan IDs per partition
    pub partition_size: usize,
    /// How many days back the partitioner looks when selecting loans
    /// opened recently enough to be COB-eligible
    pub days_behind: i64,
    /// Upper bound on partitions processed concurrently in one run
    pub max_concurrent_partitions: usize,
    /// Principals allowed to overrule any existing account lock
    pub bypass_users: Vec<String>,
}

impl Default for CobConfig {
    fn default() -> Self {
        Self {
            partition_size: 100,
            days_behind: 7,
            max_concurrent_partitions: 4,
            bypass_users: Vec::new(),
        }
    }
}

impl CobConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(size) = std::env::var("LOAN_COB_PARTITION_SIZE") {
            config.partition_size = size.parse().map_err(|e| CobError::ConfigurationError {
                reason: format!("Invalid partition_size: {e}"),
            })?;
            if config.partition_size == 0 {
                return Err(CobError::ConfigurationError {
                    reason: "partition_size must be a positive integer".to_string(),
                });
            }
        }

        if let Ok(days) = std::env::var("LOAN_COB_DAYS_BEHIND") {
            config.days_behind = days.parse().map_err(|e| CobError::ConfigurationError {
                reason: format!("Invalid days_behind: {e}"),
            })?;
        }

        if let Ok(workers) = std::env::var("LOAN_COB_MAX_CONCURRENT_PARTITIONS") {
            config.max_concurrent_partitions =
                workers.parse().map_err(|e| CobError::ConfigurationError {
                    reason: format!("Invalid max_concurrent_partitions: {e}"),
                })?;
        }

        if let Ok(users) = std::env::var("LOAN_COB_BYPASS_USERS") {
            config.bypass_users = users
                .split(',')
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect();
        }

        Ok(config)
    }
}
