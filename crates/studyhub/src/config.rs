//! Runtime configuration for purges and resets.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs as tokio_fs;
use tracing::{debug, error};

use crate::{validation::validate_page_size, Result, RetryPolicy, StoreError, DEFAULT_PAGE_SIZE};

/// Settings shared by the reset orchestrator and the CLI.
///
/// Every field has a default, so a configuration file only needs the keys it
/// wants to change:
///
/// ```json
/// { "page_size": 250, "retry": { "max_attempts": 5 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetConfig {
    /// Documents fetched and deleted per sweep
    pub page_size:   usize,
    /// Collections purged at the same time (1 = sequential)
    pub concurrency: usize,
    /// Retry policy applied to every store call
    pub retry:       RetryPolicy,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            page_size:   DEFAULT_PAGE_SIZE,
            concurrency: 1,
            retry:       RetryPolicy::default(),
        }
    }
}

impl ResetConfig {
    /// Loads a JSON configuration file and validates it.
    pub async fn from_file<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        debug!("Loading configuration from {:?}", path);
        let content = tokio_fs::read_to_string(path).await.map_err(|e| {
            error!("Failed to read configuration file {:?}: {}", path, e);
            e
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            StoreError::ConfigError {
                message: format!("{}: {}", path.display(), e),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the settings can drive a purge.
    pub fn validate(&self) -> Result<()> {
        validate_page_size(self.page_size).map_err(|e| {
            StoreError::ConfigError {
                message: e.to_string(),
            }
        })?;
        if self.concurrency == 0 {
            return Err(StoreError::ConfigError {
                message: "concurrency must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}
