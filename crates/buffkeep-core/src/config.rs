//! RON configuration for the scheduler
//!
//! Every field has a default, so an empty `()` document is a valid config.
//!
//! ```ron
//! (
//!     max_slots: 256,
//!     interval_ms: 1000,
//!     ticks_per_second: 60,
//!     catalog_overrides: {
//!         glow: (effect_id: 11, duration_ticks: 180),
//!     },
//!     grant_on_login: [bunny],
//! )
//! ```

use crate::{CatalogEntry, EffectCatalog, EffectKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Number of connection slots (the host's maximum connection count)
    #[serde(default = "default_max_slots")]
    pub max_slots: usize,
    /// Reapplication interval in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Host tick rate, used to convert catalog durations to wall time
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: u32,
    /// Entries replacing the built-in catalog's, by kind
    #[serde(default)]
    pub catalog_overrides: IndexMap<EffectKind, CatalogEntry>,
    /// Kinds granted once when an eligible entity logs in
    #[serde(default = "default_grant_on_login")]
    pub grant_on_login: Vec<EffectKind>,
}

fn default_max_slots() -> usize {
    256
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_ticks_per_second() -> u32 {
    60
}

fn default_grant_on_login() -> Vec<EffectKind> {
    vec![EffectKind::Bunny]
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_slots: default_max_slots(),
            interval_ms: default_interval_ms(),
            ticks_per_second: default_ticks_per_second(),
            catalog_overrides: IndexMap::new(),
            grant_on_login: default_grant_on_login(),
        }
    }
}

impl SchedulerConfig {
    /// Load and validate configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_ron(&content)
    }

    /// Parse and validate configuration from RON text
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: SchedulerConfig =
            ron::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The reapplication interval
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// The built-in catalog with this config's overrides applied
    pub fn catalog(&self) -> EffectCatalog {
        let mut catalog = EffectCatalog::standard();
        for (kind, entry) in &self.catalog_overrides {
            catalog.insert(*kind, *entry);
        }
        catalog
    }

    /// Check the config against the catalog it produces
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_slots == 0 {
            return Err(ConfigError::Validation("max_slots must be at least 1".into()));
        }
        if self.interval_ms == 0 {
            return Err(ConfigError::Validation("interval_ms must be at least 1".into()));
        }
        if self.ticks_per_second == 0 {
            return Err(ConfigError::Validation(
                "ticks_per_second must be at least 1".into(),
            ));
        }
        validate_interval(&self.catalog(), self.interval(), self.ticks_per_second)
    }
}

/// Check that `interval` refreshes every maintained kind before it lapses
pub fn validate_interval(
    catalog: &EffectCatalog,
    interval: Duration,
    ticks_per_second: u32,
) -> Result<(), ConfigError> {
    match catalog.shortest_refresh_duration(ticks_per_second) {
        Some(shortest) if interval >= shortest => Err(ConfigError::IntervalTooLong {
            interval,
            shortest,
        }),
        _ => Ok(()),
    }
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Maintained effects would lapse between passes
    #[error("interval {interval:?} is not shorter than the shortest effect duration {shortest:?}")]
    IntervalTooLong { interval: Duration, shortest: Duration },
}
