//! Chart series configuration, validated at the boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::granularity::{Granularity, InvalidGranularityError};

/// Points a chart shows when nothing else is configured.
pub const DEFAULT_POINT_COUNT: usize = 30;

/// Upper bound on buckets per series (cap for safety).
pub const MAX_POINT_COUNT: usize = 1000;

pub const ENV_GRANULARITY: &str = "STOREFRONT_CHART_GRANULARITY";
pub const ENV_POINT_COUNT: &str = "STOREFRONT_CHART_POINTS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Granularity(#[from] InvalidGranularityError),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Shape of one chart series: bucket width and number of buckets.
///
/// Deserialization validates, so a decoded config is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSeriesConfig")]
pub struct SeriesConfig {
    pub granularity: Granularity,
    pub point_count: usize,
}

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSeriesConfig {
    granularity: Granularity,
    point_count: usize,
}

impl Default for RawSeriesConfig {
    fn default() -> Self {
        let SeriesConfig {
            granularity,
            point_count,
        } = SeriesConfig::default();
        Self {
            granularity,
            point_count,
        }
    }
}

impl TryFrom<RawSeriesConfig> for SeriesConfig {
    type Error = ConfigError;

    fn try_from(raw: RawSeriesConfig) -> Result<Self, Self::Error> {
        Self::new(raw.granularity, raw.point_count)
    }
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Day,
            point_count: DEFAULT_POINT_COUNT,
        }
    }
}

impl SeriesConfig {
    pub fn new(granularity: Granularity, point_count: usize) -> Result<Self, ConfigError> {
        let config = Self {
            granularity,
            point_count,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.point_count == 0 || self.point_count > MAX_POINT_COUNT {
            return Err(ConfigError::invalid(
                "point_count",
                format!("must be between 1 and {MAX_POINT_COUNT} (got {})", self.point_count),
            ));
        }
        Ok(())
    }

    /// Read overrides from the process environment; unset keys keep defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SeriesConfig::from_env`] against an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_GRANULARITY) {
            config.granularity = raw.parse()?;
        }

        if let Some(raw) = lookup(ENV_POINT_COUNT) {
            config.point_count = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(ENV_POINT_COUNT, format!("{e}")))?;
        }

        config.validate()?;
        Ok(config)
    }
}
