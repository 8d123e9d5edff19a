//! Configuration loading for charts and order sources.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use storefront_analytics::{ConfigError, SeriesConfig};

use crate::orders::{OrderFilter, OrderStatus};

pub const ENV_REVENUE_STATUSES: &str = "STOREFRONT_REVENUE_STATUSES";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_ORDERS_FILE: &str = "STOREFRONT_ORDERS_FILE";

/// A revenue chart request: series shape plus order filter.
///
/// Both parts validate while deserializing, so a decoded `ChartConfig`
/// always passes [`ChartConfig::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    pub series: SeriesConfig,
    pub filter: OrderFilter,
}

impl ChartConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.series.validate()?;
        self.filter.validate()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let series = SeriesConfig::from_lookup(&lookup)?;
        let mut filter = OrderFilter::revenue();

        if let Some(raw) = lookup(ENV_REVENUE_STATUSES) {
            filter.statuses = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<OrderStatus>()
                        .map_err(|e| ConfigError::invalid(ENV_REVENUE_STATUSES, e.to_string()))
                })
                .collect::<Result<_, _>>()?;
        }

        let config = Self { series, filter };
        config.validate()?;
        Ok(config)
    }
}

/// Where the chart binary reads orders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderSourceConfig {
    Postgres { database_url: String },
    File { path: PathBuf },
}

impl OrderSourceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `DATABASE_URL` wins over `STOREFRONT_ORDERS_FILE`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(database_url) = lookup(ENV_DATABASE_URL).filter(|v| !v.trim().is_empty()) {
            return Ok(Self::Postgres { database_url });
        }
        if let Some(path) = lookup(ENV_ORDERS_FILE).filter(|v| !v.trim().is_empty()) {
            return Ok(Self::File {
                path: PathBuf::from(path),
            });
        }
        Err(ConfigError::invalid(
            ENV_DATABASE_URL,
            format!("set {ENV_DATABASE_URL} or {ENV_ORDERS_FILE}"),
        ))
    }
}
