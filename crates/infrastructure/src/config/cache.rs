//! Cache configuration with TTL settings per data kind.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Cache configuration with TTL settings per data kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for current conditions in seconds (default: 5 minutes)
    #[serde(default = "default_ttl_current")]
    pub ttl_current_secs: u64,

    /// TTL for resolved forecasts in seconds (default: 30 minutes)
    #[serde(default = "default_ttl_forecast")]
    pub ttl_forecast_secs: u64,

    /// TTL for the station directory in seconds (default: 24 hours)
    #[serde(default = "default_ttl_stations")]
    pub ttl_stations_secs: u64,

    /// TTL for air-quality pollen data in seconds (default: 30 minutes)
    #[serde(default = "default_ttl_pollen")]
    pub ttl_pollen_secs: u64,

    /// Period of the expired-entry sweep in seconds (default: 5 minutes)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

const fn default_ttl_current() -> u64 {
    5 * 60 // 5 minutes
}

const fn default_ttl_forecast() -> u64 {
    30 * 60 // 30 minutes
}

const fn default_ttl_stations() -> u64 {
    24 * 60 * 60 // 24 hours
}

const fn default_ttl_pollen() -> u64 {
    30 * 60
}

const fn default_sweep_interval() -> u64 {
    5 * 60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_current_secs: default_ttl_current(),
            ttl_forecast_secs: default_ttl_forecast(),
            ttl_stations_secs: default_ttl_stations(),
            ttl_pollen_secs: default_ttl_pollen(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl_current(&self) -> Duration {
        Duration::from_secs(self.ttl_current_secs)
    }

    #[must_use]
    pub const fn ttl_forecast(&self) -> Duration {
        Duration::from_secs(self.ttl_forecast_secs)
    }

    #[must_use]
    pub const fn ttl_stations(&self) -> Duration {
        Duration::from_secs(self.ttl_stations_secs)
    }

    #[must_use]
    pub const fn ttl_pollen(&self) -> Duration {
        Duration::from_secs(self.ttl_pollen_secs)
    }

    /// Sweep period, never below one second
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl_current(), Duration::from_secs(300));
        assert_eq!(config.ttl_forecast(), Duration::from_secs(1800));
        assert_eq!(config.ttl_stations(), Duration::from_secs(86_400));
        assert_eq!(config.ttl_pollen(), Duration::from_secs(1800));
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_zero_sweep_interval_is_raised() {
        let config: CacheConfig = toml::from_str("sweep_interval_secs = 0").unwrap();
        assert_eq!(config.sweep_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config: CacheConfig = toml::from_str("ttl_current_secs = 60").unwrap();
        assert_eq!(config.ttl_current_secs, 60);
        assert_eq!(config.ttl_forecast_secs, 1800);
    }
}
