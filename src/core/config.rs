//! Configuration for the frame pipeline and the shared resources behind it
//!
//! Configuration is either picked from a preset profile or loaded from JSON.
//! Every field has a default, so a JSON document only needs to name what it
//! changes.

use crate::core::constants::{DEFAULT_PIXEL_RATIO, DEFAULT_TILE_CACHE_SIZE};
use crate::core::mode::{DebugOptions, MapMode};
use crate::network::NetworkMode;
use crate::tiles::prefetch::PrefetchConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PipelineProfile {
    #[default]
    Balanced,
    LowBandwidth,
    Aggressive,
    Custom(PipelineConfig),
}

impl PipelineProfile {
    pub fn resolve(&self) -> PipelineConfig {
        match self {
            Self::Balanced => PipelineConfig::default(),
            Self::LowBandwidth => PipelineConfig {
                prefetch: PrefetchConfig::disabled(),
                scheduler: SchedulerConfig {
                    worker_threads: 2,
                    max_queue_size: 256,
                },
                file_source: FileSourceConfig {
                    cache_size: 256,
                    max_retries: 1,
                    retry_delay_ms: 1000,
                    exponential_backoff: false,
                    ..FileSourceConfig::default()
                },
                ..PipelineConfig::default()
            },
            Self::Aggressive => PipelineConfig {
                prefetch: PrefetchConfig::dynamic(-4),
                scheduler: SchedulerConfig {
                    worker_threads: 8,
                    max_queue_size: 4096,
                },
                file_source: FileSourceConfig {
                    cache_size: 4096,
                    max_retries: 5,
                    retry_delay_ms: 250,
                    exponential_backoff: true,
                    ..FileSourceConfig::default()
                },
                ..PipelineConfig::default()
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub pixel_ratio: f32,
    pub mode: MapMode,
    pub debug_options: DebugOptions,
    pub network_mode: NetworkMode,
    pub prefetch: PrefetchConfig,
    pub scheduler: SchedulerConfig,
    pub file_source: FileSourceConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pixel_ratio: DEFAULT_PIXEL_RATIO,
            mode: MapMode::Continuous,
            debug_options: DebugOptions::NO_DEBUG,
            network_mode: NetworkMode::Online,
            prefetch: PrefetchConfig::default(),
            scheduler: SchedulerConfig::default(),
            file_source: FileSourceConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::debug!("loading pipeline config from {}", path.as_ref().display());
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0) {
            return Err(Error::Config(format!(
                "pixel_ratio must be positive, got {}",
                self.pixel_ratio
            )));
        }
        if self.scheduler.worker_threads == 0 {
            return Err(Error::Config("scheduler needs at least one worker".into()));
        }
        if self.file_source.cache_size == 0 {
            return Err(Error::Config("file source cache_size must be non-zero".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub worker_threads: usize,
    /// Tasks queued beyond this are rejected
    pub max_queue_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_threads: 4,
            max_queue_size: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSourceConfig {
    pub cache_size: usize,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub exponential_backoff: bool,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for FileSourceConfig {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_TILE_CACHE_SIZE,
            max_retries: 3,
            retry_delay_ms: 500,
            exponential_backoff: true,
            timeout_ms: 30_000,
            user_agent: concat!("tileframe/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_presets() {
        let balanced = PipelineProfile::Balanced.resolve();
        let low = PipelineProfile::LowBandwidth.resolve();
        let aggressive = PipelineProfile::Aggressive.resolve();

        assert_eq!(low.prefetch.dynamic_prefetch_zoom_delta, 0);
        assert!(low.file_source.cache_size < balanced.file_source.cache_size);
        assert!(aggressive.file_source.cache_size > balanced.file_source.cache_size);
        assert!(aggressive.scheduler.worker_threads > balanced.scheduler.worker_threads);
        assert_eq!(PipelineProfile::default(), PipelineProfile::Balanced);
        assert_eq!(balanced.prefetch.dynamic_prefetch_zoom_delta, 0);
        assert!(aggressive.prefetch.dynamic_prefetch_zoom_delta < 0);
        for config in [balanced, low, aggressive] {
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{ "pixel_ratio": 2.0, "prefetch": { "fixed_prefetch_zoom": 5 }, "network_mode": "Offline" }"#,
        )
        .unwrap();

        assert_eq!(config.pixel_ratio, 2.0);
        assert_eq!(config.prefetch.fixed_prefetch_zoom, Some(5));
        assert_eq!(config.network_mode, NetworkMode::Offline);
        assert_eq!(config.scheduler, SchedulerConfig::default());
    }

    #[test]
    fn test_json_round_trip_preserves_debug_bits() {
        let config = PipelineConfig {
            debug_options: DebugOptions::TILE_BORDERS | DebugOptions::COLLISION,
            mode: MapMode::Static,
            ..PipelineConfig::default()
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(PipelineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_pixel_ratio_rejected() {
        let result = PipelineConfig::from_json_str(r#"{ "pixel_ratio": 0.0 }"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = PipelineConfig::from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
