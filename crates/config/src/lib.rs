//! WarGaming API Configuration Module
//!
//! This module provides the tunable settings shared by the collection and
//! its binary codec.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default upper bound on entries decoded into a single collection.
pub const DEFAULT_MAX_ENTRIES: usize = 1_048_576;
/// Default upper bound on a decoded string or byte payload (16 MiB).
pub const DEFAULT_MAX_STRING_LEN: usize = 16 * 1024 * 1024;
/// Default nesting depth for collections inside collections.
pub const DEFAULT_MAX_DEPTH: usize = 64;
/// Hard ceiling for `max_depth`; deeper values are clamped.
pub const MAX_DEPTH_CEILING: usize = 1024;

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Bounds applied while decoding untrusted bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecLimits {
    pub max_entries: usize,
    pub max_string_len: usize,
    pub max_depth: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CodecLimits {
    /// Rejects zero limits and clamps `max_depth` to [`MAX_DEPTH_CEILING`].
    pub fn validate(mut self) -> ConfigResult<Self> {
        if self.max_entries == 0 {
            return Err(ConfigError::Invalid("max_entries must be greater than zero".into()));
        }
        if self.max_string_len == 0 {
            return Err(ConfigError::Invalid(
                "max_string_len must be greater than zero".into(),
            ));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be greater than zero".into()));
        }
        if self.max_depth > MAX_DEPTH_CEILING {
            tracing::warn!(
                requested = self.max_depth,
                ceiling = MAX_DEPTH_CEILING,
                "max_depth clamped"
            );
            self.max_depth = MAX_DEPTH_CEILING;
        }
        Ok(self)
    }
}

/// Collection configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Capacity reserved when a collection is created from this config.
    pub initial_capacity: usize,
    pub limits: CodecLimits,
}

impl CollectionConfig {
    /// Parses a TOML document and validates the result.
    ///
    /// ```toml
    /// initial_capacity = 32
    ///
    /// [limits]
    /// max_entries = 10000
    /// max_depth = 8
    /// ```
    pub fn from_toml_str(input: &str) -> ConfigResult<Self> {
        let mut config: CollectionConfig = toml::from_str(input)?;
        config.limits = config.limits.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
