//! Engine configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;

use crate::cascade::DiscountPolicy;

/// Environment variable selecting the [`DiscountPolicy`].
pub const DISCOUNT_POLICY_VAR: &str = "TABULATE_DISCOUNT_POLICY";

/// Settlement engine configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Whether discount lines share in absorbed fees (default: exclude)
    #[serde(default)]
    pub discount_policy: DiscountPolicy,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discount_policy = match lookup(DISCOUNT_POLICY_VAR) {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => DiscountPolicy::default(),
        };

        Ok(EngineConfig { discount_policy })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}
