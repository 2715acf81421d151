//! # Registry Configuration
//!
//! Three policy constants, read once when the registry is built and fixed
//! for its lifetime.
//!
//! | Variable                 | Default | Meaning                                   |
//! |--------------------------|---------|-------------------------------------------|
//! | `MAX_CARBON_INTENSITY`   | 50      | Issuance ceiling in gCO2/kWh (inclusive)  |
//! | `MIN_VERIFICATION_COUNT` | 2       | Distinct auditors needed to verify a batch |
//! | `CREDIT_EXPIRY_DAYS`     | 365     | Validity window for `is_credit_expired`   |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hycred_state::ExpiryPolicy;

/// Environment variable for the carbon intensity ceiling.
pub const ENV_MAX_CARBON_INTENSITY: &str = "MAX_CARBON_INTENSITY";
/// Environment variable for the batch quorum.
pub const ENV_MIN_VERIFICATION_COUNT: &str = "MIN_VERIFICATION_COUNT";
/// Environment variable for the expiry window.
pub const ENV_CREDIT_EXPIRY_DAYS: &str = "CREDIT_EXPIRY_DAYS";

/// Errors loading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but is not a non-negative integer.
    #[error("{var}={value:?} is not a valid non-negative integer")]
    Invalid { var: &'static str, value: String },

    /// A batch quorum of zero would verify every batch without any auditor.
    #[error("MIN_VERIFICATION_COUNT must be at least 1")]
    ZeroQuorum,
}

/// Registry policy constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub max_carbon_intensity: u32,
    pub min_verification_count: u32,
    pub credit_expiry_days: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_carbon_intensity: 50,
            min_verification_count: 2,
            credit_expiry_days: 365,
        }
    }
}

impl RegistryConfig {
    /// Load from the process environment. Unset variables take their default.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for unparseable values,
    /// [`ConfigError::ZeroQuorum`] for `MIN_VERIFICATION_COUNT=0`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// As [`RegistryConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let read = |var: &'static str, default: u32| -> Result<u32, ConfigError> {
            match lookup(var) {
                None => Ok(default),
                Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    var,
                    value: raw.clone(),
                }),
            }
        };

        let config = Self {
            max_carbon_intensity: read(ENV_MAX_CARBON_INTENSITY, defaults.max_carbon_intensity)?,
            min_verification_count: read(
                ENV_MIN_VERIFICATION_COUNT,
                defaults.min_verification_count,
            )?,
            credit_expiry_days: read(ENV_CREDIT_EXPIRY_DAYS, defaults.credit_expiry_days)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot be honoured.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroQuorum`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_verification_count == 0 {
            return Err(ConfigError::ZeroQuorum);
        }
        Ok(())
    }

    /// The expiry policy derived from `credit_expiry_days`.
    pub fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy::new(self.credit_expiry_days)
    }
}
