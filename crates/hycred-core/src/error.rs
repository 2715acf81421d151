//! # Error Types
//!
//! Value-level validation failures shared by every crate in the workspace.
//! Registry-level errors wrap these; see `hycred-registry::error`.

use thiserror::Error;

use crate::temporal::Timestamp;

/// A value failed validation before it could enter the registry.
///
/// Each variant carries the offending input so operators can diagnose a
/// rejected call without re-running it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An identity string was empty or whitespace only.
    #[error("identity must not be empty")]
    EmptyIdentity,

    /// An identity string exceeded [`crate::MAX_ACCOUNT_ID_LEN`] bytes.
    #[error("identity is {len} bytes, maximum is {max}")]
    IdentityTooLong {
        /// Length of the rejected identity.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A timestamp string could not be parsed or was not UTC.
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A quantity was zero where a positive amount is required.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    /// Carbon intensity above the configured issuance ceiling.
    #[error("carbon intensity {value} gCO2/kWh exceeds maximum of {max}")]
    CarbonIntensityExceeded {
        /// Declared intensity.
        value: u32,
        /// Configured ceiling.
        max: u32,
    },

    /// Production claimed to happen after the credit is issued.
    #[error("production date {production} is later than issuance time {now}")]
    FutureProductionDate {
        /// Declared production time.
        production: Timestamp,
        /// Issuance time.
        now: Timestamp,
    },
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values have no deterministic canonical form; quantities are integers.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
