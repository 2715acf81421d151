//! # Replay Scripts
//!
//! A script names the regulator, optionally pins the starting clock and
//! overrides configuration, then lists steps. Each step is one registry
//! operation (or a clock advance) and may declare the error kind it is
//! expected to fail with.
//!
//! ```yaml
//! regulator: regulator
//! start: "2026-03-01T00:00:00Z"
//! config:
//!   min_verification_count: 2
//! steps:
//!   - op: register_auditor
//!     caller: regulator
//!     auditor: auditor-a
//!     name: Nordic Verification
//!     accreditation: ISO-14065/0042
//!   - op: issue_credit
//!     caller: regulator
//!     owner: producer-1
//!     producer: producer-1
//!     amount: 1000
//!     carbon_intensity: 51
//!     expect: invalid_argument
//!   - op: advance
//!     days: 1
//! ```
//!
//! Identities are plain strings here and validated when the step runs, so
//! an empty identity is a step failure (`invalid_argument`), not a parse
//! error.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use hycred_registry::{ErrorKind, RegistryConfig, VerificationDecision};

/// A parsed replay script.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    pub regulator: String,
    /// Initial clock reading. Defaults to the wall clock.
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub config: ConfigOverrides,
    pub steps: Vec<Step>,
}

/// Per-script overrides layered on top of the environment configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub max_carbon_intensity: Option<u32>,
    pub min_verification_count: Option<u32>,
    pub credit_expiry_days: Option<u32>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut base: RegistryConfig) -> RegistryConfig {
        if let Some(v) = self.max_carbon_intensity {
            base.max_carbon_intensity = v;
        }
        if let Some(v) = self.min_verification_count {
            base.min_verification_count = v;
        }
        if let Some(v) = self.credit_expiry_days {
            base.credit_expiry_days = v;
        }
        base
    }
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,
    /// Error kind the step must fail with. Absent means it must succeed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<ErrorKind>,
}

/// A registry operation, query, or clock movement.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    SetCertifier {
        caller: String,
        certifier: String,
    },
    RegisterAuditor {
        caller: String,
        auditor: String,
        name: String,
        #[serde(default)]
        accreditation: String,
    },
    DeactivateAuditor {
        caller: String,
        auditor: String,
    },
    IssueCredit {
        caller: String,
        owner: String,
        producer: String,
        #[serde(default)]
        producer_name: String,
        amount: u64,
        /// Defaults to the current clock reading.
        #[serde(default)]
        production_date: Option<String>,
        #[serde(default)]
        renewable_source: String,
        #[serde(default)]
        location: String,
        carbon_intensity: u32,
        #[serde(default)]
        metadata: String,
    },
    VerifyCredit {
        caller: String,
        credit: u64,
        decision: VerificationDecision,
        #[serde(default)]
        notes: String,
    },
    CreateProductionBatch {
        caller: String,
        producer: String,
        credits: Vec<u64>,
    },
    VerifyProductionBatch {
        caller: String,
        batch: u64,
    },
    TransferCredit {
        caller: String,
        credit: u64,
        to: String,
    },
    RetireCredit {
        caller: String,
        credit: u64,
        reason: String,
    },
    SuspendCredit {
        caller: String,
        credit: u64,
        reason: String,
    },
    /// Assert the expiry query result for a credit.
    CheckExpired {
        credit: u64,
        expired: bool,
    },
    /// Move the replay clock forward.
    Advance {
        #[serde(default)]
        days: i64,
        #[serde(default)]
        seconds: i64,
    },
}

impl Action {
    /// The `op` tag of this action.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetCertifier { .. } => "set_certifier",
            Self::RegisterAuditor { .. } => "register_auditor",
            Self::DeactivateAuditor { .. } => "deactivate_auditor",
            Self::IssueCredit { .. } => "issue_credit",
            Self::VerifyCredit { .. } => "verify_credit",
            Self::CreateProductionBatch { .. } => "create_production_batch",
            Self::VerifyProductionBatch { .. } => "verify_production_batch",
            Self::TransferCredit { .. } => "transfer_credit",
            Self::RetireCredit { .. } => "retire_credit",
            Self::SuspendCredit { .. } => "suspend_credit",
            Self::CheckExpired { .. } => "check_expired",
            Self::Advance { .. } => "advance",
        }
    }
}

impl Script {
    /// Parse a script from YAML text.
    pub fn parse(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("malformed replay script")
    }

    /// Read and parse a script file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }
}
