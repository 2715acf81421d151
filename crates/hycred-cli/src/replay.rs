//! # Replay Subcommand
//!
//! Runs a [`Script`] against a fresh in-memory registry driven by a manual
//! clock. Every step runs regardless of earlier mismatches; the report
//! lists each outcome, the final snapshot, and optionally the full
//! notification log. The exit code is 0 only if every step matched its
//! expectation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Args;
use serde::Serialize;

use hycred_core::{AccountId, BatchId, CreditId, ManualClock, Timestamp, ValidationError};
use hycred_registry::{
    CreditRegistry, CreditTerms, ErrorKind, Notification, RegistryConfig, RegistryError,
    RegistrySnapshot, TracingObserver,
};

use crate::script::{Action, Script};

/// Arguments for the `hycred replay` subcommand.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Path to the YAML script.
    pub script: PathBuf,

    /// Include the full notification log in the report.
    #[arg(long)]
    pub events: bool,

    /// Write the report to a file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// What happened at one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<ErrorKind>,
    /// Error kind the step failed with, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub matched: bool,
}

/// The full replay result.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepReport>,
    pub mismatches: usize,
    pub snapshot: RegistrySnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Vec<Notification>>,
}

/// Execute the replay subcommand.
pub fn run_replay(args: &ReplayArgs) -> Result<u8> {
    let script = Script::load(&args.script)?;
    let base = RegistryConfig::from_env().context("invalid registry configuration")?;
    let report = replay(&script, base, args.events)?;

    let json = serde_json::to_string_pretty(&report)?;
    crate::emit(&json, args.output.as_deref())?;

    if report.mismatches > 0 {
        tracing::error!(
            mismatches = report.mismatches,
            steps = report.steps.len(),
            "replay diverged from expectations"
        );
        return Ok(1);
    }
    tracing::info!(steps = report.steps.len(), "replay matched all expectations");
    Ok(0)
}

/// Run `script` against a new registry configured from `base` plus the
/// script's overrides.
pub fn replay(script: &Script, base: RegistryConfig, include_events: bool) -> Result<ReplayReport> {
    let config = script.config.apply(base);
    let start = match &script.start {
        Some(s) => Timestamp::parse(s).context("invalid script start timestamp")?,
        None => Timestamp::now(),
    };
    let regulator = AccountId::new(&script.regulator).context("invalid regulator identity")?;

    let clock = ManualClock::starting_at(start);
    let registry = CreditRegistry::with_clock(regulator, config, Arc::new(clock.clone()))
        .context("invalid registry configuration")?;
    registry.subscribe(Arc::new(TracingObserver));

    let mut steps = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        let outcome = execute(&registry, &clock, &step.action);
        let error = outcome.as_ref().err().map(RegistryError::kind);
        let matched = error == step.expect;
        if !matched {
            tracing::warn!(
                index,
                op = step.action.name(),
                expected = ?step.expect,
                actual = ?error,
                "step outcome differs from expectation"
            );
        }
        steps.push(StepReport {
            index,
            op: step.action.name(),
            expected: step.expect,
            error,
            message: outcome.err().map(|e| e.to_string()),
            matched,
        });
    }

    let mismatches = steps.iter().filter(|s| !s.matched).count();
    Ok(ReplayReport {
        steps,
        mismatches,
        snapshot: registry.snapshot(),
        notifications: include_events.then(|| registry.notifications()),
    })
}

fn id(s: &str) -> Result<AccountId, RegistryError> {
    Ok(AccountId::new(s)?)
}

fn execute(reg: &CreditRegistry, clock: &ManualClock, action: &Action) -> Result<(), RegistryError> {
    match action {
        Action::SetCertifier { caller, certifier } => reg.set_certifier(&id(caller)?, id(certifier)?),
        Action::RegisterAuditor {
            caller,
            auditor,
            name,
            accreditation,
        } => reg.register_auditor(&id(caller)?, id(auditor)?, name, accreditation),
        Action::DeactivateAuditor { caller, auditor } => {
            reg.deactivate_auditor(&id(caller)?, &id(auditor)?)
        }
        Action::IssueCredit {
            caller,
            owner,
            producer,
            producer_name,
            amount,
            production_date,
            renewable_source,
            location,
            carbon_intensity,
            metadata,
        } => {
            let production_date = match production_date {
                Some(s) => Timestamp::parse(s)?,
                None => reg.now(),
            };
            let terms = CreditTerms {
                owner: id(owner)?,
                producer: id(producer)?,
                producer_name: producer_name.clone(),
                amount: *amount,
                production_date,
                renewable_source: renewable_source.clone(),
                location: location.clone(),
                carbon_intensity: *carbon_intensity,
                metadata: metadata.clone(),
            };
            reg.issue_credit(&id(caller)?, terms).map(|_| ())
        }
        Action::VerifyCredit {
            caller,
            credit,
            decision,
            notes,
        } => reg.verify_credit(&id(caller)?, CreditId::new(*credit), *decision, notes),
        Action::CreateProductionBatch {
            caller,
            producer,
            credits,
        } => {
            let ids: Vec<CreditId> = credits.iter().copied().map(CreditId::new).collect();
            reg.create_production_batch(&id(caller)?, &id(producer)?, &ids)
                .map(|_| ())
        }
        Action::VerifyProductionBatch { caller, batch } => reg
            .verify_production_batch(&id(caller)?, BatchId::new(*batch))
            .map(|_| ()),
        Action::TransferCredit { caller, credit, to } => {
            reg.transfer_credit(&id(caller)?, CreditId::new(*credit), id(to)?)
        }
        Action::RetireCredit {
            caller,
            credit,
            reason,
        } => reg.retire_credit(&id(caller)?, CreditId::new(*credit), reason),
        Action::SuspendCredit {
            caller,
            credit,
            reason,
        } => reg.suspend_credit(&id(caller)?, CreditId::new(*credit), reason),
        Action::CheckExpired { credit, expired } => {
            let actual = reg.is_credit_expired(CreditId::new(*credit))?;
            if actual == *expired {
                Ok(())
            } else {
                Err(RegistryError::Internal(format!(
                    "credit:{credit} expired={actual}, script expected {expired}"
                )))
            }
        }
        Action::Advance { days, seconds } => {
            let delta = Duration::try_days(*days)
                .zip(Duration::try_seconds(*seconds))
                .and_then(|(d, s)| d.checked_add(&s))
                .ok_or_else(|| ValidationError::InvalidTimestamp {
                    input: format!("{days}d{seconds}s"),
                    reason: "clock advance out of range".to_string(),
                })?;
            clock.advance(delta);
            Ok(())
        }
    }
}
