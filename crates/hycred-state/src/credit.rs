//! # Credit Lifecycle State Machine
//!
//! A credit carries two independent state axes.
//!
//! ```text
//! verification:  Pending ──verify()──▶ Verified
//!                   │
//!                   └─────verify()──▶ Rejected        (both terminal)
//!
//! lifecycle:     Active ──retire()───▶ Retired        (terminal)
//!                  │
//!                  └─────suspend()──▶ Suspended       (terminal here)
//! ```
//!
//! Transfer and retirement require `Verified` *and* `Active`. Suspension is
//! allowed from any verification state but never from `Retired`, which keeps
//! "retired" and "lifecycle is Retired" the same fact.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hycred_core::{AccountId, CreditId, Timestamp, ValidationError};

use crate::expiry::ExpiryPolicy;

// ─── States ──────────────────────────────────────────────────────────

/// Outcome of the single-auditor verification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationState {
    /// Issued, awaiting an auditor.
    Pending,
    /// Accepted by an auditor. Transferable and retirable.
    Verified,
    /// Refused by an auditor. Kept for audit, never transferable.
    Rejected,
}

impl VerificationState {
    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Verified => "VERIFIED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for VerificationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verification verdict. `Pending` is not a verdict, so it cannot be passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationDecision {
    /// Accept the credit.
    Verified,
    /// Refuse the credit.
    Rejected,
}

impl From<VerificationDecision> for VerificationState {
    fn from(decision: VerificationDecision) -> Self {
        match decision {
            VerificationDecision::Verified => Self::Verified,
            VerificationDecision::Rejected => Self::Rejected,
        }
    }
}

impl std::fmt::Display for VerificationDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        VerificationState::from(*self).fmt(f)
    }
}

/// Circulation state of a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    /// In circulation.
    Active,
    /// Permanently consumed as an offset.
    Retired,
    /// Frozen by the regulator.
    Suspended,
}

impl LifecycleState {
    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Retired => "RETIRED",
            Self::Suspended => "SUSPENDED",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// A credit transition was refused because of the credit's current state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreditError {
    /// Verification already left `Pending`.
    #[error("{id} already verified (state {state})")]
    AlreadyVerified {
        /// The credit.
        id: CreditId,
        /// Its current verification state.
        state: VerificationState,
    },

    /// The credit has been retired.
    #[error("{id} already retired")]
    AlreadyRetired {
        /// The credit.
        id: CreditId,
    },

    /// The credit is already suspended.
    #[error("{id} already suspended")]
    AlreadySuspended {
        /// The credit.
        id: CreditId,
    },

    /// The lifecycle is not `Active`.
    #[error("{id} is not active (state {state})")]
    NotActive {
        /// The credit.
        id: CreditId,
        /// Its current lifecycle state.
        state: LifecycleState,
    },

    /// Verification is not `Verified`.
    #[error("{id} is not verified (state {state})")]
    NotVerified {
        /// The credit.
        id: CreditId,
        /// Its current verification state.
        state: VerificationState,
    },
}

// ─── Issuance Terms ──────────────────────────────────────────────────

/// Everything a certifier declares when issuing a credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTerms {
    /// Initial owner.
    pub owner: AccountId,
    /// Producing facility's identity. Fixed for the life of the credit.
    pub producer: AccountId,
    /// Producer display name.
    pub producer_name: String,
    /// Quantity of hydrogen in kilograms.
    pub amount: u64,
    /// When the hydrogen was produced.
    pub production_date: Timestamp,
    /// Renewable source tag, e.g. "solar" or "wind".
    pub renewable_source: String,
    /// Free-text production location.
    pub location: String,
    /// Carbon intensity in gCO2/kWh.
    pub carbon_intensity: u32,
    /// Free-text metadata.
    pub metadata: String,
}

impl CreditTerms {
    /// Check quantity, carbon intensity and production date, in that order.
    ///
    /// # Errors
    ///
    /// The first violated condition.
    pub fn validate(&self, max_carbon_intensity: u32, now: Timestamp) -> Result<(), ValidationError> {
        if self.amount == 0 {
            return Err(ValidationError::NonPositiveAmount);
        }
        if self.carbon_intensity > max_carbon_intensity {
            return Err(ValidationError::CarbonIntensityExceeded {
                value: self.carbon_intensity,
                max: max_carbon_intensity,
            });
        }
        if self.production_date > now {
            return Err(ValidationError::FutureProductionDate {
                production: self.production_date,
                now,
            });
        }
        Ok(())
    }
}

// ─── Transition Log ──────────────────────────────────────────────────

/// What happened to a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditTransitionKind {
    Issued,
    Verified,
    Rejected,
    Transferred,
    Retired,
    Suspended,
}

/// One entry in a credit's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTransitionRecord {
    /// What happened.
    pub kind: CreditTransitionKind,
    /// Who caused it.
    pub actor: AccountId,
    /// When.
    pub timestamp: Timestamp,
    /// Reason, notes, or the receiving owner for transfers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

// ─── Credit ──────────────────────────────────────────────────────────

/// A certified quantity of green hydrogen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub id: CreditId,
    pub owner: AccountId,
    pub producer: AccountId,
    pub producer_name: String,
    pub amount: u64,
    pub production_date: Timestamp,
    pub renewable_source: String,
    pub location: String,
    pub carbon_intensity: u32,
    pub metadata: String,
    pub verification: VerificationState,
    pub lifecycle: LifecycleState,
    /// Mirror of `lifecycle == Retired` for readers of the serialized record.
    #[serde(default)]
    is_retired: bool,
    pub certifier: AccountId,
    pub certification_date: Timestamp,
    /// Auditor that moved the credit out of `Pending`.
    pub verified_by: Option<AccountId>,
    pub verification_notes: Option<String>,
    pub retirement_date: Option<Timestamp>,
    pub retirement_reason: Option<String>,
    pub suspension_reason: Option<String>,
    /// Ordered history of every transition since issuance.
    pub transitions: Vec<CreditTransitionRecord>,
}

impl Credit {
    /// Build a freshly issued credit: `Pending`, `Active`.
    ///
    /// Terms are assumed to have passed [`CreditTerms::validate`].
    pub fn issue(id: CreditId, terms: CreditTerms, certifier: AccountId, at: Timestamp) -> Self {
        let issued = CreditTransitionRecord {
            kind: CreditTransitionKind::Issued,
            actor: certifier.clone(),
            timestamp: at,
            detail: None,
        };
        Self {
            id,
            owner: terms.owner,
            producer: terms.producer,
            producer_name: terms.producer_name,
            amount: terms.amount,
            production_date: terms.production_date,
            renewable_source: terms.renewable_source,
            location: terms.location,
            carbon_intensity: terms.carbon_intensity,
            metadata: terms.metadata,
            verification: VerificationState::Pending,
            lifecycle: LifecycleState::Active,
            is_retired: false,
            certifier,
            certification_date: at,
            verified_by: None,
            verification_notes: None,
            retirement_date: None,
            retirement_reason: None,
            suspension_reason: None,
            transitions: vec![issued],
        }
    }

    /// Whether the credit has been retired. Equivalent to `lifecycle == Retired`.
    pub fn is_retired(&self) -> bool {
        self.lifecycle == LifecycleState::Retired
    }

    /// Active and not retired: counts toward a producer's circulating total.
    pub fn is_circulating(&self) -> bool {
        self.lifecycle == LifecycleState::Active && !self.is_retired()
    }

    /// Whether the credit has aged past the policy's validity window.
    pub fn is_expired(&self, policy: &ExpiryPolicy, now: Timestamp) -> bool {
        policy.is_expired(self.production_date, now)
    }

    /// Record an auditor's verdict (`PENDING → VERIFIED | REJECTED`).
    ///
    /// # Errors
    ///
    /// `AlreadyRetired` if retired, `AlreadyVerified` if not `Pending`.
    pub fn verify(
        &mut self,
        decision: VerificationDecision,
        auditor: &AccountId,
        notes: &str,
        at: Timestamp,
    ) -> Result<(), CreditError> {
        if self.is_retired() {
            return Err(CreditError::AlreadyRetired { id: self.id });
        }
        if self.verification != VerificationState::Pending {
            return Err(CreditError::AlreadyVerified {
                id: self.id,
                state: self.verification,
            });
        }
        self.verification = decision.into();
        self.verified_by = Some(auditor.clone());
        self.verification_notes = non_empty(notes);
        let kind = match decision {
            VerificationDecision::Verified => CreditTransitionKind::Verified,
            VerificationDecision::Rejected => CreditTransitionKind::Rejected,
        };
        self.record(kind, auditor, at, non_empty(notes));
        Ok(())
    }

    /// Shared precondition for transfer and retirement.
    ///
    /// # Errors
    ///
    /// `AlreadyRetired`, `NotActive` or `NotVerified`, checked in that order.
    pub fn ensure_movable(&self) -> Result<(), CreditError> {
        if self.is_retired() {
            return Err(CreditError::AlreadyRetired { id: self.id });
        }
        if self.lifecycle != LifecycleState::Active {
            return Err(CreditError::NotActive {
                id: self.id,
                state: self.lifecycle,
            });
        }
        if self.verification != VerificationState::Verified {
            return Err(CreditError::NotVerified {
                id: self.id,
                state: self.verification,
            });
        }
        Ok(())
    }

    /// Hand the credit to a new owner. Returns the previous owner.
    ///
    /// Index maintenance is the caller's job.
    ///
    /// # Errors
    ///
    /// See [`Credit::ensure_movable`].
    pub fn transfer(&mut self, to: AccountId, at: Timestamp) -> Result<AccountId, CreditError> {
        self.ensure_movable()?;
        let detail = Some(format!("{} -> {}", self.owner, to));
        let previous = std::mem::replace(&mut self.owner, to);
        self.record(CreditTransitionKind::Transferred, &previous, at, detail);
        Ok(previous)
    }

    /// Retire the credit permanently (`ACTIVE → RETIRED`).
    ///
    /// # Errors
    ///
    /// See [`Credit::ensure_movable`].
    pub fn retire(&mut self, reason: &str, at: Timestamp) -> Result<(), CreditError> {
        self.ensure_movable()?;
        self.lifecycle = LifecycleState::Retired;
        self.is_retired = true;
        self.retirement_date = Some(at);
        self.retirement_reason = Some(reason.to_string());
        let owner = self.owner.clone();
        self.record(CreditTransitionKind::Retired, &owner, at, Some(reason.to_string()));
        Ok(())
    }

    /// Freeze the credit (`ACTIVE → SUSPENDED`), whatever its verification state.
    ///
    /// # Errors
    ///
    /// `AlreadyRetired` or `AlreadySuspended`.
    pub fn suspend(
        &mut self,
        reason: &str,
        regulator: &AccountId,
        at: Timestamp,
    ) -> Result<(), CreditError> {
        match self.lifecycle {
            LifecycleState::Retired => Err(CreditError::AlreadyRetired { id: self.id }),
            LifecycleState::Suspended => Err(CreditError::AlreadySuspended { id: self.id }),
            LifecycleState::Active => {
                self.lifecycle = LifecycleState::Suspended;
                self.suspension_reason = Some(reason.to_string());
                self.record(
                    CreditTransitionKind::Suspended,
                    regulator,
                    at,
                    Some(reason.to_string()),
                );
                Ok(())
            }
        }
    }

    fn record(
        &mut self,
        kind: CreditTransitionKind,
        actor: &AccountId,
        at: Timestamp,
        detail: Option<String>,
    ) {
        self.transitions.push(CreditTransitionRecord {
            kind,
            actor: actor.clone(),
            timestamp: at,
            detail,
        });
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn terms() -> CreditTerms {
        CreditTerms {
            owner: acct("producer-1"),
            producer: acct("producer-1"),
            producer_name: "Atacama Electrolysis".to_string(),
            amount: 1000,
            production_date: ts("2026-01-10T00:00:00Z"),
            renewable_source: "solar".to_string(),
            location: "Antofagasta, CL".to_string(),
            carbon_intensity: 25,
            metadata: "{}".to_string(),
        }
    }

    fn make_credit() -> Credit {
        Credit::issue(
            CreditId::FIRST,
            terms(),
            acct("certifier"),
            ts("2026-01-11T00:00:00Z"),
        )
    }

    fn make_verified() -> Credit {
        let mut c = make_credit();
        c.verify(
            VerificationDecision::Verified,
            &acct("auditor-a"),
            "site visit ok",
            ts("2026-01-12T00:00:00Z"),
        )
        .unwrap();
        c
    }

    // ── Issuance terms ───────────────────────────────────────────────

    #[test]
    fn terms_boundaries() {
        let now = ts("2026-01-10T00:00:00Z");
        let mut t = terms();
        t.carbon_intensity = 50;
        assert!(t.validate(50, now).is_ok());
        t.carbon_intensity = 51;
        assert_eq!(
            t.validate(50, now),
            Err(ValidationError::CarbonIntensityExceeded { value: 51, max: 50 })
        );

        let mut t = terms();
        t.production_date = now;
        assert!(t.validate(50, now).is_ok());
        t.production_date = ts("2026-01-10T00:00:01Z");
        assert!(matches!(
            t.validate(50, now),
            Err(ValidationError::FutureProductionDate { .. })
        ));
    }

    #[test]
    fn terms_report_first_violation() {
        let mut t = terms();
        t.amount = 0;
        t.carbon_intensity = 99;
        t.production_date = ts("2030-01-01T00:00:00Z");
        assert_eq!(
            t.validate(50, ts("2026-01-10T00:00:00Z")),
            Err(ValidationError::NonPositiveAmount)
        );
    }

    // ── Verification ─────────────────────────────────────────────────

    #[test]
    fn new_credit_is_pending_and_active() {
        let c = make_credit();
        assert_eq!(c.verification, VerificationState::Pending);
        assert_eq!(c.lifecycle, LifecycleState::Active);
        assert!(!c.is_retired());
        assert_eq!(c.transitions.len(), 1);
        assert_eq!(c.transitions[0].kind, CreditTransitionKind::Issued);
    }

    #[test]
    fn verify_records_auditor_and_notes() {
        let c = make_verified();
        assert_eq!(c.verification, VerificationState::Verified);
        assert_eq!(c.verified_by, Some(acct("auditor-a")));
        assert_eq!(c.verification_notes.as_deref(), Some("site visit ok"));
    }

    #[test]
    fn second_verification_fails_whatever_the_decision() {
        let mut c = make_verified();
        for decision in [VerificationDecision::Verified, VerificationDecision::Rejected] {
            let err = c
                .verify(decision, &acct("auditor-b"), "", ts("2026-01-13T00:00:00Z"))
                .unwrap_err();
            assert_eq!(
                err,
                CreditError::AlreadyVerified {
                    id: CreditId::FIRST,
                    state: VerificationState::Verified
                }
            );
        }
        assert_eq!(c.verified_by, Some(acct("auditor-a")));
    }

    #[test]
    fn rejected_credit_cannot_move() {
        let mut c = make_credit();
        c.verify(
            VerificationDecision::Rejected,
            &acct("auditor-a"),
            "meter data missing",
            ts("2026-01-12T00:00:00Z"),
        )
        .unwrap();
        assert!(matches!(
            c.ensure_movable(),
            Err(CreditError::NotVerified { state: VerificationState::Rejected, .. })
        ));
    }

    // ── Transfer / retire ────────────────────────────────────────────

    #[test]
    fn pending_credit_cannot_transfer() {
        let mut c = make_credit();
        let err = c.transfer(acct("buyer"), ts("2026-01-12T00:00:00Z")).unwrap_err();
        assert!(matches!(err, CreditError::NotVerified { .. }));
        assert_eq!(c.owner, acct("producer-1"));
    }

    #[test]
    fn transfer_keeps_producer_and_amount() {
        let mut c = make_verified();
        let prev = c.transfer(acct("buyer"), ts("2026-01-13T00:00:00Z")).unwrap();
        assert_eq!(prev, acct("producer-1"));
        assert_eq!(c.owner, acct("buyer"));
        assert_eq!(c.producer, acct("producer-1"));
        assert_eq!(c.amount, 1000);
    }

    #[test]
    fn retire_is_permanent() {
        let mut c = make_verified();
        c.retire("offset", ts("2026-01-14T00:00:00Z")).unwrap();
        assert!(c.is_retired());
        assert_eq!(c.lifecycle, LifecycleState::Retired);
        assert_eq!(c.retirement_reason.as_deref(), Some("offset"));
        assert_eq!(
            c.retire("again", ts("2026-01-15T00:00:00Z")),
            Err(CreditError::AlreadyRetired { id: CreditId::FIRST })
        );
        assert!(c.transfer(acct("x"), ts("2026-01-15T00:00:00Z")).is_err());
        assert!(c
            .verify(VerificationDecision::Verified, &acct("a"), "", ts("2026-01-15T00:00:00Z"))
            .is_err());
    }

    // ── Suspension ───────────────────────────────────────────────────

    #[test]
    fn suspension_blocks_movement_but_not_retired_flag() {
        let mut c = make_verified();
        c.suspend("fraud investigation", &acct("regulator"), ts("2026-01-13T00:00:00Z"))
            .unwrap();
        assert_eq!(c.lifecycle, LifecycleState::Suspended);
        assert!(!c.is_retired());
        assert!(!c.is_circulating());
        assert!(matches!(c.ensure_movable(), Err(CreditError::NotActive { .. })));
    }

    #[test]
    fn pending_credit_can_be_suspended() {
        let mut c = make_credit();
        c.suspend("hold", &acct("regulator"), ts("2026-01-13T00:00:00Z"))
            .unwrap();
        assert_eq!(c.verification, VerificationState::Pending);
        assert_eq!(
            c.suspend("hold", &acct("regulator"), ts("2026-01-13T00:00:00Z")),
            Err(CreditError::AlreadySuspended { id: CreditId::FIRST })
        );
    }

    #[test]
    fn retired_credit_cannot_be_suspended() {
        let mut c = make_verified();
        c.retire("offset", ts("2026-01-14T00:00:00Z")).unwrap();
        assert_eq!(
            c.suspend("late", &acct("regulator"), ts("2026-01-15T00:00:00Z")),
            Err(CreditError::AlreadyRetired { id: CreditId::FIRST })
        );
        assert!(c.is_retired());
    }

    // ── History / serde ──────────────────────────────────────────────

    #[test]
    fn history_tracks_every_transition() {
        let mut c = make_verified();
        c.transfer(acct("buyer"), ts("2026-01-13T00:00:00Z")).unwrap();
        c.retire("offset", ts("2026-01-14T00:00:00Z")).unwrap();
        let kinds: Vec<_> = c.transitions.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CreditTransitionKind::Issued,
                CreditTransitionKind::Verified,
                CreditTransitionKind::Transferred,
                CreditTransitionKind::Retired,
            ]
        );
        assert_eq!(c.transitions[3].actor, acct("buyer"));
    }

    #[test]
    fn terms_from_json_with_subsecond_date_are_not_future() {
        let mut json = serde_json::to_value(terms()).unwrap();
        json["production_date"] = "2026-01-10T00:00:00.750Z".into();
        let t: CreditTerms = serde_json::from_value(json).unwrap();
        assert_eq!(t.production_date, ts("2026-01-10T00:00:00Z"));
        assert!(t.validate(50, ts("2026-01-10T00:00:00Z")).is_ok());

        let mut json = serde_json::to_value(terms()).unwrap();
        json["production_date"] = "2026-01-10T05:00:00+05:00".into();
        assert!(serde_json::from_value::<CreditTerms>(json).is_err());
    }

    #[test]
    fn serialized_credit_carries_retired_flag() {
        let mut c = make_verified();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["is_retired"], false);

        c.retire("offset", ts("2026-01-14T00:00:00Z")).unwrap();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["is_retired"], true);
        assert_eq!(json["lifecycle"], "RETIRED");

        let back: Credit = serde_json::from_value(json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn state_names_serialize_upper_case() {
        assert_eq!(
            serde_json::to_string(&VerificationState::Pending).unwrap(),
            "\"PENDING\""
        );
        assert_eq!(
            serde_json::to_string(&LifecycleState::Suspended).unwrap(),
            "\"SUSPENDED\""
        );
        assert_eq!(VerificationDecision::Rejected.to_string(), "REJECTED");
    }
}
