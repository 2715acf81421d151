//! # Auditor Accreditation
//!
//! Auditors are registered and deactivated by the regulator. Deactivation
//! is a flag flip: the record, including its verification counters, stays
//! in the registry for audit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hycred_core::{AccountId, Timestamp};

/// Errors in auditor registration and status changes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditorError {
    /// The identity already has an auditor record.
    #[error("auditor {0} is already registered")]
    AlreadyRegistered(AccountId),

    /// The identity has no auditor record.
    #[error("auditor {0} is not registered")]
    NotRegistered(AccountId),

    /// The auditor was already deactivated.
    #[error("auditor {0} is already inactive")]
    AlreadyInactive(AccountId),
}

/// An accredited verifier of credits and production batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auditor {
    pub id: AccountId,
    pub name: String,
    /// Accreditation reference, e.g. a certification body number.
    pub accreditation: String,
    pub active: bool,
    /// Credits this auditor has moved out of `Pending`.
    pub verification_count: u64,
    pub last_verification: Option<Timestamp>,
    pub registered_at: Timestamp,
    pub deactivated_at: Option<Timestamp>,
}

impl Auditor {
    /// A newly accredited, active auditor with no history.
    pub fn register(id: AccountId, name: String, accreditation: String, at: Timestamp) -> Self {
        Self {
            id,
            name,
            accreditation,
            active: true,
            verification_count: 0,
            last_verification: None,
            registered_at: at,
            deactivated_at: None,
        }
    }

    /// Soft-delete the auditor.
    ///
    /// # Errors
    ///
    /// [`AuditorError::AlreadyInactive`] on a second call.
    pub fn deactivate(&mut self, at: Timestamp) -> Result<(), AuditorError> {
        if !self.active {
            return Err(AuditorError::AlreadyInactive(self.id.clone()));
        }
        self.active = false;
        self.deactivated_at = Some(at);
        Ok(())
    }

    /// Count one credit verification.
    pub fn record_verification(&mut self, at: Timestamp) {
        self.verification_count = self.verification_count.saturating_add(1);
        self.last_verification = Some(at);
    }
}
