//! # Credit Verification
//!
//! One active auditor moves a credit out of `PENDING`, once. The credit and
//! the auditor's counters are updated in the same commit.

use hycred_core::{AccountId, CreditId};
use hycred_state::VerificationDecision;

use crate::error::{RecordRef, RegistryError};
use crate::events::RegistryEvent;
use crate::registry::{Change, CreditRegistry, Staged};
use crate::roles::Role;

impl CreditRegistry {
    /// Record an auditor's verdict on a pending credit.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless `caller` is an active auditor; `NotFound`
    /// for an unknown credit; `InvalidStateTransition` if the credit is
    /// retired or no longer `PENDING`, whoever verified it and whatever the
    /// decision.
    pub fn verify_credit(
        &self,
        caller: &AccountId,
        id: CreditId,
        decision: VerificationDecision,
        notes: &str,
    ) -> Result<(), RegistryError> {
        self.apply("verify credit", caller, |state, now| {
            state.require(caller, Role::ActiveAuditor, "verify credit")?;
            let mut credit = state.credit(id)?.clone();
            credit.verify(decision, caller, notes, now)?;

            let mut auditor = state
                .auditors
                .get(caller)
                .cloned()
                .ok_or_else(|| RegistryError::NotFound(RecordRef::Auditor(caller.clone())))?;
            auditor.record_verification(now);

            let staged = Staged::default()
                .change(Change::UpdateCredit(credit))
                .change(Change::PutAuditor(auditor))
                .event(RegistryEvent::CreditVerified {
                    credit_id: id,
                    auditor: caller.clone(),
                    decision,
                });
            Ok(((), staged))
        })?;
        tracing::info!(credit_id = id.get(), auditor = %caller, decision = %decision, "credit verified");
        Ok(())
    }
}
