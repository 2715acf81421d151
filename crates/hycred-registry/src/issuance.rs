//! # Credit Issuance
//!
//! The certifier, or the regulator, mints a credit from declared production
//! terms. Identifiers come from the credit book's counter, which only moves
//! when an issuance commits, so rejected attempts never burn an id.

use hycred_core::{AccountId, CreditId};
use hycred_state::{Credit, CreditTerms};

use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::registry::{Change, CreditRegistry, Staged};
use crate::roles::Role;

impl CreditRegistry {
    /// Issue a new `PENDING`, `ACTIVE` credit owned by `terms.owner`.
    ///
    /// Checks, in order: caller may issue; `amount > 0`;
    /// `carbon_intensity <= max_carbon_intensity`; `production_date <= now`.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless the caller is the certifier or regulator;
    /// `InvalidArgument` for the first violated term.
    pub fn issue_credit(
        &self,
        caller: &AccountId,
        terms: CreditTerms,
    ) -> Result<CreditId, RegistryError> {
        let max_ci = self.config().max_carbon_intensity;
        let summary = self.apply("issue credit", caller, |state, now| {
            if !state.caller_roles(caller).can_issue() {
                return Err(RegistryError::denied(caller, "issue credit", Role::Certifier));
            }
            terms.validate(max_ci, now)?;

            let id = state.credits.next_id();
            let credit = Credit::issue(id, terms, caller.clone(), now);
            let event = RegistryEvent::CreditIssued {
                credit_id: id,
                owner: credit.owner.clone(),
                producer: credit.producer.clone(),
                amount: credit.amount,
                production_date: credit.production_date,
            };
            let summary = (id, credit.owner.clone(), credit.producer.clone(), credit.amount);
            Ok((summary, Staged::default().change(Change::IssueCredit(credit)).event(event)))
        })?;

        let (id, owner, producer, amount) = summary;
        tracing::info!(
            credit_id = id.get(),
            certifier = %caller,
            owner = %owner,
            producer = %producer,
            amount,
            "credit issued"
        );
        Ok(id)
    }
}
