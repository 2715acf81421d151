//! # Transfer, Retirement and Suspension
//!
//! Owners move and retire their own verified, active credits. The
//! regulator can freeze any credit that is not retired. Only transfer
//! touches the owner index; the producer index never changes here.

use hycred_core::{AccountId, CreditId};

use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::registry::{Change, CreditRegistry, RegistryState, Staged};
use crate::roles::Role;

/// Owner check for credit-holder operations. The credit must exist first.
fn require_owner(
    state: &RegistryState,
    caller: &AccountId,
    id: CreditId,
    operation: &'static str,
) -> Result<(), RegistryError> {
    if state.credit(id)?.owner == *caller {
        Ok(())
    } else {
        Err(RegistryError::denied(caller, operation, Role::Owner))
    }
}

impl CreditRegistry {
    /// Give the credit to `to`.
    ///
    /// # Errors
    ///
    /// `NotFound`; `PermissionDenied` unless `caller` owns the credit;
    /// `InvalidStateTransition` if it is retired, not `ACTIVE`, or not
    /// `VERIFIED`.
    pub fn transfer_credit(
        &self,
        caller: &AccountId,
        id: CreditId,
        to: AccountId,
    ) -> Result<(), RegistryError> {
        self.apply("transfer credit", caller, |state, now| {
            require_owner(state, caller, id, "transfer credit")?;
            let mut credit = state.credit(id)?.clone();
            let from = credit.transfer(to.clone(), now)?;
            let staged = Staged::default()
                .event(RegistryEvent::CreditTransferred {
                    credit_id: id,
                    from: from.clone(),
                    to: to.clone(),
                })
                .change(Change::TransferCredit { credit, from });
            Ok(((), staged))
        })?;
        tracing::info!(credit_id = id.get(), from = %caller, to = %to, "credit transferred");
        Ok(())
    }

    /// Permanently consume the credit as an offset.
    ///
    /// # Errors
    ///
    /// As [`CreditRegistry::transfer_credit`].
    pub fn retire_credit(
        &self,
        caller: &AccountId,
        id: CreditId,
        reason: &str,
    ) -> Result<(), RegistryError> {
        self.apply("retire credit", caller, |state, now| {
            require_owner(state, caller, id, "retire credit")?;
            let mut credit = state.credit(id)?.clone();
            credit.retire(reason, now)?;
            let staged = Staged::default()
                .change(Change::UpdateCredit(credit))
                .event(RegistryEvent::CreditRetired {
                    credit_id: id,
                    owner: caller.clone(),
                    reason: reason.to_string(),
                });
            Ok(((), staged))
        })?;
        tracing::info!(credit_id = id.get(), owner = %caller, reason, "credit retired");
        Ok(())
    }

    /// Freeze the credit. It stays visible but can no longer move or retire.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless `caller` is the regulator; `NotFound`;
    /// `InvalidStateTransition` if retired or already suspended.
    pub fn suspend_credit(
        &self,
        caller: &AccountId,
        id: CreditId,
        reason: &str,
    ) -> Result<(), RegistryError> {
        self.apply("suspend credit", caller, |state, now| {
            state.require(caller, Role::Regulator, "suspend credit")?;
            let mut credit = state.credit(id)?.clone();
            credit.suspend(reason, caller, now)?;
            let staged = Staged::default()
                .change(Change::UpdateCredit(credit))
                .event(RegistryEvent::CreditSuspended {
                    credit_id: id,
                    regulator: caller.clone(),
                    reason: reason.to_string(),
                });
            Ok(((), staged))
        })?;
        tracing::info!(credit_id = id.get(), regulator = %caller, reason, "credit suspended");
        Ok(())
    }
}
