//! # Production Batch Consensus
//!
//! Auditors group a producer's verified credits into a batch and sign it
//! off. The batch becomes verified when `min_verification_count` distinct
//! auditors, the creator included, are on its roster. The quorum is
//! captured from configuration when the batch is created.

use hycred_core::{AccountId, BatchId, CreditId};
use hycred_state::{Credit, ProductionBatch};

use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::registry::{Change, CreditRegistry, Staged};
use crate::roles::Role;

impl CreditRegistry {
    /// Open a batch over `credit_ids`, counting the caller as its first sign-off.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless `caller` is an active auditor; `NotFound`
    /// for an unknown credit; `InvalidArgument` for an empty or duplicated
    /// list, a credit from another producer, or an overflowing total;
    /// `InvalidStateTransition` if a credit is not `VERIFIED`.
    pub fn create_production_batch(
        &self,
        caller: &AccountId,
        producer: &AccountId,
        credit_ids: &[CreditId],
    ) -> Result<BatchId, RegistryError> {
        let quorum = self.config().min_verification_count;
        let (batch_id, total, verified) =
            self.apply("create production batch", caller, |state, now| {
                state.require(caller, Role::ActiveAuditor, "create production batch")?;
                let credits = credit_ids
                    .iter()
                    .map(|id| state.credit(*id))
                    .collect::<Result<Vec<&Credit>, _>>()?;

                let id = state.batches.next_id();
                let batch = ProductionBatch::assemble(
                    id,
                    producer.clone(),
                    &credits,
                    caller.clone(),
                    quorum,
                    now,
                )?;

                let mut staged = Staged::default().event(RegistryEvent::ProductionBatchCreated {
                    batch_id: id,
                    producer: producer.clone(),
                    total_amount: batch.total_amount,
                    auditor: caller.clone(),
                });
                if batch.verified {
                    staged = staged.event(RegistryEvent::ProductionBatchVerified {
                        batch_id: id,
                        verification_count: batch.verification_count(),
                    });
                }
                let summary = (id, batch.total_amount, batch.verified);
                Ok((summary, staged.change(Change::PutBatch(batch))))
            })?;

        tracing::info!(
            batch_id = batch_id.get(),
            producer = %producer,
            auditor = %caller,
            credits = credit_ids.len(),
            total_amount = total,
            verified,
            "production batch created"
        );
        Ok(batch_id)
    }

    /// Add the caller's sign-off. Returns whether the batch is now verified.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless `caller` is an active auditor; `NotFound`
    /// for an unknown batch; `InvalidStateTransition` if the batch is
    /// already verified or the caller has already signed it.
    pub fn verify_production_batch(
        &self,
        caller: &AccountId,
        batch_id: BatchId,
    ) -> Result<bool, RegistryError> {
        let (count, verified) = self.apply("verify production batch", caller, |state, now| {
            state.require(caller, Role::ActiveAuditor, "verify production batch")?;
            let mut batch = state.batch(batch_id)?.clone();
            let reached = batch.record_verification(caller.clone(), now)?;
            let count = batch.verification_count();

            let mut staged = Staged::default().event(RegistryEvent::ProductionBatchSignedOff {
                batch_id,
                auditor: caller.clone(),
                verification_count: count,
            });
            if reached {
                staged = staged.event(RegistryEvent::ProductionBatchVerified {
                    batch_id,
                    verification_count: count,
                });
            }
            Ok(((count, batch.verified), staged.change(Change::PutBatch(batch))))
        })?;

        tracing::info!(
            batch_id = batch_id.get(),
            auditor = %caller,
            verification_count = count,
            verified,
            "production batch signed off"
        );
        Ok(verified)
    }
}
