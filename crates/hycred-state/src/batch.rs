//! # Production Batch Consensus
//!
//! A batch groups already-verified credits from one producer and collects
//! sign-offs from distinct auditors. The creating auditor is the first
//! entry on the roster. Once the roster reaches the quorum the batch is
//! verified for good.
//!
//! ```text
//! assemble() ──▶ roster = [creator]      verified = (1 ≥ quorum)
//!                    │
//!          record_verification(b)        b ∉ roster
//!                    ▼
//!                roster = [creator, b]   verified = (2 ≥ quorum)
//! ```
//!
//! An auditor already on the roster cannot count twice, including the
//! creator calling verify on its own batch.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hycred_core::{AccountId, BatchId, CreditId, Timestamp};

use crate::credit::{Credit, VerificationState};

/// Errors in batch assembly and verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// No credits were supplied.
    #[error("a production batch needs at least one credit")]
    Empty,

    /// The same credit was listed more than once.
    #[error("{0} is listed more than once")]
    DuplicateCredit(CreditId),

    /// A credit was produced by someone other than the batch producer.
    #[error("{credit} was produced by {actual}, not {expected}")]
    ProducerMismatch {
        credit: CreditId,
        expected: AccountId,
        actual: AccountId,
    },

    /// A credit has not passed individual verification.
    #[error("{credit} is not verified (state {state})")]
    CreditNotVerified {
        credit: CreditId,
        state: VerificationState,
    },

    /// The summed amount does not fit in 64 bits.
    #[error("batch total amount overflows")]
    AmountOverflow,

    /// Quorum was already reached.
    #[error("{0} already verified")]
    AlreadyVerified(BatchId),

    /// This auditor is already on the roster.
    #[error("auditor {auditor} already counted toward {batch}")]
    DuplicateVerifier { batch: BatchId, auditor: AccountId },
}

/// A quorum-verified group of credits from a single producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionBatch {
    pub id: BatchId,
    pub producer: AccountId,
    /// Sum of constituent amounts at creation. Never recomputed.
    pub total_amount: u64,
    pub credit_ids: Vec<CreditId>,
    /// Distinct auditors that signed off, creator first.
    pub verifiers: Vec<AccountId>,
    /// Sign-offs required, captured from configuration at creation.
    pub quorum: u32,
    pub verified: bool,
    pub created_at: Timestamp,
    pub verified_at: Option<Timestamp>,
}

impl ProductionBatch {
    /// Validate the constituents and open a batch with `creator` on the roster.
    ///
    /// # Errors
    ///
    /// `Empty`, `DuplicateCredit`, `ProducerMismatch`, `CreditNotVerified`
    /// or `AmountOverflow`.
    pub fn assemble(
        id: BatchId,
        producer: AccountId,
        credits: &[&Credit],
        creator: AccountId,
        quorum: u32,
        at: Timestamp,
    ) -> Result<Self, BatchError> {
        if credits.is_empty() {
            return Err(BatchError::Empty);
        }

        let mut seen = HashSet::with_capacity(credits.len());
        let mut total: u64 = 0;
        for credit in credits {
            if !seen.insert(credit.id) {
                return Err(BatchError::DuplicateCredit(credit.id));
            }
            if credit.producer != producer {
                return Err(BatchError::ProducerMismatch {
                    credit: credit.id,
                    expected: producer,
                    actual: credit.producer.clone(),
                });
            }
            if credit.verification != VerificationState::Verified {
                return Err(BatchError::CreditNotVerified {
                    credit: credit.id,
                    state: credit.verification,
                });
            }
            total = total
                .checked_add(credit.amount)
                .ok_or(BatchError::AmountOverflow)?;
        }

        let verified = quorum <= 1;
        Ok(Self {
            id,
            producer,
            total_amount: total,
            credit_ids: credits.iter().map(|c| c.id).collect(),
            verifiers: vec![creator],
            quorum,
            verified,
            created_at: at,
            verified_at: verified.then_some(at),
        })
    }

    /// Number of distinct auditors on the roster.
    pub fn verification_count(&self) -> u32 {
        u32::try_from(self.verifiers.len()).unwrap_or(u32::MAX)
    }

    /// Add an auditor's sign-off. Returns `true` if this call reached quorum.
    ///
    /// # Errors
    ///
    /// `AlreadyVerified` once quorum is reached; `DuplicateVerifier` if the
    /// auditor is already on the roster.
    pub fn record_verification(
        &mut self,
        auditor: AccountId,
        at: Timestamp,
    ) -> Result<bool, BatchError> {
        if self.verified {
            return Err(BatchError::AlreadyVerified(self.id));
        }
        if self.verifiers.contains(&auditor) {
            return Err(BatchError::DuplicateVerifier {
                batch: self.id,
                auditor,
            });
        }
        self.verifiers.push(auditor);
        if self.verification_count() >= self.quorum {
            self.verified = true;
            self.verified_at = Some(at);
            return Ok(true);
        }
        Ok(false)
    }
}
