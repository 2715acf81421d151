//! # Notifications
//!
//! Every successful mutation emits one or more [`RegistryEvent`]s. The
//! registry seals them into [`Notification`]s and appends them to a
//! hash-chained [`NotificationLog`]:
//!
//! ```text
//! digest(n) = SHA-256(JCS({sequence, event_id, timestamp, event, previous}))
//! previous(1) = 0x00…00
//! previous(n) = digest(n - 1)
//! ```
//!
//! Any edit to a stored notification breaks every link after it, which
//! [`NotificationLog::verify_chain`] detects. Observers receive sealed
//! notifications after the registry lock has been released.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use hycred_core::{
    sha256_digest, AccountId, BatchId, CanonicalBytes, CanonicalizationError, ContentDigest,
    CreditId, Timestamp,
};
use hycred_state::VerificationDecision;

// ─── Events ──────────────────────────────────────────────────────────

/// A domain event. Serialized with an `event` tag carrying [`RegistryEvent::name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    CreditIssued {
        credit_id: CreditId,
        owner: AccountId,
        producer: AccountId,
        amount: u64,
        production_date: Timestamp,
    },
    CreditVerified {
        credit_id: CreditId,
        auditor: AccountId,
        decision: VerificationDecision,
    },
    CreditTransferred {
        credit_id: CreditId,
        from: AccountId,
        to: AccountId,
    },
    CreditRetired {
        credit_id: CreditId,
        owner: AccountId,
        reason: String,
    },
    CreditSuspended {
        credit_id: CreditId,
        regulator: AccountId,
        reason: String,
    },
    AuditorRegistered {
        auditor: AccountId,
        name: String,
    },
    AuditorDeactivated {
        auditor: AccountId,
    },
    CertifierUpdated {
        previous: AccountId,
        current: AccountId,
    },
    ProductionBatchCreated {
        batch_id: BatchId,
        producer: AccountId,
        total_amount: u64,
        auditor: AccountId,
    },
    /// An auditor's sign-off was counted.
    ProductionBatchSignedOff {
        batch_id: BatchId,
        auditor: AccountId,
        verification_count: u32,
    },
    /// Quorum reached. Emitted once per batch.
    ProductionBatchVerified {
        batch_id: BatchId,
        verification_count: u32,
    },
}

impl RegistryEvent {
    /// The event name, identical to the serialized `event` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreditIssued { .. } => "credit_issued",
            Self::CreditVerified { .. } => "credit_verified",
            Self::CreditTransferred { .. } => "credit_transferred",
            Self::CreditRetired { .. } => "credit_retired",
            Self::CreditSuspended { .. } => "credit_suspended",
            Self::AuditorRegistered { .. } => "auditor_registered",
            Self::AuditorDeactivated { .. } => "auditor_deactivated",
            Self::CertifierUpdated { .. } => "certifier_updated",
            Self::ProductionBatchCreated { .. } => "production_batch_created",
            Self::ProductionBatchSignedOff { .. } => "production_batch_signed_off",
            Self::ProductionBatchVerified { .. } => "production_batch_verified",
        }
    }

    /// The credit this event concerns, if any.
    pub fn credit_id(&self) -> Option<CreditId> {
        match self {
            Self::CreditIssued { credit_id, .. }
            | Self::CreditVerified { credit_id, .. }
            | Self::CreditTransferred { credit_id, .. }
            | Self::CreditRetired { credit_id, .. }
            | Self::CreditSuspended { credit_id, .. } => Some(*credit_id),
            _ => None,
        }
    }
}

// ─── Sealed notifications ────────────────────────────────────────────

/// A sealed, chained event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Position in the log, starting at 1.
    pub sequence: u64,
    pub event_id: Uuid,
    pub timestamp: Timestamp,
    pub event: RegistryEvent,
    /// Digest of the preceding notification, zero for the first.
    pub previous: ContentDigest,
    pub digest: ContentDigest,
}

/// The digested portion of a notification.
#[derive(Serialize)]
struct NotificationBody<'a> {
    sequence: u64,
    event_id: &'a Uuid,
    timestamp: &'a Timestamp,
    event: &'a RegistryEvent,
    previous: &'a ContentDigest,
}

impl Notification {
    /// Recompute the digest from the body fields.
    ///
    /// # Errors
    ///
    /// Propagates canonicalization failure.
    pub fn compute_digest(&self) -> Result<ContentDigest, CanonicalizationError> {
        digest_body(
            self.sequence,
            &self.event_id,
            &self.timestamp,
            &self.event,
            &self.previous,
        )
    }
}

fn digest_body(
    sequence: u64,
    event_id: &Uuid,
    timestamp: &Timestamp,
    event: &RegistryEvent,
    previous: &ContentDigest,
) -> Result<ContentDigest, CanonicalizationError> {
    let body = NotificationBody {
        sequence,
        event_id,
        timestamp,
        event,
        previous,
    };
    Ok(sha256_digest(&CanonicalBytes::new(&body)?))
}

/// Why a notification chain failed verification.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    #[error("expected sequence {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },

    #[error("notification {sequence} does not link to its predecessor")]
    BrokenLink { sequence: u64 },

    #[error("notification {sequence} digest does not match its contents")]
    DigestMismatch { sequence: u64 },

    #[error("notification {sequence} cannot be canonicalized: {reason}")]
    Canonicalization { sequence: u64, reason: String },
}

// ─── Log ─────────────────────────────────────────────────────────────

/// Append-only, hash-chained notification log.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    /// Digest of the last notification, or zero when empty.
    pub fn head(&self) -> ContentDigest {
        self.entries
            .last()
            .map_or_else(ContentDigest::zero, |n| n.digest)
    }

    /// The sequence number the next notification will carry.
    pub fn next_sequence(&self) -> u64 {
        self.entries.last().map_or(1, |n| n.sequence.saturating_add(1))
    }

    /// Seal `events` as the continuation of this log without appending them.
    ///
    /// # Errors
    ///
    /// Canonicalization failure of any event. Nothing is sealed in that case.
    pub fn seal(
        &self,
        events: Vec<RegistryEvent>,
        at: Timestamp,
    ) -> Result<Vec<Notification>, CanonicalizationError> {
        let mut previous = self.head();
        let mut sequence = self.next_sequence();
        let mut sealed = Vec::with_capacity(events.len());
        for event in events {
            let event_id = Uuid::new_v4();
            let digest = digest_body(sequence, &event_id, &at, &event, &previous)?;
            sealed.push(Notification {
                sequence,
                event_id,
                timestamp: at,
                event,
                previous,
                digest,
            });
            previous = digest;
            sequence = sequence.saturating_add(1);
        }
        Ok(sealed)
    }

    /// Append notifications produced by [`NotificationLog::seal`] on this log.
    pub(crate) fn extend(&mut self, sealed: impl IntoIterator<Item = Notification>) {
        self.entries.extend(sealed);
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recompute every digest and link.
    ///
    /// # Errors
    ///
    /// The first inconsistency found.
    pub fn verify_chain(&self) -> Result<(), ChainError> {
        verify_chain(&self.entries)
    }
}

/// Verify a standalone sequence of notifications starting from sequence 1.
///
/// # Errors
///
/// The first inconsistency found.
pub fn verify_chain(entries: &[Notification]) -> Result<(), ChainError> {
    let mut previous = ContentDigest::zero();
    for (expected, n) in (1u64..).zip(entries) {
        if n.sequence != expected {
            return Err(ChainError::SequenceGap {
                expected,
                found: n.sequence,
            });
        }
        if n.previous != previous {
            return Err(ChainError::BrokenLink {
                sequence: n.sequence,
            });
        }
        let digest = n
            .compute_digest()
            .map_err(|e| ChainError::Canonicalization {
                sequence: n.sequence,
                reason: e.to_string(),
            })?;
        if digest != n.digest {
            return Err(ChainError::DigestMismatch {
                sequence: n.sequence,
            });
        }
        previous = n.digest;
    }
    Ok(())
}

// ─── Observers ───────────────────────────────────────────────────────

/// Receives every notification, in sequence order.
///
/// Called outside the registry lock; an observer may query the registry.
pub trait Observer: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes each notification to the `tracing` stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn notify(&self, notification: &Notification) {
        tracing::info!(
            target: "hycred::notifications",
            sequence = notification.sequence,
            event = notification.event.name(),
            event_id = %notification.event_id,
            credit_id = notification.event.credit_id().map(|c| c.get()),
            digest = %notification.digest,
            "notification"
        );
    }
}
