//! # Credit Registry
//!
//! [`CreditRegistry`] is a cheap-to-clone handle over shared state. Clones
//! see the same records. Mutating operations live in the sibling modules
//! ([`crate::admin`], [`crate::issuance`], [`crate::verification`],
//! [`crate::consensus`], [`crate::transfer`]) and all funnel through
//! [`CreditRegistry::apply`]:
//!
//! 1. take the write lock and read the clock,
//! 2. run the operation's closure against `&RegistryState`; it checks the
//!    caller's role and every precondition and returns a [`Staged`] set of
//!    replacement records and events,
//! 3. seal the events into notifications (the last fallible step),
//! 4. commit the staged records and notifications,
//! 5. release the lock and dispatch notifications to observers.
//!
//! The closure cannot mutate, so a failure anywhere before step 4 leaves
//! the registry exactly as it was.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use hycred_core::{AccountId, BatchId, Clock, ContentDigest, CreditId, SystemClock, Timestamp};
use hycred_state::{Auditor, Credit, CreditTransitionRecord, ProductionBatch};

use crate::books::{AuditorBook, BatchBook, CreditBook};
use crate::config::{ConfigError, RegistryConfig};
use crate::error::{ErrorKind, RecordRef, RegistryError};
use crate::events::{ChainError, Notification, NotificationLog, Observer, RegistryEvent};
use crate::roles::{CallerRoles, Role, RoleDirectory};

// ─── State ───────────────────────────────────────────────────────────

/// Everything behind the registry lock.
#[derive(Debug, Clone)]
pub(crate) struct RegistryState {
    pub(crate) roles: RoleDirectory,
    pub(crate) auditors: AuditorBook,
    pub(crate) credits: CreditBook,
    pub(crate) batches: BatchBook,
    pub(crate) log: NotificationLog,
}

impl RegistryState {
    fn new(regulator: AccountId) -> Self {
        Self {
            roles: RoleDirectory::new(regulator),
            auditors: AuditorBook::default(),
            credits: CreditBook::default(),
            batches: BatchBook::default(),
            log: NotificationLog::default(),
        }
    }

    pub(crate) fn caller_roles(&self, caller: &AccountId) -> CallerRoles {
        self.roles.resolve(caller, &self.auditors)
    }

    /// Fail with `PermissionDenied` unless `caller` holds `role`.
    pub(crate) fn require(
        &self,
        caller: &AccountId,
        role: Role,
        operation: &'static str,
    ) -> Result<(), RegistryError> {
        if self.caller_roles(caller).holds(role) {
            Ok(())
        } else {
            Err(RegistryError::denied(caller, operation, role))
        }
    }

    pub(crate) fn credit(&self, id: CreditId) -> Result<&Credit, RegistryError> {
        self.credits
            .get(id)
            .ok_or(RegistryError::NotFound(RecordRef::Credit(id)))
    }

    pub(crate) fn batch(&self, id: BatchId) -> Result<&ProductionBatch, RegistryError> {
        self.batches
            .get(id)
            .ok_or(RegistryError::NotFound(RecordRef::Batch(id)))
    }

    /// Apply staged record replacements. Infallible.
    fn commit(&mut self, changes: Vec<Change>) {
        for change in changes {
            match change {
                Change::IssueCredit(credit) => self.credits.insert_issued(credit),
                Change::UpdateCredit(credit) => self.credits.replace(credit),
                Change::TransferCredit { credit, from } => {
                    self.credits.replace_transferred(credit, &from)
                }
                Change::PutAuditor(auditor) => self.auditors.put(auditor),
                Change::PutBatch(batch) => self.batches.put(batch),
                Change::SetCertifier(certifier) => {
                    self.roles.replace_certifier(certifier);
                }
            }
        }
    }
}

/// A record replacement staged by an operation.
#[derive(Debug)]
pub(crate) enum Change {
    IssueCredit(Credit),
    UpdateCredit(Credit),
    TransferCredit { credit: Credit, from: AccountId },
    PutAuditor(Auditor),
    PutBatch(ProductionBatch),
    SetCertifier(AccountId),
}

/// Output of an operation's validation phase.
#[derive(Debug, Default)]
pub(crate) struct Staged {
    changes: Vec<Change>,
    events: Vec<RegistryEvent>,
}

impl Staged {
    pub(crate) fn change(mut self, change: Change) -> Self {
        self.changes.push(change);
        self
    }

    pub(crate) fn event(mut self, event: RegistryEvent) -> Self {
        self.events.push(event);
        self
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────

/// Point-in-time copy of every record, for ledger explorers.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub taken_at: Timestamp,
    pub config: RegistryConfig,
    pub regulator: AccountId,
    pub certifier: AccountId,
    pub next_credit_id: CreditId,
    pub next_batch_id: BatchId,
    pub auditors: Vec<Auditor>,
    pub credits: Vec<Credit>,
    pub batches: Vec<ProductionBatch>,
    pub notification_count: usize,
    pub notification_head: ContentDigest,
}

// ─── Registry ────────────────────────────────────────────────────────

/// Thread-safe handle to the credit registry.
#[derive(Clone)]
pub struct CreditRegistry {
    state: Arc<RwLock<RegistryState>>,
    observers: Arc<RwLock<Vec<Arc<dyn Observer>>>>,
    config: RegistryConfig,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CreditRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditRegistry")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("observers", &self.observers.read().len())
            .finish_non_exhaustive()
    }
}

impl CreditRegistry {
    /// A registry on the system clock. `regulator` is also the first certifier.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if `config` fails validation.
    pub fn new(regulator: AccountId, config: RegistryConfig) -> Result<Self, ConfigError> {
        Self::with_clock(regulator, config, Arc::new(SystemClock))
    }

    /// A registry reading time from `clock`.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if `config` fails validation.
    pub fn with_clock(
        regulator: AccountId,
        config: RegistryConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::info!(
            regulator = %regulator,
            max_carbon_intensity = config.max_carbon_intensity,
            min_verification_count = config.min_verification_count,
            credit_expiry_days = config.credit_expiry_days,
            "credit registry initialized"
        );
        Ok(Self {
            state: Arc::new(RwLock::new(RegistryState::new(regulator))),
            observers: Arc::new(RwLock::new(Vec::new())),
            config,
            clock,
        })
    }

    /// Attach an observer for all future notifications.
    pub fn subscribe(&self, observer: Arc<dyn Observer>) {
        self.observers.write().push(observer);
    }

    /// The configuration captured at construction.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Current time according to the registry's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Run one mutating operation atomically. See the module docs.
    pub(crate) fn apply<R>(
        &self,
        operation: &'static str,
        caller: &AccountId,
        f: impl FnOnce(&RegistryState, Timestamp) -> Result<(R, Staged), RegistryError>,
    ) -> Result<R, RegistryError> {
        let (output, notifications) = {
            let mut state = self.state.write();
            let now = self.clock.now();
            let (output, staged) = match f(&state, now) {
                Ok(staged) => staged,
                Err(err) => {
                    log_rejection(operation, caller, &err);
                    return Err(err);
                }
            };
            let sealed = state.log.seal(staged.events, now).map_err(|e| {
                tracing::error!(operation, error = %e, "notification sealing failed");
                RegistryError::Internal(e.to_string())
            })?;
            state.commit(staged.changes);
            state.log.extend(sealed.iter().cloned());
            (output, sealed)
        };

        self.dispatch(&notifications);
        Ok(output)
    }

    fn dispatch(&self, notifications: &[Notification]) {
        let observers = self.observers.read().clone();
        for notification in notifications {
            for observer in &observers {
                observer.notify(notification);
            }
        }
    }

    fn read<R>(&self, f: impl FnOnce(&RegistryState) -> R) -> R {
        f(&self.state.read())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn regulator(&self) -> AccountId {
        self.read(|s| s.roles.regulator().clone())
    }

    pub fn certifier(&self) -> AccountId {
        self.read(|s| s.roles.certifier().clone())
    }

    /// # Errors
    ///
    /// `NotFound` for unknown ids, including [`CreditId::NONE`].
    pub fn get_credit(&self, id: CreditId) -> Result<Credit, RegistryError> {
        self.read(|s| s.credit(id).cloned())
    }

    /// Ordered transition log of one credit.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids.
    pub fn credit_history(&self, id: CreditId) -> Result<Vec<CreditTransitionRecord>, RegistryError> {
        self.read(|s| s.credit(id).map(|c| c.transitions.clone()))
    }

    /// # Errors
    ///
    /// `NotFound` if the identity was never registered.
    pub fn get_auditor(&self, id: &AccountId) -> Result<Auditor, RegistryError> {
        self.read(|s| {
            s.auditors
                .get(id)
                .cloned()
                .ok_or_else(|| RegistryError::NotFound(RecordRef::Auditor(id.clone())))
        })
    }

    pub fn is_active_auditor(&self, id: &AccountId) -> bool {
        self.read(|s| s.auditors.get(id).is_some_and(|a| a.active))
    }

    /// Every auditor record, active or not, ordered by identity.
    pub fn auditors(&self) -> Vec<Auditor> {
        self.read(|s| s.auditors.iter().cloned().collect())
    }

    /// # Errors
    ///
    /// `NotFound` for unknown ids, including [`BatchId::NONE`].
    pub fn get_batch(&self, id: BatchId) -> Result<ProductionBatch, RegistryError> {
        self.read(|s| s.batch(id).cloned())
    }

    /// Every credit ever issued to `producer`, in issuance order.
    pub fn credits_by_producer(&self, producer: &AccountId) -> Vec<CreditId> {
        self.read(|s| s.credits.produced_by(producer).to_vec())
    }

    /// Credits currently held by `owner`, in no particular order.
    pub fn credits_by_owner(&self, owner: &AccountId) -> Vec<CreditId> {
        self.read(|s| s.credits.owned_by(owner).to_vec())
    }

    /// Sum of amounts over the producer's credits that are still circulating.
    pub fn total_active_credits_by_producer(&self, producer: &AccountId) -> u128 {
        self.read(|s| {
            s.credits
                .produced_by(producer)
                .iter()
                .filter_map(|id| s.credits.get(*id))
                .filter(|c| c.is_circulating())
                .map(|c| u128::from(c.amount))
                .sum()
        })
    }

    /// Whether the credit's production date is more than
    /// `credit_expiry_days` before now. Expiry changes no state.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids.
    pub fn is_credit_expired(&self, id: CreditId) -> Result<bool, RegistryError> {
        let policy = self.config.expiry_policy();
        let now = self.clock.now();
        self.read(|s| s.credit(id).map(|c| c.is_expired(&policy, now)))
    }

    pub fn credit_count(&self) -> usize {
        self.read(|s| s.credits.len())
    }

    pub fn batch_count(&self) -> usize {
        self.read(|s| s.batches.len())
    }

    /// Copy of the full notification log.
    pub fn notifications(&self) -> Vec<Notification> {
        self.read(|s| s.log.entries().to_vec())
    }

    /// Recompute the notification chain.
    ///
    /// # Errors
    ///
    /// The first broken link or digest.
    pub fn verify_notifications(&self) -> Result<(), ChainError> {
        self.read(|s| s.log.verify_chain())
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let taken_at = self.clock.now();
        self.read(|s| RegistrySnapshot {
            taken_at,
            config: self.config,
            regulator: s.roles.regulator().clone(),
            certifier: s.roles.certifier().clone(),
            next_credit_id: s.credits.next_id(),
            next_batch_id: s.batches.next_id(),
            auditors: s.auditors.iter().cloned().collect(),
            credits: s.credits.iter().cloned().collect(),
            batches: s.batches.iter().cloned().collect(),
            notification_count: s.log.len(),
            notification_head: s.log.head(),
        })
    }
}

fn log_rejection(operation: &'static str, caller: &AccountId, err: &RegistryError) {
    match err.kind() {
        ErrorKind::PermissionDenied => {
            tracing::warn!(operation, caller = %caller, error = %err, "permission denied");
        }
        kind => {
            tracing::debug!(operation, caller = %caller, kind = %kind, error = %err, "operation rejected");
        }
    }
}
