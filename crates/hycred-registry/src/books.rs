//! # Record Books
//!
//! Plain, single-threaded containers for auditors, credits and batches.
//! They hold no locks and perform no authorization; [`crate::CreditRegistry`]
//! wraps them in its lock and is the only writer.
//!
//! The credit book also owns the two ownership indexes:
//!
//! - **producer index**: append-only list of every credit a producer was
//!   issued. Transfers never touch it.
//! - **owner index**: credits currently held by each identity. Removal is
//!   `Vec::swap_remove`, so the order of an owner's list is not meaningful.

use std::collections::{BTreeMap, HashMap};

use hycred_core::{AccountId, BatchId, CreditId};
use hycred_state::{Auditor, Credit, ProductionBatch};

// ─── Auditors ────────────────────────────────────────────────────────

/// Auditor records keyed by identity. Records are never removed.
#[derive(Debug, Clone, Default)]
pub struct AuditorBook {
    auditors: BTreeMap<AccountId, Auditor>,
}

impl AuditorBook {
    pub fn get(&self, id: &AccountId) -> Option<&Auditor> {
        self.auditors.get(id)
    }

    pub fn contains(&self, id: &AccountId) -> bool {
        self.auditors.contains_key(id)
    }

    /// Insert or replace a record.
    pub fn put(&mut self, auditor: Auditor) {
        self.auditors.insert(auditor.id.clone(), auditor);
    }

    /// All records ordered by identity.
    pub fn iter(&self) -> impl Iterator<Item = &Auditor> {
        self.auditors.values()
    }

    pub fn len(&self) -> usize {
        self.auditors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.auditors.is_empty()
    }
}

// ─── Credits ─────────────────────────────────────────────────────────

/// Credit records, the next-id counter, and the ownership indexes.
#[derive(Debug, Clone)]
pub struct CreditBook {
    credits: BTreeMap<CreditId, Credit>,
    next_id: CreditId,
    by_producer: HashMap<AccountId, Vec<CreditId>>,
    by_owner: HashMap<AccountId, Vec<CreditId>>,
}

impl Default for CreditBook {
    fn default() -> Self {
        Self {
            credits: BTreeMap::new(),
            next_id: CreditId::FIRST,
            by_producer: HashMap::new(),
            by_owner: HashMap::new(),
        }
    }
}

impl CreditBook {
    /// The identifier the next issued credit will receive.
    pub fn next_id(&self) -> CreditId {
        self.next_id
    }

    pub fn get(&self, id: CreditId) -> Option<&Credit> {
        self.credits.get(&id)
    }

    /// All credits in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Credit> {
        self.credits.values()
    }

    pub fn len(&self) -> usize {
        self.credits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credits.is_empty()
    }

    /// Credits issued to `producer`, in issuance order.
    pub fn produced_by(&self, producer: &AccountId) -> &[CreditId] {
        self.by_producer.get(producer).map_or(&[], Vec::as_slice)
    }

    /// Credits currently held by `owner`. Order is unspecified.
    pub fn owned_by(&self, owner: &AccountId) -> &[CreditId] {
        self.by_owner.get(owner).map_or(&[], Vec::as_slice)
    }

    /// Store a newly issued credit, index it, and advance the counter past it.
    pub(crate) fn insert_issued(&mut self, credit: Credit) {
        let id = credit.id;
        self.by_producer
            .entry(credit.producer.clone())
            .or_default()
            .push(id);
        self.by_owner.entry(credit.owner.clone()).or_default().push(id);
        self.credits.insert(id, credit);
        if id >= self.next_id {
            self.next_id = CreditId::new(id.get().saturating_add(1));
        }
    }

    /// Replace an existing credit without touching the indexes.
    pub(crate) fn replace(&mut self, credit: Credit) {
        self.credits.insert(credit.id, credit);
    }

    /// Replace a credit whose owner changed from `from`, moving it between
    /// owner lists.
    pub(crate) fn replace_transferred(&mut self, credit: Credit, from: &AccountId) {
        let id = credit.id;
        if let Some(list) = self.by_owner.get_mut(from) {
            if let Some(pos) = list.iter().position(|c| *c == id) {
                list.swap_remove(pos);
            }
            if list.is_empty() {
                self.by_owner.remove(from);
            }
        }
        self.by_owner.entry(credit.owner.clone()).or_default().push(id);
        self.credits.insert(id, credit);
    }
}

// ─── Batches ─────────────────────────────────────────────────────────

/// Production batches and their own identifier counter.
#[derive(Debug, Clone)]
pub struct BatchBook {
    batches: BTreeMap<BatchId, ProductionBatch>,
    next_id: BatchId,
}

impl Default for BatchBook {
    fn default() -> Self {
        Self {
            batches: BTreeMap::new(),
            next_id: BatchId::FIRST,
        }
    }
}

impl BatchBook {
    pub fn next_id(&self) -> BatchId {
        self.next_id
    }

    pub fn get(&self, id: BatchId) -> Option<&ProductionBatch> {
        self.batches.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductionBatch> {
        self.batches.values()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Insert or replace a batch, advancing the counter past new ids.
    pub(crate) fn put(&mut self, batch: ProductionBatch) {
        let id = batch.id;
        self.batches.insert(id, batch);
        if id >= self.next_id {
            self.next_id = BatchId::new(id.get().saturating_add(1));
        }
    }
}
