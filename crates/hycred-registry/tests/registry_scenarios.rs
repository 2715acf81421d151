//! # End-to-End Registry Scenarios
//!
//! Full lifecycles driven through the public API on a manual clock:
//! issuance boundaries, verify → transfer → retire, batch quorum, expiry,
//! and the notification chain those flows produce.

use std::sync::Arc;

use chrono::Duration;
use hycred_core::{AccountId, BatchId, CreditId, ManualClock, Timestamp};
use hycred_registry::{
    CreditRegistry, CreditTerms, CreditTransitionKind, ErrorKind, LifecycleState, Notification,
    Observer, RegistryConfig, RegistryError, VerificationDecision, VerificationState,
};
use parking_lot::Mutex;

fn acct(s: &str) -> AccountId {
    AccountId::new(s).expect("test identity")
}

fn start() -> Timestamp {
    Timestamp::parse("2026-06-15T09:30:00Z").expect("test timestamp")
}

struct Harness {
    reg: CreditRegistry,
    clock: ManualClock,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    fn with_config(config: RegistryConfig) -> Self {
        let clock = ManualClock::starting_at(start());
        let reg = CreditRegistry::with_clock(acct("regulator"), config, Arc::new(clock.clone()))
            .expect("valid config");
        reg.register_auditor(&acct("regulator"), acct("auditor-a"), "Auditor A", "ACC-A")
            .unwrap();
        reg.register_auditor(&acct("regulator"), acct("auditor-b"), "Auditor B", "ACC-B")
            .unwrap();
        Self { reg, clock }
    }

    fn terms(&self, producer: &str, amount: u64) -> CreditTerms {
        CreditTerms {
            owner: acct(producer),
            producer: acct(producer),
            producer_name: format!("{producer} Electrolysis"),
            amount,
            production_date: self.clock_now().checked_add(Duration::days(-1)).unwrap(),
            renewable_source: "solar".into(),
            location: "Atacama, CL".into(),
            carbon_intensity: 25,
            metadata: r#"{"stack":"PEM"}"#.into(),
        }
    }

    fn clock_now(&self) -> Timestamp {
        self.reg.now()
    }

    fn issue(&self, producer: &str, amount: u64) -> CreditId {
        self.reg
            .issue_credit(&acct("regulator"), self.terms(producer, amount))
            .unwrap()
    }

    fn issue_verified(&self, producer: &str, amount: u64) -> CreditId {
        let id = self.issue(producer, amount);
        self.reg
            .verify_credit(&acct("auditor-a"), id, VerificationDecision::Verified, "ok")
            .unwrap();
        id
    }
}

fn kind(r: Result<impl Sized, RegistryError>) -> ErrorKind {
    match r {
        Ok(_) => panic!("expected an error"),
        Err(e) => e.kind(),
    }
}

// -- Issuance boundaries ------------------------------------------------------

#[test]
fn carbon_intensity_ceiling_is_inclusive() {
    let h = Harness::new();
    let mut t = h.terms("p", 10);
    t.carbon_intensity = 50;
    assert!(h.reg.issue_credit(&acct("regulator"), t.clone()).is_ok());
    t.carbon_intensity = 51;
    assert_eq!(
        kind(h.reg.issue_credit(&acct("regulator"), t)),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn configured_ceiling_is_honoured() {
    let h = Harness::with_config(RegistryConfig {
        max_carbon_intensity: 10,
        ..RegistryConfig::default()
    });
    let mut t = h.terms("p", 10);
    t.carbon_intensity = 11;
    assert_eq!(
        kind(h.reg.issue_credit(&acct("regulator"), t)),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn production_date_now_ok_one_second_later_rejected() {
    let h = Harness::new();
    let mut t = h.terms("p", 10);
    t.production_date = start();
    assert!(h.reg.issue_credit(&acct("regulator"), t.clone()).is_ok());
    t.production_date = start().checked_add(Duration::seconds(1)).unwrap();
    assert_eq!(
        kind(h.reg.issue_credit(&acct("regulator"), t)),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn empty_identities_are_invalid_arguments() {
    let err: RegistryError = AccountId::new("").unwrap_err().into();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err: RegistryError = AccountId::new("   ").unwrap_err().into();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn ids_are_sequential_across_failures() {
    let h = Harness::new();
    assert_eq!(h.issue("p", 1), CreditId::new(1));
    let mut bad = h.terms("p", 0);
    bad.amount = 0;
    assert!(h.reg.issue_credit(&acct("regulator"), bad).is_err());
    assert!(h.reg.issue_credit(&acct("nobody"), h.terms("p", 1)).is_err());
    assert_eq!(h.issue("p", 1), CreditId::new(2));
    assert_eq!(h.reg.credit_count(), 2);
}

// -- Lifecycle ----------------------------------------------------------------

#[test]
fn issue_verify_transfer_retire() {
    let h = Harness::new();
    let id = h.issue("producer-1", 1000);
    assert_eq!(h.reg.get_credit(id).unwrap().verification, VerificationState::Pending);

    h.reg
        .verify_credit(&acct("auditor-a"), id, VerificationDecision::Verified, "meters sealed")
        .unwrap();
    assert!(!h.reg.is_credit_expired(id).unwrap());

    h.reg
        .transfer_credit(&acct("producer-1"), id, acct("steelworks"))
        .unwrap();
    assert_eq!(h.reg.get_credit(id).unwrap().owner, acct("steelworks"));

    h.reg
        .retire_credit(&acct("steelworks"), id, "offset")
        .unwrap();
    let c = h.reg.get_credit(id).unwrap();
    assert!(c.is_retired());
    assert_eq!(c.lifecycle, LifecycleState::Retired);
    assert_eq!(c.retirement_reason.as_deref(), Some("offset"));
    assert_eq!(c.retirement_date, Some(start()));

    assert_eq!(
        kind(h.reg.retire_credit(&acct("steelworks"), id, "offset")),
        ErrorKind::InvalidStateTransition
    );

    let history: Vec<_> = h
        .reg
        .credit_history(id)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        history,
        vec![
            CreditTransitionKind::Issued,
            CreditTransitionKind::Verified,
            CreditTransitionKind::Transferred,
            CreditTransitionKind::Retired,
        ]
    );
}

#[test]
fn producer_total_tracks_circulating_credits() {
    let h = Harness::new();
    let a = h.issue_verified("p", 100);
    let b = h.issue_verified("p", 200);
    let c = h.issue_verified("p", 300);
    let _pending = h.issue("p", 400);
    h.issue_verified("q", 999);
    assert_eq!(h.reg.total_active_credits_by_producer(&acct("p")), 1000);

    h.reg.transfer_credit(&acct("p"), a, acct("buyer")).unwrap();
    assert_eq!(h.reg.total_active_credits_by_producer(&acct("p")), 1000);

    h.reg.retire_credit(&acct("p"), b, "offset").unwrap();
    assert_eq!(h.reg.total_active_credits_by_producer(&acct("p")), 800);

    h.reg.suspend_credit(&acct("regulator"), c, "audit").unwrap();
    assert_eq!(h.reg.total_active_credits_by_producer(&acct("p")), 500);
}

#[test]
fn expiry_boundary_is_exclusive() {
    let h = Harness::new();
    let mut t = h.terms("p", 5);
    t.production_date = start();
    let id = h.reg.issue_credit(&acct("regulator"), t).unwrap();

    h.clock.advance(Duration::days(365));
    assert!(!h.reg.is_credit_expired(id).unwrap());
    h.clock.advance(Duration::seconds(1));
    assert!(h.reg.is_credit_expired(id).unwrap());

    // Expiry is a query; nothing changes.
    let c = h.reg.get_credit(id).unwrap();
    assert_eq!(c.lifecycle, LifecycleState::Active);
    assert_eq!(kind(h.reg.is_credit_expired(CreditId::NONE)), ErrorKind::NotFound);
}

// -- Batches ------------------------------------------------------------------

#[test]
fn batch_quorum_scenario() {
    let h = Harness::new();
    h.reg
        .register_auditor(&acct("regulator"), acct("auditor-c"), "Auditor C", "ACC-C")
        .unwrap();
    let c1 = h.issue_verified("p", 600);
    let c2 = h.issue_verified("p", 400);

    let b = h
        .reg
        .create_production_batch(&acct("auditor-a"), &acct("p"), &[c1, c2])
        .unwrap();
    let batch = h.reg.get_batch(b).unwrap();
    assert_eq!(batch.verification_count(), 1);
    assert!(!batch.verified);
    assert_eq!(batch.total_amount, 1000);

    assert!(h.reg.verify_production_batch(&acct("auditor-b"), b).unwrap());
    let batch = h.reg.get_batch(b).unwrap();
    assert_eq!(batch.verification_count(), 2);
    assert!(batch.verified);

    let err = h
        .reg
        .verify_production_batch(&acct("auditor-c"), b)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
    assert!(err.to_string().contains("already verified"));
    assert!(h.reg.get_batch(b).unwrap().verified);
}

#[test]
fn batch_ids_have_their_own_counter() {
    let h = Harness::new();
    let c = h.issue_verified("p", 1);
    h.issue_verified("p", 1);
    let b = h
        .reg
        .create_production_batch(&acct("auditor-a"), &acct("p"), &[c])
        .unwrap();
    assert_eq!(b, BatchId::FIRST);
    assert_eq!(kind(h.reg.get_batch(BatchId::NONE)), ErrorKind::NotFound);
}

// -- Notifications ------------------------------------------------------------

#[derive(Default)]
struct Collector(Mutex<Vec<Notification>>);

impl Observer for Collector {
    fn notify(&self, notification: &Notification) {
        self.0.lock().push(notification.clone());
    }
}

#[test]
fn every_success_notifies_and_failures_do_not() {
    let h = Harness::new();
    let collector = Arc::new(Collector::default());
    h.reg.subscribe(collector.clone());

    let id = h.issue("p", 10);
    let _ = h.reg.transfer_credit(&acct("p"), id, acct("x"));
    h.reg
        .verify_credit(&acct("auditor-b"), id, VerificationDecision::Rejected, "")
        .unwrap();
    let _ = h
        .reg
        .verify_credit(&acct("auditor-a"), id, VerificationDecision::Verified, "");

    let seen: Vec<_> = collector
        .0
        .lock()
        .iter()
        .map(|n| n.event.name())
        .collect();
    assert_eq!(seen, vec!["credit_issued", "credit_verified"]);
}

#[test]
fn notification_chain_verifies_after_mixed_operations() {
    let h = Harness::new();
    h.reg.set_certifier(&acct("regulator"), acct("certifier")).unwrap();
    let c = h.issue_verified("p", 10);
    let b = h
        .reg
        .create_production_batch(&acct("auditor-a"), &acct("p"), &[c])
        .unwrap();
    h.reg.verify_production_batch(&acct("auditor-b"), b).unwrap();
    h.reg.deactivate_auditor(&acct("regulator"), &acct("auditor-b")).unwrap();

    let log = h.reg.notifications();
    // 2 registrations + certifier + issue + verify + batch created + signed off + verified + deactivation
    assert_eq!(log.len(), 9);
    let sequences: Vec<u64> = log.iter().map(|n| n.sequence).collect();
    assert_eq!(sequences, (1..=9).collect::<Vec<_>>());
    assert!(h.reg.verify_notifications().is_ok());
    assert_eq!(h.reg.snapshot().notification_head, log[8].digest);
}

#[test]
fn snapshot_serializes_to_json() {
    let h = Harness::new();
    let id = h.issue_verified("p", 10);
    let snap = h.reg.snapshot();
    assert_eq!(snap.credits.len(), 1);
    assert_eq!(snap.auditors.len(), 2);
    assert_eq!(snap.next_credit_id, CreditId::new(2));

    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["credits"][0]["id"], id.get());
    assert_eq!(json["credits"][0]["verification"], "VERIFIED");
    assert_eq!(json["credits"][0]["is_retired"], false);
    assert_eq!(json["regulator"], "regulator");

    h.reg.retire_credit(&acct("p"), id, "offset").unwrap();
    let json = serde_json::to_value(h.reg.snapshot()).unwrap();
    assert_eq!(json["credits"][0]["is_retired"], true);
    assert_eq!(json["credits"][0]["lifecycle"], "RETIRED");
}
