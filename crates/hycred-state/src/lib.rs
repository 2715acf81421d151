//! # hycred-state — Credit, Auditor and Batch State Machines
//!
//! Each record type owns its transition rules. The registry decides *who*
//! may call a transition; this crate decides *whether* the record is in a
//! state that allows it.
//!
//! ## State Machines
//!
//! - **Credit** (`credit.rs`): verification `Pending → Verified | Rejected`
//!   (one-way) and lifecycle `Active → Retired | Suspended` (both terminal
//!   for transfer and retirement).
//!
//! - **Auditor** (`auditor.rs`): `active → inactive` soft deactivation with
//!   retained verification counters.
//!
//! - **Production batch** (`batch.rs`): distinct-auditor roster that flips
//!   `verified` exactly once when the quorum is reached.
//!
//! - **Expiry** (`expiry.rs`): pure validity-window predicate.

pub mod auditor;
pub mod batch;
pub mod credit;
pub mod expiry;

pub use auditor::{Auditor, AuditorError};
pub use batch::{BatchError, ProductionBatch};
pub use credit::{
    Credit, CreditError, CreditTerms, CreditTransitionKind, CreditTransitionRecord,
    LifecycleState, VerificationDecision, VerificationState,
};
pub use expiry::ExpiryPolicy;
