//! # hycred-registry — The Credit Registry Service
//!
//! Owns the authoritative record of every green hydrogen credit, auditor
//! and production batch, and the only code paths allowed to mutate them.
//!
//! ## Operations
//!
//! | Caller            | Operation                                  | Module            |
//! |-------------------|--------------------------------------------|-------------------|
//! | regulator         | `set_certifier`, `register_auditor`, `deactivate_auditor` | [`admin`] |
//! | certifier/regulator | `issue_credit`                           | [`issuance`]      |
//! | active auditor    | `verify_credit`                            | [`verification`]  |
//! | active auditor    | `create_production_batch`, `verify_production_batch` | [`consensus`] |
//! | current owner     | `transfer_credit`, `retire_credit`         | [`transfer`]      |
//! | regulator         | `suspend_credit`                           | [`transfer`]      |
//!
//! ## Atomicity
//!
//! All state sits behind one `parking_lot::RwLock`. A mutating call takes
//! the write lock, evaluates every precondition against the current state,
//! stages modified copies of the records it touches, seals the resulting
//! notifications, and only then commits. A failure at any step leaves the
//! store untouched. Two racing verifications of the same credit therefore
//! serialize: exactly one sees `PENDING`.
//!
//! Observers are notified after the lock is released.

pub mod admin;
pub mod books;
pub mod config;
pub mod consensus;
pub mod error;
pub mod events;
pub mod issuance;
pub mod registry;
pub mod roles;
pub mod transfer;
pub mod verification;

pub use config::{ConfigError, RegistryConfig};
pub use error::{ErrorKind, RecordRef, RegistryError};
pub use events::{
    ChainError, Notification, NotificationLog, Observer, RegistryEvent, TracingObserver,
};
pub use registry::{CreditRegistry, RegistrySnapshot};
pub use roles::Role;

pub use hycred_state::{
    Auditor, Credit, CreditTerms, CreditTransitionKind, CreditTransitionRecord, LifecycleState,
    ProductionBatch, VerificationDecision, VerificationState,
};
