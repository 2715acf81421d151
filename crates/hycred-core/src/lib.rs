//! # hycred-core — Foundational Types for the Credit Registry
//!
//! Leaf crate of the workspace. Every other `hycred-*` crate depends on it;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Validated identifier newtypes.** `AccountId` cannot hold an empty or
//!    oversized identity, so an "empty recipient" is rejected once, at the
//!    boundary where the string enters the system. `CreditId` and `BatchId`
//!    keep the two sequential counters from being confused with each other.
//!
//! 2. **UTC-only, second-precision time.** `Timestamp` is the only time type
//!    used by the registry. Time is read through the [`Clock`] trait so that
//!    issuance and expiry boundaries are testable to the second.
//!
//! 3. **Canonical bytes for every digest.** `sha256_digest()` accepts only
//!    [`CanonicalBytes`], which in turn can only be built through the
//!    JCS pipeline. Notification digests are therefore reproducible by any
//!    external verifier.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{AccountId, BatchId, CreditId, MAX_ACCOUNT_ID_LEN};
pub use temporal::{Clock, ManualClock, SystemClock, Timestamp, SECONDS_PER_DAY};
