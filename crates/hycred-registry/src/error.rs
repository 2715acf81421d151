//! # Registry Errors
//!
//! Every failed operation maps to one of four kinds: the caller lacks a
//! role, a referenced record does not exist, an argument is invalid, or the
//! record's state does not allow the transition. The detailed variants keep
//! the context operators need; [`RegistryError::kind`] collapses them.
//!
//! Every error leaves the registry unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hycred_core::{AccountId, BatchId, CreditId, ValidationError};
use hycred_state::{AuditorError, BatchError, CreditError};

use crate::roles::Role;

/// Coarse failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PermissionDenied,
    NotFound,
    InvalidArgument,
    InvalidStateTransition,
    /// A notification could not be canonicalized. Not reachable with the
    /// built-in event types.
    Internal,
}

impl ErrorKind {
    /// Snake-case kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::InvalidArgument => "invalid_argument",
            Self::InvalidStateTransition => "invalid_state_transition",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record looked up by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordRef {
    Credit(CreditId),
    Auditor(AccountId),
    Batch(BatchId),
}

impl std::fmt::Display for RecordRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Credit(id) => id.fmt(f),
            Self::Auditor(id) => write!(f, "auditor:{id}"),
            Self::Batch(id) => id.fmt(f),
        }
    }
}

/// Failure of a registry operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The caller does not hold the role the operation requires.
    #[error("permission denied: {caller} cannot {operation} (requires {required})")]
    PermissionDenied {
        caller: AccountId,
        operation: &'static str,
        required: Role,
    },

    /// No record with this identifier.
    #[error("{0} not found")]
    NotFound(RecordRef),

    /// Malformed or out-of-policy input.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// The credit's state does not allow the transition.
    #[error("invalid state transition: {0}")]
    Credit(#[from] CreditError),

    /// Auditor registration or status conflict.
    #[error("invalid state transition: {0}")]
    Auditor(#[from] AuditorError),

    /// Batch assembly or verification failure.
    #[error("{prefix}: {0}", prefix = batch_error_prefix(.0))]
    Batch(#[from] BatchError),

    /// Notification sealing failed.
    #[error("internal error: {0}")]
    Internal(String),
}

fn batch_error_prefix(err: &BatchError) -> &'static str {
    match batch_error_kind(err) {
        ErrorKind::InvalidArgument => "invalid argument",
        _ => "invalid state transition",
    }
}

fn batch_error_kind(err: &BatchError) -> ErrorKind {
    match err {
        BatchError::Empty
        | BatchError::DuplicateCredit(_)
        | BatchError::ProducerMismatch { .. }
        | BatchError::AmountOverflow => ErrorKind::InvalidArgument,
        BatchError::CreditNotVerified { .. }
        | BatchError::AlreadyVerified(_)
        | BatchError::DuplicateVerifier { .. } => ErrorKind::InvalidStateTransition,
    }
}

impl RegistryError {
    /// The coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Credit(_) | Self::Auditor(_) => ErrorKind::InvalidStateTransition,
            Self::Batch(e) => batch_error_kind(e),
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn denied(caller: &AccountId, operation: &'static str, required: Role) -> Self {
        Self::PermissionDenied {
            caller: caller.clone(),
            operation,
            required,
        }
    }
}
