// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use cropconnect_model::ContractStatus;
use cropconnect_store::{StoreError, StoreErrorCode};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LifecycleError {
    Unauthenticated(String),
    Unauthorized(String),
    ProfileNotFound(String),
    ListingNotFound(String),
    ContractNotFound(String),
    InsufficientQuantity { requested: u64, available: u64 },
    InvalidStatus(String),
    IllegalTransition {
        from: ContractStatus,
        to: ContractStatus,
    },
    PersistenceFailure(String),
    Validation(String),
    Conflict(String),
}

impl LifecycleError {
    /// Stable machine-readable kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Unauthorized(_) => "unauthorized",
            Self::ProfileNotFound(_) => "profile_not_found",
            Self::ListingNotFound(_) => "listing_not_found",
            Self::ContractNotFound(_) => "contract_not_found",
            Self::InsufficientQuantity { .. } => "insufficient_quantity",
            Self::InvalidStatus(_) => "invalid_status",
            Self::IllegalTransition { .. } => "illegal_transition",
            Self::PersistenceFailure(_) => "persistence_failure",
            Self::Validation(_) => "validation_failed",
            Self::Conflict(_) => "conflict",
        }
    }

    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Unauthenticated(msg)
            | Self::Unauthorized(msg)
            | Self::PersistenceFailure(msg)
            | Self::Validation(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::ProfileNotFound(who) => format!("no profile found for {who}"),
            Self::ListingNotFound(id) => format!("listing {id} not found"),
            Self::ContractNotFound(id) => format!("contract {id} not found"),
            Self::InsufficientQuantity {
                requested,
                available,
            } => format!("requested {requested} but only {available} available"),
            Self::InvalidStatus(raw) => format!("unknown contract status `{raw}`"),
            Self::IllegalTransition { from, to } => {
                format!("transition {from} -> {to} is not permitted")
            }
        }
    }
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.detail())
    }
}

impl std::error::Error for LifecycleError {}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err.code {
            StoreErrorCode::Validation => Self::Validation(err.message),
            StoreErrorCode::Conflict => Self::Conflict(err.message),
            _ => Self::PersistenceFailure(err.to_string()),
        }
    }
}
