// SPDX-License-Identifier: Apache-2.0

use cropconnect_lifecycle::LifecycleError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    Unauthenticated,
    Unauthorized,
    ProfileNotFound,
    ListingNotFound,
    ContractNotFound,
    RouteNotFound,
    InsufficientQuantity,
    IllegalTransition,
    Conflict,
    InvalidStatus,
    ValidationFailed,
    InvalidRequestBody,
    InvalidQueryParameter,
    PayloadTooLarge,
    Timeout,
    NotReady,
    PersistenceFailure,
    Internal,
}

pub const API_ERROR_CODES: [ApiErrorCode; 18] = [
    ApiErrorCode::Unauthenticated,
    ApiErrorCode::Unauthorized,
    ApiErrorCode::ProfileNotFound,
    ApiErrorCode::ListingNotFound,
    ApiErrorCode::ContractNotFound,
    ApiErrorCode::RouteNotFound,
    ApiErrorCode::InsufficientQuantity,
    ApiErrorCode::IllegalTransition,
    ApiErrorCode::Conflict,
    ApiErrorCode::InvalidStatus,
    ApiErrorCode::ValidationFailed,
    ApiErrorCode::InvalidRequestBody,
    ApiErrorCode::InvalidQueryParameter,
    ApiErrorCode::PayloadTooLarge,
    ApiErrorCode::Timeout,
    ApiErrorCode::NotReady,
    ApiErrorCode::PersistenceFailure,
    ApiErrorCode::Internal,
];

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "Unauthenticated",
            Self::Unauthorized => "Unauthorized",
            Self::ProfileNotFound => "ProfileNotFound",
            Self::ListingNotFound => "ListingNotFound",
            Self::ContractNotFound => "ContractNotFound",
            Self::RouteNotFound => "RouteNotFound",
            Self::InsufficientQuantity => "InsufficientQuantity",
            Self::IllegalTransition => "IllegalTransition",
            Self::Conflict => "Conflict",
            Self::InvalidStatus => "InvalidStatus",
            Self::ValidationFailed => "ValidationFailed",
            Self::InvalidRequestBody => "InvalidRequestBody",
            Self::InvalidQueryParameter => "InvalidQueryParameter",
            Self::PayloadTooLarge => "PayloadTooLarge",
            Self::Timeout => "Timeout",
            Self::NotReady => "NotReady",
            Self::PersistenceFailure => "PersistenceFailure",
            Self::Internal => "Internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

impl ApiError {
    #[must_use]
    pub fn new(
        code: ApiErrorCode,
        message: impl Into<String>,
        details: Value,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            request_id: request_id.into(),
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    #[must_use]
    pub fn invalid_body(reason: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::InvalidRequestBody,
            "invalid request body",
            json!({"reason": reason.into()}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn invalid_param(name: &str, value: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidQueryParameter,
            format!("invalid query parameter: {name}"),
            json!({"parameter": name, "value": value}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::Unauthenticated,
            reason,
            json!({}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn payload_too_large(limit_bytes: usize) -> Self {
        Self::new(
            ApiErrorCode::PayloadTooLarge,
            "request body too large",
            json!({"limit_bytes": limit_bytes}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn route_not_found(path: &str) -> Self {
        Self::new(
            ApiErrorCode::RouteNotFound,
            "route not found",
            json!({"path": path}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn timeout(limit_ms: u64) -> Self {
        Self::new(
            ApiErrorCode::Timeout,
            "request timed out",
            json!({"timeout_ms": limit_ms}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::NotReady,
            "service not ready",
            json!({"reason": reason.into()}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::Internal,
            "internal error",
            json!({"reason": reason.into()}),
            "req-unknown",
        )
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        let message = err.detail();
        let (code, details) = match &err {
            LifecycleError::Unauthenticated(_) => (ApiErrorCode::Unauthenticated, json!({})),
            LifecycleError::Unauthorized(_) => (ApiErrorCode::Unauthorized, json!({})),
            LifecycleError::ProfileNotFound(who) => {
                (ApiErrorCode::ProfileNotFound, json!({"subject": who}))
            }
            LifecycleError::ListingNotFound(id) => {
                (ApiErrorCode::ListingNotFound, json!({"listing_id": id}))
            }
            LifecycleError::ContractNotFound(id) => {
                (ApiErrorCode::ContractNotFound, json!({"contract_id": id}))
            }
            LifecycleError::InsufficientQuantity {
                requested,
                available,
            } => (
                ApiErrorCode::InsufficientQuantity,
                json!({"requested": requested, "available": available}),
            ),
            LifecycleError::InvalidStatus(raw) => (
                ApiErrorCode::InvalidStatus,
                json!({"status": raw, "allowed": ["PENDING", "ACCEPTED", "IN_TRANSIT", "DELIVERED", "CANCELLED"]}),
            ),
            LifecycleError::IllegalTransition { from, to } => (
                ApiErrorCode::IllegalTransition,
                json!({"from": from.as_str(), "to": to.as_str()}),
            ),
            LifecycleError::Validation(_) => (ApiErrorCode::ValidationFailed, json!({})),
            LifecycleError::Conflict(_) => (ApiErrorCode::Conflict, json!({})),
            // Store internals are logged server side, not echoed to clients.
            LifecycleError::PersistenceFailure(_) => {
                return Self::new(
                    ApiErrorCode::PersistenceFailure,
                    "persistence failure",
                    json!({}),
                    "req-unknown",
                );
            }
            _ => (ApiErrorCode::Internal, json!({})),
        };
        Self::new(code, message, details, "req-unknown")
    }
}

const _: fn() = || {
    fn assert_traits<T: Serialize + for<'de> Deserialize<'de>>() {}
    assert_traits::<ApiErrorCode>();
};
