// SPDX-License-Identifier: Apache-2.0

use crate::{ApiError, ApiErrorCode};

pub const API_ERROR_SCHEMA_REF: &str = "#/components/schemas/ApiError";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiErrorMapping {
    pub status_code: u16,
    pub schema_ref: &'static str,
}

#[must_use]
pub fn status_for(code: ApiErrorCode) -> u16 {
    match code {
        ApiErrorCode::Unauthenticated => 401,
        ApiErrorCode::Unauthorized => 403,
        ApiErrorCode::ProfileNotFound
        | ApiErrorCode::ListingNotFound
        | ApiErrorCode::ContractNotFound
        | ApiErrorCode::RouteNotFound => 404,
        ApiErrorCode::InsufficientQuantity
        | ApiErrorCode::IllegalTransition
        | ApiErrorCode::Conflict => 409,
        ApiErrorCode::InvalidStatus
        | ApiErrorCode::ValidationFailed
        | ApiErrorCode::InvalidRequestBody
        | ApiErrorCode::InvalidQueryParameter => 400,
        ApiErrorCode::PayloadTooLarge => 413,
        ApiErrorCode::Timeout => 504,
        ApiErrorCode::NotReady => 503,
        ApiErrorCode::PersistenceFailure | ApiErrorCode::Internal => 500,
    }
}

#[must_use]
pub fn map_error(error: &ApiError) -> ApiErrorMapping {
    ApiErrorMapping {
        status_code: status_for(error.code),
        schema_ref: API_ERROR_SCHEMA_REF,
    }
}
