// SPDX-License-Identifier: Apache-2.0

use cropconnect_api::error_mapping::{map_error, status_for, API_ERROR_SCHEMA_REF};
use cropconnect_api::{ApiError, ApiErrorCode, API_ERROR_CODES};
use cropconnect_lifecycle::LifecycleError;
use cropconnect_model::ContractStatus;
use serde_json::json;

#[test]
fn lifecycle_errors_map_to_documented_statuses() {
    let cases = [
        (LifecycleError::Unauthenticated("x".into()), 401),
        (LifecycleError::Unauthorized("x".into()), 403),
        (LifecycleError::ProfileNotFound("x".into()), 404),
        (LifecycleError::ListingNotFound("x".into()), 404),
        (LifecycleError::ContractNotFound("x".into()), 404),
        (
            LifecycleError::InsufficientQuantity {
                requested: 150,
                available: 100,
            },
            409,
        ),
        (
            LifecycleError::IllegalTransition {
                from: ContractStatus::Accepted,
                to: ContractStatus::Pending,
            },
            409,
        ),
        (LifecycleError::Conflict("x".into()), 409),
        (LifecycleError::InvalidStatus("SHIPPED".into()), 400),
        (LifecycleError::Validation("x".into()), 400),
        (LifecycleError::PersistenceFailure("disk".into()), 500),
    ];
    for (err, expected) in cases {
        let kind = err.kind();
        let api: ApiError = err.into();
        let mapped = map_error(&api);
        assert_eq!(mapped.status_code, expected, "{kind}");
        assert_eq!(mapped.schema_ref, API_ERROR_SCHEMA_REF);
    }
}

#[test]
fn structured_details_survive_the_mapping() {
    let api: ApiError = LifecycleError::InsufficientQuantity {
        requested: 150,
        available: 100,
    }
    .into();
    assert_eq!(api.code, ApiErrorCode::InsufficientQuantity);
    assert_eq!(api.details, json!({"requested": 150, "available": 100}));

    let api: ApiError = LifecycleError::IllegalTransition {
        from: ContractStatus::Accepted,
        to: ContractStatus::Pending,
    }
    .into();
    assert_eq!(api.details, json!({"from": "ACCEPTED", "to": "PENDING"}));
}

#[test]
fn persistence_failures_do_not_leak_store_details() {
    let api: ApiError =
        LifecycleError::PersistenceFailure("io_error: /var/db locked".into()).into();
    assert_eq!(api.code, ApiErrorCode::PersistenceFailure);
    assert!(!api.message.contains("/var/db"));
}

#[test]
fn every_code_has_a_status_and_a_stable_name() {
    for code in API_ERROR_CODES {
        let status = status_for(code);
        assert!((400..600).contains(&status), "{code:?}");
        let wire = serde_json::to_value(code).expect("serialize");
        assert_eq!(wire, json!(code.as_str()));
    }
}

#[test]
fn api_error_rejects_unknown_fields() {
    let raw = r#"{"code":"Internal","message":"m","details":{},"request_id":"r","extra":1}"#;
    assert!(serde_json::from_str::<ApiError>(raw).is_err());
    let err = ApiError::timeout(5000).with_request_id("req-7");
    assert_eq!(err.request_id, "req-7");
    assert_eq!(map_error(&err).status_code, 504);
}
