// SPDX-License-Identifier: Apache-2.0

use cropconnect_core::{ExitCode, MachineError};

#[test]
fn display_and_debug_contracts_are_stable() {
    assert_eq!(format!("{:?}", ExitCode::Internal), "Internal");
    assert_eq!(ExitCode::Rejected.as_str(), "rejected");
    assert_eq!(ExitCode::Rejected as u8, 3);
    assert_eq!(ExitCode::Storage.as_str(), "storage");
    assert_eq!(ExitCode::Storage as u8, 4);

    let err = MachineError::new("usage_error", "invalid");
    assert_eq!(format!("{err}"), "usage_error: invalid");
    assert_eq!(
        format!("{err:?}"),
        "MachineError { code: \"usage_error\", message: \"invalid\", details: {} }"
    );
}

#[test]
fn machine_error_serializes_details_in_key_order() {
    let err = MachineError::new("conflict", "username taken")
        .with_detail("username", "amina")
        .with_detail("field", "username");
    let json = serde_json::to_string(&err).expect("machine error json");
    assert_eq!(
        json,
        r#"{"code":"conflict","message":"username taken","details":{"field":"username","username":"amina"}}"#
    );
}
