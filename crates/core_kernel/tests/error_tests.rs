//! Tests for core_kernel error types

use core_kernel::error::CoreError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Unknown claim type: maternity");

    match error {
        CoreError::Validation(ref msg) => assert_eq!(msg, "Unknown claim type: maternity"),
    }
    assert_eq!(error.to_string(), "Validation error: Unknown claim type: maternity");
}

