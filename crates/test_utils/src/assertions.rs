//! Custom Test Assertions
//!
//! Assertion helpers for wizard types that give more meaningful failure
//! messages than comparing whole snapshots.

use core_kernel::DocumentId;
use domain_intake::{DocumentRef, DraftField, DraftSnapshot, SubmissionResult, WizardStep};

/// Asserts the wizard is back on claim type selection with nothing entered
pub fn assert_fresh(snapshot: &DraftSnapshot) {
    assert_eq!(
        snapshot.step,
        WizardStep::SelectClaimType,
        "Expected a fresh wizard, found step {}",
        snapshot.step
    );
    assert!(
        snapshot.draft.is_empty(),
        "Expected an empty draft, found {:?}",
        snapshot.draft
    );
}

/// Asserts the documents carry exactly the given ids, in order
pub fn assert_document_order(documents: &[DocumentRef], expected: &[DocumentId]) {
    let actual: Vec<DocumentId> = documents.iter().map(|d| d.id).collect();
    assert_eq!(
        actual, expected,
        "Document order mismatch: actual={:?}, expected={:?}",
        actual, expected
    );
}

/// Asserts a submission succeeded with the given reference number
pub fn assert_submitted(result: &SubmissionResult, reference_no: &str) {
    assert_eq!(
        result.reference_no(),
        Some(reference_no),
        "Expected submission success with {}, got {:?}",
        reference_no,
        result
    );
}

/// Asserts a submission was blocked on exactly the given fields
pub fn assert_validation_failed(result: &SubmissionResult, expected: &[DraftField]) {
    match result {
        SubmissionResult::ValidationFailed { missing } => assert_eq!(
            missing.as_slice(),
            expected,
            "Missing fields mismatch"
        ),
        other => panic!("Expected ValidationFailed({:?}), got {:?}", expected, other),
    }
}

/// Asserts a submission failed on the network with the given retry hint
pub fn assert_network_failed(result: &SubmissionResult, retryable: bool) {
    assert_eq!(
        result,
        &SubmissionResult::NetworkFailed { retryable },
        "Expected NetworkFailed(retryable={}), got {:?}",
        retryable,
        result
    );
}
