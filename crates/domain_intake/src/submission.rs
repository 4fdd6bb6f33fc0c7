//! Final validation and hand-off of a draft to the claims backend

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use core_kernel::{DraftId, OperationMetadata, PortError};
use crate::draft::{ClaimDraft, DraftField};
use crate::error::SubmissionError;
use crate::ports::{ClaimSubmission, ClaimSubmissionPort, DraftStorePort, SavedDraft};

/// Outcome of a submit attempt, as shown to the member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SubmissionResult {
    /// The backend accepted the claim
    #[serde(rename_all = "camelCase")]
    Success { reference_no: String },
    /// The draft is incomplete; nothing was sent
    ValidationFailed { missing: Vec<DraftField> },
    /// The backend call failed; the draft is unchanged
    NetworkFailed { retryable: bool },
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionResult::Success { .. })
    }

    pub fn reference_no(&self) -> Option<&str> {
        match self {
            SubmissionResult::Success { reference_no } => Some(reference_no),
            _ => None,
        }
    }
}

/// Gates, performs and interprets the single backend call for a draft
///
/// One coordinator belongs to one wizard session. At most one submission
/// is in flight at a time; a second `submit` while the first is pending
/// fails fast instead of sending a duplicate claim.
pub struct ClaimSubmissionCoordinator {
    submission_port: Arc<dyn ClaimSubmissionPort>,
    draft_store: Arc<dyn DraftStorePort>,
    in_flight: AtomicBool,
    disposed: AtomicBool,
}

/// Clears the in-flight flag when the submit future completes or is dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ClaimSubmissionCoordinator {
    pub fn new(
        submission_port: Arc<dyn ClaimSubmissionPort>,
        draft_store: Arc<dyn DraftStorePort>,
    ) -> Self {
        Self {
            submission_port,
            draft_store,
            in_flight: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        }
    }

    /// True iff claim type, patient name, illness and at least one document are present
    pub fn can_submit(&self, draft: &ClaimDraft) -> bool {
        draft.is_complete()
    }

    /// Unmet submission conditions in the order claimType, patientName, illness, documents
    pub fn missing_fields(&self, draft: &ClaimDraft) -> Vec<DraftField> {
        draft.missing_fields()
    }

    /// Validates the draft and sends it to the backend once
    ///
    /// # Returns
    ///
    /// - `ValidationFailed` without contacting the backend if the draft is incomplete
    /// - `Success` with the backend reference number
    /// - `NetworkFailed { retryable }` when the backend call fails; `retryable`
    ///   is true for timeouts, connection errors, 5xx and rate limiting
    ///
    /// # Errors
    ///
    /// `SubmissionError::AlreadyInProgress` if another submission for this
    /// draft has not resolved yet
    pub async fn submit(&self, draft: &ClaimDraft) -> Result<SubmissionResult, SubmissionError> {
        let submission = match ClaimSubmission::try_from(draft) {
            Ok(submission) => submission,
            Err(missing) => {
                info!(draft_id = %draft.id(), ?missing, "Submission blocked by missing fields");
                return Ok(SubmissionResult::ValidationFailed { missing });
            }
        };

        let _guard = self.begin()?;

        let metadata = OperationMetadata::with_correlation_id(draft.id().to_string())
            .with_context("claim_type", submission.claim_type.as_str())
            .with_context("document_count", submission.documents.len().to_string());

        info!(
            draft_id = %draft.id(),
            claim_type = %submission.claim_type,
            documents = submission.documents.len(),
            "Submitting claim"
        );
        let outcome = self.submission_port.submit_claim(&submission, Some(metadata)).await;

        if self.is_disposed() {
            debug!(draft_id = %draft.id(), "Submission resolved after the draft was discarded");
        }

        Ok(match outcome {
            Ok(receipt) => {
                info!(draft_id = %draft.id(), reference_no = %receipt.reference_no, "Claim accepted");
                SubmissionResult::Success {
                    reference_no: receipt.reference_no,
                }
            }
            Err(err) => {
                let retryable = err.is_transient();
                warn!(draft_id = %draft.id(), error = %err, retryable, "Claim submission failed");
                SubmissionResult::NetworkFailed { retryable }
            }
        })
    }

    /// Parks a copy of the draft in the saved-drafts area
    ///
    /// Returns immediately; the save runs on a spawned task. Documents are
    /// not required. Must be called from within a Tokio runtime.
    pub fn submit_later(&self, draft: &ClaimDraft) -> JoinHandle<Result<DraftId, PortError>> {
        let store = Arc::clone(&self.draft_store);
        let saved = SavedDraft::new(draft.clone());
        tokio::spawn(async move {
            let id = saved.id();
            match store.save_draft(&saved).await {
                Ok(()) => {
                    info!(draft_id = %id, "Draft saved for later");
                    Ok(id)
                }
                Err(err) => {
                    warn!(draft_id = %id, error = %err, "Saving draft for later failed");
                    Err(err)
                }
            }
        })
    }

    /// True while a backend call is outstanding
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Marks the owning draft as discarded; later results are not acted on
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, SubmissionError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SubmissionError::AlreadyInProgress)?;
        Ok(InFlightGuard(&self.in_flight))
    }
}

impl std::fmt::Debug for ClaimSubmissionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimSubmissionCoordinator")
            .field("in_flight", &self.is_in_flight())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tokio::sync::Notify;

    use crate::adapters::InMemoryDraftStore;
    use crate::documents::{DocumentType, NewDocument};
    use crate::draft::ClaimType;
    use crate::ports::mock::MockSubmissionPort;
    use crate::wizard::WizardStateMachine;

    fn complete_draft() -> ClaimDraft {
        let mut wizard = WizardStateMachine::new();
        wizard.select_claim_type(ClaimType::Dental).unwrap();
        wizard
            .add_document(NewDocument {
                document_type: DocumentType::Bill,
                document_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                amount: dec!(4500),
                source_uri: "file:///tmp/bill.jpg".to_string(),
                mime_type: "image/jpeg".to_string(),
            })
            .unwrap();
        wizard.advance("H.M.M.K Herath", "RR").unwrap();
        wizard.draft().clone()
    }

    fn coordinator(port: Arc<MockSubmissionPort>) -> ClaimSubmissionCoordinator {
        ClaimSubmissionCoordinator::new(port, Arc::new(InMemoryDraftStore::new()))
    }

    #[tokio::test]
    async fn test_success_returns_reference() {
        let port = Arc::new(MockSubmissionPort::succeeding("M000427"));
        let coordinator = coordinator(port.clone());

        let result = coordinator.submit(&complete_draft()).await.unwrap();

        assert_eq!(result.reference_no(), Some("M000427"));
        assert_eq!(port.call_count(), 1);
        assert!(!coordinator.is_in_flight());
    }

    #[tokio::test]
    async fn test_incomplete_draft_never_reaches_port() {
        let port = Arc::new(MockSubmissionPort::succeeding("M000427"));
        let coordinator = coordinator(port.clone());

        let result = coordinator.submit(&ClaimDraft::new()).await.unwrap();

        assert!(matches!(result, SubmissionResult::ValidationFailed { ref missing } if missing.len() == 4));
        assert_eq!(port.call_count(), 0);
    }

    #[tokio::test]
    async fn test_transient_and_rejected_failures() {
        let port = Arc::new(
            MockSubmissionPort::failing_with(PortError::Timeout {
                operation: "submit_claim".to_string(),
                duration_ms: 30_000,
            })
            .then(Err(PortError::rejected(400, "illness code unknown"))),
        );
        let coordinator = coordinator(port.clone());
        let draft = complete_draft();

        assert_eq!(
            coordinator.submit(&draft).await.unwrap(),
            SubmissionResult::NetworkFailed { retryable: true }
        );
        assert_eq!(
            coordinator.submit(&draft).await.unwrap(),
            SubmissionResult::NetworkFailed { retryable: false }
        );
        assert_eq!(port.call_count(), 2);
    }

    #[tokio::test]
    async fn test_second_submit_while_pending_fails_fast() {
        let gate = Arc::new(Notify::new());
        let port = Arc::new(MockSubmissionPort::succeeding("M000427").with_gate(gate.clone()));
        let coordinator = coordinator(port.clone());
        let draft = complete_draft();

        let (first, second) = tokio::join!(coordinator.submit(&draft), async {
            let second = coordinator.submit(&draft).await;
            gate.notify_one();
            second
        });

        assert!(first.unwrap().is_success());
        assert_eq!(second, Err(SubmissionError::AlreadyInProgress));
        assert_eq!(port.call_count(), 1);
    }

    #[tokio::test]
    async fn test_submit_later_skips_document_check() {
        let store = Arc::new(InMemoryDraftStore::new());
        let coordinator = ClaimSubmissionCoordinator::new(
            Arc::new(MockSubmissionPort::succeeding("M1")),
            store.clone(),
        );
        let mut wizard = WizardStateMachine::new();
        wizard.select_claim_type(ClaimType::Outdoor).unwrap();

        let id = coordinator.submit_later(wizard.draft()).await.unwrap().unwrap();

        assert_eq!(id, wizard.draft().id());
        assert_eq!(store.get_draft(id).await.unwrap().draft, *wizard.draft());
    }

    #[test]
    fn test_result_serialization_shape() {
        let json = serde_json::to_value(SubmissionResult::Success {
            reference_no: "M000427".to_string(),
        })
        .unwrap();
        assert_eq!(json["outcome"], "success");
        assert_eq!(json["referenceNo"], "M000427");

        let json = serde_json::to_value(SubmissionResult::ValidationFailed {
            missing: vec![DraftField::Documents],
        })
        .unwrap();
        assert_eq!(json["outcome"], "validationFailed");
        assert_eq!(json["missing"][0], "documents");
    }
}
