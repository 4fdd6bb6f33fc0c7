//! Intake Domain Ports
//!
//! The wizard depends on three collaborators it does not implement:
//!
//! - **ClaimSubmissionPort**: the claims backend that accepts a finished
//!   draft and returns a reference number
//! - **DraftStorePort**: the "saved drafts" area behind "submit later"
//! - **NavigationObserver**: the screen/router layer told when a wizard
//!   completes or is cancelled
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_intake::{ClaimSubmissionCoordinator, RestSubmissionAdapter, InMemoryDraftStore};
//!
//! let coordinator = ClaimSubmissionCoordinator::new(
//!     Arc::new(RestSubmissionAdapter::new(config)?),
//!     Arc::new(InMemoryDraftStore::new()),
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{DraftId, PortError, DomainPort, OperationMetadata, HealthCheckable};

use crate::documents::DocumentRef;
use crate::draft::{ClaimDraft, ClaimType, DraftField};

/// Payload sent to the claims backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSubmission {
    pub draft_id: DraftId,
    pub claim_type: ClaimType,
    pub patient_name: String,
    pub illness: String,
    pub documents: Vec<DocumentRef>,
    pub total_amount: Decimal,
}

impl TryFrom<&ClaimDraft> for ClaimSubmission {
    type Error = Vec<DraftField>;

    /// Builds the payload, or lists what the draft is still missing
    fn try_from(draft: &ClaimDraft) -> Result<Self, Self::Error> {
        let missing = draft.missing_fields();
        match draft.claim_type() {
            Some(claim_type) if missing.is_empty() => Ok(Self {
                draft_id: draft.id(),
                claim_type,
                patient_name: draft.patient_name().to_string(),
                illness: draft.illness().to_string(),
                documents: draft.documents().list(),
                total_amount: draft.total_amount(),
            }),
            _ => Err(missing),
        }
    }
}

/// Backend acknowledgement of an accepted claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub reference_no: String,
}

/// A draft parked by "submit later"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDraft {
    pub draft: ClaimDraft,
    pub saved_at: DateTime<Utc>,
}

impl SavedDraft {
    pub fn new(draft: ClaimDraft) -> Self {
        Self {
            draft,
            saved_at: Utc::now(),
        }
    }

    pub fn id(&self) -> DraftId {
        self.draft.id()
    }
}

/// The claims backend
///
/// Called at most once per submit attempt; the coordinator guarantees no
/// overlapping calls for the same draft.
#[async_trait]
pub trait ClaimSubmissionPort: DomainPort + HealthCheckable {
    /// Submits a finished claim
    ///
    /// # Returns
    ///
    /// The backend reference number, or a `PortError` whose
    /// `is_transient()` tells the member whether retrying can help
    async fn submit_claim(
        &self,
        submission: &ClaimSubmission,
        metadata: Option<OperationMetadata>,
    ) -> Result<SubmissionReceipt, PortError>;
}

/// Holding area for drafts the member will finish later
#[async_trait]
pub trait DraftStorePort: DomainPort {
    /// Saves or overwrites a draft under its own id
    async fn save_draft(&self, draft: &SavedDraft) -> Result<(), PortError>;

    /// Loads a saved draft, or `PortError::NotFound`
    async fn get_draft(&self, id: DraftId) -> Result<SavedDraft, PortError>;

    /// Lists saved drafts, most recently saved first
    async fn list_drafts(&self) -> Result<Vec<SavedDraft>, PortError>;

    /// Removes a saved draft, or `PortError::NotFound`
    async fn delete_draft(&self, id: DraftId) -> Result<(), PortError>;
}

/// Screen/router layer notified at wizard boundaries
pub trait NavigationObserver: Send + Sync {
    /// The draft was accepted by the backend under `reference_no`
    fn on_complete(&self, draft: &ClaimDraft, reference_no: &str);

    /// The member cancelled the wizard
    fn on_cancel(&self);
}

/// Navigation observer that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigation;

impl NavigationObserver for NoopNavigation {
    fn on_complete(&self, _draft: &ClaimDraft, _reference_no: &str) {}

    fn on_cancel(&self) {}
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, MutexGuard};
    use tokio::sync::Notify;
    use core_kernel::{AdapterHealth, HealthCheckResult};

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Scripted in-memory claims backend
    ///
    /// Pops one scripted outcome per call; once the script runs out every
    /// call succeeds with the default reference number. An optional gate
    /// holds each call until the test releases it.
    #[derive(Debug)]
    pub struct MockSubmissionPort {
        default_reference: String,
        script: Mutex<VecDeque<Result<SubmissionReceipt, PortError>>>,
        received: Mutex<Vec<ClaimSubmission>>,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl MockSubmissionPort {
        /// A backend that accepts every claim under `reference_no`
        pub fn succeeding(reference_no: impl Into<String>) -> Self {
            Self {
                default_reference: reference_no.into(),
                script: Mutex::new(VecDeque::new()),
                received: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        /// A backend whose next call fails with `error`
        pub fn failing_with(error: PortError) -> Self {
            Self::succeeding("UNUSED").then(Err(error))
        }

        /// Queues an outcome for a later call
        pub fn then(self, outcome: Result<SubmissionReceipt, PortError>) -> Self {
            lock(&self.script).push_back(outcome);
            self
        }

        /// Holds every call until `gate` is notified
        pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        /// Number of times `submit_claim` was entered
        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Payloads received so far
        pub fn received(&self) -> Vec<ClaimSubmission> {
            lock(&self.received).clone()
        }
    }

    impl DomainPort for MockSubmissionPort {}

    #[async_trait]
    impl HealthCheckable for MockSubmissionPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-submission-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl ClaimSubmissionPort for MockSubmissionPort {
        async fn submit_claim(
            &self,
            submission: &ClaimSubmission,
            _metadata: Option<OperationMetadata>,
        ) -> Result<SubmissionReceipt, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            lock(&self.received).push(submission.clone());

            if let Some(ref gate) = self.gate {
                gate.notified().await;
            }

            let scripted = lock(&self.script).pop_front();
            scripted.unwrap_or_else(|| {
                Ok(SubmissionReceipt {
                    reference_no: self.default_reference.clone(),
                })
            })
        }
    }

    /// Navigation observer that records what it was told
    #[derive(Debug, Default)]
    pub struct RecordingNavigation {
        completed: Mutex<Vec<(DraftId, String)>>,
        cancels: AtomicUsize,
    }

    impl RecordingNavigation {
        pub fn new() -> Self {
            Self::default()
        }

        /// `(draft id, reference number)` for every completion
        pub fn completed(&self) -> Vec<(DraftId, String)> {
            lock(&self.completed).clone()
        }

        pub fn cancel_count(&self) -> usize {
            self.cancels.load(Ordering::SeqCst)
        }
    }

    impl NavigationObserver for RecordingNavigation {
        fn on_complete(&self, draft: &ClaimDraft, reference_no: &str) {
            lock(&self.completed).push((draft.id(), reference_no.to_string()));
        }

        fn on_cancel(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }
}
