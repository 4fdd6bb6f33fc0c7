//! One member's pass through the intake wizard
//!
//! A `WizardSession` owns a state machine, the coordinator that submits
//! its draft, and the navigation observer for the screen hosting it. All
//! methods take `&self` so a session can sit behind an `Arc` and be driven
//! from request handlers; the machine lock is never held across an await.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use core_kernel::{DocumentId, DraftId, PortError, SessionId};

use crate::documents::{DocumentPatch, DocumentRef, NewDocument};
use crate::draft::{ClaimDraft, ClaimType, DraftField, DraftSnapshot};
use crate::error::{IntakeError, WizardError};
use crate::ports::{ClaimSubmissionPort, DraftStorePort, NavigationObserver, NoopNavigation};
use crate::submission::{ClaimSubmissionCoordinator, SubmissionResult};
use crate::wizard::WizardStateMachine;

pub struct WizardSession {
    id: SessionId,
    machine: Mutex<WizardStateMachine>,
    coordinator: ClaimSubmissionCoordinator,
    draft_store: Arc<dyn DraftStorePort>,
    navigation: Arc<dyn NavigationObserver>,
    closed: AtomicBool,
}

impl WizardSession {
    /// Opens a session on an empty draft with no navigation observer
    pub fn new(
        submission_port: Arc<dyn ClaimSubmissionPort>,
        draft_store: Arc<dyn DraftStorePort>,
    ) -> Self {
        Self::with_navigation(submission_port, draft_store, Arc::new(NoopNavigation))
    }

    pub fn with_navigation(
        submission_port: Arc<dyn ClaimSubmissionPort>,
        draft_store: Arc<dyn DraftStorePort>,
        navigation: Arc<dyn NavigationObserver>,
    ) -> Self {
        let id = SessionId::new_v7();
        info!(session_id = %id, "Wizard session opened");
        Self {
            id,
            machine: Mutex::new(WizardStateMachine::new()),
            coordinator: ClaimSubmissionCoordinator::new(submission_port, Arc::clone(&draft_store)),
            draft_store,
            navigation,
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Id of the draft currently being built
    pub fn draft_id(&self) -> Result<DraftId, IntakeError> {
        Ok(self.machine()?.draft().id())
    }

    pub fn snapshot(&self) -> Result<DraftSnapshot, IntakeError> {
        Ok(self.machine()?.snapshot())
    }

    pub fn select_claim_type(&self, claim_type: ClaimType) -> Result<DraftSnapshot, IntakeError> {
        Ok(self.machine()?.select_claim_type(claim_type)?)
    }

    pub fn advance(&self, patient_name: &str, illness: &str) -> Result<DraftSnapshot, IntakeError> {
        Ok(self.machine()?.advance(patient_name, illness)?)
    }

    pub fn back(&self) -> Result<DraftSnapshot, IntakeError> {
        Ok(self.machine()?.back()?)
    }

    /// Discards the draft, returns to the first step and tells the navigation layer
    pub fn cancel(&self) -> Result<DraftSnapshot, IntakeError> {
        let snapshot = self.machine()?.cancel();
        self.navigation.on_cancel();
        Ok(snapshot)
    }

    pub fn add_document(&self, doc: NewDocument) -> Result<DocumentId, IntakeError> {
        Ok(self.machine()?.add_document(doc)?)
    }

    pub fn edit_document(&self, id: DocumentId, patch: &DocumentPatch) -> Result<DocumentRef, IntakeError> {
        Ok(self.machine()?.edit_document(id, patch)?)
    }

    pub fn remove_document(&self, id: DocumentId) -> Result<DocumentRef, IntakeError> {
        Ok(self.machine()?.remove_document(id)?)
    }

    pub fn documents(&self) -> Result<Vec<DocumentRef>, IntakeError> {
        Ok(self.machine()?.documents())
    }

    pub fn can_submit(&self) -> Result<bool, IntakeError> {
        let machine = self.machine()?;
        Ok(self.coordinator.can_submit(machine.draft()))
    }

    pub fn missing_fields(&self) -> Result<Vec<DraftField>, IntakeError> {
        let machine = self.machine()?;
        Ok(self.coordinator.missing_fields(machine.draft()))
    }

    /// True while the current draft is with the claims backend
    pub fn is_submitting(&self) -> bool {
        self.coordinator.is_in_flight()
    }

    /// Submits the current draft
    ///
    /// A complete draft is only sent from the review step; elsewhere this
    /// fails with `InvalidState`. An incomplete draft yields
    /// `ValidationFailed` without reaching the backend.
    ///
    /// On success the wizard starts over on a fresh draft, the saved copy
    /// (if the draft was resumed) is dropped, and the navigation observer
    /// gets the reference number. None of that happens if the session was
    /// closed, or the draft was cancelled or replaced, while the backend
    /// call was pending; the result is still returned.
    pub async fn submit(&self) -> Result<SubmissionResult, IntakeError> {
        let draft = {
            let machine = self.machine()?;
            machine.check_submittable()?;
            machine.draft().clone()
        };

        let result = self.coordinator.submit(&draft).await?;

        if let SubmissionResult::Success { reference_no } = &result {
            if let Some(submitted) = self.take_submitted(draft.id()) {
                self.forget_saved_copy(submitted.id()).await;
                self.navigation.on_complete(&submitted, reference_no);
            }
        }

        Ok(result)
    }

    /// Parks the current draft in the saved-drafts area without validating it
    ///
    /// The wizard keeps its state. The returned handle resolves once the
    /// store has the draft.
    pub fn submit_later(&self) -> Result<JoinHandle<Result<DraftId, PortError>>, IntakeError> {
        let machine = self.machine()?;
        Ok(self.coordinator.submit_later(machine.draft()))
    }

    /// Replaces the current draft with one from the saved-drafts area
    pub async fn resume_saved(&self, draft_id: DraftId) -> Result<DraftSnapshot, IntakeError> {
        self.ensure_open()?;
        let saved = self.draft_store.get_draft(draft_id).await?;

        let mut machine = self.machine()?;
        *machine = WizardStateMachine::resume(saved.draft);
        Ok(machine.snapshot())
    }

    /// Ends the session; any pending submission result is ignored. Idempotent.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.coordinator.dispose();
            info!(session_id = %self.id, "Wizard session closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn take_submitted(&self, submitted_id: DraftId) -> Option<ClaimDraft> {
        if self.is_closed() {
            warn!(session_id = %self.id, draft_id = %submitted_id, "Submission resolved after session closed");
            return None;
        }

        let mut machine = lock(&self.machine);
        if machine.draft().id() != submitted_id {
            warn!(
                session_id = %self.id,
                draft_id = %submitted_id,
                "Submission resolved after the draft was replaced"
            );
            return None;
        }
        Some(machine.complete())
    }

    async fn forget_saved_copy(&self, draft_id: DraftId) {
        match self.draft_store.delete_draft(draft_id).await {
            Ok(()) => info!(draft_id = %draft_id, "Saved copy removed after submission"),
            Err(err) if err.is_not_found() => {}
            Err(err) => warn!(draft_id = %draft_id, error = %err, "Could not remove saved copy"),
        }
    }

    fn ensure_open(&self) -> Result<(), IntakeError> {
        if self.is_closed() {
            return Err(WizardError::SessionClosed.into());
        }
        Ok(())
    }

    fn machine(&self) -> Result<MutexGuard<'_, WizardStateMachine>, IntakeError> {
        self.ensure_open()?;
        Ok(lock(&self.machine))
    }
}

impl Drop for WizardSession {
    fn drop(&mut self) {
        self.coordinator.dispose();
    }
}

impl std::fmt::Debug for WizardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardSession")
            .field("id", &self.id)
            .field("coordinator", &self.coordinator)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

// A panic while the machine was locked leaves it in a consistent step, so
// poisoning is ignored.
fn lock(mutex: &Mutex<WizardStateMachine>) -> MutexGuard<'_, WizardStateMachine> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryDraftStore;
    use crate::ports::mock::{MockSubmissionPort, RecordingNavigation};

    fn session() -> (WizardSession, Arc<RecordingNavigation>) {
        let navigation = Arc::new(RecordingNavigation::new());
        let session = WizardSession::with_navigation(
            Arc::new(MockSubmissionPort::succeeding("M000427")),
            Arc::new(InMemoryDraftStore::new()),
            navigation.clone(),
        );
        (session, navigation)
    }

    #[test]
    fn test_cancel_notifies_navigation() {
        let (session, navigation) = session();
        session.select_claim_type(ClaimType::Indoor).unwrap();

        let snapshot = session.cancel().unwrap();

        assert!(snapshot.draft.is_empty());
        assert_eq!(navigation.cancel_count(), 1);
    }

    #[test]
    fn test_closed_session_rejects_actions() {
        let (session, _) = session();
        session.close();
        session.close();

        assert!(matches!(
            session.select_claim_type(ClaimType::Dental),
            Err(IntakeError::Wizard(WizardError::SessionClosed))
        ));
        assert!(session.snapshot().is_err());
    }

    #[tokio::test]
    async fn test_submit_after_back_from_review_is_invalid_state() {
        let port = Arc::new(MockSubmissionPort::succeeding("M000427"));
        let session = WizardSession::new(port.clone(), Arc::new(InMemoryDraftStore::new()));
        session.select_claim_type(ClaimType::Dental).unwrap();
        session
            .add_document(NewDocument {
                document_type: crate::documents::DocumentType::Bill,
                document_date: chrono::NaiveDate::from_ymd_opt(2024, 2, 12).unwrap(),
                amount: rust_decimal::Decimal::new(450000, 2),
                source_uri: "content://media/external/images/7".to_string(),
                mime_type: "image/jpeg".to_string(),
            })
            .unwrap();
        session.advance("H.M.M.K Herath", "RR").unwrap();
        session.back().unwrap();

        let err = session.submit().await.unwrap_err();

        assert!(matches!(
            err,
            IntakeError::Wizard(WizardError::InvalidState {
                step: crate::wizard::WizardStep::EnterPatientDetails,
                action: "submit",
            })
        ));
        assert_eq!(port.call_count(), 0);
        assert_eq!(session.snapshot().unwrap().draft.illness(), "RR");
    }

    #[tokio::test]
    async fn test_resume_unknown_draft_is_store_error() {
        let (session, _) = session();
        let err = session.resume_saved(DraftId::new()).await.unwrap_err();
        assert!(matches!(err, IntakeError::DraftStore(ref e) if e.is_not_found()));
    }
}
