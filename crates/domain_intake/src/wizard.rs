//! Claim intake wizard state machine

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::DocumentId;
use crate::documents::{DocumentPatch, DocumentRef, NewDocument};
use crate::draft::{ClaimDraft, ClaimType, DraftField, DraftSnapshot};
use crate::error::WizardError;
use crate::validation::missing_required;

/// Wizard steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    /// Choosing outdoor, indoor, dental or spectacles
    SelectClaimType,
    /// Entering patient name and illness, attaching documents
    EnterPatientDetails,
    /// Reviewing the draft before submission
    ReviewAndSubmit,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::SelectClaimType => "SelectClaimType",
            WizardStep::EnterPatientDetails => "EnterPatientDetails",
            WizardStep::ReviewAndSubmit => "ReviewAndSubmit",
        };
        f.write_str(name)
    }
}

/// Holds the active step and the draft it is building
///
/// # State Machine
///
/// - SelectClaimType -> EnterPatientDetails (via `select_claim_type`)
/// - EnterPatientDetails -> ReviewAndSubmit (via `advance`)
/// - ReviewAndSubmit -> EnterPatientDetails (via `back`)
/// - EnterPatientDetails -> SelectClaimType (via `back`)
/// - any -> SelectClaimType with an empty draft (via `cancel`)
///
/// A machine is owned by exactly one wizard session.
#[derive(Debug, Clone)]
pub struct WizardStateMachine {
    step: WizardStep,
    draft: ClaimDraft,
}

impl WizardStateMachine {
    /// Opens the wizard on an empty draft
    pub fn new() -> Self {
        Self {
            step: WizardStep::SelectClaimType,
            draft: ClaimDraft::new(),
        }
    }

    /// Reopens a previously saved draft at the furthest step its contents allow
    pub fn resume(draft: ClaimDraft) -> Self {
        let step = match (draft.claim_type(), draft.has_patient_details()) {
            (None, _) => WizardStep::SelectClaimType,
            (Some(_), false) => WizardStep::EnterPatientDetails,
            (Some(_), true) => WizardStep::ReviewAndSubmit,
        };
        info!(draft_id = %draft.id(), %step, "Wizard resumed from saved draft");
        Self { step, draft }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &ClaimDraft {
        &self.draft
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            step: self.step,
            draft: self.draft.clone(),
        }
    }

    /// Stores the claim type and moves to patient details
    pub fn select_claim_type(&mut self, claim_type: ClaimType) -> Result<DraftSnapshot, WizardError> {
        self.require(WizardStep::SelectClaimType, "select a claim type")?;
        self.draft.set_claim_type(Some(claim_type));
        self.transition(WizardStep::EnterPatientDetails);
        Ok(self.snapshot())
    }

    /// Stores patient name and illness and moves to review
    ///
    /// Leaves step and draft untouched when either value is blank.
    pub fn advance(&mut self, patient_name: &str, illness: &str) -> Result<DraftSnapshot, WizardError> {
        self.require(WizardStep::EnterPatientDetails, "enter patient details")?;
        let missing = missing_required(&[
            (DraftField::PatientName, patient_name),
            (DraftField::Illness, illness),
        ]);
        if !missing.is_empty() {
            return Err(WizardError::Validation { fields: missing });
        }
        self.draft.set_patient_details(patient_name, illness);
        self.transition(WizardStep::ReviewAndSubmit);
        Ok(self.snapshot())
    }

    /// Steps back one screen, keeping what has been entered
    ///
    /// Going back to claim type selection clears the chosen type so a
    /// different one can be picked.
    pub fn back(&mut self) -> Result<DraftSnapshot, WizardError> {
        match self.step {
            WizardStep::SelectClaimType => {
                return Err(WizardError::invalid_state(self.step, "go back"));
            }
            WizardStep::EnterPatientDetails => {
                self.draft.set_claim_type(None);
                self.transition(WizardStep::SelectClaimType);
            }
            WizardStep::ReviewAndSubmit => self.transition(WizardStep::EnterPatientDetails),
        }
        Ok(self.snapshot())
    }

    /// Discards the draft and returns to the first step. Safe to call repeatedly.
    pub fn cancel(&mut self) -> DraftSnapshot {
        if !self.draft.is_empty() || self.step != WizardStep::SelectClaimType {
            info!(draft_id = %self.draft.id(), from = %self.step, "Wizard cancelled");
        }
        self.draft = ClaimDraft::new();
        self.step = WizardStep::SelectClaimType;
        self.snapshot()
    }

    /// Refuses to send a complete draft from any step but review
    ///
    /// Incomplete drafts pass so the submission can report what is missing.
    pub fn check_submittable(&self) -> Result<(), WizardError> {
        if self.draft.is_complete() {
            self.require(WizardStep::ReviewAndSubmit, "submit")?;
        }
        Ok(())
    }

    /// Swaps in a fresh draft after a successful submission and returns the submitted one
    pub fn complete(&mut self) -> ClaimDraft {
        self.step = WizardStep::SelectClaimType;
        std::mem::take(&mut self.draft)
    }

    /// Attaches a document; requires a chosen claim type
    pub fn add_document(&mut self, doc: NewDocument) -> Result<DocumentId, WizardError> {
        self.require_documents_open("attach a document")?;
        Ok(self.draft.documents_mut().add(doc))
    }

    pub fn edit_document(&mut self, id: DocumentId, patch: &DocumentPatch) -> Result<DocumentRef, WizardError> {
        self.require_documents_open("edit a document")?;
        Ok(self.draft.documents_mut().edit(id, patch)?)
    }

    pub fn remove_document(&mut self, id: DocumentId) -> Result<DocumentRef, WizardError> {
        self.require_documents_open("remove a document")?;
        Ok(self.draft.documents_mut().remove(id)?)
    }

    pub fn documents(&self) -> Vec<DocumentRef> {
        self.draft.documents().list()
    }

    fn require(&self, expected: WizardStep, action: &'static str) -> Result<(), WizardError> {
        if self.step != expected {
            return Err(WizardError::invalid_state(self.step, action));
        }
        Ok(())
    }

    fn require_documents_open(&self, action: &'static str) -> Result<(), WizardError> {
        if self.step == WizardStep::SelectClaimType {
            return Err(WizardError::invalid_state(self.step, action));
        }
        Ok(())
    }

    fn transition(&mut self, to: WizardStep) {
        info!(draft_id = %self.draft.id(), from = %self.step, %to, "Wizard step changed");
        self.step = to;
    }
}

impl Default for WizardStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
