//! Wizard DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{DocumentId, DraftId, SessionId};
use domain_intake::{
    ClaimDraft, DocumentRef, DraftField, DraftSnapshot, SubmissionResult, WizardSession, WizardStep,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectClaimTypeRequest {
    pub claim_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetailsRequest {
    pub patient_name: String,
    pub illness: String,
}

/// Everything the wizard screen needs to render
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardResponse {
    pub session_id: SessionId,
    pub step: WizardStep,
    pub draft: ClaimDraft,
    pub total_amount: Decimal,
    pub can_submit: bool,
    pub missing_fields: Vec<DraftField>,
    pub submitting: bool,
}

impl WizardResponse {
    pub fn from_snapshot(session: &WizardSession, snapshot: DraftSnapshot) -> Self {
        let missing_fields = snapshot.draft.missing_fields();
        Self {
            session_id: session.id(),
            step: snapshot.step,
            total_amount: snapshot.draft.total_amount(),
            can_submit: missing_fields.is_empty(),
            missing_fields,
            draft: snapshot.draft,
            submitting: session.is_submitting(),
        }
    }

    /// Current state of `session`
    pub fn current(session: &WizardSession) -> Result<Self, ApiError> {
        let snapshot = session.snapshot()?;
        Ok(Self::from_snapshot(session, snapshot))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAddedResponse {
    pub id: DocumentId,
    pub documents: Vec<DocumentRef>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub result: SubmissionResult,
    /// The wizard after the attempt; absent once it has ended
    pub wizard: Option<WizardResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitLaterResponse {
    pub draft_id: DraftId,
}
