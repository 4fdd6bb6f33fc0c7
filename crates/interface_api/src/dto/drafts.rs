//! Saved draft DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use core_kernel::DraftId;
use domain_intake::{ClaimType, SavedDraft};

/// One row of the saved-drafts list
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDraftResponse {
    pub draft_id: DraftId,
    pub claim_type: Option<ClaimType>,
    pub patient_name: String,
    pub document_count: usize,
    pub saved_at: DateTime<Utc>,
}

impl From<&SavedDraft> for SavedDraftResponse {
    fn from(saved: &SavedDraft) -> Self {
        Self {
            draft_id: saved.id(),
            claim_type: saved.draft.claim_type(),
            patient_name: saved.draft.patient_name().to_string(),
            document_count: saved.draft.documents().len(),
            saved_at: saved.saved_at,
        }
    }
}
