//! Saved draft handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use core_kernel::DraftId;

use crate::dto::drafts::SavedDraftResponse;
use crate::dto::wizard::WizardResponse;
use crate::{error::ApiError, AppState};

/// Lists saved drafts, most recent first
pub async fn list_drafts(
    State(state): State<AppState>,
) -> Result<Json<Vec<SavedDraftResponse>>, ApiError> {
    let drafts = state
        .draft_store
        .list_drafts()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(drafts.iter().map(SavedDraftResponse::from).collect()))
}

/// Opens a new wizard on a saved draft
///
/// A draft already open in another wizard is a conflict.
pub async fn resume_draft(
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
) -> Result<(StatusCode, Json<WizardResponse>), ApiError> {
    let session = state.new_session();
    let snapshot = session.resume_saved(DraftId::from_uuid(draft_id)).await?;
    let response = WizardResponse::from_snapshot(&session, snapshot);
    state.register_resumed(session).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
