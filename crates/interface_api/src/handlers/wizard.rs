//! Wizard handlers
//!
//! Every mutating endpoint returns the full wizard state so the client can
//! re-render without a follow-up GET.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use core_kernel::{DocumentId, SessionId};
use domain_intake::{ClaimType, DocumentPatch, DocumentRef, IntakeError, NewDocument, WizardError};

use crate::dto::wizard::*;
use crate::{error::ApiError, AppState};

/// Opens a new wizard on an empty draft
pub async fn create_wizard(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<WizardResponse>), ApiError> {
    let session = state.new_session();
    let response = WizardResponse::current(&session)?;
    state.register(session).await;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardResponse>, ApiError> {
    let session = state.session(SessionId::from_uuid(id)).await?;
    Ok(Json(WizardResponse::current(&session)?))
}

/// Discards the wizard; a pending submission result will be ignored
pub async fn close_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.close_session(SessionId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn select_claim_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectClaimTypeRequest>,
) -> Result<Json<WizardResponse>, ApiError> {
    let claim_type: ClaimType = request.claim_type.parse()?;
    let session = state.session(SessionId::from_uuid(id)).await?;
    let snapshot = session.select_claim_type(claim_type)?;
    Ok(Json(WizardResponse::from_snapshot(&session, snapshot)))
}

pub async fn patient_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PatientDetailsRequest>,
) -> Result<Json<WizardResponse>, ApiError> {
    let session = state.session(SessionId::from_uuid(id)).await?;
    let snapshot = session.advance(&request.patient_name, &request.illness)?;
    Ok(Json(WizardResponse::from_snapshot(&session, snapshot)))
}

pub async fn back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardResponse>, ApiError> {
    let session = state.session(SessionId::from_uuid(id)).await?;
    let snapshot = session.back()?;
    Ok(Json(WizardResponse::from_snapshot(&session, snapshot)))
}

/// Starts the wizard over; the session stays open
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardResponse>, ApiError> {
    let session = state.session(SessionId::from_uuid(id)).await?;
    let snapshot = session.cancel()?;
    Ok(Json(WizardResponse::from_snapshot(&session, snapshot)))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DocumentRef>>, ApiError> {
    let session = state.session(SessionId::from_uuid(id)).await?;
    Ok(Json(session.documents()?))
}

pub async fn add_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(document): Json<NewDocument>,
) -> Result<(StatusCode, Json<DocumentAddedResponse>), ApiError> {
    let session = state.session(SessionId::from_uuid(id)).await?;
    let id = session.add_document(document)?;
    let documents = session.documents()?;
    Ok((StatusCode::CREATED, Json(DocumentAddedResponse { id, documents })))
}

pub async fn edit_document(
    State(state): State<AppState>,
    Path((id, doc_id)): Path<(Uuid, Uuid)>,
    Json(patch): Json<DocumentPatch>,
) -> Result<Json<DocumentRef>, ApiError> {
    if patch.is_empty() {
        return Err(ApiError::BadRequest("Document patch changes nothing".to_string()));
    }
    let session = state.session(SessionId::from_uuid(id)).await?;
    Ok(Json(session.edit_document(DocumentId::from_uuid(doc_id), &patch)?))
}

pub async fn remove_document(
    State(state): State<AppState>,
    Path((id, doc_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let session = state.session(SessionId::from_uuid(id)).await?;
    session.remove_document(DocumentId::from_uuid(doc_id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Submits the current draft to the claims backend
///
/// Validation and network failures are reported in the body with 200; only
/// a second submit while one is pending is an error (409). A successful
/// submission ends the wizard, so `wizard` is null. It is also null when the
/// wizard was closed while the backend call was pending.
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let session_id = SessionId::from_uuid(id);
    let session = state.session(session_id).await?;
    let result = session.submit().await?;

    if result.is_success() {
        state.discard_session(session_id).await;
        return Ok(Json(SubmitResponse { result, wizard: None }));
    }

    let wizard = match session.snapshot() {
        Ok(snapshot) => Some(WizardResponse::from_snapshot(&session, snapshot)),
        Err(IntakeError::Wizard(WizardError::SessionClosed)) => None,
        Err(err) => return Err(err.into()),
    };
    Ok(Json(SubmitResponse { result, wizard }))
}

/// Parks the current draft in the saved-drafts area and returns at once
pub async fn submit_later(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SubmitLaterResponse>), ApiError> {
    let session = state.session(SessionId::from_uuid(id)).await?;
    let draft_id = session.snapshot()?.draft.id();
    // The save task logs its own outcome
    drop(session.submit_later()?);
    Ok((StatusCode::ACCEPTED, Json(SubmitLaterResponse { draft_id })))
}
