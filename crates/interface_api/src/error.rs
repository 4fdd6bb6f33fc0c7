//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use domain_intake::{DocumentError, IntakeError, SubmissionError, WizardError};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        fields: Vec<String>,
    },
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, details) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict", None),
            ApiError::Internal(msg) => {
                error!(message = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            ApiError::Validation { fields, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                Some(fields.clone()),
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        let message = err.to_string();
        match err {
            IntakeError::Wizard(WizardError::Validation { fields }) => ApiError::Validation {
                message,
                fields: fields.iter().map(|f| f.as_str().to_string()).collect(),
            },
            IntakeError::Wizard(WizardError::InvalidState { .. }) => ApiError::Conflict(message),
            IntakeError::Wizard(WizardError::Document(DocumentError::NotFound(_))) => {
                ApiError::NotFound(message)
            }
            IntakeError::Wizard(WizardError::Document(DocumentError::DuplicateId(_))) => {
                ApiError::Conflict(message)
            }
            IntakeError::Wizard(WizardError::SessionClosed) => ApiError::NotFound(message),
            IntakeError::Submission(SubmissionError::AlreadyInProgress) => ApiError::Conflict(message),
            IntakeError::DraftStore(ref e) if e.is_not_found() => ApiError::NotFound(message),
            IntakeError::DraftStore(_) => ApiError::Internal(message),
        }
    }
}

impl From<core_kernel::CoreError> for ApiError {
    fn from(err: core_kernel::CoreError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{DocumentId, PortError};
    use domain_intake::{DraftField, WizardStep};

    fn status(err: IntakeError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_intake_error_status_codes() {
        assert_eq!(
            status(WizardError::Validation { fields: vec![DraftField::Illness] }.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(
                WizardError::InvalidState {
                    step: WizardStep::SelectClaimType,
                    action: "go back",
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(DocumentError::NotFound(DocumentId::new()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status(SubmissionError::AlreadyInProgress.into()), StatusCode::CONFLICT);
        assert_eq!(
            status(PortError::not_found("SavedDraft", "1").into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(PortError::connection("store offline").into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_lists_fields() {
        let err = ApiError::from(IntakeError::from(WizardError::Validation {
            fields: vec![DraftField::PatientName, DraftField::Illness],
        }));
        assert!(matches!(err, ApiError::Validation { ref fields, .. } if fields == &["patientName", "illness"]));
    }
}
