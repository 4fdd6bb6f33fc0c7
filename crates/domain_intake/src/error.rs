//! Intake domain errors

use thiserror::Error;

use core_kernel::{DocumentId, PortError};
use crate::draft::DraftField;
use crate::wizard::WizardStep;

/// Errors raised by the document list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The id does not refer to an attached document; the caller holds a stale list
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    #[error("Duplicate document id: {0}")]
    DuplicateId(DocumentId),
}

/// Errors raised by wizard transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    /// The action is not allowed from the current step (UI and machine out of sync)
    #[error("Cannot {action} while in step {step}")]
    InvalidState {
        step: WizardStep,
        action: &'static str,
    },

    /// One or more fields failed validation; the user can correct and retry
    #[error("Missing or invalid fields: {}", join_fields(.fields))]
    Validation {
        fields: Vec<DraftField>,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Wizard session has been closed")]
    SessionClosed,
}

impl WizardError {
    pub(crate) fn invalid_state(step: WizardStep, action: &'static str) -> Self {
        WizardError::InvalidState { step, action }
    }
}

/// Errors raised by the submission coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("A submission is already in progress for this draft")]
    AlreadyInProgress,
}

/// Errors surfaced by a wizard session, which spans the machine, the
/// coordinator and the draft store
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("Saved draft store error: {0}")]
    DraftStore(#[from] PortError),
}

impl From<DocumentError> for IntakeError {
    fn from(err: DocumentError) -> Self {
        IntakeError::Wizard(WizardError::Document(err))
    }
}

fn join_fields(fields: &[DraftField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
