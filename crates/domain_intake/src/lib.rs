//! Claim Intake Domain
//!
//! This crate implements the guided claim intimation flow a member walks
//! through on the mobile app, from picking a claim type to handing the
//! finished draft to the claims backend.
//!
//! # Wizard Flow
//!
//! ```text
//! SelectClaimType -> EnterPatientDetails -> ReviewAndSubmit -> (submitted)
//!        ^                                                        |
//!        +------------------------- cancel ----------------------+
//! ```
//!
//! Per-field checks live in [`validation`], the step machine in [`wizard`],
//! attached bills and prescriptions in [`documents`], and the final commit
//! in [`submission`]. A [`session::WizardSession`] ties one of each together
//! for a single screen session.

pub mod validation;
pub mod draft;
pub mod documents;
pub mod wizard;
pub mod submission;
pub mod ports;
pub mod adapters;
pub mod session;
pub mod error;

pub use draft::{ClaimDraft, ClaimType, DraftField, DraftSnapshot};
pub use documents::{DocumentCollection, DocumentPatch, DocumentRef, DocumentType, NewDocument};
pub use wizard::{WizardStateMachine, WizardStep};
pub use submission::{ClaimSubmissionCoordinator, SubmissionResult};
pub use ports::{
    ClaimSubmissionPort, DraftStorePort, NavigationObserver, NoopNavigation,
    ClaimSubmission, SubmissionReceipt, SavedDraft,
};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockSubmissionPort, RecordingNavigation};
pub use adapters::{InMemoryDraftStore, RestSubmissionAdapter, RestSubmissionConfig};
pub use session::WizardSession;
pub use error::{DocumentError, IntakeError, SubmissionError, WizardError};
