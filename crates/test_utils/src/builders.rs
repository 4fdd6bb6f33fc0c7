//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.
//!
//! Drafts are only mutable through the wizard, so `DraftBuilder` drives a
//! real `WizardStateMachine` instead of setting fields directly.

use std::sync::Arc;

use chrono::NaiveDate;
use domain_intake::{
    ClaimDraft, ClaimSubmissionPort, ClaimType, DocumentType, InMemoryDraftStore,
    MockSubmissionPort, NewDocument, RecordingNavigation, WizardSession, WizardStateMachine,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::{DocumentFixtures, StringFixtures};

/// Builder for documents picked by the member
pub struct NewDocumentBuilder {
    document_type: DocumentType,
    document_date: NaiveDate,
    amount: Decimal,
    source_uri: String,
    mime_type: String,
}

impl Default for NewDocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewDocumentBuilder {
    /// Creates a new builder for a JPEG bill
    pub fn new() -> Self {
        Self {
            document_type: DocumentType::Bill,
            document_date: DocumentFixtures::treatment_date(),
            amount: dec!(1000.00),
            source_uri: StringFixtures::bill_uri().to_string(),
            mime_type: "image/jpeg".to_string(),
        }
    }

    pub fn with_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = document_type;
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.document_date = date;
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    /// Sets where the binary content lives and its media type
    pub fn with_source(mut self, uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        self.source_uri = uri.into();
        self.mime_type = mime_type.into();
        self
    }

    pub fn build(self) -> NewDocument {
        NewDocument {
            document_type: self.document_type,
            document_date: self.document_date,
            amount: self.amount,
            source_uri: self.source_uri,
            mime_type: self.mime_type,
        }
    }
}

/// Builder for drafts and the wizard that holds them
#[derive(Default)]
pub struct DraftBuilder {
    claim_type: Option<ClaimType>,
    patient: Option<(String, String)>,
    documents: Vec<NewDocument>,
}

impl DraftBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_claim_type(mut self, claim_type: ClaimType) -> Self {
        self.claim_type = Some(claim_type);
        self
    }

    /// Sets patient name and illness; both must be non-blank
    pub fn with_patient(mut self, name: impl Into<String>, illness: impl Into<String>) -> Self {
        self.patient = Some((name.into(), illness.into()));
        self
    }

    /// Attaches a document; requires a claim type
    pub fn with_document(mut self, doc: NewDocument) -> Self {
        self.documents.push(doc);
        self
    }

    /// Drives a wizard through the configured steps
    ///
    /// # Panics
    ///
    /// Panics if the configuration is not reachable through the wizard
    /// (documents or patient details without a claim type, blank details).
    pub fn build_machine(self) -> WizardStateMachine {
        let mut wizard = WizardStateMachine::new();

        if let Some(claim_type) = self.claim_type {
            wizard
                .select_claim_type(claim_type)
                .expect("claim type selection from a fresh wizard");
        }
        for doc in self.documents {
            wizard.add_document(doc).expect("documents require a claim type");
        }
        if let Some((name, illness)) = self.patient {
            wizard
                .advance(&name, &illness)
                .expect("patient details require a claim type and non-blank values");
        }

        wizard
    }

    pub fn build(self) -> ClaimDraft {
        self.build_machine().draft().clone()
    }
}

/// A wizard session wired to in-memory collaborators
pub struct TestSession {
    pub session: WizardSession,
    pub navigation: Arc<RecordingNavigation>,
    pub draft_store: Arc<InMemoryDraftStore>,
}

/// Builder for wizard sessions
pub struct TestSessionBuilder {
    submission_port: Arc<dyn ClaimSubmissionPort>,
    draft_store: InMemoryDraftStore,
}

impl Default for TestSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSessionBuilder {
    /// Creates a builder whose backend accepts every claim
    pub fn new() -> Self {
        Self {
            submission_port: Arc::new(MockSubmissionPort::succeeding(StringFixtures::reference_no())),
            draft_store: InMemoryDraftStore::new(),
        }
    }

    pub fn with_submission_port(mut self, port: Arc<dyn ClaimSubmissionPort>) -> Self {
        self.submission_port = port;
        self
    }

    /// Shares an existing store (clones share the same map)
    pub fn with_draft_store(mut self, store: InMemoryDraftStore) -> Self {
        self.draft_store = store;
        self
    }

    pub fn build(self) -> TestSession {
        let navigation = Arc::new(RecordingNavigation::new());
        let draft_store = Arc::new(self.draft_store);
        let session = WizardSession::with_navigation(
            self.submission_port,
            draft_store.clone(),
            navigation.clone(),
        );
        TestSession {
            session,
            navigation,
            draft_store,
        }
    }
}
