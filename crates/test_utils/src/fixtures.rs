//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for the intake wizard. Values mirror what a
//! member would actually enter so failures read naturally.

use chrono::NaiveDate;
use core_kernel::PortError;
use domain_intake::{ClaimDraft, ClaimType, DocumentType, NewDocument};
use rust_decimal_macros::dec;

use crate::builders::{DraftBuilder, NewDocumentBuilder};

/// Fixture for patient and claim text
pub struct StringFixtures;

impl StringFixtures {
    pub fn patient_name() -> &'static str {
        "H.M.M.K Herath"
    }

    pub fn illness() -> &'static str {
        "RR"
    }

    /// Reference number the claims backend returns in the happy path
    pub fn reference_no() -> &'static str {
        "M000427"
    }

    pub fn bill_uri() -> &'static str {
        "content://media/external/images/media/1042"
    }

    pub fn prescription_uri() -> &'static str {
        "file:///data/user/0/intake/cache/prescription.pdf"
    }
}

/// Fixture for attached documents
pub struct DocumentFixtures;

impl DocumentFixtures {
    /// Standard treatment date (Feb 12, 2024)
    pub fn treatment_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 12).unwrap()
    }

    /// A dental bill photographed with the camera
    pub fn dental_bill() -> NewDocument {
        NewDocumentBuilder::new()
            .with_type(DocumentType::Bill)
            .with_amount(dec!(4500.00))
            .build()
    }

    /// A prescription picked from storage
    pub fn prescription() -> NewDocument {
        NewDocumentBuilder::new()
            .with_type(DocumentType::Prescription)
            .with_amount(dec!(0))
            .with_source(StringFixtures::prescription_uri(), "application/pdf")
            .build()
    }
}

/// Fixture for drafts at various stages
pub struct DraftFixtures;

impl DraftFixtures {
    /// Dental claim for H.M.M.K Herath with one bill; ready to submit
    pub fn herath_dental() -> ClaimDraft {
        Self::herath_dental_builder().build()
    }

    /// Same claim without any documents; fails submission on `documents`
    pub fn herath_dental_without_documents() -> ClaimDraft {
        DraftBuilder::new()
            .with_claim_type(ClaimType::Dental)
            .with_patient(StringFixtures::patient_name(), StringFixtures::illness())
            .build()
    }

    pub fn herath_dental_builder() -> DraftBuilder {
        DraftBuilder::new()
            .with_claim_type(ClaimType::Dental)
            .with_patient(StringFixtures::patient_name(), StringFixtures::illness())
            .with_document(DocumentFixtures::dental_bill())
    }
}

/// Fixture for collaborator failures
pub struct PortErrorFixtures;

impl PortErrorFixtures {
    pub fn timeout() -> PortError {
        PortError::Timeout {
            operation: "submit_claim".to_string(),
            duration_ms: 30_000,
        }
    }

    pub fn service_unavailable() -> PortError {
        PortError::ServiceUnavailable {
            service: "claims backend returned 503".to_string(),
        }
    }

    pub fn rate_limited() -> PortError {
        PortError::RateLimited { retry_after_secs: 10 }
    }

    /// Backend refused the payload; retrying the same draft will not help
    pub fn rejected() -> PortError {
        PortError::validation_field("illness code not recognised", "illness")
    }

    pub fn unauthorized() -> PortError {
        PortError::Unauthorized {
            message: "token expired".to_string(),
        }
    }
}
