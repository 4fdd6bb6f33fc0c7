//! Claim draft

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, DraftId};
use crate::documents::DocumentCollection;
use crate::validation::missing_required;
use crate::wizard::WizardStep;

/// Kind of claim being intimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    /// Outpatient consultation
    Outdoor,
    /// Hospital admission
    Indoor,
    Dental,
    Spectacles,
}

impl ClaimType {
    pub const ALL: [ClaimType; 4] = [
        ClaimType::Outdoor,
        ClaimType::Indoor,
        ClaimType::Dental,
        ClaimType::Spectacles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Outdoor => "outdoor",
            ClaimType::Indoor => "indoor",
            ClaimType::Dental => "dental",
            ClaimType::Spectacles => "spectacles",
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ClaimType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::validation(format!("Unknown claim type: {}", s)))
    }
}

/// A condition a draft must satisfy before it can be submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    ClaimType,
    PatientName,
    Illness,
    Documents,
}

impl DraftField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::ClaimType => "claimType",
            DraftField::PatientName => "patientName",
            DraftField::Illness => "illness",
            DraftField::Documents => "documents",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-memory claim data for one wizard session
///
/// Fields are only writable from inside the crate; callers change a draft
/// by driving the [`WizardStateMachine`](crate::wizard::WizardStateMachine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDraft {
    id: DraftId,
    claim_type: Option<ClaimType>,
    patient_name: String,
    illness: String,
    documents: DocumentCollection,
    created_at: DateTime<Utc>,
}

impl ClaimDraft {
    /// Creates an empty draft
    pub fn new() -> Self {
        Self {
            id: DraftId::new_v7(),
            claim_type: None,
            patient_name: String::new(),
            illness: String::new(),
            documents: DocumentCollection::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> DraftId {
        self.id
    }

    pub fn claim_type(&self) -> Option<ClaimType> {
        self.claim_type
    }

    pub fn patient_name(&self) -> &str {
        &self.patient_name
    }

    pub fn illness(&self) -> &str {
        &self.illness
    }

    pub fn documents(&self) -> &DocumentCollection {
        &self.documents
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sum of the amounts on every attached document
    pub fn total_amount(&self) -> Decimal {
        self.documents.total_amount()
    }

    /// True when nothing has been entered yet
    pub fn is_empty(&self) -> bool {
        self.claim_type.is_none()
            && self.patient_name.is_empty()
            && self.illness.is_empty()
            && self.documents.is_empty()
    }

    /// True when patient name and illness both pass the required check
    pub fn has_patient_details(&self) -> bool {
        missing_required(&self.detail_fields()).is_empty()
    }

    /// Lists every unmet submission condition, always in the order
    /// claimType, patientName, illness, documents
    pub fn missing_fields(&self) -> Vec<DraftField> {
        let mut missing = Vec::new();
        if self.claim_type.is_none() {
            missing.push(DraftField::ClaimType);
        }
        missing.extend(missing_required(&self.detail_fields()));
        if self.documents.is_empty() {
            missing.push(DraftField::Documents);
        }
        missing
    }

    /// True iff [`missing_fields`](Self::missing_fields) is empty
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub(crate) fn set_claim_type(&mut self, claim_type: Option<ClaimType>) {
        self.claim_type = claim_type;
    }

    pub(crate) fn set_patient_details(&mut self, patient_name: &str, illness: &str) {
        self.patient_name = patient_name.trim().to_string();
        self.illness = illness.trim().to_string();
    }

    pub(crate) fn documents_mut(&mut self) -> &mut DocumentCollection {
        &mut self.documents
    }

    fn detail_fields(&self) -> [(DraftField, &str); 2] {
        [
            (DraftField::PatientName, self.patient_name.as_str()),
            (DraftField::Illness, self.illness.as_str()),
        ]
    }
}

impl Default for ClaimDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// What the wizard hands back after every transition so the screen can re-render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub step: WizardStep,
    pub draft: ClaimDraft,
}
