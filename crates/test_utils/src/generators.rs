//! Property-Based Test Generators
//!
//! Provides proptest strategies for wizard input, documents, and whole
//! sequences of member actions.

use chrono::{Duration, NaiveDate};
use domain_intake::{ClaimType, DocumentType, NewDocument, WizardStateMachine};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating claim types
pub fn claim_type_strategy() -> impl Strategy<Value = ClaimType> {
    prop_oneof![
        Just(ClaimType::Outdoor),
        Just(ClaimType::Indoor),
        Just(ClaimType::Dental),
        Just(ClaimType::Spectacles),
    ]
}

pub fn document_type_strategy() -> impl Strategy<Value = DocumentType> {
    prop_oneof![
        Just(DocumentType::Bill),
        Just(DocumentType::Prescription),
        Just(DocumentType::DiagnosisCard),
        Just(DocumentType::Other),
    ]
}

/// Strategy for text with at least one non-whitespace character
pub fn non_blank_text_strategy() -> impl Strategy<Value = String> {
    "[ ]{0,2}[A-Za-z.][A-Za-z. ]{0,30}"
}

/// Strategy for empty or whitespace-only text
pub fn blank_text_strategy() -> impl Strategy<Value = String> {
    "[ \t\n]{0,6}"
}

/// Strategy for non-negative amounts with up to two decimal places
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for treatment dates within 2024
pub fn document_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..366i64).prop_map(|days| {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(days)
    })
}

pub fn new_document_strategy() -> impl Strategy<Value = NewDocument> {
    (
        document_type_strategy(),
        document_date_strategy(),
        amount_strategy(),
        0u32..10_000u32,
        prop_oneof![Just("image/jpeg"), Just("image/png"), Just("application/pdf")],
    )
        .prop_map(|(document_type, document_date, amount, n, mime)| NewDocument {
            document_type,
            document_date,
            amount,
            source_uri: format!("content://media/external/images/media/{}", n),
            mime_type: mime.to_string(),
        })
}

/// Strategy for a non-empty batch of documents
pub fn documents_strategy(max: usize) -> impl Strategy<Value = Vec<NewDocument>> {
    proptest::collection::vec(new_document_strategy(), 1..=max.max(1))
}

/// A single member action on the wizard
#[derive(Debug, Clone)]
pub enum WizardAction {
    SelectClaimType(ClaimType),
    Advance(String, String),
    Back,
    Cancel,
    AddDocument(NewDocument),
    RemoveFirstDocument,
}

impl WizardAction {
    /// Applies the action, ignoring rejections
    pub fn apply(&self, wizard: &mut WizardStateMachine) {
        match self {
            WizardAction::SelectClaimType(claim_type) => {
                let _ = wizard.select_claim_type(*claim_type);
            }
            WizardAction::Advance(name, illness) => {
                let _ = wizard.advance(name, illness);
            }
            WizardAction::Back => {
                let _ = wizard.back();
            }
            WizardAction::Cancel => {
                wizard.cancel();
            }
            WizardAction::AddDocument(doc) => {
                let _ = wizard.add_document(doc.clone());
            }
            WizardAction::RemoveFirstDocument => {
                if let Some(first) = wizard.documents().first() {
                    let _ = wizard.remove_document(first.id);
                }
            }
        }
    }
}

pub fn wizard_action_strategy() -> impl Strategy<Value = WizardAction> {
    prop_oneof![
        claim_type_strategy().prop_map(WizardAction::SelectClaimType),
        (
            prop_oneof![non_blank_text_strategy(), blank_text_strategy()],
            prop_oneof![non_blank_text_strategy(), blank_text_strategy()],
        )
            .prop_map(|(name, illness)| WizardAction::Advance(name, illness)),
        Just(WizardAction::Back),
        Just(WizardAction::Cancel),
        new_document_strategy().prop_map(WizardAction::AddDocument),
        Just(WizardAction::RemoveFirstDocument),
    ]
}

/// Strategy for a wizard driven through an arbitrary action sequence
pub fn wizard_strategy() -> impl Strategy<Value = WizardStateMachine> {
    proptest::collection::vec(wizard_action_strategy(), 0..20).prop_map(|actions| {
        let mut wizard = WizardStateMachine::new();
        for action in &actions {
            action.apply(&mut wizard);
        }
        wizard
    })
}
