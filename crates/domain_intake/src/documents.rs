//! Supporting documents attached to a draft
//!
//! Bills, prescriptions and diagnosis cards are collected while the member
//! fills in the wizard. The collection only stores references to the
//! binary content supplied by the camera or file picker; it never reads it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::DocumentId;
use crate::error::DocumentError;

/// Document types accepted with a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentType {
    Bill,
    Prescription,
    DiagnosisCard,
    Other,
}

/// A document as picked by the member, before it is given an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub document_type: DocumentType,
    pub document_date: NaiveDate,
    pub amount: Decimal,
    /// Opaque reference to the binary content (content URI, file path, upload key)
    pub source_uri: String,
    pub mime_type: String,
}

/// A document attached to a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub id: DocumentId,
    pub document_type: DocumentType,
    pub document_date: NaiveDate,
    pub amount: Decimal,
    pub source_uri: String,
    pub mime_type: String,
}

impl DocumentRef {
    fn attach(id: DocumentId, doc: NewDocument) -> Self {
        Self {
            id,
            document_type: doc.document_type,
            document_date: doc.document_date,
            amount: doc.amount,
            source_uri: doc.source_uri,
            mime_type: doc.mime_type,
        }
    }
}

/// Replacement values for an attached document; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    pub document_type: Option<DocumentType>,
    pub document_date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub source_uri: Option<String>,
    pub mime_type: Option<String>,
}

impl DocumentPatch {
    /// Builds the replacement entry; the id never changes
    pub fn apply_to(&self, current: &DocumentRef) -> DocumentRef {
        DocumentRef {
            id: current.id,
            document_type: self.document_type.unwrap_or(current.document_type),
            document_date: self.document_date.unwrap_or(current.document_date),
            amount: self.amount.unwrap_or(current.amount),
            source_uri: self.source_uri.clone().unwrap_or_else(|| current.source_uri.clone()),
            mime_type: self.mime_type.clone().unwrap_or_else(|| current.mime_type.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Ordered list of attached documents with unique ids
///
/// Serializes as a plain JSON array. Deserializing rejects arrays that
/// repeat an id, so a restored draft keeps the uniqueness invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<DocumentRef>", try_from = "Vec<DocumentRef>")]
pub struct DocumentCollection {
    entries: Vec<DocumentRef>,
}

impl DocumentCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a document under a fresh id and returns that id
    pub fn add(&mut self, doc: NewDocument) -> DocumentId {
        let mut id = DocumentId::new_v7();
        while self.position(id).is_some() {
            id = DocumentId::new_v7();
        }
        debug!(document_id = %id, document_type = ?doc.document_type, "Document attached");
        self.entries.push(DocumentRef::attach(id, doc));
        id
    }

    /// Replaces the entry with the given id, keeping its position
    pub fn edit(&mut self, id: DocumentId, patch: &DocumentPatch) -> Result<DocumentRef, DocumentError> {
        let index = self.position(id).ok_or(DocumentError::NotFound(id))?;
        let updated = patch.apply_to(&self.entries[index]);
        self.entries[index] = updated.clone();
        debug!(document_id = %id, "Document replaced");
        Ok(updated)
    }

    /// Removes the entry with the given id; the rest keep their order
    pub fn remove(&mut self, id: DocumentId) -> Result<DocumentRef, DocumentError> {
        let index = self.position(id).ok_or(DocumentError::NotFound(id))?;
        debug!(document_id = %id, "Document removed");
        Ok(self.entries.remove(index))
    }

    /// Returns a copy of the current entries
    pub fn list(&self) -> Vec<DocumentRef> {
        self.entries.clone()
    }

    pub fn get(&self, id: DocumentId) -> Option<&DocumentRef> {
        self.entries.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentRef> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_amount(&self) -> Decimal {
        self.entries.iter().map(|d| d.amount).sum()
    }

    fn position(&self, id: DocumentId) -> Option<usize> {
        self.entries.iter().position(|d| d.id == id)
    }
}

impl From<DocumentCollection> for Vec<DocumentRef> {
    fn from(collection: DocumentCollection) -> Self {
        collection.entries
    }
}

impl TryFrom<Vec<DocumentRef>> for DocumentCollection {
    type Error = DocumentError;

    fn try_from(entries: Vec<DocumentRef>) -> Result<Self, Self::Error> {
        for (i, doc) in entries.iter().enumerate() {
            if entries[..i].iter().any(|earlier| earlier.id == doc.id) {
                return Err(DocumentError::DuplicateId(doc.id));
            }
        }
        Ok(Self { entries })
    }
}
