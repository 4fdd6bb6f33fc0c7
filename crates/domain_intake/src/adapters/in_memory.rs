//! In-memory saved-drafts area

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::{DraftId, DomainPort, PortError};
use crate::ports::{DraftStorePort, SavedDraft};

/// Keeps saved drafts in process memory
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDraftStore {
    drafts: Arc<RwLock<HashMap<DraftId, SavedDraft>>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store
    pub async fn with_drafts(drafts: Vec<SavedDraft>) -> Self {
        let store = Self::new();
        {
            let mut map = store.drafts.write().await;
            for draft in drafts {
                map.insert(draft.id(), draft);
            }
        }
        store
    }

    pub async fn len(&self) -> usize {
        self.drafts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.drafts.read().await.is_empty()
    }
}

impl DomainPort for InMemoryDraftStore {}

#[async_trait]
impl DraftStorePort for InMemoryDraftStore {
    async fn save_draft(&self, draft: &SavedDraft) -> Result<(), PortError> {
        debug!(draft_id = %draft.id(), "Storing saved draft");
        self.drafts.write().await.insert(draft.id(), draft.clone());
        Ok(())
    }

    async fn get_draft(&self, id: DraftId) -> Result<SavedDraft, PortError> {
        self.drafts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("SavedDraft", id))
    }

    async fn list_drafts(&self) -> Result<Vec<SavedDraft>, PortError> {
        let mut drafts: Vec<_> = self.drafts.read().await.values().cloned().collect();
        drafts.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(drafts)
    }

    async fn delete_draft(&self, id: DraftId) -> Result<(), PortError> {
        self.drafts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortError::not_found("SavedDraft", id))
    }
}
