//! Navigation events for server-hosted wizards
//!
//! The mobile client learns about completion from the submit response, so
//! the server side only records the boundaries.

use tracing::info;

use domain_intake::{ClaimDraft, NavigationObserver};

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigation;

impl NavigationObserver for LoggingNavigation {
    fn on_complete(&self, draft: &ClaimDraft, reference_no: &str) {
        info!(
            draft_id = %draft.id(),
            reference_no = %reference_no,
            total_amount = %draft.total_amount(),
            "Claim intimation completed"
        );
    }

    fn on_cancel(&self) {
        info!("Claim intimation cancelled");
    }
}
