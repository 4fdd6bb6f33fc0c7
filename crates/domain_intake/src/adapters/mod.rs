//! Adapters for the intake ports
//!
//! # Available Adapters
//!
//! - **RestSubmissionAdapter**: posts finished claims to the claims backend over HTTP
//! - **InMemoryDraftStore**: process-local saved-drafts area
//! - **MockSubmissionPort**: scripted backend for tests (re-exported from the ports module)
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_intake::adapters::{RestSubmissionAdapter, RestSubmissionConfig};
//! use domain_intake::ClaimSubmissionPort;
//! use std::sync::Arc;
//!
//! let adapter = RestSubmissionAdapter::new(RestSubmissionConfig {
//!     base_url: "https://claims.example.lk/api".to_string(),
//!     ..Default::default()
//! })?;
//! let port: Arc<dyn ClaimSubmissionPort> = Arc::new(adapter);
//! ```

pub mod rest_submission;
pub mod in_memory;

pub use rest_submission::{RestSubmissionAdapter, RestSubmissionConfig};
pub use in_memory::InMemoryDraftStore;
