//! Core Kernel - Foundational types for the claim intake system
//!
//! This crate provides the building blocks shared by the intake domain and
//! the API layer:
//! - Strongly-typed identifiers for drafts, documents and wizard sessions
//! - The kernel error type
//! - Port infrastructure for talking to external collaborators

pub mod identifiers;
pub mod error;
pub mod ports;

pub use identifiers::{DraftId, DocumentId, SessionId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, OperationMetadata,
    HealthCheckable, HealthCheckResult, AdapterHealth,
    CircuitBreakerConfig,
};
