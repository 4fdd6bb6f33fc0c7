//! Route handlers

pub mod wizard;
pub mod drafts;
pub mod health;
