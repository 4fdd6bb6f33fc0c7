//! Request and response bodies

pub mod wizard;
pub mod drafts;
