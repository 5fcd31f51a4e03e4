//! Database models for the SMB ERP backend
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
