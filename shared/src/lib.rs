//! Shared types and models for the SMB ERP platform
//!
//! This crate contains domain records, stock-ledger math, and validation
//! helpers shared between the backend and other components of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
