//! Middleware for the SMB ERP backend

pub mod auth;

pub use auth::{auth_middleware, AuthUser, CurrentUser};
