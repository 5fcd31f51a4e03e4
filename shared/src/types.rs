//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

/// Result summary for bulk imports (e.g. CSV purchase import)
///
/// One error message per failed row; a failed row never aborts the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub success: u32,
    pub errors: Vec<String>,
}

impl ImportSummary {
    pub fn record_success(&mut self) {
        self.success += 1;
    }

    pub fn record_error(&mut self, row: usize, message: impl std::fmt::Display) {
        self.errors.push(format!("row {}: {}", row, message));
    }

    /// Total number of rows this summary accounts for
    pub fn total_rows(&self) -> usize {
        self.success as usize + self.errors.len()
    }
}
