//! Response DTOs for the HTTP API
//!
//! Defines the response envelope and the pagination wrapper.

use serde::Serialize;

use crate::error::{AppError, Result};

/// Envelope for every successful response body.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

// == Page Request ==
/// Validated pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    /// Checks `page >= 0` and `size > 0`.
    pub fn new(page: i64, size: i64) -> Result<Self> {
        if page < 0 {
            return Err(AppError::Validation(
                "Page index must not be less than zero".to_string(),
            ));
        }
        if size < 1 {
            return Err(AppError::Validation(
                "Page size must not be less than one".to_string(),
            ));
        }
        Ok(Self {
            page: page as usize,
            size: size as usize,
        })
    }
}

// == Page ==
/// One page of a filtered result set.
///
/// `first`, `last` and `empty` are derived from the same numbers that are
/// returned, so they always agree with `content`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_elements: u64,
    pub total_pages: u64,
    pub size: usize,
    pub number: usize,
    pub content: Vec<T>,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    /// Slices the full, already-filtered result set down to the requested page.
    pub fn from_items(items: Vec<T>, request: PageRequest) -> Self {
        let total_elements = items.len() as u64;
        let size = request.size as u64;
        let total_pages = total_elements.div_ceil(size);

        let content: Vec<T> = items
            .into_iter()
            .skip(request.page.saturating_mul(request.size))
            .take(request.size)
            .collect();

        Self {
            total_elements,
            total_pages,
            size: request.size,
            number: request.page,
            first: request.page == 0,
            last: request.page as u64 + 1 >= total_pages,
            empty: content.is_empty(),
            content,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
