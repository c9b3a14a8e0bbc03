//! Success envelope shared by every endpoint

use crate::core::query::{PageResult, PaginationMeta};
use serde::Serialize;

/// `{success, message, data, pagination}`
///
/// `pagination` is always present in list responses and `null` everywhere
/// else, including `allData` lists.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
    pub pagination: Option<PaginationMeta>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            pagination: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn page(message: impl Into<String>, result: PageResult<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: result.data,
            pagination: result.pagination,
        }
    }
}
