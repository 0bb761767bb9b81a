//! Response envelopes returned by the Policy Hub API.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ErrorObject};

/// Request metadata attached to every response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(default)]
    pub trace_id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub request_id: String,
}

/// Pagination block, supplied by the server and trusted as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    /// Whether a page after the current one exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether a page before the current one exists.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// One-based inclusive range of items shown on this page, `None` when empty.
    #[must_use]
    pub fn item_range(&self) -> Option<(u64, u64)> {
        if self.total_items == 0 || self.page == 0 {
            return None;
        }
        let size = u64::from(self.page_size);
        let start = (u64::from(self.page) - 1) * size + 1;
        if start > self.total_items {
            return None;
        }
        Some((start, (start + size - 1).min(self.total_items)))
    }
}

/// Metadata for list endpoints: request metadata plus pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedMeta {
    #[serde(flatten)]
    pub request: ResponseMeta,
    pub pagination: PaginationMeta,
}

impl PaginatedMeta {
    /// Wraps a pagination block with empty request metadata.
    #[must_use]
    pub fn new(pagination: PaginationMeta) -> Self {
        Self {
            request: ResponseMeta::default(),
            pagination,
        }
    }
}

/// Uniform `{success, data, error?, meta}` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T, M = ResponseMeta> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
    pub meta: M,
}

/// Envelope for single-entity calls.
pub type BaseResponse<T> = Envelope<T, ResponseMeta>;

/// Envelope for list calls, with pagination inside `meta`.
pub type PaginatedResponse<T> = Envelope<Vec<T>, PaginatedMeta>;

impl<T, M> Envelope<T, M> {
    /// Successful envelope carrying `data`.
    pub fn ok(data: T, meta: M) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta,
        }
    }

    /// Extracts the payload, turning an unsuccessful envelope into an error.
    pub fn into_data(self) -> Result<T, ApiError> {
        match (self.success, self.data, self.error) {
            (true, Some(data), _) => Ok(data),
            (_, _, Some(body)) => Err(ApiError::from_body(200, body)),
            _ => Err(ApiError::unknown()),
        }
    }
}

impl<T> PaginatedResponse<T> {
    /// Pagination block of a list response.
    #[must_use]
    pub fn pagination(&self) -> PaginationMeta {
        self.meta.pagination
    }

    /// Items of a list response, empty when the server sent none.
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.data.as_deref().unwrap_or_default()
    }

    /// Checks the envelope and keeps the items with their pagination.
    pub fn into_page(self) -> Result<Page<T>, ApiError> {
        let pagination = self.meta.pagination;
        match (self.success, self.data, self.error) {
            (true, data, _) => Ok(Page {
                items: data.unwrap_or_default(),
                pagination,
            }),
            (false, _, Some(body)) => Err(ApiError::from_body(200, body)),
            (false, _, None) => Err(ApiError::unknown()),
        }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Page<T> {
    /// Total number of items across all pages.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.pagination.total_items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_range() {
        let meta = PaginationMeta {
            page: 2,
            page_size: 20,
            total_items: 35,
            total_pages: 2,
        };
        assert_eq!(meta.item_range(), Some((21, 35)));
        assert!(meta.has_previous());
        assert!(!meta.has_next());
    }

    #[test]
    fn test_empty_range() {
        let meta = PaginationMeta {
            page: 1,
            page_size: 20,
            total_items: 0,
            total_pages: 0,
        };
        assert_eq!(meta.item_range(), None);
    }

    #[test]
    fn test_into_data_prefers_error_body() {
        let envelope: BaseResponse<String> = Envelope {
            success: false,
            data: None,
            error: Some(ErrorObject {
                code: "VALIDATION_ERROR".to_string(),
                message: "bad".to_string(),
                details: None,
            }),
            meta: ResponseMeta::default(),
        };
        let err = envelope.into_data().unwrap_err();
        assert_eq!(err.code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_into_page_accepts_missing_items() {
        let envelope: PaginatedResponse<String> = Envelope {
            success: true,
            data: None,
            error: None,
            meta: PaginatedMeta::new(PaginationMeta::default()),
        };
        let page = envelope.into_page().expect("page");
        assert!(page.items.is_empty());
        assert_eq!(page.total_items(), 0);
    }
}
