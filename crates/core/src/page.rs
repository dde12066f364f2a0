//! Offset/limit pagination.

use serde::{Deserialize, Serialize};

/// Pagination window for list queries.
///
/// `limit: None` means "everything from `offset` on". An offset past the end
/// of the result set yields an empty page, never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Number of records to skip (0-based).
    pub offset: usize,
    /// Maximum number of records to return.
    pub limit: Option<usize>,
}

impl Page {
    /// Build a page from raw signed values (as received from a query string).
    ///
    /// Negative offsets are clamped to 0; `limit <= 0` means no limit.
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: usize::try_from(offset).unwrap_or(0),
            limit: if limit > 0 {
                usize::try_from(limit).ok()
            } else {
                None
            },
        }
    }

    /// Every record, no offset.
    pub fn all() -> Self {
        Self::default()
    }

    /// Apply the window to an already ordered result set.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let iter = items.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }

    /// Offset as a SQL `OFFSET` value.
    pub fn sql_offset(&self) -> i64 {
        i64::try_from(self.offset).unwrap_or(i64::MAX)
    }

    /// Limit as a SQL `LIMIT` value (`NULL` means no limit).
    pub fn sql_limit(&self) -> Option<i64> {
        self.limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX))
    }
}
