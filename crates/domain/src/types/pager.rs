//! Pagination cursor
//!
//! A [`Pager`] is passed into list and search operations and mutated in
//! place. `count` and `last_key` are results: they are only meaningful after
//! a results-bearing call has completed.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE, DEFAULT_PAGE_LIMIT};

/// Pagination and cursor state for list/search calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pager {
    /// Page number, starting at 1
    pub page: u64,
    /// Page size
    pub limit: u32,
    /// Field to sort by
    pub sortby: Option<String>,
    /// Sort descending (default) or ascending
    pub desc: bool,
    /// Restrict returned objects to these fields
    pub select: Option<Vec<String>>,
    /// Continuation key returned by the server for deep pagination
    pub last_key: Option<String>,
    /// Total number of hits reported by the server
    pub count: u64,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_LIMIT,
            sortby: None,
            desc: true,
            select: None,
            last_key: None,
            count: 0,
        }
    }
}

impl Pager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pager for a specific page and page size; page 0 is treated as 1
    pub fn with_page(page: u64, limit: u32) -> Self {
        Self { page: page.max(1), limit, ..Self::default() }
    }

    #[must_use]
    pub fn sorted_by(mut self, field: impl Into<String>, desc: bool) -> Self {
        self.sortby = Some(field.into());
        self.desc = desc;
        self
    }

    #[must_use]
    pub fn selecting<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Move to the next page, keeping the continuation key
    pub fn next_page(&mut self) {
        self.page = self.page.max(1).saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let pager = Pager::new();
        assert_eq!(pager.page, 1);
        assert_eq!(pager.limit, 30);
        assert!(pager.desc);
        assert_eq!(pager.count, 0);
        assert!(pager.last_key.is_none());
    }

    #[test]
    fn test_with_page_clamps_to_one() {
        assert_eq!(Pager::with_page(0, 10).page, 1);

        let mut pager = Pager::with_page(2, 10).sorted_by("name", false).selecting(["id"]);
        pager.next_page();
        assert_eq!(pager.page, 3);
        assert_eq!(pager.sortby.as_deref(), Some("name"));
        assert!(!pager.desc);
        assert_eq!(pager.select, Some(vec!["id".to_string()]));
    }
}
