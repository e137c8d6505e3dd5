use crate::category::Category;
use crate::location::LocationContext;
use crate::{Error, Result};

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Parameters of one aggregation call. Built per call, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRequest {
    pub location: Option<LocationContext>,
    pub category: Option<Category>,
    pub search_term: Option<String>,
    pub trending: bool,
    pub page_size: usize,
}

impl Default for AggregationRequest {
    fn default() -> Self {
        Self::global(DEFAULT_PAGE_SIZE)
    }
}

impl AggregationRequest {
    pub fn global(page_size: usize) -> Self {
        Self {
            location: None,
            category: None,
            search_term: None,
            trending: false,
            page_size,
        }
    }

    pub fn with_location(mut self, location: Option<LocationContext>) -> Self {
        self.location = location;
        self
    }

    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn trending(mut self, trending: bool) -> Self {
        self.trending = trending;
        self
    }

    /// The trimmed search term, if one was given.
    pub fn search_term(&self) -> Option<&str> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::InvalidRequest("page size must be positive".to_string()));
        }
        Ok(())
    }
}
