use crate::{
    models::{sorts::SortConfig, tokens::TokenStatus},
    utils::errors::app_error::AppError,
};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 500;

/// 1-based page window over a sorted sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    page_size: u32,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Result<Self, AppError> {
        if page == 0 {
            return Err(AppError::BadRequest("page starts at 1".to_string()));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(AppError::BadRequest(format!(
                "pageSize must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.page_size as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Everything the store needs to produce one page of tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenListQuery {
    pub tab: Option<TokenStatus>,
    pub search: Option<String>,
    pub sort: SortConfig,
    pub pagination: Pagination,
}

impl TokenListQuery {
    /// Trimmed, lowercased search term, or `None` when blank.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// One page of results plus the filtered, pre-pagination count.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}
