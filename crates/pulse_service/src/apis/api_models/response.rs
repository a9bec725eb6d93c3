use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{token_query::PageResult, tokens::Token};

/// One page of the token list
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokensPageResponse {
    /// Tokens on the requested page
    pub data: Vec<Token>,
    /// Current page number
    pub page: u32,
    /// Items per page
    pub page_size: u32,
    /// Number of tokens matching the filters across all pages
    pub total: u64,
}

impl From<PageResult<Token>> for TokensPageResponse {
    fn from(result: PageResult<Token>) -> Self {
        Self {
            data: result.items,
            page: result.page,
            page_size: result.page_size,
            total: result.total,
        }
    }
}
