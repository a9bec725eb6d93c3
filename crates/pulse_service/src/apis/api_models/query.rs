use serde::Deserialize;
use utoipa::IntoParams;

use crate::models::tokens::TokenStatus;

#[derive(Debug, Deserialize, IntoParams, Default, Clone)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TokensQuery {
    /// Tab to list (`new`, `final`, `migrated`)
    #[param(default = "new")]
    pub tab: Option<TokenStatus>,
    /// Page number (starts at 1)
    #[param(default = 1)]
    pub page: Option<u32>,
    /// Number of items per page (1 to 500)
    #[param(default = 50)]
    pub page_size: Option<u32>,
    /// Case-insensitive substring of the name or symbol
    pub search: Option<String>,
    /// Comma-separated `column:direction` pairs, e.g. `price:desc,rank:asc`
    pub sort: Option<String>,
}
