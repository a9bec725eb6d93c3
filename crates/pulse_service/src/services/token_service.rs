use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info};

use crate::{
    apis::api_models::{query::TokensQuery, request::CreateTokenRequest},
    models::{
        sorts::SortConfig,
        token_query::{PageResult, Pagination, TokenListQuery, DEFAULT_PAGE, DEFAULT_PAGE_SIZE},
        tokens::{PricePoint, Token, TokenDetail},
    },
    repositories::TokenRepository,
    utils::{
        errors::app_error::AppError,
        math::apply_percent_change,
        time::{now_millis, HOUR_MILLIS},
    },
};

pub const PRICE_HISTORY_POINTS: i64 = 24;
const PRICE_HISTORY_SPREAD: f64 = 0.05;

/// Hourly points ending at `now_ms`, each the current price moved by up to
/// ±5%. Placeholder data, not a real history.
pub fn synthetic_price_history<R: Rng>(token: &Token, now_ms: i64, rng: &mut R) -> Vec<PricePoint> {
    (0..PRICE_HISTORY_POINTS)
        .map(|i| PricePoint {
            timestamp: now_ms - (PRICE_HISTORY_POINTS - 1 - i) * HOUR_MILLIS,
            price: apply_percent_change(
                token.price,
                rng.gen_range(-PRICE_HISTORY_SPREAD..=PRICE_HISTORY_SPREAD),
            ),
        })
        .collect()
}

pub struct TokenService {
    token_repository: Arc<dyn TokenRepository>,
}

impl TokenService {
    pub fn new(token_repository: Arc<dyn TokenRepository>) -> Self {
        Self { token_repository }
    }

    /// Turns raw request parameters into a validated [`TokenListQuery`].
    /// A missing tab means `new`, since ranks only make sense within one tab.
    pub fn build_query(params: TokensQuery) -> Result<TokenListQuery, AppError> {
        let pagination = Pagination::new(
            params.page.unwrap_or(DEFAULT_PAGE),
            params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )?;
        let sort = match params.sort.as_deref() {
            Some(raw) => SortConfig::parse(raw)?,
            None => SortConfig::default(),
        };

        Ok(TokenListQuery {
            tab: Some(params.tab.unwrap_or_default()),
            search: params.search,
            sort,
            pagination,
        })
    }

    pub async fn list_tokens(&self, params: TokensQuery) -> Result<PageResult<Token>, AppError> {
        debug!("Listing tokens with query: {:?}", params);
        let query = Self::build_query(params)?;
        self.query(&query).await
    }

    pub async fn query(&self, query: &TokenListQuery) -> Result<PageResult<Token>, AppError> {
        let (items, total) = self.token_repository.list_tokens(query).await?;

        Ok(PageResult {
            items,
            page: query.pagination.page(),
            page_size: query.pagination.page_size(),
            total,
        })
    }

    pub async fn get_token(&self, id: &str) -> Result<Token, AppError> {
        self.token_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("token {}", id)))
    }

    pub async fn get_token_detail(&self, id: &str) -> Result<TokenDetail, AppError> {
        let token = self.get_token(id).await?;
        let price_history = synthetic_price_history(&token, now_millis(), &mut rand::thread_rng());

        Ok(TokenDetail {
            token,
            price_history,
        })
    }

    pub async fn create_token(&self, request: CreateTokenRequest) -> Result<Token, AppError> {
        let token = Token::try_from(request)?;
        let token = self.token_repository.create_token(token).await?;
        info!(id = %token.id, status = %token.status, "Created token");
        Ok(token)
    }
}
