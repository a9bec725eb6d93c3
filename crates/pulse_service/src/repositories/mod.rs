use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::{
    models::{token_query::TokenListQuery, tokens::Token},
    utils::errors::app_error::AppError,
};

pub mod memory_repository;
pub mod pg_token_repository;
pub mod pipeline;

/// Storage seam for token rows. The price feed is the only writer in normal
/// operation; every read returns a consistent snapshot.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// One page of tokens after filter, search and sort, plus the
    /// pre-pagination count.
    async fn list_tokens(&self, query: &TokenListQuery) -> Result<(Vec<Token>, u64), AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Token>, AppError>;

    async fn all_ids(&self) -> Result<Vec<String>, AppError>;

    /// Sets the price and bumps `updated_at`. `None` when the id is unknown.
    async fn update_price(&self, id: &str, price: Decimal) -> Result<Option<Token>, AppError>;

    /// Fails with [`AppError::Conflict`] if the id is taken.
    async fn create_token(&self, token: Token) -> Result<Token, AppError>;

    /// Replaces every stored row.
    async fn seed(&self, tokens: Vec<Token>) -> Result<(), AppError>;
}
