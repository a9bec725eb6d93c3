use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{pipeline, TokenRepository};
use crate::{
    models::{token_query::TokenListQuery, tokens::Token},
    utils::errors::app_error::AppError,
};

#[derive(Default)]
struct TokenTable {
    rows: Vec<Token>,
    index: HashMap<String, usize>,
}

impl TokenTable {
    fn insert(&mut self, token: Token) -> bool {
        if self.index.contains_key(&token.id) {
            return false;
        }
        self.index.insert(token.id.clone(), self.rows.len());
        self.rows.push(token);
        true
    }
}

/// Token rows held in process memory behind a single lock.
#[derive(Default)]
pub struct InMemoryTokenRepository {
    table: RwLock<TokenTable>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn list_tokens(&self, query: &TokenListQuery) -> Result<(Vec<Token>, u64), AppError> {
        let table = self.table.read().await;
        Ok(pipeline::run(&table.rows, query))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Token>, AppError> {
        let table = self.table.read().await;
        Ok(table.index.get(id).map(|&i| table.rows[i].clone()))
    }

    async fn all_ids(&self) -> Result<Vec<String>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().map(|t| t.id.clone()).collect())
    }

    async fn update_price(&self, id: &str, price: Decimal) -> Result<Option<Token>, AppError> {
        let mut table = self.table.write().await;
        let Some(&i) = table.index.get(id) else {
            debug!(id, "Price update for unknown token");
            return Ok(None);
        };

        let token = &mut table.rows[i];
        token.price = price;
        token.updated_at = Utc::now();
        Ok(Some(token.clone()))
    }

    async fn create_token(&self, token: Token) -> Result<Token, AppError> {
        let mut table = self.table.write().await;
        if !table.insert(token.clone()) {
            return Err(AppError::Conflict(format!("token {} already exists", token.id)));
        }
        Ok(token)
    }

    async fn seed(&self, tokens: Vec<Token>) -> Result<(), AppError> {
        let mut next = TokenTable::default();
        for token in tokens {
            let id = token.id.clone();
            if !next.insert(token) {
                warn!(id, "Skipping duplicate token in seed");
            }
        }

        *self.table.write().await = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tokens::{fixtures::token, TokenStatus};

    async fn seeded() -> InMemoryTokenRepository {
        let repository = InMemoryTokenRepository::new();
        repository
            .seed(vec![
                token("a", 1, TokenStatus::New, "50"),
                token("b", 2, TokenStatus::New, "10"),
                token("c", 3, TokenStatus::Final, "30"),
            ])
            .await
            .unwrap();
        repository
    }

    #[tokio::test]
    async fn test_update_price_sets_price_and_timestamp() {
        let repository = seeded().await;
        let before = repository.find_by_id("b").await.unwrap().unwrap();

        let updated = repository
            .update_price("b", Decimal::from(12))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.price, Decimal::from(12));
        assert!(updated.updated_at > before.updated_at);
        assert_eq!(repository.find_by_id("b").await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_price_unknown_id_is_none() {
        let repository = seeded().await;
        assert_eq!(
            repository
                .update_price("missing", Decimal::ONE)
                .await
                .unwrap(),
            None
        );
        assert_eq!(repository.len().await, 3);
    }

    #[tokio::test]
    async fn test_create_token_rejects_duplicate_id() {
        let repository = seeded().await;
        let result = repository
            .create_token(token("a", 9, TokenStatus::Migrated, "1"))
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(
            repository.find_by_id("a").await.unwrap().unwrap().rank,
            1
        );
    }

    #[tokio::test]
    async fn test_seed_replaces_all_rows() {
        let repository = seeded().await;
        repository
            .seed(vec![
                token("x", 1, TokenStatus::New, "1"),
                token("x", 2, TokenStatus::New, "2"),
            ])
            .await
            .unwrap();

        assert_eq!(repository.all_ids().await.unwrap(), vec!["x".to_string()]);
        assert_eq!(repository.find_by_id("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_tokens_runs_pipeline() {
        let repository = seeded().await;
        let query = TokenListQuery {
            tab: Some(TokenStatus::New),
            sort: crate::models::sorts::SortConfig::parse("price:asc").unwrap(),
            ..Default::default()
        };

        let (page, total) = repository.list_tokens(&query).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(page[0].id, "b");
        assert_eq!(page[1].id, "a");
    }
}
