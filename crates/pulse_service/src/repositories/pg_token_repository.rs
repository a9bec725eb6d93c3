use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use super::TokenRepository;
use crate::{
    models::{
        token_query::TokenListQuery,
        tokens::{Token, TokenStatus},
    },
    utils::errors::app_error::AppError,
};

const TOKEN_COLUMNS: &str = "id, rank, name, symbol, icon, price, change24h, change7d, \
     volume24h, market_cap, tags, status, description, website, twitter, updated_at";

const CREATE_TOKENS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS tokens (
        id          VARCHAR PRIMARY KEY,
        rank        INTEGER NOT NULL,
        name        TEXT NOT NULL,
        symbol      TEXT NOT NULL,
        icon        TEXT NOT NULL,
        price       NUMERIC(20, 8) NOT NULL CHECK (price >= 0),
        change24h   NUMERIC(10, 6) NOT NULL,
        change7d    NUMERIC(10, 6) NOT NULL,
        volume24h   NUMERIC(20, 2) NOT NULL,
        market_cap  NUMERIC(20, 2) NOT NULL,
        tags        TEXT[] NOT NULL DEFAULT ARRAY[]::TEXT[],
        status      TEXT NOT NULL CHECK (status IN ('new', 'final', 'migrated')),
        description TEXT,
        website     TEXT,
        twitter     TEXT,
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

#[derive(Debug, FromRow)]
struct TokenRow {
    id: String,
    rank: i32,
    name: String,
    symbol: String,
    icon: String,
    price: Decimal,
    change24h: Decimal,
    change7d: Decimal,
    volume24h: Decimal,
    market_cap: Decimal,
    tags: Vec<String>,
    status: String,
    description: Option<String>,
    website: Option<String>,
    twitter: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TokenRow> for Token {
    type Error = AppError;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        let rank = u32::try_from(row.rank).map_err(|_| {
            AppError::InternalServerError(format!("token {} has rank {}", row.id, row.rank))
        })?;
        let status = TokenStatus::try_from(row.status.as_str()).map_err(|_| {
            AppError::InternalServerError(format!("token {} has status {}", row.id, row.status))
        })?;

        Ok(Token {
            id: row.id,
            rank,
            name: row.name,
            symbol: row.symbol,
            icon: row.icon,
            price: row.price,
            change_24h: row.change24h,
            change_7d: row.change7d,
            volume_24h: row.volume24h,
            market_cap: row.market_cap,
            tags: row.tags,
            status,
            description: row.description,
            website: row.website,
            twitter: row.twitter,
            updated_at: row.updated_at,
        })
    }
}

/// Escapes `LIKE` metacharacters so the search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &TokenListQuery) {
    builder.push(" WHERE TRUE");
    if let Some(tab) = query.tab {
        builder.push(" AND status = ").push_bind(tab.as_str());
    }
    if let Some(term) = query.search_term() {
        let pattern = format!("%{}%", escape_like(&term));
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR symbol ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn order_by_clause(query: &TokenListQuery) -> String {
    let mut terms: Vec<String> = query
        .sort
        .keys()
        .iter()
        .map(|k| format!("{} {}", k.column.column_name(), k.direction.as_sql()))
        .collect();
    terms.push("rank ASC".to_string());
    terms.push("id ASC".to_string());
    format!(" ORDER BY {}", terms.join(", "))
}

fn rank_param(token: &Token) -> Result<i32, AppError> {
    i32::try_from(token.rank)
        .map_err(|_| AppError::BadRequest(format!("rank {} is out of range", token.rank)))
}

pub struct PgTokenRepository {
    db: Arc<PgPool>,
}

impl PgTokenRepository {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }

    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(CREATE_TOKENS_TABLE)
            .execute(self.db.as_ref())
            .await?;
        info!("Tokens table ready");
        Ok(())
    }

    fn insert_builder(token: &Token) -> Result<QueryBuilder<'static, Postgres>, AppError> {
        let mut builder = QueryBuilder::new(format!("INSERT INTO tokens ({}) VALUES (", TOKEN_COLUMNS));
        let mut values = builder.separated(", ");
        values
            .push_bind(token.id.clone())
            .push_bind(rank_param(token)?)
            .push_bind(token.name.clone())
            .push_bind(token.symbol.clone())
            .push_bind(token.icon.clone())
            .push_bind(token.price)
            .push_bind(token.change_24h)
            .push_bind(token.change_7d)
            .push_bind(token.volume_24h)
            .push_bind(token.market_cap)
            .push_bind(token.tags.clone())
            .push_bind(token.status.as_str())
            .push_bind(token.description.clone())
            .push_bind(token.website.clone())
            .push_bind(token.twitter.clone())
            .push_bind(token.updated_at);
        builder.push(") ON CONFLICT (id) DO NOTHING");
        Ok(builder)
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn list_tokens(&self, query: &TokenListQuery) -> Result<(Vec<Token>, u64), AppError> {
        let mut tx = self.db.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM tokens");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&mut *tx).await?;

        let rows = match i64::try_from(query.pagination.offset()) {
            Ok(offset) if offset < total => {
                let mut select = QueryBuilder::new(format!("SELECT {} FROM tokens", TOKEN_COLUMNS));
                push_filters(&mut select, query);
                select.push(order_by_clause(query));
                select
                    .push(" LIMIT ")
                    .push_bind(i64::from(query.pagination.page_size()))
                    .push(" OFFSET ")
                    .push_bind(offset);

                debug!(sql = select.sql(), "Listing tokens");
                select
                    .build_query_as::<TokenRow>()
                    .fetch_all(&mut *tx)
                    .await?
            }
            _ => Vec::new(),
        };
        tx.commit().await?;

        let tokens = rows
            .into_iter()
            .map(Token::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((tokens, total.max(0) as u64))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Token>, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(&format!(
            "SELECT {} FROM tokens WHERE id = $1",
            TOKEN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.db.as_ref())
        .await?;

        row.map(Token::try_from).transpose()
    }

    async fn all_ids(&self) -> Result<Vec<String>, AppError> {
        let ids = sqlx::query_scalar::<_, String>("SELECT id FROM tokens")
            .fetch_all(self.db.as_ref())
            .await?;
        Ok(ids)
    }

    async fn update_price(&self, id: &str, price: Decimal) -> Result<Option<Token>, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(&format!(
            "UPDATE tokens SET price = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            TOKEN_COLUMNS
        ))
        .bind(price)
        .bind(id)
        .fetch_optional(self.db.as_ref())
        .await?;

        row.map(Token::try_from).transpose()
    }

    async fn create_token(&self, token: Token) -> Result<Token, AppError> {
        let mut builder = Self::insert_builder(&token)?;
        builder.push(format!(" RETURNING {}", TOKEN_COLUMNS));

        let row = builder
            .build_query_as::<TokenRow>()
            .fetch_optional(self.db.as_ref())
            .await?;

        match row {
            Some(row) => Token::try_from(row),
            None => Err(AppError::Conflict(format!(
                "token {} already exists",
                token.id
            ))),
        }
    }

    async fn seed(&self, tokens: Vec<Token>) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM tokens").execute(&mut *tx).await?;

        for token in &tokens {
            Self::insert_builder(token)?
                .build()
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!(count = tokens.len(), "Seeded tokens table");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sorts::SortConfig, token_query::Pagination};

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("btc"), "btc");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_order_by_ends_with_fallback() {
        let query = TokenListQuery {
            sort: SortConfig::parse("marketCap:desc,change24h").unwrap(),
            ..Default::default()
        };
        assert_eq!(
            order_by_clause(&query),
            " ORDER BY market_cap DESC, change24h ASC, rank ASC, id ASC"
        );
        assert_eq!(
            order_by_clause(&TokenListQuery::default()),
            " ORDER BY rank ASC, id ASC"
        );
    }

    #[test]
    fn test_filters_bind_tab_and_search() {
        let query = TokenListQuery {
            tab: Some(TokenStatus::Final),
            search: Some("sol".to_string()),
            pagination: Pagination::new(1, 10).unwrap(),
            ..Default::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tokens");
        push_filters(&mut builder, &query);

        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM tokens WHERE TRUE AND status = $1 AND (name ILIKE $2 OR symbol ILIKE $3)"
        );
    }
}
