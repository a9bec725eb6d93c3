use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::errors::app_error::AppError;

/// The tab a token is listed under.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    #[default]
    New,
    #[serde(alias = "final-stretch")]
    Final,
    Migrated,
}

impl TokenStatus {
    pub const ALL: [TokenStatus; 3] = [TokenStatus::New, TokenStatus::Final, TokenStatus::Migrated];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStatus::New => "new",
            TokenStatus::Final => "final",
            TokenStatus::Migrated => "migrated",
        }
    }
}

impl Display for TokenStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for TokenStatus {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "new" => Ok(TokenStatus::New),
            "final" | "final-stretch" => Ok(TokenStatus::Final),
            "migrated" => Ok(TokenStatus::Migrated),
            other => Err(AppError::BadRequest(format!("unknown tab: {}", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Stable unique identifier
    pub id: String,
    /// Display order within the tab (starts at 1)
    pub rank: u32,
    pub name: String,
    pub symbol: String,
    /// Icon URI
    pub icon: String,
    /// Current price in USD
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// 24h change as a fraction (0.035 = +3.5%)
    #[serde(with = "rust_decimal::serde::float")]
    pub change_24h: Decimal,
    /// 7d change as a fraction
    #[serde(with = "rust_decimal::serde::float")]
    pub change_7d: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub volume_24h: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub market_cap: Decimal,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: TokenStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    /// Last time the row was mutated
    pub updated_at: DateTime<Utc>,
}

impl Token {
    /// `needle` must already be trimmed and lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.symbol.to_lowercase().contains(needle)
    }
}

/// A single synthetic price tick pushed to socket subscribers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceUpdate {
    pub id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PricePoint {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// A token plus a synthesized hourly price history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetail {
    #[serde(flatten)]
    pub token: Token,
    pub price_history: Vec<PricePoint>,
}
