use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    models::tokens::{Token, TokenStatus},
    utils::{errors::app_error::AppError, math::PRICE_SCALE, serde_utils::deserialize_decimal},
};

/// Numeric fields accept a JSON number or a decimal string.
#[derive(Debug, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenRequest {
    pub id: String,
    pub rank: u32,
    pub name: String,
    pub symbol: String,
    pub icon: String,
    #[serde(deserialize_with = "deserialize_decimal")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    #[schema(value_type = f64)]
    pub change_24h: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    #[schema(value_type = f64)]
    pub change_7d: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    #[schema(value_type = f64)]
    pub volume_24h: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    #[schema(value_type = f64)]
    pub market_cap: Decimal,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: TokenStatus,
    pub description: Option<String>,
    pub website: Option<String>,
    pub twitter: Option<String>,
}

fn required(field: &str, value: String) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

fn non_negative(field: &str, value: Decimal) -> Result<Decimal, AppError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::BadRequest(format!("{} must be >= 0", field)));
    }
    Ok(value)
}

/// Precision and scale of a `NUMERIC(p, s)` column in the `tokens` table.
#[derive(Debug, Clone, Copy)]
struct NumericColumn {
    precision: u32,
    scale: u32,
}

const PRICE_COLUMN: NumericColumn = NumericColumn {
    precision: 20,
    scale: PRICE_SCALE,
};
const CHANGE_COLUMN: NumericColumn = NumericColumn {
    precision: 10,
    scale: 6,
};
const AMOUNT_COLUMN: NumericColumn = NumericColumn {
    precision: 20,
    scale: 2,
};

impl NumericColumn {
    /// Rounds to the column scale and rejects values with more integer
    /// digits than the column holds.
    fn fit(&self, field: &str, value: Decimal) -> Result<Decimal, AppError> {
        let rounded = value.round_dp(self.scale);
        let limit = Decimal::from_i128_with_scale(10i128.pow(self.precision - self.scale), 0);
        if rounded.abs() >= limit {
            return Err(AppError::BadRequest(format!("{} must be below {}", field, limit)));
        }
        Ok(rounded)
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<CreateTokenRequest> for Token {
    type Error = AppError;

    fn try_from(request: CreateTokenRequest) -> Result<Self, Self::Error> {
        if request.rank == 0 || request.rank > i32::MAX as u32 {
            return Err(AppError::BadRequest(format!(
                "rank must be between 1 and {}",
                i32::MAX
            )));
        }
        let website = optional(request.website);
        if let Some(url) = &website {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(AppError::BadRequest(format!(
                    "website must be an http(s) URL: {}",
                    url
                )));
            }
        }

        Ok(Token {
            id: required("id", request.id)?,
            rank: request.rank,
            name: required("name", request.name)?,
            symbol: required("symbol", request.symbol)?,
            icon: required("icon", request.icon)?,
            price: PRICE_COLUMN.fit("price", non_negative("price", request.price)?)?,
            change_24h: CHANGE_COLUMN.fit("change24h", request.change_24h)?,
            change_7d: CHANGE_COLUMN.fit("change7d", request.change_7d)?,
            volume_24h: AMOUNT_COLUMN
                .fit("volume24h", non_negative("volume24h", request.volume_24h)?)?,
            market_cap: AMOUNT_COLUMN
                .fit("marketCap", non_negative("marketCap", request.market_cap)?)?,
            tags: request
                .tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            status: request.status,
            description: optional(request.description),
            website,
            twitter: optional(request.twitter),
            updated_at: Utc::now(),
        })
    }
}
