use std::str::FromStr;

use chrono::Utc;
use pulse_service::{
    apis::api_models::response::TokensPageResponse,
    models::tokens::{Token, TokenStatus},
};
use rust_decimal::Decimal;

pub fn token(id: &str, symbol: &str, price: &str) -> Token {
    Token {
        id: id.to_string(),
        rank: 1,
        name: symbol.to_lowercase(),
        symbol: symbol.to_string(),
        icon: String::new(),
        price: Decimal::from_str(price).unwrap(),
        change_24h: Decimal::from_str("0.035").unwrap(),
        change_7d: Decimal::from_str("-0.1").unwrap(),
        volume_24h: Decimal::from(1000),
        market_cap: Decimal::from(50000),
        tags: vec![],
        status: TokenStatus::New,
        description: None,
        website: None,
        twitter: None,
        updated_at: Utc::now(),
    }
}

pub fn page(data: Vec<Token>, page: u32, page_size: u32, total: u64) -> TokensPageResponse {
    TokensPageResponse {
        data,
        page,
        page_size,
        total,
    }
}
