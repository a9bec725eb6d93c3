use chrono::Utc;
use rand::Rng;
use rust_decimal::{prelude::FromPrimitive, Decimal};

use crate::{
    models::tokens::{Token, TokenStatus},
    utils::math::PRICE_SCALE,
};

const BASE_ASSETS: [(&str, &str, f64); 20] = [
    ("Bitcoin", "BTC", 67432.15),
    ("Ethereum", "ETH", 3542.87),
    ("Solana", "SOL", 142.56),
    ("Cardano", "ADA", 0.58),
    ("Polkadot", "DOT", 7.32),
    ("Avalanche", "AVAX", 38.45),
    ("Chainlink", "LINK", 14.89),
    ("Polygon", "MATIC", 0.87),
    ("Uniswap", "UNI", 6.54),
    ("Cosmos", "ATOM", 10.23),
    ("Litecoin", "LTC", 86.12),
    ("Algorand", "ALGO", 0.19),
    ("VeChain", "VET", 0.03),
    ("Filecoin", "FIL", 5.67),
    ("Tron", "TRX", 0.11),
    ("Stellar", "XLM", 0.12),
    ("Monero", "XMR", 165.43),
    ("EOS", "EOS", 0.78),
    ("Tezos", "XTZ", 1.12),
    ("Aave", "AAVE", 98.34),
];

const TAG_GROUPS: [&[&str]; 10] = [
    &["blue-chip", "pow"],
    &["defi", "smart-contract"],
    &["layer-1", "fast"],
    &["staking", "governance"],
    &["oracle", "defi"],
    &["layer-2", "scaling"],
    &["dex", "governance"],
    &["nft", "gaming"],
    &["meme", "community"],
    &["privacy"],
];

fn decimal(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(dp)
}

/// `[-spread/2, spread/2)`
fn jitter<R: Rng>(rng: &mut R, spread: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * spread
}

fn generate_tab<R: Rng>(count: usize, status: TokenStatus, rng: &mut R) -> Vec<Token> {
    (0..count)
        .map(|i| {
            let (name, symbol, base_price) = BASE_ASSETS[i % BASE_ASSETS.len()];
            let price = base_price * (1.0 + jitter(rng, 0.3));
            let lower = symbol.to_lowercase();

            Token {
                id: format!("{}-{}-{}", lower, status, i),
                rank: i as u32 + 1,
                name: name.to_string(),
                symbol: symbol.to_string(),
                icon: format!("https://api.dicebear.com/7.x/shapes/svg?seed={}", symbol),
                price: decimal(price, PRICE_SCALE),
                change_24h: decimal(jitter(rng, 0.2), 6),
                change_7d: decimal(jitter(rng, 0.4), 6),
                volume_24h: decimal(rng.gen::<f64>() * 10_000_000_000.0 + 1_000_000.0, 2),
                market_cap: decimal(price * (rng.gen::<f64>() * 1_000_000_000.0 + 10_000_000.0), 2),
                tags: TAG_GROUPS[i % TAG_GROUPS.len()]
                    .iter()
                    .map(|t| t.to_string())
                    .collect(),
                status,
                description: Some(format!(
                    "{} is a decentralized cryptocurrency that aims to revolutionize the blockchain industry.",
                    name
                )),
                website: Some(format!("https://{}.org", lower)),
                twitter: Some(format!("@{}", lower)),
                updated_at: Utc::now(),
            }
        })
        .collect()
}

/// `per_tab` mock tokens for each of the three tabs, ranked from 1 per tab.
pub fn generate_tokens<R: Rng>(per_tab: usize, rng: &mut R) -> Vec<Token> {
    TokenStatus::ALL
        .iter()
        .flat_map(|status| generate_tab(per_tab, *status, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn test_generate_tokens_shape() {
        let tokens = generate_tokens(25, &mut StdRng::seed_from_u64(11));

        assert_eq!(tokens.len(), 75);
        let ids: HashSet<_> = tokens.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), 75);

        for status in TokenStatus::ALL {
            let ranks: Vec<u32> = tokens
                .iter()
                .filter(|t| t.status == status)
                .map(|t| t.rank)
                .collect();
            assert_eq!(ranks, (1..=25).collect::<Vec<u32>>());
        }

        assert_eq!(tokens[0].id, "btc-new-0");
        assert_eq!(tokens[21].symbol, "ETH");
        assert!(tokens.iter().all(|t| t.price > Decimal::ZERO));
    }
}
