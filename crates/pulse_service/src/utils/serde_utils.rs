use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(serde_json::Number),
    Text(String),
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Accepts a JSON number or a decimal string (`"0.035"`, `"1e-7"`).
/// Booleans, nulls, empty strings and non-numeric text are rejected.
pub fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n.to_string(),
        NumberOrString::Text(s) => s.trim().to_string(),
    };

    parse_decimal(&raw).ok_or_else(|| de::Error::custom(format!("invalid decimal: {:?}", raw)))
}
