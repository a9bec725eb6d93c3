use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{models::tokens::Token, utils::errors::app_error::AppError};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    Rank,
    Price,
    Change24h,
    Change7d,
    Volume24h,
    MarketCap,
}

impl SortColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::Rank => "rank",
            SortColumn::Price => "price",
            SortColumn::Change24h => "change24h",
            SortColumn::Change7d => "change7d",
            SortColumn::Volume24h => "volume24h",
            SortColumn::MarketCap => "marketCap",
        }
    }

    /// Column name in the `tokens` table.
    pub fn column_name(&self) -> &'static str {
        match self {
            SortColumn::Rank => "rank",
            SortColumn::Price => "price",
            SortColumn::Change24h => "change24h",
            SortColumn::Change7d => "change7d",
            SortColumn::Volume24h => "volume24h",
            SortColumn::MarketCap => "market_cap",
        }
    }

    pub fn compare(&self, a: &Token, b: &Token) -> Ordering {
        match self {
            SortColumn::Rank => a.rank.cmp(&b.rank),
            SortColumn::Price => a.price.cmp(&b.price),
            SortColumn::Change24h => a.change_24h.cmp(&b.change_24h),
            SortColumn::Change7d => a.change_7d.cmp(&b.change_7d),
            SortColumn::Volume24h => a.volume_24h.cmp(&b.volume_24h),
            SortColumn::MarketCap => a.market_cap.cmp(&b.market_cap),
        }
    }
}

impl FromStr for SortColumn {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rank" => Ok(SortColumn::Rank),
            "price" => Ok(SortColumn::Price),
            "change24h" => Ok(SortColumn::Change24h),
            "change7d" => Ok(SortColumn::Change7d),
            "volume24h" => Ok(SortColumn::Volume24h),
            "marketCap" => Ok(SortColumn::MarketCap),
            other => Err(AppError::BadRequest(format!("unknown sort column: {}", other))),
        }
    }
}

impl Display for SortColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(AppError::BadRequest(format!(
                "unknown sort direction: {}",
                other
            ))),
        }
    }
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
pub struct SortKey {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}

/// Ordered stack of sort keys. The first key dominates, later keys break
/// ties. Rows equal on every key fall back to `rank` then `id`, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortConfig {
    keys: Vec<SortKey>,
}

impl SortConfig {
    pub fn new(keys: Vec<SortKey>) -> Self {
        let mut config = Self::default();
        for key in keys {
            if config.position(key.column).is_none() {
                config.keys.push(key);
            }
        }
        config
    }

    /// Parses the `sort` query parameter: `column:direction` pairs joined by
    /// commas. A missing direction means `asc`, empty segments are skipped and
    /// a repeated column keeps its first occurrence.
    pub fn parse(param: &str) -> Result<Self, AppError> {
        let mut keys = Vec::new();
        for pair in param.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (column, direction) = match pair.split_once(':') {
                Some((column, direction)) => (column.trim(), direction.trim()),
                None => (pair, ""),
            };
            keys.push(SortKey::new(column.parse()?, direction.parse()?));
        }
        Ok(Self::new(keys))
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn position(&self, column: SortColumn) -> Option<usize> {
        self.keys.iter().position(|k| k.column == column)
    }

    fn next_direction(&self, column: SortColumn) -> SortDirection {
        self.position(column)
            .map(|i| self.keys[i].direction.toggled())
            .unwrap_or_default()
    }

    /// Plain header click: replaces every key with `column`, flipping its
    /// direction when it was already sorted on.
    pub fn toggle(&mut self, column: SortColumn) {
        let direction = self.next_direction(column);
        self.keys = vec![SortKey::new(column, direction)];
    }

    /// Extended (shift) click: flips `column` in place when present,
    /// otherwise appends it ascending. Other keys are kept.
    pub fn extend(&mut self, column: SortColumn) {
        let direction = self.next_direction(column);
        match self.position(column) {
            Some(i) => self.keys[i].direction = direction,
            None => self.keys.push(SortKey::new(column, direction)),
        }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn compare(&self, a: &Token, b: &Token) -> Ordering {
        self.keys
            .iter()
            .map(|key| key.direction.apply(key.column.compare(a, b)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.rank.cmp(&b.rank).then_with(|| a.id.cmp(&b.id)))
    }
}

impl Display for SortConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let pairs: Vec<String> = self
            .keys
            .iter()
            .map(|k| format!("{}:{}", k.column, k.direction))
            .collect();
        write!(f, "{}", pairs.join(","))
    }
}
