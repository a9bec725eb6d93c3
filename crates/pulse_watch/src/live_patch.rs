//! Folds live price ticks into the page currently on screen.
//!
//! Each applied tick marks its row with a [`FlashKind`] for a fixed duration,
//! measured against the price that was displayed just before the tick. A
//! newer tick for the same row replaces the flash and restarts its timer.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use pulse_service::models::tokens::{PriceUpdate, Token};
use rust_decimal::Decimal;

pub const DEFAULT_FLASH_DURATION: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Gain,
    Loss,
}

impl FlashKind {
    /// `Gain` only on a strict increase.
    pub fn classify(previous: &Decimal, next: &Decimal) -> Self {
        if next > previous {
            FlashKind::Gain
        } else {
            FlashKind::Loss
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Flash {
    kind: FlashKind,
    expires_at: Instant,
}

pub struct LivePatchMerger {
    rows: Vec<Token>,
    positions: HashMap<String, usize>,
    flashes: HashMap<String, Flash>,
    flash_duration: Duration,
}

impl LivePatchMerger {
    pub fn new(rows: Vec<Token>, flash_duration: Duration) -> Self {
        let mut merger = Self {
            rows: Vec::new(),
            positions: HashMap::new(),
            flashes: HashMap::new(),
            flash_duration,
        };
        merger.replace_page(rows);
        merger
    }

    pub fn rows(&self) -> &[Token] {
        &self.rows
    }

    /// Swaps in a freshly fetched page. Flashes survive only for rows that
    /// are still on screen.
    pub fn replace_page(&mut self, rows: Vec<Token>) {
        self.positions = rows
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        self.rows = rows;
        let positions = &self.positions;
        self.flashes.retain(|id, _| positions.contains_key(id));
    }

    /// Patches the displayed price of `update.id`. Returns `None` when the
    /// token is not on the current page.
    pub fn apply(&mut self, update: &PriceUpdate, now: Instant) -> Option<FlashKind> {
        let &i = self.positions.get(&update.id)?;
        let row = &mut self.rows[i];
        let kind = FlashKind::classify(&row.price, &update.price);
        row.price = update.price;

        self.flashes.insert(
            update.id.clone(),
            Flash {
                kind,
                expires_at: now + self.flash_duration,
            },
        );
        Some(kind)
    }

    pub fn flash(&self, id: &str, now: Instant) -> Option<FlashKind> {
        self.flashes
            .get(id)
            .filter(|f| f.expires_at > now)
            .map(|f| f.kind)
    }

    /// Drops every flash whose deadline has passed. Returns how many went.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.flashes.len();
        self.flashes.retain(|_, f| f.expires_at > now);
        before - self.flashes.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.flashes.values().map(|f| f.expires_at).min()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;
    use pulse_service::models::tokens::TokenStatus;

    use super::*;

    fn row(id: &str, price: i64) -> Token {
        Token {
            id: id.to_string(),
            rank: 1,
            name: id.to_string(),
            symbol: id.to_uppercase(),
            icon: String::new(),
            price: Decimal::from(price),
            change_24h: Decimal::ZERO,
            change_7d: Decimal::ZERO,
            volume_24h: Decimal::ZERO,
            market_cap: Decimal::ZERO,
            tags: vec!["defi".to_string()],
            status: TokenStatus::New,
            description: None,
            website: None,
            twitter: None,
            updated_at: Utc::now(),
        }
    }

    fn update(id: &str, price: &str) -> PriceUpdate {
        PriceUpdate {
            id: id.to_string(),
            price: Decimal::from_str(price).unwrap(),
            timestamp: 0,
        }
    }

    fn merger() -> LivePatchMerger {
        LivePatchMerger::new(vec![row("x", 100), row("y", 7)], DEFAULT_FLASH_DURATION)
    }

    #[test]
    fn test_gain_then_loss_against_last_displayed_price() {
        let mut merger = merger();
        let start = Instant::now();

        assert_eq!(merger.apply(&update("x", "105"), start), Some(FlashKind::Gain));
        assert_eq!(merger.rows()[0].price, Decimal::from(105));

        let later = start + Duration::from_millis(700);
        assert_eq!(merger.expire(later), 1);
        assert_eq!(merger.flash("x", later), None);

        assert_eq!(merger.apply(&update("x", "102"), later), Some(FlashKind::Loss));
        assert_eq!(merger.rows()[0].price, Decimal::from(102));
        assert_eq!(merger.flash("x", later), Some(FlashKind::Loss));
    }

    #[test]
    fn test_unchanged_price_is_a_loss() {
        let mut merger = merger();
        assert_eq!(
            merger.apply(&update("y", "7"), Instant::now()),
            Some(FlashKind::Loss)
        );
    }

    #[test]
    fn test_other_fields_untouched() {
        let mut merger = merger();
        let before = merger.rows()[1].clone();

        merger.apply(&update("y", "8.5"), Instant::now());

        let after = &merger.rows()[1];
        assert_eq!(after.price, Decimal::from_str("8.5").unwrap());
        assert_eq!(
            Token {
                price: before.price,
                ..after.clone()
            },
            before
        );
        assert_eq!(merger.rows()[0].price, Decimal::from(100));
    }

    #[test]
    fn test_updates_for_other_pages_are_ignored() {
        let mut merger = merger();
        assert_eq!(merger.apply(&update("z", "1"), Instant::now()), None);
        assert_eq!(merger.next_deadline(), None);
    }

    #[test]
    fn test_flash_expires_after_duration() {
        let mut merger = merger();
        let start = Instant::now();
        merger.apply(&update("x", "101"), start);

        let almost = start + Duration::from_millis(599);
        assert_eq!(merger.flash("x", almost), Some(FlashKind::Gain));
        assert_eq!(merger.expire(almost), 0);

        let done = start + DEFAULT_FLASH_DURATION;
        assert_eq!(merger.flash("x", done), None);
        assert_eq!(merger.expire(done), 1);
    }

    #[test]
    fn test_newer_update_supersedes_flash() {
        let mut merger = merger();
        let start = Instant::now();
        merger.apply(&update("x", "110"), start);

        let second = start + Duration::from_millis(400);
        merger.apply(&update("x", "90"), second);

        let check = start + Duration::from_millis(800);
        assert_eq!(merger.flash("x", check), Some(FlashKind::Loss));
        assert_eq!(
            merger.next_deadline(),
            Some(second + DEFAULT_FLASH_DURATION)
        );
    }

    #[test]
    fn test_replace_page_drops_stale_flashes() {
        let mut merger = merger();
        let now = Instant::now();
        merger.apply(&update("x", "110"), now);
        merger.apply(&update("y", "1"), now);

        merger.replace_page(vec![row("y", 1), row("w", 3)]);

        assert_eq!(merger.flash("x", now), None);
        assert_eq!(merger.flash("y", now), Some(FlashKind::Loss));
        assert_eq!(merger.apply(&update("w", "4"), now), Some(FlashKind::Gain));
    }
}
