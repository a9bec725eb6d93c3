use std::{sync::Arc, time::Duration};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::{
    models::tokens::PriceUpdate,
    repositories::TokenRepository,
    utils::{errors::app_error::AppError, math::apply_percent_change},
};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_VOLATILITY: f64 = 0.02;

#[derive(Debug, Clone)]
pub struct PriceFeedConfig {
    pub interval: Duration,
    /// Max fractional move per tick, applied symmetrically.
    pub volatility: f64,
    /// Leave prices untouched while nobody is listening.
    pub skip_without_subscribers: bool,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            volatility: DEFAULT_VOLATILITY,
            skip_without_subscribers: false,
        }
    }
}

/// Random walk over stored prices: each tick moves one token and broadcasts
/// the new price after the store write.
pub struct PriceFeed {
    token_repository: Arc<dyn TokenRepository>,
    sender: broadcast::Sender<PriceUpdate>,
    config: PriceFeedConfig,
}

/// Stops the feed loop when cancelled.
pub struct PriceFeedHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PriceFeedHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!("Price feed task failed: {}", e);
        }
    }
}

impl PriceFeed {
    pub fn new(
        token_repository: Arc<dyn TokenRepository>,
        sender: broadcast::Sender<PriceUpdate>,
        mut config: PriceFeedConfig,
    ) -> Self {
        config.volatility = if config.volatility.is_finite() {
            config.volatility.abs().min(1.0)
        } else {
            DEFAULT_VOLATILITY
        };
        if config.interval.is_zero() {
            config.interval = DEFAULT_INTERVAL;
        }

        Self {
            token_repository,
            sender,
            config,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PriceUpdate> {
        self.sender.subscribe()
    }

    #[instrument(skip_all, fields(tick_id = %uuid::Uuid::new_v4()))]
    pub async fn tick<R: Rng + Send>(&self, rng: &mut R) -> Result<Option<PriceUpdate>, AppError> {
        if self.config.skip_without_subscribers && self.sender.receiver_count() == 0 {
            return Ok(None);
        }

        let ids = self.token_repository.all_ids().await?;
        if ids.is_empty() {
            debug!("No tokens to update");
            return Ok(None);
        }

        let id = &ids[rng.gen_range(0..ids.len())];
        let Some(token) = self.token_repository.find_by_id(id).await? else {
            return Ok(None);
        };

        let volatility = self.config.volatility;
        let pct = rng.gen_range(-volatility..=volatility);
        let price = apply_percent_change(token.price, pct);

        let Some(updated) = self.token_repository.update_price(id, price).await? else {
            return Ok(None);
        };

        let update = PriceUpdate {
            id: updated.id,
            price: updated.price,
            timestamp: updated.updated_at.timestamp_millis(),
        };

        match self.sender.send(update.clone()) {
            Ok(receivers) => debug!(id = %update.id, price = %update.price, receivers, "Broadcast price update"),
            Err(_) => debug!(id = %update.id, "Price updated with no subscribers"),
        }

        Ok(Some(update))
    }

    pub fn start(self: Arc<Self>) -> PriceFeedHandle {
        let cancel = CancellationToken::new();
        let stop = cancel.clone();

        let task = tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut ticker = interval(self.config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await; // first tick fires immediately

            info!(
                interval_ms = self.config.interval.as_millis() as u64,
                volatility = self.config.volatility,
                "Price feed started"
            );

            loop {
                tokio::select! {
                    _ = stop.cancelled() => {
                        info!("Price feed stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = self.tick(&mut rng).await {
                            error!("Error processing price tick: {}", e);
                        }
                    }
                }
            }
        });

        PriceFeedHandle { cancel, task }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        models::tokens::{fixtures::token, TokenStatus},
        repositories::memory_repository::InMemoryTokenRepository,
    };

    async fn feed(count: u32, config: PriceFeedConfig) -> (Arc<InMemoryTokenRepository>, PriceFeed) {
        let repository = Arc::new(InMemoryTokenRepository::new());
        repository
            .seed(
                (0..count)
                    .map(|i| token(&format!("t{}", i), i + 1, TokenStatus::New, "100"))
                    .collect(),
            )
            .await
            .unwrap();
        let (sender, _) = broadcast::channel(16);
        let feed = PriceFeed::new(repository.clone(), sender, config);
        (repository, feed)
    }

    #[tokio::test]
    async fn test_tick_moves_exactly_one_token_within_bounds() {
        let (repository, feed) = feed(5, PriceFeedConfig::default()).await;
        let mut rng = StdRng::seed_from_u64(42);

        let update = feed.tick(&mut rng).await.unwrap().unwrap();

        assert!(update.price >= Decimal::from(98) && update.price <= Decimal::from(102));
        for id in repository.all_ids().await.unwrap() {
            let stored = repository.find_by_id(&id).await.unwrap().unwrap();
            if id == update.id {
                assert_eq!(stored.price, update.price);
                assert_eq!(stored.updated_at.timestamp_millis(), update.timestamp);
            } else {
                assert_eq!(stored.price, Decimal::from(100));
            }
        }
    }

    #[tokio::test]
    async fn test_tick_without_tokens_is_noop() {
        let (_, feed) = feed(0, PriceFeedConfig::default()).await;
        let mut rx = feed.subscribe();

        assert_eq!(feed.tick(&mut StdRng::seed_from_u64(1)).await.unwrap(), None);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_the_same_update() {
        let (_, feed) = feed(3, PriceFeedConfig::default()).await;
        let mut first = feed.subscribe();
        let mut second = feed.subscribe();

        let update = feed
            .tick(&mut StdRng::seed_from_u64(3))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.recv().await.unwrap(), update);
        assert_eq!(second.recv().await.unwrap(), update);
    }

    #[tokio::test]
    async fn test_skip_without_subscribers() {
        let config = PriceFeedConfig {
            skip_without_subscribers: true,
            ..Default::default()
        };
        let (repository, feed) = feed(2, config).await;

        assert_eq!(feed.tick(&mut StdRng::seed_from_u64(5)).await.unwrap(), None);
        for id in repository.all_ids().await.unwrap() {
            let stored = repository.find_by_id(&id).await.unwrap().unwrap();
            assert_eq!(stored.price, Decimal::from(100));
        }

        let _rx = feed.subscribe();
        assert!(feed
            .tick(&mut StdRng::seed_from_u64(5))
            .await
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_config_is_sanitized() {
        let config = PriceFeedConfig {
            interval: Duration::ZERO,
            volatility: f64::NAN,
            skip_without_subscribers: false,
        };
        let (sender, _) = broadcast::channel(1);
        let feed = PriceFeed::new(Arc::new(InMemoryTokenRepository::new()), sender, config);

        assert_eq!(feed.config.interval, DEFAULT_INTERVAL);
        assert_eq!(feed.config.volatility, DEFAULT_VOLATILITY);
    }

    #[tokio::test]
    async fn test_started_feed_emits_until_cancelled() {
        let config = PriceFeedConfig {
            interval: Duration::from_millis(10),
            ..Default::default()
        };
        let (_, feed) = feed(3, config).await;
        let feed = Arc::new(feed);
        let mut rx = feed.subscribe();

        let handle = feed.clone().start();
        let update = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("no update before timeout")
            .unwrap();
        assert!(update.id.starts_with('t'));

        handle.shutdown().await;
    }
}
