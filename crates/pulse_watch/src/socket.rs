use std::time::Duration;

use futures_util::StreamExt;
use pulse_service::models::tokens::PriceUpdate;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

use crate::error::WatchError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why the reader loop exited.
enum Disconnect {
    /// The server closed the socket or the connection failed.
    Lost,
    /// Nobody is listening for updates anymore.
    Shutdown,
}

/// Subscribes to the price stream and forwards every valid tick. Reconnects
/// after a fixed delay until the receiving side goes away.
pub struct PriceSocket {
    url: String,
    reconnect_delay: Duration,
    tx: mpsc::Sender<PriceUpdate>,
}

impl PriceSocket {
    pub fn new(url: String, reconnect_delay: Duration, tx: mpsc::Sender<PriceUpdate>) -> Self {
        Self {
            url,
            reconnect_delay,
            tx,
        }
    }

    pub async fn run(self) {
        loop {
            match self.connect().await {
                Ok(stream) => {
                    info!("Connected to price stream at {}", self.url);
                    if let Disconnect::Shutdown = self.read(stream).await {
                        return;
                    }
                    warn!("Price stream disconnected");
                }
                Err(e) => warn!("Failed to connect to {}: {}", self.url, e),
            }

            if self.tx.is_closed() {
                return;
            }
            debug!("Reconnecting in {:?}", self.reconnect_delay);
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    async fn connect(&self) -> Result<WsStream, WatchError> {
        let (stream, _) = connect_async(self.url.as_str()).await?;
        Ok(stream)
    }

    async fn read(&self, mut stream: WsStream) -> Disconnect {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => match parse_update(&text) {
                    Ok(update) => {
                        if self.tx.send(update).await.is_err() {
                            return Disconnect::Shutdown;
                        }
                    }
                    Err(e) => warn!("Discarding frame: {}", e),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!("Price stream error: {}", e);
                    break;
                }
            }
        }
        Disconnect::Lost
    }
}

/// Frames must carry a non-empty id and a non-negative price.
pub fn parse_update(text: &str) -> Result<PriceUpdate, WatchError> {
    let update: PriceUpdate =
        serde_json::from_str(text).map_err(|e| WatchError::MalformedFrame(e.to_string()))?;

    if update.id.is_empty() {
        return Err(WatchError::MalformedFrame("empty token id".to_string()));
    }
    if update.price.is_sign_negative() {
        return Err(WatchError::MalformedFrame(format!(
            "negative price for {}",
            update.id
        )));
    }
    Ok(update)
}
