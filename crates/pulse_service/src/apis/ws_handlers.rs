use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::{models::tokens::PriceUpdate, AppState};

pub(super) async fn price_updates(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let updates = app_state.price_updates.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, updates))
}

/// Pushes every broadcast price update to one client until either side
/// closes. Inbound frames are read and dropped.
pub async fn handle_socket(socket: WebSocket, mut updates: broadcast::Receiver<PriceUpdate>) {
    info!("WebSocket client connected");
    let (mut ws_sender, mut ws_receiver) = socket.split();

    loop {
        tokio::select! {
            msg = ws_receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Text(text))) => {
                        debug!("Ignoring client frame: {}", text);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                }
            }
            update = updates.recv() => {
                match update {
                    Ok(update) => {
                        let payload = match serde_json::to_string(&update) {
                            Ok(payload) => payload,
                            Err(e) => {
                                warn!("Failed to encode price update: {}", e);
                                continue;
                            }
                        };
                        if let Err(e) = ws_sender.send(Message::Text(payload)).await {
                            debug!("Error sending WebSocket message: {}", e);
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "WebSocket client lagging, dropping updates");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    info!("WebSocket client disconnected");
}
