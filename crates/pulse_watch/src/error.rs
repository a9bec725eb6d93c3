#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Request to the token service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("WebSocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Malformed price frame: {0}")]
    MalformedFrame(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
