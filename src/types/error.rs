use thiserror::Error;

/// Errors that can occur when configuring or driving the overlay client.
///
/// Transport failures at runtime are never returned to callers; the session
/// logs them and falls back to the idle display.
#[derive(Error, Debug)]
pub enum OverlayError {
    /// WebSocket protocol error (handshake failed, invalid frame, etc.)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// URL parsing error (malformed host or path)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The handshake did not complete within the configured connect timeout
    #[error("Timeout error")]
    Timeout,

    /// I/O error reading the visibility signal or writing the display
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session actor has already been torn down
    #[error("Session closed")]
    SessionClosed,
}

/// Convenience type alias for `Result<T, OverlayError>`.
pub type Result<T> = std::result::Result<T, OverlayError>;
