use crate::types::{OverlayError, Result};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket factory for creating WebSocket connections
pub struct WebSocketFactory;

impl WebSocketFactory {
    /// Perform the client handshake, optionally bounded by `connect_timeout`
    pub async fn create(url: &str, connect_timeout: Option<Duration>) -> Result<WsStream> {
        tracing::debug!("Creating WebSocket connection to: {}", url);

        let (ws_stream, response) = match connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connect_async(url))
                .await
                .map_err(|_| OverlayError::Timeout)??,
            None => connect_async(url).await?,
        };

        tracing::debug!("Handshake completed with status {}", response.status());
        Ok(ws_stream)
    }
}
