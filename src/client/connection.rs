use super::state::SessionEvent;
use crate::websocket::WebSocketFactory;
use futures::stream::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Connecting,
    Open,
}

/// Owns the one live connection task.
///
/// Starting a new attempt aborts the previous task, so at most one
/// connection exists at any time.
pub struct ConnectionManager {
    url: String,
    connect_timeout: Option<Duration>,
    current: Option<JoinHandle<()>>,
}

impl ConnectionManager {
    pub fn new(url: impl Into<String>, connect_timeout: Option<Duration>) -> Self {
        Self {
            url: url.into(),
            connect_timeout,
            current: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Spawn a connection attempt tagged with `generation`, superseding the
    /// previous one
    pub fn connect(&mut self, generation: u64, events: mpsc::Sender<SessionEvent>) {
        if let Some(previous) = self.current.take() {
            previous.abort();
        }

        let url = self.url.clone();
        let connect_timeout = self.connect_timeout;
        self.current = Some(tokio::spawn(run_connection(
            generation,
            url,
            connect_timeout,
            events,
        )));
    }

    /// Drop the live connection, if any, without reporting a closure
    pub fn close(&mut self) {
        if let Some(task) = self.current.take() {
            task.abort();
        }
    }

    pub fn has_connection(&self) -> bool {
        self.current.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}

/// Handshake, then forward text frames until the connection ends.
///
/// Every way this can end, including a failed handshake, is reported as a
/// single `Closed` event.
async fn run_connection(
    generation: u64,
    url: String,
    connect_timeout: Option<Duration>,
    events: mpsc::Sender<SessionEvent>,
) {
    let mut ws_stream = match WebSocketFactory::create(&url, connect_timeout).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", url, e);
            let _ = events.send(SessionEvent::Closed { generation }).await;
            return;
        }
    };

    tracing::info!("Connected to timer server");
    if events.send(SessionEvent::Opened { generation }).await.is_err() {
        return;
    }

    while let Some(msg_result) = ws_stream.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                tracing::debug!("Received text message: {}", text.as_str());
                let event = SessionEvent::Message {
                    generation,
                    payload: text.as_str().to_owned(),
                };
                if events.send(event).await.is_err() {
                    return;
                }
            }
            Ok(Message::Close(frame)) => {
                if let Some(close_frame) = frame {
                    tracing::warn!(
                        "Server closed connection: code={:?}, reason='{}'",
                        close_frame.code,
                        close_frame.reason.as_str()
                    );
                } else {
                    tracing::warn!("Server closed connection without close frame");
                }
                break;
            }
            Ok(Message::Ping(data)) => {
                tracing::debug!("Received ping ({} bytes)", data.len());
            }
            Ok(Message::Pong(data)) => {
                tracing::debug!("Received pong ({} bytes)", data.len());
            }
            Ok(Message::Binary(data)) => {
                tracing::warn!("Received unexpected binary message ({} bytes)", data.len());
            }
            Ok(Message::Frame(_)) => {
                tracing::debug!("Received raw frame (internal)");
            }
            Err(e) => {
                tracing::error!("WebSocket read error: {}", e);
                break;
            }
        }
    }

    tracing::warn!("Connection lost");
    let _ = events.send(SessionEvent::Closed { generation }).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refused_connection_reports_closed() {
        // Bind then release a port so nothing is listening on it
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (tx, mut rx) = mpsc::channel(4);
        let mut manager = ConnectionManager::new(format!("ws://{addr}/ws"), None);
        manager.connect(3, tx);

        assert_eq!(rx.recv().await, Some(SessionEvent::Closed { generation: 3 }));
    }

    #[tokio::test]
    async fn test_new_attempt_aborts_previous() {
        // Accepts TCP but never completes the handshake
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (tx, _rx) = mpsc::channel(4);
        let mut manager = ConnectionManager::new(format!("ws://{addr}/ws"), None);
        manager.connect(1, tx.clone());
        let first = manager.current.as_ref().unwrap().abort_handle();

        manager.connect(2, tx);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(first.is_finished());
        assert!(manager.has_connection());
        manager.close();
        assert!(!manager.has_connection());
    }
}
