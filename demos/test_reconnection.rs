use futures::SinkExt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use timer_overlay::{
    ConnectionState, DisplayBinder, OverlayClient, OverlayClientOptions, TimerFrame,
    WatchSurface, format_remaining,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

/// Push a countdown to the first client that connects, pausing halfway
fn spawn_countdown_server(listener: TcpListener, from: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
            return;
        };

        for remaining in (0..=from).rev() {
            let text = format_remaining(Duration::from_secs(remaining));
            let frame = if remaining == from / 2 {
                TimerFrame::Paused(text)
            } else {
                TimerFrame::Running(text)
            };
            if ws.send(Message::text(frame.to_string())).await.is_err() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    })
}

/// Exercise reconnection against a local server that goes away and comes back
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing to see logs
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("🦀 Testing Reconnection with a local timer server\n");

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;

    let surface = Arc::new(WatchSurface::new());
    let client = OverlayClient::new(
        OverlayClientOptions {
            host: addr.ip().to_string(),
            port: addr.port(),
            retry_interval: 1000,
            ..Default::default()
        },
        DisplayBinder::from_surface(surface.clone()),
    )?;

    // Test 1: Connect and receive frames
    println!("✅ Test 1: Initial connection...");
    let server = spawn_countdown_server(listener, 6);
    let session = client.start();
    session.wait_for_state(ConnectionState::Open).await?;
    println!("✅ Connected successfully!\n");

    tokio::time::sleep(Duration::from_secs(2)).await;
    println!("📺 Overlay shows: {:?}\n", surface.current());

    // Test 2: Server goes away, overlay falls back to idle
    println!("⚠️  Test 2: Stopping the server...");
    server.abort();
    session.wait_for_state(ConnectionState::Closed).await?;
    println!("📺 Overlay shows: {:?}\n", surface.current());

    // Test 3: Server comes back on the same port
    println!("⏳ Test 3: Restarting the server in 3 seconds...");
    tokio::time::sleep(Duration::from_secs(3)).await;
    let server = spawn_countdown_server(TcpListener::bind(addr).await?, 4);
    session.wait_for_state(ConnectionState::Open).await?;
    println!("✅ Reconnected!\n");

    for _ in 0..6 {
        tokio::time::sleep(Duration::from_millis(500)).await;
        println!("📺 Overlay shows: {:?}", surface.current());
    }

    // Test 4: Refocus reconnects without waiting for the timer
    println!("\n✅ Test 4: Visibility signal while disconnected...");
    server.abort();
    session.wait_for_state(ConnectionState::Closed).await?;
    let _server = spawn_countdown_server(TcpListener::bind(addr).await?, 2);
    session.set_visible(true).await?;
    session.wait_for_state(ConnectionState::Open).await?;
    println!("✅ Reconnected on refocus\n");

    session.shutdown().await?;
    println!("🎉 Reconnection tests completed!");
    Ok(())
}
