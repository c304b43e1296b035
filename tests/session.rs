use futures::SinkExt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use timer_overlay::{
    ConnectionState, DisplayBinder, DisplayState, OverlayClient, OverlayClientOptions,
    OverlaySession, TimerFrame, WatchSurface, format_remaining,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

const WAIT: Duration = Duration::from_secs(5);

type ServerStream = WebSocketStream<TcpStream>;

/// Accepts WebSocket clients on `listener` and hands each one to the test
fn serve(listener: TcpListener) -> mpsc::UnboundedReceiver<ServerStream> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            if let Ok(ws) = tokio_tungstenite::accept_async(stream).await
                && tx.send(ws).is_err()
            {
                break;
            }
        }
    });
    rx
}

async fn spawn_server() -> (SocketAddr, mpsc::UnboundedReceiver<ServerStream>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (addr, serve(listener))
}

fn options(addr: SocketAddr, retry_interval: u64) -> OverlayClientOptions {
    OverlayClientOptions {
        host: addr.ip().to_string(),
        port: addr.port(),
        retry_interval,
        ..Default::default()
    }
}

fn start(options: OverlayClientOptions) -> (OverlaySession, watch::Receiver<DisplayState>) {
    let surface = Arc::new(WatchSurface::new());
    let display = surface.subscribe();
    let client = OverlayClient::new(options, DisplayBinder::from_surface(surface)).unwrap();
    (client.start(), display)
}

async fn next_client(clients: &mut mpsc::UnboundedReceiver<ServerStream>) -> ServerStream {
    timeout(WAIT, clients.recv())
        .await
        .expect("client did not connect in time")
        .expect("server stopped")
}

async fn expect_display(display: &mut watch::Receiver<DisplayState>, expected: DisplayState) {
    timeout(WAIT, display.wait_for(|state| *state == expected))
        .await
        .expect("display did not update in time")
        .expect("surface dropped");
}

async fn expect_state(session: &OverlaySession, state: ConnectionState) {
    timeout(WAIT, session.wait_for_state(state))
        .await
        .expect("connection state did not change in time")
        .unwrap();
}

#[tokio::test]
async fn test_running_and_paused_frames() {
    let (addr, mut clients) = spawn_server().await;
    let (session, mut display) = start(options(addr, 100));

    let mut server = next_client(&mut clients).await;
    expect_state(&session, ConnectionState::Open).await;

    server.send(Message::text("00:05:12")).await.unwrap();
    expect_display(&mut display, DisplayState::from_payload("00:05:12")).await;
    assert!(!display.borrow().is_paused);

    server.send(Message::text("PAUSED 00:05:12")).await.unwrap();
    expect_display(
        &mut display,
        DisplayState {
            visible_text: "00:05:12".to_string(),
            is_paused: true,
        },
    )
    .await;

    let resumed = TimerFrame::Running(format_remaining(Duration::from_secs(311)));
    server.send(Message::text(resumed.to_string())).await.unwrap();
    expect_display(&mut display, DisplayState::from_payload("0:05:11")).await;

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_closure_resets_display_and_reconnects() {
    let (addr, mut clients) = spawn_server().await;
    let (session, mut display) = start(options(addr, 100));

    let mut server = next_client(&mut clients).await;
    server.send(Message::text("PAUSED 1:00:00")).await.unwrap();
    expect_display(&mut display, DisplayState::from_payload("PAUSED 1:00:00")).await;

    server.close(None).await.unwrap();
    expect_display(&mut display, DisplayState::idle()).await;

    // The retry timer brings the client back
    let mut server = next_client(&mut clients).await;
    expect_state(&session, ConnectionState::Open).await;
    server.send(Message::text("0:59:59")).await.unwrap();
    expect_display(&mut display, DisplayState::from_payload("0:59:59")).await;

    // Once open again no further attempts are made
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(clients.try_recv().is_err());
    assert!(session.is_connected());

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_retries_until_server_appears() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (session, display) = start(options(addr, 50));

    // Several attempts fail while nothing listens
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!session.is_connected());
    assert_eq!(*display.borrow(), DisplayState::idle());

    let mut clients = serve(TcpListener::bind(addr).await.unwrap());
    let _server = next_client(&mut clients).await;
    expect_state(&session, ConnectionState::Open).await;

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_visibility_triggers_immediate_reconnect() {
    let (addr, mut clients) = spawn_server().await;
    // Long enough that only the visibility signal can explain a reconnect
    let (session, mut display) = start(options(addr, 60_000));

    let mut server = next_client(&mut clients).await;
    server.close(None).await.unwrap();
    expect_display(&mut display, DisplayState::idle()).await;
    expect_state(&session, ConnectionState::Closed).await;

    session.set_visible(true).await.unwrap();
    let _server = next_client(&mut clients).await;
    expect_state(&session, ConnectionState::Open).await;

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_connect_once_mode_never_retries() {
    let (addr, mut clients) = spawn_server().await;
    let (session, mut display) = start(OverlayClientOptions {
        auto_reconnect: false,
        ..options(addr, 50)
    });

    let mut server = next_client(&mut clients).await;
    server.send(Message::text("0:00:30")).await.unwrap();
    expect_display(&mut display, DisplayState::from_payload("0:00:30")).await;

    server.close(None).await.unwrap();
    expect_display(&mut display, DisplayState::idle()).await;
    expect_state(&session, ConnectionState::Closed).await;

    session.set_visible(true).await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(clients.try_recv().is_err());
    assert_eq!(session.state(), ConnectionState::Closed);

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_connect_timeout_fails_stuck_handshake() {
    // Accepts TCP but never answers the upgrade request
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (session, _display) = start(OverlayClientOptions {
        auto_reconnect: false,
        connect_timeout: Some(300),
        ..options(addr, 50)
    });

    expect_state(&session, ConnectionState::Connecting).await;
    expect_state(&session, ConnectionState::Closed).await;

    session.shutdown().await.unwrap();
    drop(listener);
}

#[tokio::test]
async fn test_shutdown_resets_display() {
    let (addr, mut clients) = spawn_server().await;
    let (session, mut display) = start(options(addr, 100));
    let state = session.watch_state();

    let mut server = next_client(&mut clients).await;
    server.send(Message::text("PAUSED 0:00:09")).await.unwrap();
    expect_display(&mut display, DisplayState::from_payload("PAUSED 0:00:09")).await;

    session.shutdown().await.unwrap();

    assert_eq!(*state.borrow(), ConnectionState::Closed);
    assert_eq!(*display.borrow(), DisplayState::idle());
}

#[tokio::test]
async fn test_reconnects_when_handshake_is_slower_than_retry_period() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, mut clients) = mpsc::unbounded_channel();

    // Drops the first client, then answers every upgrade after 250 ms
    tokio::spawn(async move {
        let mut first = true;
        while let Ok((stream, _)) = listener.accept().await {
            if first {
                first = false;
                drop(tokio_tungstenite::accept_async(stream).await);
                continue;
            }
            let tx = tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(250)).await;
                if let Ok(ws) = tokio_tungstenite::accept_async(stream).await {
                    let _ = tx.send(ws);
                }
            });
        }
    });

    let (session, _display) = start(options(addr, 100));

    let mut server = next_client(&mut clients).await;
    expect_state(&session, ConnectionState::Open).await;
    server.send(Message::text("0:00:42")).await.unwrap();

    // Only the attempt that was in flight was ever accepted
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(clients.try_recv().is_err());
    assert!(session.is_connected());

    session.shutdown().await.unwrap();
}
