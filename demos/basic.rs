use std::sync::Arc;
use timer_overlay::{DisplayBinder, OverlayClient, OverlayClientOptions, WatchSurface};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Create client against ws://localhost:8080/ws
    let surface = Arc::new(WatchSurface::new());
    let client = OverlayClient::new(
        OverlayClientOptions::default(),
        DisplayBinder::from_surface(surface.clone()),
    )?;

    println!("Connecting to {}...", client.endpoint());
    let session = client.start();

    // Print every update until Ctrl-C
    let mut updates = surface.subscribe();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if state.is_paused {
                    println!("{} (paused)", state.visible_text);
                } else {
                    println!("{}", state.visible_text);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!("Disconnecting...");
    session.shutdown().await?;
    println!("Disconnected!");

    Ok(())
}
