//! # Timer Overlay
//!
//! A client for a live countdown overlay. A server pushes plain text frames
//! over a WebSocket (`"0:05:12"`, or `"PAUSED 0:05:12"` while paused) and the
//! client writes them into a timer label and a paused banner, reconnecting on
//! a fixed period whenever the connection drops.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use timer_overlay::{DisplayBinder, OverlayClient, OverlayClientOptions, WatchSurface};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let surface = Arc::new(WatchSurface::new());
//!     let client = OverlayClient::new(
//!         OverlayClientOptions {
//!             port: 8080,
//!             ..Default::default()
//!         },
//!         DisplayBinder::from_surface(surface.clone()),
//!     )?;
//!
//!     let session = client.start();
//!     let mut updates = surface.subscribe();
//!     while updates.changed().await.is_ok() {
//!         println!("{:?}", *updates.borrow());
//!     }
//!     session.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod display;
pub mod infrastructure;
pub mod types;
pub mod websocket;

pub use client::{
    ConnectionState, OverlayClient, OverlayClientBuilder, OverlayClientOptions, OverlaySession,
};
pub use display::{
    DisplayBinder, DisplaySurface, OutputMode, TerminalRenderer, TextTarget, VisibilityTarget,
    WatchSurface,
};
pub use types::{DisplayState, OverlayError, TimerFrame, format_remaining};
