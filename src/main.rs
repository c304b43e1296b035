use clap::Parser;
use std::sync::Arc;
use timer_overlay::types::{DEFAULT_HOST, DEFAULT_PATH, DEFAULT_PORT, RETRY_INTERVAL};
use timer_overlay::{
    DisplayBinder, OutputMode, OverlayClient, OverlayClientOptions, OverlaySession,
    TerminalRenderer, WatchSurface,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Show a live countdown pushed by the timer server
#[derive(Debug, Parser)]
#[command(name = "timer-overlay", version)]
struct Cli {
    /// Timer server host
    #[arg(long, env = "OVERLAY_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Timer server port
    #[arg(long, env = "OVERLAY_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// WebSocket path
    #[arg(long, env = "OVERLAY_PATH", default_value = DEFAULT_PATH)]
    path: String,

    /// Connect with wss://
    #[arg(long, env = "OVERLAY_SECURE")]
    secure: bool,

    /// Reconnect period in milliseconds
    #[arg(long, env = "OVERLAY_RETRY_INTERVAL_MS", default_value_t = RETRY_INTERVAL)]
    retry_interval_ms: u64,

    /// Give up on a handshake after this many milliseconds
    #[arg(long, env = "OVERLAY_CONNECT_TIMEOUT_MS")]
    connect_timeout_ms: Option<u64>,

    /// Connect once and never retry
    #[arg(long)]
    no_reconnect: bool,

    /// Print one JSON object per update instead of redrawing a line
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn options(&self) -> OverlayClientOptions {
        OverlayClientOptions {
            host: self.host.clone(),
            port: self.port,
            path: self.path.clone(),
            secure: self.secure,
            auto_reconnect: !self.no_reconnect,
            retry_interval: self.retry_interval_ms,
            connect_timeout: self.connect_timeout_ms,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Plain
    };

    let surface = Arc::new(WatchSurface::new());
    let client = OverlayClient::new(cli.options(), DisplayBinder::from_surface(surface.clone()))?;

    let renderer = TerminalRenderer::new(std::io::stdout(), mode);
    let render_task = tokio::spawn(renderer.run(surface.subscribe()));

    let session = client.start();
    tokio::select! {
        result = read_visibility(&session) => result?,
        result = tokio::signal::ctrl_c() => result?,
    }

    session.shutdown().await?;
    drop(surface);
    render_task.await??;
    if mode == OutputMode::Plain {
        println!();
    }
    Ok(())
}

/// Forward `visible` / `hidden` lines on stdin to the session until stdin
/// closes, then wait for Ctrl-C
async fn read_visibility(session: &OverlaySession) -> timer_overlay::types::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "visible" => session.set_visible(true).await?,
            "hidden" => session.set_visible(false).await?,
            "" => {}
            other => tracing::warn!("Unknown visibility signal '{}'", other),
        }
    }
    std::future::pending().await
}
