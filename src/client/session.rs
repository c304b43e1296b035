use super::{
    ConnectionManager, ConnectionState, OverlayClientBuilder, OverlayClientOptions,
    SessionAction, SessionEvent, SessionMachine,
};
use crate::display::DisplayBinder;
use crate::infrastructure::RetryTimer;
use crate::types::{EVENT_BUFFER_SIZE, OverlayError, Result};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// The overlay client: a display binder plus the connection settings that
/// feed it.
///
/// Creating a client does not connect. Call [`start()`](Self::start) from
/// within a tokio runtime to spawn the session.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use timer_overlay::{DisplayBinder, OverlayClient, OverlayClientOptions, WatchSurface};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let surface = Arc::new(WatchSurface::new());
/// let client = OverlayClient::new(
///     OverlayClientOptions::default(),
///     DisplayBinder::from_surface(surface.clone()),
/// )?;
///
/// let session = client.start();
/// // ...
/// session.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct OverlayClient {
    pub(crate) endpoint: String,
    pub(crate) options: OverlayClientOptions,
    pub(crate) binder: DisplayBinder,
}

impl OverlayClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Config`] for an empty host, port 0, a path
    /// without a leading `/` or a zero interval, and
    /// [`OverlayError::UrlParse`] if host and port do not form a valid URL.
    pub fn new(options: OverlayClientOptions, binder: DisplayBinder) -> Result<Self> {
        OverlayClientBuilder::new(options, binder).map(|builder| builder.build())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn options(&self) -> &OverlayClientOptions {
        &self.options
    }

    /// Spawn the session and make the first connection attempt.
    ///
    /// The session runs until [`OverlaySession::shutdown`] is called or the
    /// returned handle is dropped.
    pub fn start(self) -> OverlaySession {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER_SIZE);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Closed);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let actor = SessionActor {
            machine: SessionMachine::new(self.options.auto_reconnect),
            connection: ConnectionManager::new(
                self.endpoint.clone(),
                self.options.connect_timeout(),
            ),
            retry: RetryTimer::new(self.options.retry_period()),
            binder: self.binder,
            events_tx: events_tx.clone(),
            state_tx,
        };

        tracing::info!(
            "Starting overlay session for {} (auto_reconnect={})",
            self.endpoint,
            self.options.auto_reconnect
        );
        let task = tokio::spawn(actor.run(events_rx, shutdown_rx));

        OverlaySession {
            events: events_tx,
            state: state_rx,
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a running session.
pub struct OverlaySession {
    events: mpsc::Sender<SessionEvent>,
    state: watch::Receiver<ConnectionState>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl OverlaySession {
    /// Report that the overlay became visible or hidden. Becoming visible
    /// while disconnected triggers an immediate connection attempt.
    pub async fn set_visible(&self, visible: bool) -> Result<()> {
        self.events
            .send(SessionEvent::VisibilityChanged { visible })
            .await
            .map_err(|_| OverlayError::SessionClosed)
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Wait until the connection reaches `target`
    pub async fn wait_for_state(&self, target: ConnectionState) -> Result<()> {
        let mut rx = self.state.clone();
        rx.wait_for(|state| *state == target)
            .await
            .map_err(|_| OverlayError::SessionClosed)?;
        Ok(())
    }

    /// Stop retrying, drop the connection and reset the display to idle
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::error!("Session task failed: {}", e);
            return Err(OverlayError::SessionClosed);
        }
        Ok(())
    }
}

/// Owns every piece of session state; all transitions run on its task.
struct SessionActor {
    machine: SessionMachine,
    connection: ConnectionManager,
    retry: RetryTimer,
    binder: DisplayBinder,
    events_tx: mpsc::Sender<SessionEvent>,
    state_tx: watch::Sender<ConnectionState>,
}

impl SessionActor {
    async fn run(
        mut self,
        mut events_rx: mpsc::Receiver<SessionEvent>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        let actions = self.machine.start();
        self.apply(actions);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                event = events_rx.recv() => match event {
                    Some(event) => self.dispatch(event),
                    None => break,
                },
            }
        }

        self.teardown();
    }

    fn dispatch(&mut self, event: SessionEvent) {
        tracing::debug!("Session event: {:?}", event);
        let actions = self.machine.handle(event);
        self.apply(actions);
    }

    fn apply(&mut self, actions: Vec<SessionAction>) {
        for action in actions {
            match action {
                SessionAction::Connect { generation } => {
                    tracing::info!(
                        "Connecting to {} (attempt {})",
                        self.connection.url(),
                        generation
                    );
                    self.connection.connect(generation, self.events_tx.clone());
                }
                SessionAction::Render(state) => self.binder.render(&state),
                SessionAction::ArmRetry { epoch } => {
                    if self.retry.arm(epoch, self.events_tx.clone()) {
                        tracing::info!(
                            "Connection lost, attempting to reconnect every {:?}",
                            self.retry.period()
                        );
                    }
                }
                SessionAction::CancelRetry => {
                    if self.retry.cancel() {
                        tracing::debug!("Retry timer cancelled");
                    }
                }
            }
        }

        let state = self.machine.state();
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    fn teardown(&mut self) {
        tracing::info!("Shutting down overlay session");
        self.retry.cancel();
        self.connection.close();
        self.binder.reset();
        self.state_tx.send_replace(ConnectionState::Closed);
    }
}
