use super::connection::ConnectionState;
use crate::types::DisplayState;

/// Something that happened to the session. Processed strictly one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Handshake for the given attempt succeeded
    Opened { generation: u64 },
    /// A text frame arrived on the given attempt
    Message { generation: u64, payload: String },
    /// The given attempt failed or its connection ended
    Closed { generation: u64 },
    /// The retry timer armed under `epoch` fired
    RetryTick { epoch: u64 },
    /// The overlay became visible or hidden
    VisibilityChanged { visible: bool },
}

/// Side effects the session runtime must carry out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Start a new connection attempt, superseding any previous one
    Connect { generation: u64 },
    Render(DisplayState),
    /// Arm the retry timer; ticks carry `epoch`
    ArmRetry { epoch: u64 },
    CancelRetry,
}

/// Transition table of the connection lifecycle.
///
/// Pure: it never touches the network or a clock. Every connection attempt
/// gets a fresh generation and events from older generations are dropped,
/// so a superseded attempt can never flip the state back.
#[derive(Debug)]
pub struct SessionMachine {
    state: ConnectionState,
    auto_reconnect: bool,
    started: bool,
    generation: u64,
    retry_epoch: Option<u64>,
    epochs_issued: u64,
}

impl SessionMachine {
    pub fn new(auto_reconnect: bool) -> Self {
        Self {
            state: ConnectionState::Closed,
            auto_reconnect,
            started: false,
            generation: 0,
            retry_epoch: None,
            epochs_issued: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Closed with a retry timer armed
    pub fn is_reconnect_pending(&self) -> bool {
        self.state == ConnectionState::Closed && self.retry_epoch.is_some()
    }

    pub fn is_retry_armed(&self) -> bool {
        self.retry_epoch.is_some()
    }

    /// Kick off the first attempt. Only the first call has any effect.
    pub fn start(&mut self) -> Vec<SessionAction> {
        if self.started {
            return Vec::new();
        }
        self.started = true;
        self.begin_attempt()
    }

    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionAction> {
        match event {
            SessionEvent::Opened { generation } => self.on_opened(generation),
            SessionEvent::Message {
                generation,
                payload,
            } => self.on_message(generation, &payload),
            SessionEvent::Closed { generation } => self.on_closed(generation),
            SessionEvent::RetryTick { epoch } => self.on_retry_tick(epoch),
            SessionEvent::VisibilityChanged { visible } => self.on_visibility(visible),
        }
    }

    fn begin_attempt(&mut self) -> Vec<SessionAction> {
        self.generation += 1;
        self.state = ConnectionState::Connecting;
        vec![SessionAction::Connect {
            generation: self.generation,
        }]
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation != self.generation {
            tracing::debug!(
                "Ignoring event from superseded attempt {} (current {})",
                generation,
                self.generation
            );
            return false;
        }
        true
    }

    fn on_opened(&mut self, generation: u64) -> Vec<SessionAction> {
        if !self.is_current(generation) || self.state != ConnectionState::Connecting {
            return Vec::new();
        }
        self.state = ConnectionState::Open;

        match self.retry_epoch.take() {
            Some(_) => vec![SessionAction::CancelRetry],
            None => Vec::new(),
        }
    }

    fn on_message(&mut self, generation: u64, payload: &str) -> Vec<SessionAction> {
        if !self.is_current(generation) || self.state != ConnectionState::Open {
            return Vec::new();
        }
        vec![SessionAction::Render(DisplayState::from_payload(payload))]
    }

    fn on_closed(&mut self, generation: u64) -> Vec<SessionAction> {
        if !self.is_current(generation) || self.state == ConnectionState::Closed {
            return Vec::new();
        }
        self.state = ConnectionState::Closed;

        let mut actions = vec![SessionAction::Render(DisplayState::idle())];
        if self.auto_reconnect && self.retry_epoch.is_none() {
            self.epochs_issued += 1;
            self.retry_epoch = Some(self.epochs_issued);
            actions.push(SessionAction::ArmRetry {
                epoch: self.epochs_issued,
            });
        }
        actions
    }

    fn on_retry_tick(&mut self, epoch: u64) -> Vec<SessionAction> {
        if self.retry_epoch != Some(epoch) || self.state == ConnectionState::Open {
            tracing::debug!("Ignoring stale retry tick (epoch {})", epoch);
            return Vec::new();
        }
        // A slow handshake is left to finish; `connect_timeout` bounds stuck ones
        if self.state == ConnectionState::Connecting {
            tracing::debug!("Attempt {} still in flight, skipping retry tick", self.generation);
            return Vec::new();
        }
        self.begin_attempt()
    }

    fn on_visibility(&mut self, visible: bool) -> Vec<SessionAction> {
        if !visible || !self.auto_reconnect || !self.started {
            return Vec::new();
        }
        if self.state != ConnectionState::Closed {
            return Vec::new();
        }
        tracing::info!("Overlay visible again while disconnected, reconnecting now");
        self.begin_attempt()
    }
}
