/// Literal prefix the server puts in front of the remaining time while paused
pub const PAUSED_MARKER: &str = "PAUSED ";

/// Text shown while no connection is open
pub const IDLE_PLACEHOLDER: &str = "00:00:00";

/// Default server host
pub const DEFAULT_HOST: &str = "localhost";

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;

/// Default WebSocket path
pub const DEFAULT_PATH: &str = "/ws";

/// Default reconnect period (milliseconds)
pub const RETRY_INTERVAL: u64 = 3000;

/// Capacity of the session event queue
pub const EVENT_BUFFER_SIZE: usize = 64;
