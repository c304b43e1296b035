// Module declarations
mod builder;
mod connection;
mod session;
mod state;

// Public API exports
pub use builder::{OverlayClientBuilder, OverlayClientOptions};
pub use connection::{ConnectionManager, ConnectionState};
pub use session::{OverlayClient, OverlaySession};
pub use state::{SessionAction, SessionEvent, SessionMachine};
