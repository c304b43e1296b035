pub mod constants;
pub mod error;
pub mod message;

pub use constants::*;
pub use error::{OverlayError, Result};
pub use message::{DisplayState, TimerFrame, format_remaining};
