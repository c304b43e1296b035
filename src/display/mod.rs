// Display module - Rendering payloads into the overlay targets
pub mod binder;
pub mod surface;

pub use binder::{DisplayBinder, DisplaySurface, TextTarget, VisibilityTarget};
pub use surface::{OutputMode, TerminalRenderer, WatchSurface};
