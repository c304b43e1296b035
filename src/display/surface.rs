use super::binder::{DisplaySurface, TextTarget, VisibilityTarget};
use crate::types::{DisplayState, Result};
use std::io::Write;
use tokio::sync::watch;

/// A surface that publishes every write on a watch channel.
///
/// Used to embed the overlay in another program and as the backing store of
/// the terminal renderer.
pub struct WatchSurface {
    tx: watch::Sender<DisplayState>,
}

impl WatchSurface {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DisplayState::idle());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> DisplayState {
        self.tx.borrow().clone()
    }
}

impl Default for WatchSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl TextTarget for WatchSurface {
    fn set_text(&self, text: &str) {
        self.tx.send_if_modified(|state| {
            if state.visible_text == text {
                return false;
            }
            state.visible_text = text.to_string();
            true
        });
    }
}

impl VisibilityTarget for WatchSurface {
    fn set_visible(&self, visible: bool) {
        self.tx.send_if_modified(|state| {
            if state.is_paused == visible {
                return false;
            }
            state.is_paused = visible;
            true
        });
    }
}

impl DisplaySurface for WatchSurface {
    /// Publish text and banner together so no reader sees them out of step
    fn apply(&self, next: &DisplayState) {
        self.tx.send_if_modified(|state| {
            if state == next {
                return false;
            }
            state.clone_from(next);
            true
        });
    }
}

/// How the terminal renderer prints updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One line redrawn in place
    #[default]
    Plain,
    /// One JSON object per update
    Json,
}

/// Prints the state published by a [`WatchSurface`] to a writer.
pub struct TerminalRenderer<W: Write> {
    out: W,
    mode: OutputMode,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, mode: OutputMode) -> Self {
        Self { out, mode }
    }

    pub fn draw(&mut self, state: &DisplayState) -> Result<()> {
        match self.mode {
            OutputMode::Plain => {
                let banner = if state.is_paused { "  ⏸ PAUSED" } else { "" };
                write!(self.out, "\r\x1b[2K⏱ {}{}", state.visible_text, banner)?;
            }
            OutputMode::Json => {
                let line = serde_json::to_string(state).map_err(std::io::Error::other)?;
                writeln!(self.out, "{line}")?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Draw every change until the surface is dropped
    pub async fn run(mut self, mut rx: watch::Receiver<DisplayState>) -> Result<()> {
        let initial = rx.borrow_and_update().clone();
        self.draw(&initial)?;
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            self.draw(&state)?;
        }
        Ok(())
    }
}
