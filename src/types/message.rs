use super::constants::{IDLE_PLACEHOLDER, PAUSED_MARKER};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A single text frame pushed by the timer server.
///
/// The wire format is plain text: either `"PAUSED <remainder>"` or anything
/// else, which is shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerFrame {
    Running(String),
    Paused(String),
}

impl TimerFrame {
    /// Classify a payload by the paused marker. Never fails.
    pub fn parse(payload: &str) -> Self {
        match payload.strip_prefix(PAUSED_MARKER) {
            Some(rest) => Self::Paused(rest.to_string()),
            None => Self::Running(payload.to_string()),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Running(text) | Self::Paused(text) => text,
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused(_))
    }
}

impl fmt::Display for TimerFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running(text) => f.write_str(text),
            Self::Paused(text) => write!(f, "{PAUSED_MARKER}{text}"),
        }
    }
}

/// What the overlay currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    pub visible_text: String,
    pub is_paused: bool,
}

impl DisplayState {
    pub fn from_payload(payload: &str) -> Self {
        TimerFrame::parse(payload).into()
    }

    /// The placeholder shown while disconnected
    pub fn idle() -> Self {
        Self {
            visible_text: IDLE_PLACEHOLDER.to_string(),
            is_paused: false,
        }
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::idle()
    }
}

impl From<TimerFrame> for DisplayState {
    fn from(frame: TimerFrame) -> Self {
        match frame {
            TimerFrame::Running(visible_text) => Self {
                visible_text,
                is_paused: false,
            },
            TimerFrame::Paused(visible_text) => Self {
                visible_text,
                is_paused: true,
            },
        }
    }
}

/// Render a remaining duration the way the timer server writes it:
/// `H:MM:SS` with unpadded hours, a `N day(s), ` prefix past 24 hours, and
/// the sub-second part dropped.
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let clock = format!("{hours}:{minutes:02}:{seconds:02}");
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}
