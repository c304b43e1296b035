use crate::types::DisplayState;
use std::sync::Arc;

/// A node that shows the remaining time.
pub trait TextTarget: Send + Sync {
    fn set_text(&self, text: &str);
}

/// A node that can be shown or hidden, used for the paused banner.
pub trait VisibilityTarget: Send + Sync {
    fn set_visible(&self, visible: bool);
}

/// A surface owning both nodes.
///
/// Override [`apply`](Self::apply) when readers on other threads must never
/// see the label and the banner out of step.
pub trait DisplaySurface: TextTarget + VisibilityTarget {
    fn apply(&self, state: &DisplayState) {
        self.set_text(&state.visible_text);
        self.set_visible(state.is_paused);
    }
}

#[derive(Clone)]
enum Targets {
    Split {
        timer: Arc<dyn TextTarget>,
        banner: Arc<dyn VisibilityTarget>,
    },
    Surface(Arc<dyn DisplaySurface>),
}

/// Renders incoming payloads into the timer label and the paused banner.
///
/// The binder holds no state of its own: every payload fully determines what
/// is shown, so replaying a payload leaves the targets unchanged.
#[derive(Clone)]
pub struct DisplayBinder {
    targets: Targets,
}

impl DisplayBinder {
    pub fn new(timer: Arc<dyn TextTarget>, banner: Arc<dyn VisibilityTarget>) -> Self {
        Self {
            targets: Targets::Split { timer, banner },
        }
    }

    /// Build a binder over a single surface that owns both nodes
    pub fn from_surface<S>(surface: Arc<S>) -> Self
    where
        S: DisplaySurface + 'static,
    {
        Self {
            targets: Targets::Surface(surface),
        }
    }

    /// Derive the display state from a payload and write it out
    pub fn bind(&self, payload: &str) -> DisplayState {
        let state = DisplayState::from_payload(payload);
        self.render(&state);
        state
    }

    pub fn render(&self, state: &DisplayState) {
        match &self.targets {
            Targets::Split { timer, banner } => {
                timer.set_text(&state.visible_text);
                banner.set_visible(state.is_paused);
            }
            Targets::Surface(surface) => surface.apply(state),
        }
    }

    /// Show the idle placeholder with the banner hidden
    pub fn reset(&self) {
        self.render(&DisplayState::idle());
    }
}
