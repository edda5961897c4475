//! The temporary whole-screen input blocker.
//!
//! Armed while waiting for a window to appear (an application launch, a
//! stage zoom): the input viewport claims the whole screen and the
//! captured-event hook swallows everything that arrives. A timeout frees
//! the user if the window never comes.

use super::{RenderManager, TimeMs};

const TIMEOUT_MS: TimeMs = 1000;

#[derive(Debug, Default)]
pub(crate) struct InputBlocker {
    pub active: bool,
    pub deadline: Option<TimeMs>,
}

impl RenderManager {
    /// Grab all input until a window appears or the timeout expires.
    ///
    /// While the stage is zoomed the blocker is held without a timeout;
    /// it lasts until the user zooms fully out.
    pub fn add_input_blocker(&mut self) {
        if self.input_blocker.active {
            return;
        }
        tracing::debug!("input blocker added");
        self.input_blocker.active = true;
        self.set_input_viewport();
        if !self.stage_zoom.zoomed {
            self.input_blocker.deadline = Some(self.clock + TIMEOUT_MS);
        }
    }

    /// Release the blocker and restore the state-derived viewport.
    pub fn remove_input_blocker(&mut self) {
        self.input_blocker.deadline = None;
        if self.input_blocker.active {
            tracing::debug!("input blocker removed");
            self.input_blocker.active = false;
            self.set_input_viewport();
        }
    }

    pub fn has_input_blocker(&self) -> bool {
        self.input_blocker.active
    }

    /// The stage's captured-event hook. Returns `true` when the event must
    /// be swallowed.
    pub fn captured_event(&self) -> bool {
        if !self.input_blocker.active {
            return false;
        }
        if self.stage_zoom.zoomed {
            return false;
        }
        // Only happens when the user taps really quickly after launching.
        tracing::debug!("input event swallowed by the input blocker");
        true
    }
}
