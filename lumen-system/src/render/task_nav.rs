//! The render manager's view of the task navigator.
//!
//! The navigator widget (thumbnails, layout, gestures) is an external
//! collaborator; the state machine only needs to know whether it has
//! anything to show, whether a given application actor is represented in
//! it, and to drive the zoom-out handoff when switching from an app.

use crate::scene::ActorId;

#[derive(Debug, Default)]
pub struct TaskNavigator {
    windows: Vec<ActorId>,
    /// Application actor pinned while its zoom-out animation runs.
    zooming_out: Option<ActorId>,
}

impl TaskNavigator {
    /// The switcher has no thumbnails to show.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn has_window(&self, actor: ActorId) -> bool {
        self.windows.contains(&actor)
    }

    pub fn add_window(&mut self, actor: ActorId) {
        if !self.windows.contains(&actor) {
            self.windows.push(actor);
        }
    }

    pub fn remove_window(&mut self, actor: ActorId) {
        self.windows.retain(|w| *w != actor);
        if self.zooming_out == Some(actor) {
            self.zooming_out = None;
        }
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Begin zooming out from `actor` into its thumbnail. The caller pins
    /// the actor; [`Self::finish_zoom_out`] hands it back for release.
    pub fn begin_zoom_out(&mut self, actor: ActorId) {
        self.zooming_out = Some(actor);
    }

    /// Completes a pending zoom-out, returning the actor to unpin.
    pub fn finish_zoom_out(&mut self) -> Option<ActorId> {
        self.zooming_out.take()
    }

    /// Scroll the thumbnail grid back to the top.
    pub fn scroll_back(&self) {
        tracing::trace!("task navigator scrolled back to top");
    }
}
