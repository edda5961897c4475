//! The input-viewport engine.
//!
//! The compositor only receives pointer input inside its input shape on
//! the overlay and stage windows; everything else falls through to the
//! client windows underneath. This module assembles that shape from the
//! current state and pushes it to the server through a coalescing deferred
//! flush, so bursts of recomputation cost one round trip.

use lumen_core::types::Rect;

use crate::wm::{ClientKind, NoteKind};
use crate::xserver::{ErrorTrap, Region};

use super::state::{BlurFlags, State};
use super::RenderManager;

/// The double-buffered viewport.
#[derive(Debug, Default)]
pub(crate) struct ViewportState {
    /// Last region handed to the server.
    pub current: Option<Region>,
    /// Region awaiting the flush; `None` once flushed.
    pub new: Option<Region>,
    pub flush_pending: bool,
}

impl RenderManager {
    /// Recompute the input viewport from the current state and queue it.
    pub fn set_input_viewport(&mut self) {
        let mut region = Region::new();
        let screen = self.comp.screen;

        // A mapped modal blocker owns input wholesale; the compositor must
        // not claim anything beyond the explicit additions below.
        if !self.wm.has_modal_blockers() {
            if !self.state.need_whole_screen_input() && !self.input_blocker.active {
                if self.title_bar.flags().has_left_button() {
                    region.union_rect(self.title_bar.left_button_rect());
                }
                // In app mode the window manager picks the right button up
                // from the server itself.
                if self.title_bar.flags().has_right_button() && !self.state.is_app() {
                    region.union_rect(self.title_bar.right_button_rect(screen.width));
                }
                if self.actor_is_visible(self.groups.edit_button) {
                    region.union_rect(self.scene.geometry(self.groups.edit_button));
                }
                // Claim the status area to block the status menu where the
                // menu would land on blurred content.
                if let Some(status_area) = self.status_area {
                    let blurred = self
                        .current_blur
                        .intersects(BlurFlags::BLUR_BACKGROUND | BlurFlags::BLUR_HOME);
                    if self.actor_is_visible(status_area)
                        && (self.state.is_portrait() || (self.state == State::App && blurred))
                    {
                        // The client geometry, not the actor's: a titlebar
                        // reflow may just have moved it.
                        let rect = self
                            .status_area_client
                            .and_then(|id| self.wm.get(id))
                            .map(|c| c.frame_geometry)
                            .unwrap_or_else(|| self.scene.geometry(status_area));
                        region.union_rect(rect);
                    }
                }
            } else {
                region.union_rect(Rect::from_size(screen));
            }

            // Release foreground notes and dialogs from the claim so their
            // own windows receive events directly.
            if self.state.ungrab_notes() {
                let notes = self.foreground_region(|kind| {
                    matches!(kind, ClientKind::Dialog) || kind.is_note()
                });
                region.subtract(&notes);
            }

            // Events initiated on the applets are ours.
            if self.state.need_desktop() {
                let applets = self.foreground_region(|kind| kind == ClientKind::HomeApplet);
                region.union(&applets);
            }
        }

        // Visible incoming-event previews are always grabbed; whether the
        // tap is meaningful is decided when it happens.
        for id in self.wm.above_desktop_top_down() {
            let Some(client) = self.wm.get(id) else {
                continue;
            };
            if client.kind == ClientKind::Note(NoteKind::IncomingEventPreview)
                && self.is_client_visible(id)
            {
                region.union_rect(client.frame_geometry);
            }
        }

        self.queue_input_viewport(region);
    }

    /// Union of the window geometry of every client above the desktop
    /// whose kind matches.
    fn foreground_region(&self, matches: impl Fn(ClientKind) -> bool) -> Region {
        let mut region = Region::new();
        for id in self.wm.above_desktop_top_down() {
            let Some(client) = self.wm.get(id) else {
                continue;
            };
            if matches(client.kind) {
                region.union_rect(client.geometry);
            }
        }
        region
    }

    /// Stash `region` as the next viewport; flushed on the next dispatch.
    pub(crate) fn queue_input_viewport(&mut self, region: Region) {
        self.viewport.new = Some(region);
        self.viewport.flush_pending = true;
    }

    /// Deferred flush: one server round trip per burst of updates, and
    /// none at all when the region did not actually change.
    pub(crate) fn flush_input_viewport(&mut self) {
        if !self.viewport.flush_pending {
            return;
        }
        self.viewport.flush_pending = false;
        let Some(new) = self.viewport.new.take() else {
            return;
        };
        if self.viewport.current.as_ref() == Some(&new) {
            return;
        }

        let wire = new.to_wire();
        let overlay = self.x.overlay_window();
        let stage = self.x.stage_window();
        let composited = !self.state.is_non_composited();
        {
            // Either window may be gone mid-teardown.
            let mut conn = ErrorTrap::new(self.x.as_mut());
            for window in overlay.into_iter().chain(std::iter::once(stage)) {
                conn.select_compositor_input(window);
                if composited {
                    conn.reset_bounding_shape(window);
                }
                conn.set_input_shape(window, &wire);
            }
        }

        self.viewport.current = Some(new);
    }

    /// The last region handed to the server.
    pub fn current_input_viewport(&self) -> Option<&Region> {
        self.viewport.current.as_ref()
    }

    /// The region awaiting the next flush, if any.
    pub fn pending_input_viewport(&self) -> Option<&Region> {
        self.viewport.new.as_ref()
    }

    /// Transpose the viewport for a screen rotation, preserving input
    /// routing through the transition's black period. Applying it twice
    /// restores the original region exactly.
    pub fn flip_input_viewport(&mut self) {
        let source = self.viewport.new.as_ref().or(self.viewport.current.as_ref());
        let Some(region) = source else {
            return;
        };
        let flipped = region.transposed();
        self.queue_input_viewport(flipped);
    }
}
