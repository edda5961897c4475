//! The stacking synchronizer.
//!
//! `restack` maps the window manager's bottom-to-top client stack onto the
//! scene groups: clients above the desktop ride in the blur group in stack
//! order, anything non-maximized above the topmost maximized client is
//! lifted into the unblurred overlay, and the walk stops as soon as a
//! client covers everything below it.

use lumen_core::types::Rect;

use crate::scene::ActorId;
use crate::wm::ClientKind;

use super::state::{BlurFlags, State};
use super::title_bar::TitleBarFlags;
use super::RenderManager;

impl RenderManager {
    /// Geometry of `actor`, mapped to the current screen orientation when
    /// it was clearly laid out for the other one. Lets geometry from
    /// portrait and landscape clients be compared in one coordinate space.
    pub(crate) fn geo_for_current_screen(&self, actor: ActorId) -> Rect {
        let screen = self.comp.screen;
        let geo = self.scene.geometry(actor);
        if geo.fits_screen(screen) {
            return geo;
        }
        let rotated = geo.transposed();
        if rotated.fits_screen(screen) {
            rotated
        } else {
            geo
        }
    }

    /// Mirror the window-manager stack onto the scene groups.
    pub fn restack(&mut self) {
        let screen = self.comp.screen;

        // Snapshot the visible blurred children; the post-restack diff
        // against it decides whether the blur source must be rebuilt.
        let previous: Vec<ActorId> = self
            .scene
            .children(self.groups.home_blur)
            .iter()
            .copied()
            .filter(|c| self.scene.is_visible(*c))
            .collect();

        let desktop = self.wm.desktop();
        let mut past_desktop = false;
        for id in self.wm.bottom_up() {
            if Some(id) == desktop {
                past_desktop = true;
                continue;
            }
            let Some(client) = self.wm.get(id) else {
                continue;
            };
            if client.desktop_index.is_none() {
                continue;
            }
            // A self-stacking client orders its own actor.
            if client.self_stacking {
                continue;
            }
            let Some(actor) = client.actor else {
                continue;
            };
            let mapped = client.map_confirmed && !client.unmap_confirmed;
            let parent = self.scene.parent(actor);
            if past_desktop && mapped {
                if parent.is_some() {
                    // Careful not to pull applets or borrowed actors out of
                    // wherever they currently live.
                    if parent == Some(self.groups.home) || parent == Some(self.groups.app_top) {
                        self.scene.reparent(actor, self.groups.home_blur);
                    }
                    self.scene.raise_top(actor);
                }
            } else if parent == Some(self.groups.home_blur) || parent == Some(self.groups.app_top) {
                // Below the desktop, or no longer mapped: back into the
                // desktop arena.
                self.scene.reparent(actor, self.groups.home);
            }
        }

        // Walk the blurred group from the top. Anything above the topmost
        // maximized client must not be blurred, so it moves to the overlay;
        // the walk stops at the first client that covers what is below.
        let children: Vec<ActorId> = self.scene.children(self.groups.home_blur).to_vec();
        for &child in children.iter().rev() {
            if child == self.groups.home || child == self.groups.blur_front {
                continue;
            }
            if self.should_ignore_actor(child) {
                continue;
            }
            let geo = self.geo_for_current_screen(child);
            let Some(clipped) = geo.clipped_to_screen(screen) else {
                continue;
            };
            let maximized = self.client_is_maximized(geo);

            // In the home-edit-dialog state the background is always
            // blurred and anything maximized here is a dialog, so it too
            // belongs in the unblurred overlay.
            if !maximized || self.state == State::HomeEditDialog {
                self.scene.reparent(child, self.groups.app_top);
                self.scene.lower_bottom(child);
                self.scene.show(child);
            }

            // Maximized, or parked over the strip below the title bar:
            // everything beneath is occluded.
            if maximized
                || (clipped.width == screen.width && clipped.y + clipped.height == screen.height)
            {
                break;
            }
        }

        if self.scene.parent(self.groups.blur_front) == Some(self.groups.home_blur) {
            self.scene.raise_top(self.groups.blur_front);
        }

        // The order may have changed what needs blurring.
        self.update_blur_state();

        self.set_visibilities();

        // Visible-children diff; only visible members count on both sides.
        let now_visible: Vec<ActorId> = self
            .scene
            .children(self.groups.home_blur)
            .iter()
            .copied()
            .filter(|c| self.scene.is_visible(*c))
            .collect();
        if now_visible != previous {
            self.blurred_changed();
        }
    }

    /// Scan the stack and decide whether the background should blur, and
    /// whether the title-bar buttons blur with it.
    pub(crate) fn update_blur_state(&mut self) {
        let mut blur = false;
        let mut blur_buttons = false;
        let mut has_video_overlay = false;

        for id in self.wm.top_down() {
            let Some(client) = self.wm.get(id) else {
                continue;
            };
            if !client.map_confirmed || client.unmap_confirmed {
                continue;
            }

            // Once blurring, a video overlay anywhere underneath matters.
            if blur && client.has_video_overlay {
                has_video_overlay = true;
            }

            match client.kind {
                ClientKind::App => {
                    // A fullscreen application hides the top-left button
                    // and status area anyway; do not pull them forward.
                    if self.client_is_maximized(client.geometry) {
                        blur_buttons = true;
                    }
                    break;
                }
                ClientKind::Desktop => break,
                kind if kind.blurs_background() => {
                    // A maximized dialog (usually the virtual keyboard)
                    // lands in the overlay group unblurred and covers the
                    // top-left corner like a system modal would.
                    if self.client_is_maximized(client.geometry) {
                        blur_buttons = true;
                        break;
                    }
                    blur = true;
                    if client.has_modal_blocker {
                        blur_buttons = true;
                    }
                }
                _ => {}
            }

            if self.client_is_maximized(client.geometry) {
                break;
            }
        }

        let mut blur_flags = self.current_blur;
        let mut title_flags = self.title_bar.flags();

        // Blur cannot be composed with a video overlay.
        if blur && !has_video_overlay {
            blur_flags |= BlurFlags::BLUR_BACKGROUND;
        } else {
            blur_flags -= BlurFlags::BLUR_BACKGROUND;
        }

        if (blur && !blur_buttons) || self.state == State::TaskNav {
            title_flags |= TitleBarFlags::FOREGROUND;
        } else {
            title_flags -= TitleBarFlags::FOREGROUND;
        }

        if blur_flags != self.current_blur {
            self.set_blur(blur_flags);
        }
        self.title_bar.set_flags(title_flags);

        // Dim with the chequer pattern where blur is unavailable.
        self.blur_effect.chequer = blur && has_video_overlay;
    }
}
