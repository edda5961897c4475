//! The visibility engine.
//!
//! After every restack the scene carries actors the user cannot see
//! because something opaque covers them; hiding those saves the renderer
//! real work on this hardware. Visibility of a rectangle is decided by
//! clipping it against an accumulated list of opaque blocker rectangles.

use lumen_core::types::Rect;

use super::state::State;
use super::RenderManager;

/// Whether any part of `rect` survives the blockers.
///
/// For each blocker that spans the rectangle horizontally the rectangle is
/// clipped in Y; a blocker that splits it in two recurses on the upper half
/// and continues with the lower. A blocker that does not cover the full
/// width cannot hide the rectangle and is skipped.
fn visible_against(blockers: &[Rect], mut rect: Rect) -> bool {
    for (i, blocker) in blockers.iter().enumerate() {
        if !(blocker.x <= rect.x && rect.right() <= blocker.right()) {
            continue;
        }

        let rect_bottom = rect.bottom();
        let blocker_bottom = blocker.bottom();

        if rect.y < blocker.y {
            if rect_bottom < blocker.y {
                // Entirely above.
                continue;
            }
            if rect_bottom < blocker_bottom {
                // Lower part covered; keep the top.
                rect.height -= rect_bottom - blocker.y;
            } else {
                // Split in two by the blocker.
                let mut upper = rect;
                upper.height = blocker.y - rect.y;
                if visible_against(&blockers[i..], upper) {
                    return true;
                }
                rect.y = blocker_bottom;
                rect.height = rect_bottom - blocker_bottom;
            }
        } else if rect.y < blocker_bottom {
            if rect_bottom <= blocker_bottom {
                // Confined inside the blocker.
                return false;
            }
            // Upper part covered; keep the bottom.
            rect.height -= blocker_bottom - rect.y;
            rect.y = blocker_bottom;
        }
        // Else entirely below this blocker.

        if rect.is_empty() {
            return false;
        }
    }
    true
}

impl RenderManager {
    /// Whether `rect` is visible against `blockers` on the current screen.
    /// Everything is invisible in bypass, where the scene is not shown.
    pub(crate) fn rect_visible(&self, blockers: &[Rect], rect: Rect) -> bool {
        if self.state.is_non_composited() {
            return false;
        }
        let Some(rect) = rect.clipped_to_screen(self.comp.screen) else {
            return false;
        };
        visible_against(blockers, rect)
    }

    /// Recompute per-actor visibility and refresh the input viewport.
    pub fn set_visibilities(&mut self) {
        if self.state.is_non_composited() {
            self.set_input_viewport();
            return;
        }

        let screen = self.comp.screen;
        let mut blockers: Vec<Rect> = Vec::new();

        // The unblurred overlays block first.
        for child in self.scene.children(self.groups.app_top).to_vec() {
            if self.actor_opaque(child) {
                let geo = self.geo_for_current_screen(child);
                if let Some(clipped) = geo.clipped_to_screen(screen) {
                    blockers.push(clipped);
                }
            }
        }

        // If they already cover the whole screen there is no point in
        // rendering (or blurring) anything behind them.
        let fullscreen = Rect::from_size(screen);
        if self.rect_visible(&blockers, fullscreen) {
            self.scene.show(self.groups.home_blur);
        } else {
            self.scene.hide(self.groups.home_blur);
        }

        // Walk the blurred group top-down, accumulating opaque geometry.
        let children: Vec<_> = self.scene.children(self.groups.home_blur).to_vec();
        for &child in children.iter().rev() {
            if child == self.groups.blur_front {
                continue;
            }
            if self.should_ignore_actor(child) {
                continue;
            }
            let geo = self.geo_for_current_screen(child);
            if self.rect_visible(&blockers, geo) {
                self.scene.show(child);
                if self.actor_opaque(child) {
                    if let Some(clipped) = geo.clipped_to_screen(screen) {
                        blockers.push(clipped);
                    }
                }
            } else if !self.rotation_transition.in_progress {
                // Mid-rotation an actor on its way out stays visible; a
                // one-frame hide reads as flicker.
                self.scene.hide(child);
            }
        }

        // A fullscreen client hides the title-bar layer entirely and parks
        // the status area off screen so it cannot be clicked.
        let mut has_fullscreen = false;
        if self.state.is_app() || matches!(self.state, State::Home | State::HomePortrait) {
            for id in self.wm.top_down() {
                let Some(client) = self.wm.get(id) else {
                    continue;
                };
                if client.actor.is_none() || client.desktop_index.is_none() {
                    continue;
                }
                if !self.is_client_visible(id) {
                    continue;
                }
                if client.fullscreen {
                    has_fullscreen = true;
                    break;
                }
            }
        }

        if has_fullscreen {
            self.scene.hide(self.groups.blur_front);
            if let Some(id) = self.status_area_client {
                if let Some(client) = self.wm.get_mut(id) {
                    if client.frame_geometry.y >= 0 {
                        client.frame_geometry.y = -client.frame_geometry.height;
                        client.geometry.y = -client.geometry.height;
                    }
                }
            }
        } else {
            self.scene.show(self.groups.blur_front);
            let mut restored = false;
            if let Some(id) = self.status_area_client {
                if let Some(client) = self.wm.get_mut(id) {
                    if client.frame_geometry.y < 0 {
                        client.frame_geometry.y = 0;
                        client.geometry.y = 0;
                        restored = true;
                    }
                }
            }
            if restored {
                // Status-area visibility moved; the title bar reflows.
                self.place_titlebar_elements();
            }
        }

        self.set_input_viewport();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const W: i32 = 800;
    const H: i32 = 480;

    fn screen_rect() -> Rect {
        Rect::new(0, 0, W, H)
    }

    #[test]
    fn no_blockers_means_visible() {
        assert!(visible_against(&[], screen_rect()));
    }

    #[test]
    fn full_cover_hides() {
        assert!(!visible_against(&[screen_rect()], screen_rect()));
        assert!(!visible_against(&[screen_rect()], Rect::new(100, 100, 50, 50)));
    }

    #[test]
    fn partial_cover_leaves_the_rest_visible() {
        // Blocker covers the lower half.
        let blockers = [Rect::new(0, 240, W, 240)];
        assert!(visible_against(&blockers, screen_rect()));
        assert!(!visible_against(&blockers, Rect::new(0, 300, W, 100)));
    }

    #[test]
    fn split_by_a_horizontal_band_recurses_both_halves() {
        // A band across the middle; the rect pokes out above and below.
        let blockers = [Rect::new(0, 200, W, 80)];
        assert!(visible_against(&blockers, Rect::new(0, 100, W, 300)));
        // Two bands covering everything the rect spans.
        let both = [Rect::new(0, 100, W, 180), Rect::new(0, 280, W, 120)];
        assert!(!visible_against(&both, Rect::new(0, 100, W, 300)));
    }

    #[test]
    fn narrow_blocker_cannot_hide() {
        // Does not span the rect horizontally, so it is ignored.
        let blockers = [Rect::new(100, 0, 200, H)];
        assert!(visible_against(&blockers, screen_rect()));
    }

    #[test]
    fn union_of_side_by_side_blockers_does_not_hide_alone() {
        // Neither blocker spans the width by itself; the engine errs on
        // the visible side by design.
        let blockers = [Rect::new(0, 0, 400, H), Rect::new(400, 0, 400, H)];
        assert!(visible_against(&blockers, screen_rect()));
        assert_eq!(
            visible_against(&blockers, Rect::new(0, 0, 400, H)),
            false
        );
    }
}
