//! Stage zoom, an accessibility aid.
//!
//! The whole stage scales up in small increments; the anchor point pans
//! the view and is clamped so the scaled stage always covers the screen.
//! While zoomed an input blocker is held (without its usual timeout) so
//! stray taps do not reach whatever lies under the magnified view.

use lumen_core::types::Point;

use super::state::State;
use super::RenderManager;

const ZOOM_INCREMENT: f32 = 0.1;
const MAX_ZOOM: f32 = 4.0;

#[derive(Debug, Default)]
pub(crate) struct StageZoom {
    pub zoomed: bool,
}

impl RenderManager {
    pub fn is_zoomed(&self) -> bool {
        self.stage_zoom.zoomed
    }

    /// Magnify one increment. Not available over the switcher or launcher.
    pub fn zoom_in(&mut self) {
        if matches!(self.state, State::TaskNav | State::Launcher) {
            tracing::warn!(state = %self.state, "stage zoom unavailable here");
            return;
        }
        let stage = self.scene.stage();
        let (sx, _) = self.scene.get(stage).map(|a| a.scale).unwrap_or((1.0, 1.0));
        if sx > MAX_ZOOM {
            return;
        }
        let next = sx + ZOOM_INCREMENT;
        self.scene.set_scale(stage, next, next);

        if !self.stage_zoom.zoomed {
            self.stage_zoom.zoomed = true;
            self.add_input_blocker();
        }

        if (next - 1.0).abs() < f32::EPSILON {
            self.unzoom_reset();
        }
    }

    /// Shrink one increment; reaching normal scale ends the zoom session.
    pub fn zoom_out(&mut self) {
        let stage = self.scene.stage();
        let (sx, _) = self.scene.get(stage).map(|a| a.scale).unwrap_or((1.0, 1.0));
        if sx <= 1.0 {
            self.unzoom();
            return;
        }
        self.stage_zoom.zoomed = true;
        let next = (sx - ZOOM_INCREMENT).max(1.0);
        self.scene.set_scale(stage, next, next);

        let anchor = self.scene.get(stage).map(|a| a.anchor).unwrap_or_default();
        let clamped = self.clamp_anchor(anchor, next);
        self.scene.set_anchor(stage, clamped);

        if next <= 1.0 {
            self.unzoom();
        }
    }

    /// Pan the magnified view; the anchor is clamped at the borders.
    pub fn pan_zoom(&mut self, dx: f32, dy: f32) {
        if !self.stage_zoom.zoomed {
            return;
        }
        let stage = self.scene.stage();
        let Some(actor) = self.scene.get(stage) else {
            return;
        };
        let (sx, _) = actor.scale;
        let anchor = Point::new(actor.anchor.x + dx, actor.anchor.y + dy);
        let clamped = self.clamp_anchor(anchor, sx);
        self.scene.set_anchor(stage, clamped);
    }

    /// Snap back to normal scale and release the blocker.
    pub fn unzoom(&mut self) {
        if self.stage_zoom.zoomed {
            let stage = self.scene.stage();
            self.scene.set_scale(stage, 1.0, 1.0);
            self.scene.set_anchor(stage, Point::new(0.0, 0.0));
            self.unzoom_reset();
        }
    }

    fn unzoom_reset(&mut self) {
        self.stage_zoom.zoomed = false;
        self.remove_input_blocker();
    }

    fn clamp_anchor(&self, anchor: Point<f32>, scale: f32) -> Point<f32> {
        let width = self.comp.screen.width as f32;
        let height = self.comp.screen.height as f32;
        Point::new(
            anchor.x.clamp(0.0, (width - width / scale).max(0.0)),
            anchor.y.clamp(0.0, (height - height / scale).max(0.0)),
        )
    }
}
