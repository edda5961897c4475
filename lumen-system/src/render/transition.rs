//! The transition engine.
//!
//! A single timeline, owned by the state machine, drives the blur parameter
//! vector between discrete states. Starting it again interrupts any
//! in-flight animation: the current range values become the new starting
//! points, so an interrupted transition never snaps.

use super::state::BlurFlags;
use super::title_bar::TOP_MARGIN;
use super::{RenderManager, TimeMs};

use lumen_core::types::Point;

/// Maps raw timeline progress to eased progress.
pub type EasingFn = fn(f32) -> f32;

/// Easing shapes used by the shell's transitions.
pub mod easing {
    pub fn linear(t: f32) -> f32 {
        t
    }

    /// Smooth acceleration and deceleration.
    pub fn smooth_ramp(t: f32) -> f32 {
        t * t * (3.0 - 2.0 * t)
    }

    pub fn ease_in(t: f32) -> f32 {
        t * t
    }

    pub fn ease_out(t: f32) -> f32 {
        1.0 - (1.0 - t) * (1.0 - t)
    }

    /// Overshoots the target slightly before settling.
    pub fn overshoot(t: f32) -> f32 {
        const TENSION: f32 = 1.70158;
        let u = t - 1.0;
        u * u * ((TENSION + 1.0) * u + TENSION) + 1.0
    }
}

/// A restartable progress source over wall-clock milliseconds.
#[derive(Debug, Clone)]
pub struct Timeline {
    duration_ms: u32,
    started_at: Option<TimeMs>,
    easing: EasingFn,
}

impl Timeline {
    pub fn new(duration_ms: u32, easing: EasingFn) -> Self {
        Timeline {
            duration_ms,
            started_at: None,
            easing,
        }
    }

    /// Duration applies from the next `start`.
    pub fn set_duration(&mut self, duration_ms: u32) {
        self.duration_ms = duration_ms;
    }

    pub fn start(&mut self, now: TimeMs) {
        self.started_at = Some(now);
    }

    /// Stopping is idempotent.
    pub fn stop(&mut self) {
        self.started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Eased progress at `now`, clamped to `[0, 1]`. A stopped timeline
    /// reports `1.0`, and a zero duration completes immediately.
    pub fn progress(&self, now: TimeMs) -> f32 {
        let Some(started) = self.started_at else {
            return 1.0;
        };
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(started) as f32;
        let raw = (elapsed / self.duration_ms as f32).clamp(0.0, 1.0);
        (self.easing)(raw)
    }

    /// Whether the raw duration has elapsed at `now`.
    pub fn finished(&self, now: TimeMs) -> bool {
        match self.started_at {
            Some(started) => now.saturating_sub(started) >= self.duration_ms as TimeMs,
            None => true,
        }
    }
}

/// How stale the blur group's cached source texture is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFreshness {
    #[default]
    Clean,
    /// Contents changed but a rebuild can wait until blur is next needed.
    Hinted,
    /// Contents changed and the next frame must rebuild.
    Stale,
}

/// The visual parameters applied to the blur group each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct BlurGroupEffect {
    pub radius: f32,
    pub saturation: f32,
    pub brightness: f32,
    pub zoom: f32,
    /// Dim with a chequer pattern instead of blurring; blur cannot be
    /// composed with video overlays.
    pub chequer: bool,
    pub source: SourceFreshness,
}

impl Default for BlurGroupEffect {
    fn default() -> Self {
        BlurGroupEffect {
            radius: 0.0,
            saturation: 1.0,
            brightness: 1.0,
            zoom: 1.0,
            chequer: false,
            source: SourceFreshness::Clean,
        }
    }
}

impl RenderManager {
    /// Retarget the blur parameter vector for `flags` and start the
    /// transition timeline, unless every parameter is already in place.
    pub(crate) fn set_blur(&mut self, flags: BlurFlags) {
        if self.timeline_playing {
            self.timeline.stop();
            self.timeline_playing = false;
            self.effect_running = false;
        }

        self.current_blur = flags;

        // If a transition toward no blur was interrupted, force the blur
        // group to recompute; the first frame below writes the real value.
        if self.params.home_radius.target() == 0.0 && self.params.home_radius.current() != 0.0 {
            self.blur_effect.radius = 0.0;
        }

        self.params.retarget_defaults();

        let zoom_levels = flags.zoom_levels();

        if flags.blurs_home() {
            self.params
                .home_saturation
                .set_target(self.config.home.saturation);
            self.params
                .home_brightness
                .set_target(self.config.home.brightness);
            self.params.home_radius.set_target(if zoom_levels > 0 {
                self.config.home.radius_more
            } else {
                self.config.home.radius
            });
        }

        if zoom_levels > 0 {
            // The home layer zooms one step further per level; applets only
            // ever use their single configured zoom because they are faded
            // out beyond the first level anyway.
            let zoom = self.config.home.zoom;
            self.params
                .home_zoom
                .set_target(1.0 - (1.0 - zoom) * (zoom_levels + 1) as f32);
            self.params
                .applets_zoom
                .set_target(self.config.home.zoom_applets);
        }

        if flags.contains(BlurFlags::SHOW_TASK_NAV) {
            self.params.task_nav_opacity.set_target(1.0);
        }

        if flags.contains(BlurFlags::ZOOM_FOR_HOME) {
            self.params
                .task_nav_zoom
                .set_target(self.config.task_nav.zoom_for_home);
        } else if flags.contains(BlurFlags::ZOOM_FOR_LAUNCHER) {
            self.params.task_nav_zoom.set_target(self.config.task_nav.zoom);
        } else if flags.contains(BlurFlags::ZOOM_FOR_LAUNCHER_SUBMENU) {
            let z = self.config.task_nav.zoom;
            self.params.task_nav_zoom.set_target(1.0 - 2.0 * (1.0 - z));
        }

        if flags.contains(BlurFlags::SHOW_APPLETS) {
            // Show applets immediately; the unblurred image is fading in at
            // the same time and fading the applets with it reads as a
            // flicker. Fading them out later is fine and happens slowly.
            self.params.applets_opacity.set_start(1.0);
            self.params.applets_opacity.set_target(1.0);
        }

        // Evaluate one frame at t = 0 so nothing renders a stale value
        // before the timeline's first tick.
        self.transition_frame(0.0);

        if self.params.settled() {
            self.sync_after();
            return;
        }

        self.effect_running = true;
        self.timeline.set_duration(self.config.blur.duration);
        let now = self.clock;
        self.timeline.start(now);
        self.timeline_playing = true;
    }

    /// Apply one frame of the transition at eased progress `t`.
    pub(crate) fn transition_frame(&mut self, t: f32) {
        self.params.interpolate(t);

        self.blur_effect.radius = self.params.home_radius.current();
        self.blur_effect.saturation = self.params.home_saturation.current();
        self.blur_effect.brightness = self.params.home_brightness.current();
        self.blur_effect.zoom = self.params.home_zoom.current();

        let task_nav = self.groups.task_nav;
        let task_opacity = (self.params.task_nav_opacity.current() * 255.0) as u8;
        self.scene.set_opacity(task_nav, task_opacity);
        if task_opacity == 0 {
            self.scene.hide(task_nav);
            if let Some(image) = self.loading_image {
                // With the navigator faded out the loading screen may take
                // its place in front of the blur.
                let blur_front = self.groups.blur_front;
                let screen = self.comp.screen;
                self.scene.reparent(image, blur_front);
                self.scene
                    .set_size(image, screen.width, screen.height - TOP_MARGIN);
                let y = if self.loading_image_parent.is_some() {
                    0
                } else {
                    TOP_MARGIN
                };
                self.scene.set_position(image, 0, y);
                self.scene.show(image);
            }
        } else {
            self.scene.show(task_nav);
        }
        let tz = self.params.task_nav_zoom.current();
        self.scene.set_scale(task_nav, tz, tz);

        let home_front = self.groups.home_front;
        let applets_opacity = (self.params.applets_opacity.current() * 255.0) as u8;
        self.scene.set_opacity(home_front, applets_opacity);
        if applets_opacity == 0 {
            self.scene.hide(home_front);
        } else {
            self.scene.show(home_front);
        }
        // Scale the applet layer about the screen centre by moving its
        // anchor; setting gravity instead would break home view panning.
        let az = self.params.applets_zoom.current();
        self.scene.set_scale(home_front, az, az);
        let screen = self.comp.screen;
        self.scene.set_anchor(
            home_front,
            Point::new(
                -(screen.width as f32) * (1.0 - az) / 2.0,
                -(screen.height as f32) * (1.0 - az) / 2.0,
            ),
        );
    }

    /// Timeline completion: final bookkeeping and the completion signal.
    pub(crate) fn transition_completed(&mut self) {
        self.timeline_playing = false;
        self.effect_running = false;
        if let Some(actor) = self.task_nav.finish_zoom_out() {
            self.scene.unpin(actor);
        }
        self.signals.transition_complete.emit(&());
        self.sync_after();
    }

    /// Synchronously finish a playing transition, leaving every parameter
    /// at its target and the completion side effects applied.
    pub fn stop_transition(&mut self) {
        if self.timeline_playing {
            self.timeline.stop();
            self.transition_frame(1.0);
            self.transition_completed();
        }
    }

    /// Whether the transition timeline is running.
    pub fn in_transition(&self) -> bool {
        self.timeline_playing
    }

    /// Deepen or relax the background zoom for a launcher submenu.
    pub fn set_launcher_subview(&mut self, subview: bool) {
        if subview {
            self.set_blur(self.current_blur | BlurFlags::ZOOM_FOR_LAUNCHER_SUBMENU);
        } else {
            self.set_blur(self.current_blur - BlurFlags::ZOOM_FOR_LAUNCHER_SUBMENU);
        }
    }

    /// Reset background zoom while the task navigator zooms a thumbnail;
    /// the background keeps its blur but abandons every zoom level.
    pub fn unzoom_background(&mut self) {
        self.set_blur(BlurFlags::BLUR_HOME | BlurFlags::SHOW_TASK_NAV);
    }

    /// The blurred contents changed; decide between an eager source
    /// rebuild and a lazy hint.
    pub(crate) fn blurred_changed(&mut self) {
        use super::state::State;

        // Leaving home-edit for home swaps the applets between the front
        // and blurred layers, which reads badly unless refreshed eagerly.
        let force = self.previous_state == State::HomeEdit && self.state == State::Home;
        // In the loading screen the zooming image covers everything soon;
        // refreshing under it is wasted work.
        let force_not = self.state.is_loading();

        if (force || self.params.home_radius.target() != 0.0) && !force_not {
            self.blur_effect.source = SourceFreshness::Stale;
        } else if self.blur_effect.source == SourceFreshness::Clean {
            self.blur_effect.source = SourceFreshness::Hinted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped_and_monotonic() {
        let mut tl = Timeline::new(100, easing::linear);
        tl.start(1_000);
        assert_eq!(tl.progress(1_000), 0.0);
        assert_eq!(tl.progress(1_050), 0.5);
        assert_eq!(tl.progress(1_100), 1.0);
        assert_eq!(tl.progress(2_000), 1.0);
        assert!(tl.finished(1_100));
        assert!(!tl.finished(1_099));
    }

    #[test]
    fn stopped_timeline_reports_complete() {
        let mut tl = Timeline::new(100, easing::linear);
        tl.start(0);
        tl.stop();
        assert!(!tl.is_running());
        assert_eq!(tl.progress(50), 1.0);
        assert!(tl.finished(50));
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut tl = Timeline::new(0, easing::linear);
        tl.start(10);
        assert_eq!(tl.progress(10), 1.0);
        assert!(tl.finished(10));
    }

    #[test]
    fn easing_shapes_hit_both_endpoints() {
        for f in [
            easing::linear as EasingFn,
            easing::smooth_ramp,
            easing::ease_in,
            easing::ease_out,
            easing::overshoot,
        ] {
            assert!((f(0.0)).abs() < 1e-6);
            assert!((f(1.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn overshoot_exceeds_target_midway() {
        assert!(easing::overshoot(0.9) > 1.0);
    }
}
