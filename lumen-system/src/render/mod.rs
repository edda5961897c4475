//! The render manager: the shell's central state coordinator.
//!
//! One value of [`RenderManager`] owns the scene-graph arena, the mirror of
//! the window manager's client stack, and the display-server connection. It
//! is created once during startup and passed explicitly to collaborators;
//! event callbacks reach it through [`crate::handle::ShellHandle`].
//!
//! The logical scene tree it maintains:
//!
//! ```text
//! stage ─┬─ home_blur ─┬─ home (desktop) ── home_front (when not in front)
//!        │             ├─ app actors (blurred)
//!        │             └─ blur_front (while buttons blur with the rest)
//!        │                 ├─ edit button / operator / title bar
//!        │                 └─ home_front (when in front)
//!        ├─ blur_front (lifted out while its content must stay crisp)
//!        ├─ task_nav
//!        ├─ launcher
//!        ├─ app_top ── unblurred dialogs
//!        └─ front ── status menu, title-bar foreground
//! ```

pub mod input_blocker;
pub mod range;
pub mod stacking;
pub mod state;
pub mod task_nav;
pub mod title_bar;
pub mod transition;
pub mod viewport;
pub mod visibility;
pub mod zoom;

pub use state::{BlurFlags, State};

use lumen_core::types::{Rect, Rotation, Size};

use crate::comp::CompState;
use crate::config::TransitionConfig;
use crate::events::ShellSignals;
use crate::scene::{ActorId, SceneGraph};
use crate::wm::{ClientId, ClientKind, ClientStack, NoteKind};
use crate::xserver::XConnection;

use input_blocker::InputBlocker;
use range::BlurParams;
use task_nav::TaskNavigator;
use title_bar::{TitleBar, TitleBarFlags, TOP_MARGIN};
use transition::{easing, BlurGroupEffect, Timeline};
use viewport::ViewportState;
use zoom::StageZoom;

/// Milliseconds on the shell's monotonic clock.
pub type TimeMs = u64;

/// The fixed logical containers of the scene.
#[derive(Debug, Clone, Copy)]
pub struct SceneGroups {
    /// Blur, saturation, brightness and zoom apply to this group as one.
    pub home_blur: ActorId,
    /// Unblurred overlays: dialogs above the blurred content.
    pub app_top: ActorId,
    /// Always-on-top layer: status menu, title-bar foreground.
    pub front: ActorId,
    /// Title bar, edit button, operator; moves in and out of `home_blur`.
    pub blur_front: ActorId,
    pub task_nav: ActorId,
    pub launcher: ActorId,
    /// The desktop actor.
    pub home: ActorId,
    /// The applet layer; moves between `blur_front` and `home`.
    pub home_front: ActorId,
    pub edit_button: ActorId,
    pub title_bar: ActorId,
    pub operator: ActorId,
}

/// Progress of a screen rotation driven by the display transition.
#[derive(Debug, Default)]
pub(crate) struct RotationTransition {
    pub in_progress: bool,
    pub to_portrait: bool,
    /// State to enter once the rotation lands; `Undefined` means none.
    pub pending_state: State,
}

/// The render/state manager.
pub struct RenderManager {
    pub(crate) scene: SceneGraph,
    pub(crate) wm: ClientStack,
    pub(crate) x: Box<dyn XConnection>,
    pub(crate) config: TransitionConfig,
    pub(crate) signals: ShellSignals,
    pub(crate) groups: SceneGroups,

    pub(crate) state: State,
    pub(crate) previous_state: State,
    pub(crate) in_set_state: bool,

    pub(crate) current_blur: BlurFlags,
    pub(crate) params: BlurParams,
    pub(crate) timeline: Timeline,
    pub(crate) timeline_playing: bool,
    pub(crate) effect_running: bool,
    pub(crate) blur_effect: BlurGroupEffect,

    pub(crate) title_bar: TitleBar,
    pub(crate) status_area: Option<ActorId>,
    pub(crate) status_area_client: Option<ClientId>,
    pub(crate) status_menu: Option<ActorId>,
    pub(crate) loading_image: Option<ActorId>,
    pub(crate) loading_image_parent: Option<ActorId>,

    pub(crate) task_nav: TaskNavigator,

    pub(crate) viewport: ViewportState,
    pub(crate) input_blocker: InputBlocker,
    pub(crate) stage_zoom: StageZoom,

    pub(crate) rotation: Rotation,
    pub(crate) rotation_transition: RotationTransition,

    pub(crate) comp: CompState,
    pub(crate) restack_pending: bool,
    pub(crate) clock: TimeMs,
}

impl RenderManager {
    /// Build the manager and its fixed scene groups for a `screen`-sized
    /// display.
    pub fn new(x: Box<dyn XConnection>, config: TransitionConfig, screen: Size<i32>) -> Self {
        let mut scene = SceneGraph::new();
        let stage = scene.stage();
        scene.set_geometry(stage, Rect::from_size(screen));

        let home_blur = scene.create_actor("home_blur");
        let task_nav_group = scene.create_actor("task_nav");
        let launcher = scene.create_actor("launcher");
        let app_top = scene.create_actor("app_top");
        let front = scene.create_actor("front");
        for group in [home_blur, task_nav_group, launcher, app_top, front] {
            scene.reparent(group, stage);
            scene.set_geometry(group, Rect::from_size(screen));
        }
        scene.hide(task_nav_group);
        scene.set_opacity(task_nav_group, 0);
        scene.hide(launcher);

        let home = scene.create_actor("home");
        scene.reparent(home, home_blur);
        scene.set_geometry(home, Rect::from_size(screen));

        let blur_front = scene.create_actor("blur_front");
        scene.reparent(blur_front, home_blur);
        scene.set_geometry(blur_front, Rect::from_size(screen));

        let home_front = scene.create_actor("home_front");
        scene.reparent(home_front, home);
        scene.set_geometry(home_front, Rect::from_size(screen));

        let edit_button = scene.create_actor("edit_button");
        scene.reparent(edit_button, blur_front);
        scene.hide(edit_button);

        let operator = scene.create_actor("operator");
        scene.reparent(operator, blur_front);
        scene.hide(operator);

        let title_bar_actor = scene.create_actor("title_bar");
        scene.reparent(title_bar_actor, blur_front);
        scene.set_geometry(title_bar_actor, Rect::new(0, 0, screen.width, TOP_MARGIN));

        let groups = SceneGroups {
            home_blur,
            app_top,
            front,
            blur_front,
            task_nav: task_nav_group,
            launcher,
            home,
            home_front,
            edit_button,
            title_bar: title_bar_actor,
            operator,
        };

        RenderManager {
            scene,
            wm: ClientStack::new(),
            x,
            config,
            signals: ShellSignals::default(),
            groups,
            state: State::Undefined,
            previous_state: State::Undefined,
            in_set_state: false,
            current_blur: BlurFlags::empty(),
            params: BlurParams::default(),
            timeline: Timeline::new(250, easing::linear),
            timeline_playing: false,
            effect_running: false,
            blur_effect: BlurGroupEffect::default(),
            title_bar: TitleBar::default(),
            status_area: None,
            status_area_client: None,
            status_menu: None,
            loading_image: None,
            loading_image_parent: None,
            task_nav: TaskNavigator::default(),
            viewport: ViewportState::default(),
            input_blocker: InputBlocker::default(),
            stage_zoom: StageZoom::default(),
            rotation: Rotation::Rotate0,
            rotation_transition: RotationTransition::default(),
            comp: CompState::new(screen),
            restack_pending: false,
            clock: 0,
        }
    }

    // ----------------------------------------------------------- accessors

    pub fn state(&self) -> State {
        self.state
    }

    pub fn previous_state(&self) -> State {
        self.previous_state
    }

    /// Whether `set_state` is currently executing.
    pub fn is_changing_state(&self) -> bool {
        self.in_set_state
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn current_blur(&self) -> BlurFlags {
        self.current_blur
    }

    pub fn blur_params(&self) -> &BlurParams {
        &self.params
    }

    pub fn blur_effect(&self) -> &BlurGroupEffect {
        &self.blur_effect
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn groups(&self) -> &SceneGroups {
        &self.groups
    }

    pub fn clients(&self) -> &ClientStack {
        &self.wm
    }

    pub fn clients_mut(&mut self) -> &mut ClientStack {
        &mut self.wm
    }

    pub fn signals(&mut self) -> &mut ShellSignals {
        &mut self.signals
    }

    pub fn title_bar(&self) -> &TitleBar {
        &self.title_bar
    }

    pub fn task_navigator(&self) -> &TaskNavigator {
        &self.task_nav
    }

    pub fn task_navigator_mut(&mut self) -> &mut TaskNavigator {
        &mut self.task_nav
    }

    pub fn transitions_config(&self) -> &TransitionConfig {
        &self.config
    }

    /// Replace the transitions store; picked up by the next retarget.
    pub fn set_transitions_config(&mut self, config: TransitionConfig) {
        self.config = config;
    }

    /// Whether an actor is visible all the way up to the stage. The stage's
    /// own visibility is ignored; it is hidden while the display sleeps.
    pub fn actor_is_visible(&self, actor: ActorId) -> bool {
        self.scene.tree_visible(actor, self.scene.stage())
    }

    // ---------------------------------------------------------- scheduling

    /// Run deferred work up to `now`: coalesced restacks, the pending
    /// input-viewport flush (which outranks timeline frames), rotation
    /// completion, timeline frames, and the input-blocker timeout.
    pub fn dispatch(&mut self, now: TimeMs) {
        self.clock = now;

        self.flush_input_viewport();

        if self.restack_pending {
            self.restack_pending = false;
            self.restack();
        }

        if self.rotation_transition.in_progress {
            self.complete_rotation();
        }

        if self.timeline_playing {
            let t = self.timeline.progress(now);
            self.transition_frame(t);
            if self.timeline.finished(now) {
                self.timeline.stop();
                self.transition_completed();
            }
        }

        if let Some(deadline) = self.input_blocker.deadline {
            if now >= deadline {
                tracing::debug!("input blocker timed out before a window appeared");
                self.remove_input_blocker();
            }
        }
    }

    /// Request a restack; multiple requests coalesce into one run at the
    /// next dispatch.
    pub fn queue_restack(&mut self) {
        self.restack_pending = true;
    }

    // ------------------------------------------------------- state machine

    /// Transition to `target`.
    ///
    /// Never fails: a re-entrant call is rejected with a warning and a
    /// transition into the current state is a no-op. Entering `TaskNav`
    /// with nothing to show redirects home.
    pub fn set_state(&mut self, target: State) {
        tracing::debug!(from = %self.state, to = %target, "state change");

        if self.in_set_state {
            tracing::warn!(
                from = %self.state,
                to = %target,
                "state change ignored, already changing state"
            );
            return;
        }
        self.in_set_state = true;

        if target != self.state {
            let old = self.state;
            self.previous_state = old;
            self.state = target;
            let mut state = target;

            // Leaving bypass for anything but the sibling orientation:
            // redirect every client again and track damage so textures
            // refresh, then restack so the stale tree is rebuilt.
            if (old == State::NonComposited && state != State::NonCompositedPortrait)
                || (old == State::NonCompositedPortrait && state != State::NonComposited)
            {
                self.reset_overlay_shape();
                for id in self.wm.top_down() {
                    let Some(client) = self.wm.get(id) else {
                        continue;
                    };
                    let window = client.window;
                    if client.unredirected {
                        self.x.set_client_redirected(window, true);
                        if let Some(client) = self.wm.get_mut(id) {
                            client.unredirected = false;
                        }
                    }
                    self.x.track_damage(window, true);
                }
                self.restack();
            }

            // Return a borrowed loading image when leaving the loader.
            if old.is_loading() && self.loading_image.is_some() {
                self.set_loading(None);
            }

            if state == State::TaskNav {
                // Redirect home when the navigator has nothing to show or a
                // modal blocker owns input. From portrait the switch waits
                // for the rotation to land.
                let mut goto_now = false;
                let mut goto_later = false;
                if !self.task_nav.is_empty() && !self.wm.has_modal_blockers() {
                    if old.is_portrait() {
                        goto_later = true;
                    } else {
                        goto_now = true;
                    }
                }

                self.rotate_screen_and_change_state(if goto_later {
                    State::TaskNav
                } else {
                    State::Undefined
                });

                if !goto_now {
                    state = if goto_later && old == State::AppPortrait {
                        State::App
                    } else if old.is_portrait() {
                        State::HomePortrait
                    } else {
                        State::Home
                    };
                    self.state = state;
                    tracing::debug!(from = %old, to = %state, "task navigator unavailable, redirected");
                    if state == old {
                        self.in_set_state = false;
                        return;
                    }
                } else if let Some(window) = self
                    .wm
                    .desktop()
                    .and_then(|d| self.wm.get(d))
                    .map(|c| c.window)
                {
                    // Unfocus any applet.
                    self.x.focus_window(window);
                }
            } else {
                // Cancel any pending state switch a rotation was carrying.
                self.rotate_screen_and_change_state(State::Undefined);
            }

            if state.discard_preview_note() {
                for id in self.wm.top_down() {
                    let Some(client) = self.wm.get(id) else {
                        continue;
                    };
                    if client.kind == ClientKind::Note(NoteKind::IncomingEventPreview) {
                        let window = client.window;
                        if let Some(actor) = client.actor {
                            self.scene.hide(actor);
                        }
                        self.x.deliver_delete(window);
                    }
                }
            }

            if state.need_task_nav() {
                if old.is_app() {
                    // Zoom out of the focused application into its
                    // thumbnail; the actor is pinned until the animation
                    // lands so an unmap cannot pull it from under us.
                    if let Some(actor) = self.visible_main_app_actor() {
                        if self.task_nav.has_window(actor) {
                            self.scene.set_opacity(self.groups.task_nav, 255);
                            self.params.task_nav_opacity.set(1.0);
                            self.scene.pin(actor);
                            self.task_nav.begin_zoom_out(actor);
                        }
                    }
                } else if old != State::Launcher {
                    self.task_nav.scroll_back();
                }
            }

            if state == State::Launcher || state == State::HomeEdit {
                // Unfocus any applet.
                if let Some(window) = self
                    .wm
                    .desktop()
                    .and_then(|d| self.wm.get(d))
                    .map(|c| c.window)
                {
                    self.x.focus_window(window);
                }
            }

            if state.is_loading() {
                if let Some(image) = self.loading_image {
                    self.loading_image_parent = self.scene.parent(image);
                    let blur_front = self.groups.blur_front;
                    let screen = self.comp.screen;
                    self.scene.reparent(image, blur_front);
                    self.scene
                        .set_size(image, screen.width, screen.height - TOP_MARGIN);
                    self.scene.set_position(image, 0, TOP_MARGIN);
                    self.scene.show(image);
                }
            }

            if state.need_desktop() != old.need_desktop() {
                self.x.show_desktop(state.need_desktop());
            }

            if old == State::HomeEditDialog {
                // No edit dialogs may survive outside the edit-dialog state.
                for id in self.wm.top_down() {
                    let Some(client) = self.wm.get(id) else {
                        continue;
                    };
                    if client.home_edit_dialog {
                        let window = client.window;
                        self.x.deliver_delete(window);
                    }
                }
            }

            // Divert into the portrait sibling when visible clients demand
            // it; allows APP_PORTRAIT <=> HOME_PORTRAIT directly.
            if ((old != State::AppPortrait && state == State::App)
                || (old != State::HomePortrait && state == State::Home))
                && self.should_be_portrait()
            {
                tracing::debug!(to = %state, "diverting into portrait mode");
                self.in_set_state = false;
                self.set_state(if state == State::App {
                    State::AppPortrait
                } else {
                    State::HomePortrait
                });
                return;
            }

            self.sync_before();

            if old.is_portrait() != state.is_portrait() {
                self.begin_screen_rotation(state.is_portrait());
            }

            // Track the current-application marker across the switcher.
            if state == State::TaskNav {
                self.comp.current_app = None;
            } else if old == State::TaskNav && !state.is_app() {
                self.comp.current_app = self.wm.desktop();
            }

            let new_state = self.state;
            self.signals.state_changed.emit(&new_state);

            if (state == State::App || state == State::AppPortrait || state == State::HomeEditDialog)
                && !self.rotation_will_change_state()
            {
                // Queue a restack so blur reflects the new stacking;
                // HomeEditDialog needs it for a fullscreen dialog mapped
                // straight into the state.
                self.queue_restack();
            }

            if old == State::App && state == State::TaskNav {
                // Snap the vignette (dim, desaturate, blur) to its final
                // values so only the zoom visibly animates while the app
                // recedes into its thumbnail.
                let b = self.params.home_brightness.target();
                self.params.home_brightness.set(b);
                let s = self.params.home_saturation.target();
                self.params.home_saturation.set(s);
                let r = self.params.home_radius.target();
                self.params.home_radius.set(r);
                let t = self.timeline.progress(self.clock);
                self.transition_frame(t);
            }

            if state.is_non_composited() {
                self.reset_overlay_shape();
                self.unredirect_topmost_client(false);
            }
        }

        self.in_set_state = false;
    }

    /// Lift the current state to its portrait sibling.
    ///
    /// Ignored with a warning if the current state has none. From bypass
    /// the rotation happens composited: bypass is left first and re-entered
    /// by the compositing reconsideration once rotated.
    pub fn set_state_portrait(&mut self) {
        if !self.state.is_portrait_capable() {
            tracing::warn!(state = %self.state, "state is not portrait capable");
            return;
        }
        match self.state {
            State::App => self.set_state(State::AppPortrait),
            State::NonComposited => {
                self.set_state(State::App);
                self.set_state(State::AppPortrait);
            }
            _ => self.set_state(State::HomePortrait),
        }
    }

    /// Project the current portrait state back to landscape.
    pub fn set_state_unportrait(&mut self) {
        if !self.state.is_portrait() {
            tracing::warn!(state = %self.state, "state is not portrait");
            return;
        }
        match self.state {
            State::AppPortrait => self.set_state(State::App),
            State::NonCompositedPortrait => {
                self.set_state(State::AppPortrait);
                self.set_state(State::App);
            }
            _ => self.set_state(State::Home),
        }
    }

    /// Re-evaluate every state-derived piece of the scene; used when an
    /// external collaborator (the task navigator, the title bar) changes
    /// under an unchanged state.
    pub fn update(&mut self) {
        self.sync_before();
    }

    // ----------------------------------------------------- sync with scene

    /// The scene synchronization performed before a transition starts.
    pub(crate) fn sync_before(&mut self) {
        let mut btn = self.title_bar.flags()
            - (TitleBarFlags::LEFT_MASK
                | TitleBarFlags::RIGHT_MASK
                | TitleBarFlags::FOREGROUND
                | TitleBarFlags::SMALL_BUTTONS);
        // Only BLUR_BACKGROUND survives a transition; it belongs to the
        // stacking scan, not the state.
        let mut blur = self.current_blur & BlurFlags::BLUR_BACKGROUND;
        let mut blurred_changed = false;

        if self.state.show_applets() {
            blur |= BlurFlags::SHOW_APPLETS;
        }

        match self.state {
            State::Undefined => {
                tracing::error!("syncing while in the undefined state");
                return;
            }
            State::Home | State::HomePortrait => {
                if self.state == State::Home {
                    blur |= BlurFlags::ZOOM_FOR_HOME;
                }
                btn |= if self.task_nav.is_empty() {
                    TitleBarFlags::BTN_LAUNCHER
                } else {
                    TitleBarFlags::BTN_SWITCHER
                };
                self.scene.show(self.groups.home);
            }
            State::HomeEdit | State::HomeEditDialog => {
                if self.state == State::HomeEdit {
                    blur |= BlurFlags::BLUR_HOME;
                }
                self.scene.show(self.groups.home);
            }
            State::Loading | State::LoadingSubwindow => {
                btn |= if self.task_nav.is_empty() {
                    TitleBarFlags::BTN_LAUNCHER
                } else {
                    TitleBarFlags::BTN_SWITCHER
                };
                self.scene.show(self.groups.home);
                // Launching out of the launcher keeps its blur; the
                // background must not sharpen mid-launch.
                if self.previous_state == State::Launcher {
                    blur |= BlurFlags::BLUR_HOME;
                }
            }
            State::App | State::AppPortrait => {
                btn |= TitleBarFlags::BTN_SWITCHER;
                self.scene.hide(self.groups.home);
            }
            State::TaskNav => {
                btn |= TitleBarFlags::BTN_LAUNCHER;
                self.scene.show(self.groups.home);
                blur |= BlurFlags::BLUR_HOME
                    | BlurFlags::ZOOM_FOR_TASK_NAV
                    | BlurFlags::SHOW_TASK_NAV;
            }
            State::Launcher => {
                self.scene.show(self.groups.home);
                blur |= BlurFlags::BLUR_HOME | BlurFlags::ZOOM_FOR_LAUNCHER;
                if self.previous_state == State::TaskNav {
                    blur |= BlurFlags::ZOOM_FOR_TASK_NAV;
                }
            }
            State::NonComposited | State::NonCompositedPortrait => {
                self.scene.hide(self.groups.home);
            }
        }

        self.scene.show(self.groups.home_blur);
        self.scene.show(self.groups.app_top);
        self.scene.show(self.groups.front);
        self.scene.raise_top(self.groups.app_top);
        self.scene.raise_top(self.groups.front);

        if self.state.is_portrait() {
            btn |= TitleBarFlags::SMALL_BUTTONS;
        }

        if self.state.show_operator() {
            self.scene.show(self.groups.operator);
        } else {
            self.scene.hide(self.groups.operator);
        }

        if let Some(status_area) = self.status_area {
            if self.state.show_status_area() {
                self.scene.show(status_area);
                self.scene.raise_top(status_area);
            } else {
                self.scene.hide(status_area);
            }
        }

        if self.state.toolbar_foreground() {
            btn |= TitleBarFlags::FOREGROUND;
        }

        if let Some(menu) = self.status_menu {
            self.scene.raise_top(menu);
        }

        // Lift the title-bar layer out of the blur group so it stays crisp
        // while everything behind it blurs.
        let stage = self.scene.stage();
        if !self.state.blur_buttons() && self.scene.parent(self.groups.blur_front) != Some(stage) {
            self.scene.reparent(self.groups.blur_front, stage);
            self.scene.lower_below(self.groups.blur_front, self.groups.task_nav);
            blurred_changed = true;
        }

        // Applet layer placement.
        let home_front = self.groups.home_front;
        if self.state.home_front() {
            if self.scene.parent(home_front) != Some(self.groups.blur_front) {
                self.scene.reparent(home_front, self.groups.blur_front);
                blurred_changed = true;
            }
            self.scene.lower_bottom(home_front);
        } else if self.scene.parent(home_front) != Some(self.groups.home) {
            self.scene.reparent(home_front, self.groups.home);
            blurred_changed = true;
        }

        self.title_bar.set_flags(btn);
        self.place_titlebar_elements();

        if self.state != State::Home {
            self.scene.hide(self.groups.edit_button);
        }

        // Crossing the app/non-app edge can leave the status area parked
        // off screen; recompute visibilities to pull it back.
        if self.state.is_app() != self.previous_state.is_app()
            || self.previous_state.is_non_composited()
        {
            self.set_visibilities();
        }

        self.set_input_viewport();

        self.title_bar.set_left_pressed(false);

        self.set_blur(blur);
        // The stacking scan may want BLUR_BACKGROUND back (a dialog may be
        // showing); recompute rather than trusting the state alone.
        self.update_blur_state();

        if blurred_changed {
            self.blurred_changed();
        }
    }

    /// The scene synchronization performed after the transition completes.
    pub(crate) fn sync_after(&mut self) {
        if self.state.blur_buttons()
            && self.scene.parent(self.groups.blur_front) != Some(self.groups.home_blur)
        {
            self.scene.reparent(self.groups.blur_front, self.groups.home_blur);
            self.scene.raise_top(self.groups.blur_front);
            self.blurred_changed();
        }
    }

    // ------------------------------------------------------------ rotation

    /// Store a new rotation, notifying the `rotation` property and the
    /// `rotated` channel (which the home layout hook subscribes to).
    pub fn set_rotation(&mut self, rotation: Rotation) {
        if self.rotation != rotation {
            self.rotation = rotation;
            self.signals.rotation_changed.emit(&rotation);
            self.signals.rotated.emit(&rotation);
        }
    }

    /// Start the screen rotation transition: swap the logical dimensions,
    /// keep input routed correctly through the blackout, and publish the
    /// new rotation. The pixel rotation itself belongs to the display
    /// transition; its completion is observed at the next dispatch.
    pub(crate) fn begin_screen_rotation(&mut self, to_portrait: bool) {
        if self.rotation_transition.in_progress && self.rotation_transition.to_portrait == to_portrait
        {
            return;
        }
        tracing::debug!(to_portrait, "screen rotation started");
        self.rotation_transition.in_progress = true;
        self.rotation_transition.to_portrait = to_portrait;

        self.flip_input_viewport();

        let currently_portrait = self.comp.screen.height > self.comp.screen.width;
        if currently_portrait != to_portrait {
            self.comp.screen = self.comp.screen.transposed();
            self.resize_groups_to_screen();
        }

        self.set_rotation(if to_portrait {
            Rotation::Rotate90
        } else {
            Rotation::Rotate0
        });
    }

    fn complete_rotation(&mut self) {
        self.rotation_transition.in_progress = false;
        let pending = std::mem::replace(&mut self.rotation_transition.pending_state, State::Undefined);
        if pending != State::Undefined {
            tracing::debug!(state = %pending, "rotation landed, entering pending state");
            self.set_state(pending);
        }
    }

    /// Arrange for `state` to be entered when the running rotation lands;
    /// `Undefined` cancels a previous arrangement.
    pub(crate) fn rotate_screen_and_change_state(&mut self, state: State) {
        self.rotation_transition.pending_state = state;
    }

    pub(crate) fn rotation_will_change_state(&self) -> bool {
        self.rotation_transition.pending_state != State::Undefined
    }

    pub fn is_rotating(&self) -> bool {
        self.rotation_transition.in_progress
    }

    fn resize_groups_to_screen(&mut self) {
        let screen = self.comp.screen;
        let stage = self.scene.stage();
        for actor in [
            stage,
            self.groups.home_blur,
            self.groups.app_top,
            self.groups.front,
            self.groups.blur_front,
            self.groups.task_nav,
            self.groups.launcher,
            self.groups.home,
            self.groups.home_front,
        ] {
            self.scene.set_geometry(actor, Rect::from_size(screen));
        }
        self.scene
            .set_geometry(self.groups.title_bar, Rect::new(0, 0, screen.width, TOP_MARGIN));
    }

    // ----------------------------------------------- titlebar and fixtures

    /// Lay out the status area and operator logo after the left button.
    pub fn place_titlebar_elements(&mut self) {
        let mut x = 0;
        // Button visibility follows the state flags, not actor visibility;
        // actors may only catch up on the next idle.
        if self.title_bar.flags().has_left_button() {
            x += title_bar::LEFT_BTN_WIDTH;
        }

        if let (Some(status_area), Some(client_id)) = (self.status_area, self.status_area_client) {
            if self.scene.is_visible(status_area) {
                let width = self
                    .wm
                    .get(client_id)
                    .map(|c| c.frame_geometry.width)
                    .unwrap_or(0);
                if let Some(client) = self.wm.get_mut(client_id) {
                    if client.frame_geometry.x != x {
                        client.frame_geometry.x = x;
                        client.geometry.x = x;
                    }
                }
                self.scene.set_position(status_area, x, self.scene.geometry(status_area).y);
                x += width.max(0);
            }
        }

        if self.scene.is_visible(self.groups.operator) {
            let y = self.scene.geometry(self.groups.operator).y;
            let operator = self.groups.operator;
            self.scene.set_position(operator, title_bar::OPERATOR_PADDING + x, y);
        }
    }

    /// Adopt (or drop) the status area actor and its client.
    pub fn set_status_area(&mut self, item: Option<(ActorId, ClientId)>) {
        match item {
            Some((actor, client)) => {
                self.status_area = Some(actor);
                self.status_area_client = Some(client);
                self.scene.reparent(actor, self.groups.title_bar);
                // Reactive so a click on it while grabbed does not fall
                // through to the background.
                if let Some(a) = self.scene.get_mut(actor) {
                    a.reactive = true;
                }
            }
            None => {
                self.status_area = None;
                self.status_area_client = None;
            }
        }
        self.place_titlebar_elements();
    }

    pub fn set_status_menu(&mut self, item: Option<ActorId>) {
        self.status_menu = item;
        if let Some(menu) = item {
            self.scene.reparent(menu, self.groups.front);
            self.scene.raise_top(menu);
        }
    }

    /// Borrow (or give back) the loading screen image.
    ///
    /// The image's previous parent is remembered and restored when the
    /// image is replaced or the loading state exits. Clearing it while an
    /// application is up fades it out rather than popping.
    pub fn set_loading(&mut self, item: Option<ActorId>) {
        if self.loading_image == item {
            return;
        }
        if let Some(image) = self.loading_image.take() {
            if let Some(parent) = self.loading_image_parent.take() {
                self.scene.reparent(image, parent);
            } else if self.scene.parent(image).is_some() {
                self.scene.unparent(image);
                if item.is_none() && self.state.is_app() {
                    tracing::debug!(
                        duration_ms = self.config.launcher_glow.duration_out,
                        "fading out the loading screen"
                    );
                }
            }
        }
        self.loading_image = item;
    }

    pub fn show_edit_button(&mut self) {
        let button = self.groups.edit_button;
        self.scene.show(button);
    }

    pub fn hide_edit_button(&mut self) {
        let button = self.groups.edit_button;
        self.scene.hide(button);
    }

    /// Reparent an item into the always-on-top layer.
    pub fn add_to_front_group(&mut self, item: ActorId) {
        self.scene.reparent(item, self.groups.front);
    }

    /// Return an application actor to the blurred layer, hidden at the
    /// bottom; used when the navigator or an effect hands one back.
    pub fn return_app(&mut self, actor: ActorId) {
        // Only adopt an actor that still has a parent; a parentless one
        // belongs to a client that is already being torn down.
        if self.scene.parent(actor).is_some() {
            self.scene.reparent(actor, self.groups.home_blur);
            self.scene.lower_bottom(actor);
            self.scene.hide(actor);
        }
    }

    /// Same for dialogs, which live in the unblurred overlay.
    pub fn return_dialog(&mut self, actor: ActorId) {
        self.scene.reparent(actor, self.groups.app_top);
        self.scene.hide(actor);
    }

    // ------------------------------------------------------------- helpers

    /// The topmost visible application actor, if any.
    pub(crate) fn visible_main_app_actor(&self) -> Option<ActorId> {
        for id in self.wm.top_down() {
            let Some(client) = self.wm.get(id) else {
                continue;
            };
            if client.kind == ClientKind::Desktop {
                break;
            }
            if client.kind != ClientKind::App || !client.map_confirmed || client.unmap_confirmed {
                continue;
            }
            if let Some(actor) = client.actor {
                if self.scene.is_visible(actor) {
                    return Some(actor);
                }
            }
        }
        None
    }

    /// Whether a client's actor is visible in the scene sense. Always false
    /// in bypass, where the compositor's tree is not what is on screen.
    pub fn is_client_visible(&self, id: ClientId) -> bool {
        if self.state.is_non_composited() {
            return false;
        }
        let Some(actor) = self.wm.get(id).and_then(|c| c.actor) else {
            return false;
        };
        self.actor_is_visible(actor)
    }

    /// Whether the stacking engines must leave this actor alone.
    pub(crate) fn should_ignore_actor(&self, actor: ActorId) -> bool {
        self.wm
            .by_actor(actor)
            .and_then(|id| self.wm.get(id))
            .map(|c| c.self_stacking)
            .unwrap_or(false)
    }

    /// Whether the actor can occlude what is under it.
    pub(crate) fn actor_opaque(&self, actor: ActorId) -> bool {
        self.wm
            .by_actor(actor)
            .and_then(|id| self.wm.get(id))
            .map(|c| c.is_opaque())
            .unwrap_or(false)
    }
}
