//! Compositor-side policy.
//!
//! The parts of the manager that talk about compositing as a whole rather
//! than about the scene: composition bypass (releasing the overlay so a
//! fullscreen opaque client owns the framebuffer), per-client
//! unredirection, the portrait decision over the visible stack, and the
//! handlers for the window manager's inbound events.

use std::path::PathBuf;

use lumen_core::types::{Rect, Size};
use lumen_core::utils::paths::app_state_dir;

use crate::render::state::State;
use crate::render::{RenderManager, TimeMs};
use crate::scene::ActorId;
use crate::wm::{Client, ClientId, ClientKind, NoteKind, WindowId};
use crate::xserver::StageBackground;

/// Property change notifications the engine interprets.
///
/// A `None` payload means the property is absent or carried the wrong
/// type; per the error policy that is treated as "inherit".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyEvent {
    /// *portrait-supported*: positive means the client renders in portrait.
    PortraitSupported(Option<i32>),
    /// *portrait-requested*: 0 none, 1 soft request, 2 and up a demand.
    PortraitRequested(Option<i32>),
    /// *non-composited-window*: opts into bypass when fullscreen.
    NonCompositedWindow(Option<i32>),
    /// *hibernable* presence.
    Hibernable(bool),
    /// *able-to-hibernate* presence.
    AbleToHibernate(bool),
    /// *do-not-disturb*: 1 suppresses notifications.
    DoNotDisturb(Option<i32>),
    /// Title-bar progress spinner toggled; repaint only.
    ProgressIndicator,
    /// Title-bar menu indicator toggled; repaint only.
    MenuIndicator,
}

/// Compositor-wide state.
pub struct CompState {
    /// Logical screen dimensions; swapped by rotation.
    pub screen: Size<i32>,
    /// Whether X compositing is on. False exactly in the bypass states.
    pub fs_comp: bool,
    /// Clock reading of the last confirmed map.
    pub last_map: Option<TimeMs>,
    pub do_not_disturb: bool,
    /// The client considered current for portrait and notification
    /// decisions; `None` while the switcher owns the screen.
    pub current_app: Option<ClientId>,
    /// Stamp file written once after the first successful map.
    pub stamp_path: Option<PathBuf>,
    pub stamp_written: bool,
    /// Orphaned actors of hibernated applications, pinned by name.
    hibernating: Vec<(String, ActorId)>,
}

impl CompState {
    pub fn new(screen: Size<i32>) -> Self {
        CompState {
            screen,
            fs_comp: true,
            last_map: None,
            do_not_disturb: false,
            current_app: None,
            stamp_path: app_state_dir().ok().map(|d| d.join("desktop-started.stamp")),
            stamp_written: false,
            hibernating: Vec::new(),
        }
    }
}

impl RenderManager {
    // ----------------------------------------------------------- geometry

    pub fn screen(&self) -> Size<i32> {
        self.comp.screen
    }

    /// Whether the screen itself is currently portrait.
    pub fn is_portrait_screen(&self) -> bool {
        self.comp.screen.height > self.comp.screen.width
    }

    /// Whether `geometry` covers the whole screen from the origin, in
    /// either orientation. A client covering the rotated screen counts:
    /// selecting it will rotate and everything makes sense again.
    pub fn client_is_maximized(&self, geometry: Rect) -> bool {
        if geometry.x != 0 || geometry.y != 0 {
            return false;
        }
        let screen = self.comp.screen;
        (geometry.width >= screen.width && geometry.height >= screen.height)
            || (geometry.width >= screen.height && geometry.height >= screen.width)
    }

    /// Milliseconds since the last confirmed map, if any.
    pub fn time_since_last_map(&self) -> Option<TimeMs> {
        self.comp.last_map.map(|t| self.clock.saturating_sub(t))
    }

    // ------------------------------------------------- composition bypass

    /// Bring the overlay in line with the state: composited states own the
    /// overlay window, bypass states release it and park the stage under
    /// the root, off screen.
    pub(crate) fn reset_overlay_shape(&mut self) {
        let want_fs_comp = !self.state.is_non_composited();
        if want_fs_comp == self.comp.fs_comp {
            return;
        }

        if want_fs_comp {
            // Recreate the overlay and move the stage back.
            self.x.set_stage_background(StageBackground::Unset);
            self.x.acquire_overlay();
            self.x.move_stage(0, 0);
            self.x.set_stage_background(StageBackground::Black);
            self.x.set_stage_shaped(false);
            tracing::debug!("compositing on, overlay recreated");
        } else {
            // Unset the background first; a black flash during the
            // reconfiguration is very visible.
            self.x.set_stage_background(StageBackground::Unset);
            self.x.set_stage_shaped(true);
            let height = self.comp.screen.height;
            self.x.reparent_stage_to_root(0, -height);
            self.x.set_stage_background(StageBackground::Black);
            self.x.release_overlay();
            tracing::debug!("compositing off, overlay released");
        }

        self.comp.fs_comp = want_fs_comp;
    }

    /// Whether compositing is currently on.
    pub fn compositing_enabled(&self) -> bool {
        self.comp.fs_comp
    }

    /// Stop redirecting the topmost fullscreen application so its pixels
    /// reach the framebuffer directly. `force` allows non-fullscreen
    /// clients; it backs the debugging shortcut.
    pub(crate) fn unredirect_topmost_client(&mut self, force: bool) {
        for id in self.wm.above_desktop_top_down() {
            let Some(client) = self.wm.get(id) else {
                continue;
            };
            if client.kind != ClientKind::App {
                continue;
            }
            if client.fullscreen || force {
                if !client.unredirected {
                    self.unredirect_client(id);
                }
                break;
            }
        }
    }

    pub(crate) fn unredirect_client(&mut self, id: ClientId) {
        let Some(client) = self.wm.get(id) else {
            return;
        };
        if client.unredirected {
            tracing::debug!(window = client.window.0, "already unredirected");
            return;
        }
        let window = client.window;
        self.x.track_damage(window, false);
        self.x.set_client_redirected(window, false);
        if let Some(client) = self.wm.get_mut(id) {
            client.unredirected = true;
        }
        tracing::debug!(window = window.0, "client unredirected");
    }

    /// Whether this client needs the compositor active above the bypass
    /// candidate (everything except the candidate kind itself does).
    fn client_prefers_compositing(&self, id: ClientId) -> bool {
        let Some(client) = self.wm.get(id) else {
            return false;
        };
        if client.kind != ClientKind::App {
            return true;
        }
        !(client.non_composited && client.fullscreen)
    }

    /// The application the user is looking at, falling back to the
    /// desktop.
    pub(crate) fn determine_current_app(&self) -> Option<ClientId> {
        for id in self.wm.top_down() {
            let Some(client) = self.wm.get(id) else {
                continue;
            };
            if client.kind == ClientKind::Desktop {
                break;
            }
            if client.kind != ClientKind::App {
                continue;
            }
            if client.unmap_confirmed {
                continue;
            }
            if !client.map_confirmed && !self.client_is_maximized(client.frame_geometry) {
                continue;
            }
            // systemui is not an application.
            if client.name.to_ascii_lowercase().starts_with("systemui") {
                continue;
            }
            return Some(id);
        }
        self.wm.desktop()
    }

    /// Decide whether to enter or leave bypass based on the current stack.
    pub fn reconsider_compositing(&mut self) {
        let state = self.state;
        let current = self.determine_current_app();
        let desktop = self.wm.desktop();

        let is_bypass_candidate = |rm: &Self, id: ClientId| {
            rm.wm
                .get(id)
                .map(|c| c.kind == ClientKind::App && c.non_composited && c.fullscreen)
                .unwrap_or(false)
        };

        if let Some(current) = current.filter(|c| Some(*c) != desktop) {
            if !self.is_rotating()
                && (state == State::App || state == State::AppPortrait)
                && is_bypass_candidate(self, current)
            {
                // Anything mapped above that wants compositing vetoes.
                let mut veto = false;
                let mut above = false;
                for id in self.wm.bottom_up() {
                    if id == current {
                        above = true;
                        continue;
                    }
                    if !above {
                        continue;
                    }
                    let mapped = self
                        .wm
                        .get(id)
                        .map(|c| c.map_confirmed && !c.unmap_confirmed)
                        .unwrap_or(false);
                    if mapped && self.client_prefers_compositing(id) {
                        veto = true;
                        break;
                    }
                }
                if !veto {
                    self.set_state(if state == State::App {
                        State::NonComposited
                    } else {
                        State::NonCompositedPortrait
                    });
                }
                return;
            }
        }

        if state.is_non_composited() {
            match current {
                Some(c) if Some(c) == desktop => self.set_state(State::Home),
                Some(c) => {
                    let mut veto = false;
                    let mut above = false;
                    for id in self.wm.bottom_up() {
                        if id == c {
                            above = true;
                            continue;
                        }
                        if !above {
                            continue;
                        }
                        let mapped = self
                            .wm
                            .get(id)
                            .map(|cl| cl.map_confirmed && !cl.unmap_confirmed)
                            .unwrap_or(false);
                        if mapped && self.client_prefers_compositing(id) {
                            veto = true;
                            break;
                        }
                    }
                    if veto || !is_bypass_candidate(self, c) {
                        self.set_state(if state == State::NonComposited {
                            State::App
                        } else {
                            State::AppPortrait
                        });
                    } else if !self.wm.get(c).map(|cl| cl.unredirected).unwrap_or(true) {
                        // The unredirected top client unmapped and exposed
                        // another bypass candidate still being composited.
                        self.unredirect_client(c);
                    }
                }
                None => {
                    tracing::warn!("in bypass with no application, recovering");
                    self.set_state(if state == State::NonComposited {
                        State::App
                    } else {
                        State::AppPortrait
                    });
                }
            }
        }
    }

    // -------------------------------------------------- portrait policy

    /// Does any visible client request portrait, with every concerned
    /// client prepared for it? `ignore` exempts a client that is about to
    /// disappear.
    pub(crate) fn should_be_portrait_ignoring(&mut self, ignore: Option<ClientId>) -> bool {
        // One wholesale invalidation of the inherited-flag caches.
        self.wm.bump_portrait_generation();

        let mut any_requests = false;
        for id in self.wm.above_desktop_top_down() {
            if Some(id) == ignore {
                continue;
            }
            let Some(client) = self.wm.get(id) else {
                continue;
            };
            match client.kind {
                // Blocked or assumed flexible; none of these veto.
                ClientKind::StatusArea
                | ClientKind::Menu
                | ClientKind::AppMenu
                | ClientKind::HomeApplet
                | ClientKind::Note(NoteKind::Banner)
                | ClientKind::Note(NoteKind::IncomingEventPreview) => continue,
                _ => {}
            }
            let fullscreen = client.fullscreen;

            // Invisible clients are ignored, except the current app: a
            // freshly launched client has no actor yet but still counts.
            if !self.is_client_visible(id) && self.comp.current_app != Some(id) {
                continue;
            }

            let (supported, requested) = self.wm.effective_portrait_flags(id);
            if !supported {
                return false;
            }
            any_requests |= requested != 0;

            // A demand, or a fullscreen requester, covers everything
            // underneath; stop scanning.
            if requested > 1 || (requested > 0 && fullscreen) {
                break;
            }
        }
        any_requests
    }

    pub fn should_be_portrait(&mut self) -> bool {
        self.should_be_portrait_ignoring(None)
    }

    /// Predictive rotation before a portrait client maps. Rotating early
    /// hides the relayout behind the map animation; a visible dissenting
    /// dialog or info note is a dealbreaker.
    pub fn portrait_forecast(&mut self) {
        let mut stay = self.is_rotating() || self.is_portrait_screen();
        if !stay {
            for id in self.wm.above_desktop_top_down() {
                let Some(client) = self.wm.get(id) else {
                    continue;
                };
                if !client.map_confirmed {
                    if client.portrait_on_map > 1 {
                        // A demanding client is coming; surrender.
                        break;
                    }
                    continue;
                }
                if client.transient_for.is_some() {
                    continue;
                }
                let kind = client.kind;
                let (supported, _) = self.wm.effective_portrait_flags(id);
                if supported {
                    continue;
                }
                if matches!(
                    kind,
                    ClientKind::Dialog
                        | ClientKind::Note(NoteKind::Info)
                        | ClientKind::Note(NoteKind::Confirmation)
                ) {
                    stay = true;
                    break;
                }
            }
        }
        if !stay {
            self.begin_screen_rotation(true);
        }
    }

    /// Re-derive the portrait/landscape state from the visible windows.
    /// Requires visibilities to be current. `mapped` is the client whose
    /// map triggered the call, if any.
    pub(crate) fn portrait_or_not_portrait(&mut self, mapped: Option<ClientId>) {
        // set_state() -> portrait/unportrait() -> restack() must not recurse.
        if self.is_changing_state() {
            return;
        }

        // Undo a portrait forecast that turned out wrong.
        if let Some(id) = mapped {
            let wants = self
                .wm
                .get(id)
                .map(|c| c.portrait_on_map > 0)
                .unwrap_or(false);
            if wants
                && !self.state.is_portrait()
                && self.is_rotating()
                && self.rotation_transition.to_portrait
                && !self.should_be_portrait()
            {
                self.begin_screen_rotation(false);
                return;
            }
        }

        if self.state.is_portrait() {
            if !self.should_be_portrait() {
                self.set_state_unportrait();
            }
        } else if self.state.is_portrait_capable() {
            if self.should_be_portrait() {
                self.set_state_portrait();
            }
        }
    }

    // ------------------------------------------------------ inbound events

    /// Adopt a client the window manager registered.
    pub fn client_registered(&mut self, mut client: Client) -> ClientId {
        if client.kind == ClientKind::Desktop && client.actor.is_none() {
            client.actor = Some(self.groups.home);
        }
        let window = client.window.0;
        let id = self.wm.insert(client);
        tracing::debug!(window, "client registered");
        self.queue_restack();
        id
    }

    /// A client's window was mapped.
    pub fn client_mapped(&mut self, id: ClientId) {
        let Some(client) = self.wm.get_mut(id) else {
            tracing::warn!("map event for an unknown client");
            return;
        };
        client.map_confirmed = true;
        client.unmap_confirmed = false;
        let kind = client.kind;
        // The actor covers the frame, decorations included; the window
        // geometry inside it only matters to the blur scan.
        let frame = client.frame_geometry;
        let name = client.name.clone();

        if self.wm.get(id).and_then(|c| c.actor).is_none() && kind != ClientKind::Desktop {
            let label = if name.is_empty() { "client" } else { name.as_str() };
            let actor = self.scene.create_actor(label);
            self.scene.set_geometry(actor, frame);
            self.scene.reparent(actor, self.groups.home);
            if let Some(client) = self.wm.get_mut(id) {
                client.actor = Some(actor);
            }
        }

        // A hibernated instance coming back releases its pinned actor.
        if let Some(at) = self.comp.hibernating.iter().position(|(n, _)| *n == name) {
            let (_, actor) = self.comp.hibernating.remove(at);
            self.scene.unpin(actor);
            tracing::debug!(app = %name, "hibernated application restored");
        }

        if kind == ClientKind::App {
            if let Some(actor) = self.wm.get(id).and_then(|c| c.actor) {
                self.task_nav.add_window(actor);
            }
        }

        self.comp.last_map = Some(self.clock);
        self.mark_desktop_started();

        // The window the input blocker was waiting for has arrived.
        if !self.stage_zoom.zoomed {
            self.remove_input_blocker();
        }

        self.queue_restack();
        self.reconsider_compositing();
        self.portrait_or_not_portrait(Some(id));
    }

    /// A client's window was unmapped.
    pub fn client_unmapped(&mut self, id: ClientId) {
        let Some(client) = self.wm.get_mut(id) else {
            return;
        };
        client.unmap_confirmed = true;
        let actor = client.actor;
        if let Some(actor) = actor {
            self.task_nav.remove_window(actor);
            if actor != self.groups.home {
                self.scene.hide(actor);
            }
        }

        // A dissenter disappearing may leave a rotation without cause.
        if self.is_rotating() && !self.should_be_portrait_ignoring(Some(id)) {
            self.begin_screen_rotation(false);
        }

        self.queue_restack();
        self.reconsider_compositing();
        self.portrait_or_not_portrait(None);
    }

    /// A client was withdrawn and unregistered.
    pub fn client_unregistered(&mut self, id: ClientId) {
        let Some(client) = self.wm.remove(id) else {
            return;
        };
        tracing::debug!(window = client.window.0, "client unregistered");

        if let Some(actor) = client.actor {
            if actor != self.groups.home {
                if client.able_to_hibernate && !client.name.is_empty() {
                    // Keep the actor alive, orphaned, until a restored map.
                    self.scene.pin(actor);
                    self.comp.hibernating.push((client.name.clone(), actor));
                }
                self.scene.destroy_actor(actor);
            }
        }

        if self.comp.current_app == Some(id) {
            self.comp.current_app = None;
        }

        if self.is_rotating() && !self.should_be_portrait() {
            self.begin_screen_rotation(false);
        }

        self.queue_restack();
        self.reconsider_compositing();
        self.portrait_or_not_portrait(None);
    }

    /// Interpret a property change on `window`.
    pub fn property_changed(&mut self, window: WindowId, event: PropertyEvent) {
        let Some(id) = self.wm.by_window(window) else {
            return;
        };
        match event {
            PropertyEvent::PortraitSupported(value) => {
                self.wm.set_portrait_supported(id, value);
                self.portrait_property_reconsider(value);
            }
            PropertyEvent::PortraitRequested(value) => {
                self.wm.set_portrait_requested(id, value);
                self.portrait_property_reconsider(value);
            }
            PropertyEvent::NonCompositedWindow(value) => {
                if let Some(client) = self.wm.get_mut(id) {
                    client.non_composited = value.unwrap_or(0) != 0;
                }
                self.reconsider_compositing();
            }
            PropertyEvent::Hibernable(present) => {
                if let Some(client) = self.wm.get_mut(id) {
                    client.hibernable = present;
                }
            }
            PropertyEvent::AbleToHibernate(present) => {
                if let Some(client) = self.wm.get_mut(id) {
                    client.able_to_hibernate = present;
                }
            }
            PropertyEvent::DoNotDisturb(value) => {
                if let Some(client) = self.wm.get_mut(id) {
                    client.do_not_disturb = value == Some(1);
                }
                self.check_do_not_disturb();
            }
            PropertyEvent::ProgressIndicator | PropertyEvent::MenuIndicator => {
                tracing::trace!(window = window.0, "title bar repaint only");
            }
        }
    }

    /// Switch state if the new property value warrants it. Skips the
    /// reconsideration when the value already approves the current mode.
    fn portrait_property_reconsider(&mut self, value: Option<i32>) {
        let value = value.unwrap_or(-1);
        if self.state.is_portrait() {
            if value <= 0 && !self.should_be_portrait() {
                self.set_state_unportrait();
            }
        } else if self.state.is_portrait_capable() {
            if value != 0 && self.should_be_portrait() {
                self.set_state_portrait();
            }
        }
    }

    fn check_do_not_disturb(&mut self) {
        let flag = self
            .comp
            .current_app
            .filter(|id| Some(*id) != self.wm.desktop())
            .and_then(|id| self.wm.get(id))
            .map(|c| c.do_not_disturb)
            .unwrap_or(false);
        if flag != self.comp.do_not_disturb {
            self.comp.do_not_disturb = flag;
            tracing::debug!(do_not_disturb = flag, "do-not-disturb changed");
        }
    }

    pub fn do_not_disturb(&self) -> bool {
        self.comp.do_not_disturb
    }

    /// Redirect (or disable, with `None`) the first-start stamp file.
    pub fn set_start_stamp_path(&mut self, path: Option<PathBuf>) {
        self.comp.stamp_path = path;
    }

    /// Record "the desktop has started" on the first successful map. Never
    /// fails; a write error costs a log line.
    fn mark_desktop_started(&mut self) {
        if self.comp.stamp_written {
            return;
        }
        self.comp.stamp_written = true;
        let Some(path) = self.comp.stamp_path.clone() else {
            return;
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(error = %e, "could not create the state directory");
                return;
            }
        }
        if let Err(e) = std::fs::write(&path, b"") {
            tracing::warn!(error = %e, path = %path.display(), "could not write the start stamp");
        }
    }
}
