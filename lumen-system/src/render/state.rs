//! The global UI state and its derived predicates.

use bitflags::bitflags;
use std::fmt;

/// The thirteen UI states.
///
/// Portrait variants exist only for the states that can rotate; everything
/// else is landscape by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
    /// Only valid before the first transition.
    #[default]
    Undefined,
    Home,
    HomeEdit,
    HomeEditDialog,
    HomePortrait,
    App,
    AppPortrait,
    TaskNav,
    Launcher,
    NonComposited,
    NonCompositedPortrait,
    Loading,
    LoadingSubwindow,
}

impl State {
    /// An application owns the screen.
    pub fn is_app(self) -> bool {
        matches!(self, State::App | State::AppPortrait)
    }

    /// The display is rotated 90 degrees.
    pub fn is_portrait(self) -> bool {
        matches!(
            self,
            State::HomePortrait | State::AppPortrait | State::NonCompositedPortrait
        )
    }

    /// The state has a portrait sibling to lift into.
    pub fn is_portrait_capable(self) -> bool {
        self.is_app() || matches!(self, State::Home | State::NonComposited)
    }

    pub fn is_loading(self) -> bool {
        matches!(self, State::Loading | State::LoadingSubwindow)
    }

    /// Compositing is bypassed.
    pub fn is_non_composited(self) -> bool {
        matches!(self, State::NonComposited | State::NonCompositedPortrait)
    }

    pub fn need_task_nav(self) -> bool {
        self == State::TaskNav
    }

    /// The desktop must be shown behind everything else.
    pub fn need_desktop(self) -> bool {
        matches!(
            self,
            State::Home
                | State::HomeEdit
                | State::HomeEditDialog
                | State::HomePortrait
                | State::TaskNav
                | State::Launcher
                | State::Loading
                | State::LoadingSubwindow
        )
    }

    /// Home applets are visible (possibly fading).
    pub fn show_applets(self) -> bool {
        matches!(
            self,
            State::Home | State::HomePortrait | State::HomeEdit | State::HomeEditDialog
        )
    }

    /// The status area has a place on screen.
    pub fn show_status_area(self) -> bool {
        !matches!(
            self,
            State::Undefined | State::NonComposited | State::NonCompositedPortrait
        )
    }

    /// The operator logo is visible.
    pub fn show_operator(self) -> bool {
        matches!(self, State::Home | State::HomePortrait)
    }

    /// The title-bar layer stays inside the blur group, so a dialog's
    /// background blur also blurs the buttons.
    pub fn blur_buttons(self) -> bool {
        matches!(
            self,
            State::Undefined
                | State::Home
                | State::HomePortrait
                | State::App
                | State::AppPortrait
                | State::NonComposited
                | State::NonCompositedPortrait
        )
    }

    /// The applet layer rides in front of the blur rather than with the
    /// desktop.
    pub fn home_front(self) -> bool {
        matches!(self, State::Home | State::HomePortrait | State::HomeEdit)
    }

    /// The title bar's foreground overlay is lifted above everything.
    pub fn toolbar_foreground(self) -> bool {
        matches!(
            self,
            State::HomeEdit | State::HomeEditDialog | State::TaskNav | State::Launcher
        )
    }

    /// The compositor claims pointer input over the whole screen.
    pub fn need_whole_screen_input(self) -> bool {
        matches!(
            self,
            State::HomeEdit
                | State::HomeEditDialog
                | State::TaskNav
                | State::Launcher
                | State::Loading
                | State::LoadingSubwindow
        )
    }

    /// Incoming-event preview notes are dismissed on entry.
    pub fn discard_preview_note(self) -> bool {
        matches!(self, State::TaskNav | State::Launcher)
    }

    /// Foreground notes and dialogs are released from the compositor's
    /// input claim so their own windows receive events.
    pub fn ungrab_notes(self) -> bool {
        self.need_whole_screen_input()
    }

    /// The portrait sibling, for portrait-capable states.
    pub fn portrait_sibling(self) -> Option<State> {
        match self {
            State::Home => Some(State::HomePortrait),
            State::App => Some(State::AppPortrait),
            State::NonComposited => Some(State::NonCompositedPortrait),
            _ => None,
        }
    }

    /// The landscape sibling, for portrait states.
    pub fn landscape_sibling(self) -> Option<State> {
        match self {
            State::HomePortrait => Some(State::Home),
            State::AppPortrait => Some(State::App),
            State::NonCompositedPortrait => Some(State::NonComposited),
            _ => None,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Undefined => "undefined",
            State::Home => "home",
            State::HomeEdit => "home-edit",
            State::HomeEditDialog => "home-edit-dialog",
            State::HomePortrait => "home-portrait",
            State::App => "app",
            State::AppPortrait => "app-portrait",
            State::TaskNav => "task-nav",
            State::Launcher => "launcher",
            State::NonComposited => "non-composited",
            State::NonCompositedPortrait => "non-composited-portrait",
            State::Loading => "loading",
            State::LoadingSubwindow => "loading-subwindow",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// What the blur transition is asked to achieve.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BlurFlags: u16 {
        /// Blur the home layer for a shell view (switcher, launcher, edit).
        const BLUR_HOME = 1 << 0;
        /// Fade the task navigator in (out when cleared).
        const SHOW_TASK_NAV = 1 << 1;
        /// Blur behind a dialog or menu; owned by the stacking scan.
        const BLUR_BACKGROUND = 1 << 2;
        /// Zoom the background out for the launcher.
        const ZOOM_FOR_LAUNCHER = 1 << 3;
        /// One zoom level deeper for a launcher submenu.
        const ZOOM_FOR_LAUNCHER_SUBMENU = 1 << 4;
        /// Zoom applied when at home.
        const ZOOM_FOR_HOME = 1 << 5;
        /// Zoom the home layer away behind the task navigator.
        const ZOOM_FOR_TASK_NAV = 1 << 6;
        /// Fade the applet layer in (out slowly when cleared).
        const SHOW_APPLETS = 1 << 7;
    }
}

impl BlurFlags {
    /// How many zoom levels the flag set asks for.
    pub fn zoom_levels(self) -> u32 {
        [
            BlurFlags::ZOOM_FOR_LAUNCHER,
            BlurFlags::ZOOM_FOR_LAUNCHER_SUBMENU,
            BlurFlags::ZOOM_FOR_TASK_NAV,
        ]
        .into_iter()
        .filter(|f| self.contains(*f))
        .count() as u32
    }

    /// Whether the home layer gets blurred at all.
    pub fn blurs_home(self) -> bool {
        self.intersects(BlurFlags::BLUR_HOME | BlurFlags::BLUR_BACKGROUND)
    }
}
