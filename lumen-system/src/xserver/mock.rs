//! A recording test double for [`XConnection`].
//!
//! Every call is appended to a shared call log the test (or the headless
//! shell driver) can inspect; window state that later calls read back, such
//! as the overlay window and per-window input shapes, is kept coherent.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::wm::WindowId;

use super::{StageBackground, WireRect, XConnection};

/// The stage window id the mock reports.
pub const STAGE_WINDOW: WindowId = WindowId(0x5AFE);
/// The overlay window id the mock hands out.
pub const OVERLAY_WINDOW: WindowId = WindowId(0x0B17);

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    SelectCompositorInput(WindowId),
    SetInputShape(WindowId, Vec<WireRect>),
    ResetBoundingShape(WindowId),
    AcquireOverlay,
    ReleaseOverlay,
    ReparentStageToRoot(i32, i32),
    MoveStage(i32, i32),
    SetStageBackground(StageBackground),
    SetStageShaped(bool),
    SetClientRedirected(WindowId, bool),
    TrackDamage(WindowId, bool),
    ShowDesktop(bool),
    FocusWindow(WindowId),
    DeliverDelete(WindowId),
}

/// Observable state of the mock server.
#[derive(Debug, Default)]
pub struct MockState {
    pub calls: Vec<MockCall>,
    pub input_shapes: HashMap<u32, Vec<WireRect>>,
    pub overlay: Option<WindowId>,
    pub stage_position: (i32, i32),
    pub stage_shaped: bool,
    pub redirected_off: Vec<WindowId>,
    pub trap_depth: u32,
}

impl MockState {
    /// The most recent input shape set on `window`.
    pub fn input_shape(&self, window: WindowId) -> Option<&Vec<WireRect>> {
        self.input_shapes.get(&window.0)
    }

    pub fn calls_of<F: Fn(&MockCall) -> bool>(&self, filter: F) -> usize {
        self.calls.iter().filter(|c| filter(c)).count()
    }
}

/// The double itself; create with [`MockXConnection::new`] and keep the
/// returned state handle for assertions.
pub struct MockXConnection {
    state: Rc<RefCell<MockState>>,
}

impl MockXConnection {
    pub fn new() -> (Self, Rc<RefCell<MockState>>) {
        let state = Rc::new(RefCell::new(MockState {
            overlay: Some(OVERLAY_WINDOW),
            ..MockState::default()
        }));
        (
            MockXConnection {
                state: state.clone(),
            },
            state,
        )
    }
}

impl XConnection for MockXConnection {
    fn select_compositor_input(&mut self, window: WindowId) {
        self.state
            .borrow_mut()
            .calls
            .push(MockCall::SelectCompositorInput(window));
    }

    fn set_input_shape(&mut self, window: WindowId, rects: &[WireRect]) {
        let mut state = self.state.borrow_mut();
        state.input_shapes.insert(window.0, rects.to_vec());
        state
            .calls
            .push(MockCall::SetInputShape(window, rects.to_vec()));
    }

    fn reset_bounding_shape(&mut self, window: WindowId) {
        self.state
            .borrow_mut()
            .calls
            .push(MockCall::ResetBoundingShape(window));
    }

    fn overlay_window(&self) -> Option<WindowId> {
        self.state.borrow().overlay
    }

    fn acquire_overlay(&mut self) -> WindowId {
        let mut state = self.state.borrow_mut();
        state.overlay = Some(OVERLAY_WINDOW);
        state.calls.push(MockCall::AcquireOverlay);
        OVERLAY_WINDOW
    }

    fn release_overlay(&mut self) {
        let mut state = self.state.borrow_mut();
        state.overlay = None;
        state.calls.push(MockCall::ReleaseOverlay);
    }

    fn stage_window(&self) -> WindowId {
        STAGE_WINDOW
    }

    fn reparent_stage_to_root(&mut self, x: i32, y: i32) {
        let mut state = self.state.borrow_mut();
        state.stage_position = (x, y);
        state.calls.push(MockCall::ReparentStageToRoot(x, y));
    }

    fn move_stage(&mut self, x: i32, y: i32) {
        let mut state = self.state.borrow_mut();
        state.stage_position = (x, y);
        state.calls.push(MockCall::MoveStage(x, y));
    }

    fn set_stage_background(&mut self, background: StageBackground) {
        self.state
            .borrow_mut()
            .calls
            .push(MockCall::SetStageBackground(background));
    }

    fn set_stage_shaped(&mut self, shaped: bool) {
        let mut state = self.state.borrow_mut();
        state.stage_shaped = shaped;
        state.calls.push(MockCall::SetStageShaped(shaped));
    }

    fn set_client_redirected(&mut self, window: WindowId, redirected: bool) {
        let mut state = self.state.borrow_mut();
        if redirected {
            state.redirected_off.retain(|w| *w != window);
        } else if !state.redirected_off.contains(&window) {
            state.redirected_off.push(window);
        }
        state
            .calls
            .push(MockCall::SetClientRedirected(window, redirected));
    }

    fn track_damage(&mut self, window: WindowId, track: bool) {
        self.state
            .borrow_mut()
            .calls
            .push(MockCall::TrackDamage(window, track));
    }

    fn show_desktop(&mut self, show: bool) {
        self.state
            .borrow_mut()
            .calls
            .push(MockCall::ShowDesktop(show));
    }

    fn focus_window(&mut self, window: WindowId) {
        self.state
            .borrow_mut()
            .calls
            .push(MockCall::FocusWindow(window));
    }

    fn deliver_delete(&mut self, window: WindowId) {
        self.state
            .borrow_mut()
            .calls
            .push(MockCall::DeliverDelete(window));
    }

    fn trap_errors(&mut self) {
        self.state.borrow_mut().trap_depth += 1;
    }

    fn untrap_errors(&mut self) -> u32 {
        let mut state = self.state.borrow_mut();
        state.trap_depth = state.trap_depth.saturating_sub(1);
        0
    }
}
