//! Shared handle to the render manager.
//!
//! The manager is a single owned value; event callbacks (channel
//! subscribers, input hooks, the event loop timer) reach it through this
//! handle instead of a global. A call that arrives while the manager is
//! already executing (say, a subscriber reacting to the `state-changed`
//! notification by requesting another state change) is rejected with a
//! warning and ignored, matching the re-entrancy policy of `set_state`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::render::state::State;
use crate::render::{RenderManager, TimeMs};

/// A cloneable handle to the shell's render manager.
#[derive(Clone)]
pub struct ShellHandle {
    inner: Rc<RefCell<RenderManager>>,
}

impl ShellHandle {
    pub fn new(manager: RenderManager) -> Self {
        ShellHandle {
            inner: Rc::new(RefCell::new(manager)),
        }
    }

    /// Run `f` against the manager. Returns `None` (after a warning) when
    /// the manager is already busy on this thread.
    pub fn with<R>(&self, f: impl FnOnce(&mut RenderManager) -> R) -> Option<R> {
        match self.inner.try_borrow_mut() {
            Ok(mut manager) => Some(f(&mut manager)),
            Err(_) => {
                tracing::warn!("re-entrant shell call ignored");
                None
            }
        }
    }

    /// Run `f` read-only; also refused while a mutable call is running.
    pub fn read<R>(&self, f: impl FnOnce(&RenderManager) -> R) -> Option<R> {
        match self.inner.try_borrow() {
            Ok(manager) => Some(f(&manager)),
            Err(_) => None,
        }
    }

    pub fn set_state(&self, state: State) {
        self.with(|m| m.set_state(state));
    }

    pub fn state(&self) -> Option<State> {
        self.read(|m| m.state())
    }

    pub fn dispatch(&self, now: TimeMs) {
        self.with(|m| m.dispatch(now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransitionConfig;
    use crate::xserver::mock::MockXConnection;
    use lumen_core::types::Size;

    fn handle() -> ShellHandle {
        let (conn, _state) = MockXConnection::new();
        ShellHandle::new(RenderManager::new(
            Box::new(conn),
            TransitionConfig::default(),
            Size::new(800, 480),
        ))
    }

    #[test]
    fn nested_calls_are_refused() {
        let handle = handle();
        let inner = handle.clone();
        let outcome = handle.with(move |_m| inner.with(|_m2| ()));
        // The outer call ran; the nested one was refused.
        assert_eq!(outcome, Some(None));
    }

    #[test]
    fn sequential_calls_are_fine() {
        let handle = handle();
        assert!(handle.with(|_| ()).is_some());
        assert!(handle.with(|_| ()).is_some());
        assert_eq!(handle.state(), Some(State::Undefined));
    }
}
