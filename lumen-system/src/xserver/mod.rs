//! The display-server seam.
//!
//! Everything the render manager asks of the X server goes through the
//! [`XConnection`] trait, so the choice of transport (xlib, xcb, a test
//! double) never surfaces in the engines. The trait covers exactly the
//! operations the manager needs: input shaping, the composite overlay
//! window lifecycle, per-client redirection, and the handful of window
//! manager messages the state machine sends.
//!
//! X errors around batched requests are handled with [`ErrorTrap`], a
//! scoped guard that arms the trap on construction and disarms it on drop;
//! a vanished window then costs a log line instead of a shell abort.

pub mod mock;
mod region;

pub use region::Region;

use std::ops::{Deref, DerefMut};

use lumen_core::types::Rect;

use crate::wm::WindowId;

/// A rectangle in the server's wire layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireRect {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

impl From<Rect> for WireRect {
    fn from(r: Rect) -> Self {
        WireRect {
            x: r.x.clamp(i16::MIN as i32, i16::MAX as i32) as i16,
            y: r.y.clamp(i16::MIN as i32, i16::MAX as i32) as i16,
            width: r.width.clamp(0, u16::MAX as i32) as u16,
            height: r.height.clamp(0, u16::MAX as i32) as u16,
        }
    }
}

/// Stage window background pixmap selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageBackground {
    /// No background pixmap; avoids flashes during reconfiguration.
    Unset,
    /// Solid black.
    Black,
}

/// Operations the render manager performs against the display server.
pub trait XConnection {
    /// Select the compositor's event mask on `window`.
    fn select_compositor_input(&mut self, window: WindowId);

    /// Set the input shape of `window` to the union of `rects`.
    fn set_input_shape(&mut self, window: WindowId, rects: &[WireRect]);

    /// Reset the bounding shape of `window` to the full window.
    fn reset_bounding_shape(&mut self, window: WindowId);

    /// The composite overlay window, if compositing is on.
    fn overlay_window(&self) -> Option<WindowId>;

    /// Acquire the composite overlay window, turning compositing on.
    fn acquire_overlay(&mut self) -> WindowId;

    /// Release the composite overlay window.
    fn release_overlay(&mut self);

    /// The renderer stage's own X window.
    fn stage_window(&self) -> WindowId;

    /// Reparent the stage window under the root at the given position.
    fn reparent_stage_to_root(&mut self, x: i32, y: i32);

    fn move_stage(&mut self, x: i32, y: i32);

    fn set_stage_background(&mut self, background: StageBackground);

    /// Put the stage in or out of shaped (zero-region) mode.
    fn set_stage_shaped(&mut self, shaped: bool);

    /// Toggle composite redirection of one client window.
    fn set_client_redirected(&mut self, window: WindowId, redirected: bool);

    /// Toggle damage tracking of one client window's texture.
    fn track_damage(&mut self, window: WindowId, track: bool);

    /// Ask the window manager to enter or leave show-desktop mode.
    fn show_desktop(&mut self, show: bool);

    fn focus_window(&mut self, window: WindowId);

    /// Deliver a WM_DELETE_WINDOW message.
    fn deliver_delete(&mut self, window: WindowId);

    /// Begin swallowing X errors.
    fn trap_errors(&mut self);

    /// Stop swallowing X errors; returns how many were swallowed.
    fn untrap_errors(&mut self) -> u32;
}

/// Scoped X error trap.
///
/// While the guard lives, requests issued through it have their errors
/// swallowed server-side; dropping the guard disarms the trap and logs how
/// many errors were ignored.
pub struct ErrorTrap<'a> {
    conn: &'a mut (dyn XConnection + 'a),
}

impl<'a> ErrorTrap<'a> {
    pub fn new(conn: &'a mut (dyn XConnection + 'a)) -> Self {
        conn.trap_errors();
        ErrorTrap { conn }
    }
}

impl<'a> Deref for ErrorTrap<'a> {
    type Target = dyn XConnection + 'a;

    fn deref(&self) -> &Self::Target {
        self.conn
    }
}

impl<'a> DerefMut for ErrorTrap<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn
    }
}

impl Drop for ErrorTrap<'_> {
    fn drop(&mut self) {
        let trapped = self.conn.untrap_errors();
        if trapped > 0 {
            tracing::debug!(trapped, "ignored X errors from a trapped batch");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockXConnection;
    use super::*;

    #[test]
    fn wire_rect_saturates_out_of_range_values() {
        let wire = WireRect::from(Rect::new(-40_000, 10, 70_000, -5));
        assert_eq!(wire.x, i16::MIN);
        assert_eq!(wire.y, 10);
        assert_eq!(wire.width, u16::MAX);
        assert_eq!(wire.height, 0);
    }

    #[test]
    fn error_trap_arms_and_disarms() {
        let (mut conn, state) = MockXConnection::new();
        {
            let mut trapped = ErrorTrap::new(&mut conn);
            trapped.focus_window(WindowId(1));
            assert_eq!(state.borrow().trap_depth, 1);
        }
        assert_eq!(state.borrow().trap_depth, 0);
    }
}
