//! Title-bar state mirrored by the render manager.
//!
//! The title bar widget itself (title text, progress spinner, theming) is
//! someone else's problem; the render manager only tracks which buttons it
//! is showing, because the button set decides both the input-viewport
//! carve-outs and whether the bar lives inside or outside the blur group.

use bitflags::bitflags;

use lumen_core::types::Rect;

/// Title bar height including the half-margin border.
pub const TOP_MARGIN: i32 = 56;
/// Width of the top-left (launcher / switcher) button.
pub const LEFT_BTN_WIDTH: i32 = 112;
/// Width of the top-right (close / back) button.
pub const RIGHT_BTN_WIDTH: i32 = 112;
/// Gap between the status area and the operator logo.
pub const OPERATOR_PADDING: i32 = 16;

bitflags! {
    /// What the title bar is currently showing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TitleBarFlags: u16 {
        /// Top-left button opens the launcher.
        const BTN_LAUNCHER = 1 << 0;
        /// Top-left button opens the task switcher.
        const BTN_SWITCHER = 1 << 1;
        /// Top-right close button.
        const BTN_CLOSE = 1 << 2;
        /// Top-right back button (subviews).
        const BTN_BACK = 1 << 3;
        /// The foreground overlay is lifted above the blur.
        const FOREGROUND = 1 << 4;
        /// Compact buttons for portrait mode.
        const SMALL_BUTTONS = 1 << 5;
    }
}

impl TitleBarFlags {
    pub const LEFT_MASK: TitleBarFlags = TitleBarFlags::BTN_LAUNCHER.union(TitleBarFlags::BTN_SWITCHER);
    pub const RIGHT_MASK: TitleBarFlags = TitleBarFlags::BTN_CLOSE.union(TitleBarFlags::BTN_BACK);

    pub fn has_left_button(self) -> bool {
        self.intersects(Self::LEFT_MASK)
    }

    pub fn has_right_button(self) -> bool {
        self.intersects(Self::RIGHT_MASK)
    }
}

/// Button state plus the press latch cleared at each transition.
#[derive(Debug, Default)]
pub struct TitleBar {
    flags: TitleBarFlags,
    left_pressed: bool,
}

impl TitleBar {
    pub fn flags(&self) -> TitleBarFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: TitleBarFlags) {
        self.flags = flags;
    }

    pub fn set_left_pressed(&mut self, pressed: bool) {
        self.left_pressed = pressed;
    }

    pub fn left_pressed(&self) -> bool {
        self.left_pressed
    }

    /// Screen rectangle of the top-left button.
    pub fn left_button_rect(&self) -> Rect {
        Rect::new(0, 0, LEFT_BTN_WIDTH, TOP_MARGIN)
    }

    /// Screen rectangle of the top-right button on a screen `width` wide.
    pub fn right_button_rect(&self, width: i32) -> Rect {
        Rect::new(width - RIGHT_BTN_WIDTH, 0, RIGHT_BTN_WIDTH, TOP_MARGIN)
    }
}
