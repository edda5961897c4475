//! Screen orientation and rotation types.
//!
//! The shell only distinguishes two display rotations, matching the
//! hardware it targets: the natural landscape orientation and a single
//! 90 degree rotation used for portrait mode.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The logical orientation of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Orientation {
    /// Width exceeds height; the device's natural orientation.
    #[default]
    Landscape,
    /// Height exceeds width.
    Portrait,
}

impl Orientation {
    pub fn is_portrait(self) -> bool {
        matches!(self, Orientation::Portrait)
    }

    /// The other orientation.
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Landscape => Orientation::Portrait,
            Orientation::Portrait => Orientation::Landscape,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Landscape => write!(f, "landscape"),
            Orientation::Portrait => write!(f, "portrait"),
        }
    }
}

/// A display rotation, as reported in the `rotation` property notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Rotation {
    /// No rotation; landscape.
    #[default]
    Rotate0,
    /// Rotated a quarter turn; portrait.
    Rotate90,
}

impl Rotation {
    pub fn orientation(self) -> Orientation {
        match self {
            Rotation::Rotate0 => Orientation::Landscape,
            Rotation::Rotate90 => Orientation::Portrait,
        }
    }

    /// Rotation angle in degrees.
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Rotate0 => 0,
            Rotation::Rotate90 => 90,
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}
