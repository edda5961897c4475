//! Shared primitive types.

pub mod geometry;
pub mod orientation;

pub use geometry::{Point, Rect, Size};
pub use orientation::{Orientation, Rotation};
