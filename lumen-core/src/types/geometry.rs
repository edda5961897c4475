//! Geometric primitives.
//!
//! [`Point<T>`] and [`Size<T>`] are generic over the coordinate type so the
//! same shapes serve pixel (`i32`) and fractional (`f32`) coordinates.
//! [`Rect`] is the pixel rectangle used throughout the render manager for
//! window geometry, occlusion blockers and input-viewport regions.
//!
//! A `Rect` keeps all four fields signed: geometry arriving from clients may
//! have negative origins (a status area shoved off-screen sits at a negative
//! y), and the occlusion math repeatedly splits rectangles, which is much
//! simpler without unsigned underflow at the edges. A rectangle with a
//! non-positive width or height is empty.

use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A point in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl<T> Point<T> {
    pub fn new(x: T, y: T) -> Self {
        Point { x, y }
    }
}

impl<T: Zero> Default for Point<T> {
    fn default() -> Self {
        Point {
            x: T::zero(),
            y: T::zero(),
        }
    }
}

impl<T: Copy + Add<Output = T>> Add for Point<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl<T: Copy + Sub<Output = T>> Sub for Point<T> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// A width and height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub fn new(width: T, height: T) -> Self {
        Size { width, height }
    }
}

impl<T: Zero> Default for Size<T> {
    fn default() -> Self {
        Size {
            width: T::zero(),
            height: T::zero(),
        }
    }
}

impl Size<i32> {
    /// Swap width and height, as a 90 degree rotation does.
    pub fn transposed(self) -> Self {
        Size::new(self.height, self.width)
    }
}

/// A pixel rectangle: top-left origin plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at the origin covering `size`.
    pub fn from_size(size: Size<i32>) -> Self {
        Rect::new(0, 0, size.width, size.height)
    }

    /// One past the right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// One past the bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, p: Point<i32>) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn covers(&self, other: &Rect) -> bool {
        self.x <= other.x
            && other.right() <= self.right()
            && self.y <= other.y
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// The overlapping region, or `None` if the rectangles are disjoint.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let r = Rect::new(x, y, right - x, bottom - y);
        (!r.is_empty()).then_some(r)
    }

    /// Clip the off-screen parts away, clamping a negative origin to zero.
    ///
    /// Returns `None` when nothing of the rectangle remains on a screen of
    /// `screen` pixels.
    pub fn clipped_to_screen(mut self, screen: Size<i32>) -> Option<Rect> {
        if self.x < 0 {
            if -self.x >= self.width {
                return None;
            }
            self.width += self.x;
            self.x = 0;
        }
        if self.y < 0 {
            if -self.y >= self.height {
                return None;
            }
            self.height += self.y;
            self.y = 0;
        }
        if self.x >= screen.width || self.y >= screen.height {
            return None;
        }
        if self.right() > screen.width {
            self.width = screen.width - self.x;
        }
        if self.bottom() > screen.height {
            self.height = screen.height - self.y;
        }
        Some(self)
    }

    /// Whether the rectangle was laid out for a `screen`-sized display.
    pub fn fits_screen(&self, screen: Size<i32>) -> bool {
        self.right() <= screen.width && self.bottom() <= screen.height
    }

    /// Mirror the rectangle across the x = y axis: `(x, y, w, h)` becomes
    /// `(y, x, h, w)`. Applying it twice restores the original.
    pub fn transposed(self) -> Rect {
        Rect::new(self.y, self.x, self.height, self.width)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}{:+}{:+}", self.width, self.height, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const SCREEN: Size<i32> = Size {
        width: 800,
        height: 480,
    };

    #[test]
    fn point_arithmetic() {
        let p = Point::new(10, 20) + Point::new(5, -5);
        assert_eq!(p, Point::new(15, 15));
        assert_eq!(p - Point::new(15, 15), Point::default());
    }

    #[test]
    fn intersection_of_overlapping_rects() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 50, 100, 100);
        assert_eq!(a.intersection(&b), Some(Rect::new(50, 50, 50, 50)));
    }

    #[test]
    fn intersection_of_disjoint_rects_is_none() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 0, 10, 10);
        assert_eq!(a.intersection(&b), None);
        assert!(!a.intersects(&b));
    }

    #[rstest]
    #[case(Rect::new(-10, 0, 100, 100), Some(Rect::new(0, 0, 90, 100)))]
    #[case(Rect::new(0, -50, 100, 50), None)]
    #[case(Rect::new(790, 470, 100, 100), Some(Rect::new(790, 470, 10, 10)))]
    #[case(Rect::new(900, 0, 10, 10), None)]
    #[case(Rect::new(0, 0, 800, 480), Some(Rect::new(0, 0, 800, 480)))]
    fn clip_to_screen(#[case] input: Rect, #[case] expected: Option<Rect>) {
        assert_eq!(input.clipped_to_screen(SCREEN), expected);
    }

    #[test]
    fn transpose_round_trips() {
        let r = Rect::new(3, 7, 40, 20);
        assert_eq!(r.transposed().transposed(), r);
        assert_eq!(r.transposed(), Rect::new(7, 3, 20, 40));
    }

    #[test]
    fn covers_is_inclusive_of_edges() {
        let outer = Rect::new(0, 0, 100, 100);
        assert!(outer.covers(&Rect::new(0, 0, 100, 100)));
        assert!(outer.covers(&Rect::new(10, 10, 80, 80)));
        assert!(!outer.covers(&Rect::new(10, 10, 100, 80)));
    }

    #[test]
    fn portrait_geometry_does_not_fit_landscape_screen() {
        let portrait = Rect::new(0, 0, 480, 800);
        assert!(!portrait.fits_screen(SCREEN));
        assert!(portrait.transposed().fits_screen(SCREEN));
    }
}
