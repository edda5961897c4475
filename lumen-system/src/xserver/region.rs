//! Rectangle regions.
//!
//! A [`Region`] is a union of pixel rectangles kept in a canonical band
//! form: rectangles are decomposed into horizontal bands with merged,
//! sorted x-spans, and vertically adjacent bands with identical spans are
//! coalesced. Two regions covering the same pixels therefore compare equal
//! regardless of how they were assembled, which the input-viewport engine
//! relies on to skip redundant server round trips.

use lumen_core::types::Rect;

use super::WireRect;

/// A normalized union of rectangles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    pub fn new() -> Self {
        Region::default()
    }

    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Region::new();
        region.union_rect(rect);
        region
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// The canonical rectangle list, top-to-bottom, left-to-right.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn union_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        self.rects.push(rect);
        self.rects = normalize(&self.rects);
    }

    pub fn union(&mut self, other: &Region) {
        if other.is_empty() {
            return;
        }
        self.rects.extend_from_slice(&other.rects);
        self.rects = normalize(&self.rects);
    }

    /// Remove every pixel of `other` from this region.
    pub fn subtract(&mut self, other: &Region) {
        if self.is_empty() || other.is_empty() {
            return;
        }
        let mut pieces: Vec<Rect> = Vec::new();
        for rect in &self.rects {
            let mut fragments = vec![*rect];
            for cut in &other.rects {
                fragments = fragments
                    .into_iter()
                    .flat_map(|f| subtract_rect(f, *cut))
                    .collect();
            }
            pieces.extend(fragments);
        }
        self.rects = normalize(&pieces);
    }

    /// Whether `rect` is entirely inside the region.
    pub fn contains_rect(&self, rect: Rect) -> bool {
        let mut probe = Region::from_rect(rect);
        probe.subtract(self);
        probe.is_empty()
    }

    /// Mirror the region across the x = y axis, mapping each rectangle
    /// `(x, y, w, h)` to `(y, x, h, w)`. An involution: applying it twice
    /// yields the original region, bit for bit.
    pub fn transposed(&self) -> Region {
        let rects: Vec<Rect> = self.rects.iter().map(|r| r.transposed()).collect();
        Region {
            rects: normalize(&rects),
        }
    }

    /// The region in the server's wire layout.
    pub fn to_wire(&self) -> Vec<WireRect> {
        self.rects.iter().copied().map(WireRect::from).collect()
    }
}

/// Split `r` around `cut`, returning the up-to-four surviving fragments.
fn subtract_rect(r: Rect, cut: Rect) -> Vec<Rect> {
    let Some(ix) = r.intersection(&cut) else {
        return vec![r];
    };
    let mut out = Vec::with_capacity(4);
    if ix.y > r.y {
        out.push(Rect::new(r.x, r.y, r.width, ix.y - r.y));
    }
    if ix.bottom() < r.bottom() {
        out.push(Rect::new(r.x, ix.bottom(), r.width, r.bottom() - ix.bottom()));
    }
    if ix.x > r.x {
        out.push(Rect::new(r.x, ix.y, ix.x - r.x, ix.height));
    }
    if ix.right() < r.right() {
        out.push(Rect::new(ix.right(), ix.y, r.right() - ix.right(), ix.height));
    }
    out
}

/// Canonical band decomposition of a rectangle soup.
fn normalize(rects: &[Rect]) -> Vec<Rect> {
    let rects: Vec<Rect> = rects.iter().copied().filter(|r| !r.is_empty()).collect();
    if rects.is_empty() {
        return Vec::new();
    }

    let mut edges: Vec<i32> = rects.iter().flat_map(|r| [r.y, r.bottom()]).collect();
    edges.sort_unstable();
    edges.dedup();

    // One entry per horizontal band: (top, bottom, merged x-spans).
    let mut bands: Vec<(i32, i32, Vec<(i32, i32)>)> = Vec::new();
    for pair in edges.windows(2) {
        let (top, bottom) = (pair[0], pair[1]);
        let mut spans: Vec<(i32, i32)> = rects
            .iter()
            .filter(|r| r.y <= top && r.bottom() >= bottom)
            .map(|r| (r.x, r.right()))
            .collect();
        if spans.is_empty() {
            continue;
        }
        spans.sort_unstable();
        let mut merged: Vec<(i32, i32)> = vec![spans[0]];
        for span in &spans[1..] {
            match merged.last_mut() {
                Some(last) if span.0 <= last.1 => last.1 = last.1.max(span.1),
                _ => merged.push(*span),
            }
        }
        if let Some(previous) = bands.last_mut() {
            if previous.1 == top && previous.2 == merged {
                previous.1 = bottom;
                continue;
            }
        }
        bands.push((top, bottom, merged));
    }

    bands
        .into_iter()
        .flat_map(|(top, bottom, spans)| {
            spans
                .into_iter()
                .map(move |(left, right)| Rect::new(left, top, right - left, bottom - top))
        })
        .collect()
}
