//! Free-space rectangle pool
//!
//! Tracks the unclaimed parts of the level as a list of rectangles. Room
//! placement picks one at random, claims a sub-rectangle inside it, and
//! splits the pool around the claim. Residual strips too thin to ever hold a
//! room plus its clearance are dropped instead of being kept as slivers.

use serde::{Deserialize, Serialize};

use crate::consts::{XLIM, YLIM};
use crate::error::{GenError, Result};
use crate::rng::RandomStream;

/// An axis-aligned rectangle, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub lx: i32,
    pub ly: i32,
    pub hx: i32,
    pub hy: i32,
}

impl Rect {
    pub const fn new(lx: i32, ly: i32, hx: i32, hy: i32) -> Self {
        Self { lx, ly, hx, hy }
    }

    pub fn width(&self) -> i32 {
        (self.hx - self.lx + 1).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.hy - self.ly + 1).max(0)
    }

    /// Check if this rectangle contains another
    pub fn contains(&self, other: &Rect) -> bool {
        self.lx <= other.lx && self.hx >= other.hx && self.ly <= other.ly && self.hy >= other.hy
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.lx && x <= self.hx && y >= self.ly && y <= self.hy
    }

    /// Intersection of two rectangles, if any cell is shared
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let r = Rect {
            lx: self.lx.max(other.lx),
            ly: self.ly.max(other.ly),
            hx: self.hx.min(other.hx),
            hy: self.hy.min(other.hy),
        };
        (r.lx <= r.hx && r.ly <= r.hy).then_some(r)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }
}

/// The pool of free rectangles for one level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectPool {
    rects: Vec<Rect>,
    capacity: usize,
    width: i32,
    height: i32,
}

impl RectPool {
    /// Create a pool for a `width x height` grid, holding the whole grid.
    pub fn new(width: i32, height: i32) -> Self {
        let capacity = ((width * height) / 30).max(1) as usize;
        let mut pool = Self {
            rects: Vec::with_capacity(capacity),
            capacity,
            width,
            height,
        };
        pool.reset();
        pool
    }

    /// Back to a single rectangle covering the full grid
    pub fn reset(&mut self) {
        self.rects.clear();
        self.rects
            .push(Rect::new(0, 0, self.width - 1, self.height - 1));
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// A uniformly random live rectangle. One `rn2(len)` draw when the pool
    /// is non-empty, none otherwise.
    pub fn pick_random(&self, rng: &mut RandomStream) -> Option<Rect> {
        if self.rects.is_empty() {
            return None;
        }
        let i = rng.rn2(self.rects.len() as u32) as usize;
        Some(self.rects[i])
    }

    /// First live rectangle that fully contains `r`
    pub fn find_containing(&self, r: &Rect) -> Option<Rect> {
        self.rects.iter().find(|p| p.contains(r)).copied()
    }

    /// Add a rectangle unless an existing one already covers it or the pool
    /// is full.
    pub fn add(&mut self, r: Rect) {
        if self.rects.len() >= self.capacity {
            tracing::debug!(?r, capacity = self.capacity, "rectangle pool full");
            return;
        }
        if self.find_containing(&r).is_some() {
            return;
        }
        self.rects.push(r);
    }

    /// Remove a rectangle by value. The last rectangle takes its slot.
    pub fn remove(&mut self, r: &Rect) {
        if let Some(i) = self.rects.iter().position(|p| p == r) {
            self.rects.swap_remove(i);
        }
    }

    /// Remove `parent` and carve `claimed` out of the pool.
    ///
    /// Every other live rectangle that intersects `claimed` is split around
    /// the intersection until no live rectangle touches `claimed`. Then up
    /// to four residual strips of `parent` (above, left, below, right) are
    /// added back when they are wide enough to hold a room with clearance.
    /// Strips that touch the grid edge need less clearance on that side.
    pub fn split(&mut self, parent: Rect, claimed: Rect) {
        let old = parent;
        self.remove(&parent);

        // Residuals of a nested split are cut around the overlap only, so
        // they can reach back into `claimed`; rescan until none do.
        while let Some((other, overlap)) = self
            .rects
            .iter()
            .find_map(|r| r.intersection(&claimed).map(|o| (*r, o)))
        {
            self.split(other, overlap);
        }

        let (w, h) = (self.width, self.height);

        let top_need = if old.hy < h - 1 { 2 * YLIM } else { YLIM + 1 } + 4;
        if claimed.ly - old.ly - 1 > top_need {
            self.add(Rect { hy: claimed.ly - 2, ..old });
        }
        let left_need = if old.hx < w - 1 { 2 * XLIM } else { XLIM + 1 } + 4;
        if claimed.lx - old.lx - 1 > left_need {
            self.add(Rect { hx: claimed.lx - 2, ..old });
        }
        let bottom_need = if old.ly > 0 { 2 * YLIM } else { YLIM + 1 } + 4;
        if old.hy - claimed.hy - 1 > bottom_need {
            self.add(Rect { ly: claimed.hy + 2, ..old });
        }
        let right_need = if old.lx > 0 { 2 * XLIM } else { XLIM + 1 } + 4;
        if old.hx - claimed.hx - 1 > right_need {
            self.add(Rect { lx: claimed.hx + 2, ..old });
        }
    }

    /// Check that every live rectangle lies inside the grid.
    pub fn validate(&self) -> Result<()> {
        for r in &self.rects {
            if r.lx < 0 || r.ly < 0 || r.hx >= self.width || r.hy >= self.height || r.lx > r.hx || r.ly > r.hy {
                return Err(GenError::RectOutOfBounds {
                    lx: r.lx,
                    ly: r.ly,
                    hx: r.hx,
                    hy: r.hy,
                    width: self.width,
                    height: self.height,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rect_dimensions() {
        let r = Rect::new(10, 20, 15, 25);
        assert_eq!(r.width(), 6);
        assert_eq!(r.height(), 6);
        assert_eq!(Rect::new(5, 5, 4, 4).width(), 0);
    }

    #[test]
    fn test_rect_contains() {
        let outer = Rect::new(0, 0, 20, 20);
        let inner = Rect::new(5, 5, 10, 10);
        let outside = Rect::new(25, 25, 30, 30);

        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(!outer.contains(&outside));
    }

    #[test]
    fn test_rect_intersection() {
        let r1 = Rect::new(0, 0, 10, 10);
        let r2 = Rect::new(5, 5, 15, 15);
        let r3 = Rect::new(20, 20, 30, 30);

        assert_eq!(r1.intersection(&r2), Some(Rect::new(5, 5, 10, 10)));
        assert!(r2.intersects(&r1));
        assert!(!r1.intersects(&r3));
        // Touching edges share a cell
        assert!(Rect::new(0, 0, 5, 5).intersects(&Rect::new(5, 5, 9, 9)));
    }

    #[test]
    fn test_pool_reset() {
        let pool = RectPool::new(80, 21);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.rects()[0], Rect::new(0, 0, 79, 20));
        assert_eq!(pool.capacity(), 56);
    }

    #[test]
    fn test_pick_random_consumes_one_draw() {
        let pool = RectPool::new(80, 21);
        let mut rng = RandomStream::new(42);
        assert!(pool.pick_random(&mut rng).is_some());
        assert_eq!(rng.call_count(), 1);

        let mut empty = RectPool::new(80, 21);
        empty.remove(&Rect::new(0, 0, 79, 20));
        assert!(empty.pick_random(&mut rng).is_none());
        assert_eq!(rng.call_count(), 1);
    }

    #[test]
    fn test_split_middle_room() {
        let mut pool = RectPool::new(80, 21);
        let parent = pool.rects()[0];
        let claimed = Rect::new(30, 6, 40, 12);
        pool.split(parent, claimed);

        // Left and right strips survive; top/bottom are too thin.
        assert_eq!(pool.len(), 2);
        assert!(pool.rects().contains(&Rect::new(0, 0, 28, 20)));
        assert!(pool.rects().contains(&Rect::new(42, 0, 79, 20)));
        for r in pool.rects() {
            assert!(!r.intersects(&claimed));
        }
    }

    #[test]
    fn test_split_discards_thin_residuals() {
        let mut pool = RectPool::new(80, 21);
        let parent = pool.rects()[0];
        // Leaves a 5-wide strip on the left; too small to keep
        pool.split(parent, Rect::new(6, 2, 75, 18));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_nested_split_clears_claimed_space() {
        let mut pool = RectPool::new(80, 21);
        let mut placed = Vec::new();
        for claimed in [Rect::new(0, 6, 2, 8), Rect::new(64, 0, 66, 2), Rect::new(60, 8, 64, 10)] {
            let parent = pool.find_containing(&claimed).unwrap();
            pool.split(parent, claimed);
            placed.push(claimed);
        }
        for r in pool.rects() {
            for c in &placed {
                assert!(!r.intersects(c), "{r:?} overlaps {c:?}");
            }
        }
        assert!(!pool.rects().contains(&Rect::new(64, 10, 79, 20)));
    }

    #[test]
    fn test_add_skips_contained() {
        let mut pool = RectPool::new(80, 21);
        pool.add(Rect::new(10, 5, 20, 10));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_add_respects_capacity() {
        let mut pool = RectPool::new(30, 2);
        assert_eq!(pool.capacity(), 2);
        pool.remove(&Rect::new(0, 0, 29, 1));
        pool.add(Rect::new(0, 0, 1, 1));
        pool.add(Rect::new(3, 0, 4, 1));
        pool.add(Rect::new(6, 0, 7, 1));
        assert_eq!(pool.len(), 2);
    }

    proptest! {
        #[test]
        fn split_never_leaves_claimed_space(claims in prop::collection::vec((0i32..70, 0i32..15, 2i32..10, 2i32..5), 1..12)) {
            let mut pool = RectPool::new(80, 21);
            let mut placed: Vec<Rect> = Vec::new();
            for (x, y, w, h) in claims {
                let claimed = Rect::new(x, y, (x + w).min(79), (y + h).min(20));
                let Some(parent) = pool.find_containing(&claimed) else { continue };
                pool.split(parent, claimed);
                for c in &placed {
                    prop_assert!(!claimed.intersects(c), "{:?} overlaps earlier {:?}", claimed, c);
                }
                placed.push(claimed);
                prop_assert!(pool.validate().is_ok());
                for r in pool.rects() {
                    for c in &placed {
                        prop_assert!(!r.intersects(c), "{:?} overlaps claimed {:?}", r, c);
                    }
                }
            }
        }
    }
}
