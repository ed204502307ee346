//! Bounded dirty-rectangle bookkeeping.

use prism_abi::geometry::{EMPTY_RECTANGLE, Rectangle};

pub const MAX_DAMAGE_REGIONS: usize = 16;

/// Up to `N` dirty rectangles. Once more would be needed the tracker either
/// merges the cheapest pair or degrades to full-screen damage.
#[derive(Clone)]
pub struct DamageTracker<const N: usize = MAX_DAMAGE_REGIONS> {
    regions: [Rectangle; N],
    count: usize,
    full_damage: bool,
}

impl<const N: usize> Default for DamageTracker<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DamageTracker<N> {
    pub const fn new() -> Self {
        Self {
            regions: [EMPTY_RECTANGLE; N],
            count: 0,
            full_damage: false,
        }
    }

    /// Record `rect`, merging the two regions whose union is smallest when
    /// the list is full.
    pub fn add(&mut self, rect: Rectangle) {
        let rect = rect.bound();
        if rect.is_empty() || self.full_damage {
            return;
        }

        if self.count >= N {
            self.merge_smallest_pair();
        }

        if self.count < N {
            self.regions[self.count] = rect;
            self.count += 1;
        } else {
            self.full_damage = true;
        }
    }

    /// Record `rect`, folding it into any region it touches.
    pub fn add_merge_overlapping(&mut self, rect: Rectangle) {
        let rect = rect.bound();
        if rect.is_empty() || self.full_damage {
            return;
        }

        for i in 0..self.count {
            if self.regions[i].overlaps_with(&rect) {
                self.regions[i] = self.regions[i].union(&rect);
                self.merge_all_overlapping();
                return;
            }
        }

        if self.count < N {
            self.regions[self.count] = rect;
            self.count += 1;
        } else {
            self.merge_smallest_pair();
            self.add(rect);
        }
    }

    fn merge_smallest_pair(&mut self) {
        if self.count < 2 {
            return;
        }

        let count = self.count;
        let mut best_i = 0;
        let mut best_j = 1;
        let mut best_area = i64::MAX;

        for i in 0..count {
            for j in (i + 1)..count {
                let combined = self.regions[i].combined_area(&self.regions[j]);
                if combined < best_area {
                    best_area = combined;
                    best_i = i;
                    best_j = j;
                }
            }
        }

        self.regions[best_i] = self.regions[best_i].union(&self.regions[best_j]);
        self.regions[best_j] = self.regions[count - 1];
        self.count -= 1;
    }

    fn merge_all_overlapping(&mut self) {
        let mut i = 0;
        while i < self.count {
            let mut j = i + 1;
            let mut merged = false;
            while j < self.count {
                if self.regions[i].overlaps_with(&self.regions[j]) {
                    self.regions[i] = self.regions[i].union(&self.regions[j]);
                    self.count -= 1;
                    self.regions[j] = self.regions[self.count];
                    merged = true;
                } else {
                    j += 1;
                }
            }
            // A grown region may now touch one already passed over.
            if merged {
                i = 0;
            } else {
                i += 1;
            }
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.count = 0;
        self.full_damage = false;
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn regions(&self) -> &[Rectangle] {
        &self.regions[..self.count]
    }

    pub fn bounding_box(&self) -> Rectangle {
        if self.full_damage {
            return Rectangle::screen();
        }
        self.regions()
            .iter()
            .copied()
            .reduce(|acc, r| acc.union(&r))
            .unwrap_or(EMPTY_RECTANGLE)
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.count > 0 || self.full_damage
    }

    #[inline]
    pub fn is_full_damage(&self) -> bool {
        self.full_damage
    }

    #[inline]
    pub fn set_full_damage(&mut self) {
        self.full_damage = true;
    }
}
