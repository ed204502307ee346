//! Screen geometry: display constants and the axis-aligned `Rectangle`.

/// Width of the composed surface and of the negotiated graphics mode.
pub const SCREEN_WIDTH: i32 = 1024;
/// Height of the composed surface and of the negotiated graphics mode.
pub const SCREEN_HEIGHT: i32 = 768;

/// Byte size of a `width` x `height` buffer of 4-byte RGBA groups.
#[inline]
pub const fn rgba_size(width: i32, height: i32) -> usize {
    width as usize * height as usize * 4
}

/// Byte size of a `width` x `height` buffer of 3-byte RGB groups.
#[inline]
pub const fn rgb_size(width: i32, height: i32) -> usize {
    width as usize * height as usize * 3
}

pub const SCREEN_RGBA_SIZE: usize = rgba_size(SCREEN_WIDTH, SCREEN_HEIGHT);
pub const SCREEN_RGB_SIZE: usize = rgb_size(SCREEN_WIDTH, SCREEN_HEIGHT);

/// Axis-aligned rectangle in absolute screen coordinates.
///
/// `(x1, y1)` is the top-left corner, `(x2, y2)` the bottom-right one.
/// Callers keep `x1 <= x2` and `y1 <= y2`; nothing here enforces it.
///
/// Point and overlap tests treat all four edges as inclusive. Pixel coverage
/// is half-open: the rectangle owns columns `x1..x2` and rows `y1..y2`, so
/// `Rectangle::screen()` is `(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT)` and a
/// bound rectangle never addresses a pixel outside the surface.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Sentinel for "no changed region": inverted and far off screen.
pub const EMPTY_RECTANGLE: Rectangle = Rectangle::new(-1000, -1000, -2000, -2000);

impl Rectangle {
    #[inline]
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Rectangle with its top-left corner at `(x, y)`.
    #[inline]
    pub const fn from_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// The whole screen.
    #[inline]
    pub const fn screen() -> Self {
        Self::new(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    #[inline]
    pub const fn bound_x(input: i32) -> i32 {
        if input < 0 {
            0
        } else if input > SCREEN_WIDTH {
            SCREEN_WIDTH
        } else {
            input
        }
    }

    #[inline]
    pub const fn bound_y(input: i32) -> i32 {
        if input < 0 {
            0
        } else if input > SCREEN_HEIGHT {
            SCREEN_HEIGHT
        } else {
            input
        }
    }

    /// Clamp every coordinate into `[0, SCREEN_WIDTH] x [0, SCREEN_HEIGHT]`.
    #[inline]
    pub const fn bound(&self) -> Self {
        Self {
            x1: Self::bound_x(self.x1),
            y1: Self::bound_y(self.y1),
            x2: Self::bound_x(self.x2),
            y2: Self::bound_y(self.y2),
        }
    }

    #[inline]
    pub const fn has_point(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Separating-axis test on both dimensions.
    #[inline]
    pub const fn overlaps_with(&self, other: &Rectangle) -> bool {
        if self.x1 > other.x2 || other.x1 > self.x2 {
            return false;
        }
        if self.y1 > other.y2 || other.y1 > self.y2 {
            return false;
        }
        true
    }

    /// True when the rectangle covers no pixel.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }

    #[inline]
    pub const fn width(&self) -> i32 {
        if self.x2 > self.x1 { self.x2 - self.x1 } else { 0 }
    }

    #[inline]
    pub const fn height(&self) -> i32 {
        if self.y2 > self.y1 { self.y2 - self.y1 } else { 0 }
    }

    /// Number of pixels covered.
    #[inline]
    pub const fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// Overlap of two rectangles. May be empty; check with `is_empty`.
    #[inline]
    pub fn intersection(&self, other: &Rectangle) -> Self {
        Self {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        }
    }

    /// Bounding box of two rectangles.
    #[inline]
    pub fn union(&self, other: &Rectangle) -> Self {
        Self {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Pixel count of the bounding box of `self` and `other`.
    #[inline]
    pub fn combined_area(&self, other: &Rectangle) -> i64 {
        self.union(other).area()
    }

    #[inline]
    pub const fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }
}
