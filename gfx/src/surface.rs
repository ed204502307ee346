//! The off-screen back buffer.

use alloc::vec;
use alloc::vec::Vec;

use prism_abi::geometry::{Rectangle, SCREEN_HEIGHT, SCREEN_WIDTH};
use prism_abi::pixel::{Color32, RgbaGroup};

use crate::blend::blend_over;

/// Row-major grid of `[r, g, b, a]` groups, `height` rows of `width`
/// columns. Every write is clipped to the surface.
pub struct PixelSurface {
    pixels: Vec<RgbaGroup>,
    width: i32,
    height: i32,
}

impl Default for PixelSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelSurface {
    /// Screen-sized surface, cleared to opaque black.
    pub fn new() -> Self {
        Self::with_size(SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    pub fn with_size(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            pixels: vec![Color32::BLACK.to_rgba_group(); (width * height) as usize],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn rect(&self) -> Rectangle {
        Rectangle::new(0, 0, self.width, self.height)
    }

    /// Intersect `rect` with the surface.
    #[inline]
    pub fn clip(&self, rect: &Rectangle) -> Rectangle {
        rect.intersection(&self.rect())
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    /// One full row. Rows outside the surface read as empty.
    pub fn row(&self, y: i32) -> &[RgbaGroup] {
        if y < 0 || y >= self.height {
            return &[];
        }
        let start = (y * self.width) as usize;
        &self.pixels[start..start + self.width as usize]
    }

    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<RgbaGroup> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    #[inline]
    pub fn put(&mut self, x: i32, y: i32, px: RgbaGroup) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = px;
        }
    }

    /// Write `color` at one pixel, compositing when it is translucent.
    #[inline]
    pub fn paint(&mut self, x: i32, y: i32, color: Color32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = blend_over(self.pixels[i], color);
        }
    }

    /// Overwrite every pixel of `rect` with `color`, alpha included.
    pub fn fill_rect(&mut self, rect: &Rectangle, color: Color32) {
        let clip = self.clip(rect);
        if clip.is_empty() {
            return;
        }
        let px = color.to_rgba_group();
        for y in clip.y1..clip.y2 {
            let start = (y * self.width + clip.x1) as usize;
            let end = (y * self.width + clip.x2) as usize;
            self.pixels[start..end].fill(px);
        }
    }

    /// Composite `color` over `rect`.
    pub fn blend_rect(&mut self, rect: &Rectangle, color: Color32) {
        if color.is_opaque() {
            self.fill_rect(rect, color);
            return;
        }
        if color.alpha() == 0 {
            return;
        }
        let clip = self.clip(rect);
        if clip.is_empty() {
            return;
        }
        for y in clip.y1..clip.y2 {
            let start = (y * self.width + clip.x1) as usize;
            let end = (y * self.width + clip.x2) as usize;
            for px in &mut self.pixels[start..end] {
                *px = blend_over(*px, color);
            }
        }
    }

    pub fn clear(&mut self, color: Color32) {
        self.pixels.fill(color.to_rgba_group());
    }
}
