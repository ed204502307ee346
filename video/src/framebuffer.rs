use core::ptr;

use prism_abi::geometry::Rectangle;
use prism_abi::pixel::{PixelFormat, RgbaGroup};
use prism_gfx::surface::PixelSurface;

/// Pixels encoded per bulk copy.
const FLUSH_CHUNK_PIXELS: usize = 128;

/// Mapped video memory of the negotiated mode.
pub struct LinearFramebuffer {
    base: *mut u8,
    size: usize,
    pitch: usize,
    width: i32,
    height: i32,
    format: PixelFormat,
}

// SAFETY: the mapping is only reached through the compositor lock.
unsafe impl Send for LinearFramebuffer {}

impl LinearFramebuffer {
    /// Wrap a mapping. Returns `None` when the geometry does not fit in
    /// `size` bytes.
    ///
    /// # Safety
    /// `base` must be valid for writes of `size` bytes for as long as the
    /// returned value exists.
    pub unsafe fn new(
        base: *mut u8,
        size: usize,
        pitch: usize,
        width: i32,
        height: i32,
        format: PixelFormat,
    ) -> Option<Self> {
        if base.is_null() || width <= 0 || height <= 0 {
            return None;
        }
        let row_bytes = (width as usize).checked_mul(format.bytes_per_pixel())?;
        if pitch < row_bytes || pitch.checked_mul(height as usize)? > size {
            return None;
        }
        Some(Self {
            base,
            size,
            pitch,
            width,
            height,
            format,
        })
    }

    #[inline]
    pub fn base(&self) -> *mut u8 {
        self.base
    }

    /// Mapped bytes, `pitch * height` of the negotiated mode.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
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
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    fn checked_ptr(&self, offset: usize, len: usize) -> Option<*mut u8> {
        let end = offset.checked_add(len)?;
        if end > self.size {
            return None;
        }
        // SAFETY: offset and len were bounds-checked against the mapping above.
        Some(unsafe { self.base.add(offset) })
    }

    /// Encode `pixels` into row `y` starting at column `x`. Pixels past the
    /// right edge are dropped.
    pub fn write_row(&mut self, x: i32, y: i32, pixels: &[RgbaGroup]) -> bool {
        if y < 0 || y >= self.height || x < 0 || x >= self.width {
            return false;
        }
        let count = pixels.len().min((self.width - x) as usize);
        let bpp = self.format.bytes_per_pixel();
        let mut offset = y as usize * self.pitch + x as usize * bpp;
        let mut encoded = [0u8; FLUSH_CHUNK_PIXELS * 4];

        for chunk in pixels[..count].chunks(FLUSH_CHUNK_PIXELS) {
            let len = chunk.len() * bpp;
            for (px, out) in chunk.iter().zip(encoded.chunks_exact_mut(bpp)) {
                self.format.encode(*px, out);
            }
            let Some(dst) = self.checked_ptr(offset, len) else {
                return false;
            };
            // SAFETY: dst range checked by checked_ptr; `encoded` is a local buffer.
            unsafe {
                ptr::copy_nonoverlapping(encoded.as_ptr(), dst, len);
            }
            offset += len;
        }
        true
    }

    /// Copy `rect` of the back buffer into video memory.
    pub fn flush_rect(&mut self, surface: &PixelSurface, rect: &Rectangle) {
        let area = rect
            .intersection(&surface.rect())
            .intersection(&Rectangle::new(0, 0, self.width, self.height));
        if area.is_empty() {
            return;
        }
        for y in area.y1..area.y2 {
            let row = surface.row(y);
            self.write_row(area.x1, y, &row[area.x1 as usize..area.x2 as usize]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use prism_abi::pixel::Color32;

    #[test]
    fn rejects_geometry_larger_than_mapping() {
        let mut vram = vec![0u8; 64];
        let base = vram.as_mut_ptr();
        let fmt = PixelFormat::Xrgb8888;
        assert!(unsafe { LinearFramebuffer::new(base, 64, 16, 4, 4, fmt) }.is_some());
        assert!(unsafe { LinearFramebuffer::new(base, 64, 16, 4, 5, fmt) }.is_none());
        assert!(unsafe { LinearFramebuffer::new(base, 64, 8, 4, 4, fmt) }.is_none());
        assert!(unsafe { LinearFramebuffer::new(ptr::null_mut(), 64, 16, 4, 4, fmt) }.is_none());
    }

    #[test]
    fn flush_converts_to_bgr() {
        let mut surface = PixelSurface::with_size(4, 2);
        surface.fill_rect(&Rectangle::new(1, 0, 3, 1), Color32::rgb(0x11, 0x22, 0x33));

        let mut vram = vec![0xAAu8; 3 * 4 * 2];
        let mut fb = unsafe {
            LinearFramebuffer::new(vram.as_mut_ptr(), vram.len(), 12, 4, 2, PixelFormat::Rgb888)
        }
        .expect("fits");
        fb.flush_rect(&surface, &Rectangle::new(1, 0, 2, 1));

        assert_eq!(&vram[0..3], &[0xAA, 0xAA, 0xAA]);
        assert_eq!(&vram[3..6], &[0x33, 0x22, 0x11]);
        assert_eq!(&vram[6..9], &[0xAA, 0xAA, 0xAA]);
    }

    #[test]
    fn long_rows_are_written_in_chunks() {
        let width = FLUSH_CHUNK_PIXELS as i32 * 2 + 3;
        let mut surface = PixelSurface::with_size(width, 1);
        surface.clear(Color32::rgb(1, 2, 3));

        let mut vram = vec![0u8; width as usize * 4];
        let len = vram.len();
        let fmt = PixelFormat::Xrgb8888;
        let mut fb =
            unsafe { LinearFramebuffer::new(vram.as_mut_ptr(), len, len, width, 1, fmt) }
                .expect("fits");
        fb.flush_rect(&surface, &surface.rect());
        assert!(vram.chunks_exact(4).all(|px| px == &[3, 2, 1, 0]));
    }

    #[test]
    fn out_of_range_rows_are_ignored() {
        let mut vram = vec![0u8; 16];
        let mut fb = unsafe {
            LinearFramebuffer::new(vram.as_mut_ptr(), 16, 8, 2, 2, PixelFormat::Xrgb8888)
        }
        .expect("fits");
        assert!(!fb.write_row(0, 2, &[[1, 1, 1, 1]]));
        assert!(!fb.write_row(2, 0, &[[1, 1, 1, 1]]));
        assert!(fb.write_row(1, 1, &[[9, 9, 9, 9], [8, 8, 8, 8]]));
        assert_eq!(&vram[12..16], &[9, 9, 9, 0]);
        assert!(vram[..12].iter().all(|b| *b == 0));
    }
}
