//! Fixed-width glyph cells.
//!
//! Glyphs come from the `font8x8` basic set. Each 8x8 bitmap row is drawn
//! twice so a cell is 8 pixels wide and 16 tall, giving a 128 x 48 text grid
//! on the 1024 x 768 surface. Bit 0 of a bitmap row is the leftmost pixel.

use font8x8::UnicodeFonts;
use prism_abi::geometry::{Rectangle, SCREEN_HEIGHT, SCREEN_WIDTH};
use prism_abi::pixel::Color32;

use crate::surface::PixelSurface;

pub const GLYPH_WIDTH: i32 = 8;
pub const GLYPH_HEIGHT: i32 = 16;
const GLYPH_ROW_SCALE: i32 = GLYPH_HEIGHT / 8;

pub const TEXT_COLUMNS: i32 = SCREEN_WIDTH / GLYPH_WIDTH;
pub const TEXT_ROWS: i32 = SCREEN_HEIGHT / GLYPH_HEIGHT;

/// Bitmap for `ch`; characters outside the basic set render as `?`.
pub fn glyph_bitmap(ch: u8) -> [u8; 8] {
    font8x8::BASIC_FONTS
        .get(ch as char)
        .or_else(|| font8x8::BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Screen rectangle of text-grid cell `(col, row)`.
#[inline]
pub const fn glyph_cell(col: i32, row: i32) -> Rectangle {
    Rectangle::from_size(col * GLYPH_WIDTH, row * GLYPH_HEIGHT, GLYPH_WIDTH, GLYPH_HEIGHT)
}

/// Draw the cell whose top-left corner is `(x, y)`, touching only pixels
/// inside `clip`. Background pixels are left alone when `bg` is `None`.
pub fn draw_glyph(
    surface: &mut PixelSurface,
    x: i32,
    y: i32,
    ch: u8,
    fg: Color32,
    bg: Option<Color32>,
    clip: &Rectangle,
) {
    let cell = Rectangle::from_size(x, y, GLYPH_WIDTH, GLYPH_HEIGHT);
    let area = surface.clip(&cell.intersection(clip));
    if area.is_empty() {
        return;
    }

    let bitmap = glyph_bitmap(ch);
    for py in area.y1..area.y2 {
        let bits = bitmap[((py - y) / GLYPH_ROW_SCALE) as usize];
        for px in area.x1..area.x2 {
            if (bits >> (px - x)) & 1 != 0 {
                surface.paint(px, py, fg);
            } else if let Some(bg) = bg {
                surface.paint(px, py, bg);
            }
        }
    }
}

/// Pixel width of `text` on one line.
#[inline]
pub fn string_width(text: &[u8]) -> i32 {
    text.len() as i32 * GLYPH_WIDTH
}

/// Draw `text` left to right from `(x, y)` without wrapping.
pub fn draw_text(
    surface: &mut PixelSurface,
    x: i32,
    y: i32,
    text: &[u8],
    fg: Color32,
    clip: &Rectangle,
) {
    let mut cx = x;
    for &ch in text {
        if cx >= clip.x2 {
            break;
        }
        draw_glyph(surface, cx, y, ch, fg, None, clip);
        cx += GLYPH_WIDTH;
    }
}
