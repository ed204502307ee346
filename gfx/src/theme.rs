use prism_abi::pixel::Color32;

use crate::glyph::GLYPH_HEIGHT;

// Window Sizes
pub const BORDER_WIDTH: i32 = 1;
pub const TITLE_BAR_HEIGHT: i32 = GLYPH_HEIGHT + 4;
pub const TITLE_TEXT_INSET: i32 = 6;

// Keyboard drag step, in pixels
pub const DRAG_STEP: i32 = 8;

// Colors
pub const COLOR_DESKTOP: Color32 = Color32::rgb(0x00, 0x11, 0x22);
pub const COLOR_WINDOW_BG: Color32 = Color32::rgb(0x25, 0x25, 0x26);
pub const COLOR_TITLE_BAR: Color32 = Color32::rgb(0x1E, 0x1E, 0x1E);
pub const COLOR_TITLE_BAR_FOCUSED: Color32 = Color32::rgb(0x2D, 0x2D, 0x80);
pub const COLOR_BORDER: Color32 = Color32::rgb(0x3E, 0x3E, 0x42);
pub const COLOR_TEXT: Color32 = Color32::rgb(0xE0, 0xE0, 0xE0);
