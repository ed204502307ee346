//! Prism display ABI types
//!
//! Plain value types shared by the rendering core, the video driver and the
//! keyboard glue:
//! - Screen geometry and the `Rectangle` used for every clip and dirty region
//! - Pixel groups, colours and framebuffer pixel formats
//! - Kernel key codes delivered by the keyboard decoder
//! - VBE real-mode register frames and info blocks
//! - Display mode and video error types
//!
//! Nothing in here touches hardware.

#![no_std]
#![forbid(unsafe_code)]

pub mod geometry;
pub mod keycode;
pub mod pixel;
pub mod vbe;
pub mod video;

pub use geometry::{
    EMPTY_RECTANGLE, Rectangle, SCREEN_HEIGHT, SCREEN_RGB_SIZE, SCREEN_RGBA_SIZE, SCREEN_WIDTH,
    rgb_size, rgba_size,
};
pub use pixel::{Color32, PixelFormat, RgbGroup, RgbaGroup};
pub use video::{DisplayMode, VideoError, VideoResult};
