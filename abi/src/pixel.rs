//! Pixel groups, colours and framebuffer pixel formats

/// One back-buffer pixel: `[r, g, b, a]`.
pub type RgbaGroup = [u8; 4];

/// Packed 3-byte pixel: `[r, g, b]`.
pub type RgbGroup = [u8; 3];

/// Construct an ARGB color value: 0xAARRGGBB (alpha high byte, blue low byte).
#[inline]
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Construct an opaque ARGB color value (alpha=0xFF).
#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    rgba(r, g, b, 0xFF)
}

/// Canonical color representation: 0xAARRGGBB.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct Color32(pub u32);

impl Color32 {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0x00000000);
    /// Opaque black.
    pub const BLACK: Self = Self(0xFF000000);
    /// Opaque white.
    pub const WHITE: Self = Self(0xFFFFFFFF);

    /// Construct from individual RGBA components.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(rgba(r, g, b, a))
    }

    /// Construct an opaque color from RGB.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(rgb(r, g, b))
    }

    #[inline]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    pub const fn is_opaque(self) -> bool {
        self.alpha() == 0xFF
    }

    /// Same color with a different alpha byte.
    #[inline]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self((self.0 & 0x00FF_FFFF) | ((alpha as u32) << 24))
    }

    #[inline]
    pub const fn to_rgba_group(self) -> RgbaGroup {
        [self.red(), self.green(), self.blue(), self.alpha()]
    }

    #[inline]
    pub const fn from_rgba_group(px: RgbaGroup) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }

    #[inline]
    pub const fn to_rgb_group(self) -> RgbGroup {
        [self.red(), self.green(), self.blue()]
    }
}

/// Layout of one pixel in mapped video memory.
///
/// VBE direct-colour modes on little-endian machines store blue first, so
/// the two formats a negotiated mode can report are:
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 32-bit XRGB. Memory layout: [B, G, R, X]
    #[default]
    Xrgb8888 = 1,
    /// 24-bit RGB. Memory layout: [B, G, R]
    Rgb888 = 2,
}

impl PixelFormat {
    /// Map a mode's reported bits per pixel to a supported format.
    #[inline]
    pub fn from_bpp(bpp: u8) -> Option<Self> {
        match bpp {
            32 => Some(Self::Xrgb8888),
            24 => Some(Self::Rgb888),
            _ => None,
        }
    }

    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Xrgb8888 => 4,
            Self::Rgb888 => 3,
        }
    }

    /// Encode one back-buffer pixel into `out`, which must hold exactly
    /// `bytes_per_pixel()` bytes.
    #[inline]
    pub fn encode(self, px: RgbaGroup, out: &mut [u8]) {
        match self {
            Self::Xrgb8888 => {
                out[0] = px[2];
                out[1] = px[1];
                out[2] = px[0];
                out[3] = 0;
            }
            Self::Rgb888 => {
                out[0] = px[2];
                out[1] = px[1];
                out[2] = px[0];
            }
        }
    }
}
