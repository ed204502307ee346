//! Scalar alpha blending.

use prism_abi::pixel::{Color32, RgbaGroup};

/// `p1 * alpha + p2 * (1 - alpha)`.
///
/// `alpha` is not validated; callers clamp it to `[0, 1]` when they need to.
#[inline]
pub fn alpha_blending(p1: f32, p2: f32, alpha: f32) -> f32 {
    p1 * alpha + p2 * (1.0 - alpha)
}

/// Blend one 8-bit channel, rounding to nearest and saturating.
#[inline]
pub fn blend_channel(src: u8, dst: u8, alpha: f32) -> u8 {
    let value = alpha_blending(src as f32, dst as f32, alpha).clamp(0.0, 255.0);
    (value + 0.5) as u8
}

/// Composite `color` over `dst` using the colour's own alpha byte.
pub fn blend_over(dst: RgbaGroup, color: Color32) -> RgbaGroup {
    match color.alpha() {
        0 => dst,
        0xFF => color.to_rgba_group(),
        a => {
            let alpha = a as f32 / 255.0;
            [
                blend_channel(color.red(), dst[0], alpha),
                blend_channel(color.green(), dst[1], alpha),
                blend_channel(color.blue(), dst[2], alpha),
                blend_channel(0xFF, dst[3], alpha),
            ]
        }
    }
}
