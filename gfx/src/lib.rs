//! CPU-side drawing: the back buffer, glyphs, blending, damage tracking and
//! the element tree that composes into them.

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod blend;
pub mod damage;
pub mod element;
pub mod glyph;
pub mod surface;
pub mod theme;

pub use blend::{alpha_blending, blend_channel, blend_over};
pub use damage::{DamageTracker, MAX_DAMAGE_REGIONS};
pub use element::{Container, DragState, Drawable, Element, ElementId, Visual, Window};
pub use surface::PixelSurface;
