#![no_std]
#![allow(unsafe_op_in_unsafe_fn)]

pub mod irq;
pub mod ps2;

pub use ps2::keyboard;
