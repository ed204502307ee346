pub mod interrupts;

pub use interrupts::*;
