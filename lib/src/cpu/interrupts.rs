//! Interrupt flag management: sti, cli, irqsave/irqrestore.

use x86_64::instructions::interrupts;
use x86_64::registers::rflags::{self, RFlags};

/// Enable interrupts (STI).
#[inline(always)]
pub fn enable_interrupts() {
    interrupts::enable();
}

/// Disable interrupts (CLI).
#[inline(always)]
pub fn disable_interrupts() {
    interrupts::disable();
}

/// Save RFLAGS and disable interrupts (irqsave pattern).
/// Returns the saved RFLAGS value.
#[inline(always)]
pub fn save_flags_cli() -> u64 {
    let flags = rflags::read_raw();
    interrupts::disable();
    flags
}

/// Restore interrupt flag from saved RFLAGS (irqrestore pattern).
/// Only re-enables interrupts if they were enabled in the saved flags.
#[inline(always)]
pub fn restore_flags(flags: u64) {
    if RFlags::from_bits_truncate(flags).contains(RFlags::INTERRUPT_FLAG) {
        enable_interrupts();
    }
}
