//! The privileged operations the mode controller needs from the platform.

use prism_abi::vbe::RealRegisters;
use prism_abi::video::{VideoError, VideoResult};

/// Access to the display adapter's real-mode BIOS and to video memory.
///
/// `Err` from any method means the call could not be issued at all. A call
/// that ran but was refused by the BIOS returns `Ok` with the BIOS status
/// left in `regs.ax`.
pub trait DisplayHardware {
    /// Issue `int 10h`. `transfer` is the low-memory block `ES:DI` points
    /// at; it is copied in before the call and back out after it.
    fn int10(&mut self, regs: &mut RealRegisters, transfer: &mut [u8]) -> VideoResult;

    /// Copy `out.len()` bytes starting at real-mode address `segment:offset`.
    fn read_real_memory(&mut self, segment: u16, offset: u16, out: &mut [u8]) -> VideoResult;

    /// Map `len` bytes of physical video memory for CPU writes.
    fn map_framebuffer(&mut self, phys: u64, len: usize) -> VideoResult<*mut u8>;

    /// Release a mapping returned by `map_framebuffer`.
    fn unmap_framebuffer(&mut self, _base: *mut u8, _len: usize) {}
}

/// Hardware for machines with no real-mode bridge. Every call fails, so the
/// compositor stays in text mode and only draws into its back buffer.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoDisplay;

impl DisplayHardware for NoDisplay {
    fn int10(&mut self, _regs: &mut RealRegisters, _transfer: &mut [u8]) -> VideoResult {
        Err(VideoError::BridgeUnavailable)
    }

    fn read_real_memory(&mut self, _segment: u16, _offset: u16, _out: &mut [u8]) -> VideoResult {
        Err(VideoError::BridgeUnavailable)
    }

    fn map_framebuffer(&mut self, _phys: u64, _len: usize) -> VideoResult<*mut u8> {
        Err(VideoError::BridgeUnavailable)
    }
}
