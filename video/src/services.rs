//! Real-mode service registration.
//!
//! The platform layer owns the mechanism for dropping to 16-bit mode and
//! calling the BIOS. It hands this crate a table of entry points once, early
//! in boot; [`BiosDisplay`] forwards the mode controller's calls to it.

use spin::Once;

use prism_abi::vbe::RealRegisters;
use prism_abi::video::{VideoError, VideoResult};
use prism_lib::klog_debug;

use crate::hardware::DisplayHardware;

/// Entry points into the platform's real-mode bridge.
pub struct RealModeServices {
    /// Run `int 10h`; `false` when the bridge could not make the call.
    pub int10: fn(&mut RealRegisters, &mut [u8]) -> bool,
    /// Copy from real-mode memory; `false` when the range is not readable.
    pub read_real_memory: fn(u16, u16, &mut [u8]) -> bool,
    /// Map physical memory; null on failure.
    pub map_physical: fn(u64, usize) -> *mut u8,
    pub unmap_physical: fn(*mut u8, usize),
}

static REAL_MODE_SERVICES: Once<&'static RealModeServices> = Once::new();

/// Install the bridge. Only the first registration takes effect.
pub fn register_real_mode_services(services: &'static RealModeServices) {
    REAL_MODE_SERVICES.call_once(|| services);
    klog_debug!("video: real-mode services registered");
}

pub fn real_mode_services() -> Option<&'static RealModeServices> {
    REAL_MODE_SERVICES.get().copied()
}

/// [`DisplayHardware`] backed by the registered real-mode services.
#[derive(Copy, Clone, Debug, Default)]
pub struct BiosDisplay;

impl BiosDisplay {
    fn services() -> VideoResult<&'static RealModeServices> {
        real_mode_services().ok_or(VideoError::BridgeUnavailable)
    }
}

impl DisplayHardware for BiosDisplay {
    fn int10(&mut self, regs: &mut RealRegisters, transfer: &mut [u8]) -> VideoResult {
        if (Self::services()?.int10)(regs, transfer) {
            Ok(())
        } else {
            Err(VideoError::BridgeUnavailable)
        }
    }

    fn read_real_memory(&mut self, segment: u16, offset: u16, out: &mut [u8]) -> VideoResult {
        if (Self::services()?.read_real_memory)(segment, offset, out) {
            Ok(())
        } else {
            Err(VideoError::BridgeUnavailable)
        }
    }

    fn map_framebuffer(&mut self, phys: u64, len: usize) -> VideoResult<*mut u8> {
        let base = (Self::services()?.map_physical)(phys, len);
        if base.is_null() {
            return Err(VideoError::MappingFailed);
        }
        Ok(base)
    }

    fn unmap_framebuffer(&mut self, base: *mut u8, len: usize) {
        if let Some(services) = real_mode_services() {
            (services.unmap_physical)(base, len);
        }
    }
}
