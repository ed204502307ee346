#![no_std]
#![forbid(unsafe_op_in_unsafe_fn)]

extern crate alloc;

use spin::Once;

use prism_abi::video::VideoResult;
use prism_lib::{IrqMutex, klog_info, klog_warn};

pub mod compositor;
pub mod framebuffer;
pub mod hardware;
pub mod services;
pub mod vbe;

#[cfg(test)]
mod fake;
#[cfg(feature = "itests")]
pub mod selftest;

pub use compositor::{Compositor, KeyHooks, Modifiers};
pub use framebuffer::LinearFramebuffer;
pub use hardware::{DisplayHardware, NoDisplay};
pub use services::{BiosDisplay, RealModeServices, register_real_mode_services};
pub use vbe::ModeController;

pub type KernelCompositor = Compositor<BiosDisplay>;

static COMPOSITOR: Once<IrqMutex<KernelCompositor>> = Once::new();

/// The kernel's compositor, created on first use. Creation only allocates
/// the back buffer; the adapter stays in text mode until [`init`].
pub fn compositor() -> &'static IrqMutex<KernelCompositor> {
    COMPOSITOR.call_once(|| IrqMutex::new(Compositor::new(BiosDisplay)))
}

/// Run `f` with the compositor locked and interrupts off.
pub fn with_compositor<R>(f: impl FnOnce(&mut KernelCompositor) -> R) -> R {
    let mut guard = compositor().lock();
    f(&mut guard)
}

/// Keyboard entry point. Called from the keyboard interrupt; only state and
/// damage change here.
pub fn key_event(kkc: u32, capslock: bool) {
    with_compositor(|c| c.key(kkc, capslock));
}

/// Repaint whatever input handling damaged since the last call.
pub fn present() {
    with_compositor(Compositor::present);
}

// =============================================================================
// Initialization
// =============================================================================

/// Switch to the graphics mode and paint the desktop. On failure the
/// compositor stays usable in text mode, drawing only into its back buffer.
pub fn init() -> VideoResult {
    with_compositor(|c| match c.show() {
        Ok(()) => {
            c.log_state();
            Ok(())
        }
        Err(err) => {
            klog_warn!("video: staying in text mode ({:?})", err);
            Err(err)
        }
    })
}

/// Give the console back to the BIOS text mode.
pub fn shutdown() {
    with_compositor(|c| {
        c.hide();
        klog_info!("video: text mode restored");
    });
}
