//! Text/graphics mode switching through VBE.

use alloc::vec::Vec;

use prism_abi::geometry::{SCREEN_HEIGHT, SCREEN_WIDTH};
use prism_abi::pixel::PixelFormat;
use prism_abi::vbe::{
    RealRegisters, VBE_CONTROLLER_INFO_SIZE, VBE_GET_CONTROLLER_INFO, VBE_GET_CURRENT_MODE,
    VBE_GET_MODE_INFO, VBE_MAX_MODES, VBE_MODE_INFO_SIZE, VBE_MODE_LINEAR_FRAMEBUFFER,
    VBE_MODE_LIST_END, VBE_SET_MODE, VGA_LEGACY_MODE_MAX, VbeControllerInfo, VbeModeInfo,
};
use prism_abi::video::{DisplayMode, VideoError, VideoResult};
use prism_lib::{klog_debug, klog_info, klog_warn};

use crate::framebuffer::LinearFramebuffer;
use crate::hardware::DisplayHardware;

/// Mode number bits that carry flags rather than the mode itself.
const MODE_NUMBER_MASK: u16 = 0x3FFF;

/// Owns the adapter's mode state and, while in video mode, the mapping of
/// its framebuffer.
pub struct ModeController<H> {
    hardware: H,
    mode: DisplayMode,
    original_mode: Option<u16>,
    active_mode: Option<u16>,
    framebuffer: Option<LinearFramebuffer>,
}

impl<H: DisplayHardware> ModeController<H> {
    /// No hardware is touched until a mode switch is requested.
    pub const fn new(hardware: H) -> Self {
        Self {
            hardware,
            mode: DisplayMode::Text,
            original_mode: None,
            active_mode: None,
            framebuffer: None,
        }
    }

    #[inline]
    pub fn display_mode(&self) -> DisplayMode {
        self.mode
    }

    /// Mode that was active before the first switch to video.
    #[inline]
    pub fn original_mode(&self) -> Option<u16> {
        self.original_mode
    }

    /// The negotiated VBE mode while in video mode.
    #[inline]
    pub fn active_mode(&self) -> Option<u16> {
        self.active_mode
    }

    #[inline]
    pub fn framebuffer(&self) -> Option<&LinearFramebuffer> {
        self.framebuffer.as_ref()
    }

    #[inline]
    pub fn framebuffer_mut(&mut self) -> Option<&mut LinearFramebuffer> {
        self.framebuffer.as_mut()
    }

    #[inline]
    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    /// Run one VBE function and check the status it leaves in `AX`.
    fn vbe_call(&mut self, regs: &mut RealRegisters, transfer: &mut [u8]) -> VideoResult {
        let function = regs.ax;
        self.hardware.int10(regs, transfer)?;
        if !regs.vbe_succeeded() {
            return Err(VideoError::BiosCallFailed {
                function,
                status: regs.ax,
            });
        }
        Ok(())
    }

    pub fn controller_info(&mut self) -> VideoResult<VbeControllerInfo> {
        let mut block = [0u8; VBE_CONTROLLER_INFO_SIZE];
        block[0..4].copy_from_slice(&VbeControllerInfo::REQUEST_SIGNATURE);
        let mut regs = RealRegisters::vbe(VBE_GET_CONTROLLER_INFO);
        self.vbe_call(&mut regs, &mut block)?;
        VbeControllerInfo::parse(&block).ok_or(VideoError::InvalidControllerInfo)
    }

    /// Mode numbers the adapter advertises, up to the list terminator.
    pub fn mode_list(&mut self, info: &VbeControllerInfo) -> VideoResult<Vec<u16>> {
        let mut raw = [0u8; VBE_MAX_MODES * 2];
        self.hardware.read_real_memory(
            info.mode_list.segment,
            info.mode_list.offset,
            &mut raw,
        )?;
        Ok(raw
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .take_while(|&mode| mode != VBE_MODE_LIST_END)
            .collect())
    }

    pub fn mode_info(&mut self, mode: u16) -> VideoResult<VbeModeInfo> {
        let mut block = [0u8; VBE_MODE_INFO_SIZE];
        let mut regs = RealRegisters::vbe(VBE_GET_MODE_INFO);
        regs.cx = mode;
        self.vbe_call(&mut regs, &mut block)?;
        VbeModeInfo::parse(&block).ok_or(VideoError::BiosCallFailed {
            function: VBE_GET_MODE_INFO,
            status: regs.ax,
        })
    }

    /// Best mode at the screen resolution: linear, direct colour, 24 or
    /// 32 bits per pixel, preferring 32.
    pub fn find_mode(&mut self, modes: &[u16]) -> VideoResult<(u16, VbeModeInfo)> {
        let mut best: Option<(u16, VbeModeInfo)> = None;
        for &number in modes {
            let info = match self.mode_info(number) {
                Ok(info) => info,
                Err(err) => {
                    klog_debug!("video: mode 0x{:x} skipped: {:?}", number, err);
                    continue;
                }
            };
            if !info.is_linear_graphics()
                || info.width as i32 != SCREEN_WIDTH
                || info.height as i32 != SCREEN_HEIGHT
                || PixelFormat::from_bpp(info.bits_per_pixel).is_none()
            {
                continue;
            }
            let better = match best {
                Some((_, current)) => info.bits_per_pixel > current.bits_per_pixel,
                None => true,
            };
            if better {
                best = Some((number, info));
            }
        }
        best.ok_or(VideoError::ModeUnavailable)
    }

    pub fn current_mode(&mut self) -> VideoResult<u16> {
        let mut regs = RealRegisters::vbe(VBE_GET_CURRENT_MODE);
        self.vbe_call(&mut regs, &mut [])?;
        Ok(regs.bx & MODE_NUMBER_MASK)
    }

    /// Set `mode`, using the legacy BIOS call for VGA mode numbers.
    fn set_mode(&mut self, mode: u16) -> VideoResult {
        if mode & MODE_NUMBER_MASK <= VGA_LEGACY_MODE_MAX {
            // AH=00h, AL=mode. The legacy call reports no status.
            let mut regs = RealRegisters::vbe(mode & VGA_LEGACY_MODE_MAX);
            return self.hardware.int10(&mut regs, &mut []);
        }
        let mut regs = RealRegisters::vbe(VBE_SET_MODE);
        regs.bx = mode;
        self.vbe_call(&mut regs, &mut [])
    }

    /// Switch to the screen-sized linear graphics mode.
    ///
    /// State is committed only after every step has succeeded; on error the
    /// controller is still in text mode with nothing mapped.
    pub fn enter_video_mode(&mut self) -> VideoResult {
        if self.mode == DisplayMode::Video {
            return Ok(());
        }

        let info = self.controller_info()?;
        let modes = self.mode_list(&info)?;
        let (number, mode) = self.find_mode(&modes)?;
        let format =
            PixelFormat::from_bpp(mode.bits_per_pixel).ok_or(VideoError::ModeUnavailable)?;

        let original = match self.original_mode {
            Some(original) => original,
            None => self.current_mode()?,
        };

        let size = mode.buffer_size();
        let base = self.hardware.map_framebuffer(mode.framebuffer as u64, size)?;
        // SAFETY: `map_framebuffer` returned a writable mapping of `size` bytes
        // that stays valid until `unmap_framebuffer`.
        let framebuffer = unsafe {
            LinearFramebuffer::new(
                base,
                size,
                mode.pitch as usize,
                mode.width as i32,
                mode.height as i32,
                format,
            )
        };
        let Some(framebuffer) = framebuffer else {
            self.hardware.unmap_framebuffer(base, size);
            return Err(VideoError::MappingFailed);
        };

        if let Err(err) = self.set_mode(number | VBE_MODE_LINEAR_FRAMEBUFFER) {
            self.hardware.unmap_framebuffer(base, size);
            return Err(err);
        }

        self.original_mode = Some(original);
        self.active_mode = Some(number);
        self.framebuffer = Some(framebuffer);
        self.mode = DisplayMode::Video;
        klog_info!(
            "video: mode 0x{:x} {}x{} {}bpp pitch {} at 0x{:x}",
            number,
            mode.width,
            mode.height,
            mode.bits_per_pixel,
            mode.pitch,
            mode.framebuffer
        );
        Ok(())
    }

    /// Restore the mode that was active before video mode. Never fails;
    /// bridge errors are logged.
    pub fn enter_text_mode(&mut self) {
        if let Some(framebuffer) = self.framebuffer.take() {
            self.hardware
                .unmap_framebuffer(framebuffer.base(), framebuffer.size());
        }

        match self.original_mode {
            Some(original) => {
                if let Err(err) = self.set_mode(original) {
                    klog_warn!("video: restoring mode 0x{:x} failed: {:?}", original, err);
                }
            }
            None => match self.current_mode() {
                Ok(current) => self.original_mode = Some(current),
                Err(err) => klog_warn!("video: querying current mode failed: {:?}", err),
            },
        }

        self.active_mode = None;
        self.mode = DisplayMode::Text;
    }
}
