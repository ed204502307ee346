//! Scripted BIOS for host tests.

use alloc::vec;
use alloc::vec::Vec;

use prism_abi::vbe::{
    FarPtr, MEMORY_MODEL_DIRECT_COLOR, ModeAttributes, RealRegisters, VBE_CONTROLLER_INFO_SIZE,
    VBE_GET_CONTROLLER_INFO, VBE_GET_CURRENT_MODE, VBE_GET_MODE_INFO, VBE_SET_MODE, VBE_SUCCESS,
    VbeModeInfo,
};
use prism_abi::video::{VideoError, VideoResult};
use prism_lib::klog::{klog_discard, klog_register_backend};

use crate::hardware::DisplayHardware;

pub const MODE_LIST_PTR: FarPtr = FarPtr {
    segment: 0x2000,
    offset: 0x0010,
};
const VBE_FAILED: u16 = 0x014F;

pub const MODE_640X480X32: u16 = 0x112;
pub const MODE_1024X768X24: u16 = 0x118;
pub const MODE_1024X768X32: u16 = 0x144;
pub const TEXT_MODE: u16 = 0x03;

pub fn mode(width: u16, height: u16, bpp: u8) -> VbeModeInfo {
    VbeModeInfo {
        attributes: ModeAttributes::SUPPORTED
            | ModeAttributes::COLOR
            | ModeAttributes::GRAPHICS
            | ModeAttributes::LINEAR_FRAMEBUFFER,
        pitch: width * (bpp as u16 / 8),
        width,
        height,
        bits_per_pixel: bpp,
        memory_model: MEMORY_MODEL_DIRECT_COLOR,
        framebuffer: 0xFD00_0000,
    }
}

pub struct FakeBios {
    pub modes: Vec<(u16, VbeModeInfo)>,
    pub current_mode: u16,
    /// Every mode number passed to `4F02`, flags included.
    pub vbe_sets: Vec<u16>,
    /// Every mode number passed to legacy `AH=00h`.
    pub legacy_sets: Vec<u16>,
    pub vram: Vec<u8>,
    pub mapped: Option<(u64, usize)>,
    pub refuse_set_mode: bool,
    pub bad_signature: bool,
}

impl FakeBios {
    pub fn new(modes: Vec<(u16, VbeModeInfo)>) -> Self {
        klog_register_backend(klog_discard);
        Self {
            modes,
            current_mode: TEXT_MODE,
            vbe_sets: Vec::new(),
            legacy_sets: Vec::new(),
            vram: Vec::new(),
            mapped: None,
            refuse_set_mode: false,
            bad_signature: false,
        }
    }

    /// Adapter offering 640x480 and both 1024x768 depths.
    pub fn standard() -> Self {
        Self::new(vec![
            (MODE_640X480X32, mode(640, 480, 32)),
            (MODE_1024X768X24, mode(1024, 768, 24)),
            (MODE_1024X768X32, mode(1024, 768, 32)),
        ])
    }

    /// Bytes of pixel `(x, y)` in the 32 bpp mode.
    pub fn vram_pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let at = y * 1024 * 4 + x * 4;
        [self.vram[at], self.vram[at + 1], self.vram[at + 2], self.vram[at + 3]]
    }
}

impl DisplayHardware for FakeBios {
    fn int10(&mut self, regs: &mut RealRegisters, transfer: &mut [u8]) -> VideoResult {
        match regs.ax {
            VBE_GET_CONTROLLER_INFO => {
                transfer[..VBE_CONTROLLER_INFO_SIZE].fill(0);
                let signature = if self.bad_signature { b"VBE2" } else { b"VESA" };
                transfer[0..4].copy_from_slice(signature);
                transfer[4..6].copy_from_slice(&0x0300u16.to_le_bytes());
                let ptr = ((MODE_LIST_PTR.segment as u32) << 16) | MODE_LIST_PTR.offset as u32;
                transfer[14..18].copy_from_slice(&ptr.to_le_bytes());
                transfer[18..20].copy_from_slice(&256u16.to_le_bytes());
                regs.ax = VBE_SUCCESS;
            }
            VBE_GET_MODE_INFO => {
                let found = self.modes.iter().find(|(number, _)| *number == regs.cx);
                match found {
                    Some((_, info)) => {
                        transfer.fill(0);
                        info.write_to(transfer);
                        regs.ax = VBE_SUCCESS;
                    }
                    None => regs.ax = VBE_FAILED,
                }
            }
            VBE_SET_MODE => {
                self.vbe_sets.push(regs.bx);
                if self.refuse_set_mode {
                    regs.ax = VBE_FAILED;
                } else {
                    self.current_mode = regs.bx & 0x3FFF;
                    regs.ax = VBE_SUCCESS;
                }
            }
            VBE_GET_CURRENT_MODE => {
                regs.bx = self.current_mode;
                regs.ax = VBE_SUCCESS;
            }
            ax if ax & 0xFF00 == 0 => {
                self.legacy_sets.push(ax & 0xFF);
                self.current_mode = ax & 0xFF;
            }
            _ => regs.ax = VBE_FAILED,
        }
        Ok(())
    }

    fn read_real_memory(&mut self, segment: u16, offset: u16, out: &mut [u8]) -> VideoResult {
        out.fill(0xFF);
        if (FarPtr { segment, offset }).linear() != MODE_LIST_PTR.linear() {
            return Err(VideoError::BridgeUnavailable);
        }
        for (slot, (number, _)) in out.chunks_exact_mut(2).zip(&self.modes) {
            slot.copy_from_slice(&number.to_le_bytes());
        }
        Ok(())
    }

    fn map_framebuffer(&mut self, phys: u64, len: usize) -> VideoResult<*mut u8> {
        self.vram = vec![0; len];
        self.mapped = Some((phys, len));
        Ok(self.vram.as_mut_ptr())
    }

    fn unmap_framebuffer(&mut self, _base: *mut u8, _len: usize) {
        self.mapped = None;
    }
}
