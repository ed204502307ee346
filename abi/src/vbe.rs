//! VESA BIOS Extensions (VBE) register frames and info blocks.
//!
//! Layouts follow VBE 2.0/3.0. Info blocks are parsed from the raw bytes the
//! real-mode bridge copies out of low memory; no pointer into BIOS memory is
//! ever dereferenced here.

use bitflags::bitflags;

/// `AX` value returned by every successful VBE function.
pub const VBE_SUCCESS: u16 = 0x004F;

pub const VBE_GET_CONTROLLER_INFO: u16 = 0x4F00;
pub const VBE_GET_MODE_INFO: u16 = 0x4F01;
pub const VBE_SET_MODE: u16 = 0x4F02;
pub const VBE_GET_CURRENT_MODE: u16 = 0x4F03;

/// `BX` flag for `VBE_SET_MODE`: use the linear framebuffer.
pub const VBE_MODE_LINEAR_FRAMEBUFFER: u16 = 1 << 14;
/// Mode list terminator.
pub const VBE_MODE_LIST_END: u16 = 0xFFFF;
/// Upper bound on mode list entries we are willing to walk.
pub const VBE_MAX_MODES: usize = 256;

pub const VBE_CONTROLLER_INFO_SIZE: usize = 512;
pub const VBE_MODE_INFO_SIZE: usize = 256;

/// Highest legacy VGA mode number; set through `int 10h, AH=00h`.
pub const VGA_LEGACY_MODE_MAX: u16 = 0xFF;
/// 80x25 colour text.
pub const VGA_TEXT_MODE_80X25: u16 = 0x03;

pub const MEMORY_MODEL_PACKED_PIXEL: u8 = 4;
pub const MEMORY_MODEL_DIRECT_COLOR: u8 = 6;

/// Register frame for one real-mode `int 10h` call.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RealRegisters {
    pub ax: u16,
    pub bx: u16,
    pub cx: u16,
    pub dx: u16,
    pub si: u16,
    pub di: u16,
    pub es: u16,
    pub ds: u16,
}

impl RealRegisters {
    /// Frame with `AX` preloaded with a VBE function number.
    #[inline]
    pub const fn vbe(function: u16) -> Self {
        Self {
            ax: function,
            bx: 0,
            cx: 0,
            dx: 0,
            si: 0,
            di: 0,
            es: 0,
            ds: 0,
        }
    }

    #[inline]
    pub const fn vbe_succeeded(&self) -> bool {
        self.ax == VBE_SUCCESS
    }
}

/// Real-mode `segment:offset` pointer as stored in info blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FarPtr {
    pub segment: u16,
    pub offset: u16,
}

impl FarPtr {
    #[inline]
    pub const fn from_u32(raw: u32) -> Self {
        Self {
            segment: (raw >> 16) as u16,
            offset: raw as u16,
        }
    }

    /// Linear address below 1 MiB.
    #[inline]
    pub const fn linear(&self) -> u32 {
        ((self.segment as u32) << 4) + self.offset as u32
    }
}

bitflags! {
    /// `ModeAttributes` word of the mode info block.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct ModeAttributes: u16 {
        const SUPPORTED = 1 << 0;
        const TTY_OUTPUT = 1 << 2;
        const COLOR = 1 << 3;
        const GRAPHICS = 1 << 4;
        const NOT_VGA_COMPATIBLE = 1 << 5;
        const NO_WINDOWED_MEMORY = 1 << 6;
        const LINEAR_FRAMEBUFFER = 1 << 7;
    }
}

#[inline]
fn read_u16(raw: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([raw[at], raw[at + 1]])
}

#[inline]
fn read_u32(raw: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([raw[at], raw[at + 1], raw[at + 2], raw[at + 3]])
}

/// Parsed `VbeInfoBlock` (function 4F00h).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VbeControllerInfo {
    pub version: u16,
    pub mode_list: FarPtr,
    /// Video memory in 64 KiB blocks.
    pub total_memory_blocks: u16,
}

impl VbeControllerInfo {
    pub const SIGNATURE: [u8; 4] = *b"VESA";
    /// Written into the block before the call to request VBE 2.0+ fields.
    pub const REQUEST_SIGNATURE: [u8; 4] = *b"VBE2";

    pub fn parse(raw: &[u8]) -> Option<Self> {
        if raw.len() < VBE_CONTROLLER_INFO_SIZE || raw[0..4] != Self::SIGNATURE {
            return None;
        }
        Some(Self {
            version: read_u16(raw, 4),
            mode_list: FarPtr::from_u32(read_u32(raw, 14)),
            total_memory_blocks: read_u16(raw, 18),
        })
    }

    #[inline]
    pub fn total_memory_bytes(&self) -> usize {
        self.total_memory_blocks as usize * 64 * 1024
    }
}

/// Parsed `ModeInfoBlock` (function 4F01h).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VbeModeInfo {
    pub attributes: ModeAttributes,
    pub pitch: u16,
    pub width: u16,
    pub height: u16,
    pub bits_per_pixel: u8,
    pub memory_model: u8,
    pub framebuffer: u32,
}

impl VbeModeInfo {
    pub fn parse(raw: &[u8]) -> Option<Self> {
        if raw.len() < VBE_MODE_INFO_SIZE {
            return None;
        }
        Some(Self {
            attributes: ModeAttributes::from_bits_truncate(read_u16(raw, 0)),
            pitch: read_u16(raw, 16),
            width: read_u16(raw, 18),
            height: read_u16(raw, 20),
            bits_per_pixel: raw[25],
            memory_model: raw[27],
            framebuffer: read_u32(raw, 40),
        })
    }

    /// Serialize into a raw block. Used by bridges that synthesize mode
    /// tables instead of calling a real BIOS.
    pub fn write_to(&self, raw: &mut [u8]) {
        raw[0..2].copy_from_slice(&self.attributes.bits().to_le_bytes());
        raw[16..18].copy_from_slice(&self.pitch.to_le_bytes());
        raw[18..20].copy_from_slice(&self.width.to_le_bytes());
        raw[20..22].copy_from_slice(&self.height.to_le_bytes());
        raw[25] = self.bits_per_pixel;
        raw[27] = self.memory_model;
        raw[40..44].copy_from_slice(&self.framebuffer.to_le_bytes());
    }

    /// Supported linear-framebuffer graphics mode with a direct-colour layout.
    pub fn is_linear_graphics(&self) -> bool {
        self.attributes.contains(
            ModeAttributes::SUPPORTED | ModeAttributes::GRAPHICS | ModeAttributes::LINEAR_FRAMEBUFFER,
        ) && matches!(
            self.memory_model,
            MEMORY_MODEL_PACKED_PIXEL | MEMORY_MODEL_DIRECT_COLOR
        )
    }

    /// Bytes of video memory the mode scans out.
    #[inline]
    pub fn buffer_size(&self) -> usize {
        self.pitch as usize * self.height as usize
    }
}
