use prism_abi::keycode::{
    KKC_ALT, KKC_BACKSPACE, KKC_CAPSLOCK, KKC_CTRL, KKC_DELETE, KKC_DOWN, KKC_END, KKC_ENTER,
    KKC_ESC, KKC_HOME, KKC_INSERT, KKC_LEFT, KKC_NONE, KKC_PAGEDOWN, KKC_PAGEUP, KKC_RELEASED,
    KKC_RIGHT, KKC_SHIFT, KKC_TAB, KKC_UP,
};
use prism_lib::{IrqMutex, klog_debug, klog_info};

use crate::irq::{IrqController, IrqError};
use crate::ps2;

pub const KB_IRQ_NUM: u8 = 1;
pub const KB_ID: u32 = 1;
pub const KB_POLICY: u32 = 0;

/// Prefix byte of the extended (`E0 xx`) scan codes.
const SCANCODE_EXTENDED: u8 = 0xE0;

/// Make codes of the shift keys the keyboard fakes around Print Screen and
/// the navigation block when they follow `E0`.
const FAKE_SHIFT_LEFT: u8 = 0x2A;
const FAKE_SHIFT_RIGHT: u8 = 0x36;

const fn fill(table: &mut [u32; 0x80], start: usize, keys: &[u8]) {
    let mut i = 0;
    while i < keys.len() {
        table[start + i] = keys[i] as u32;
        i += 1;
    }
}

/// Scan code set 1 make code to kernel key code, US layout.
///
/// Printable keys map to their unshifted ASCII value; the keypad navigation
/// keys share entries with their `E0` counterparts.
pub const SCANCODE_TO_KKC: [u32; 0x80] = {
    let mut t = [KKC_NONE; 0x80];
    t[0x01] = KKC_ESC;
    fill(&mut t, 0x02, b"1234567890-=");
    t[0x0E] = KKC_BACKSPACE;
    t[0x0F] = KKC_TAB;
    fill(&mut t, 0x10, b"qwertyuiop[]");
    t[0x1C] = KKC_ENTER;
    t[0x1D] = KKC_CTRL;
    fill(&mut t, 0x1E, b"asdfghjkl;'`");
    t[0x2A] = KKC_SHIFT;
    fill(&mut t, 0x2B, b"\\zxcvbnm,./");
    t[0x36] = KKC_SHIFT;
    t[0x37] = b'*' as u32;
    t[0x38] = KKC_ALT;
    t[0x39] = b' ' as u32;
    t[0x3A] = KKC_CAPSLOCK;
    // 0x3B..=0x46: F1-F10, Num Lock, Scroll Lock
    t[0x47] = KKC_HOME;
    t[0x48] = KKC_UP;
    t[0x49] = KKC_PAGEUP;
    t[0x4A] = b'-' as u32;
    t[0x4B] = KKC_LEFT;
    t[0x4D] = KKC_RIGHT;
    t[0x4E] = b'+' as u32;
    t[0x4F] = KKC_END;
    t[0x50] = KKC_DOWN;
    t[0x51] = KKC_PAGEDOWN;
    t[0x52] = KKC_INSERT;
    t[0x53] = KKC_DELETE;
    t
};

#[inline(always)]
fn is_break_code(scancode: u8) -> bool {
    scancode & 0x80 != 0
}

#[inline(always)]
fn get_make_code(scancode: u8) -> u8 {
    scancode & 0x7F
}

/// Decoder state carried between interrupts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyboardState {
    caps_lock: bool,
    /// The previous byte was the `E0` prefix.
    extended: bool,
}

impl KeyboardState {
    pub const fn new() -> Self {
        Self {
            caps_lock: false,
            extended: false,
        }
    }

    #[inline]
    pub fn caps_lock(&self) -> bool {
        self.caps_lock
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    /// Turn one scan code byte into the key code to forward.
    ///
    /// A zero byte, the `E0` prefix and the fake shifts that follow it
    /// produce nothing. Unmapped keys are still forwarded as code 0, keeping
    /// their release flag.
    pub fn decode(&mut self, scancode: u8) -> Option<u32> {
        if scancode == SCANCODE_EXTENDED {
            self.extended = true;
            return None;
        }
        let extended = core::mem::take(&mut self.extended);
        if scancode == 0 {
            return None;
        }
        let make = get_make_code(scancode);
        if extended && (make == FAKE_SHIFT_LEFT || make == FAKE_SHIFT_RIGHT) {
            return None;
        }
        let kkc = SCANCODE_TO_KKC[make as usize];
        if is_break_code(scancode) {
            return Some(kkc | KKC_RELEASED);
        }
        if kkc == KKC_CAPSLOCK {
            self.caps_lock = !self.caps_lock;
        }
        Some(kkc)
    }
}

static STATE: IrqMutex<KeyboardState> = IrqMutex::new(KeyboardState::new());

pub fn handle_scancode(scancode: u8) {
    klog_debug!("[KBD] Scancode: 0x{:02x}", scancode);

    let decoded = {
        let mut state = STATE.lock();
        state.decode(scancode).map(|kkc| (kkc, state.caps_lock()))
    };

    if let Some((kkc, capslock)) = decoded {
        prism_video::key_event(kkc, capslock);
    }
}

/// Interrupt entry bound to the keyboard line.
pub fn keyboard_irq_handler(_irq: u8) {
    if !ps2::has_keyboard_data() {
        return;
    }
    handle_scancode(ps2::read_data_nowait());
}

fn bind(irqs: &mut impl IrqController) -> Result<(), IrqError> {
    irqs.bind_irq(KB_IRQ_NUM, KB_ID, keyboard_irq_handler, KB_POLICY)?;
    klog_info!("PS/2 keyboard: bound to IRQ {}", KB_IRQ_NUM);
    Ok(())
}

pub fn init(irqs: &mut impl IrqController) -> Result<(), IrqError> {
    ps2::flush();
    STATE.lock().reset();
    bind(irqs)
}

pub fn remove(irqs: &mut impl IrqController) -> Result<(), IrqError> {
    irqs.unbind_irq(KB_IRQ_NUM, KB_ID)?;
    klog_info!("PS/2 keyboard: released IRQ {}", KB_IRQ_NUM);
    Ok(())
}
