//! Kernel key codes (KKC) delivered by the keyboard decoder
//!
//! A kernel key code is an opaque `u32`:
//! - printable keys carry their unshifted ASCII value (`'a'`, `'1'`, `';'`, ...)
//! - named control keys live at `0x100` and above
//! - bit 31 (`KKC_RELEASED`) marks a release transition
//! - `KKC_NONE` (0) means "unmapped key" and is ignored by the compositor

/// Unmapped key.
pub const KKC_NONE: u32 = 0;

pub const KKC_ESC: u32 = 0x100;
pub const KKC_ENTER: u32 = 0x101;
pub const KKC_BACKSPACE: u32 = 0x102;
pub const KKC_TAB: u32 = 0x103;
pub const KKC_SHIFT: u32 = 0x104;
pub const KKC_CTRL: u32 = 0x105;
pub const KKC_ALT: u32 = 0x106;
pub const KKC_CAPSLOCK: u32 = 0x107;
pub const KKC_HOME: u32 = 0x108;
pub const KKC_END: u32 = 0x109;
pub const KKC_UP: u32 = 0x10A;
pub const KKC_DOWN: u32 = 0x10B;
pub const KKC_LEFT: u32 = 0x10C;
pub const KKC_RIGHT: u32 = 0x10D;
pub const KKC_PAGEUP: u32 = 0x10E;
pub const KKC_PAGEDOWN: u32 = 0x10F;
pub const KKC_INSERT: u32 = 0x110;
pub const KKC_DELETE: u32 = 0x111;

/// Set on the code of a key release.
pub const KKC_RELEASED: u32 = 1 << 31;

/// Strip the release flag.
#[inline]
pub const fn kkc_code(kkc: u32) -> u32 {
    kkc & !KKC_RELEASED
}

#[inline]
pub const fn kkc_is_release(kkc: u32) -> bool {
    kkc & KKC_RELEASED != 0
}

/// Printable keys are the unshifted ASCII range.
#[inline]
pub const fn kkc_is_printable(kkc: u32) -> bool {
    let code = kkc_code(kkc);
    code >= 0x20 && code < 0x7F
}

#[inline]
pub const fn kkc_is_modifier(kkc: u32) -> bool {
    matches!(kkc_code(kkc), KKC_SHIFT | KKC_CTRL | KKC_ALT | KKC_CAPSLOCK)
}

#[inline]
pub const fn kkc_is_arrow(kkc: u32) -> bool {
    matches!(kkc_code(kkc), KKC_UP | KKC_DOWN | KKC_LEFT | KKC_RIGHT)
}

/// US layout shift mapping for non-letter printable keys.
const fn shifted_symbol(ch: u8) -> u8 {
    match ch {
        b'1' => b'!',
        b'2' => b'@',
        b'3' => b'#',
        b'4' => b'$',
        b'5' => b'%',
        b'6' => b'^',
        b'7' => b'&',
        b'8' => b'*',
        b'9' => b'(',
        b'0' => b')',
        b'-' => b'_',
        b'=' => b'+',
        b'[' => b'{',
        b']' => b'}',
        b';' => b':',
        b'\'' => b'"',
        b'`' => b'~',
        b'\\' => b'|',
        b',' => b'<',
        b'.' => b'>',
        b'/' => b'?',
        other => other,
    }
}

/// Resolve a printable key code to the character it types.
///
/// Letters are upper case when exactly one of shift and caps lock is active;
/// other symbols only follow shift.
pub fn kkc_to_ascii(kkc: u32, shift: bool, capslock: bool) -> Option<u8> {
    if !kkc_is_printable(kkc) {
        return None;
    }
    let ch = kkc_code(kkc) as u8;
    if ch.is_ascii_alphabetic() {
        let lower = ch.to_ascii_lowercase();
        return Some(if shift ^ capslock {
            lower.to_ascii_uppercase()
        } else {
            lower
        });
    }
    Some(if shift { shifted_symbol(ch) } else { ch })
}
