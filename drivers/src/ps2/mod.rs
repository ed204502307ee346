//! PS/2 controller access for the keyboard driver.
//!
//! The controller (historically the 8042) exposes port 0x60 for data and
//! port 0x64 for status. Only the first port (keyboard) is used here.
//!
//! # Status Register (Port 0x64 read)
//!
//! | Bit | Name | Description |
//! |-----|------|-------------|
//! | 0   | OBF  | Output buffer full (data available to read) |
//! | 1   | IBF  | Input buffer full (controller busy) |
//! | 5   | MOBF | Mouse output buffer full |

pub mod keyboard;

use prism_lib::ports::{ps2_read_data, ps2_read_status};

/// Output buffer full - data available to read from port 0x60
pub const STATUS_OUTPUT_FULL: u8 = 0x01;

/// Mouse data available (auxiliary output buffer full)
pub const STATUS_MOUSE_DATA: u8 = 0x20;

/// Upper bound on stale bytes drained by [`flush`].
const FLUSH_LIMIT: usize = 16;

#[inline(always)]
pub fn read_status() -> u8 {
    unsafe { ps2_read_status() }
}

/// Check if a keyboard byte is waiting.
#[inline(always)]
pub fn has_keyboard_data() -> bool {
    let status = read_status();
    status & STATUS_OUTPUT_FULL != 0 && status & STATUS_MOUSE_DATA == 0
}

/// Read data immediately without waiting.
///
/// Caller must ensure data is available (check status first).
#[inline(always)]
pub fn read_data_nowait() -> u8 {
    unsafe { ps2_read_data() }
}

/// Drop whatever bytes are left in the output buffer.
pub fn flush() {
    for _ in 0..FLUSH_LIMIT {
        if read_status() & STATUS_OUTPUT_FULL == 0 {
            break;
        }
        let _ = read_data_nowait();
    }
}
