use x86_64::instructions::port::Port;

pub const COM1: u16 = 0x3F8;

pub const PS2_DATA: u16 = 0x60;
pub const PS2_STATUS: u16 = 0x64;

pub const UART_REG_THR: u16 = 0;
pub const UART_REG_LSR: u16 = 5;

pub const UART_LSR_TX_EMPTY: u8 = 0x20;

/// Bounded wait for the transmit holding register.
const UART_TX_SPINS: u32 = 10_000;

/// Write raw bytes to a 16550 UART, polling the line status register.
///
/// # Safety
/// `base` must be the I/O base of a present UART; the caller must hold
/// whatever lock serializes access to it.
pub unsafe fn serial_write_bytes(base: u16, bytes: &[u8]) {
    let mut lsr: Port<u8> = Port::new(base + UART_REG_LSR);
    let mut thr: Port<u8> = Port::new(base + UART_REG_THR);
    for &b in bytes {
        let mut spins = 0;
        while unsafe { lsr.read() } & UART_LSR_TX_EMPTY == 0 && spins < UART_TX_SPINS {
            spins += 1;
            core::hint::spin_loop();
        }
        unsafe { thr.write(b) };
    }
}

/// Read one byte from the PS/2 data port.
///
/// # Safety
/// Only meaningful from the keyboard interrupt path, where the controller
/// has signalled that a byte is waiting.
#[inline]
pub unsafe fn ps2_read_data() -> u8 {
    let mut data: Port<u8> = Port::new(PS2_DATA);
    unsafe { data.read() }
}

/// Read the PS/2 controller status register.
///
/// # Safety
/// Port I/O; only valid on hardware with an 8042-compatible controller.
#[inline]
pub unsafe fn ps2_read_status() -> u8 {
    let mut status: Port<u8> = Port::new(PS2_STATUS);
    unsafe { status.read() }
}
