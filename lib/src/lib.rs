#![no_std]
#![allow(unsafe_op_in_unsafe_fn)]

pub mod cpu;
pub mod klog;
pub mod ports;
pub mod spinlock;
pub mod testing;

pub use klog::{
    KlogBackend, KlogLevel, klog_discard, klog_get_level, klog_register_backend, klog_set_level,
};
pub use ports::COM1;
pub use spinlock::{IrqMutex, IrqMutexGuard};
