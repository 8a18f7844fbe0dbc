//! Kestrel kernel: interrupt subsystem and legacy device drivers.
//!
//! - [`interrupts`]: gate descriptors, the IDT, IRQ registration and dispatch
//! - [`devices`]: port I/O and the i8042 PS/2 keyboard driver
//! - [`logging`]: the serial `log` backend
//! - `init`: boot-time bring-up (32-bit x86 only)

#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod constants;
pub mod devices;
#[cfg(target_arch = "x86")]
pub mod init;
pub mod interrupts;
pub mod logging;
