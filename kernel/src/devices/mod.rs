//! Device management and initialization.
//!
//! This module handles initialization and access to hardware devices:
//! - Port I/O access shared by the legacy drivers
//! - The i8042 PS/2 controller and keyboard

pub mod ports;
pub mod ps2_dev;

use log::warn;

use crate::interrupts::IrqRegistry;
use ports::HardwarePorts;
use ps2_dev::{Keyboard, LogSink};

/// The keyboard on the first PS/2 port.
pub static KEYBOARD: Keyboard<HardwarePorts, LogSink> =
    Keyboard::new(unsafe { HardwarePorts::new() }, LogSink);

/// Initialize hardware devices and bind their IRQs in `registry`.
///
/// # Arguments
/// * `cpu_id` - ID of the CPU performing initialization. Only CPU 0
///   performs device initialization.
/// * `registry` - Registry the drivers bind their handlers in.
pub fn init(cpu_id: u32, registry: &IrqRegistry) {
    if cpu_id == 0 {
        // A broken keyboard leaves the kernel usable.
        if let Err(e) = KEYBOARD.initialize(registry) {
            warn!("continuing without a working keyboard: {e}");
        }
    }
}
