//! PS/2 Controller management
//!
//! This module handles the low-level interaction with the i8042 controller:
//! status polling, the synchronous command protocol and the self-test.

use core::{fmt, hint};

use bitflags::bitflags;
use log::debug;

use crate::{
    constants::ps2::{CMD_SELF_TEST, COMMAND_PORT, DATA_PORT, SELF_TEST_PASSED},
    devices::ports::PortIo,
};

bitflags! {
    /// The controller's status register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        /// A byte is waiting in the output buffer (port 0x60).
        const OUTPUT_FULL = 1 << 0;
        /// The controller has not consumed the last byte written to it yet.
        const INPUT_FULL = 1 << 1;
        const SYSTEM_FLAG = 1 << 2;
        /// The last write went to the command port rather than the data port.
        const INPUT_IS_COMMAND = 1 << 3;
        const KEYBOARD_UNLOCKED = 1 << 4;
        const MOUSE_OUTPUT_FULL = 1 << 5;
        const TIMEOUT_ERROR = 1 << 6;
        const PARITY_ERROR = 1 << 7;
    }
}

/// Protocol failures reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError {
    /// The self-test answered something other than 0x55.
    SelfTestFailed { response: u8 },
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::SelfTestFailed { response } => write!(
                f,
                "controller self-test answered {response:#04x}, expected {SELF_TEST_PASSED:#04x}"
            ),
        }
    }
}

/// An i8042 controller reached through `P`.
pub struct Controller<P> {
    ports: P,
}

impl<P: PortIo> Controller<P> {
    /// Wraps the controller reached through `ports`.
    pub const fn new(ports: P) -> Self {
        Self { ports }
    }

    /// Reads the status register.
    pub fn read_status(&self) -> StatusFlags {
        StatusFlags::from_bits_retain(self.ports.read(COMMAND_PORT))
    }

    /// Reads the output buffer without checking that it is full.
    pub fn read_data(&self) -> u8 {
        self.ports.read(DATA_PORT)
    }

    /// Spins until the output buffer holds a byte.
    pub fn wait_output_ready(&self) {
        self.spin_until(|status| status.contains(StatusFlags::OUTPUT_FULL));
    }

    /// Spins until the controller can accept another byte.
    pub fn wait_input_ready(&self) {
        self.spin_until(|status| !status.contains(StatusFlags::INPUT_FULL));
    }

    /// Writes `command` to the command port and waits for the controller to
    /// produce its response byte.
    pub fn send_command(&self, command: u8) {
        self.wait_input_ready();
        self.ports.write(COMMAND_PORT, command);
        self.wait_output_ready();
    }

    /// Runs the controller self-test.
    pub fn self_test(&self) -> Result<(), ControllerError> {
        self.send_command(CMD_SELF_TEST);
        let response = self.read_data();
        debug!("i8042 self-test response {response:#04x}");
        if response != SELF_TEST_PASSED {
            return Err(ControllerError::SelfTestFailed { response });
        }
        Ok(())
    }

    // No timeout: a controller that never answers hangs the caller.
    fn spin_until(&self, ready: impl Fn(StatusFlags) -> bool) {
        while !ready(self.read_status()) {
            hint::spin_loop();
        }
    }
}
