//! PS/2 Keyboard management
//!
//! Brings the i8042 up, binds the keyboard IRQ, and turns each interrupt into
//! one decoded key code.

use core::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use log::{error, info, trace};

use super::{
    controller::{Controller, ControllerError},
    scancodes::{self, ModifierVariant},
};
use crate::{
    constants::ps2::{KEYBOARD_IRQ, KEYBOARD_TAG},
    devices::ports::PortIo,
    interrupts::{IrqContext, IrqHandler, IrqRegistry, RegistryError},
};

/// Keyboard error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardError {
    /// The controller did not answer as documented
    Controller(ControllerError),
    /// The keyboard IRQ could not be bound
    Registration(RegistryError),
}

impl From<ControllerError> for KeyboardError {
    fn from(error: ControllerError) -> Self {
        KeyboardError::Controller(error)
    }
}

impl From<RegistryError> for KeyboardError {
    fn from(error: RegistryError) -> Self {
        KeyboardError::Registration(error)
    }
}

impl fmt::Display for KeyboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyboardError::Controller(e) => write!(f, "i8042: {e}"),
            KeyboardError::Registration(e) => write!(f, "i8042: {e}"),
        }
    }
}

/// Consumer of decoded key codes (ASCII, or extended codes `>= 0x100`).
pub trait KeySink: Sync {
    /// Receives one decoded, non-zero key code.
    fn emit(&self, code: u16);
}

impl<T: KeySink + ?Sized> KeySink for &T {
    fn emit(&self, code: u16) {
        (**self).emit(code)
    }
}

/// Writes printable keys to the kernel log.
pub struct LogSink;

impl KeySink for LogSink {
    fn emit(&self, code: u16) {
        if scancodes::is_extended(code) {
            info!(target: "keyboard", "key {code:#06x}");
        } else {
            info!(target: "keyboard", "{}", char::from(code as u8));
        }
    }
}

/// i8042 keyboard driver.
pub struct Keyboard<P, S> {
    controller: Controller<P>,
    sink: S,
    interrupts: AtomicU64,
}

impl<P: PortIo, S: KeySink> Keyboard<P, S> {
    /// A keyboard on the controller behind `ports`, emitting into `sink`.
    pub const fn new(ports: P, sink: S) -> Self {
        Self {
            controller: Controller::new(ports),
            sink,
            interrupts: AtomicU64::new(0),
        }
    }

    /// Self-tests the controller and binds the keyboard IRQ in `registry`.
    ///
    /// Neither failure stops the other step or the boot: errors are logged
    /// and the first one is returned so the caller can note the degraded
    /// keyboard.
    pub fn initialize(&'static self, registry: &IrqRegistry) -> Result<(), KeyboardError>
    where
        P: 'static,
        S: 'static,
    {
        info!("Initializing i8042 keyboard controller...");

        let self_test = self.controller.self_test().map_err(KeyboardError::from);
        if let Err(e) = &self_test {
            error!("{e}");
        }

        let registration = registry
            .register(KEYBOARD_IRQ, self, KEYBOARD_TAG)
            .map_err(KeyboardError::from);
        if let Err(e) = &registration {
            error!("{e}");
        }

        self_test.and(registration)
    }

    /// Reads one byte from the output buffer and decodes it without modifiers.
    pub fn read_key(&self) -> u16 {
        let scancode = self.controller.read_data();
        let code = scancodes::decode(scancode, ModifierVariant::Plain);
        trace!("scancode {scancode:#04x} -> {code:#x}");
        code
    }

    /// Keyboard interrupts handled so far.
    pub fn interrupt_count(&self) -> u64 {
        self.interrupts.load(Ordering::Relaxed)
    }
}

impl<P: PortIo, S: KeySink> IrqHandler for Keyboard<P, S> {
    fn handle(&self, _cx: &mut IrqContext<'_>) {
        self.interrupts.fetch_add(1, Ordering::Relaxed);

        // Modifier state is not tracked: only the plain column is used.
        let code = self.read_key();
        if code != 0 {
            self.sink.emit(code);
        }
    }
}
