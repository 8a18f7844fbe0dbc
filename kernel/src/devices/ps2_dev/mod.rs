//! PS/2 device management module
//!
//! This module provides the i8042 controller protocol, the keyboard driver
//! built on it, and the scan code translation table.

pub mod controller;
pub mod keyboard;
pub mod scancodes;

pub use controller::{Controller, ControllerError, StatusFlags};
pub use keyboard::{KeySink, Keyboard, KeyboardError, LogSink};
