//! Compile-time configuration for the interrupt subsystem and its drivers.

pub mod idt;
pub mod ps2;
