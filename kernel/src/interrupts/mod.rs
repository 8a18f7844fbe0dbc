//! Interrupt handling
//!
//! This module provides:
//! - Gate descriptor encoding ([`gate`])
//! - The kernel IDT and its loader ([`idt`])
//! - IRQ handler registration and dispatch ([`registry`])
//! - Functions to enable/disable interrupts

pub mod gate;
pub mod idt;
pub mod registry;

pub use registry::{irq_vector, IrqContext, IrqHandler, IrqRegistry, RegistryError, TrapFrame};

#[cfg(all(not(test), target_arch = "x86_64"))]
use x86_64::instructions::interrupts as flag;

#[cfg(test)]
pub(crate) use flag::raise;

/// Enables interrupts on the current CPU.
pub fn enable() {
    flag::enable();
}

/// Disables interrupts on the current CPU.
pub fn disable() {
    flag::disable();
}

/// Checks if interrupts are enabled on the current CPU.
pub fn are_enabled() -> bool {
    flag::are_enabled()
}

/// Executes a closure with interrupts disabled.
///
/// # Arguments
/// * `f` - The closure to execute
///
/// # Returns
/// Returns the result of the closure
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let initially_enabled = are_enabled();
    if initially_enabled {
        disable();
    }

    let result = f();

    if initially_enabled {
        enable();
    }

    result
}

/// IF-flag control for 32-bit builds, which the x86_64 crate does not cover.
#[cfg(all(not(test), target_arch = "x86"))]
mod flag {
    use core::arch::asm;

    const IF: u32 = 1 << 9;

    pub fn enable() {
        unsafe { asm!("sti", options(nomem, nostack)) }
    }

    pub fn disable() {
        unsafe { asm!("cli", options(nomem, nostack)) }
    }

    pub fn are_enabled() -> bool {
        let eflags: u32;
        unsafe { asm!("pushfd", "pop {}", out(reg) eflags, options(nomem, preserves_flags)) }
        eflags & IF != 0
    }
}
