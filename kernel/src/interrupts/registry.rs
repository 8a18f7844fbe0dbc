//! IRQ dispatch registry
//!
//! Maps legacy IRQ lines to the driver handlers bound to them. Drivers
//! register from normal context during boot; the trap-entry path calls
//! [`IrqRegistry::dispatch`] from interrupt context.

use core::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

use log::{debug, trace, warn};
use spin::Mutex;

use super::without_interrupts;
use crate::constants::idt::{IRQ_BASE_VECTOR, IRQ_LINES};

/// Register image the trap-entry stubs push before calling into Rust.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrapFrame {
    // pushad
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    pub esp_dummy: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,
    pub gs: u32,
    pub fs: u32,
    pub es: u32,
    pub ds: u32,
    /// Vector the stub was entered through.
    pub vector: u32,
    /// CPU error code, or zero for vectors without one.
    pub error_code: u32,
    // pushed by the CPU
    pub eip: u32,
    pub cs: u32,
    pub eflags: u32,
}

/// What a handler sees while it runs.
///
/// Only the dispatcher can build one, so a function taking an `IrqContext`
/// is known to run in interrupt context: it must not block and must not
/// dispatch its own line again.
pub struct IrqContext<'a> {
    irq: u8,
    frame: &'a mut TrapFrame,
}

impl IrqContext<'_> {
    /// The line being serviced.
    pub fn irq(&self) -> u8 {
        self.irq
    }

    /// Registers saved on entry. Changes are restored on return.
    pub fn frame(&mut self) -> &mut TrapFrame {
        &mut *self.frame
    }
}

/// A driver's interrupt handler.
pub trait IrqHandler: Sync {
    /// Services one interrupt on the bound line.
    fn handle(&self, cx: &mut IrqContext<'_>);
}

/// Registration failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The line is outside `0..IRQ_LINES`.
    InvalidVector(u8),
    /// The line already has a handler; `tag` names its owner.
    AlreadyBound { irq: u8, tag: &'static str },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidVector(irq) => write!(f, "IRQ {irq} is not a serviced line"),
            RegistryError::AlreadyBound { irq, tag } => {
                write!(f, "IRQ {irq} is already bound to {tag}")
            }
        }
    }
}

#[derive(Clone, Copy)]
struct Binding {
    handler: &'static dyn IrqHandler,
    tag: &'static str,
}

/// The IDT vector an IRQ line is delivered on.
pub const fn irq_vector(irq: u8) -> u8 {
    IRQ_BASE_VECTOR + irq
}

/// One handler per IRQ line, append-only.
pub struct IrqRegistry {
    slots: Mutex<[Option<Binding>; IRQ_LINES]>,
    in_service: [AtomicBool; IRQ_LINES],
}

impl IrqRegistry {
    /// A registry with every line unbound.
    pub const fn new() -> Self {
        const IDLE: AtomicBool = AtomicBool::new(false);
        Self {
            slots: Mutex::new([None; IRQ_LINES]),
            in_service: [IDLE; IRQ_LINES],
        }
    }

    /// Binds `handler` to `irq`. An occupied line is never overwritten.
    pub fn register(
        &self,
        irq: u8,
        handler: &'static dyn IrqHandler,
        tag: &'static str,
    ) -> Result<(), RegistryError> {
        // An IRQ taken while the slots are locked would spin in `dispatch`.
        without_interrupts(|| {
            let mut slots = self.slots.lock();
            let slot = slots
                .get_mut(irq as usize)
                .ok_or(RegistryError::InvalidVector(irq))?;

            if let Some(existing) = slot {
                return Err(RegistryError::AlreadyBound {
                    irq,
                    tag: existing.tag,
                });
            }

            *slot = Some(Binding { handler, tag });
            Ok(())
        })?;

        debug!("IRQ {irq} (vector {}) bound to {tag}", irq_vector(irq));
        Ok(())
    }

    /// Runs the handler bound to `irq` and returns whether one ran.
    ///
    /// Unbound lines are logged and dropped. A line whose handler is still
    /// running is dropped too rather than re-entered.
    pub fn dispatch(&self, irq: u8, frame: &mut TrapFrame) -> bool {
        // Copy the binding out so the lock is not held across the handler.
        let Some(binding) = self.binding(irq) else {
            warn!("dropping unhandled IRQ {irq}");
            return false;
        };

        let busy = &self.in_service[irq as usize];
        if busy.swap(true, Ordering::Acquire) {
            warn!("dropping nested IRQ {irq} for {}", binding.tag);
            return false;
        }

        trace!("IRQ {irq} -> {}", binding.tag);
        binding.handler.handle(&mut IrqContext { irq, frame });
        busy.store(false, Ordering::Release);
        true
    }

    /// Whether a handler is bound to `irq`.
    pub fn is_bound(&self, irq: u8) -> bool {
        self.binding(irq).is_some()
    }

    /// Tag of the driver bound to `irq`.
    pub fn tag(&self, irq: u8) -> Option<&'static str> {
        self.binding(irq).map(|binding| binding.tag)
    }

    fn binding(&self, irq: u8) -> Option<Binding> {
        without_interrupts(|| self.slots.lock().get(irq as usize).copied().flatten())
    }
}

impl Default for IrqRegistry {
    fn default() -> Self {
        Self::new()
    }
}
