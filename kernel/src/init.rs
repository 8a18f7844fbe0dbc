//! Kernel Initialization
//!
//! Brings the interrupt subsystem up in order: logger, IDT, drivers, then the
//! interrupt flag. Also hosts the entry point the assembly trap stubs call.

use core::ptr::addr_of;

use log::{debug, info};
use spin::Mutex;

use crate::{
    constants::idt::{IDT_TABLE_SIZE, IRQ_BASE_VECTOR},
    devices,
    interrupts::{
        self,
        idt::{InterruptDescriptorTable, Lidt},
        IrqRegistry, TrapFrame,
    },
    logging,
};

/// The kernel's IDT. Lives in a static so its address never changes once loaded.
static IDT: Mutex<InterruptDescriptorTable> = Mutex::new(InterruptDescriptorTable::new());

/// Handlers for the legacy IRQ lines.
pub static IRQ_REGISTRY: IrqRegistry = IrqRegistry::new();

extern "C" {
    /// Entry stub address per vector, emitted by the assembly trap entry.
    static isr_stub_table: [u32; IDT_TABLE_SIZE];
}

/// Initializes the interrupt subsystem on the boot processor and enables
/// interrupts.
pub fn init() {
    // Fails only if a logger is already installed, which then keeps logging.
    logging::init(0).ok();

    interrupts::disable();
    {
        let mut idt = IDT.lock();
        idt.initialize(unsafe { &*addr_of!(isr_stub_table) });
        // SAFETY: IDT is a static and is never moved or dropped.
        unsafe { idt.load(&mut Lidt) };
    }

    devices::init(0, &IRQ_REGISTRY);

    debug!("Enabling interrupts");
    interrupts::enable();
    info!("Interrupt subsystem up");
}

/// Called by the trap stubs for every hardware IRQ vector.
/// Acknowledging the interrupt controller is left to the stub.
#[no_mangle]
extern "C" fn irq_dispatch(frame: &mut TrapFrame) {
    let irq = (frame.vector as u8).wrapping_sub(IRQ_BASE_VECTOR);
    IRQ_REGISTRY.dispatch(irq, frame);
}
