//! Interrupt Descriptor Table configuration.

use x86_64::{structures::gdt::SegmentSelector, PrivilegeLevel};

/// Number of gate descriptors in the kernel's IDT.
/// 32 CPU exception vectors followed by the 16 remapped legacy IRQ lines.
pub const IDT_TABLE_SIZE: usize = 48;

/// Size in bytes of one protected-mode gate descriptor.
pub const GATE_DESCRIPTOR_SIZE: usize = 8;

/// Vector the first legacy IRQ line is remapped to.
pub const IRQ_BASE_VECTOR: u8 = 32;

/// Number of legacy IRQ lines the dispatch registry services.
pub const IRQ_LINES: usize = 16;

/// Highest architecturally defined exception vector this kernel installs.
pub const LAST_EXCEPTION_VECTOR: u8 = 19;

/// Intel reserved vector inside the exception range; never installed.
pub const RESERVED_EXCEPTION_VECTOR: u8 = 15;

/// Kernel code segment: GDT index 1, requested privilege ring 0.
pub const KERNEL_CODE_SELECTOR: SegmentSelector = SegmentSelector::new(1, PrivilegeLevel::Ring0);

/// Descriptor privilege level given to every installed gate.
pub const KERNEL_PRIVILEGE_LEVEL: PrivilegeLevel = PrivilegeLevel::Ring0;

/// Returns whether `vector` gets a present gate during IDT initialization.
pub const fn is_serviced_vector(vector: u8) -> bool {
    let exception = vector <= LAST_EXCEPTION_VECTOR && vector != RESERVED_EXCEPTION_VECTOR;
    let irq = vector >= IRQ_BASE_VECTOR && vector < IRQ_BASE_VECTOR + IRQ_LINES as u8;
    exception || irq
}
