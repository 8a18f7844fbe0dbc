//! Interrupt Descriptor Table (IDT) setup
//!
//! This module provides:
//! - The kernel's fixed-size table of gate descriptors
//! - The one-time population pass over the serviced vectors
//! - The IDTR image and the `lidt` loader that installs it

use core::mem::size_of;

use log::{debug, error, info};

use super::gate::{GateDescriptor, GateSize, GateType};
use crate::constants::idt::{
    is_serviced_vector, GATE_DESCRIPTOR_SIZE, IDT_TABLE_SIZE, KERNEL_CODE_SELECTOR,
    KERNEL_PRIVILEGE_LEVEL,
};

const _: () = assert!(size_of::<GateDescriptor>() == GATE_DESCRIPTOR_SIZE);
const _: () = assert!(IDT_TABLE_SIZE * GATE_DESCRIPTOR_SIZE <= 0x1_0000);

/// Source of the low-level trap-entry stub address for each vector.
pub trait TrapEntryStubs {
    /// Linear address of the stub for `vector`.
    fn entry_address(&self, vector: u8) -> u32;
}

impl TrapEntryStubs for [u32] {
    fn entry_address(&self, vector: u8) -> u32 {
        self.get(vector as usize).copied().unwrap_or(0)
    }
}

impl<const N: usize> TrapEntryStubs for [u32; N] {
    fn entry_address(&self, vector: u8) -> u32 {
        self.as_slice().entry_address(vector)
    }
}

/// Installs an IDTR image into the processor.
pub trait IdtLoader {
    /// # Safety
    /// `idtr` must describe a table that stays at its address, unmodified
    /// except by the kernel, for as long as the CPU may deliver interrupts
    /// through it.
    unsafe fn load(&mut self, idtr: &Idtr);
}

/// The IDTR register image: table limit and linear base address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Idtr {
    /// Table size in bytes minus one.
    pub limit: u16,
    /// Linear address of the first descriptor.
    pub base: u32,
}

impl Idtr {
    /// Describes a table of `len_bytes` bytes starting at `base`.
    /// `len_bytes` must be in `1..=0x1_0000`.
    pub const fn for_table(base: u32, len_bytes: usize) -> Self {
        Self {
            limit: (len_bytes - 1) as u16,
            base,
        }
    }

    /// The 6-byte operand `lidt` expects.
    pub const fn to_bytes(self) -> [u8; 6] {
        let limit = self.limit.to_le_bytes();
        let base = self.base.to_le_bytes();
        [limit[0], limit[1], base[0], base[1], base[2], base[3]]
    }
}

/// `lidt` on the current processor.
#[cfg(target_arch = "x86")]
pub struct Lidt;

#[cfg(target_arch = "x86")]
impl IdtLoader for Lidt {
    unsafe fn load(&mut self, idtr: &Idtr) {
        let image = idtr.to_bytes();
        core::arch::asm!(
            "lidt [{}]",
            in(reg) image.as_ptr(),
            options(readonly, nostack, preserves_flags)
        );
    }
}

/// Lifecycle of the table. There is no transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    /// Freshly constructed, every slot empty.
    Uninitialized,
    /// Populated but not yet handed to the CPU.
    Built,
    /// Installed in the IDTR.
    Active,
}

/// The kernel's IDT. Vectors it does not service stay not-present.
#[repr(C, align(8))]
pub struct InterruptDescriptorTable {
    entries: [GateDescriptor; IDT_TABLE_SIZE],
    idtr: Option<Idtr>,
    state: TableState,
}

impl InterruptDescriptorTable {
    /// Creates an empty, uninitialized table.
    pub const fn new() -> Self {
        Self {
            entries: [GateDescriptor::missing(); IDT_TABLE_SIZE],
            idtr: None,
            state: TableState::Uninitialized,
        }
    }

    /// Populates every serviced vector with a kernel interrupt gate pointing
    /// at its trap-entry stub, and clears every other slot.
    ///
    /// Must run before interrupts are enabled and before any driver registers
    /// an IRQ handler.
    pub fn initialize<S>(&mut self, stubs: &S)
    where
        S: TrapEntryStubs + ?Sized,
    {
        let mut installed = 0;
        for (vector, entry) in self.entries.iter_mut().enumerate() {
            let vector = vector as u8;
            *entry = if is_serviced_vector(vector) {
                installed += 1;
                GateDescriptor::new(
                    stubs.entry_address(vector),
                    KERNEL_CODE_SELECTOR,
                    GateType::Interrupt,
                    GateSize::Bits32,
                    KERNEL_PRIVILEGE_LEVEL,
                    true,
                )
            } else {
                GateDescriptor::missing()
            };
        }
        self.state = TableState::Built;
        debug!("IDT built: {installed} of {IDT_TABLE_SIZE} vectors present");
    }

    /// Computes the IDTR for this table and installs it with `loader`.
    ///
    /// # Safety
    /// The table must not move or be dropped while the CPU can deliver
    /// interrupts through it; keep it in a `static`.
    pub unsafe fn load<L>(&mut self, loader: &mut L)
    where
        L: IdtLoader + ?Sized,
    {
        if self.state == TableState::Uninitialized {
            error!("refusing to load an IDT that was never initialized");
            return;
        }

        let idtr = Idtr::for_table(
            self.entries.as_ptr() as usize as u32,
            size_of::<[GateDescriptor; IDT_TABLE_SIZE]>(),
        );
        loader.load(&idtr);
        self.idtr = Some(idtr);
        self.state = TableState::Active;
        info!("IDT loaded at {:#010x}, limit {:#x}", idtr.base, idtr.limit);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TableState {
        self.state
    }

    /// The image handed to the last successful [`Self::load`].
    pub fn idtr(&self) -> Option<Idtr> {
        self.idtr
    }

    /// The gate installed at `vector`, or `None` past the end of the table.
    pub fn entry(&self, vector: u8) -> Option<GateDescriptor> {
        self.entries.get(vector as usize).copied()
    }

    /// All gates, indexed by vector.
    pub fn entries(&self) -> &[GateDescriptor] {
        &self.entries
    }
}

impl Default for InterruptDescriptorTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::idt::IRQ_BASE_VECTOR;
    use x86_64::PrivilegeLevel;

    /// Pretends every stub sits at `0xC010_0000 + vector * 16`.
    struct FakeStubs;

    impl TrapEntryStubs for FakeStubs {
        fn entry_address(&self, vector: u8) -> u32 {
            0xC010_0000 + vector as u32 * 16
        }
    }

    #[derive(Default)]
    struct RecordingLoader {
        loaded: Vec<Idtr>,
    }

    impl IdtLoader for RecordingLoader {
        unsafe fn load(&mut self, idtr: &Idtr) {
            self.loaded.push(*idtr);
        }
    }

    #[test]
    fn starts_uninitialized_and_empty() {
        let idt = InterruptDescriptorTable::new();
        assert_eq!(idt.state(), TableState::Uninitialized);
        assert!(idt.entries().iter().all(|gate| !gate.present()));
        assert_eq!(idt.idtr(), None);
    }

    #[test]
    fn only_serviced_vectors_are_present() {
        let mut idt = InterruptDescriptorTable::new();
        idt.initialize(&FakeStubs);
        assert_eq!(idt.state(), TableState::Built);

        for vector in 0..IDT_TABLE_SIZE as u8 {
            let gate = idt.entry(vector).unwrap();
            assert_eq!(gate.present(), is_serviced_vector(vector), "vector {vector}");
        }
        assert!(!idt.entry(15).unwrap().present());
        assert!(!idt.entry(20).unwrap().present());
        assert!(idt.entry(IRQ_BASE_VECTOR + 1).unwrap().present());
    }

    #[test]
    fn installed_gates_are_kernel_interrupt_gates() {
        let mut idt = InterruptDescriptorTable::new();
        idt.initialize(&FakeStubs);

        let fields = idt.entry(IRQ_BASE_VECTOR).unwrap().decode().unwrap();
        assert_eq!(fields.offset, FakeStubs.entry_address(IRQ_BASE_VECTOR));
        assert_eq!(fields.selector.0, 0x08);
        assert_eq!(fields.gate_type, GateType::Interrupt);
        assert_eq!(fields.gate_size, GateSize::Bits32);
        assert_eq!(fields.privilege_level, PrivilegeLevel::Ring0);
        assert!(fields.present);
    }

    #[test]
    fn slice_stubs_use_their_index() {
        let mut stubs = [0u32; IDT_TABLE_SIZE];
        stubs[3] = 0x0010_0300;
        let mut idt = InterruptDescriptorTable::new();
        idt.initialize(&stubs);
        assert_eq!(idt.entry(3).unwrap().offset(), 0x0010_0300);
    }

    #[test]
    fn load_after_initialize_produces_full_limit() {
        let mut idt = InterruptDescriptorTable::new();
        let mut loader = RecordingLoader::default();
        idt.initialize(&FakeStubs);
        unsafe { idt.load(&mut loader) };

        let idtr = idt.idtr().unwrap();
        assert_eq!(idtr.limit as usize, IDT_TABLE_SIZE * 8 - 1);
        assert_eq!(idtr.base, idt.entries().as_ptr() as usize as u32);
        assert_eq!(loader.loaded, vec![idtr]);
        assert_eq!(idt.state(), TableState::Active);
    }

    #[test]
    fn load_before_initialize_does_nothing() {
        let mut idt = InterruptDescriptorTable::new();
        let mut loader = RecordingLoader::default();
        unsafe { idt.load(&mut loader) };
        assert!(loader.loaded.is_empty());
        assert_eq!(idt.state(), TableState::Uninitialized);
    }

    #[test]
    fn idtr_limit_covers_largest_table() {
        assert_eq!(Idtr::for_table(0, 0x1_0000).limit, 0xFFFF);
        assert_eq!(Idtr::for_table(0, 8).limit, 7);
    }

    #[test]
    fn idtr_image_layout() {
        let idtr = Idtr::for_table(0x1234_5678, 48 * 8);
        assert_eq!(idtr.to_bytes(), [0x7F, 0x01, 0x78, 0x56, 0x34, 0x12]);
    }
}
