//! Protected-mode interrupt/trap gate descriptors.
//!
//! A gate is 8 bytes, little-endian:
//!
//! | bits    | field             |
//! |---------|-------------------|
//! | 0..16   | offset bits 0-15  |
//! | 16..32  | segment selector  |
//! | 32..37  | unused (zero)     |
//! | 37..40  | reserved (zero)   |
//! | 40..43  | gate type         |
//! | 43      | gate size         |
//! | 44      | reserved (zero)   |
//! | 45..47  | DPL               |
//! | 47      | present           |
//! | 48..64  | offset bits 16-31 |
//!
//! The descriptor is kept as a plain `u64` with explicit shift/mask accessors
//! so the layout never depends on how a compiler packs bit-fields.

use core::fmt;

use x86_64::{structures::gdt::SegmentSelector, PrivilegeLevel};

const OFFSET_LOW_SHIFT: u32 = 0;
const SELECTOR_SHIFT: u32 = 16;
const TYPE_SHIFT: u32 = 40;
const SIZE_SHIFT: u32 = 43;
const DPL_SHIFT: u32 = 45;
const PRESENT_SHIFT: u32 = 47;
const OFFSET_HIGH_SHIFT: u32 = 48;

const WORD_MASK: u64 = 0xFFFF;
const TYPE_MASK: u64 = 0b111;
const DPL_MASK: u64 = 0b11;

/// Kind of gate. Only the two 32-bit gate kinds the kernel builds are encodable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GateType {
    /// Clears IF on entry.
    Interrupt = 0x6,
    /// Leaves IF untouched.
    Trap = 0x7,
}

impl GateType {
    /// Parses the 3-bit type field.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0x6 => Some(Self::Interrupt),
            0x7 => Some(Self::Trap),
            _ => None,
        }
    }
}

/// Operand size of the handler the gate points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GateSize {
    /// 16-bit handler.
    Bits16 = 0,
    /// 32-bit handler.
    Bits32 = 1,
}

/// Decoded view of a gate descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateFields {
    /// Linear address of the handler entry point.
    pub offset: u32,
    /// Code segment the handler runs in.
    pub selector: SegmentSelector,
    /// Interrupt or trap gate.
    pub gate_type: GateType,
    /// Operand size of the handler.
    pub gate_size: GateSize,
    /// Minimum privilege allowed to raise the vector with `int n`.
    pub privilege_level: PrivilegeLevel,
    /// Whether the vector may be delivered at all.
    pub present: bool,
}

/// Errors decoding a raw descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// The type field holds a code other than interrupt or trap gate.
    UnknownGateType(u8),
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::UnknownGateType(bits) => write!(f, "unknown gate type {bits:#x}"),
        }
    }
}

/// One 8-byte entry of the IDT.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct GateDescriptor(u64);

impl GateDescriptor {
    /// Bits the hardware requires to be zero (unused, reserved, and bit 44).
    pub const RESERVED_MASK: u64 = (0xFF << 32) | (1 << 44);

    /// An empty slot. The CPU raises #NP if such a vector fires.
    pub const fn missing() -> Self {
        Self(0)
    }

    /// Builds a descriptor from its fields. Reserved bits are always zero.
    pub const fn new(
        offset: u32,
        selector: SegmentSelector,
        gate_type: GateType,
        gate_size: GateSize,
        privilege_level: PrivilegeLevel,
        present: bool,
    ) -> Self {
        let offset = offset as u64;
        let raw = ((offset & WORD_MASK) << OFFSET_LOW_SHIFT)
            | ((selector.0 as u64) << SELECTOR_SHIFT)
            | (((gate_type as u64) & TYPE_MASK) << TYPE_SHIFT)
            | ((gate_size as u64) << SIZE_SHIFT)
            | (((privilege_level as u64) & DPL_MASK) << DPL_SHIFT)
            | ((present as u64) << PRESENT_SHIFT)
            | (((offset >> 16) & WORD_MASK) << OFFSET_HIGH_SHIFT);
        Self(raw)
    }

    /// Builds a descriptor from a [`GateFields`] value.
    pub const fn encode(fields: &GateFields) -> Self {
        Self::new(
            fields.offset,
            fields.selector,
            fields.gate_type,
            fields.gate_size,
            fields.privilege_level,
            fields.present,
        )
    }

    /// Inverse of [`GateDescriptor::encode`].
    pub fn decode(self) -> Result<GateFields, GateError> {
        let type_bits = self.gate_type_bits();
        let gate_type = GateType::from_bits(type_bits).ok_or(GateError::UnknownGateType(type_bits))?;
        Ok(GateFields {
            offset: self.offset(),
            selector: self.segment_selector(),
            gate_type,
            gate_size: self.gate_size(),
            privilege_level: self.privilege_level(),
            present: self.present(),
        })
    }

    /// Wraps a raw 64-bit descriptor without checking it.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw 64-bit descriptor.
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Wire image as the CPU reads it.
    pub const fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    /// Reads a descriptor from its wire image.
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_le_bytes(bytes))
    }

    /// Handler address, reassembled from its two halves.
    pub const fn offset(self) -> u32 {
        let low = (self.0 >> OFFSET_LOW_SHIFT) & WORD_MASK;
        let high = (self.0 >> OFFSET_HIGH_SHIFT) & WORD_MASK;
        ((high << 16) | low) as u32
    }

    /// Code segment selector the handler runs in.
    pub const fn segment_selector(self) -> SegmentSelector {
        SegmentSelector(((self.0 >> SELECTOR_SHIFT) & WORD_MASK) as u16)
    }

    /// Raw 3-bit type field, which may hold an unsupported code.
    pub const fn gate_type_bits(self) -> u8 {
        ((self.0 >> TYPE_SHIFT) & TYPE_MASK) as u8
    }

    /// Operand size bit.
    pub const fn gate_size(self) -> GateSize {
        if (self.0 >> SIZE_SHIFT) & 1 == 1 {
            GateSize::Bits32
        } else {
            GateSize::Bits16
        }
    }

    /// Descriptor privilege level.
    pub const fn privilege_level(self) -> PrivilegeLevel {
        match (self.0 >> DPL_SHIFT) & DPL_MASK {
            0 => PrivilegeLevel::Ring0,
            1 => PrivilegeLevel::Ring1,
            2 => PrivilegeLevel::Ring2,
            _ => PrivilegeLevel::Ring3,
        }
    }

    /// Present bit.
    pub const fn present(self) -> bool {
        (self.0 >> PRESENT_SHIFT) & 1 == 1
    }
}

impl fmt::Debug for GateDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateDescriptor")
            .field("offset", &format_args!("{:#010x}", self.offset()))
            .field("selector", &format_args!("{:#06x}", self.segment_selector().0))
            .field("type", &self.gate_type_bits())
            .field("size", &self.gate_size())
            .field("dpl", &self.privilege_level())
            .field("present", &self.present())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KERNEL_CS: SegmentSelector = SegmentSelector(0x08);

    fn kernel_interrupt_gate(offset: u32) -> GateFields {
        GateFields {
            offset,
            selector: KERNEL_CS,
            gate_type: GateType::Interrupt,
            gate_size: GateSize::Bits32,
            privilege_level: PrivilegeLevel::Ring0,
            present: true,
        }
    }

    #[test]
    fn encodes_known_interrupt_gate() {
        let gate = GateDescriptor::encode(&kernel_interrupt_gate(0x0010_2030));
        // offset_high=0x0010, P=1 DPL=0 size=1 type=6 -> 0x8E00, selector 0x0008, offset_low 0x2030
        assert_eq!(gate.as_raw(), 0x0010_8E00_0008_2030);
        assert_eq!(
            gate.to_bytes(),
            [0x30, 0x20, 0x08, 0x00, 0x00, 0x8E, 0x10, 0x00]
        );
    }

    #[test]
    fn pins_every_field_position() {
        let offset_low = GateDescriptor::new(
            0x0000_FFFF,
            SegmentSelector(0),
            GateType::Interrupt,
            GateSize::Bits16,
            PrivilegeLevel::Ring0,
            false,
        );
        assert_eq!(offset_low.as_raw() & 0xFFFF, 0xFFFF);
        assert_eq!(offset_low.as_raw() >> 48, 0);

        let offset_high = GateDescriptor::new(
            0xFFFF_0000,
            SegmentSelector(0),
            GateType::Interrupt,
            GateSize::Bits16,
            PrivilegeLevel::Ring0,
            false,
        );
        assert_eq!(offset_high.as_raw() >> 48, 0xFFFF);
        assert_eq!(offset_high.as_raw() & 0xFFFF, 0);

        let selector = GateDescriptor::new(
            0,
            SegmentSelector(0xBEEF),
            GateType::Interrupt,
            GateSize::Bits16,
            PrivilegeLevel::Ring0,
            false,
        );
        assert_eq!((selector.as_raw() >> 16) & 0xFFFF, 0xBEEF);

        let trap = GateDescriptor::new(
            0,
            SegmentSelector(0),
            GateType::Trap,
            GateSize::Bits16,
            PrivilegeLevel::Ring0,
            false,
        );
        assert_eq!(trap.as_raw(), 0x7 << 40);

        let size = GateDescriptor::new(
            0,
            SegmentSelector(0),
            GateType::Interrupt,
            GateSize::Bits32,
            PrivilegeLevel::Ring0,
            false,
        );
        assert_eq!(size.as_raw() ^ (0x6 << 40), 1 << 43);

        let dpl = GateDescriptor::new(
            0,
            SegmentSelector(0),
            GateType::Interrupt,
            GateSize::Bits16,
            PrivilegeLevel::Ring3,
            false,
        );
        assert_eq!(dpl.as_raw() ^ (0x6 << 40), 0b11 << 45);

        let present = GateDescriptor::new(
            0,
            SegmentSelector(0),
            GateType::Interrupt,
            GateSize::Bits16,
            PrivilegeLevel::Ring0,
            true,
        );
        assert_eq!(present.as_raw() ^ (0x6 << 40), 1 << 47);
    }

    #[test]
    fn round_trips_and_never_sets_reserved_bits() {
        let offsets = [0, 1, 0xFFFF, 0x1_0000, 0xC010_0000, u32::MAX];
        let levels = [
            PrivilegeLevel::Ring0,
            PrivilegeLevel::Ring1,
            PrivilegeLevel::Ring2,
            PrivilegeLevel::Ring3,
        ];
        for offset in offsets {
            for gate_type in [GateType::Interrupt, GateType::Trap] {
                for gate_size in [GateSize::Bits16, GateSize::Bits32] {
                    for privilege_level in levels {
                        for present in [false, true] {
                            let fields = GateFields {
                                offset,
                                selector: SegmentSelector(0xFFFF),
                                gate_type,
                                gate_size,
                                privilege_level,
                                present,
                            };
                            let gate = GateDescriptor::encode(&fields);
                            assert_eq!(gate.as_raw() & GateDescriptor::RESERVED_MASK, 0);
                            assert_eq!(gate.decode(), Ok(fields));
                            assert_eq!(GateDescriptor::from_bytes(gate.to_bytes()), gate);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn identical_fields_encode_identically() {
        let fields = kernel_interrupt_gate(0xDEAD_BEEF);
        assert_eq!(GateDescriptor::encode(&fields), GateDescriptor::encode(&fields));
    }

    #[test]
    fn missing_gate_is_not_present_and_fails_decode() {
        let gate = GateDescriptor::missing();
        assert!(!gate.present());
        assert_eq!(gate.to_bytes(), [0; 8]);
        assert_eq!(gate.decode(), Err(GateError::UnknownGateType(0)));
    }
}
