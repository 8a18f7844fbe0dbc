//! Scan code set 1 translation.
//!
//! Rows are indexed by make code, columns by [`ModifierVariant`]. A cell is
//! either 0 (nothing to print), an ASCII byte, or an extended key code
//! (`>= 0x100`, BIOS style: the key's scan code in the high byte).

/// Modifier combination selecting a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum ModifierVariant {
    Plain = 0,
    Shift = 1,
    Ctrl = 2,
    Alt = 3,
    NumLock = 4,
    CapsLock = 5,
    ShiftCapsLock = 6,
    ShiftNumLock = 7,
}

impl ModifierVariant {
    pub const ALL: [ModifierVariant; 8] = [
        ModifierVariant::Plain,
        ModifierVariant::Shift,
        ModifierVariant::Ctrl,
        ModifierVariant::Alt,
        ModifierVariant::NumLock,
        ModifierVariant::CapsLock,
        ModifierVariant::ShiftCapsLock,
        ModifierVariant::ShiftNumLock,
    ];
}

/// First code that is not a plain byte.
pub const EXTENDED_BASE: u16 = 0x100;

/// Whether a decoded code names a function/navigation key rather than a byte.
pub const fn is_extended(code: u16) -> bool {
    code >= EXTENDED_BASE
}

/// Decodes a raw scan code. Break codes and codes past the table yield 0.
pub fn decode(scancode: u8, variant: ModifierVariant) -> u16 {
    SCANCODE_TABLE
        .get(scancode as usize)
        .map_or(0, |row| row[variant as usize])
}

#[rustfmt::skip]
pub static SCANCODE_TABLE: [[u16; 8]; 84] = [
    //  plain   shift   ctrl    alt     num     caps    sh+caps sh+num
    [   0,      0,      0,      0,      0,      0,      0,      0     ],
    [   0x1B,   0x1B,   0x1B,   0,      0x1B,   0x1B,   0x1B,   0x1B  ], // esc
    // 1 - 0
    [   0x31,   0x21,   0,      0x7800, 0x31,   0x31,   0x21,   0x21  ],
    [   0x32,   0x40,   0x0300, 0x7900, 0x32,   0x32,   0x40,   0x40  ],
    [   0x33,   0x23,   0,      0x7A00, 0x33,   0x33,   0x23,   0x23  ],
    [   0x34,   0x24,   0,      0x7B00, 0x34,   0x34,   0x24,   0x24  ],
    [   0x35,   0x25,   0,      0x7C00, 0x35,   0x35,   0x25,   0x25  ],
    [   0x36,   0x5E,   0x1E,   0x7D00, 0x36,   0x36,   0x5E,   0x5E  ],
    [   0x37,   0x26,   0,      0x7E00, 0x37,   0x37,   0x26,   0x26  ],
    [   0x38,   0x2A,   0,      0x7F00, 0x38,   0x38,   0x2A,   0x2A  ],
    [   0x39,   0x28,   0,      0x8000, 0x39,   0x39,   0x28,   0x28  ],
    [   0x30,   0x29,   0,      0x8100, 0x30,   0x30,   0x29,   0x29  ],
    // - = backspace tab
    [   0x2D,   0x5F,   0x1F,   0x8200, 0x2D,   0x2D,   0x5F,   0x5F  ],
    [   0x3D,   0x2B,   0,      0x8300, 0x3D,   0x3D,   0x2B,   0x2B  ],
    [   0x08,   0x08,   0x7F,   0,      0x08,   0x08,   0x08,   0x08  ],
    [   0x09,   0x0F00, 0,      0,      0x09,   0x09,   0x0F00, 0x0F00],
    // q w e r t y u i o p [ ]
    [   0x71,   0x51,   0x11,   0x1000, 0x71,   0x51,   0x71,   0x51  ],
    [   0x77,   0x57,   0x17,   0x1100, 0x77,   0x57,   0x77,   0x57  ],
    [   0x65,   0x45,   0x05,   0x1200, 0x65,   0x45,   0x65,   0x45  ],
    [   0x72,   0x52,   0x12,   0x1300, 0x72,   0x52,   0x72,   0x52  ],
    [   0x74,   0x54,   0x14,   0x1400, 0x74,   0x54,   0x74,   0x54  ],
    [   0x79,   0x59,   0x19,   0x1500, 0x79,   0x59,   0x79,   0x59  ],
    [   0x75,   0x55,   0x15,   0x1600, 0x75,   0x55,   0x75,   0x55  ],
    [   0x69,   0x49,   0x09,   0x1700, 0x69,   0x49,   0x69,   0x49  ],
    [   0x6F,   0x4F,   0x0F,   0x1800, 0x6F,   0x4F,   0x6F,   0x4F  ],
    [   0x70,   0x50,   0x10,   0x1900, 0x70,   0x50,   0x70,   0x50  ],
    [   0x5B,   0x7B,   0x1B,   0,      0x5B,   0x5B,   0x7B,   0x7B  ],
    [   0x5D,   0x7D,   0x1D,   0,      0x5D,   0x5D,   0x7D,   0x7D  ],
    // enter, left ctrl
    [   0x0A,   0x0A,   0x0D,   0,      0x0A,   0x0A,   0x0D,   0x0D  ],
    [   0,      0,      0,      0,      0,      0,      0,      0     ],
    // a s d f g h j k l ; ' `
    [   0x61,   0x41,   0x01,   0x1E00, 0x61,   0x41,   0x61,   0x41  ],
    [   0x73,   0x53,   0x13,   0x1F00, 0x73,   0x53,   0x73,   0x53  ],
    [   0x64,   0x44,   0x04,   0x2000, 0x64,   0x44,   0x64,   0x44  ],
    [   0x66,   0x46,   0x06,   0x2100, 0x66,   0x46,   0x66,   0x46  ],
    [   0x67,   0x47,   0x07,   0x2200, 0x67,   0x47,   0x67,   0x47  ],
    [   0x68,   0x48,   0x08,   0x2300, 0x68,   0x48,   0x68,   0x48  ],
    [   0x6A,   0x4A,   0x0A,   0x2400, 0x6A,   0x4A,   0x6A,   0x4A  ],
    [   0x6B,   0x4B,   0x0B,   0x3500, 0x6B,   0x4B,   0x6B,   0x4B  ],
    [   0x6C,   0x4C,   0x0C,   0x2600, 0x6C,   0x4C,   0x6C,   0x4C  ],
    [   0x3B,   0x3A,   0,      0,      0x3B,   0x3B,   0x3A,   0x3A  ],
    [   0x27,   0x22,   0,      0,      0x27,   0x27,   0x22,   0x22  ],
    [   0x60,   0x7E,   0,      0,      0x60,   0x60,   0x7E,   0x7E  ],
    // left shift
    [   0x2A,   0,      0,      0,      0,      0,      0,      0     ],
    // \ z x c v b n m , . /
    [   0x5C,   0x7C,   0x1C,   0,      0x5C,   0x5C,   0x7C,   0x7C  ],
    [   0x7A,   0x5A,   0x1A,   0x2C00, 0x7A,   0x5A,   0x7A,   0x5A  ],
    [   0x78,   0x58,   0x18,   0x2D00, 0x78,   0x58,   0x78,   0x58  ],
    [   0x63,   0x43,   0x03,   0x2E00, 0x63,   0x43,   0x63,   0x43  ],
    [   0x76,   0x56,   0x16,   0x2F00, 0x76,   0x56,   0x76,   0x56  ],
    [   0x62,   0x42,   0x02,   0x3000, 0x62,   0x42,   0x62,   0x42  ],
    [   0x6E,   0x4E,   0x0E,   0x3100, 0x6E,   0x4E,   0x6E,   0x4E  ],
    [   0x6D,   0x4D,   0x0D,   0x3200, 0x6D,   0x4D,   0x6D,   0x4D  ],
    [   0x2C,   0x3C,   0,      0,      0x2C,   0x2C,   0x3C,   0x3C  ],
    [   0x2E,   0x3E,   0,      0,      0x2E,   0x2E,   0x3E,   0x3E  ],
    [   0x2F,   0x3F,   0,      0,      0x2F,   0x2F,   0x3F,   0x3F  ],
    // right shift, print screen, alt
    [   0,      0,      0,      0,      0,      0,      0,      0     ],
    [   0,      0,      0,      0,      0,      0,      0,      0     ],
    [   0,      0,      0,      0,      0,      0,      0,      0     ],
    // space
    [   0x20,   0x20,   0x20,   0,      0x20,   0x20,   0x20,   0x20  ],
    // caps lock
    [   0,      0,      0,      0,      0,      0,      0,      0     ],
    // F1 - F10
    [   0x3B00, 0x5400, 0x5E00, 0x6800, 0x3B00, 0x3B00, 0x5400, 0x5400],
    [   0x3C00, 0x5500, 0x5F00, 0x6900, 0x3C00, 0x3C00, 0x5500, 0x5500],
    [   0x3D00, 0x5600, 0x6000, 0x6A00, 0x3D00, 0x3D00, 0x5600, 0x5600],
    [   0x3E00, 0x5700, 0x6100, 0x6B00, 0x3E00, 0x3E00, 0x5700, 0x5700],
    [   0x3F00, 0x5800, 0x6200, 0x6C00, 0x3F00, 0x3F00, 0x5800, 0x5800],
    [   0x4000, 0x5900, 0x6300, 0x6D00, 0x4000, 0x4000, 0x5900, 0x5900],
    [   0x4100, 0x5A00, 0x6400, 0x6E00, 0x4100, 0x4100, 0x5A00, 0x5A00],
    [   0x4200, 0x5B00, 0x6500, 0x6F00, 0x4200, 0x4200, 0x5B00, 0x5B00],
    [   0x4300, 0x5C00, 0x6600, 0x7000, 0x4300, 0x4300, 0x5C00, 0x5C00],
    [   0x4400, 0x5D00, 0x6700, 0x7100, 0x4400, 0x4400, 0x5D00, 0x5D00],
    // num lock, scroll lock
    [   0,      0,      0,      0,      0,      0,      0,      0     ],
    [   0,      0,      0,      0,      0,      0,      0,      0     ],
    // keypad: home up pgup - left center right + end down pgdn ins del
    [   0x4700, 0x37,   0x7700, 0,      0x37,   0x4700, 0x37,   0x4700],
    [   0x4800, 0x38,   0,      0,      0x38,   0x4800, 0x38,   0x4800],
    [   0x4900, 0x39,   0x8400, 0,      0x39,   0x4900, 0x39,   0x4900],
    [   0x2D,   0x2D,   0,      0,      0x2D,   0x2D,   0x2D,   0x2D  ],
    [   0x4B00, 0x34,   0x7300, 0,      0x34,   0x4B00, 0x34,   0x4B00],
    [   0x4C00, 0x35,   0,      0,      0x35,   0x4C00, 0x35,   0x4C00],
    [   0x4D00, 0x36,   0x7400, 0,      0x36,   0x4D00, 0x36,   0x4D00],
    [   0x2B,   0x2B,   0,      0,      0x2B,   0x2B,   0x2B,   0x2B  ],
    [   0x4F00, 0x31,   0x7500, 0,      0x31,   0x4F00, 0x31,   0x4F00],
    [   0x5000, 0x32,   0,      0,      0x32,   0x5000, 0x32,   0x5000],
    [   0x5100, 0x33,   0x7600, 0,      0x33,   0x5100, 0x33,   0x5100],
    [   0x5200, 0x30,   0,      0,      0x30,   0x5200, 0x30,   0x5200],
    [   0x5300, 0x2E,   0,      0,      0x2E,   0x5300, 0x2E,   0x5300],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_key_decodes_per_modifier() {
        assert_eq!(decode(0x1E, ModifierVariant::Plain), 0x61);
        assert_eq!(decode(0x1E, ModifierVariant::Shift), 0x41);
        assert_eq!(decode(0x1E, ModifierVariant::Ctrl), 0x01);
        assert_eq!(decode(0x1E, ModifierVariant::Alt), 0x1E00);
        assert_eq!(decode(0x1E, ModifierVariant::CapsLock), 0x41);
        assert_eq!(decode(0x1E, ModifierVariant::ShiftCapsLock), 0x61);
    }

    #[test]
    fn empty_rows_decode_to_zero() {
        for variant in ModifierVariant::ALL {
            assert_eq!(decode(0, variant), 0);
            for (code, row) in SCANCODE_TABLE.iter().enumerate() {
                if row.iter().all(|&cell| cell == 0) {
                    assert_eq!(decode(code as u8, variant), 0);
                }
            }
        }
    }

    #[test]
    fn decode_is_pure() {
        for code in 0..=u8::MAX {
            for variant in ModifierVariant::ALL {
                assert_eq!(decode(code, variant), decode(code, variant));
            }
        }
    }

    #[test]
    fn break_codes_and_unknown_codes_decode_to_zero() {
        // 0x9E is the release of 'a'.
        assert_eq!(decode(0x9E, ModifierVariant::Plain), 0);
        assert_eq!(decode(0x54, ModifierVariant::Plain), 0);
        assert_eq!(decode(0xFF, ModifierVariant::Shift), 0);
    }

    #[test]
    fn function_keys_are_extended() {
        let f1 = decode(0x3B, ModifierVariant::Plain);
        assert_eq!(f1, 0x3B00);
        assert!(is_extended(f1));
        assert!(!is_extended(decode(0x39, ModifierVariant::Plain)));
        assert_eq!(decode(0x39, ModifierVariant::Plain), u16::from(b' '));
    }

    #[test]
    fn number_row_shifts_to_symbols() {
        let shifted: Vec<u8> = (0x02..=0x0B)
            .map(|code| decode(code, ModifierVariant::Shift) as u8)
            .collect();
        assert_eq!(shifted, b"!@#$%^&*()");
    }
}
