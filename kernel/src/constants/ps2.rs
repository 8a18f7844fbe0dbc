//! i8042 PS/2 controller ports, commands and IRQ assignment.

/// Data port: the controller's output buffer on read, device data on write.
pub const DATA_PORT: u16 = 0x60;

/// Status register on read, command register on write.
pub const COMMAND_PORT: u16 = 0x64;

/// Controller self-test command.
pub const CMD_SELF_TEST: u8 = 0xAA;

/// Response byte the controller returns when the self-test passes.
pub const SELF_TEST_PASSED: u8 = 0x55;

/// Legacy IRQ line the first PS/2 port raises.
pub const KEYBOARD_IRQ: u8 = 1;

/// Tag the keyboard driver registers its handler under.
pub const KEYBOARD_TAG: &str = "i8042";
